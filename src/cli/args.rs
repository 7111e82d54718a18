//! CLI argument definitions using clap
//!
//! Commands:
//! - recordkeep serve [--config <path>] [--port <port>]
//! - recordkeep seed --collection users|contacts (--file <path> | --delete) [--config <path>]

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Recordkeep - to-do and contact-book REST services
#[derive(Parser, Debug)]
#[command(name = "recordkeep")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP server
    Serve {
        /// Path to configuration file; defaults and environment only when omitted
        #[arg(long, env = "RECORDKEEP_CONFIG")]
        config: Option<PathBuf>,

        /// Port to listen on, overriding config and PORT
        #[arg(long)]
        port: Option<u16>,
    },

    /// Import or delete development data
    Seed {
        /// Path to configuration file
        #[arg(long, env = "RECORDKEEP_CONFIG")]
        config: Option<PathBuf>,

        /// Collection to seed
        #[arg(long, value_enum)]
        collection: SeedCollection,

        /// JSON array of documents to import
        #[arg(long, required_unless_present = "delete", conflicts_with = "delete")]
        file: Option<PathBuf>,

        /// Remove every document of the collection
        #[arg(long)]
        delete: bool,
    },
}

/// Collections that can be seeded
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SeedCollection {
    Users,
    Contacts,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
