//! CLI module for recordkeep
//!
//! Provides command-line interface for:
//! - serve: Start the HTTP server
//! - seed: Import or delete development data

mod args;
mod commands;
mod config;
mod errors;

pub use args::{Cli, Command, SeedCollection};
pub use commands::{clear, import, run, run_command, serve};
pub use config::{Config, Environment, StorageConfig};
pub use errors::{CliError, CliResult};
