//! CLI-specific error types
//!
//! All CLI errors are fatal: the process prints the error and exits non-zero.

use std::io;

use thiserror::Error;

use crate::observability::ObservabilityError;
use crate::store::StoreError;

/// CLI error
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration file or environment error
    #[error("{0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Logging(#[from] ObservabilityError),

    /// Seed data rejected
    #[error("{0}")]
    Seed(String),

    /// Server could not start or stopped with an error
    #[error("{0}")]
    BootFailed(String),
}

impl CliError {
    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        CliError::Config(msg.into())
    }

    /// Boot failed
    pub fn boot_failed(msg: impl Into<String>) -> Self {
        CliError::BootFailed(msg.into())
    }

    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            CliError::Config(_) => "CLI_CONFIG_ERROR",
            CliError::Io(_) | CliError::Json(_) => "CLI_IO_ERROR",
            CliError::Store(_) => "CLI_STORE_ERROR",
            CliError::Logging(_) => "CLI_LOGGING_ERROR",
            CliError::Seed(_) => "CLI_SEED_ERROR",
            CliError::BootFailed(_) => "CLI_BOOT_FAILED",
        }
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
