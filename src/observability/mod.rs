//! Observability: structured logging through `tracing`.
//!
//! # Usage
//!
//! ```ignore
//! use recordkeep::observability::{init_tracing, LogConfig};
//!
//! init_tracing(&LogConfig::default())?;
//! tracing::info!(port = 3000, "Starting");
//! ```

mod logger;

pub use logger::{init_tracing, LogConfig, LogFormat};

use thiserror::Error;

/// Observability errors. Never fatal to request handling.
#[derive(Debug, Error)]
pub enum ObservabilityError {
    #[error("Invalid log filter '{directive}': {reason}")]
    InvalidFilter { directive: String, reason: String },

    #[error("Log subscriber already installed: {0}")]
    AlreadyInitialized(String),
}

/// Result type for observability operations
pub type ObservabilityResult<T> = Result<T, ObservabilityError>;
