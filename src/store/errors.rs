//! # Store Errors

use std::path::PathBuf;

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Document store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing a collection file failed
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A collection file holds invalid JSON
    #[error("Invalid collection data in {}: {source}", path.display())]
    Serialization {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// A unique field already holds this value
    #[error("Duplicate value for unique field '{field}'")]
    DuplicateKey { field: String },

    /// Documents and patches must be JSON objects
    #[error("Document must be a JSON object")]
    NotAnObject,

    #[error("Store lock poisoned")]
    LockPoisoned,
}

impl StoreError {
    /// HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            StoreError::DuplicateKey { .. } => 409,
            StoreError::NotAnObject => 400,
            StoreError::Io { .. } | StoreError::Serialization { .. } | StoreError::LockPoisoned => {
                500
            }
        }
    }
}
