//! # Query Errors
//!
//! The single error kind produced while translating URL parameters.

use thiserror::Error;

/// Result type for query translation
pub type QueryResult<T> = Result<T, MalformedQueryError>;

/// A query parameter could not be translated into a retrieval directive.
///
/// Always a client fault. Never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Malformed query parameter '{key}': {reason}")]
pub struct MalformedQueryError {
    /// The offending parameter key (empty when the whole query string is bad)
    pub key: String,

    /// Human-readable reason
    pub reason: String,
}

impl MalformedQueryError {
    pub fn new(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        400
    }
}
