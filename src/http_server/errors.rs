//! # API Errors
//!
//! One error type for every handler. Rendered as
//! `{"status": "fail" | "error", "message": ..., "code": ...}`:
//! `fail` for client errors, `error` for server faults.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};
use validator::ValidationErrors;

use crate::auth::AuthError;
use crate::query::MalformedQueryError;
use crate::store::StoreError;

/// Result type for handlers and domain services
pub type ApiResult<T> = Result<T, ApiError>;

/// API errors
#[derive(Debug, Error)]
pub enum ApiError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// Query string could not be translated
    #[error(transparent)]
    Query(#[from] MalformedQueryError),

    /// Field validation failed
    #[error("{0}")]
    Validation(String),

    /// Body is not valid JSON for the endpoint
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// No document with the requested id
    #[error("No {0} found with that ID")]
    NotFound(&'static str),

    /// Caller does not own the resource
    #[error("{0}")]
    Forbidden(String),

    // ==================
    // Wrapped Errors
    // ==================
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Store(#[from] StoreError),

    // ==================
    // Server Errors (5xx)
    // ==================
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        let code = match self {
            ApiError::Query(e) => e.status_code(),
            ApiError::Validation(_) | ApiError::InvalidBody(_) => 400,
            ApiError::NotFound(_) => 404,
            ApiError::Forbidden(_) => 403,
            ApiError::Auth(e) => e.status_code(),
            ApiError::Store(e) => e.status_code(),
            ApiError::Internal(_) => 500,
        };
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(describe_validation(&errors))
    }
}

/// Flatten field errors into one message, fields in alphabetical order
pub fn describe_validation(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(message) => message.to_string(),
                None => format!("{} is invalid ({})", field, e.code),
            })
        })
        .collect::<Vec<_>>()
        .join(". ")
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: &'static str,
    pub message: String,
    pub code: u16,
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        let code = err.status_code();
        Self {
            status: if code.is_server_error() { "error" } else { "fail" },
            message: err.to_string(),
            code: code.as_u16(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        } else {
            warn!(status = status.as_u16(), error = %self, "Request rejected");
        }

        (status, Json(ErrorResponse::from(&self))).into_response()
    }
}
