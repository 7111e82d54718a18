//! # Auth Errors
//!
//! Error types for the authentication module.

use thiserror::Error;

use crate::store::StoreError;

/// Result type for auth operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Authentication and authorization errors
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    // ==================
    // Request Errors
    // ==================

    /// Login without email or password
    #[error("Please provide both email and password")]
    MissingCredentials,

    /// Password does not meet requirements
    #[error("Password does not meet requirements: {0}")]
    WeakPassword(String),

    /// Password and confirmation differ
    #[error("Passwords are not the same")]
    PasswordMismatch,

    /// Reset token unknown or past its expiry
    #[error("Token is invalid or has expired")]
    InvalidResetToken,

    /// Profile updates cannot touch the password
    #[error("This route is not for password updates. Please use /change-password")]
    PasswordUpdateNotAllowed,

    /// Field-level validation failed
    #[error("{0}")]
    Validation(String),

    // ==================
    // Authentication Errors
    // ==================

    /// Wrong email or password (generic on purpose)
    #[error("Incorrect email or password")]
    InvalidCredentials,

    /// No bearer token on a protected route
    #[error("You are not logged in. Please log in to get access")]
    NotLoggedIn,

    /// JWT token has expired
    #[error("Your token has expired. Please log in again")]
    TokenExpired,

    /// JWT signature is invalid
    #[error("Invalid token. Please log in again")]
    InvalidSignature,

    /// JWT token is malformed
    #[error("Malformed token. Please log in again")]
    MalformedToken,

    /// Token subject was deleted
    #[error("The user belonging to this token no longer exists")]
    UserNoLongerExists,

    /// Token issued before the latest password change
    #[error("User recently changed password. Please log in again")]
    PasswordChangedAfterToken,

    #[error("Your current password is wrong")]
    CurrentPasswordWrong,

    // ==================
    // Lookup Errors
    // ==================

    #[error("There is no user with that email address")]
    UserNotFound,

    /// Email already registered
    #[error("Email already registered")]
    EmailAlreadyExists,

    // ==================
    // Internal Errors
    // ==================

    /// Reset email could not be delivered
    #[error("There was an error sending the email. Try again later")]
    EmailDelivery(String),

    /// Password hashing failed
    #[error("Internal error: password hashing failed")]
    HashingFailed,

    /// Token generation failed
    #[error("Internal error: token generation failed")]
    TokenGenerationFailed,

    /// Storage operation failed
    #[error("Storage error: {0}")]
    Storage(String),
}

impl AuthError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request
            AuthError::MissingCredentials => 400,
            AuthError::WeakPassword(_) => 400,
            AuthError::PasswordMismatch => 400,
            AuthError::InvalidResetToken => 400,
            AuthError::PasswordUpdateNotAllowed => 400,
            AuthError::Validation(_) => 400,

            // 401 Unauthorized
            AuthError::InvalidCredentials => 401,
            AuthError::NotLoggedIn => 401,
            AuthError::TokenExpired => 401,
            AuthError::InvalidSignature => 401,
            AuthError::MalformedToken => 401,
            AuthError::UserNoLongerExists => 401,
            AuthError::PasswordChangedAfterToken => 401,
            AuthError::CurrentPasswordWrong => 401,

            // 404 Not Found
            AuthError::UserNotFound => 404,

            // 409 Conflict
            AuthError::EmailAlreadyExists => 409,

            // 500 Internal Server Error
            AuthError::EmailDelivery(_) => 500,
            AuthError::HashingFailed => 500,
            AuthError::TokenGenerationFailed => 500,
            AuthError::Storage(_) => 500,
        }
    }

    /// Returns whether this error should be logged at warn level
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateKey { ref field } if field == "email" => {
                AuthError::EmailAlreadyExists
            }
            other => AuthError::Storage(other.to_string()),
        }
    }
}
