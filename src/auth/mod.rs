//! # Auth Module
//!
//! User accounts, JWT issuance and validation, password reset by emailed
//! token, and the user directory.

pub mod crypto;
pub mod email;
pub mod errors;
pub mod jwt;
pub mod service;
pub mod user;

pub use email::{create_email_sender, EmailConfig, EmailSender, EmailTemplate, MemoryEmailSender};
pub use errors::{AuthError, AuthResult};
pub use jwt::{JwtClaims, JwtManager};
pub use service::{
    AuthConfig, AuthService, ChangePasswordRequest, ForgotPasswordRequest, IssuedToken,
    LoginRequest, RegisterRequest, ResetPasswordRequest,
};
pub use user::{StoreUserRepository, User, UserDirectory, UserRepository, USERS};
