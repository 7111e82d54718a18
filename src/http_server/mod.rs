//! # HTTP Server Module
//!
//! Axum server for both APIs.
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `/api/v1/todo/*` - To-do list
//! - `/api/auth/*` - Registration, login, password reset, profile
//! - `/api/contacts/*` - Contacts (authenticated)
//! - `/api/groups/*` - Contact groups (authenticated)
//! - `/api/users` - User directory (authenticated)

pub mod auth_routes;
pub mod config;
pub mod contact_routes;
pub mod errors;
pub mod extract;
pub mod group_routes;
pub mod health_routes;
pub mod middleware;
pub mod response;
pub mod server;
pub mod state;
pub mod todo_routes;
pub mod user_routes;

pub use config::HttpServerConfig;
pub use errors::{ApiError, ApiResult, ErrorResponse};
pub use extract::{ApiJson, UrlQuery, ValidatedJson};
pub use middleware::{require_auth, CurrentUser};
pub use response::Envelope;
pub use server::HttpServer;
pub use state::AppState;
