//! # HTTP Server
//!
//! Main HTTP server combining all endpoint routers.

use std::net::SocketAddr;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::auth_routes::auth_routes;
use super::config::HttpServerConfig;
use super::contact_routes::contact_routes;
use super::group_routes::group_routes;
use super::health_routes::health_routes;
use super::state::AppState;
use super::todo_routes::todo_routes;
use super::user_routes::user_routes;

/// HTTP server for the to-do and contact-book APIs
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    pub fn new(config: HttpServerConfig, state: AppState) -> Self {
        let router = Self::build_router(&config, &state);
        Self { config, router }
    }

    /// Build the combined router with all endpoints
    pub fn build_router(config: &HttpServerConfig, state: &AppState) -> Router {
        Router::new()
            .merge(health_routes())
            // To-do API (open)
            .nest("/api/v1/todo", todo_routes(state.todos.clone()))
            // Contact book
            .nest("/api/auth", auth_routes(state.auth.clone()))
            .nest(
                "/api/contacts",
                contact_routes(state.contacts.clone(), state.auth.clone()),
            )
            .nest(
                "/api/groups",
                group_routes(state.groups.clone(), state.auth.clone()),
            )
            .nest(
                "/api/users",
                user_routes(state.users.clone(), state.auth.clone()),
            )
            .layer(DefaultBodyLimit::max(config.body_limit_bytes))
            .layer(TraceLayer::new_for_http())
            .layer(config.cors_layer())
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Bind and serve until the process is stopped
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr: SocketAddr = self.config.socket_addr().parse().map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid socket address {}: {}", self.config.socket_addr(), e),
            )
        })?;

        let listener = TcpListener::bind(addr).await?;
        info!(%addr, "HTTP server listening");
        info!("To-do API at http://{}/api/v1/todo", addr);
        info!("Contact book API at http://{}/api/contacts", addr);

        axum::serve(listener, self.router).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthConfig, MemoryEmailSender};
    use crate::store::DocumentStore;
    use std::sync::Arc;

    fn state() -> AppState {
        AppState::new(
            DocumentStore::in_memory(),
            AuthConfig::default(),
            Arc::new(MemoryEmailSender::new()),
        )
    }

    #[test]
    fn test_server_with_custom_port() {
        let server = HttpServer::new(HttpServerConfig::with_port(8080), state());
        assert_eq!(server.socket_addr(), "0.0.0.0:8080");
    }

    #[tokio::test]
    async fn test_bad_host_is_an_error() {
        let config = HttpServerConfig {
            host: "not a host".to_string(),
            ..HttpServerConfig::default()
        };
        let err = HttpServer::new(config, state()).start().await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
    }
}
