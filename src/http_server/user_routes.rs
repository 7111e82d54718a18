//! User directory route, mounted at `/api/users`.

use std::sync::Arc;

use axum::{extract::State, middleware, routing::get, Router};

use super::errors::ApiResult;
use super::extract::UrlQuery;
use super::middleware::require_auth;
use super::response::Envelope;
use crate::auth::{AuthService, UserDirectory};

pub fn user_routes(directory: Arc<UserDirectory>, auth: Arc<AuthService>) -> Router {
    Router::new()
        .route("/", get(list_handler))
        .route_layer(middleware::from_fn_with_state(auth, require_auth))
        .with_state(directory)
}

async fn list_handler(
    State(directory): State<Arc<UserDirectory>>,
    UrlQuery(params): UrlQuery,
) -> ApiResult<Envelope> {
    Ok(Envelope::list("users", directory.list(&params)?))
}
