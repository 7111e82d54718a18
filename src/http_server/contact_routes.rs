//! Contact HTTP Routes
//!
//! Mounted at `/api/contacts`; every route requires a bearer token.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, patch},
    Router,
};
use serde_json::Value;

use super::errors::ApiResult;
use super::extract::{ApiJson, UrlQuery};
use super::middleware::require_auth;
use super::response::Envelope;
use crate::auth::AuthService;
use crate::contacts::{ContactInput, ContactService};

pub fn contact_routes(service: Arc<ContactService>, auth: Arc<AuthService>) -> Router {
    Router::new()
        .route("/", get(list_handler).post(create_handler))
        .route("/search", get(search_handler))
        .route("/favorites", get(favorites_handler))
        .route(
            "/:id",
            get(get_handler).patch(update_handler).delete(delete_handler),
        )
        .route("/:id/favorite", patch(toggle_favorite_handler))
        .route_layer(middleware::from_fn_with_state(auth, require_auth))
        .with_state(service)
}

async fn list_handler(
    State(service): State<Arc<ContactService>>,
    UrlQuery(params): UrlQuery,
) -> ApiResult<Envelope> {
    Ok(Envelope::list("contacts", service.list(&params)?))
}

async fn search_handler(
    State(service): State<Arc<ContactService>>,
    UrlQuery(params): UrlQuery,
) -> ApiResult<Envelope> {
    Ok(Envelope::list("contacts", service.search(&params)?))
}

async fn favorites_handler(
    State(service): State<Arc<ContactService>>,
    UrlQuery(params): UrlQuery,
) -> ApiResult<Envelope> {
    Ok(Envelope::list("contacts", service.favorites(&params)?))
}

async fn create_handler(
    State(service): State<Arc<ContactService>>,
    ApiJson(input): ApiJson<ContactInput>,
) -> ApiResult<impl IntoResponse> {
    let contact = service.create(input)?;
    Ok((StatusCode::CREATED, Envelope::one("contact", contact)))
}

async fn get_handler(
    State(service): State<Arc<ContactService>>,
    Path(id): Path<String>,
) -> ApiResult<Envelope> {
    Ok(Envelope::one("contact", service.get(&id)?))
}

async fn update_handler(
    State(service): State<Arc<ContactService>>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<ContactInput>,
) -> ApiResult<Envelope> {
    Ok(Envelope::one("contact", service.update(&id, input)?))
}

async fn delete_handler(
    State(service): State<Arc<ContactService>>,
    Path(id): Path<String>,
) -> ApiResult<Envelope> {
    service.delete(&id)?;
    Ok(Envelope::success(Value::Null))
}

async fn toggle_favorite_handler(
    State(service): State<Arc<ContactService>>,
    Path(id): Path<String>,
) -> ApiResult<Envelope> {
    Ok(Envelope::one("contact", service.toggle_favorite(&id)?))
}
