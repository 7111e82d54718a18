//! Group HTTP Routes
//!
//! Mounted at `/api/groups`. Callers only ever see their own groups.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::get,
    Router,
};
use serde_json::Value;

use super::errors::ApiResult;
use super::extract::ApiJson;
use super::middleware::{require_auth, CurrentUser};
use super::response::Envelope;
use crate::auth::AuthService;
use crate::groups::{GroupInput, GroupService};

pub fn group_routes(service: Arc<GroupService>, auth: Arc<AuthService>) -> Router {
    Router::new()
        .route("/", get(list_handler).post(create_handler))
        .route(
            "/:id",
            get(get_handler).patch(update_handler).delete(delete_handler),
        )
        .route_layer(middleware::from_fn_with_state(auth, require_auth))
        .with_state(service)
}

async fn list_handler(
    State(service): State<Arc<GroupService>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Envelope> {
    Ok(Envelope::list("groups", service.list(&user.id)?))
}

async fn create_handler(
    State(service): State<Arc<GroupService>>,
    CurrentUser(user): CurrentUser,
    ApiJson(input): ApiJson<GroupInput>,
) -> ApiResult<impl IntoResponse> {
    let group = service.create(&user.id, input)?;
    Ok((StatusCode::CREATED, Envelope::one("group", group)))
}

async fn get_handler(
    State(service): State<Arc<GroupService>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Envelope> {
    Ok(Envelope::one("group", service.get(&user.id, &id)?))
}

async fn update_handler(
    State(service): State<Arc<GroupService>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<GroupInput>,
) -> ApiResult<Envelope> {
    Ok(Envelope::one("group", service.update(&user.id, &id, input)?))
}

async fn delete_handler(
    State(service): State<Arc<GroupService>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Envelope> {
    service.delete(&user.id, &id)?;
    Ok(Envelope::success(Value::Null))
}
