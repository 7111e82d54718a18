//! To-do HTTP Routes
//!
//! Mounted at `/api/v1/todo`. These routes are open; no token is required.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
    Router,
};
use serde_json::json;

use super::errors::ApiResult;
use super::extract::{ApiJson, UrlQuery};
use super::response::Envelope;
use crate::todo::{TodoInput, TodoService};

pub fn todo_routes(service: Arc<TodoService>) -> Router {
    Router::new()
        .route("/", get(list_handler).post(create_handler))
        .route("/stats", get(stats_handler))
        .route(
            "/:id",
            get(get_handler).put(update_handler).delete(delete_handler),
        )
        .route("/:id/toggle", patch(toggle_handler))
        .with_state(service)
}

async fn create_handler(
    State(service): State<Arc<TodoService>>,
    ApiJson(input): ApiJson<TodoInput>,
) -> ApiResult<impl IntoResponse> {
    let todo = service.create(input)?;
    Ok((StatusCode::CREATED, Envelope::one("todo", todo)))
}

async fn list_handler(
    State(service): State<Arc<TodoService>>,
    UrlQuery(params): UrlQuery,
) -> ApiResult<Envelope> {
    Ok(Envelope::list("todos", service.list(&params)?))
}

async fn stats_handler(State(service): State<Arc<TodoService>>) -> ApiResult<Envelope> {
    let stats = service.stats()?;
    Ok(Envelope::success(json!({ "stats": stats })))
}

async fn get_handler(
    State(service): State<Arc<TodoService>>,
    Path(id): Path<String>,
) -> ApiResult<Envelope> {
    Ok(Envelope::one("todo", service.get(&id)?))
}

async fn update_handler(
    State(service): State<Arc<TodoService>>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<TodoInput>,
) -> ApiResult<Envelope> {
    Ok(Envelope::one("todo", service.update(&id, input)?))
}

async fn delete_handler(
    State(service): State<Arc<TodoService>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    service.delete(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn toggle_handler(
    State(service): State<Arc<TodoService>>,
    Path(id): Path<String>,
) -> ApiResult<Envelope> {
    Ok(Envelope::one("todo", service.toggle(&id)?))
}
