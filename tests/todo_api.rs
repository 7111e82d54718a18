//! To-do API Tests
//!
//! Drives `/api/v1/todo` through the full router:
//! - Create, read, update, delete and toggle
//! - Listing with filters, priority sort and pagination
//! - Error envelopes for bad input and unknown ids

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use recordkeep::auth::{AuthConfig, MemoryEmailSender};
use recordkeep::http_server::{AppState, HttpServer, HttpServerConfig};
use recordkeep::store::DocumentStore;
use serde_json::{json, Value};
use tower::ServiceExt;

// =============================================================================
// Test Utilities
// =============================================================================

fn app() -> Router {
    let state = AppState::new(
        DocumentStore::in_memory(),
        AuthConfig::default(),
        Arc::new(MemoryEmailSender::new()),
    );
    HttpServer::new(HttpServerConfig::default(), state).router()
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(body) => {
            request = request.header("content-type", "application/json");
            Body::from(body.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(request.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn create(app: &Router, body: Value) -> Value {
    let (status, json) = send(app, Method::POST, "/api/v1/todo", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    json["data"]["todo"].clone()
}

fn titles(json: &Value) -> Vec<String> {
    json["data"]["todos"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap().to_string())
        .collect()
}

// =============================================================================
// CRUD
// =============================================================================

#[tokio::test]
async fn test_health() {
    let (status, json) = send(&app(), Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], json!("ok"));
}

#[tokio::test]
async fn test_create_get_update_delete() {
    let app = app();
    let todo = create(&app, json!({"title": "Write report", "category": " work "})).await;
    let id = todo["_id"].as_str().unwrap().to_string();

    assert_eq!(todo["completed"], json!(false));
    assert_eq!(todo["priority"], json!("medium"));
    assert_eq!(todo["category"], json!("work"));
    assert!(todo.get("priorityOrder").is_none());
    assert!(todo.get("createdAt").is_some());

    let (status, json) = send(&app, Method::GET, &format!("/api/v1/todo/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], json!("success"));
    assert_eq!(json["data"]["todo"]["title"], json!("Write report"));

    let (status, json) = send(
        &app,
        Method::PUT,
        &format!("/api/v1/todo/{id}"),
        Some(json!({"priority": "high", "completed": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["todo"]["priority"], json!("high"));
    assert_eq!(json["data"]["todo"]["title"], json!("Write report"));

    let (status, json) = send(&app, Method::DELETE, &format!("/api/v1/todo/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(json, Value::Null);

    let (status, json) = send(&app, Method::GET, &format!("/api/v1/todo/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["status"], json!("fail"));
    assert_eq!(json["code"], json!(404));
}

#[tokio::test]
async fn test_toggle_and_stats() {
    let app = app();
    let a = create(&app, json!({"title": "a"})).await;
    create(&app, json!({"title": "b"})).await;
    create(&app, json!({"title": "c"})).await;

    let uri = format!("/api/v1/todo/{}/toggle", a["_id"].as_str().unwrap());
    let (status, json) = send(&app, Method::PATCH, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["todo"]["completed"], json!(true));

    let (_, json) = send(&app, Method::GET, "/api/v1/todo/stats", None).await;
    assert_eq!(json["data"]["stats"], json!({"total": 3, "completed": 1, "pending": 2}));

    let (_, json) = send(&app, Method::PATCH, &uri, None).await;
    assert_eq!(json["data"]["todo"]["completed"], json!(false));
}

// =============================================================================
// Listing
// =============================================================================

#[tokio::test]
async fn test_list_sorts_filters_and_pages() {
    let app = app();
    create(&app, json!({"title": "low", "priority": "low"})).await;
    create(&app, json!({"title": "high", "priority": "high"})).await;
    create(&app, json!({"title": "medium", "priority": "medium", "completed": true})).await;

    let (status, json) = send(&app, Method::GET, "/api/v1/todo?sort=priority", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["results"], json!(3));
    assert_eq!(titles(&json), vec!["high", "medium", "low"]);

    let (_, json) = send(&app, Method::GET, "/api/v1/todo?sort=priority&order=desc", None).await;
    assert_eq!(titles(&json), vec!["low", "medium", "high"]);

    let (_, json) = send(&app, Method::GET, "/api/v1/todo?completed=true", None).await;
    assert_eq!(titles(&json), vec!["medium"]);

    let (_, json) = send(&app, Method::GET, "/api/v1/todo?sort=priority&limit=1&page=2", None).await;
    assert_eq!(titles(&json), vec!["medium"]);
    assert_eq!(json["results"], json!(1));
}

#[tokio::test]
async fn test_list_projection() {
    let app = app();
    create(&app, json!({"title": "a", "description": "details"})).await;

    let (_, json) = send(&app, Method::GET, "/api/v1/todo?fields=title", None).await;
    let todo = &json["data"]["todos"][0];
    assert_eq!(todo["title"], json!("a"));
    assert!(todo.get("_id").is_some());
    assert!(todo.get("description").is_none());

    let (_, json) = send(&app, Method::GET, "/api/v1/todo", None).await;
    assert!(json["data"]["todos"][0].get("__v").is_none());
}

// =============================================================================
// Errors
// =============================================================================

#[tokio::test]
async fn test_validation_errors() {
    let app = app();

    let (status, json) = send(&app, Method::POST, "/api/v1/todo", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], json!("Title is required"));

    let (status, json) = send(
        &app,
        Method::POST,
        "/api/v1/todo",
        Some(json!({"title": "t", "priority": "urgent"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], json!("priority can either be low, medium or high"));

    let (status, json) = send(
        &app,
        Method::POST,
        "/api/v1/todo",
        Some(json!({"title": "t", "dueDate": "2001-01-01"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], json!("The due date cannot be in the past"));
}

#[tokio::test]
async fn test_malformed_query_is_400() {
    let (status, json) = send(&app(), Method::GET, "/api/v1/todo?age[foo]=1", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], json!("fail"));
}

#[tokio::test]
async fn test_invalid_json_body_is_400() {
    let app = app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/todo")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
