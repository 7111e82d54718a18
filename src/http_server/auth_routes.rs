//! Auth HTTP Routes
//!
//! Mounted at `/api/auth`. Registration, login and password reset are
//! public; the rest sit behind [`require_auth`].

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header::HOST, HeaderMap, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde_json::{json, Value};

use super::errors::ApiResult;
use super::extract::{ApiJson, ValidatedJson};
use super::middleware::{require_auth, CurrentUser};
use super::response::{token_response, Envelope};
use crate::auth::{
    AuthService, ChangePasswordRequest, ForgotPasswordRequest, LoginRequest, RegisterRequest,
    ResetPasswordRequest,
};

/// Auth routes with shared state
pub fn auth_routes(auth: Arc<AuthService>) -> Router {
    let protected = Router::new()
        .route("/refreshToken", patch(refresh_token_handler))
        .route("/profile", get(get_profile_handler).post(update_profile_handler))
        .route("/change-password", post(change_password_handler))
        .route_layer(middleware::from_fn_with_state(auth.clone(), require_auth));

    Router::new()
        .route("/register", post(register_handler))
        .route("/login", post(login_handler))
        .route("/forgotPassword", post(forgot_password_handler))
        .route("/resetPassword/:token", patch(reset_password_handler))
        .merge(protected)
        .with_state(auth)
}

// ==================
// Handlers
// ==================

async fn register_handler(
    State(auth): State<Arc<AuthService>>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> ApiResult<Response> {
    let (user, token) = auth.register(request)?;
    Ok(token_response(StatusCode::CREATED, &user, &token, auth.config()))
}

async fn login_handler(
    State(auth): State<Arc<AuthService>>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<Response> {
    let (user, token) = auth.login(request)?;
    Ok(token_response(StatusCode::OK, &user, &token, auth.config()))
}

async fn forgot_password_handler(
    State(auth): State<Arc<AuthService>>,
    headers: HeaderMap,
    ValidatedJson(request): ValidatedJson<ForgotPasswordRequest>,
) -> ApiResult<impl IntoResponse> {
    let base_url = base_url(&auth, &headers);
    auth.forgot_password(request, &base_url).await?;

    Ok(Json(json!({
        "status": "success",
        "message": "Token sent to email!",
    })))
}

async fn reset_password_handler(
    State(auth): State<Arc<AuthService>>,
    Path(token): Path<String>,
    ApiJson(request): ApiJson<ResetPasswordRequest>,
) -> ApiResult<Response> {
    let (user, token) = auth.reset_password(&token, request).await?;
    Ok(token_response(StatusCode::OK, &user, &token, auth.config()))
}

async fn refresh_token_handler(
    State(auth): State<Arc<AuthService>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Response> {
    let token = auth.issue(&user)?;
    Ok(token_response(StatusCode::OK, &user, &token, auth.config()))
}

async fn get_profile_handler(CurrentUser(user): CurrentUser) -> Envelope {
    Envelope::one("user", user.public())
}

async fn update_profile_handler(
    State(auth): State<Arc<AuthService>>,
    CurrentUser(user): CurrentUser,
    ApiJson(patch): ApiJson<Value>,
) -> ApiResult<Envelope> {
    let updated = auth.update_profile(&user, &patch)?;
    Ok(Envelope::one("user", updated.public()))
}

async fn change_password_handler(
    State(auth): State<Arc<AuthService>>,
    CurrentUser(user): CurrentUser,
    ApiJson(request): ApiJson<ChangePasswordRequest>,
) -> ApiResult<Response> {
    let (user, token) = auth.change_password(&user, request).await?;
    Ok(token_response(StatusCode::OK, &user, &token, auth.config()))
}

/// Configured public URL, else `http://<Host>`
fn base_url(auth: &AuthService, headers: &HeaderMap) -> String {
    if let Some(url) = &auth.config().public_url {
        return url.trim_end_matches('/').to_string();
    }
    let host = headers
        .get(HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost");
    format!("http://{}", host)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthConfig, MemoryEmailSender, StoreUserRepository};
    use crate::store::DocumentStore;
    use axum::http::HeaderValue;

    fn service(public_url: Option<&str>) -> AuthService {
        let config = AuthConfig {
            public_url: public_url.map(str::to_string),
            ..AuthConfig::default()
        };
        let store = DocumentStore::in_memory();
        AuthService::new(
            config,
            Arc::new(StoreUserRepository::new(&store)),
            Arc::new(MemoryEmailSender::new()),
        )
    }

    #[test]
    fn test_base_url() {
        let mut headers = HeaderMap::new();
        assert_eq!(base_url(&service(None), &headers), "http://localhost");

        headers.insert(HOST, HeaderValue::from_static("api.example.com:8080"));
        assert_eq!(base_url(&service(None), &headers), "http://api.example.com:8080");

        let configured = service(Some("https://contacts.example.com/"));
        assert_eq!(base_url(&configured, &headers), "https://contacts.example.com");
    }
}
