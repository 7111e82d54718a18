//! Success envelopes: `{"status": "success", ["results": n,] "data": ...}`.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{Duration, Utc};
use serde::Serialize;
use serde_json::{json, Value};

use crate::auth::{AuthConfig, IssuedToken, User};

/// Success envelope
#[derive(Debug, Serialize)]
pub struct Envelope {
    status: &'static str,

    #[serde(skip_serializing_if = "Option::is_none")]
    results: Option<usize>,

    data: Value,
}

impl Envelope {
    pub fn success(data: Value) -> Self {
        Self {
            status: "success",
            results: None,
            data,
        }
    }

    /// List envelope; `results` is the number of items in `items`
    pub fn list(key: &str, items: Vec<Value>) -> Self {
        let results = items.len();
        Self {
            status: "success",
            results: Some(results),
            data: json!({ key: items }),
        }
    }

    /// Wrap a single document as `{"data": {key: doc}}`
    pub fn one(key: &str, doc: Value) -> Self {
        Self::success(json!({ key: doc }))
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// `{status, token, data: {user}}` plus the `jwt` cookie
pub fn token_response(status: StatusCode, user: &User, issued: &IssuedToken, config: &AuthConfig) -> Response {
    let body = json!({
        "status": "success",
        "token": issued.token,
        "data": { "user": user.public() },
    });

    let mut response = (status, Json(body)).into_response();
    if let Ok(cookie) = HeaderValue::from_str(&jwt_cookie(&issued.token, config)) {
        response.headers_mut().insert(header::SET_COOKIE, cookie);
    }
    response
}

fn jwt_cookie(token: &str, config: &AuthConfig) -> String {
    let expires = Utc::now() + Duration::days(config.cookie_expiration_days);
    let mut cookie = format!(
        "jwt={}; Expires={}; Path=/; HttpOnly",
        token,
        expires.format("%a, %d %b %Y %H:%M:%S GMT")
    );
    if config.secure_cookies {
        cookie.push_str("; Secure");
    }
    cookie
}
