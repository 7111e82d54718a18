//! Contact Book API Tests
//!
//! Drives the authenticated contact-book endpoints through the full router:
//! - Registration, login, route protection, password reset and change
//! - Contacts: CRUD, search, favorites
//! - Groups: owner scoping and member population
//! - User directory never exposes credentials

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::header::{AUTHORIZATION, SET_COOKIE};
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::Router;
use recordkeep::auth::{AuthConfig, MemoryEmailSender};
use recordkeep::http_server::{AppState, HttpServer, HttpServerConfig};
use recordkeep::store::DocumentStore;
use serde_json::{json, Value};
use tower::ServiceExt;

// =============================================================================
// Test Utilities
// =============================================================================

struct TestApp {
    router: Router,
    mailer: Arc<MemoryEmailSender>,
}

struct Reply {
    status: StatusCode,
    headers: HeaderMap,
    json: Value,
}

fn app() -> TestApp {
    let mailer = Arc::new(MemoryEmailSender::new());
    let state = AppState::new(DocumentStore::in_memory(), AuthConfig::default(), mailer.clone());
    TestApp {
        router: HttpServer::new(HttpServerConfig::default(), state).router(),
        mailer,
    }
}

impl TestApp {
    async fn send(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Reply {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(body) => {
                request = request.header("content-type", "application/json");
                Body::from(body.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        Reply { status, headers, json }
    }

    /// Register and return the issued token
    async fn register(&self, email: &str, password: &str) -> String {
        let reply = self
            .send(
                Method::POST,
                "/api/auth/register",
                None,
                Some(json!({
                    "firstName": "Test",
                    "lastName": "User",
                    "email": email,
                    "password": password,
                    "passwordConfirm": password,
                })),
            )
            .await;
        assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.json);
        reply.json["token"].as_str().unwrap().to_string()
    }

    async fn create_contact(&self, token: &str, body: Value) -> Value {
        let reply = self.send(Method::POST, "/api/contacts", Some(token), Some(body)).await;
        assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.json);
        reply.json["data"]["contact"].clone()
    }
}

fn first_names(json: &Value) -> Vec<String> {
    json["data"]["contacts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["firstName"].as_str().unwrap().to_string())
        .collect()
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn test_register_returns_token_cookie_and_public_user() {
    let app = app();
    let reply = app
        .send(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({
                "email": "Ada@Example.com",
                "password": "password123",
                "passwordConfirm": "password123",
            })),
        )
        .await;

    assert_eq!(reply.status, StatusCode::CREATED);
    assert_eq!(reply.json["status"], json!("success"));
    assert!(reply.json["token"].as_str().is_some());

    let user = &reply.json["data"]["user"];
    assert_eq!(user["email"], json!("ada@example.com"));
    assert!(user.get("password").is_none());

    let cookie = reply.headers.get(SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cookie.starts_with("jwt="));
    assert!(cookie.contains("HttpOnly"));
}

#[tokio::test]
async fn test_register_rejects_bad_input() {
    let app = app();
    app.register("ada@example.com", "password123").await;

    let duplicate = app
        .send(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({
                "email": "ada@example.com",
                "password": "password123",
                "passwordConfirm": "password123",
            })),
        )
        .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);

    let mismatch = app
        .send(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({
                "email": "alan@example.com",
                "password": "password123",
                "passwordConfirm": "password124",
            })),
        )
        .await;
    assert_eq!(mismatch.status, StatusCode::BAD_REQUEST);

    let bad_email = app
        .send(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({
                "email": "not-an-email",
                "password": "password123",
                "passwordConfirm": "password123",
            })),
        )
        .await;
    assert_eq!(bad_email.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login() {
    let app = app();
    app.register("ada@example.com", "password123").await;

    let ok = app
        .send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "ada@example.com", "password": "password123"})),
        )
        .await;
    assert_eq!(ok.status, StatusCode::OK);
    assert!(ok.json["token"].as_str().is_some());

    let wrong = app
        .send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "ada@example.com", "password": "wrong-password"})),
        )
        .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.json["message"], json!("Incorrect email or password"));

    let missing = app
        .send(Method::POST, "/api/auth/login", None, Some(json!({"email": "ada@example.com"})))
        .await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_protected_routes_need_valid_token() {
    let app = app();

    let anonymous = app.send(Method::GET, "/api/contacts", None, None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
    assert_eq!(anonymous.json["status"], json!("fail"));

    let forged = app.send(Method::GET, "/api/contacts", Some("not.a.jwt"), None).await;
    assert_eq!(forged.status, StatusCode::UNAUTHORIZED);

    let token = app.register("ada@example.com", "password123").await;
    let profile = app.send(Method::GET, "/api/auth/profile", Some(&token), None).await;
    assert_eq!(profile.status, StatusCode::OK);
    assert_eq!(profile.json["data"]["user"]["email"], json!("ada@example.com"));

    let refreshed = app.send(Method::PATCH, "/api/auth/refreshToken", Some(&token), None).await;
    assert_eq!(refreshed.status, StatusCode::OK);
    assert!(refreshed.json["token"].as_str().is_some());
}

#[tokio::test]
async fn test_profile_update() {
    let app = app();
    let token = app.register("ada@example.com", "password123").await;

    let updated = app
        .send(
            Method::POST,
            "/api/auth/profile",
            Some(&token),
            Some(json!({"firstName": "Ada", "username": "countess", "role": "admin"})),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.json["data"]["user"]["firstName"], json!("Ada"));
    assert_eq!(updated.json["data"]["user"]["username"], json!("countess"));
    assert!(updated.json["data"]["user"].get("role").is_none());

    let password = app
        .send(
            Method::POST,
            "/api/auth/profile",
            Some(&token),
            Some(json!({"password": "newpassword1"})),
        )
        .await;
    assert_eq!(password.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_forgot_and_reset_password() {
    let app = app();
    app.register("ada@example.com", "password123").await;

    let unknown = app
        .send(
            Method::POST,
            "/api/auth/forgotPassword",
            None,
            Some(json!({"email": "nobody@example.com"})),
        )
        .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);

    let sent = app
        .send(
            Method::POST,
            "/api/auth/forgotPassword",
            None,
            Some(json!({"email": "ada@example.com"})),
        )
        .await;
    assert_eq!(sent.status, StatusCode::OK);

    let url = app.mailer.last_reset_url().unwrap();
    let path = &url[url.find("/api/auth/resetPassword/").unwrap()..];

    let reset = app
        .send(
            Method::PATCH,
            path,
            None,
            Some(json!({"password": "brandnew123", "passwordConfirm": "brandnew123"})),
        )
        .await;
    assert_eq!(reset.status, StatusCode::OK, "{}", reset.json);
    assert!(reset.json["token"].as_str().is_some());

    // Tokens are single use
    let reused = app
        .send(
            Method::PATCH,
            path,
            None,
            Some(json!({"password": "another123", "passwordConfirm": "another123"})),
        )
        .await;
    assert_eq!(reused.status, StatusCode::BAD_REQUEST);

    let login = app
        .send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "ada@example.com", "password": "brandnew123"})),
        )
        .await;
    assert_eq!(login.status, StatusCode::OK);
}

#[tokio::test]
async fn test_failed_reset_email_is_500() {
    let app = app();
    app.register("ada@example.com", "password123").await;
    app.mailer.set_failing(true);

    let reply = app
        .send(
            Method::POST,
            "/api/auth/forgotPassword",
            None,
            Some(json!({"email": "ada@example.com"})),
        )
        .await;
    assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(reply.json["status"], json!("error"));
}

#[tokio::test]
async fn test_change_password() {
    let app = app();
    let token = app.register("ada@example.com", "password123").await;

    let wrong = app
        .send(
            Method::POST,
            "/api/auth/change-password",
            Some(&token),
            Some(json!({
                "currentPassword": "not-it-at-all",
                "password": "brandnew123",
                "passwordConfirm": "brandnew123",
            })),
        )
        .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);

    let changed = app
        .send(
            Method::POST,
            "/api/auth/change-password",
            Some(&token),
            Some(json!({
                "passwordCurrent": "password123",
                "password": "brandnew123",
                "passwordConfirm": "brandnew123",
            })),
        )
        .await;
    assert_eq!(changed.status, StatusCode::OK, "{}", changed.json);

    let new_token = changed.json["token"].as_str().unwrap();
    let profile = app.send(Method::GET, "/api/auth/profile", Some(new_token), None).await;
    assert_eq!(profile.status, StatusCode::OK);
}

// =============================================================================
// Contacts
// =============================================================================

#[tokio::test]
async fn test_contact_crud() {
    let app = app();
    let token = app.register("owner@example.com", "password123").await;

    let contact = app
        .create_contact(
            &token,
            json!({
                "firstName": "Grace",
                "lastName": "Hopper",
                "email": "grace@example.com",
                "address": {"city": "Arlington"},
                "tags": ["navy", "cobol"],
            }),
        )
        .await;
    let id = contact["_id"].as_str().unwrap();
    assert_eq!(contact["isFavorite"], json!(false));

    let uri = format!("/api/contacts/{id}");
    let fetched = app.send(Method::GET, &uri, Some(&token), None).await;
    assert_eq!(fetched.json["data"]["contact"]["address"]["city"], json!("Arlington"));

    let patched = app
        .send(Method::PATCH, &uri, Some(&token), Some(json!({"company": "US Navy"})))
        .await;
    assert_eq!(patched.status, StatusCode::OK);
    assert_eq!(patched.json["data"]["contact"]["company"], json!("US Navy"));
    assert_eq!(patched.json["data"]["contact"]["lastName"], json!("Hopper"));

    let deleted = app.send(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.json, json!({"status": "success", "data": null}));

    let gone = app.send(Method::GET, &uri, Some(&token), None).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_contact_validation() {
    let app = app();
    let token = app.register("owner@example.com", "password123").await;

    let reply = app
        .send(
            Method::POST,
            "/api/contacts",
            Some(&token),
            Some(json!({"firstName": "No", "lastName": "Email"})),
        )
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    let reply = app
        .send(
            Method::POST,
            "/api/contacts",
            Some(&token),
            Some(json!({"firstName": "A", "lastName": "B", "email": "nope"})),
        )
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.json["message"], json!("Please enter a valid email address"));
}

#[tokio::test]
async fn test_contact_listing_search_and_favorites() {
    let app = app();
    let token = app.register("owner@example.com", "password123").await;

    for (first, company, favorite) in [
        ("Ada", "Analytical", true),
        ("Alan", "Bletchley", false),
        ("Grace", "Navy", false),
    ] {
        app.create_contact(
            &token,
            json!({
                "firstName": first,
                "lastName": "X",
                "email": format!("{}@example.com", first.to_lowercase()),
                "company": company,
                "isFavorite": favorite,
            }),
        )
        .await;
    }

    let list = app
        .send(Method::GET, "/api/contacts?sort=-firstName&fields=firstName", Some(&token), None)
        .await;
    assert_eq!(list.json["results"], json!(3));
    assert_eq!(first_names(&list.json), vec!["Grace", "Alan", "Ada"]);
    assert!(list.json["data"]["contacts"][0].get("company").is_none());

    let search = app
        .send(Method::GET, "/api/contacts/search?company=Navy&isFavorite=true", Some(&token), None)
        .await;
    assert_eq!(search.status, StatusCode::OK);
    assert_eq!(first_names(&search.json), vec!["Grace"]);

    let favorites = app.send(Method::GET, "/api/contacts/favorites", Some(&token), None).await;
    assert_eq!(first_names(&favorites.json), vec!["Ada"]);

    let alan = app.send(Method::GET, "/api/contacts/search?firstName=Alan", Some(&token), None).await;
    let alan_id = alan.json["data"]["contacts"][0]["_id"].as_str().unwrap().to_string();
    let toggled = app
        .send(Method::PATCH, &format!("/api/contacts/{alan_id}/favorite"), Some(&token), None)
        .await;
    assert_eq!(toggled.json["data"]["contact"]["isFavorite"], json!(true));

    let favorites = app
        .send(Method::GET, "/api/contacts/favorites?sort=firstName", Some(&token), None)
        .await;
    assert_eq!(first_names(&favorites.json), vec!["Ada", "Alan"]);
}

// =============================================================================
// Groups
// =============================================================================

#[tokio::test]
async fn test_groups_are_scoped_to_owner() {
    let app = app();
    let owner = app.register("owner@example.com", "password123").await;
    let other = app.register("other@example.com", "password123").await;

    let ada = app
        .create_contact(
            &owner,
            json!({"firstName": "Ada", "lastName": "Lovelace", "email": "ada@example.com", "phone": "555"}),
        )
        .await;

    let created = app
        .send(
            Method::POST,
            "/api/groups",
            Some(&owner),
            Some(json!({"name": "Friends", "color": "#0af", "members": [ada["_id"]]})),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED, "{}", created.json);
    let group = &created.json["data"]["group"];
    assert_eq!(group["members"][0]["firstName"], json!("Ada"));
    assert!(group["members"][0].get("phone").is_none());
    let uri = format!("/api/groups/{}", group["_id"].as_str().unwrap());

    let mine = app.send(Method::GET, "/api/groups", Some(&owner), None).await;
    assert_eq!(mine.json["results"], json!(1));
    let theirs = app.send(Method::GET, "/api/groups", Some(&other), None).await;
    assert_eq!(theirs.json["results"], json!(0));

    let forbidden = app.send(Method::GET, &uri, Some(&other), None).await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);
    assert_eq!(forbidden.json["message"], json!("You can't access this group"));

    let forbidden = app.send(Method::DELETE, &uri, Some(&other), None).await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);

    let renamed = app
        .send(Method::PATCH, &uri, Some(&owner), Some(json!({"name": "Close friends"})))
        .await;
    assert_eq!(renamed.json["data"]["group"]["name"], json!("Close friends"));

    let deleted = app.send(Method::DELETE, &uri, Some(&owner), None).await;
    assert_eq!(deleted.status, StatusCode::OK);
    let missing = app.send(Method::GET, &uri, Some(&owner), None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_group_rules() {
    let app = app();
    let token = app.register("owner@example.com", "password123").await;

    let foreign = app
        .send(
            Method::POST,
            "/api/groups",
            Some(&token),
            Some(json!({"name": "Theirs", "userId": "someone-else"})),
        )
        .await;
    assert_eq!(foreign.status, StatusCode::FORBIDDEN);

    let bad_color = app
        .send(Method::POST, "/api/groups", Some(&token), Some(json!({"name": "G", "color": "red"})))
        .await;
    assert_eq!(bad_color.status, StatusCode::BAD_REQUEST);

    app.send(Method::POST, "/api/groups", Some(&token), Some(json!({"name": "Work"})))
        .await;
    let duplicate = app
        .send(Method::POST, "/api/groups", Some(&token), Some(json!({"name": "Work"})))
        .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);
}

// =============================================================================
// Users
// =============================================================================

#[tokio::test]
async fn test_user_directory_hides_credentials() {
    let app = app();
    let token = app.register("ada@example.com", "password123").await;
    app.register("alan@example.com", "password123").await;

    let reply = app
        .send(Method::GET, "/api/users?sort=email&fields=email,password", Some(&token), None)
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json["results"], json!(2));

    let users = reply.json["data"]["users"].as_array().unwrap();
    assert_eq!(users[0]["email"], json!("ada@example.com"));
    assert!(users.iter().all(|u| u.get("password").is_none()));
}

#[tokio::test]
async fn test_user_directory_refuses_credential_queries() {
    let app = app();
    let token = app.register("ada@example.com", "password123").await;

    for uri in [
        "/api/users?password[gte]=%24argon2id%24",
        "/api/users?passwordResetToken[lt]=z",
        "/api/users?sort=-password",
    ] {
        let reply = app.send(Method::GET, uri, Some(&token), None).await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(reply.json["status"], json!("fail"));
    }
}
