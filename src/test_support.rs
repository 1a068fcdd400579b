//! In-process mock backend and recording collaborators for async tests.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::Json;
use axum::http::{HeaderMap, StatusCode, header::AUTHORIZATION};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use serde_json::{Value, json};

use crate::config::{ClientConfig, Timeouts};
use crate::router::Navigator;
use crate::state::session::{SessionStore, StorageKeys};
use crate::state::storage::MemoryStorage;

pub const GOOD_PASSWORD: &str = "secret";
pub const ISSUED_TOKEN: &str = "issued-token";
pub const TAKEN_EMAIL: &str = "taken@example.com";

/// Navigator that records every forced redirect.
#[derive(Default)]
pub struct RecordingNavigator {
    paths: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn paths(&self) -> Vec<String> {
        self.paths.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Navigator for RecordingNavigator {
    fn redirect(&self, path: &str) {
        self.paths
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.to_owned());
    }

    fn current_path(&self) -> String {
        self.paths
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
            .unwrap_or_else(|| "/".to_owned())
    }
}

pub fn memory_store() -> Arc<SessionStore> {
    Arc::new(SessionStore::new(Arc::new(MemoryStorage::new()), StorageKeys::default()))
}

pub fn test_config(base_url: &str) -> ClientConfig {
    ClientConfig {
        api_base_url: base_url.to_owned(),
        timeouts: Timeouts { request: Duration::from_millis(300), connect: Duration::from_secs(1) },
        ..ClientConfig::default()
    }
}

/// Start the mock backend on an ephemeral port and return its base URL.
pub async fn spawn_backend() -> String {
    let app = axum::Router::new()
        .route("/auth/test-login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/me", get(me))
        .route("/v1/users/me", put(update_me))
        .route("/echo-auth", get(echo_auth))
        .route("/unauthorized", get(unauthorized))
        .route("/boom", get(boom))
        .route("/slow", get(slow))
        .route("/empty", get(empty));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn server_user() -> Value {
    json!({
        "id": 7,
        "email": "alice@example.com",
        "full_name": "Alice",
        "is_active": true,
        "is_superuser": false,
    })
}

fn has_issued_token(headers: &HeaderMap) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {ISSUED_TOKEN}"))
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["password"] != GOOD_PASSWORD {
        return detail(StatusCode::BAD_REQUEST, "Incorrect email or password");
    }
    let email = body["email"].as_str().unwrap_or_default().to_owned();
    let role = if email.starts_with("admin") { "admin" } else { "user" };
    Json(json!({
        "access_token": ISSUED_TOKEN,
        "token_type": "bearer",
        "user_id": 7,
        "email": email,
        "role": role,
        "name": "Alice",
    }))
    .into_response()
}

async fn register(Json(body): Json<Value>) -> Response {
    if body["email"] == TAKEN_EMAIL {
        return detail(StatusCode::BAD_REQUEST, "Email already registered");
    }
    if body["password"] != body["confirm_password"] {
        return detail(StatusCode::BAD_REQUEST, "Passwords do not match");
    }
    (StatusCode::CREATED, Json(server_user())).into_response()
}

async fn me(headers: HeaderMap) -> Response {
    if !has_issued_token(&headers) {
        return detail(StatusCode::UNAUTHORIZED, "Could not validate credentials");
    }
    let mut user = server_user();
    user["full_name"] = json!("Alice Server");
    Json(user).into_response()
}

async fn update_me(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !has_issued_token(&headers) {
        return detail(StatusCode::UNAUTHORIZED, "Could not validate credentials");
    }
    let mut user = server_user();
    for field in ["email", "full_name"] {
        if let Some(value) = body.get(field) {
            user[field] = value.clone();
        }
    }
    Json(user).into_response()
}

async fn echo_auth(headers: HeaderMap) -> Json<Value> {
    let auth = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    Json(json!({ "authorization": auth }))
}

async fn unauthorized() -> Response {
    detail(StatusCode::UNAUTHORIZED, "Token expired")
}

async fn boom() -> Response {
    detail(StatusCode::INTERNAL_SERVER_ERROR, "boom")
}

async fn slow() -> Json<Value> {
    tokio::time::sleep(Duration::from_secs(2)).await;
    Json(json!({ "ok": true }))
}

async fn empty() -> StatusCode {
    StatusCode::NO_CONTENT
}
