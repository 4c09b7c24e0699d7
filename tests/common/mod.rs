#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use url::Url;

use taskdeck::config::ClientConfig;
use taskdeck::gateway::Gateway;
use taskdeck::session::SessionManager;
use taskdeck::store::{CredentialStore, MemoryStore, StoredCredentials};
use taskdeck::tasks::TaskApi;

pub const TEST_EMAIL: &str = "user@example.com";
pub const TEST_PASSWORD: &str = "secret";
pub const TEST_TOKEN: &str = "test-token-1";
pub const TEST_USER_ID: &str = "1";

/// In-process stub of the task backend: snake_case wire bodies, bearer
/// checks, FastAPI-style `detail` error bodies, 204 on delete.
pub struct TestBackend {
    pub base_url: String,
}

struct StubState {
    tasks: Mutex<HashMap<u64, Value>>,
    next_id: AtomicU64,
}

/// Bind a free port, serve the stub on a background task, and hand back the
/// base URL. Each call gets fresh task state, so tests stay isolated.
pub async fn spawn_backend() -> Result<TestBackend> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind stub backend")?;
    let base_url = format!("http://127.0.0.1:{}", port);

    let state = Arc::new(StubState {
        tasks: Mutex::new(HashMap::new()),
        next_id: AtomicU64::new(1),
    });

    tokio::spawn(async move {
        let _ = axum::serve(listener, app(state)).await;
    });

    Ok(TestBackend { base_url })
}

pub fn test_config(backend: &TestBackend) -> ClientConfig {
    ClientConfig::new(Url::parse(&backend.base_url).unwrap(), "/api/v1")
}

/// Config pointing at a port nothing listens on, for transport-failure tests.
pub fn unreachable_config() -> ClientConfig {
    let port = portpicker::pick_unused_port().expect("failed to pick free port");
    ClientConfig::new(
        Url::parse(&format!("http://127.0.0.1:{}", port)).unwrap(),
        "/api/v1",
    )
}

pub fn session_manager(backend: &TestBackend, store: &MemoryStore) -> SessionManager {
    SessionManager::new(test_config(backend), Arc::new(store.clone()))
}

pub fn gateway(backend: &TestBackend, store: &MemoryStore) -> Gateway {
    Gateway::new(test_config(backend), Arc::new(store.clone()))
}

pub fn task_api(backend: &TestBackend, store: &MemoryStore) -> TaskApi {
    TaskApi::new(gateway(backend, store))
}

/// Store pre-seeded with the credential the stub accepts, skipping login.
pub fn authenticated_store() -> MemoryStore {
    let store = MemoryStore::new();
    store.store(&StoredCredentials::new(
        TEST_TOKEN.into(),
        TEST_USER_ID.into(),
        Some("2099-01-01T00:00:00Z".into()),
    ));
    store
}

fn app(state: Arc<StubState>) -> Router {
    Router::new()
        .route("/api/v1/auth/token", post(auth_token))
        .route("/api/v1/auth/me", get(auth_me))
        .route("/api/v1/auth/register", post(auth_register))
        .route("/api/v1/tasks/", get(task_list).post(task_create))
        .route(
            "/api/v1/tasks/:id",
            get(task_get).put(task_update).delete(task_delete),
        )
        .route("/api/v1/tasks/:id/toggle", axum::routing::patch(task_toggle))
        .route("/api/v1/plain", get(plain_text))
        .route("/api/v1/broken", get(broken))
        .with_state(state)
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"detail": "Not authenticated"})),
    )
        .into_response()
}

fn bearer_ok(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(|value| value == format!("Bearer {}", TEST_TOKEN))
        .unwrap_or(false)
}

async fn auth_token(Json(body): Json<Value>) -> Response {
    let email = body.get("email").and_then(Value::as_str);
    let password = body.get("password").and_then(Value::as_str);

    if email == Some(TEST_EMAIL) && password == Some(TEST_PASSWORD) {
        Json(json!({
            "access_token": TEST_TOKEN,
            "token_type": "bearer",
            "expires_at": "2099-01-01T00:00:00Z"
        }))
        .into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Incorrect email or password"})),
        )
            .into_response()
    }
}

async fn auth_me(headers: HeaderMap) -> Response {
    if !bearer_ok(&headers) {
        return unauthorized();
    }
    Json(json!({
        "id": 1,
        "email": TEST_EMAIL,
        "username": "testuser",
        "is_active": true,
        "created_at": "2026-01-01T00:00:00"
    }))
    .into_response()
}

async fn auth_register(Json(body): Json<Value>) -> Response {
    (
        StatusCode::CREATED,
        Json(json!({
            "id": 2,
            "email": body.get("email").cloned().unwrap_or(Value::Null),
            "username": body.get("username").cloned().unwrap_or(Value::Null),
            "is_active": true,
            "created_at": "2026-01-01T00:00:00"
        })),
    )
        .into_response()
}

fn stub_task(id: u64, body: &Value) -> Value {
    json!({
        "id": id,
        "user_id": 1,
        "title": body.get("title").cloned().unwrap_or(Value::Null),
        "description": body.get("description").cloned().unwrap_or(Value::Null),
        "completed": body.get("completed").cloned().unwrap_or(json!(false)),
        "created_at": "2026-01-01T00:00:00",
        "updated_at": "2026-01-01T00:00:00"
    })
}

async fn task_list(State(state): State<Arc<StubState>>, headers: HeaderMap) -> Response {
    if !bearer_ok(&headers) {
        return unauthorized();
    }
    let tasks = state.tasks.lock().unwrap();
    let mut all: Vec<Value> = tasks.values().cloned().collect();
    all.sort_by_key(|task| task.get("id").and_then(Value::as_u64));
    Json(Value::Array(all)).into_response()
}

async fn task_create(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !bearer_ok(&headers) {
        return unauthorized();
    }
    let id = state.next_id.fetch_add(1, Ordering::SeqCst);
    let task = stub_task(id, &body);
    state.tasks.lock().unwrap().insert(id, task.clone());
    (StatusCode::CREATED, Json(task)).into_response()
}

async fn task_get(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Response {
    if !bearer_ok(&headers) {
        return unauthorized();
    }
    match state.tasks.lock().unwrap().get(&id) {
        Some(task) => Json(task.clone()).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"detail": "Task not found"})),
        )
            .into_response(),
    }
}

async fn task_update(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    Json(body): Json<Value>,
) -> Response {
    if !bearer_ok(&headers) {
        return unauthorized();
    }
    let mut tasks = state.tasks.lock().unwrap();
    match tasks.get_mut(&id) {
        Some(task) => {
            for field in ["title", "description", "completed"] {
                if let Some(value) = body.get(field) {
                    task[field] = value.clone();
                }
            }
            task["updated_at"] = json!("2026-01-02T00:00:00");
            Json(task.clone()).into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"detail": "Task not found"})),
        )
            .into_response(),
    }
}

async fn task_delete(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Response {
    if !bearer_ok(&headers) {
        return unauthorized();
    }
    match state.tasks.lock().unwrap().remove(&id) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"detail": "Task not found"})),
        )
            .into_response(),
    }
}

async fn task_toggle(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Response {
    if !bearer_ok(&headers) {
        return unauthorized();
    }
    let mut tasks = state.tasks.lock().unwrap();
    match tasks.get_mut(&id) {
        Some(task) => {
            let completed = task.get("completed").and_then(Value::as_bool).unwrap_or(false);
            task["completed"] = json!(!completed);
            task["updated_at"] = json!("2026-01-02T00:00:00");
            Json(task.clone()).into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"detail": "Task not found"})),
        )
            .into_response(),
    }
}

async fn plain_text() -> &'static str {
    "pong"
}

async fn broken() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response()
}
