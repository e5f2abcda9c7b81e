//! Integration test helpers
//!
//! Spins up an in-process mock of the LMS REST API on a random port and
//! wires a client context against it.

#![allow(dead_code)]

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use lms_client::{AuthBackend, ClientContext, HttpAuthBackend, KeyValueStore, MemoryStore};
use lms_core::LmsConfig;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::{Arc, LazyLock, Mutex};
use tokio::net::TcpListener;

// Make sure tracing is only initialised once
static TRACING: LazyLock<()> = LazyLock::new(|| {
    let level = if std::env::var("TEST_LOG").is_ok() {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_test_writer()
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
});

pub const PASSWORD: &str = "secret";

#[derive(Debug, Clone)]
pub struct Account {
    pub id: &'static str,
    pub username: &'static str,
    pub email: &'static str,
    pub role: &'static str,
    pub token: &'static str,
}

pub const ADMIN: Account = Account {
    id: "u-admin",
    username: "root",
    email: "admin@x.com",
    role: "admin",
    token: "tok-admin",
};

pub const TEACHER: Account = Account {
    id: "1",
    username: "a",
    email: "a@x.com",
    role: "teacher",
    token: "tok",
};

pub const STUDENT: Account = Account {
    id: "u-student",
    username: "sam",
    email: "sam@x.com",
    role: "student",
    token: "tok-student",
};

/// Recorded state of the mock server
#[derive(Debug, Default)]
pub struct MockData {
    pub revoked: HashSet<String>,
    pub registered: Vec<Value>,
    pub deleted: Vec<String>,
    pub enrolled: HashSet<String>,
    pub zoom_links: Vec<(String, Value)>,
    pub login_calls: usize,
    pub authorized_calls: usize,
}

#[derive(Clone, Default)]
pub struct MockState {
    pub data: Arc<Mutex<MockData>>,
}

impl MockState {
    pub fn revoke(&self, token: &str) {
        self.data.lock().unwrap().revoked.insert(token.to_string());
    }

    fn authorize(&self, headers: &HeaderMap, roles: &[&str]) -> Result<Account, Response> {
        let token = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::to_string);

        let mut data = self.data.lock().unwrap();
        data.authorized_calls += 1;

        let account = token
            .filter(|t| !data.revoked.contains(t))
            .and_then(|t| [ADMIN, TEACHER, STUDENT].into_iter().find(|a| a.token == t));

        match account {
            None => Err(error(StatusCode::UNAUTHORIZED, "Invalid token")),
            Some(account) if !roles.contains(&account.role) => {
                Err(error(StatusCode::FORBIDDEN, "Access denied"))
            }
            Some(account) => Ok(account),
        }
    }
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn course(id: &str, name: &str, code: &str) -> Value {
    json!({
        "_id": id,
        "courseName": name,
        "courseCode": code,
        "teacher": { "username": TEACHER.username },
        "zoomLinks": [
            { "_id": format!("{id}-z1"), "date": "2024-03-01T09:00:00Z", "link": "https://zoom.us/j/1" }
        ]
    })
}

async fn login(State(state): State<MockState>, Json(body): Json<Value>) -> Response {
    state.data.lock().unwrap().login_calls += 1;

    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();

    match email {
        "garbled@x.com" => return (StatusCode::OK, "<html>oops</html>").into_response(),
        "silent@x.com" => return StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        "tokenless@x.com" => {
            return Json(json!({
                "user": { "_id": "9", "username": "t", "email": email, "role": "student" },
                "token": ""
            }))
            .into_response()
        }
        _ => {}
    }

    match [ADMIN, TEACHER, STUDENT]
        .into_iter()
        .find(|a| a.email == email && password == PASSWORD)
    {
        Some(account) => Json(json!({
            "user": {
                "_id": account.id,
                "username": account.username,
                "email": account.email,
                "role": account.role
            },
            "token": account.token
        }))
        .into_response(),
        None => error(StatusCode::UNAUTHORIZED, "Invalid credentials"),
    }
}

async fn ping() -> Json<Value> {
    Json(json!({ "message": "Backend is connected" }))
}

async fn register(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(response) = state.authorize(&headers, &["admin"]) {
        return response;
    }
    if body["email"] == ADMIN.email {
        return error(StatusCode::BAD_REQUEST, "User already exists");
    }
    state.data.lock().unwrap().registered.push(body);
    (
        StatusCode::CREATED,
        Json(json!({ "message": "User created successfully" })),
    )
        .into_response()
}

async fn list_users(State(state): State<MockState>, headers: HeaderMap) -> Response {
    if let Err(response) = state.authorize(&headers, &["admin"]) {
        return response;
    }
    let users: Vec<Value> = [ADMIN, TEACHER, STUDENT]
        .into_iter()
        .map(|a| json!({ "_id": a.id, "username": a.username, "email": a.email, "role": a.role }))
        .collect();
    Json(Value::Array(users)).into_response()
}

async fn delete_user(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if let Err(response) = state.authorize(&headers, &["admin"]) {
        return response;
    }
    state.data.lock().unwrap().deleted.push(id);
    StatusCode::NO_CONTENT.into_response()
}

async fn teacher_courses(State(state): State<MockState>, headers: HeaderMap) -> Response {
    if let Err(response) = state.authorize(&headers, &["admin", "teacher"]) {
        return response;
    }
    Json(json!([course("c1", "Algebra", "MATH101")])).into_response()
}

async fn add_zoom_link(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(course_id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    if let Err(response) = state.authorize(&headers, &["admin", "teacher"]) {
        return response;
    }
    if course_id != "c1" {
        return error(StatusCode::NOT_FOUND, "Course not found");
    }
    state.data.lock().unwrap().zoom_links.push((course_id, body));
    (StatusCode::CREATED, Json(json!({ "message": "Zoom link added" }))).into_response()
}

async fn student_courses(State(state): State<MockState>, headers: HeaderMap) -> Response {
    if let Err(response) = state.authorize(&headers, &["admin", "teacher", "student"]) {
        return response;
    }
    let data = state.data.lock().unwrap();
    let mine: Vec<Value> = data
        .enrolled
        .iter()
        .map(|id| course(id, "Enrolled course", "ENR"))
        .collect();
    Json(Value::Array(mine)).into_response()
}

async fn available_courses(State(state): State<MockState>, headers: HeaderMap) -> Response {
    if let Err(response) = state.authorize(&headers, &["admin", "teacher", "student"]) {
        return response;
    }
    Json(json!([course("c1", "Algebra", "MATH101"), course("c2", "Biology", "BIO200")]))
        .into_response()
}

async fn course_details(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(course_id): Path<String>,
) -> Response {
    if let Err(response) = state.authorize(&headers, &["admin", "teacher", "student"]) {
        return response;
    }
    match course_id.as_str() {
        "c1" => Json(course("c1", "Algebra", "MATH101")).into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn enroll(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(course_id): Path<String>,
) -> Response {
    if let Err(response) = state.authorize(&headers, &["student"]) {
        return response;
    }
    let mut data = state.data.lock().unwrap();
    if !data.enrolled.insert(course_id) {
        return error(StatusCode::BAD_REQUEST, "Already enrolled in this course");
    }
    Json(json!({ "message": "Successfully enrolled" })).into_response()
}

fn router(state: MockState) -> Router {
    Router::new()
        .route("/api/test", get(ping))
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        .route("/api/auth/admin", get(list_users))
        .route("/api/auth/admin/{id}", delete(delete_user))
        .route("/api/auth/teacher/courses", get(teacher_courses))
        .route(
            "/api/auth/teacher/courses/{id}/zoom-links",
            post(add_zoom_link),
        )
        .route("/api/auth/student/courses", get(student_courses))
        .route("/api/auth/student/available-courses", get(available_courses))
        .route("/api/auth/student/courses/{id}", get(course_details))
        .route("/api/auth/student/courses/{id}/enroll", post(enroll))
        .with_state(state)
}

/// Test application instance
pub struct TestApp {
    pub address: String,
    pub state: MockState,
}

impl TestApp {
    pub fn config(&self) -> LmsConfig {
        let mut config = LmsConfig::default();
        config.api.base_url = self.address.clone();
        config.api.timeout_seconds = 5;
        config
    }

    /// A fresh client context over `storage`, as if the process just started
    pub fn context_with(&self, storage: Arc<MemoryStore>) -> ClientContext {
        let config = self.config();
        let backend: Arc<dyn AuthBackend> =
            Arc::new(HttpAuthBackend::new(&config.api).expect("backend"));
        let storage: Arc<dyn KeyValueStore> = storage;
        ClientContext::with_parts(&config, storage, backend).expect("client context")
    }

    pub fn context(&self) -> (ClientContext, Arc<MemoryStore>) {
        let storage = Arc::new(MemoryStore::new());
        (self.context_with(storage.clone()), storage)
    }
}

/// Start the mock API
pub async fn spawn_app() -> TestApp {
    LazyLock::force(&TRACING);

    let state = MockState::default();
    let app = router(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        state,
    }
}
