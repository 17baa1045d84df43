//! An in-process stand-in for the Podcast Muse REST backend.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use client_lib::config::Config;
use client_lib::pages::{AppState, SessionStore};
use serde_json::{json, Value};
use tempfile::TempDir;
use uuid::Uuid;

pub const RESET_TOKEN: &str = "reset-token-123";

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Value,
}

#[derive(Default)]
pub struct MockState {
    pub users: Vec<Value>,
    pub projects: Vec<Value>,
    pub tokens: HashMap<String, String>,
    pub requests: Vec<Recorded>,
}

type Shared = Arc<Mutex<MockState>>;
type Reply = (StatusCode, Json<Value>);

pub struct MockBackend {
    pub base_url: String,
    pub state: Shared,
}

impl MockBackend {
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(MockState::default()));
        let router = Router::new()
            .route("/api/v1/auth/login", post(login))
            .route("/api/v1/auth/register", post(register))
            .route("/api/v1/auth/forgot-password", post(forgot_password))
            .route("/api/v1/auth/reset-password", post(reset_password))
            .route("/api/v1/users/me", get(me))
            .route("/api/v1/projects", get(list_projects).post(create_project))
            .route("/api/v1/projects/{id}", put(update_project))
            .route("/api/v1/admin/users", get(admin_users))
            .route("/api/v1/admin/users/{id}", put(admin_update_user).delete(admin_delete_user))
            .route("/api/v1/admin/stats", get(admin_stats))
            .route("/api/v1/admin/add-credits", post(admin_add_credits))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    pub fn seed_user(&self, email: &str, password: &str, credits: i64, is_admin: bool) -> Uuid {
        let id = Uuid::new_v4();
        self.state.lock().unwrap().users.push(json!({
            "id": id.to_string(),
            "email": email,
            "password": password,
            "first_name": "Test",
            "last_name": "User",
            "credits": credits,
            "is_admin": is_admin,
            "created_at": "2024-03-01 12:00:00",
        }));
        id
    }

    pub fn user(&self, email: &str) -> Option<Value> {
        self.state
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|u| u["email"] == email)
            .cloned()
    }

    pub fn projects(&self) -> Vec<Value> {
        self.state.lock().unwrap().projects.clone()
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn requests_to(&self, method: Method, path_prefix: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path.starts_with(path_prefix))
            .collect()
    }

    /// A client wired to this backend with its own empty storage file.
    pub async fn client(&self) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::for_backend(&self.base_url, dir.path().join("storage.json"));
        let app = AppState::from_config(Arc::new(config)).unwrap();
        let session = Arc::new(SessionStore::new(&app));
        Harness {
            app,
            session,
            _dir: dir,
        }
    }
}

pub struct Harness {
    pub app: AppState,
    pub session: Arc<SessionStore>,
    _dir: TempDir,
}

//=========================================================================================
// Handlers
//=========================================================================================

fn record(state: &Shared, method: Method, path: String, headers: &HeaderMap, body: &Value) {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    state.lock().unwrap().requests.push(Recorded {
        method,
        path,
        authorization: header("authorization"),
        content_type: header("content-type"),
        body: body.clone(),
    });
}

fn detail(status: StatusCode, detail: &str) -> Reply {
    (status, Json(json!({ "detail": detail })))
}

fn public(user: &Value) -> Value {
    let mut user = user.clone();
    if let Some(obj) = user.as_object_mut() {
        obj.remove("password");
    }
    user
}

/// Index of the user the bearer token belongs to.
fn caller(state: &MockState, headers: &HeaderMap) -> Option<usize> {
    let token = headers
        .get("authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")?;
    let user_id = state.tokens.get(token)?;
    state.users.iter().position(|u| u["id"] == user_id.as_str())
}

fn require_admin(state: &MockState, headers: &HeaderMap) -> Result<usize, Reply> {
    let idx = caller(state, headers).ok_or_else(|| detail(StatusCode::UNAUTHORIZED, "Not authenticated"))?;
    if state.users[idx]["is_admin"] == true {
        Ok(idx)
    } else {
        Err(detail(StatusCode::FORBIDDEN, "Admin access required"))
    }
}

async fn login(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    record(&state, Method::POST, "/api/v1/auth/login".into(), &headers, &body);
    let mut s = state.lock().unwrap();
    let found = s
        .users
        .iter()
        .find(|u| u["email"] == body["email"] && u["password"] == body["password"])
        .cloned();
    match found {
        Some(user) => {
            let token = format!("token-{}", Uuid::new_v4().simple());
            let id = user["id"].as_str().unwrap_or_default().to_string();
            s.tokens.insert(token.clone(), id);
            (
                StatusCode::OK,
                Json(json!({
                    "access_token": token,
                    "token_type": "bearer",
                    "expires_in": 86400,
                    "user": public(&user),
                })),
            )
        }
        None => detail(StatusCode::UNAUTHORIZED, "Incorrect email or password"),
    }
}

async fn register(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    record(&state, Method::POST, "/api/v1/auth/register".into(), &headers, &body);
    let mut s = state.lock().unwrap();
    if s.users.iter().any(|u| u["email"] == body["email"]) {
        return detail(StatusCode::BAD_REQUEST, "Email already registered");
    }
    let user = json!({
        "id": Uuid::new_v4().to_string(),
        "email": body["email"],
        "password": body["password"],
        "first_name": body.get("first_name").cloned().unwrap_or(Value::Null),
        "last_name": body.get("last_name").cloned().unwrap_or(Value::Null),
        "credits": 100,
        "is_admin": false,
        "created_at": "",
    });
    s.users.push(user.clone());
    (StatusCode::OK, Json(public(&user)))
}

async fn forgot_password(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    record(&state, Method::POST, "/api/v1/auth/forgot-password".into(), &headers, &body);
    let known = state.lock().unwrap().users.iter().any(|u| u["email"] == body["email"]);
    if !known {
        return (
            StatusCode::OK,
            Json(json!({ "message": "If the email exists, a reset link has been sent" })),
        );
    }
    (
        StatusCode::OK,
        Json(json!({
            "message": "Password reset token generated",
            "reset_token": RESET_TOKEN,
            "expires_at": "2030-01-01T00:00:00",
        })),
    )
}

async fn reset_password(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    record(&state, Method::POST, "/api/v1/auth/reset-password".into(), &headers, &body);
    if body["token"] != RESET_TOKEN {
        return detail(StatusCode::BAD_REQUEST, "Invalid or expired reset token");
    }
    (StatusCode::OK, Json(json!({ "message": "Password reset successfully" })))
}

async fn me(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    record(&state, Method::GET, "/api/v1/users/me".into(), &headers, &Value::Null);
    let s = state.lock().unwrap();
    match caller(&s, &headers) {
        Some(idx) => (StatusCode::OK, Json(public(&s.users[idx]))),
        None => detail(StatusCode::UNAUTHORIZED, "Not authenticated"),
    }
}

async fn list_projects(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    record(&state, Method::GET, "/api/v1/projects".into(), &headers, &Value::Null);
    let s = state.lock().unwrap();
    let Some(idx) = caller(&s, &headers) else {
        return detail(StatusCode::UNAUTHORIZED, "Not authenticated");
    };
    let owner = s.users[idx]["id"].clone();
    let projects: Vec<Value> = s
        .projects
        .iter()
        .filter(|p| p["user_id"] == owner)
        .cloned()
        .collect();
    (StatusCode::OK, Json(Value::Array(projects)))
}

async fn create_project(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    record(&state, Method::POST, "/api/v1/projects".into(), &headers, &body);
    let mut s = state.lock().unwrap();
    let Some(idx) = caller(&s, &headers) else {
        return detail(StatusCode::UNAUTHORIZED, "Not authenticated");
    };
    let project = json!({
        "id": Uuid::new_v4().to_string(),
        "user_id": s.users[idx]["id"],
        "title": body["title"],
        "description": body.get("description").cloned().unwrap_or(Value::Null),
        "status": "draft",
        "script_content": null,
        "total_credits_used": 0,
        "created_at": "2024-03-01 12:00:00",
    });
    s.projects.push(project.clone());
    (StatusCode::OK, Json(project))
}

async fn update_project(
    State(state): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    record(&state, Method::PUT, format!("/api/v1/projects/{id}"), &headers, &body);
    let mut s = state.lock().unwrap();
    let Some(caller_idx) = caller(&s, &headers) else {
        return detail(StatusCode::UNAUTHORIZED, "Not authenticated");
    };
    let Some(project) = s.projects.iter_mut().find(|p| p["id"] == id.as_str()) else {
        return detail(StatusCode::NOT_FOUND, "Project not found");
    };

    let mut charged = 0;
    if let (Some(target), Some(fields)) = (project.as_object_mut(), body.as_object()) {
        for (key, value) in fields {
            target.insert(key.clone(), value.clone());
        }
        charged = fields.get("total_credits_used").and_then(Value::as_i64).unwrap_or(0);
    }
    let updated = project.clone();

    // The real backend charges the owner when the usage is recorded.
    let credits = s.users[caller_idx]["credits"].as_i64().unwrap_or(0);
    s.users[caller_idx]["credits"] = json!(credits - charged);
    (StatusCode::OK, Json(updated))
}

async fn admin_users(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    record(&state, Method::GET, "/api/v1/admin/users".into(), &headers, &Value::Null);
    let s = state.lock().unwrap();
    if let Err(reply) = require_admin(&s, &headers) {
        return reply;
    }
    let users: Vec<Value> = s.users.iter().map(public).collect();
    (StatusCode::OK, Json(Value::Array(users)))
}

async fn admin_stats(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    record(&state, Method::GET, "/api/v1/admin/stats".into(), &headers, &Value::Null);
    let s = state.lock().unwrap();
    if let Err(reply) = require_admin(&s, &headers) {
        return reply;
    }
    let admins = s.users.iter().filter(|u| u["is_admin"] == true).count();
    let completed = s.projects.iter().filter(|p| p["status"] == "completed").count();
    let credits: i64 = s.users.iter().filter_map(|u| u["credits"].as_i64()).sum();
    (
        StatusCode::OK,
        Json(json!({
            "users": { "total": s.users.len(), "admins": admins, "regular_users": s.users.len() - admins },
            "credits": { "total_distributed": credits },
            "projects": { "total": s.projects.len(), "completed": completed, "in_progress": s.projects.len() - completed },
            "recent_users": s.users.iter().take(5).map(|u| json!({
                "email": u["email"],
                "name": format!("{} {}", u["first_name"].as_str().unwrap_or(""), u["last_name"].as_str().unwrap_or("")),
                "joined": u["created_at"],
            })).collect::<Vec<_>>(),
        })),
    )
}

async fn admin_update_user(
    State(state): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    record(&state, Method::PUT, format!("/api/v1/admin/users/{id}"), &headers, &body);
    let mut s = state.lock().unwrap();
    if let Err(reply) = require_admin(&s, &headers) {
        return reply;
    }
    let Some(user) = s.users.iter_mut().find(|u| u["id"] == id.as_str()) else {
        return detail(StatusCode::NOT_FOUND, "User not found");
    };
    if let Some(is_admin) = body.get("is_admin").and_then(Value::as_bool) {
        user["is_admin"] = json!(is_admin);
    }
    if let Some(credits) = body.get("credits").and_then(Value::as_i64) {
        user["credits"] = json!(credits);
    }
    (StatusCode::OK, Json(json!({ "message": "User updated successfully" })))
}

async fn admin_delete_user(State(state): State<Shared>, Path(id): Path<String>, headers: HeaderMap) -> Reply {
    record(&state, Method::DELETE, format!("/api/v1/admin/users/{id}"), &headers, &Value::Null);
    let mut s = state.lock().unwrap();
    let caller_idx = match require_admin(&s, &headers) {
        Ok(idx) => idx,
        Err(reply) => return reply,
    };
    if s.users[caller_idx]["id"] == id.as_str() {
        return detail(StatusCode::BAD_REQUEST, "Cannot delete your own account");
    }
    let before = s.users.len();
    s.users.retain(|u| u["id"] != id.as_str());
    if s.users.len() == before {
        return detail(StatusCode::NOT_FOUND, "User not found");
    }
    (StatusCode::OK, Json(json!({ "message": "User deleted successfully" })))
}

async fn admin_add_credits(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    record(&state, Method::POST, "/api/v1/admin/add-credits".into(), &headers, &body);
    let mut s = state.lock().unwrap();
    if let Err(reply) = require_admin(&s, &headers) {
        return reply;
    }
    let amount = body["credits"].as_i64().unwrap_or(0);
    let Some(user) = s.users.iter_mut().find(|u| u["id"] == body["user_id"]) else {
        return detail(StatusCode::NOT_FOUND, "User not found");
    };
    let previous = user["credits"].as_i64().unwrap_or(0);
    user["credits"] = json!(previous + amount);
    (
        StatusCode::OK,
        Json(json!({
            "message": format!("Added {amount} credits"),
            "previous_credits": previous,
            "new_credits": previous + amount,
            "transaction_id": Uuid::new_v4().to_string(),
        })),
    )
}
