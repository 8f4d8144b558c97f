//! In-process mock of the SSH relay backend
//!
//! Mirrors the relay's routes and response shapes. Toggle and shutdown
//! responses carry the device result but no command echo, like the real relay.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

/// Password the mock rejects with an authentication failure
pub const BAD_PASSWORD: &str = "wrong";

#[derive(Debug, Default)]
pub struct MockState {
    pub config: Option<(String, String, u16, String)>,
    pub connected: bool,
    pub commands: HashMap<String, String>,
    pub executed: Vec<String>,
    pub toggles: Vec<(String, String)>,
    pub shutdowns: usize,
}

#[derive(Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
}

type Shared = Arc<Mutex<MockState>>;

fn detail(status: StatusCode, detail: &str) -> Response {
    (status, Json(json!({ "detail": detail }))).into_response()
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(host: &str, username: &str, port: u16, password: &str) -> Self {
        let mock = Self::new();
        mock.state().config = Some((
            host.to_string(),
            username.to_string(),
            port,
            password.to_string(),
        ));
        mock
    }

    pub fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    /// Bind to an ephemeral port and return the base URL
    pub async fn serve(&self) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let router = self.router();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn router(&self) -> Router {
        Router::new()
            .route("/api/health", get(|| async { Json(json!({"status": "healthy"})) }))
            .route("/api/config", get(get_config).post(save_config))
            .route("/api/connect", post(connect))
            .route("/api/status", get(status))
            .route(
                "/api/fan",
                post(|s: State<Shared>, b: Json<Value>| toggle(s, "fan", b)),
            )
            .route(
                "/api/camera",
                post(|s: State<Shared>, b: Json<Value>| toggle(s, "camera", b)),
            )
            .route(
                "/api/lights",
                post(|s: State<Shared>, b: Json<Value>| toggle(s, "lights", b)),
            )
            .route("/api/shutdown", post(shutdown))
            .route("/api/commands", get(get_commands).post(save_commands))
            .route("/api/execute", post(execute))
            .route("/api/logs", get(logs))
            .with_state(self.state.clone())
    }
}

async fn get_config(State(state): State<Shared>) -> Json<Value> {
    let state = state.lock().unwrap();
    match &state.config {
        Some((host, username, port, _)) => Json(json!({
            "host": host,
            "username": username,
            "port": port,
            "configured": true,
        })),
        None => Json(json!({"configured": false})),
    }
}

async fn save_config(State(state): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    let mut state = state.lock().unwrap();
    state.config = Some((
        body["host"].as_str().unwrap_or_default().to_string(),
        body["username"].as_str().unwrap_or_default().to_string(),
        body["port"].as_u64().unwrap_or(22) as u16,
        body["password"].as_str().unwrap_or_default().to_string(),
    ));
    state.connected = false;
    Json(json!({"message": "Configuration saved successfully", "configured": true}))
}

async fn connect(State(state): State<Shared>) -> Response {
    let mut state = state.lock().unwrap();
    let Some((host, _, _, password)) = state.config.clone() else {
        return detail(StatusCode::BAD_REQUEST, "SSH not configured");
    };
    if password == BAD_PASSWORD {
        return detail(
            StatusCode::UNAUTHORIZED,
            "Authentication failed. Check username/password.",
        );
    }
    state.connected = true;
    Json(json!({
        "success": true,
        "message": format!("Connected to {}", host),
        "output": "Connection successful",
    }))
    .into_response()
}

async fn status(State(state): State<Shared>) -> Json<Value> {
    let state = state.lock().unwrap();
    Json(json!({
        "connected": state.connected,
        "configured": state.config.is_some(),
        "host": state.config.as_ref().map(|c| c.0.clone()),
    }))
}

async fn toggle(State(state): State<Shared>, name: &'static str, Json(body): Json<Value>) -> Response {
    let mut state = state.lock().unwrap();
    if !state.connected {
        return detail(StatusCode::BAD_REQUEST, "Not connected. Please connect first.");
    }
    let action = body["action"].as_str().unwrap_or_default().to_string();
    state.toggles.push((name.to_string(), action.clone()));
    Json(json!({
        "status": "success",
        "action": action,
        "result": {"success": true, "output": "", "error": ""},
    }))
    .into_response()
}

async fn shutdown(State(state): State<Shared>) -> Response {
    let mut state = state.lock().unwrap();
    if !state.connected {
        return detail(StatusCode::BAD_REQUEST, "Not connected. Please connect first.");
    }
    state.shutdowns += 1;
    state.connected = false;
    Json(json!({
        "status": "success",
        "message": "Shutdown command sent",
        "result": {"success": true, "output": "", "error": ""},
    }))
    .into_response()
}

async fn get_commands(State(state): State<Shared>) -> Json<Value> {
    Json(json!(state.lock().unwrap().commands))
}

async fn save_commands(State(state): State<Shared>, Json(body): Json<HashMap<String, String>>) -> Json<Value> {
    state.lock().unwrap().commands = body;
    Json(json!({"message": "Commands saved successfully"}))
}

async fn execute(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut state = state.lock().unwrap();
    if state.config.is_none() {
        return detail(StatusCode::BAD_REQUEST, "SSH not configured");
    }
    let command = body["command"].as_str().unwrap_or_default().to_string();
    state.executed.push(command.clone());
    Json(json!({"success": true, "output": format!("ran {}\n", command), "error": ""}))
        .into_response()
}

async fn logs(
    State(state): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    let limit = query
        .get("limit")
        .and_then(|l| l.parse::<usize>().ok())
        .unwrap_or(50);
    let state = state.lock().unwrap();
    let logs: Vec<Value> = state
        .executed
        .iter()
        .rev()
        .take(limit)
        .map(|c| json!({"command": c, "output": format!("ran {}\n", c), "error": "", "exit_status": 0}))
        .collect();
    Json(json!({ "logs": logs }))
}
