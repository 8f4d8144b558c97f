//! Wire types for the backend relay's JSON API
//!
//! Responses are decoded leniently: optional fields default and unknown
//! fields are ignored, so a richer backend never breaks the client.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use jetctl_core::{DeviceConfig, Switch, DEFAULT_SSH_PORT};

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// `GET /api/config`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigResponse {
    #[serde(default)]
    pub configured: bool,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
}

impl ConfigResponse {
    /// Convert to the domain value.
    ///
    /// A response that claims `configured` but lacks a host or username is
    /// treated as unconfigured.
    pub fn into_device_config(self) -> DeviceConfig {
        if !self.configured {
            return DeviceConfig::unconfigured();
        }
        let host = self.host.unwrap_or_default();
        let username = self.username.unwrap_or_default();
        let port = self.port.unwrap_or(DEFAULT_SSH_PORT);
        match DeviceConfig::configured(host, username, port) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Backend reported an incomplete configuration ({}), treating as unconfigured", e);
                DeviceConfig::unconfigured()
            }
        }
    }
}

/// `POST /api/config` body. The only place the password ever exists.
#[derive(Clone, Serialize)]
pub struct SaveConfigRequest {
    pub host: String,
    pub username: String,
    pub password: String,
    pub port: u16,
}

impl std::fmt::Debug for SaveConfigRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaveConfigRequest")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("port", &self.port)
            .finish()
    }
}

/// `POST /api/config` success body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SaveConfigResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub configured: Option<bool>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Session
// ─────────────────────────────────────────────────────────────────────────────

/// `GET /api/status`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusResponse {
    pub connected: bool,
    #[serde(default)]
    pub configured: Option<bool>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// `POST /api/connect` success body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConnectResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub output: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Control
// ─────────────────────────────────────────────────────────────────────────────

/// `POST /api/{fan|camera|lights}` body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ControlRequest {
    pub action: Switch,
}

/// Result of running a command on the device
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub output: String,
    #[serde(default)]
    pub error: String,
}

impl ExecuteResult {
    /// Reason shown when the device reports the command failed
    pub fn failure_reason(&self) -> String {
        let stderr = self.error.trim();
        if stderr.is_empty() {
            "Command failed on device".to_string()
        } else {
            stderr.to_string()
        }
    }
}

/// Success body for toggles and shutdown.
///
/// `command` is the literal remote command the backend ran. Older backends
/// only return the nested `result`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommandEcho {
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub result: Option<ExecuteResult>,
}

impl CommandEcho {
    /// `Some(reason)` when the backend answered 200 but the device-side
    /// command itself failed.
    pub fn device_failure(&self) -> Option<String> {
        match &self.result {
            Some(result) if !result.success => Some(result.failure_reason()),
            _ => None,
        }
    }
}

/// `POST /api/execute` body
#[derive(Debug, Clone, Serialize)]
pub struct ExecuteRequest {
    pub command: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Misc
// ─────────────────────────────────────────────────────────────────────────────

/// Non-2xx body
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorDetail {
    pub detail: serde_json::Value,
}

impl ErrorDetail {
    /// `detail` as text; validation errors arrive as structured JSON.
    pub fn message(&self) -> String {
        match &self.detail {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// `GET /api/health`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HealthResponse {
    #[serde(default)]
    pub status: String,
}

impl HealthResponse {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}

/// `GET /api/commands` body: loosely-typed so unknown keys can be dropped
pub type CommandMap = HashMap<String, String>;

/// One entry of the backend's command audit trail
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteLogRecord {
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub output: String,
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub exit_status: Option<i32>,
    /// ISO-8601 text as sent by the backend
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// `GET /api/logs?limit=N`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemoteLogs {
    #[serde(default)]
    pub logs: Vec<RemoteLogRecord>,
}
