//! reqwest implementation of [`DeviceBackend`]

use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use url::Url;

use jetctl_core::prelude::*;
use jetctl_core::{CommandTemplates, DeviceConfig, Peripheral, Switch};

use crate::backend::DeviceBackend;
use crate::protocol::{
    CommandEcho, CommandMap, ConfigResponse, ConnectResponse, ControlRequest, ErrorDetail,
    ExecuteRequest, ExecuteResult, HealthResponse, RemoteLogRecord, RemoteLogs, SaveConfigRequest,
    SaveConfigResponse, StatusResponse,
};

/// Default backend address
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8001";

/// Transport settings for [`HttpBackend`]
#[derive(Debug, Clone)]
pub struct HttpBackendConfig {
    pub base_url: String,
    /// Whole-request timeout
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for HttpBackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BACKEND_URL.to_string(),
            request_timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

/// Check that `raw` is an absolute http(s) URL.
pub fn validate_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| Error::config_invalid(format!("backend url '{}': {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(Error::config_invalid(format!(
            "backend url '{}': unsupported scheme '{}'",
            raw, other
        ))),
    }
}

/// HTTP client for the backend relay
#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &HttpBackendConfig) -> Result<Self> {
        validate_base_url(&config.base_url)?;
        let http = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        trace!("GET {}", url);
        let resp = self.http.get(&url).send().await.map_err(transport)?;
        parse(resp, path).await
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&(impl serde::Serialize + ?Sized)>,
    ) -> Result<T> {
        let url = self.url(path);
        trace!("POST {}", url);
        let mut req = self.http.post(&url);
        if let Some(body) = body {
            req = req.json(body);
        }
        let resp = req.send().await.map_err(transport)?;
        parse(resp, path).await
    }
}

fn transport(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::transport(format!("request timed out: {}", e))
    } else {
        Error::transport(e.to_string())
    }
}

/// Map non-2xx to [`Error::Backend`] with the `detail` text, else decode `T`.
async fn parse<T: DeserializeOwned>(resp: Response, label: &str) -> Result<T> {
    let status = resp.status();
    let body = resp.text().await.map_err(transport)?;

    if !status.is_success() {
        let detail = serde_json::from_str::<ErrorDetail>(&body)
            .map(|d| d.message())
            .unwrap_or_else(|_| {
                let text = body.trim();
                if text.is_empty() {
                    status.canonical_reason().unwrap_or("request failed").to_string()
                } else {
                    text.to_string()
                }
            });
        debug!("{} -> {}: {}", label, status.as_u16(), detail);
        return Err(Error::backend(status.as_u16(), detail));
    }

    serde_json::from_str(&body).map_err(|e| Error::decode(format!("{}: {}", label, e)))
}

fn reject_device_failure(echo: CommandEcho) -> Result<CommandEcho> {
    match echo.device_failure() {
        Some(reason) => Err(Error::backend(200, reason)),
        None => Ok(echo),
    }
}

impl DeviceBackend for HttpBackend {
    async fn get_config(&self) -> Result<DeviceConfig> {
        let resp: ConfigResponse = self.get("config").await?;
        Ok(resp.into_device_config())
    }

    async fn save_config(&self, request: SaveConfigRequest) -> Result<SaveConfigResponse> {
        self.post("config", Some(&request)).await
    }

    async fn status(&self) -> Result<StatusResponse> {
        self.get("status").await
    }

    async fn connect(&self) -> Result<ConnectResponse> {
        let resp: ConnectResponse = self.post("connect", None::<&()>).await?;
        if resp.success == Some(false) {
            let reason = resp
                .message
                .clone()
                .unwrap_or_else(|| "Connection failed".to_string());
            return Err(Error::backend(200, reason));
        }
        Ok(resp)
    }

    async fn toggle(&self, peripheral: Peripheral, switch: Switch) -> Result<CommandEcho> {
        let body = ControlRequest { action: switch };
        let echo: CommandEcho = self.post(peripheral.endpoint(), Some(&body)).await?;
        reject_device_failure(echo)
    }

    async fn shutdown(&self) -> Result<CommandEcho> {
        let echo: CommandEcho = self.post("shutdown", None::<&()>).await?;
        reject_device_failure(echo)
    }

    async fn get_commands(&self) -> Result<CommandMap> {
        self.get("commands").await
    }

    async fn save_commands(&self, templates: &CommandTemplates) -> Result<()> {
        let _: serde_json::Value = self.post("commands", Some(templates)).await?;
        Ok(())
    }

    async fn health(&self) -> Result<HealthResponse> {
        self.get("health").await
    }

    async fn execute(&self, command: &str) -> Result<ExecuteResult> {
        let body = ExecuteRequest {
            command: command.to_string(),
        };
        self.post("execute", Some(&body)).await
    }

    async fn remote_logs(&self, limit: usize) -> Result<Vec<RemoteLogRecord>> {
        let logs: RemoteLogs = self.get(&format!("logs?limit={}", limit)).await?;
        Ok(logs.logs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::collections::HashMap;

    async fn serve(router: Router) -> HttpBackend {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        HttpBackend::new(&HttpBackendConfig {
            base_url: format!("http://{}/", addr),
            request_timeout: Duration::from_secs(2),
            connect_timeout: Duration::from_secs(1),
        })
        .unwrap()
    }

    #[test]
    fn test_validate_base_url() {
        assert!(validate_base_url("http://localhost:8001").is_ok());
        assert!(validate_base_url("https://relay.example.com/").is_ok());
        assert!(validate_base_url("ftp://relay").is_err());
        assert!(validate_base_url("not a url").is_err());
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        let backend = HttpBackend::new(&HttpBackendConfig {
            base_url: "http://10.0.0.1:8001/".into(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(backend.base_url(), "http://10.0.0.1:8001");
        assert_eq!(backend.url("status"), "http://10.0.0.1:8001/api/status");
    }

    #[tokio::test]
    async fn test_get_config_configured() {
        let router = Router::new().route(
            "/api/config",
            get(|| async {
                Json(json!({"configured": true, "host": "192.168.1.50", "username": "jetson", "port": 22}))
            }),
        );
        let backend = serve(router).await;

        let config = backend.get_config().await.unwrap();
        assert!(config.configured);
        assert_eq!(config.host, "192.168.1.50");
        assert_eq!(config.username, "jetson");
        assert_eq!(config.port, 22);
    }

    #[tokio::test]
    async fn test_save_config_sends_password_once() {
        let router = Router::new().route(
            "/api/config",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["password"], "secret");
                assert_eq!(body["port"], 2222);
                Json(json!({"message": "Configuration saved successfully", "configured": true}))
            }),
        );
        let backend = serve(router).await;

        let resp = backend
            .save_config(SaveConfigRequest {
                host: "10.0.0.2".into(),
                username: "jetson".into(),
                password: "secret".into(),
                port: 2222,
            })
            .await
            .unwrap();
        assert_eq!(resp.configured, Some(true));
    }

    #[tokio::test]
    async fn test_backend_detail_is_verbatim() {
        let router = Router::new().route(
            "/api/connect",
            post(|| async {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({"detail": "Authentication failed. Check username/password."})),
                )
            }),
        );
        let backend = serve(router).await;

        let err = backend.connect().await.unwrap_err();
        match err {
            Error::Backend { status, ref detail } => {
                assert_eq!(status, 401);
                assert_eq!(detail, "Authentication failed. Check username/password.");
            }
            other => panic!("expected backend error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_json_error_body() {
        let router = Router::new().route(
            "/api/status",
            get(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
        );
        let backend = serve(router).await;

        let err = backend.status().await.unwrap_err();
        assert!(matches!(err, Error::Backend { status: 502, ref detail } if detail == "upstream down"));
    }

    #[tokio::test]
    async fn test_malformed_status_is_decode_error() {
        let router = Router::new().route("/api/status", get(|| async { "not json" }));
        let backend = serve(router).await;

        let err = backend.status().await.unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let backend = HttpBackend::new(&HttpBackendConfig {
            base_url: format!("http://{}", addr),
            request_timeout: Duration::from_secs(1),
            connect_timeout: Duration::from_millis(500),
        })
        .unwrap();

        let err = backend.status().await.unwrap_err();
        assert!(matches!(err, Error::Transport { .. }));
    }

    #[tokio::test]
    async fn test_toggle_posts_action_and_returns_echo() {
        let router = Router::new().route(
            "/api/camera",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body, json!({"action": "on"}));
                Json(json!({"command": "nohup python3 /home/camera_script.py > /dev/null 2>&1 &"}))
            }),
        );
        let backend = serve(router).await;

        let echo = backend.toggle(Peripheral::Camera, Switch::On).await.unwrap();
        assert_eq!(
            echo.command.as_deref(),
            Some("nohup python3 /home/camera_script.py > /dev/null 2>&1 &")
        );
    }

    #[tokio::test]
    async fn test_toggle_device_failure_is_error() {
        let router = Router::new().route(
            "/api/fan",
            post(|| async {
                Json(json!({"status": "success", "action": "on", "result": {"success": false, "output": "", "error": "Permission denied"}}))
            }),
        );
        let backend = serve(router).await;

        let err = backend.toggle(Peripheral::Fan, Switch::On).await.unwrap_err();
        assert_eq!(err.operator_message(), "Permission denied");
    }

    #[tokio::test]
    async fn test_commands_round_trip() {
        let router = Router::new().route(
            "/api/commands",
            get(|| async { Json(json!({"fan_on": "fanctl 1", "extra": "ignored later"})) })
                .post(|Json(body): Json<Value>| async move {
                    assert_eq!(body.as_object().unwrap().len(), 7);
                    Json(json!({"message": "saved"}))
                }),
        );
        let backend = serve(router).await;

        let map = backend.get_commands().await.unwrap();
        assert_eq!(map.get("fan_on").map(String::as_str), Some("fanctl 1"));
        backend
            .save_commands(&CommandTemplates::default())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_remote_logs_passes_limit() {
        let router = Router::new().route(
            "/api/logs",
            get(|Query(q): Query<HashMap<String, String>>| async move {
                assert_eq!(q.get("limit").map(String::as_str), Some("3"));
                Json(json!({"logs": [{"command": "uptime", "output": "up", "error": "", "exit_status": 0}]}))
            }),
        );
        let backend = serve(router).await;

        let logs = backend.remote_logs(3).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].command, "uptime");
    }

    #[tokio::test]
    async fn test_health_and_execute() {
        let router = Router::new()
            .route("/api/health", get(|| async { Json(json!({"status": "healthy"})) }))
            .route(
                "/api/execute",
                post(|Json(body): Json<Value>| async move {
                    Json(json!({"success": true, "output": format!("ran {}", body["command"].as_str().unwrap()), "error": ""}))
                }),
            );
        let backend = serve(router).await;

        assert!(backend.health().await.unwrap().is_healthy());
        let result = backend.execute("uptime").await.unwrap();
        assert!(result.success);
        assert_eq!(result.output, "ran uptime");
    }
}
