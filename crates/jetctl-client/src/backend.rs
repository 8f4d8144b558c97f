//! Backend relay operations
//!
//! This module provides the DeviceBackend trait the session state machine
//! talks to. The HTTP client implements it for production; tests use the
//! scripted fake in `test_utils`.

use jetctl_core::prelude::*;
use jetctl_core::{CommandTemplates, DeviceConfig, Peripheral, Switch};

use crate::protocol::{
    CommandEcho, CommandMap, ConnectResponse, ExecuteResult, HealthResponse, RemoteLogRecord,
    SaveConfigRequest, SaveConfigResponse, StatusResponse,
};

/// Operations offered by the backend relay.
///
/// Every method maps to one request. Implementations enforce their own
/// timeouts; a timeout is reported like any other transport failure.
#[trait_variant::make(DeviceBackend: Send)]
pub trait LocalDeviceBackend {
    /// `GET /api/config`. "No configuration" is `Ok` with `configured == false`.
    async fn get_config(&self) -> Result<DeviceConfig>;

    /// `POST /api/config`
    async fn save_config(&self, request: SaveConfigRequest) -> Result<SaveConfigResponse>;

    /// `GET /api/status`
    async fn status(&self) -> Result<StatusResponse>;

    /// `POST /api/connect`
    async fn connect(&self) -> Result<ConnectResponse>;

    /// `POST /api/{peripheral}`. A device-side command failure is an error.
    async fn toggle(&self, peripheral: Peripheral, switch: Switch) -> Result<CommandEcho>;

    /// `POST /api/shutdown`
    async fn shutdown(&self) -> Result<CommandEcho>;

    /// `GET /api/commands`, raw so unknown keys can be filtered by the caller
    async fn get_commands(&self) -> Result<CommandMap>;

    /// `POST /api/commands`, full replace
    async fn save_commands(&self, templates: &CommandTemplates) -> Result<()>;

    /// `GET /api/health`
    async fn health(&self) -> Result<HealthResponse>;

    /// `POST /api/execute`
    async fn execute(&self, command: &str) -> Result<ExecuteResult>;

    /// `GET /api/logs?limit=N`, newest first
    async fn remote_logs(&self, limit: usize) -> Result<Vec<RemoteLogRecord>>;
}
