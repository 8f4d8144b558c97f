//! Scripted in-memory backend for tests
//!
//! [`FakeBackend`] keeps a tiny model of the relay (configuration, connected
//! flag, command templates) and answers every call from it. Individual calls
//! can be made to fail or to take a while, and every call is counted.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use jetctl_core::prelude::*;
use jetctl_core::{ActionKey, CommandTemplates, DeviceConfig, Peripheral, Switch};

use crate::backend::DeviceBackend;
use crate::protocol::{
    CommandEcho, CommandMap, ConnectResponse, ExecuteResult, HealthResponse, RemoteLogRecord,
    SaveConfigRequest, SaveConfigResponse, StatusResponse,
};

/// Backend operation, used to key failures, delays and call counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FakeOp {
    GetConfig,
    SaveConfig,
    Status,
    Connect,
    Toggle,
    Shutdown,
    GetCommands,
    SaveCommands,
    Health,
    Execute,
    RemoteLogs,
}

#[derive(Debug, Default)]
struct FakeState {
    config: Option<DeviceConfig>,
    connected: bool,
    commands: CommandMap,
    remote_logs: Vec<RemoteLogRecord>,
    failures: HashMap<FakeOp, VecDeque<Error>>,
    delays: HashMap<FakeOp, Duration>,
    calls: HashMap<FakeOp, usize>,
    toggles: Vec<(Peripheral, Switch)>,
    last_password: Option<String>,
}

/// In-memory [`DeviceBackend`]
#[derive(Debug, Default)]
pub struct FakeBackend {
    state: Mutex<FakeState>,
}

impl FakeBackend {
    /// Backend with no stored configuration
    pub fn new() -> Self {
        let backend = Self::default();
        backend.lock().commands = default_command_map();
        backend
    }

    /// Backend that already holds a configuration
    pub fn configured(host: &str, username: &str, port: u16) -> Self {
        let backend = Self::new();
        backend.lock().config = Some(DeviceConfig {
            host: host.to_string(),
            username: username.to_string(),
            port,
            configured: true,
        });
        backend
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        // A panicking test thread may poison the lock; the data is still usable.
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Set the device-side connected flag reported by `status`
    pub fn set_connected(&self, connected: bool) {
        self.lock().connected = connected;
    }

    pub fn is_connected(&self) -> bool {
        self.lock().connected
    }

    /// Replace the stored command mapping (may include unknown keys)
    pub fn set_commands(&self, commands: CommandMap) {
        self.lock().commands = commands;
    }

    pub fn commands(&self) -> CommandMap {
        self.lock().commands.clone()
    }

    pub fn set_remote_logs(&self, logs: Vec<RemoteLogRecord>) {
        self.lock().remote_logs = logs;
    }

    /// Queue a failure for the next call of `op`
    pub fn fail_next(&self, op: FakeOp, error: Error) {
        self.lock().failures.entry(op).or_default().push_back(error);
    }

    /// Make every call of `op` take `delay` before answering
    pub fn set_delay(&self, op: FakeOp, delay: Duration) {
        self.lock().delays.insert(op, delay);
    }

    pub fn calls(&self, op: FakeOp) -> usize {
        self.lock().calls.get(&op).copied().unwrap_or(0)
    }

    /// Every toggle request received, in order
    pub fn toggles(&self) -> Vec<(Peripheral, Switch)> {
        self.lock().toggles.clone()
    }

    pub fn stored_config(&self) -> Option<DeviceConfig> {
        self.lock().config.clone()
    }

    /// Password from the most recent save call
    pub fn last_password(&self) -> Option<String> {
        self.lock().last_password.clone()
    }

    /// Count the call, then sleep for the configured delay and pop any
    /// scripted failure.
    async fn enter(&self, op: FakeOp) -> Result<()> {
        let delay = {
            let mut state = self.lock();
            *state.calls.entry(op).or_insert(0) += 1;
            state.delays.get(&op).copied()
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let failure = self
            .lock()
            .failures
            .get_mut(&op)
            .and_then(|queue| queue.pop_front());
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn template(&self, key: ActionKey) -> String {
        let state = self.lock();
        state
            .commands
            .get(key.as_str())
            .cloned()
            .unwrap_or_else(|| CommandTemplates::default().get(key).to_string())
    }
}

fn default_command_map() -> CommandMap {
    CommandTemplates::default()
        .iter()
        .map(|(key, command)| (key.as_str().to_string(), command.to_string()))
        .collect()
}

fn echo(command: String) -> CommandEcho {
    CommandEcho {
        command: Some(command),
        status: Some("success".to_string()),
        ..Default::default()
    }
}

impl DeviceBackend for FakeBackend {
    async fn get_config(&self) -> Result<DeviceConfig> {
        self.enter(FakeOp::GetConfig).await?;
        Ok(self.lock().config.clone().unwrap_or_else(DeviceConfig::unconfigured))
    }

    async fn save_config(&self, request: SaveConfigRequest) -> Result<SaveConfigResponse> {
        self.enter(FakeOp::SaveConfig).await?;
        let mut state = self.lock();
        state.config = Some(DeviceConfig {
            host: request.host,
            username: request.username,
            port: request.port,
            configured: true,
        });
        state.last_password = Some(request.password);
        state.connected = false;
        Ok(SaveConfigResponse {
            message: Some("Configuration saved successfully".to_string()),
            configured: Some(true),
        })
    }

    async fn status(&self) -> Result<StatusResponse> {
        self.enter(FakeOp::Status).await?;
        let state = self.lock();
        Ok(StatusResponse {
            connected: state.connected,
            configured: Some(state.config.is_some()),
            host: state.config.as_ref().map(|c| c.host.clone()),
            error: None,
        })
    }

    async fn connect(&self) -> Result<ConnectResponse> {
        self.enter(FakeOp::Connect).await?;
        let mut state = self.lock();
        if state.config.is_none() {
            return Err(Error::backend(400, "SSH not configured"));
        }
        state.connected = true;
        Ok(ConnectResponse {
            success: Some(true),
            message: Some("Connected successfully".to_string()),
            output: Some("Connection successful".to_string()),
        })
    }

    async fn toggle(&self, peripheral: Peripheral, switch: Switch) -> Result<CommandEcho> {
        self.lock().toggles.push((peripheral, switch));
        self.enter(FakeOp::Toggle).await?;
        if !self.is_connected() {
            return Err(Error::backend(400, "Not connected. Please connect first."));
        }
        Ok(echo(self.template(ActionKey::for_toggle(peripheral, switch))))
    }

    async fn shutdown(&self) -> Result<CommandEcho> {
        self.enter(FakeOp::Shutdown).await?;
        if !self.is_connected() {
            return Err(Error::backend(400, "Not connected. Please connect first."));
        }
        let command = self.template(ActionKey::Shutdown);
        self.set_connected(false);
        Ok(echo(command))
    }

    async fn get_commands(&self) -> Result<CommandMap> {
        self.enter(FakeOp::GetCommands).await?;
        Ok(self.commands())
    }

    async fn save_commands(&self, templates: &CommandTemplates) -> Result<()> {
        let map = templates
            .iter()
            .map(|(key, command)| (key.as_str().to_string(), command.to_string()))
            .collect();
        self.enter(FakeOp::SaveCommands).await?;
        self.set_commands(map);
        Ok(())
    }

    async fn health(&self) -> Result<HealthResponse> {
        self.enter(FakeOp::Health).await?;
        Ok(HealthResponse {
            status: "healthy".to_string(),
        })
    }

    async fn execute(&self, command: &str) -> Result<ExecuteResult> {
        let command = command.to_string();
        self.enter(FakeOp::Execute).await?;
        if !self.is_connected() {
            return Err(Error::backend(400, "SSH not configured"));
        }
        self.lock().remote_logs.insert(
            0,
            RemoteLogRecord {
                command: command.clone(),
                output: format!("ran {}", command),
                error: String::new(),
                exit_status: Some(0),
                timestamp: None,
            },
        );
        Ok(ExecuteResult {
            success: true,
            output: format!("ran {}", command),
            error: String::new(),
        })
    }

    async fn remote_logs(&self, limit: usize) -> Result<Vec<RemoteLogRecord>> {
        self.enter(FakeOp::RemoteLogs).await?;
        Ok(self.lock().remote_logs.iter().take(limit).cloned().collect())
    }
}
