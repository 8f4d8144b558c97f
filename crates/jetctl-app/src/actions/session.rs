//! Configuration, status, template and history requests

use std::sync::Arc;

use tracing::{debug, warn};

use jetctl_client::{DeviceBackend, SaveConfigRequest};
use jetctl_core::{CommandTemplates, DeviceConfig};

use crate::message::Message;
use crate::stores::saved_config;

/// Any failure reads as "not configured"
pub(super) async fn load_config<B: DeviceBackend + Sync>(backend: Arc<B>) -> Message {
    let config = match backend.get_config().await {
        Ok(config) => config,
        Err(e) => {
            warn!("Could not load configuration, treating as unconfigured: {}", e);
            DeviceConfig::unconfigured()
        }
    };
    Message::ConfigLoaded { config }
}

/// The request, and with it the password, is dropped when this returns
pub(super) async fn save_config<B: DeviceBackend + Sync>(
    backend: Arc<B>,
    request: SaveConfigRequest,
) -> Message {
    let config = saved_config(&request);
    match backend.save_config(request).await {
        Ok(resp) => {
            debug!(
                "Configuration saved: {}",
                resp.message.as_deref().unwrap_or("ok")
            );
            Message::ConfigSaved { config }
        }
        Err(e) => Message::ConfigSaveFailed {
            reason: e.operator_message(),
        },
    }
}

pub(super) async fn check_status<B: DeviceBackend + Sync>(backend: Arc<B>, epoch: u64) -> Message {
    match backend.status().await {
        Ok(status) => {
            if let Some(error) = &status.error {
                debug!("Backend status reported error: {}", error);
            }
            Message::StatusChecked {
                epoch,
                connected: status.connected,
                error: None,
            }
        }
        Err(e) => Message::StatusChecked {
            epoch,
            connected: false,
            error: Some(e.to_string()),
        },
    }
}

pub(super) async fn connect<B: DeviceBackend + Sync>(backend: Arc<B>) -> Message {
    match backend.connect().await {
        Ok(resp) => {
            if let Some(output) = resp.output.as_deref().filter(|o| !o.is_empty()) {
                debug!("Connect output: {}", output);
            }
            Message::ConnectSucceeded {
                message: resp.message,
            }
        }
        Err(e) => Message::ConnectFailed {
            reason: e.operator_message(),
        },
    }
}

pub(super) async fn load_commands<B: DeviceBackend + Sync>(backend: Arc<B>) -> Message {
    match backend.get_commands().await {
        Ok(commands) => Message::CommandsLoaded { commands },
        Err(e) => Message::CommandsLoadFailed {
            reason: e.to_string(),
        },
    }
}

pub(super) async fn save_commands<B: DeviceBackend + Sync>(
    backend: Arc<B>,
    templates: CommandTemplates,
) -> Message {
    match backend.save_commands(&templates).await {
        Ok(()) => Message::CommandsSaved { templates },
        Err(e) => Message::CommandsSaveFailed {
            reason: e.operator_message(),
        },
    }
}

pub(super) async fn check_health<B: DeviceBackend + Sync>(backend: Arc<B>) -> Message {
    match backend.health().await {
        Ok(health) => Message::HealthChecked {
            healthy: health.is_healthy(),
            detail: health.status,
        },
        Err(e) => Message::HealthChecked {
            healthy: false,
            detail: e.to_string(),
        },
    }
}

pub(super) async fn remote_history<B: DeviceBackend + Sync>(backend: Arc<B>, limit: usize) -> Message {
    match backend.remote_logs(limit).await {
        Ok(records) => Message::RemoteHistoryLoaded { records },
        Err(e) => Message::RemoteHistoryFailed {
            reason: e.operator_message(),
        },
    }
}
