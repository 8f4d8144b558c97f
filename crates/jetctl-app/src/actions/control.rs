//! Toggle, shutdown and execute requests

use std::sync::Arc;

use jetctl_client::{CommandEcho, DeviceBackend};
use jetctl_core::{Peripheral, Switch};

use crate::message::Message;

/// Text of the command the backend ran, if it said
fn echoed_command(echo: CommandEcho) -> Option<String> {
    echo.command.filter(|c| !c.trim().is_empty())
}

pub(super) async fn toggle<B: DeviceBackend + Sync>(
    backend: Arc<B>,
    peripheral: Peripheral,
    switch: Switch,
) -> Message {
    match backend.toggle(peripheral, switch).await {
        Ok(echo) => Message::ToggleCompleted {
            peripheral,
            switch,
            command: echoed_command(echo),
        },
        Err(e) => Message::ToggleFailed {
            peripheral,
            switch,
            reason: e.operator_message(),
        },
    }
}

pub(super) async fn shutdown<B: DeviceBackend + Sync>(backend: Arc<B>) -> Message {
    match backend.shutdown().await {
        Ok(echo) => Message::ShutdownCompleted {
            command: echoed_command(echo),
        },
        Err(e) => Message::ShutdownFailed {
            reason: e.operator_message(),
        },
    }
}

pub(super) async fn execute<B: DeviceBackend + Sync>(backend: Arc<B>, command: String) -> Message {
    match backend.execute(&command).await {
        Ok(result) => Message::CommandExecuted { command, result },
        Err(e) => Message::ExecuteFailed {
            command,
            reason: e.operator_message(),
        },
    }
}
