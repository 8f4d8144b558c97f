//! Session lifecycle handlers
//!
//! Configuration load/save, connect, status polling, shutdown and screen
//! routing. Explicit operations bump `AppState::epoch` on start and on
//! resolution so that a status result issued before them is discarded.

use tracing::{debug, trace, warn};

use jetctl_core::{ActionKey, AppPhase, ConnectionState, DeviceConfig, Password};

use crate::confirm_dialog::ConfirmDialogState;
use crate::message::Message;
use crate::state::{AppState, NoticeLevel, Screen, ShutdownPhase};
use crate::stores::ConfigStore;

use super::{UpdateAction, UpdateResult};

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Route on the backend's configuration.
///
/// Becoming configured starts polling with an immediate check. Losing the
/// configuration stops polling and returns to Unconfigured.
pub fn handle_config_loaded(state: &mut AppState, config: DeviceConfig) -> UpdateResult {
    let first_load = state.phase == AppPhase::Initializing;
    if first_load {
        state.phase = AppPhase::Running;
    }
    let was_configured = state.connection.is_configured();

    if config.configured {
        state.config.apply_loaded(config);
        if was_configured {
            return UpdateResult::none();
        }
        state.set_connection(ConnectionState::Disconnected);
        restart_status_checks(state);
        if first_load {
            state.screen = Screen::Dashboard;
        }
        return UpdateResult::action_then(UpdateAction::StartPolling, Message::PollTick);
    }

    state.config.apply_loaded(config);
    if first_load {
        state.screen = Screen::Configuration;
    }
    if !was_configured {
        return UpdateResult::none();
    }

    warn!("Backend no longer has a device configuration, stopping status polling");
    end_session(state, ConnectionState::Unconfigured);
    state.initial_check_pending = false;
    state.screen = Screen::Configuration;
    state.notify(
        NoticeLevel::Warning,
        "Not configured",
        "The backend has no device configuration",
    );
    UpdateResult::action(UpdateAction::StopPolling)
}

/// Arm the immediate check that follows becoming configured. A check still
/// outstanding from before is stale by epoch and must not block it.
fn restart_status_checks(state: &mut AppState) {
    state.bump_epoch();
    state.status_check_in_flight = false;
    state.initial_check_pending = true;
}

pub fn handle_save_configuration(
    state: &mut AppState,
    host: &str,
    username: &str,
    password: Password,
    port: u16,
) -> UpdateResult {
    if state.connection == ConnectionState::Connecting || state.shutdown == ShutdownPhase::InFlight
    {
        state.notify(
            NoticeLevel::Warning,
            "Busy",
            "Wait for the current device operation to finish",
        );
        return UpdateResult::none();
    }
    if state.config.saving {
        debug!("Configuration save already in flight");
        return UpdateResult::none();
    }

    match ConfigStore::prepare_save(host, username, password, port) {
        Ok(request) => {
            state.config.saving = true;
            state.bump_epoch();
            UpdateResult::action(UpdateAction::SaveConfig { request })
        }
        Err(e) => {
            debug!("Rejected configuration input: {}", e);
            state.notify(
                NoticeLevel::Warning,
                "Please fill all fields",
                e.operator_message(),
            );
            UpdateResult::none()
        }
    }
}

/// A save never auto-connects; it lands in Disconnected and re-checks status.
pub fn handle_config_saved(state: &mut AppState, config: DeviceConfig) -> UpdateResult {
    state.bump_epoch();
    let target = config.target();
    state.config.apply_saved(config);
    end_session(state, ConnectionState::Disconnected);
    restart_status_checks(state);
    state.screen = Screen::Dashboard;

    state.log.append("Configuration saved");
    state.notify(
        NoticeLevel::Success,
        "Configuration saved",
        format!("Saved {}. Now connect.", target),
    );
    UpdateResult::action_then(UpdateAction::StartPolling, Message::PollTick)
}

pub fn handle_config_save_failed(state: &mut AppState, reason: String) -> UpdateResult {
    state.bump_epoch();
    state.config.saving = false;
    state.notify(NoticeLevel::Error, "Save failed", reason);
    UpdateResult::none()
}

// ─────────────────────────────────────────────────────────────────────────────
// Connect
// ─────────────────────────────────────────────────────────────────────────────

pub fn handle_connect(state: &mut AppState) -> UpdateResult {
    match state.connection {
        ConnectionState::Disconnected if state.config.saving => {
            state.notify(
                NoticeLevel::Warning,
                "Busy",
                "Wait for the configuration save to finish",
            );
            UpdateResult::none()
        }
        ConnectionState::Disconnected => {
            state.set_connection(ConnectionState::Connecting);
            state.bump_epoch();
            state.initial_check_pending = false;
            UpdateResult::action(UpdateAction::Connect)
        }
        ConnectionState::Connecting => {
            debug!("Connect already in flight, ignoring");
            UpdateResult::none()
        }
        ConnectionState::Connected => {
            state.notify(NoticeLevel::Info, "Connected", "Already connected to the device");
            UpdateResult::none()
        }
        ConnectionState::Unconfigured => {
            state.notify(
                NoticeLevel::Warning,
                "Not configured",
                "Save the device configuration first",
            );
            UpdateResult::none()
        }
    }
}

pub fn handle_connect_succeeded(state: &mut AppState, message: Option<String>) -> UpdateResult {
    if state.connection != ConnectionState::Connecting {
        debug!("Ignoring connect success in state {}", state.connection);
        return UpdateResult::none();
    }
    state.bump_epoch();
    state.set_connection(ConnectionState::Connected);
    let target = state.config.config().target();
    state.log.append(format!("Connected to {}", target));
    state.notify(
        NoticeLevel::Success,
        "Connected",
        message.unwrap_or_else(|| "Connected to device".to_string()),
    );
    UpdateResult::none()
}

pub fn handle_connect_failed(state: &mut AppState, reason: String) -> UpdateResult {
    if state.connection != ConnectionState::Connecting {
        debug!("Ignoring connect failure in state {}", state.connection);
        return UpdateResult::none();
    }
    state.bump_epoch();
    state.set_connection(ConnectionState::Disconnected);
    state.log.append(format!("Connection failed: {}", reason));
    state.notify(NoticeLevel::Error, "Connection Failed", reason);
    UpdateResult::none()
}

// ─────────────────────────────────────────────────────────────────────────────
// Status Polling
// ─────────────────────────────────────────────────────────────────────────────

/// Issue a status check unless one is pointless or would race an explicit
/// operation.
pub fn handle_poll_tick(state: &mut AppState) -> UpdateResult {
    if !state.connection.is_configured() {
        trace!("Poll tick ignored: unconfigured");
        return UpdateResult::none();
    }
    if state.status_check_in_flight {
        trace!("Poll tick ignored: status check outstanding");
        return UpdateResult::none();
    }
    if state.explicit_operation_in_flight() {
        trace!("Poll tick ignored: explicit operation in flight");
        return UpdateResult::none();
    }
    state.status_check_in_flight = true;
    UpdateResult::action(UpdateAction::CheckStatus { epoch: state.epoch })
}

/// Apply a status result.
///
/// Only the initial check may promote Disconnected to Connected. Any check
/// may demote Connected to Disconnected. Failures count as not connected and
/// are never shown to the operator.
pub fn handle_status_checked(
    state: &mut AppState,
    epoch: u64,
    connected: bool,
    error: Option<String>,
) -> UpdateResult {
    state.status_check_in_flight = false;
    if let Some(error) = error {
        debug!("Status check failed: {}", error);
    }
    if epoch != state.epoch {
        debug!(
            "Discarding status result from epoch {} (current {})",
            epoch, state.epoch
        );
        return UpdateResult::none();
    }
    if !state.connection.is_configured() {
        return UpdateResult::none();
    }

    let initial = std::mem::take(&mut state.initial_check_pending);
    match (state.connection, connected) {
        (ConnectionState::Disconnected, true) if initial => {
            state.set_connection(ConnectionState::Connected);
        }
        (ConnectionState::Disconnected, true) => {
            trace!("Backend reports a live session; waiting for an explicit connect");
        }
        (ConnectionState::Connected, false) => disconnect_observed(state),
        _ => {}
    }
    UpdateResult::none()
}

fn disconnect_observed(state: &mut AppState) {
    warn!("Status poll reports the device is no longer connected");
    end_session(state, ConnectionState::Disconnected);
    state.log.append("Connection to device lost");
}

/// Leave the connected session: cancel a pending shutdown confirmation and
/// drop queued toggles. Peripheral flags keep their last confirmed values.
fn end_session(state: &mut AppState, next: ConnectionState) {
    if state.shutdown == ShutdownPhase::AwaitingConfirmation {
        state.shutdown = ShutdownPhase::Idle;
        state.confirm_dialog = None;
    }
    state.toggles.drop_queued();
    state.set_connection(next);
}

// ─────────────────────────────────────────────────────────────────────────────
// Shutdown
// ─────────────────────────────────────────────────────────────────────────────

pub fn handle_request_shutdown(state: &mut AppState) -> UpdateResult {
    if !state.connection.is_connected() {
        state.notify(NoticeLevel::Warning, "Not connected", "Device not connected");
        return UpdateResult::none();
    }
    if state.shutdown != ShutdownPhase::Idle {
        debug!("Shutdown already {:?}", state.shutdown);
        return UpdateResult::none();
    }
    let target = state.config.config().target();
    state.confirm_dialog = Some(ConfirmDialogState::shutdown_confirmation(&target));
    state.shutdown = ShutdownPhase::AwaitingConfirmation;
    UpdateResult::none()
}

pub fn handle_confirm_shutdown(state: &mut AppState) -> UpdateResult {
    if state.shutdown != ShutdownPhase::AwaitingConfirmation {
        debug!("No shutdown awaiting confirmation");
        return UpdateResult::none();
    }
    state.confirm_dialog = None;
    if !state.connection.is_connected() {
        state.shutdown = ShutdownPhase::Idle;
        state.notify(NoticeLevel::Warning, "Not connected", "Device not connected");
        return UpdateResult::none();
    }
    state.shutdown = ShutdownPhase::InFlight;
    state.bump_epoch();
    UpdateResult::action(UpdateAction::Shutdown)
}

pub fn handle_cancel_shutdown(state: &mut AppState) -> UpdateResult {
    if state.shutdown == ShutdownPhase::AwaitingConfirmation {
        state.shutdown = ShutdownPhase::Idle;
        state.confirm_dialog = None;
        debug!("Shutdown cancelled");
    }
    UpdateResult::none()
}

pub fn handle_shutdown_completed(state: &mut AppState, command: Option<String>) -> UpdateResult {
    let command = command.unwrap_or_else(|| state.commands.get(ActionKey::Shutdown).to_string());
    state.bump_epoch();
    state.shutdown = ShutdownPhase::Idle;
    if state.connection.is_connected() {
        end_session(state, ConnectionState::Disconnected);
    }
    state.log.append(format!("Shutdown: {}", command));
    state.notify(NoticeLevel::Success, "Shutdown", "Shutdown command sent");
    UpdateResult::none()
}

pub fn handle_shutdown_failed(state: &mut AppState, reason: String) -> UpdateResult {
    state.bump_epoch();
    state.shutdown = ShutdownPhase::Idle;
    state.log.append(format!("Shutdown failed: {}", reason));
    state.notify(NoticeLevel::Error, "Shutdown Failed", reason);
    UpdateResult::none()
}

// ─────────────────────────────────────────────────────────────────────────────
// Screens
// ─────────────────────────────────────────────────────────────────────────────

pub fn show_screen(state: &mut AppState, screen: Screen) -> UpdateResult {
    if state.screen != screen {
        debug!("Screen: {} -> {}", state.screen.label(), screen.label());
        state.screen = screen;
    }
    UpdateResult::none()
}
