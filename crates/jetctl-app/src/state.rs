//! Application state (Model in TEA pattern)

use std::collections::BTreeMap;

use chrono::{DateTime, Local};
use serde::Serialize;

use jetctl_client::RemoteLogRecord;
use jetctl_core::{AppPhase, ConnectionState, OperationLog, Peripheral, PeripheralStates, Switch};

use crate::confirm_dialog::ConfirmDialogState;
use crate::stores::{CommandTemplateStore, ConfigStore};

/// Which screen the operator is looking at. Never affects the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    /// Connection parameter entry
    #[default]
    Configuration,
    /// Command template editor
    Commands,
    /// Peripheral controls and log
    Dashboard,
}

impl Screen {
    pub fn label(&self) -> &'static str {
        match self {
            Screen::Configuration => "configuration",
            Screen::Commands => "commands",
            Screen::Dashboard => "dashboard",
        }
    }
}

/// Progress of the two-phase shutdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShutdownPhase {
    #[default]
    Idle,
    /// Operator asked; waiting for confirm or cancel
    AwaitingConfirmation,
    /// Confirmed; request sent
    InFlight,
}

// ─────────────────────────────────────────────────────────────────────────────
// Notices
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Operator-facing alert produced by a state transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            message: message.into(),
        }
    }
}

/// A toggle that was just sent, with the command the operator expects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartedAction {
    pub peripheral: Peripheral,
    pub switch: Switch,
    /// Cached template for the action key
    pub command: String,
}

/// Last backend health probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendHealth {
    pub healthy: bool,
    pub detail: String,
    pub checked_at: DateTime<Local>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Toggle Tracking
// ─────────────────────────────────────────────────────────────────────────────

/// Per-peripheral in-flight toggles and the coalesced follow-up request.
#[derive(Debug, Clone, Default)]
pub struct ToggleTracker {
    in_flight: BTreeMap<Peripheral, Switch>,
    queued: BTreeMap<Peripheral, Switch>,
}

impl ToggleTracker {
    pub fn in_flight(&self, peripheral: Peripheral) -> Option<Switch> {
        self.in_flight.get(&peripheral).copied()
    }

    pub fn queued(&self, peripheral: Peripheral) -> Option<Switch> {
        self.queued.get(&peripheral).copied()
    }

    pub fn any_in_flight(&self) -> bool {
        !self.in_flight.is_empty()
    }

    pub fn begin(&mut self, peripheral: Peripheral, switch: Switch) {
        self.in_flight.insert(peripheral, switch);
    }

    /// Keep only the latest desired state
    pub fn enqueue(&mut self, peripheral: Peripheral, switch: Switch) {
        self.queued.insert(peripheral, switch);
    }

    /// Clear the in-flight slot and hand back any queued follow-up
    pub fn finish(&mut self, peripheral: Peripheral) -> Option<Switch> {
        self.in_flight.remove(&peripheral);
        self.queued.remove(&peripheral)
    }

    /// Forget queued follow-ups (the session ended)
    pub fn drop_queued(&mut self) {
        self.queued.clear();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// AppState
// ─────────────────────────────────────────────────────────────────────────────

/// Complete application state (the Model in TEA).
///
/// Only `handler::update` mutates it.
#[derive(Debug, Default)]
pub struct AppState {
    pub phase: AppPhase,
    pub connection: ConnectionState,
    pub screen: Screen,

    pub config: ConfigStore,
    pub commands: CommandTemplateStore,

    /// Last backend-confirmed peripheral flags
    pub peripherals: PeripheralStates,
    pub toggles: ToggleTracker,

    pub shutdown: ShutdownPhase,
    pub confirm_dialog: Option<ConfirmDialogState>,

    pub log: OperationLog,

    /// Bumped when an explicit operation starts and when it resolves.
    /// Status results issued under an older epoch are discarded.
    pub epoch: u64,
    /// A status check is outstanding
    pub status_check_in_flight: bool,
    /// The next applied status result may promote Disconnected to Connected
    pub initial_check_pending: bool,

    pub backend_health: Option<BackendHealth>,

    pub remote_history: Vec<RemoteLogRecord>,
    /// Bumped on every history load, including identical ones
    pub remote_history_version: u64,

    notices: Vec<Notice>,
    started_actions: Vec<StartedAction>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn should_quit(&self) -> bool {
        self.phase == AppPhase::Quitting
    }

    pub fn bump_epoch(&mut self) -> u64 {
        self.epoch += 1;
        self.epoch
    }

    /// Connect, shutdown, a toggle or a config save is outstanding
    pub fn explicit_operation_in_flight(&self) -> bool {
        self.connection == ConnectionState::Connecting
            || self.shutdown == ShutdownPhase::InFlight
            || self.toggles.any_in_flight()
            || self.config.saving
    }

    /// Peripheral controls are usable
    pub fn controls_enabled(&self) -> bool {
        self.connection.is_connected()
    }

    /// The connect action is available
    pub fn connect_enabled(&self) -> bool {
        self.connection == ConnectionState::Disconnected
    }

    pub fn set_connection(&mut self, next: ConnectionState) {
        if self.connection != next {
            tracing::info!("Connection: {} -> {}", self.connection, next);
            self.connection = next;
        }
    }

    pub fn notify(&mut self, level: NoticeLevel, title: impl Into<String>, message: impl Into<String>) {
        self.notices.push(Notice::new(level, title, message));
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn pending_notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn record_started(&mut self, action: StartedAction) {
        self.started_actions.push(action);
    }

    pub fn take_started_actions(&mut self) -> Vec<StartedAction> {
        std::mem::take(&mut self.started_actions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = AppState::new();
        assert_eq!(state.phase, AppPhase::Initializing);
        assert_eq!(state.connection, ConnectionState::Unconfigured);
        assert_eq!(state.screen, Screen::Configuration);
        assert!(!state.explicit_operation_in_flight());
        assert!(!state.controls_enabled());
        assert!(!state.connect_enabled());
    }

    #[test]
    fn test_toggle_tracker_coalesces() {
        let mut tracker = ToggleTracker::default();
        tracker.begin(Peripheral::Fan, Switch::On);
        tracker.enqueue(Peripheral::Fan, Switch::Off);
        tracker.enqueue(Peripheral::Fan, Switch::On);

        assert_eq!(tracker.in_flight(Peripheral::Fan), Some(Switch::On));
        assert_eq!(tracker.queued(Peripheral::Fan), Some(Switch::On));
        assert!(tracker.in_flight(Peripheral::Camera).is_none());

        assert_eq!(tracker.finish(Peripheral::Fan), Some(Switch::On));
        assert!(!tracker.any_in_flight());
        assert_eq!(tracker.finish(Peripheral::Fan), None);
    }

    #[test]
    fn test_notices_drain() {
        let mut state = AppState::new();
        state.notify(NoticeLevel::Error, "Error", "boom");
        assert_eq!(state.pending_notices().len(), 1);
        let notices = state.take_notices();
        assert_eq!(notices[0].message, "boom");
        assert!(state.take_notices().is_empty());
    }

    #[test]
    fn test_explicit_operation_in_flight() {
        let mut state = AppState::new();
        state.connection = ConnectionState::Connecting;
        assert!(state.explicit_operation_in_flight());

        state.connection = ConnectionState::Connected;
        state.toggles.begin(Peripheral::Lights, Switch::On);
        assert!(state.explicit_operation_in_flight());

        state.toggles.finish(Peripheral::Lights);
        state.shutdown = ShutdownPhase::AwaitingConfirmation;
        assert!(!state.explicit_operation_in_flight());

        state.shutdown = ShutdownPhase::InFlight;
        assert!(state.explicit_operation_in_flight());
    }
}
