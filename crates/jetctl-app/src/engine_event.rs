//! Domain events emitted by the Engine for external consumers
//!
//! Events are broadcast after each message processing cycle via
//! `Engine::subscribe()`. The headless runner turns them into NDJSON lines.

use jetctl_client::RemoteLogRecord;
use jetctl_core::{CommandTemplates, ConnectionState, LogEntry, Peripheral, Switch};

use crate::state::{Notice, Screen};

/// Domain events emitted by the Engine.
///
/// Subscribers see a consistent view: every event for one message is sent
/// after `update` and its follow-ups have finished.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    // ─────────────────────────────────────────────────────────
    // Session
    // ─────────────────────────────────────────────────────────
    ConnectionChanged {
        from: ConnectionState,
        to: ConnectionState,
    },

    /// A backend-confirmed peripheral flag changed
    PeripheralChanged { peripheral: Peripheral, on: bool },

    /// A toggle request was sent; carries the cached template for display
    ActionStarted {
        peripheral: Peripheral,
        switch: Switch,
        command: String,
    },

    /// Shutdown is waiting for operator confirmation
    ConfirmationRequested { title: String, message: String },

    // ─────────────────────────────────────────────────────────
    // Presentation
    // ─────────────────────────────────────────────────────────
    /// A line was added to the operation log
    LogAppended { entry: LogEntry },

    ScreenChanged { screen: Screen },

    /// Cached command templates changed (load or save)
    TemplatesChanged { templates: CommandTemplates },

    RemoteHistoryUpdated { records: Vec<RemoteLogRecord> },

    /// Transient operator notice
    Notice(Notice),

    // ─────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────
    /// The engine is shutting down
    Shutdown,
}

impl EngineEvent {
    /// Short name for logging
    pub fn event_type(&self) -> &'static str {
        match self {
            EngineEvent::ConnectionChanged { .. } => "connection_changed",
            EngineEvent::PeripheralChanged { .. } => "peripheral_changed",
            EngineEvent::ActionStarted { .. } => "action_started",
            EngineEvent::ConfirmationRequested { .. } => "confirmation_requested",
            EngineEvent::LogAppended { .. } => "log_appended",
            EngineEvent::ScreenChanged { .. } => "screen_changed",
            EngineEvent::TemplatesChanged { .. } => "templates_changed",
            EngineEvent::RemoteHistoryUpdated { .. } => "remote_history_updated",
            EngineEvent::Notice(_) => "notice",
            EngineEvent::Shutdown => "shutdown",
        }
    }
}
