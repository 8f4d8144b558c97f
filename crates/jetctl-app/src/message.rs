//! Message types for the application (TEA pattern)

use jetctl_client::{CommandMap, ExecuteResult, RemoteLogRecord};
use jetctl_core::{ActionKey, CommandTemplates, DeviceConfig, Password, Peripheral, Switch};

/// All possible messages/actions in the application
#[derive(Debug, Clone)]
pub enum Message {
    // ─────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────
    /// Load configuration, templates and backend health
    Startup,
    /// Exit the application
    Quit,
    /// Status poller timer fired
    PollTick,
    /// Fetch command templates from the backend
    LoadCommands,
    /// Probe backend health
    CheckHealth,

    // ─────────────────────────────────────────────────────────
    // Configuration
    // ─────────────────────────────────────────────────────────
    /// Re-read configuration from the backend
    ReloadConfiguration,
    /// Configuration fetched (errors already mapped to unconfigured)
    ConfigLoaded { config: DeviceConfig },
    /// Operator submitted new connection parameters
    SaveConfiguration {
        host: String,
        username: String,
        password: Password,
        port: u16,
    },
    ConfigSaved { config: DeviceConfig },
    ConfigSaveFailed { reason: String },

    // ─────────────────────────────────────────────────────────
    // Session
    // ─────────────────────────────────────────────────────────
    Connect,
    ConnectSucceeded { message: Option<String> },
    ConnectFailed { reason: String },
    /// Result of a status check issued at `epoch`
    StatusChecked {
        epoch: u64,
        connected: bool,
        error: Option<String>,
    },

    // ─────────────────────────────────────────────────────────
    // Peripheral Control
    // ─────────────────────────────────────────────────────────
    Toggle { peripheral: Peripheral, switch: Switch },
    ToggleCompleted {
        peripheral: Peripheral,
        switch: Switch,
        /// Literal command the backend reports it ran, if it echoed one
        command: Option<String>,
    },
    ToggleFailed {
        peripheral: Peripheral,
        switch: Switch,
        reason: String,
    },

    // ─────────────────────────────────────────────────────────
    // Shutdown (two-phase)
    // ─────────────────────────────────────────────────────────
    RequestShutdown,
    ConfirmShutdown,
    CancelShutdown,
    ShutdownCompleted { command: Option<String> },
    ShutdownFailed { reason: String },

    // ─────────────────────────────────────────────────────────
    // Command Templates
    // ─────────────────────────────────────────────────────────
    CommandsLoaded { commands: CommandMap },
    CommandsLoadFailed { reason: String },
    /// Full replace of all seven templates
    SaveCommands { templates: CommandTemplates },
    /// Replace one template and save the full mapping
    EditCommandTemplate { key: ActionKey, command: String },
    CommandsSaved { templates: CommandTemplates },
    CommandsSaveFailed { reason: String },

    // ─────────────────────────────────────────────────────────
    // Backend Extras
    // ─────────────────────────────────────────────────────────
    HealthChecked { healthy: bool, detail: String },
    /// Run an ad-hoc command on the device
    ExecuteCommand { command: String },
    CommandExecuted {
        command: String,
        result: ExecuteResult,
    },
    ExecuteFailed { command: String, reason: String },
    /// Fetch the backend's command audit trail (`None` = configured default)
    FetchRemoteHistory { limit: Option<usize> },
    RemoteHistoryLoaded { records: Vec<RemoteLogRecord> },
    RemoteHistoryFailed { reason: String },

    // ─────────────────────────────────────────────────────────
    // Screens (presentation only)
    // ─────────────────────────────────────────────────────────
    ShowConfiguration,
    ShowCommands,
    ShowDashboard,
}
