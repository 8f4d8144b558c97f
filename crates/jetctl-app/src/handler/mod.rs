//! Handler module - TEA update function and event handlers
//!
//! Organized into submodules:
//! - `update`: Main update() function and message dispatch
//! - `session`: Configuration, connect, status polling, shutdown and screens
//! - `control`: Peripheral toggles and ad-hoc command execution
//! - `commands`: Command templates, remote history and backend health

pub(crate) mod commands;
pub(crate) mod control;
pub(crate) mod session;
pub(crate) mod update;


use jetctl_client::SaveConfigRequest;
use jetctl_core::{CommandTemplates, Peripheral, Switch};

use crate::message::Message;

// Re-export main entry point
pub use update::update;

/// Actions that the event loop should perform after update
#[derive(Debug, Clone)]
pub enum UpdateAction {
    /// Fetch device configuration
    LoadConfig,

    /// Push new connection parameters. The request owns the password.
    SaveConfig { request: SaveConfigRequest },

    /// Fetch command templates
    LoadCommands,

    /// Replace all command templates on the backend
    SaveCommands { templates: CommandTemplates },

    /// Start (or restart) the periodic status timer
    StartPolling,

    /// Stop the status timer; no further ticks are sent
    StopPolling,

    /// Ask the backend whether the device session is live.
    /// `epoch` is echoed back so stale results can be discarded.
    CheckStatus { epoch: u64 },

    /// Open the device session
    Connect,

    /// Switch a peripheral on or off
    Toggle { peripheral: Peripheral, switch: Switch },

    /// Power the device off
    Shutdown,

    /// Probe backend health
    CheckHealth,

    /// Run an ad-hoc command
    Execute { command: String },

    /// Fetch the backend's command history (`None` = configured default)
    FetchRemoteHistory { limit: Option<usize> },
}

/// Result of processing a message
#[derive(Debug, Default)]
pub struct UpdateResult {
    /// Optional follow-up message to process
    pub message: Option<Message>,
    /// Optional action for the event loop to perform
    pub action: Option<UpdateAction>,
}

impl UpdateResult {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn message(msg: Message) -> Self {
        Self {
            message: Some(msg),
            action: None,
        }
    }

    pub fn action(action: UpdateAction) -> Self {
        Self {
            message: None,
            action: Some(action),
        }
    }

    /// Action followed by a message
    pub fn action_then(action: UpdateAction, msg: Message) -> Self {
        Self {
            message: Some(msg),
            action: Some(action),
        }
    }
}
