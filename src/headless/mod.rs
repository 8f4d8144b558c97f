//! Headless operator console - NDJSON event output
//!
//! The console reads one command per line from stdin and prints every engine
//! event to stdout as newline-delimited JSON. Diagnostics go to the log file,
//! so stdout carries nothing but events.
//!
//! # Example Output
//!
//! ```json
//! {"event":"connection_changed","from":"disconnected","to":"connecting","timestamp":1704700001000}
//! {"event":"log","time":"14:03:22","message":"Connected to nvidia@192.168.1.50:22","timestamp":1704700002000}
//! {"event":"peripheral_changed","peripheral":"fan","on":true,"timestamp":1704700003000}
//! ```

pub mod console;
pub mod runner;

use chrono::Utc;
use serde::Serialize;
use std::io::{self, Write};
use tracing::error;

use jetctl_app::{AppState, EngineEvent, NoticeLevel, Screen, ShutdownPhase};
use jetctl_client::RemoteLogRecord;
use jetctl_core::{CommandTemplates, ConnectionState, Peripheral, PeripheralStates, Switch};

/// Events emitted in headless mode
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HeadlessEvent {
    /// Console is up and talking to `backend`
    Started { backend: String, timestamp: i64 },

    ConnectionChanged {
        from: ConnectionState,
        to: ConnectionState,
        timestamp: i64,
    },

    PeripheralChanged {
        peripheral: Peripheral,
        on: bool,
        timestamp: i64,
    },

    /// A toggle was sent; `command` is the cached template
    ActionStarted {
        peripheral: Peripheral,
        switch: Switch,
        command: String,
        timestamp: i64,
    },

    ConfirmationRequested {
        title: String,
        message: String,
        timestamp: i64,
    },

    /// Operation log line
    Log {
        time: String,
        message: String,
        timestamp: i64,
    },

    ScreenChanged { screen: Screen, timestamp: i64 },

    TemplatesChanged {
        templates: CommandTemplates,
        timestamp: i64,
    },

    RemoteHistory {
        records: Vec<RemoteLogRecord>,
        timestamp: i64,
    },

    Notice {
        level: NoticeLevel,
        title: String,
        message: String,
        timestamp: i64,
    },

    /// Answer to the `status` command
    Status {
        connection: ConnectionState,
        screen: Screen,
        target: Option<String>,
        peripherals: PeripheralStates,
        shutdown: ShutdownPhase,
        backend_healthy: Option<bool>,
        log: Vec<String>,
        timestamp: i64,
    },

    Error {
        message: String,
        fatal: bool,
        timestamp: i64,
    },

    Shutdown { timestamp: i64 },
}

impl HeadlessEvent {
    pub fn emit(&self) {
        let json = match serde_json::to_string(self) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize headless event: {}", e);
                return;
            }
        };

        let mut stdout = io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{}", json) {
            error!("Failed to write headless event to stdout: {}", e);
            return;
        }

        if let Err(e) = stdout.flush() {
            error!("Failed to flush headless stdout: {}", e);
        }
    }

    fn now() -> i64 {
        Utc::now().timestamp_millis()
    }

    // ─────────────────────────────────────────────────────────
    // Convenience constructors
    // ─────────────────────────────────────────────────────────

    pub fn started(backend: &str) -> Self {
        Self::Started {
            backend: backend.to_string(),
            timestamp: Self::now(),
        }
    }

    pub fn error(message: impl Into<String>, fatal: bool) -> Self {
        Self::Error {
            message: message.into(),
            fatal,
            timestamp: Self::now(),
        }
    }

    /// Snapshot of what the operator would see
    pub fn status(state: &AppState) -> Self {
        let config = state.config.config();
        Self::Status {
            connection: state.connection,
            screen: state.screen,
            target: config.configured.then(|| config.target()),
            peripherals: state.peripherals,
            shutdown: state.shutdown,
            backend_healthy: state.backend_health.as_ref().map(|h| h.healthy),
            log: state.log.entries().map(ToString::to_string).collect(),
            timestamp: Self::now(),
        }
    }
}

impl From<EngineEvent> for HeadlessEvent {
    fn from(event: EngineEvent) -> Self {
        let timestamp = Self::now();
        match event {
            EngineEvent::ConnectionChanged { from, to } => Self::ConnectionChanged {
                from,
                to,
                timestamp,
            },
            EngineEvent::PeripheralChanged { peripheral, on } => Self::PeripheralChanged {
                peripheral,
                on,
                timestamp,
            },
            EngineEvent::ActionStarted {
                peripheral,
                switch,
                command,
            } => Self::ActionStarted {
                peripheral,
                switch,
                command,
                timestamp,
            },
            EngineEvent::ConfirmationRequested { title, message } => Self::ConfirmationRequested {
                title,
                message,
                timestamp,
            },
            EngineEvent::LogAppended { entry } => Self::Log {
                time: entry.formatted_time(),
                message: entry.message,
                timestamp,
            },
            EngineEvent::ScreenChanged { screen } => Self::ScreenChanged { screen, timestamp },
            EngineEvent::TemplatesChanged { templates } => Self::TemplatesChanged {
                templates,
                timestamp,
            },
            EngineEvent::RemoteHistoryUpdated { records } => Self::RemoteHistory {
                records,
                timestamp,
            },
            EngineEvent::Notice(notice) => Self::Notice {
                level: notice.level,
                title: notice.title,
                message: notice.message,
                timestamp,
            },
            EngineEvent::Shutdown => Self::Shutdown { timestamp },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jetctl_app::Notice;
    use jetctl_core::LogEntry;

    #[test]
    fn test_event_tag_is_snake_case() {
        let event = HeadlessEvent::from(EngineEvent::ConnectionChanged {
            from: ConnectionState::Connecting,
            to: ConnectionState::Connected,
        });

        let json: serde_json::Value = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "connection_changed");
        assert_eq!(json["from"], "connecting");
        assert_eq!(json["to"], "connected");
        assert!(json["timestamp"].is_i64());
    }

    #[test]
    fn test_log_event_carries_clock_time() {
        let entry = LogEntry::new("fan on: echo 1");
        let time = entry.formatted_time();

        let json = serde_json::to_value(HeadlessEvent::from(EngineEvent::LogAppended { entry }))
            .unwrap();

        assert_eq!(json["event"], "log");
        assert_eq!(json["message"], "fan on: echo 1");
        assert_eq!(json["time"], time);
    }

    #[test]
    fn test_notice_event() {
        let notice = Notice::new(NoticeLevel::Error, "Connection Failed", "Authentication failed.");

        let json = serde_json::to_value(HeadlessEvent::from(EngineEvent::Notice(notice))).unwrap();

        assert_eq!(json["event"], "notice");
        assert_eq!(json["level"], "error");
        assert_eq!(json["message"], "Authentication failed.");
    }

    #[test]
    fn test_status_snapshot_of_fresh_state() {
        let state = AppState::new();

        let json = serde_json::to_value(HeadlessEvent::status(&state)).unwrap();

        assert_eq!(json["event"], "status");
        assert_eq!(json["connection"], "unconfigured");
        assert_eq!(json["screen"], "configuration");
        assert!(json["target"].is_null());
        assert_eq!(json["peripherals"]["fan"], false);
        assert_eq!(json["shutdown"], "idle");
    }
}
