//! Command template, remote history and health handlers

use chrono::Local;
use tracing::{debug, info, warn};

use jetctl_client::{CommandMap, RemoteLogRecord};
use jetctl_core::CommandTemplates;

use crate::state::{AppState, BackendHealth, NoticeLevel};

use super::{UpdateAction, UpdateResult};

pub fn handle_commands_loaded(state: &mut AppState, commands: CommandMap) -> UpdateResult {
    let applied = state.commands.merge_loaded(&commands);
    debug!("Loaded {} command template(s) from backend", applied);
    UpdateResult::none()
}

/// Keep whatever templates are cached; the operator is not alerted.
pub fn handle_commands_load_failed(reason: String) -> UpdateResult {
    warn!("Failed to load command templates, keeping cached values: {}", reason);
    UpdateResult::none()
}

pub fn handle_save_commands(state: &mut AppState, templates: CommandTemplates) -> UpdateResult {
    if state.commands.saving {
        state.notify(
            NoticeLevel::Warning,
            "Busy",
            "A command template save is already in progress",
        );
        return UpdateResult::none();
    }
    state.commands.saving = true;
    UpdateResult::action(UpdateAction::SaveCommands { templates })
}

pub fn handle_commands_saved(state: &mut AppState, templates: CommandTemplates) -> UpdateResult {
    state.commands.apply_saved(templates);
    state.log.append("Commands saved");
    state.notify(NoticeLevel::Success, "Success", "Commands saved!");
    UpdateResult::none()
}

pub fn handle_commands_save_failed(state: &mut AppState, reason: String) -> UpdateResult {
    state.commands.saving = false;
    state.notify(
        NoticeLevel::Error,
        "Error",
        format!("Failed to save commands: {}", reason),
    );
    UpdateResult::none()
}

// ─────────────────────────────────────────────────────────────────────────────
// Remote History
// ─────────────────────────────────────────────────────────────────────────────

pub fn handle_fetch_remote_history(state: &mut AppState, limit: Option<usize>) -> UpdateResult {
    if limit == Some(0) {
        state.notify(NoticeLevel::Warning, "Invalid limit", "History limit must be at least 1");
        return UpdateResult::none();
    }
    UpdateResult::action(UpdateAction::FetchRemoteHistory { limit })
}

pub fn handle_remote_history_loaded(
    state: &mut AppState,
    records: Vec<RemoteLogRecord>,
) -> UpdateResult {
    debug!("Remote history: {} record(s)", records.len());
    state.remote_history = records;
    state.remote_history_version += 1;
    UpdateResult::none()
}

pub fn handle_remote_history_failed(state: &mut AppState, reason: String) -> UpdateResult {
    state.notify(
        NoticeLevel::Error,
        "History unavailable",
        format!("Failed to fetch command history: {}", reason),
    );
    UpdateResult::none()
}

// ─────────────────────────────────────────────────────────────────────────────
// Health
// ─────────────────────────────────────────────────────────────────────────────

pub fn handle_health_checked(state: &mut AppState, healthy: bool, detail: String) -> UpdateResult {
    if healthy {
        info!("Backend healthy");
    } else {
        warn!("Backend unhealthy: {}", detail);
        state.notify(
            NoticeLevel::Warning,
            "Backend unavailable",
            format!("Backend health check failed: {}", detail),
        );
    }
    state.backend_health = Some(BackendHealth {
        healthy,
        detail,
        checked_at: Local::now(),
    });
    UpdateResult::none()
}
