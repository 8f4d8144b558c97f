//! Main update function - handles state transitions (TEA pattern)

use jetctl_core::AppPhase;

use crate::message::Message;
use crate::state::{AppState, Screen};

use super::{commands, control, session, UpdateAction, UpdateResult};

/// Process a message and update state
/// Returns optional follow-up message and/or action
pub fn update(state: &mut AppState, message: Message) -> UpdateResult {
    match message {
        Message::Startup => UpdateResult::action_then(UpdateAction::LoadConfig, Message::LoadCommands),

        Message::Quit => {
            state.phase = AppPhase::Quitting;
            UpdateResult::none()
        }

        Message::PollTick => session::handle_poll_tick(state),

        Message::LoadCommands => {
            UpdateResult::action_then(UpdateAction::LoadCommands, Message::CheckHealth)
        }

        Message::CheckHealth => UpdateResult::action(UpdateAction::CheckHealth),

        // ─────────────────────────────────────────────────────────
        // Configuration
        // ─────────────────────────────────────────────────────────
        Message::ReloadConfiguration => UpdateResult::action(UpdateAction::LoadConfig),
        Message::ConfigLoaded { config } => session::handle_config_loaded(state, config),
        Message::SaveConfiguration {
            host,
            username,
            password,
            port,
        } => session::handle_save_configuration(state, &host, &username, password, port),
        Message::ConfigSaved { config } => session::handle_config_saved(state, config),
        Message::ConfigSaveFailed { reason } => session::handle_config_save_failed(state, reason),

        // ─────────────────────────────────────────────────────────
        // Session
        // ─────────────────────────────────────────────────────────
        Message::Connect => session::handle_connect(state),
        Message::ConnectSucceeded { message } => session::handle_connect_succeeded(state, message),
        Message::ConnectFailed { reason } => session::handle_connect_failed(state, reason),
        Message::StatusChecked {
            epoch,
            connected,
            error,
        } => session::handle_status_checked(state, epoch, connected, error),

        // ─────────────────────────────────────────────────────────
        // Peripheral Control
        // ─────────────────────────────────────────────────────────
        Message::Toggle { peripheral, switch } => control::handle_toggle(state, peripheral, switch),
        Message::ToggleCompleted {
            peripheral,
            switch,
            command,
        } => control::handle_toggle_completed(state, peripheral, switch, command),
        Message::ToggleFailed {
            peripheral,
            switch,
            reason,
        } => control::handle_toggle_failed(state, peripheral, switch, reason),

        // ─────────────────────────────────────────────────────────
        // Shutdown
        // ─────────────────────────────────────────────────────────
        Message::RequestShutdown => session::handle_request_shutdown(state),
        Message::ConfirmShutdown => session::handle_confirm_shutdown(state),
        Message::CancelShutdown => session::handle_cancel_shutdown(state),
        Message::ShutdownCompleted { command } => session::handle_shutdown_completed(state, command),
        Message::ShutdownFailed { reason } => session::handle_shutdown_failed(state, reason),

        // ─────────────────────────────────────────────────────────
        // Command Templates
        // ─────────────────────────────────────────────────────────
        Message::CommandsLoaded { commands } => commands::handle_commands_loaded(state, commands),
        Message::CommandsLoadFailed { reason } => commands::handle_commands_load_failed(reason),
        Message::SaveCommands { templates } => commands::handle_save_commands(state, templates),
        Message::EditCommandTemplate { key, command } => {
            let templates = state.commands.derive_edit(key, command);
            commands::handle_save_commands(state, templates)
        }
        Message::CommandsSaved { templates } => commands::handle_commands_saved(state, templates),
        Message::CommandsSaveFailed { reason } => commands::handle_commands_save_failed(state, reason),

        // ─────────────────────────────────────────────────────────
        // Backend Extras
        // ─────────────────────────────────────────────────────────
        Message::HealthChecked { healthy, detail } => {
            commands::handle_health_checked(state, healthy, detail)
        }
        Message::ExecuteCommand { command } => control::handle_execute(state, command),
        Message::CommandExecuted { command, result } => {
            control::handle_command_executed(state, command, result)
        }
        Message::ExecuteFailed { command, reason } => {
            control::handle_execute_failed(state, command, reason)
        }
        Message::FetchRemoteHistory { limit } => commands::handle_fetch_remote_history(state, limit),
        Message::RemoteHistoryLoaded { records } => {
            commands::handle_remote_history_loaded(state, records)
        }
        Message::RemoteHistoryFailed { reason } => {
            commands::handle_remote_history_failed(state, reason)
        }

        // ─────────────────────────────────────────────────────────
        // Screens
        // ─────────────────────────────────────────────────────────
        Message::ShowConfiguration => session::show_screen(state, Screen::Configuration),
        Message::ShowCommands => session::show_screen(state, Screen::Commands),
        Message::ShowDashboard => session::show_screen(state, Screen::Dashboard),
    }
}
