//! Peripheral toggle and command execution handlers
//!
//! Toggles are confirm-after-success: the peripheral flag only changes when
//! the backend reports the command ran. One toggle per peripheral is in
//! flight at a time; later requests are coalesced to the latest desired state.

use tracing::debug;

use jetctl_client::ExecuteResult;
use jetctl_core::{ActionKey, Peripheral, Switch};

use crate::state::{AppState, NoticeLevel, ShutdownPhase, StartedAction};

use super::{UpdateAction, UpdateResult};

pub fn handle_toggle(state: &mut AppState, peripheral: Peripheral, switch: Switch) -> UpdateResult {
    if !state.controls_enabled() {
        state.notify(NoticeLevel::Warning, "Not connected", "Device not connected");
        return UpdateResult::none();
    }
    if state.shutdown == ShutdownPhase::InFlight {
        state.notify(
            NoticeLevel::Warning,
            "Busy",
            "Wait for the shutdown to finish",
        );
        return UpdateResult::none();
    }
    if let Some(current) = state.toggles.in_flight(peripheral) {
        debug!(
            "{} {} in flight, queueing {}",
            peripheral, current, switch
        );
        state.toggles.enqueue(peripheral, switch);
        return UpdateResult::none();
    }
    start_toggle(state, peripheral, switch)
}

fn start_toggle(state: &mut AppState, peripheral: Peripheral, switch: Switch) -> UpdateResult {
    state.toggles.begin(peripheral, switch);
    state.bump_epoch();
    let command = state
        .commands
        .get(ActionKey::for_toggle(peripheral, switch))
        .to_string();
    state.record_started(StartedAction {
        peripheral,
        switch,
        command,
    });
    UpdateResult::action(UpdateAction::Toggle { peripheral, switch })
}

pub fn handle_toggle_completed(
    state: &mut AppState,
    peripheral: Peripheral,
    switch: Switch,
    command: Option<String>,
) -> UpdateResult {
    state.bump_epoch();
    let queued = state.toggles.finish(peripheral);

    let expected = state.commands.get(ActionKey::for_toggle(peripheral, switch));
    let command = match command {
        Some(command) => {
            if command != expected {
                debug!(
                    "Backend ran '{}' for {} {} (cached template '{}')",
                    command, peripheral, switch, expected
                );
            }
            command
        }
        None => expected.to_string(),
    };

    state.peripherals.set(peripheral, switch.is_on());
    state.log.append(format!("{} {}: {}", peripheral, switch, command));
    state.notify(
        NoticeLevel::Success,
        "Success",
        format!("{} turned {}", peripheral, switch),
    );
    dispatch_queued(state, peripheral, queued)
}

pub fn handle_toggle_failed(
    state: &mut AppState,
    peripheral: Peripheral,
    switch: Switch,
    reason: String,
) -> UpdateResult {
    state.bump_epoch();
    let queued = state.toggles.finish(peripheral);

    state.log.append(format!("{} {} failed: {}", peripheral, switch, reason));
    state.notify(NoticeLevel::Error, "Error", reason);
    dispatch_queued(state, peripheral, queued)
}

/// Send the coalesced follow-up unless the device is already there
fn dispatch_queued(state: &mut AppState, peripheral: Peripheral, queued: Option<Switch>) -> UpdateResult {
    let Some(next) = queued else {
        return UpdateResult::none();
    };
    if next.is_on() == state.peripherals.get(peripheral) {
        debug!("Queued {} {} already confirmed, dropping", peripheral, next);
        return UpdateResult::none();
    }
    if !state.controls_enabled() || state.shutdown == ShutdownPhase::InFlight {
        debug!("Dropping queued {} {}: session ending", peripheral, next);
        return UpdateResult::none();
    }
    start_toggle(state, peripheral, next)
}

// ─────────────────────────────────────────────────────────────────────────────
// Ad-hoc Commands
// ─────────────────────────────────────────────────────────────────────────────

pub fn handle_execute(state: &mut AppState, command: String) -> UpdateResult {
    let command = command.trim().to_string();
    if command.is_empty() {
        state.notify(NoticeLevel::Warning, "Empty command", "Enter a command to run");
        return UpdateResult::none();
    }
    if !state.controls_enabled() {
        state.notify(NoticeLevel::Warning, "Not connected", "Device not connected");
        return UpdateResult::none();
    }
    UpdateResult::action(UpdateAction::Execute { command })
}

pub fn handle_command_executed(
    state: &mut AppState,
    command: String,
    result: ExecuteResult,
) -> UpdateResult {
    if result.success {
        state.log.append(format!("$ {}: ok", command));
        state.notify(NoticeLevel::Success, command, result.output.trim_end().to_string());
    } else {
        let reason = result.failure_reason();
        state.log.append(format!("$ {} failed: {}", command, reason));
        state.notify(NoticeLevel::Error, command, reason);
    }
    UpdateResult::none()
}

pub fn handle_execute_failed(state: &mut AppState, command: String, reason: String) -> UpdateResult {
    state.log.append(format!("$ {} failed: {}", command, reason));
    state.notify(NoticeLevel::Error, command, reason);
    UpdateResult::none()
}
