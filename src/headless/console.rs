//! Operator console command parsing
//!
//! One command per line. Parsing never touches the engine; a line that does
//! not parse is reported as an `error` event and dropped.

use jetctl_app::Message;
use jetctl_core::prelude::*;
use jetctl_core::{ActionKey, Password, Peripheral, Switch, DEFAULT_SSH_PORT};

/// A parsed console line
#[derive(Debug, Clone)]
pub enum ConsoleCommand {
    /// Feed a message to the engine
    Send(Message),
    /// Print a state snapshot
    Status,
}

pub const HELP: &str = "commands: config <host> <user> <password> [port] | reload | connect | \
fan|camera|lights on|off | shutdown | confirm | cancel | set <key> <command...> | \
run <command...> | history [n] | screen config|commands|dashboard | status | quit";

fn invalid(message: impl Into<String>) -> Error {
    Error::validation("command", message)
}

/// Parse one console line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<ConsoleCommand>> {
    let line = line.trim();
    let Some((verb, rest)) = split_word(line) else {
        return Ok(None);
    };

    let msg = match verb {
        "q" | "quit" | "exit" => Message::Quit,
        "status" => return Ok(Some(ConsoleCommand::Status)),
        "reload" => Message::ReloadConfiguration,
        "connect" => Message::Connect,
        "shutdown" => Message::RequestShutdown,
        "confirm" => Message::ConfirmShutdown,
        "cancel" => Message::CancelShutdown,
        "config" => parse_config(rest)?,
        "set" => parse_set(rest)?,
        "run" => {
            if rest.is_empty() {
                return Err(invalid("usage: run <command...>"));
            }
            Message::ExecuteCommand {
                command: rest.to_string(),
            }
        }
        "history" => {
            let limit = match rest {
                "" => None,
                n => Some(
                    n.parse::<usize>()
                        .map_err(|_| invalid(format!("'{}' is not a number", n)))?,
                ),
            };
            Message::FetchRemoteHistory { limit }
        }
        "screen" => match rest {
            "config" | "configuration" => Message::ShowConfiguration,
            "commands" => Message::ShowCommands,
            "dashboard" => Message::ShowDashboard,
            _ => return Err(invalid("usage: screen config|commands|dashboard")),
        },
        other => match other.parse::<Peripheral>() {
            Ok(peripheral) => {
                let switch = rest.parse::<Switch>()?;
                Message::Toggle { peripheral, switch }
            }
            Err(_) => return Err(invalid(format!("unknown command '{}'; {}", other, HELP))),
        },
    };

    Ok(Some(ConsoleCommand::Send(msg)))
}

fn split_word(s: &str) -> Option<(&str, &str)> {
    if s.is_empty() {
        return None;
    }
    match s.split_once(char::is_whitespace) {
        Some((word, rest)) => Some((word, rest.trim_start())),
        None => Some((s, "")),
    }
}

/// `config <host> <user> <password> [port]`
///
/// Emptiness is left to the state machine, which owns that rule.
fn parse_config(rest: &str) -> Result<Message> {
    let parts: Vec<&str> = rest.split_whitespace().collect();
    let (host, username, password, port) = match parts.as_slice() {
        [host, user, password] => (*host, *user, *password, DEFAULT_SSH_PORT),
        [host, user, password, port] => {
            let port = port
                .parse::<u16>()
                .map_err(|_| invalid(format!("invalid port '{}'", port)))?;
            (*host, *user, *password, port)
        }
        _ => return Err(invalid("usage: config <host> <user> <password> [port]")),
    };
    Ok(Message::SaveConfiguration {
        host: host.to_string(),
        username: username.to_string(),
        password: Password::new(password),
        port,
    })
}

/// `set <key> <command...>`
fn parse_set(rest: &str) -> Result<Message> {
    let Some((key, command)) = split_word(rest) else {
        return Err(invalid("usage: set <key> <command...>"));
    };
    let key = key.parse::<ActionKey>()?;
    if command.is_empty() {
        return Err(invalid(format!("no command given for {}", key.as_str())));
    }
    Ok(Message::EditCommandTemplate {
        key,
        command: command.to_string(),
    })
}
