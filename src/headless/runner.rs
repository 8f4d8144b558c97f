//! Headless mode runner - console event loop
//!
//! Reads operator commands from stdin, drives the engine and prints every
//! engine event as an NDJSON line.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tracing::{error, info, warn};

use jetctl_app::config::Settings;
use jetctl_app::{Engine, EngineEvent};
use jetctl_client::{DeviceBackend, HttpBackend};
use jetctl_core::prelude::*;

use super::console::{parse_command, ConsoleCommand};
use super::HeadlessEvent;

/// Run the operator console against the backend named in `settings`
pub async fn run_headless(settings: Settings) -> Result<()> {
    let backend = match HttpBackend::new(&settings.backend.http_config()) {
        Ok(backend) => backend,
        Err(e) => {
            HeadlessEvent::error(e.to_string(), e.is_fatal()).emit();
            return Err(e);
        }
    };
    info!("Backend: {}", backend.base_url());
    HeadlessEvent::started(backend.base_url()).emit();

    let mut engine = Engine::new(Arc::new(backend), settings);
    let mut events = engine.subscribe();

    let (console_tx, console_rx) = mpsc::channel::<ConsoleCommand>(32);
    std::thread::spawn(move || {
        spawn_stdin_reader_blocking(console_tx);
    });

    engine.start();
    emit_pending_events(&mut events);

    let result = headless_event_loop(&mut engine, &mut events, console_rx).await;

    engine.shutdown();
    emit_pending_events(&mut events);

    info!("Jetson control console exiting");
    result
}

async fn headless_event_loop<B>(
    engine: &mut Engine<B>,
    events: &mut broadcast::Receiver<EngineEvent>,
    mut console_rx: mpsc::Receiver<ConsoleCommand>,
) -> Result<()>
where
    B: DeviceBackend + Sync + 'static,
{
    let mut console_open = true;

    loop {
        if engine.should_quit() {
            info!("Quit requested");
            break;
        }

        tokio::select! {
            msg = engine.msg_rx.recv() => match msg {
                Some(msg) => engine.process_message(msg),
                None => {
                    info!("Message channel closed");
                    break;
                }
            },
            cmd = console_rx.recv(), if console_open => match cmd {
                Some(ConsoleCommand::Send(msg)) => engine.process_message(msg),
                Some(ConsoleCommand::Status) => HeadlessEvent::status(&engine.state).emit(),
                None => {
                    // Keep serving in-flight work; quit arrives by signal
                    info!("Console input closed");
                    console_open = false;
                }
            },
        }

        emit_pending_events(events);
    }

    Ok(())
}

/// Print every event queued since the last call
fn emit_pending_events(events: &mut broadcast::Receiver<EngineEvent>) {
    loop {
        match events.try_recv() {
            Ok(event) => HeadlessEvent::from(event).emit(),
            Err(broadcast::error::TryRecvError::Lagged(n)) => {
                warn!("Console fell behind, {} event(s) dropped", n);
            }
            Err(_) => break,
        }
    }
}

/// Read stdin line by line and forward parsed commands (blocking)
fn spawn_stdin_reader_blocking(console_tx: mpsc::Sender<ConsoleCommand>) {
    use std::io::BufRead;

    let stdin = std::io::stdin();
    let reader = stdin.lock();

    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                error!("Failed to read stdin: {}", e);
                break;
            }
        };

        match parse_command(&line) {
            Ok(Some(cmd)) => {
                let quit = matches!(cmd, ConsoleCommand::Send(jetctl_app::Message::Quit));
                if console_tx.blocking_send(cmd).is_err() {
                    break;
                }
                if quit {
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => {
                warn!("Rejected console input: {}", e);
                HeadlessEvent::error(e.to_string(), e.is_fatal()).emit();
            }
        }
    }

    info!("Stdin reader exiting");
}
