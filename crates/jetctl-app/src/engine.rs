//! Engine - orchestration shared by every front end
//!
//! The Engine owns the TEA state, the message channel, the action context
//! (backend handle and status poller), the shutdown signal and the event
//! broadcaster. A runner feeds it messages and renders the events it emits.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, watch};
use tracing::debug;

use jetctl_client::DeviceBackend;
use jetctl_core::{CommandTemplates, ConnectionState, PeripheralStates, Peripheral};

use crate::actions::ActionContext;
use crate::config::Settings;
use crate::engine_event::EngineEvent;
use crate::message::Message;
use crate::process;
use crate::signals;
use crate::state::{AppState, Screen};

/// Lightweight snapshot of state for change detection.
///
/// Captured before message processing, compared after to detect
/// what changed and emit the matching EngineEvents.
#[derive(Debug, Clone)]
struct StateSnapshot {
    connection: ConnectionState,
    peripherals: PeripheralStates,
    log_total: u64,
    screen: Screen,
    confirming: bool,
    templates: CommandTemplates,
    remote_history_version: u64,
}

impl StateSnapshot {
    fn capture(state: &AppState) -> Self {
        Self {
            connection: state.connection,
            peripherals: state.peripherals,
            log_total: state.log.total_appended(),
            screen: state.screen,
            confirming: state.confirm_dialog.is_some(),
            templates: state.commands.templates().clone(),
            remote_history_version: state.remote_history_version,
        }
    }
}

/// Orchestration engine for the Jetson control client.
pub struct Engine<B> {
    /// TEA application state (the Model)
    pub state: AppState,

    /// Sender half of the unified message channel.
    /// Clone this to give to input sources (signal handler, poller, console).
    pub msg_tx: mpsc::Sender<Message>,

    /// Receiver half of the unified message channel.
    pub msg_rx: mpsc::Receiver<Message>,

    /// Sender for the shutdown signal. Send `true` to initiate shutdown.
    pub shutdown_tx: watch::Sender<bool>,

    /// Receiver for the shutdown signal. Clone for background tasks.
    pub shutdown_rx: watch::Receiver<bool>,

    /// Loaded settings
    pub settings: Settings,

    ctx: ActionContext<B>,

    event_tx: broadcast::Sender<EngineEvent>,
}

impl<B> Engine<B>
where
    B: DeviceBackend + Sync + 'static,
{
    /// Create an Engine around a backend.
    ///
    /// Must be called inside a tokio runtime: it spawns the signal handler.
    pub fn new(backend: Arc<B>, settings: Settings) -> Self {
        let (msg_tx, msg_rx) = mpsc::channel::<Message>(256);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        signals::spawn_signal_handler(msg_tx.clone(), shutdown_rx.clone());

        let ctx = ActionContext::new(
            backend,
            settings.polling.interval(),
            settings.history.default_limit,
            shutdown_rx.clone(),
        );

        let (event_tx, _) = broadcast::channel(256);

        Self {
            state: AppState::new(),
            msg_tx,
            msg_rx,
            shutdown_tx,
            shutdown_rx,
            settings,
            ctx,
            event_tx,
        }
    }

    /// Kick off the startup chain: configuration, templates, health.
    pub fn start(&mut self) {
        self.process_message(Message::Startup);
    }

    /// Subscribe to engine events.
    ///
    /// A subscriber that falls more than 256 events behind sees
    /// `RecvError::Lagged` and loses the oldest ones.
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.event_tx.subscribe()
    }

    /// Process a single message through the TEA update cycle and emit
    /// events for whatever changed.
    pub fn process_message(&mut self, msg: Message) {
        let pre = StateSnapshot::capture(&self.state);

        process::process_message(&mut self.state, msg, &self.msg_tx, &mut self.ctx);

        let post = StateSnapshot::capture(&self.state);
        self.emit_events(&pre, &post);
    }

    /// Drain and process all pending messages from the channel.
    ///
    /// Returns the number of messages processed.
    pub fn drain_pending_messages(&mut self) -> usize {
        let mut count = 0;
        while let Ok(msg) = self.msg_rx.try_recv() {
            self.process_message(msg);
            count += 1;
        }
        count
    }

    pub fn msg_sender(&self) -> mpsc::Sender<Message> {
        self.msg_tx.clone()
    }

    pub fn shutdown_receiver(&self) -> watch::Receiver<bool> {
        self.shutdown_rx.clone()
    }

    pub fn should_quit(&self) -> bool {
        self.state.should_quit()
    }

    /// Status polling is active
    pub fn is_polling(&self) -> bool {
        self.ctx.is_polling()
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.ctx.backend
    }

    /// Stop the poller and abandon outstanding requests.
    pub fn shutdown(&mut self) {
        self.emit(EngineEvent::Shutdown);
        self.ctx.stop_polling();
        let _ = self.shutdown_tx.send(true);
        debug!("Engine shut down");
    }

    fn emit_events(&mut self, pre: &StateSnapshot, post: &StateSnapshot) {
        if pre.connection != post.connection {
            self.emit(EngineEvent::ConnectionChanged {
                from: pre.connection,
                to: post.connection,
            });
        }

        for action in self.state.take_started_actions() {
            self.emit(EngineEvent::ActionStarted {
                peripheral: action.peripheral,
                switch: action.switch,
                command: action.command,
            });
        }

        for peripheral in Peripheral::ALL {
            let on = post.peripherals.get(peripheral);
            if pre.peripherals.get(peripheral) != on {
                self.emit(EngineEvent::PeripheralChanged { peripheral, on });
            }
        }

        if post.log_total > pre.log_total {
            let fresh: Vec<_> = self
                .state
                .log
                .appended_since(pre.log_total)
                .cloned()
                .collect();
            for entry in fresh.into_iter().rev() {
                self.emit(EngineEvent::LogAppended { entry });
            }
        }

        if !pre.confirming && post.confirming {
            if let Some(dialog) = &self.state.confirm_dialog {
                self.emit(EngineEvent::ConfirmationRequested {
                    title: dialog.title.clone(),
                    message: dialog.message.clone(),
                });
            }
        }

        if pre.screen != post.screen {
            self.emit(EngineEvent::ScreenChanged {
                screen: post.screen,
            });
        }

        if pre.templates != post.templates {
            self.emit(EngineEvent::TemplatesChanged {
                templates: post.templates.clone(),
            });
        }

        if pre.remote_history_version != post.remote_history_version {
            self.emit(EngineEvent::RemoteHistoryUpdated {
                records: self.state.remote_history.clone(),
            });
        }

        for notice in self.state.take_notices() {
            self.emit(EngineEvent::Notice(notice));
        }
    }

    /// Emit a single EngineEvent to all subscribers.
    ///
    /// send() only fails when nobody is subscribed.
    fn emit(&self, event: EngineEvent) {
        let _ = self.event_tx.send(event);
    }
}
