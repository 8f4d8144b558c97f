//! Action handlers: UpdateAction dispatch and background task spawning
//!
//! Every backend call runs on its own tokio task and reports back with a
//! result `Message`. Nothing here touches `AppState`.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::debug;

use jetctl_client::DeviceBackend;

use crate::handler::UpdateAction;
use crate::message::Message;
use crate::poller::StatusPoller;

pub(crate) mod control;
pub(crate) mod session;

/// Resources the action executor needs
pub struct ActionContext<B> {
    pub backend: Arc<B>,
    /// Running status poll timer, if any
    pub poller: Option<StatusPoller>,
    pub poll_interval: Duration,
    /// Remote history entries fetched when no limit is given
    pub history_limit: usize,
    pub shutdown_rx: watch::Receiver<bool>,
}

impl<B> ActionContext<B> {
    pub fn new(
        backend: Arc<B>,
        poll_interval: Duration,
        history_limit: usize,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            backend,
            poller: None,
            poll_interval,
            history_limit,
            shutdown_rx,
        }
    }

    pub fn is_polling(&self) -> bool {
        self.poller.as_ref().is_some_and(StatusPoller::is_running)
    }

    /// Stop the poll timer; returns whether one was running
    pub fn stop_polling(&mut self) -> bool {
        match self.poller.take() {
            Some(poller) => {
                poller.stop();
                debug!("Status poller stopped");
                true
            }
            None => false,
        }
    }
}

/// Execute an action, spawning a background task where it needs the backend
pub fn handle_action<B>(action: UpdateAction, msg_tx: mpsc::Sender<Message>, ctx: &mut ActionContext<B>)
where
    B: DeviceBackend + Sync + 'static,
{
    match action {
        UpdateAction::StartPolling => {
            ctx.stop_polling();
            ctx.poller = Some(StatusPoller::spawn(ctx.poll_interval, msg_tx));
        }

        UpdateAction::StopPolling => {
            ctx.stop_polling();
        }

        UpdateAction::LoadConfig => {
            spawn_request(ctx, msg_tx, session::load_config(ctx.backend.clone()));
        }

        UpdateAction::SaveConfig { request } => {
            spawn_request(ctx, msg_tx, session::save_config(ctx.backend.clone(), request));
        }

        UpdateAction::CheckStatus { epoch } => {
            spawn_request(ctx, msg_tx, session::check_status(ctx.backend.clone(), epoch));
        }

        UpdateAction::Connect => {
            spawn_request(ctx, msg_tx, session::connect(ctx.backend.clone()));
        }

        UpdateAction::Shutdown => {
            spawn_request(ctx, msg_tx, control::shutdown(ctx.backend.clone()));
        }

        UpdateAction::Toggle { peripheral, switch } => {
            spawn_request(
                ctx,
                msg_tx,
                control::toggle(ctx.backend.clone(), peripheral, switch),
            );
        }

        UpdateAction::LoadCommands => {
            spawn_request(ctx, msg_tx, session::load_commands(ctx.backend.clone()));
        }

        UpdateAction::SaveCommands { templates } => {
            spawn_request(
                ctx,
                msg_tx,
                session::save_commands(ctx.backend.clone(), templates),
            );
        }

        UpdateAction::CheckHealth => {
            spawn_request(ctx, msg_tx, session::check_health(ctx.backend.clone()));
        }

        UpdateAction::Execute { command } => {
            spawn_request(ctx, msg_tx, control::execute(ctx.backend.clone(), command));
        }

        UpdateAction::FetchRemoteHistory { limit } => {
            let limit = limit.unwrap_or(ctx.history_limit).max(1);
            spawn_request(
                ctx,
                msg_tx,
                session::remote_history(ctx.backend.clone(), limit),
            );
        }
    }
}

/// Run `request` on a task and send its result message.
///
/// Abandoned without reporting when the engine signals shutdown first.
fn spawn_request<B, F>(ctx: &ActionContext<B>, msg_tx: mpsc::Sender<Message>, request: F)
where
    F: Future<Output = Message> + Send + 'static,
{
    let mut shutdown_rx = ctx.shutdown_rx.clone();
    if *shutdown_rx.borrow() {
        debug!("Shutdown in progress, request not sent");
        return;
    }

    tokio::spawn(async move {
        tokio::select! {
            msg = request => {
                let _ = msg_tx.send(msg).await;
            }
            _ = shutdown_rx.changed() => {
                debug!("Request abandoned on shutdown");
            }
        }
    });
}
