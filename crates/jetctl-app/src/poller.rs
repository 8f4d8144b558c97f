//! Periodic status poll timer.
//!
//! The poller never looks at state. It only sends `Message::PollTick` on a
//! fixed period; the handler decides whether a tick turns into a status
//! check. Stopping it (explicitly or by dropping it) guarantees no further
//! ticks are sent.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, trace};

use crate::message::Message;

/// Handle to a running poll timer task
#[derive(Debug)]
pub struct StatusPoller {
    period: Duration,
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl StatusPoller {
    /// Start ticking. The first tick fires one full `period` from now; the
    /// immediate check on becoming configured is sent by the handler.
    pub fn spawn(period: Duration, msg_tx: mpsc::Sender<Message>) -> Self {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        trace!("Status poll tick");
                        if msg_tx.send(Message::PollTick).await.is_err() {
                            debug!("Message channel closed, status poller exiting");
                            break;
                        }
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }
        });

        debug!("Status poller started ({:?})", period);
        Self {
            period,
            shutdown_tx,
            handle,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Signal the task and abort it
    pub fn stop(&self) {
        let _ = self.shutdown_tx.send(true);
        self.handle.abort();
    }
}

impl Drop for StatusPoller {
    fn drop(&mut self) {
        self.stop();
    }
}
