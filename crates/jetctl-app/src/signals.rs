//! OS signals as `Message::Quit`
//!
//! The listener ends on the first quit signal or when the engine shuts down,
//! whichever comes first. SIGHUP counts as quit so a closed terminal does not
//! leave the console polling the device.

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use jetctl_core::prelude::*;

use crate::message::Message;

/// Forward the first quit signal to the engine as `Message::Quit`
pub fn spawn_signal_handler(
    tx: mpsc::Sender<Message>,
    shutdown_rx: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            received = next_quit_signal() => match received {
                Ok(name) => {
                    info!("{} received, quitting", name);
                    let _ = tx.send(Message::Quit).await;
                }
                Err(e) => error!("Signal handler unavailable: {}", e),
            },
            _ = engine_stopped(shutdown_rx) => {
                debug!("Signal handler stopped with the engine");
            }
        }
    })
}

async fn engine_stopped(mut shutdown_rx: watch::Receiver<bool>) {
    while !*shutdown_rx.borrow_and_update() {
        if shutdown_rx.changed().await.is_err() {
            return;
        }
    }
}

/// Name of the first quit signal delivered to the process
async fn next_quit_signal() -> Result<&'static str> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let listen = |kind: SignalKind, name: &str| {
            signal(kind).map_err(|e| Error::signal(format!("cannot listen for {}: {}", name, e)))
        };
        let mut sigint = listen(SignalKind::interrupt(), "SIGINT")?;
        let mut sigterm = listen(SignalKind::terminate(), "SIGTERM")?;
        let mut sighup = listen(SignalKind::hangup(), "SIGHUP")?;

        let name = tokio::select! {
            _ = sigint.recv() => "SIGINT",
            _ = sigterm.recv() => "SIGTERM",
            _ = sighup.recv() => "SIGHUP",
        };
        Ok(name)
    }

    #[cfg(windows)]
    {
        tokio::signal::ctrl_c()
            .await
            .map_err(|e| Error::signal(format!("cannot listen for Ctrl+C: {}", e)))?;
        Ok("Ctrl+C")
    }
}
