// Signal handling module
//
// Supported signals:
// - SIGTERM: Graceful shutdown
// - SIGINT:  Graceful shutdown (Ctrl+C)

use std::sync::Arc;
use tokio::sync::Notify;

use crate::logger;

/// Signal handler state
#[derive(Default)]
pub struct SignalHandler {
    /// Shutdown signal (SIGTERM, SIGINT)
    shutdown: Notify,
}

impl SignalHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the server loop to stop. The request is remembered even if nothing
    /// is waiting yet.
    pub fn request_shutdown(&self) {
        self.shutdown.notify_one();
    }

    /// Resolves once shutdown has been requested
    pub async fn wait_for_shutdown(&self) {
        self.shutdown.notified().await;
    }
}

/// Start signal handlers (Unix)
///
/// Registration happens before this returns, so a failure to install a
/// handler is reported to the caller instead of being lost in a task.
#[cfg(unix)]
pub fn start_signal_handler(handler: Arc<SignalHandler>) -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::spawn(async move {
        let name = tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        };
        logger::log_signal_received(name);
        handler.request_shutdown();
    });

    Ok(())
}

/// Non-unix fallback - only handles Ctrl+C
#[cfg(not(unix))]
pub fn start_signal_handler(handler: Arc<SignalHandler>) -> std::io::Result<()> {
    tokio::spawn(async move {
        if let Ok(()) = tokio::signal::ctrl_c().await {
            logger::log_signal_received("Ctrl+C");
            handler.request_shutdown();
        }
    });
    Ok(())
}
