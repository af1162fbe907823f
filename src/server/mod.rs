// Server module entry point
// Binds the listener, runs the accept loop and coordinates graceful shutdown

pub mod connection;
pub mod listener;
pub mod signal;

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::watch;

use crate::config::{AppState, Config};
use crate::error::ServerError;
use crate::handler::StaticResponder;
use crate::logger;

pub use listener::create_listener;
pub use signal::{start_signal_handler, SignalHandler};

/// Static file server
///
/// Owns its configuration and responder; nothing is registered globally.
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    /// Server around an explicitly configured responder
    pub fn new(config: &Config, responder: StaticResponder) -> Self {
        Self {
            state: Arc::new(AppState::with_responder(config, responder)),
        }
    }

    /// Server whose responder is built from `config.static_files`
    pub fn from_config(config: &Config) -> Self {
        Self {
            state: Arc::new(AppState::new(config)),
        }
    }

    /// Bind the configured address
    pub fn bind(&self) -> Result<TcpListener, ServerError> {
        let addr = self.state.config.socket_addr()?;
        create_listener(addr)
    }

    /// Bind, install signal handlers and serve until SIGINT/SIGTERM
    pub async fn run(&self) -> Result<(), ServerError> {
        let listener = self.bind()?;

        let signals = Arc::new(SignalHandler::new());
        start_signal_handler(Arc::clone(&signals))?;

        self.serve(listener, async move { signals.wait_for_shutdown().await })
            .await
    }

    /// Accept connections on `listener` until `shutdown` resolves
    ///
    /// After shutdown no new connections are accepted; open connections
    /// finish their current request and are closed, waiting at most
    /// `performance.shutdown_timeout` seconds.
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()>,
    {
        let local_addr = listener.local_addr()?;
        let config = &self.state.config;
        logger::log_server_start(&local_addr, config);

        let root = self.state.responder.root();
        if !root.is_dir() {
            logger::log_warning(&format!(
                "Root directory '{}' does not exist yet; requests will get 404",
                root.display()
            ));
        }

        let active_connections = Arc::new(AtomicUsize::new(0));
        let (stop_tx, stop_rx) = watch::channel(false);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                accept_result = listener.accept() => {
                    match accept_result {
                        Ok((stream, peer_addr)) => {
                            connection::accept_connection(
                                stream,
                                peer_addr,
                                &self.state,
                                &active_connections,
                                &stop_rx,
                            );
                        }
                        Err(e) => {
                            logger::log_error(&format!("Failed to accept connection: {e}"));
                            // e.g. EMFILE: back off instead of spinning on the error
                            tokio::time::sleep(Duration::from_millis(100)).await;
                        }
                    }
                }

                () = &mut shutdown => break,
            }
        }

        drop(listener);
        logger::log_shutdown_requested(active_connections.load(Ordering::SeqCst));
        stop_tx.send_replace(true);
        connection::wait_for_connections(&active_connections, config.shutdown_timeout()).await;
        logger::log_server_stopped();

        Ok(())
    }
}
