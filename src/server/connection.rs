// Connection handling module
// Accepts a single TCP connection and serves HTTP/1.1 on it in its own task

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use tokio::net::TcpStream;
use tokio::sync::watch;

use crate::config::AppState;
use crate::handler;
use crate::logger;

/// Accept a connection, enforcing `max_connections`.
///
/// # Arguments
///
/// * `stream` - The TCP stream to handle
/// * `peer_addr` - The peer's socket address
/// * `state` - Shared application state
/// * `conn_counter` - Active connection counter
/// * `shutdown` - Flips to `true` when the server stops accepting
pub fn accept_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: &Arc<AppState>,
    conn_counter: &Arc<AtomicUsize>,
    shutdown: &watch::Receiver<bool>,
) {
    // Increment counter first, then check limit (prevents race condition)
    let prev_count = conn_counter.fetch_add(1, Ordering::SeqCst);

    if let Some(max_conn) = state.config.performance.max_connections {
        if prev_count >= usize::try_from(max_conn).unwrap_or(usize::MAX) {
            // Exceeded limit: rollback counter and reject
            conn_counter.fetch_sub(1, Ordering::SeqCst);
            logger::log_warning(&format!(
                "Max connections reached: {prev_count}/{max_conn}. Connection from {peer_addr} rejected."
            ));
            drop(stream);
            return;
        }
    }

    handle_connection(
        stream,
        peer_addr,
        Arc::clone(state),
        Arc::clone(conn_counter),
        shutdown.clone(),
    );
}

/// Serve one connection in a spawned task.
///
/// Requests on the connection are handled one at a time (keep-alive). The
/// task ends when the client closes or an I/O error occurs. Shutdown and the
/// connection timeout both close gracefully: a response already being
/// written is sent in full. Errors are logged and never reach other
/// connections.
fn handle_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
    conn_counter: Arc<AtomicUsize>,
    mut shutdown: watch::Receiver<bool>,
) {
    tokio::spawn(async move {
        let io = TokioIo::new(stream);
        let performance = &state.config.performance;

        let mut builder = http1::Builder::new();
        builder.keep_alive(performance.keep_alive);
        builder.timer(TokioTimer::new());
        if performance.read_timeout > 0 {
            builder.header_read_timeout(state.config.read_timeout());
        }

        let service_state = Arc::clone(&state);
        let conn = builder.serve_connection(
            io,
            service_fn(move |req| {
                handler::handle_request(req, Arc::clone(&service_state), peer_addr)
            }),
        );
        tokio::pin!(conn);

        // Past the deadline the connection finishes its in-flight response
        // and is then closed
        let limit = state.config.connection_timeout();
        let deadline = tokio::time::sleep(limit);
        tokio::pin!(deadline);

        let mut closing = false;
        let result = loop {
            tokio::select! {
                res = conn.as_mut() => break res,
                _ = shutdown.wait_for(|stop| *stop), if !closing => {
                    conn.as_mut().graceful_shutdown();
                    closing = true;
                }
                () = &mut deadline, if !closing && !limit.is_zero() => {
                    logger::log_warning(&format!(
                        "Connection from {peer_addr} reached {} seconds, closing after current response",
                        limit.as_secs()
                    ));
                    conn.as_mut().graceful_shutdown();
                    closing = true;
                }
            }
        };

        if let Err(err) = result {
            logger::log_connection_error(&peer_addr, &err);
        }

        // Decrement active connection counter
        conn_counter.fetch_sub(1, Ordering::SeqCst);
    });
}

/// Wait until every connection task has finished, or `timeout` elapses
pub async fn wait_for_connections(conn_counter: &AtomicUsize, timeout: Duration) {
    let deadline = tokio::time::Instant::now() + timeout;

    loop {
        let active = conn_counter.load(Ordering::SeqCst);
        if active == 0 {
            return;
        }
        if tokio::time::Instant::now() >= deadline {
            logger::log_warning(&format!(
                "Shutdown timeout after {} seconds, abandoning {active} connection(s)",
                timeout.as_secs()
            ));
            return;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}
