//! Logger module
//!
//! Provides logging utilities for the HTTP server including:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Error and warning logging
//! - File-based logging support

mod format;
pub mod writer;

pub use format::{AccessLogEntry, LogFormat};

use crate::config::Config;
use std::net::SocketAddr;

/// Initialize the logger with configuration
///
/// Should be called once at application startup. Until then every helper
/// below writes to stdout/stderr.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

/// Write to info/access log
fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

/// Write to error log
fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    write_info("======================================");
    write_info(&format!(
        "Serving {} on http://{addr}",
        config.static_files.root.display()
    ));
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    if let Some(max) = config.performance.max_connections {
        write_info(&format!("Max connections: {max}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("======================================");
}

pub fn log_server_stopped() {
    write_info("[Shutdown] Server stopped");
}

pub fn log_shutdown_requested(active: usize) {
    write_info(&format!(
        "[Shutdown] No longer accepting connections, {active} still open"
    ));
}

pub fn log_signal_received(name: &str) {
    write_info(&format!("[Signal] {name} received, shutting down"));
}

pub fn log_connection_error(peer_addr: &SocketAddr, err: &impl std::fmt::Display) {
    write_error(&format!("[ERROR] Failed to serve connection from {peer_addr}: {err}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

/// Fatal errors end the process right after this line is written
pub fn log_fatal(err: &impl std::fmt::Display) {
    write_error(&format!("[FATAL] {err}"));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &LogFormat) {
    write_info(&entry.format(format));
}
