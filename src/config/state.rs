// Application state module
// Immutable per-process state shared by every connection task

use super::types::Config;
use crate::handler::StaticResponder;
use crate::logger::LogFormat;

/// Application state
///
/// Built once at startup and handed to connection tasks through an `Arc`.
/// Nothing in here changes after construction.
pub struct AppState {
    pub config: Config,
    pub responder: StaticResponder,
    /// Parsed once from `logging.access_log_format`
    pub access_log_format: LogFormat,
}

impl AppState {
    /// Create state with a responder rooted at `static_files.root`
    pub fn new(config: &Config) -> Self {
        Self::with_responder(config, StaticResponder::from_config(&config.static_files))
    }

    /// Create state around an explicitly constructed responder
    pub fn with_responder(config: &Config, responder: StaticResponder) -> Self {
        Self {
            config: config.clone(),
            responder,
            access_log_format: LogFormat::parse(&config.logging.access_log_format),
        }
    }
}
