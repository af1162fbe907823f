//! Error types
//!
//! `ResolveError` stays inside a single request and is turned into an HTTP
//! status by the handler. `ServerError` is what `main` sees; only a bind or
//! configuration failure ends the process.

use std::io;
use std::net::SocketAddr;

/// Failure to map a request path onto a readable file under the root
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// Path does not name a readable file (404)
    #[error("not found")]
    NotFound,
    /// Path tries to leave the root directory (403)
    #[error("forbidden: path escapes the root directory")]
    Forbidden,
    /// Any other filesystem failure, e.g. permission denied (500)
    #[error("filesystem error: {0}")]
    Io(#[source] io::Error),
}

impl From<io::Error> for ResolveError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound
            | io::ErrorKind::NotADirectory
            | io::ErrorKind::InvalidInput => Self::NotFound,
            _ => Self::Io(err),
        }
    }
}

/// Process-level failures
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("invalid listen address '{addr}': {reason}")]
    InvalidAddress { addr: String, reason: String },
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_kinds_map_to_not_found() {
        for kind in [
            io::ErrorKind::NotFound,
            io::ErrorKind::NotADirectory,
            io::ErrorKind::InvalidInput,
        ] {
            let err = ResolveError::from(io::Error::from(kind));
            assert!(matches!(err, ResolveError::NotFound), "{kind:?}");
        }
    }

    #[test]
    fn test_permission_denied_stays_io() {
        let err = ResolveError::from(io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(err, ResolveError::Io(_)));
    }

    #[test]
    fn test_bind_error_message_names_address() {
        let err = ServerError::Bind {
            addr: "127.0.0.1:8080".parse().unwrap(),
            source: io::Error::from(io::ErrorKind::AddrInUse),
        };
        assert!(err.to_string().contains("127.0.0.1:8080"));
    }
}
