// Configuration module entry point
// Loads layered configuration and holds the per-process application state

mod state;
mod types;

use std::net::{SocketAddr, ToSocketAddrs};
use std::time::Duration;

use crate::error::ServerError;

// Re-export public types
pub use state::AppState;
pub use types::{Config, LoggingConfig, PerformanceConfig, ServerConfig, StaticFilesConfig};

/// Default config file name (extension picked by the `config` crate)
pub const DEFAULT_CONFIG_FILE: &str = "config";

/// Environment variable prefix, e.g. `DIST_SERVER__PORT=9000`
pub const ENV_PREFIX: &str = "DIST";

impl Config {
    /// Load configuration from the default file and the environment
    pub fn load() -> Result<Self, ServerError> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load configuration from specified file path (without extension)
    ///
    /// The file is optional; missing keys fall back to the built-in defaults
    /// (`0.0.0.0:8080`, root `./dist`). Environment variables override the file.
    pub fn load_from(config_path: &str) -> Result<Self, ServerError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let cfg: Self = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject values the runtime cannot start with
    pub fn validate(&self) -> Result<(), ServerError> {
        if self.server.workers == Some(0) {
            return Err(config::ConfigError::Message(
                "server.workers must be at least 1".to_string(),
            )
            .into());
        }
        Ok(())
    }

    /// Resolve the listen address, accepting IP literals and host names
    pub fn socket_addr(&self) -> Result<SocketAddr, ServerError> {
        let host = self.server.host.as_str();
        let invalid = |reason: String| ServerError::InvalidAddress {
            addr: format!("{host}:{}", self.server.port),
            reason,
        };

        (host, self.server.port)
            .to_socket_addrs()
            .map_err(|e| invalid(e.to_string()))?
            .next()
            .ok_or_else(|| invalid("no address resolved".to_string()))
    }

    pub const fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.performance.read_timeout)
    }

    pub const fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.performance.connection_timeout)
    }

    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.performance.shutdown_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_defaults_serve_dist_on_8080() {
        let cfg = Config::default();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.static_files.root, Path::new("./dist"));
        assert_eq!(cfg.static_files.index_files[0], "index.html");
        assert!(cfg.static_files.directory_listing);
        assert!(cfg.logging.access_log);
    }

    #[test]
    fn test_socket_addr_from_ip_literal() {
        let mut cfg = Config::default();
        cfg.server.host = "127.0.0.1".to_string();
        cfg.server.port = 9090;
        assert_eq!(cfg.socket_addr().unwrap(), "127.0.0.1:9090".parse().unwrap());
    }

    #[test]
    fn test_socket_addr_ipv6() {
        let mut cfg = Config::default();
        cfg.server.host = "::1".to_string();
        assert!(cfg.socket_addr().unwrap().is_ipv6());
    }

    #[test]
    fn test_socket_addr_invalid_host() {
        let mut cfg = Config::default();
        cfg.server.host = "not a host name".to_string();
        assert!(matches!(
            cfg.socket_addr(),
            Err(ServerError::InvalidAddress { .. })
        ));
    }

    #[test]
    fn test_load_from_missing_file_uses_defaults() {
        let cfg = Config::load_from("this-config-file-does-not-exist").unwrap();
        assert_eq!(cfg.static_files.root, Path::new("./dist"));
        assert_eq!(cfg.performance.read_timeout, 30);
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = std::env::temp_dir().join(format!("dist-server-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("server.toml");
        std::fs::write(
            &file,
            "[server]\nport = 9000\n\n[static_files]\nroot = \"public\"\ndirectory_listing = false\n",
        )
        .unwrap();

        let cfg = Config::load_from(dir.join("server").to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.static_files.root, Path::new("public"));
        assert!(!cfg.static_files.directory_listing);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_from_rejects_zero_workers() {
        let dir = std::env::temp_dir().join(format!("dist-server-workers-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("server.toml"), "[server]\nworkers = 0\n").unwrap();

        let result = Config::load_from(dir.join("server").to_str().unwrap());
        assert!(matches!(result, Err(ServerError::Config(_))));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_validate_accepts_unset_or_positive_workers() {
        let mut cfg = Config::default();
        assert!(cfg.validate().is_ok());
        cfg.server.workers = Some(4);
        assert!(cfg.validate().is_ok());
    }
}
