//! Access log format module
//!
//! Supports multiple log formats:
//! - `combined` (Apache/Nginx combined format)
//! - `common` (Common Log Format - CLF)
//! - `json` (one JSON object per line)
//! - Custom patterns with `$variables`

use chrono::{DateTime, Local};
use serde_json::json;
use std::net::SocketAddr;

const CLF_TIME_FORMAT: &str = "%d/%b/%Y:%H:%M:%S %z";

/// Parsed `logging.access_log_format`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFormat {
    Combined,
    Common,
    Json,
    Custom(String),
}

impl LogFormat {
    pub fn parse(format: &str) -> Self {
        match format {
            "combined" => Self::Combined,
            "common" => Self::Common,
            "json" => Self::Json,
            custom => Self::Custom(custom.to_string()),
        }
    }
}

/// Access log entry containing all request/response information
#[derive(Debug, Clone)]
pub struct AccessLogEntry {
    /// Client address
    pub remote_addr: SocketAddr,
    /// Request timestamp
    pub time: DateTime<Local>,
    pub method: String,
    /// Request URI path, still percent-encoded
    pub path: String,
    /// Query string (without leading ?)
    pub query: Option<String>,
    /// HTTP version as printed in the request line, e.g. `HTTP/1.1`
    pub http_version: String,
    pub status: u16,
    /// Response body size in bytes (0 for HEAD and 304)
    pub body_bytes: usize,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
    /// Request processing time in microseconds
    pub request_time_us: u64,
}

impl AccessLogEntry {
    /// Create a new access log entry with current timestamp
    pub fn new(remote_addr: SocketAddr, method: &str, path: &str) -> Self {
        Self {
            remote_addr,
            time: Local::now(),
            method: method.to_string(),
            path: path.to_string(),
            query: None,
            http_version: "HTTP/1.1".to_string(),
            status: 200,
            body_bytes: 0,
            referer: None,
            user_agent: None,
            request_time_us: 0,
        }
    }

    /// Format the log entry according to the configured format
    pub fn format(&self, format: &LogFormat) -> String {
        match format {
            LogFormat::Combined => format!(
                "{} \"{}\" \"{}\"",
                self.format_common(),
                self.referer.as_deref().unwrap_or("-"),
                self.user_agent.as_deref().unwrap_or("-"),
            ),
            LogFormat::Common => self.format_common(),
            LogFormat::Json => self.format_json(),
            LogFormat::Custom(pattern) => self.format_custom(pattern),
        }
    }

    fn request_uri(&self) -> String {
        match &self.query {
            Some(q) => format!("{}?{q}", self.path),
            None => self.path.clone(),
        }
    }

    fn request_line(&self) -> String {
        format!("{} {} {}", self.method, self.request_uri(), self.http_version)
    }

    /// Common Log Format (CLF)
    /// `$remote_addr - - [$time_local] "$request" $status $body_bytes_sent`
    fn format_common(&self) -> String {
        format!(
            "{} - - [{}] \"{}\" {} {}",
            self.remote_addr.ip(),
            self.time.format(CLF_TIME_FORMAT),
            self.request_line(),
            self.status,
            self.body_bytes,
        )
    }

    fn format_json(&self) -> String {
        json!({
            "remote_addr": self.remote_addr.ip().to_string(),
            "time": self.time.to_rfc3339(),
            "method": self.method,
            "path": self.path,
            "query": self.query,
            "http_version": self.http_version,
            "status": self.status,
            "body_bytes": self.body_bytes,
            "referer": self.referer,
            "user_agent": self.user_agent,
            "request_time_us": self.request_time_us,
        })
        .to_string()
    }

    /// Custom format with variable substitution
    ///
    /// Supported variables:
    /// - `$remote_addr` - Client IP address
    /// - `$time_local` - Local time in Common Log Format
    /// - `$time_iso8601` - ISO 8601 timestamp
    /// - `$request` - Full request line ("METHOD /path HTTP/version")
    /// - `$request_method` - HTTP method
    /// - `$request_uri` - Request URI with query string
    /// - `$status` - Response status code
    /// - `$body_bytes_sent` - Response body size
    /// - `$http_referer` - Referer header
    /// - `$http_user_agent` - User-Agent header
    /// - `$request_time` - Request processing time in seconds (3 decimal places)
    fn format_custom(&self, pattern: &str) -> String {
        #[allow(clippy::cast_precision_loss)]
        let request_time = self.request_time_us as f64 / 1_000_000.0;

        // Longer names first: $request_time and friends before $request
        pattern
            .replace("$remote_addr", &self.remote_addr.ip().to_string())
            .replace("$time_local", &self.time.format(CLF_TIME_FORMAT).to_string())
            .replace("$time_iso8601", &self.time.to_rfc3339())
            .replace("$request_time", &format!("{request_time:.3}"))
            .replace("$request_method", &self.method)
            .replace("$request_uri", &self.request_uri())
            .replace("$request", &self.request_line())
            .replace("$status", &self.status.to_string())
            .replace("$body_bytes_sent", &self.body_bytes.to_string())
            .replace("$http_referer", self.referer.as_deref().unwrap_or("-"))
            .replace("$http_user_agent", self.user_agent.as_deref().unwrap_or("-"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_entry() -> AccessLogEntry {
        let mut entry = AccessLogEntry::new(
            "192.168.1.1:53122".parse().unwrap(),
            "GET",
            "/static/js/main.js",
        );
        entry.query = Some("v=2".to_string());
        entry.status = 200;
        entry.body_bytes = 1234;
        entry.referer = Some("https://example.com/".to_string());
        entry.user_agent = Some("Mozilla/5.0".to_string());
        entry.request_time_us = 1500;
        entry
    }

    #[test]
    fn test_parse_format() {
        assert_eq!(LogFormat::parse("combined"), LogFormat::Combined);
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(
            LogFormat::parse("$status"),
            LogFormat::Custom("$status".to_string())
        );
    }

    #[test]
    fn test_format_combined() {
        let log = create_test_entry().format(&LogFormat::Combined);
        assert!(log.starts_with("192.168.1.1 - - ["));
        assert!(log.contains("\"GET /static/js/main.js?v=2 HTTP/1.1\" 200 1234"));
        assert!(log.ends_with("\"https://example.com/\" \"Mozilla/5.0\""));
    }

    #[test]
    fn test_format_common() {
        let log = create_test_entry().format(&LogFormat::Common);
        assert!(log.contains("\"GET /static/js/main.js?v=2 HTTP/1.1\" 200 1234"));
        // Common format does not include referer/user-agent
        assert!(!log.contains("https://example.com/"));
    }

    #[test]
    fn test_format_json() {
        let log = create_test_entry().format(&LogFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&log).unwrap();
        assert_eq!(value["remote_addr"], "192.168.1.1");
        assert_eq!(value["method"], "GET");
        assert_eq!(value["status"], 200);
        assert_eq!(value["body_bytes"], 1234);
        assert_eq!(value["query"], "v=2");
    }

    #[test]
    fn test_format_json_escapes_quotes() {
        let mut entry = create_test_entry();
        entry.user_agent = Some("evil\" agent".to_string());
        let value: serde_json::Value =
            serde_json::from_str(&entry.format(&LogFormat::Json)).unwrap();
        assert_eq!(value["user_agent"], "evil\" agent");
    }

    #[test]
    fn test_format_custom() {
        let log = create_test_entry().format(&LogFormat::parse(
            "$remote_addr $request_method $status $request_time",
        ));
        // 1500us = 0.0015s, rounded to 3 decimal places
        assert!(log.starts_with("192.168.1.1 GET 200 0.00"), "got: {log}");
    }
}
