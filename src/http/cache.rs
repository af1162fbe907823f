//! Conditional request module
//!
//! Provides `ETag` / `Last-Modified` validators and evaluates
//! `If-None-Match` and `If-Modified-Since`. Nothing is stored server side.

use chrono::{DateTime, Utc};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::{SystemTime, UNIX_EPOCH};

/// IMF-fixdate, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Generate an `ETag` from file size and modification time
///
/// # Returns
/// Quoted `ETag` string, e.g., `"abc123def"`
pub fn generate_etag(size: usize, modified: Option<SystemTime>) -> String {
    let mut hasher = DefaultHasher::new();
    size.hash(&mut hasher);
    if let Some(nanos) = modified
        .and_then(|m| m.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_nanos())
    {
        nanos.hash(&mut hasher);
    }
    format!("\"{:x}\"", hasher.finish())
}

/// Check if client's `If-None-Match` header matches the server's `ETag`
///
/// Supports a single tag, a comma separated list and `*`. Comparison is weak,
/// so `W/"abc"` matches `"abc"`.
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|client_etag| {
        client_etag.split(',').map(str::trim).any(|e| {
            e == "*" || e.strip_prefix("W/").unwrap_or(e) == etag
        })
    })
}

/// Format a timestamp as an HTTP date
pub fn http_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).format(HTTP_DATE_FORMAT).to_string()
}

/// Parse an HTTP date (IMF-fixdate; also accepts other RFC 2822 forms)
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// True when the file has not changed since the client's `If-Modified-Since`
///
/// HTTP dates have one second resolution, so sub-second parts of the
/// modification time are ignored.
pub fn not_modified_since(if_modified_since: Option<&str>, modified: Option<SystemTime>) -> bool {
    let (Some(header), Some(modified)) = (if_modified_since, modified) else {
        return false;
    };
    let Some(since) = parse_http_date(header) else {
        return false;
    };
    DateTime::<Utc>::from(modified).timestamp() <= since.timestamp()
}

/// Evaluate conditional headers, `If-None-Match` taking precedence
pub fn is_not_modified(
    if_none_match: Option<&str>,
    if_modified_since: Option<&str>,
    etag: &str,
    modified: Option<SystemTime>,
) -> bool {
    if if_none_match.is_some() {
        return check_etag_match(if_none_match, etag);
    }
    not_modified_since(if_modified_since, modified)
}
