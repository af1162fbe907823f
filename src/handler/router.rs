//! Request dispatch module
//!
//! Entry point for HTTP request processing: method validation, resolution
//! through the responder, error mapping and access logging.

use crate::config::AppState;
use crate::error::ResolveError;
use crate::handler::static_files::{self, Resolved};
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body as _, Bytes};
use hyper::header::{self, HeaderMap};
use hyper::http::request::Parts;
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    /// Raw path, still percent-encoded
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub is_head: bool,
    pub if_none_match: Option<String>,
    pub if_modified_since: Option<String>,
    pub range_header: Option<String>,
}

impl<'a> RequestContext<'a> {
    pub fn from_parts(parts: &'a Parts) -> Self {
        let headers = &parts.headers;
        Self {
            path: parts.uri.path(),
            query: parts.uri.query(),
            is_head: parts.method == Method::HEAD,
            if_none_match: header_string(headers, &header::IF_NONE_MATCH),
            if_modified_since: header_string(headers, &header::IF_MODIFIED_SINCE),
            range_header: header_string(headers, &header::RANGE),
        }
    }

    /// `Location` for a directory requested without its trailing slash
    pub fn directory_location(&self) -> String {
        // Collapse leading slashes so the target cannot read as `//host/`
        let mut location = format!("/{}/", self.path.trim_start_matches('/'));
        if let Some(query) = self.query {
            location.push('?');
            location.push_str(query);
        }
        location
    }
}

fn header_string(headers: &HeaderMap, name: &header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

/// Main entry point for HTTP request handling
///
/// Request bodies are never read; the body is dropped up front.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let (parts, _) = req.into_parts();
    let response = respond(&parts, &state).await;

    if state.config.logging.access_log {
        log_access(&parts, &response, peer_addr, started, &state);
    }

    Ok(response)
}

async fn respond(parts: &Parts, state: &AppState) -> Response<Full<Bytes>> {
    if let Some(resp) = check_http_method(&parts.method) {
        return resp;
    }

    let ctx = RequestContext::from_parts(parts);

    match state.responder.resolve(ctx.path).await {
        Ok(Resolved::File(file)) => static_files::build_static_file_response(file, &ctx),
        Ok(Resolved::Listing(listing)) => {
            http::build_html_response(listing.render_html(), ctx.is_head)
        }
        Ok(Resolved::DirectoryRedirect) => {
            http::build_redirect_response(&ctx.directory_location())
        }
        Err(ResolveError::NotFound) => http::build_404_response(),
        Err(ResolveError::Forbidden) => http::build_403_response(),
        Err(ResolveError::Io(e)) => {
            logger::log_error(&format!("Failed to serve '{}': {e}", ctx.path));
            http::build_500_response()
        }
    }
}

/// Check HTTP method and return appropriate response for non-GET/HEAD methods
fn check_http_method(method: &Method) -> Option<Response<Full<Bytes>>> {
    match *method {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => Some(http::build_options_response()),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

fn log_access(
    parts: &Parts,
    response: &Response<Full<Bytes>>,
    peer_addr: SocketAddr,
    started: Instant,
    state: &AppState,
) {
    let mut entry = AccessLogEntry::new(peer_addr, parts.method.as_str(), parts.uri.path());
    entry.query = parts.uri.query().map(ToString::to_string);
    entry.http_version = format!("{:?}", parts.version);
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .body()
        .size_hint()
        .exact()
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(0);
    entry.referer = header_string(&parts.headers, &header::REFERER);
    entry.user_agent = header_string(&parts.headers, &header::USER_AGENT);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

    logger::log_access(&entry, &state.access_log_format);
}
