//! HTTP response building module
//!
//! Provides builders for the status codes the file server emits.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

use super::range::ByteRange;

pub const ALLOWED_METHODS: &str = "GET, HEAD, OPTIONS";

/// Validators sent with every file response
#[derive(Debug, Clone)]
pub struct Validators {
    pub etag: String,
    pub last_modified: Option<String>,
}

/// Build 304 Not Modified response
pub fn build_304_response(validators: &Validators) -> Response<Full<Bytes>> {
    let mut builder = Response::builder()
        .status(304)
        .header("ETag", &validators.etag);
    if let Some(ref last_modified) = validators.last_modified {
        builder = builder.header("Last-Modified", last_modified);
    }
    builder.body(Full::new(Bytes::new())).unwrap_or_else(|e| {
        log_build_error("304", &e);
        Response::new(Full::new(Bytes::new()))
    })
}

/// Build 301 redirect response
pub fn build_redirect_response(location: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(301)
        .header("Location", location)
        .header("Content-Type", "text/plain; charset=utf-8")
        .body(Full::new(Bytes::from("Moved Permanently")))
        .unwrap_or_else(|e| {
            log_build_error("301", &e);
            Response::new(Full::new(Bytes::from("Moved Permanently")))
        })
}

/// Build 403 Forbidden response
pub fn build_403_response() -> Response<Full<Bytes>> {
    build_plain_error(403, "403 Forbidden")
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<Full<Bytes>> {
    build_plain_error(404, "404 Not Found")
}

/// Build 500 Internal Server Error response
pub fn build_500_response() -> Response<Full<Bytes>> {
    build_plain_error(500, "500 Internal Server Error")
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(405)
        .header("Content-Type", "text/plain; charset=utf-8")
        .header("Allow", ALLOWED_METHODS)
        .body(Full::new(Bytes::from("405 Method Not Allowed")))
        .unwrap_or_else(|e| {
            log_build_error("405", &e);
            Response::new(Full::new(Bytes::from("405 Method Not Allowed")))
        })
}

/// Build OPTIONS response
pub fn build_options_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(204)
        .header("Allow", ALLOWED_METHODS)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("OPTIONS", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 416 Range Not Satisfiable response
pub fn build_416_response(file_size: usize) -> Response<Full<Bytes>> {
    Response::builder()
        .status(416)
        .header("Content-Type", "text/plain; charset=utf-8")
        .header("Content-Range", format!("bytes */{file_size}"))
        .body(Full::new(Bytes::from("416 Range Not Satisfiable")))
        .unwrap_or_else(|e| {
            log_build_error("416", &e);
            Response::new(Full::new(Bytes::from("416 Range Not Satisfiable")))
        })
}

/// Build HTML response (directory listings)
pub fn build_html_response(content: String, is_head: bool) -> Response<Full<Bytes>> {
    let content_length = content.len();
    let body = if is_head {
        Bytes::new()
    } else {
        Bytes::from(content)
    };

    Response::builder()
        .status(200)
        .header("Content-Type", "text/html; charset=utf-8")
        .header("Content-Length", content_length)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error("HTML", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 200 response for a whole file
///
/// `Content-Length` always reflects the file size, even for HEAD.
pub fn build_file_response(
    data: Bytes,
    content_type: &str,
    validators: &Validators,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let content_length = data.len();
    let body = if is_head { Bytes::new() } else { data };

    let mut builder = Response::builder()
        .status(200)
        .header("Content-Type", content_type)
        .header("Content-Length", content_length)
        .header("Accept-Ranges", "bytes")
        .header("ETag", &validators.etag);
    if let Some(ref last_modified) = validators.last_modified {
        builder = builder.header("Last-Modified", last_modified);
    }

    builder.body(Full::new(body)).unwrap_or_else(|e| {
        log_build_error("200", &e);
        Response::new(Full::new(Bytes::new()))
    })
}

/// Build 206 Partial Content response
pub fn build_partial_response(
    data: &Bytes,
    range: ByteRange,
    content_type: &str,
    validators: &Validators,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let body = if is_head {
        Bytes::new()
    } else {
        data.slice(range.start..=range.end)
    };

    let mut builder = Response::builder()
        .status(206)
        .header("Content-Type", content_type)
        .header("Content-Length", range.len())
        .header("Content-Range", range.content_range(data.len()))
        .header("Accept-Ranges", "bytes")
        .header("ETag", &validators.etag);
    if let Some(ref last_modified) = validators.last_modified {
        builder = builder.header("Last-Modified", last_modified);
    }

    builder.body(Full::new(body)).unwrap_or_else(|e| {
        log_build_error("206", &e);
        Response::new(Full::new(Bytes::new()))
    })
}

fn build_plain_error(status: u16, message: &'static str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("Content-Type", "text/plain; charset=utf-8")
        .header("Content-Length", message.len())
        .body(Full::new(Bytes::from(message)))
        .unwrap_or_else(|e| {
            log_build_error(&status.to_string(), &e);
            Response::new(Full::new(Bytes::from(message)))
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    fn validators() -> Validators {
        Validators {
            etag: "\"abc\"".to_string(),
            last_modified: Some("Sun, 06 Nov 1994 08:49:37 GMT".to_string()),
        }
    }

    async fn body_bytes(resp: Response<Full<Bytes>>) -> Bytes {
        resp.into_body().collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn test_file_response_headers_and_body() {
        let resp = build_file_response(
            Bytes::from_static(b"hello world\n"),
            "text/html; charset=utf-8",
            &validators(),
            false,
        );
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["Content-Length"], "12");
        assert_eq!(resp.headers()["ETag"], "\"abc\"");
        assert_eq!(
            resp.headers()["Last-Modified"],
            "Sun, 06 Nov 1994 08:49:37 GMT"
        );
        assert_eq!(body_bytes(resp).await, "hello world\n");
    }

    #[tokio::test]
    async fn test_head_keeps_length_drops_body() {
        let resp = build_file_response(
            Bytes::from_static(b"hello world\n"),
            "text/plain",
            &validators(),
            true,
        );
        assert_eq!(resp.headers()["Content-Length"], "12");
        assert!(body_bytes(resp).await.is_empty());
    }

    #[tokio::test]
    async fn test_partial_response_slices_body() {
        let data = Bytes::from_static(b"0123456789");
        let resp = build_partial_response(
            &data,
            ByteRange { start: 2, end: 5 },
            "text/plain",
            &validators(),
            false,
        );
        assert_eq!(resp.status(), 206);
        assert_eq!(resp.headers()["Content-Range"], "bytes 2-5/10");
        assert_eq!(resp.headers()["Content-Length"], "4");
        assert_eq!(body_bytes(resp).await, "2345");
    }

    #[test]
    fn test_error_statuses() {
        assert_eq!(build_403_response().status(), 403);
        assert_eq!(build_404_response().status(), 404);
        assert_eq!(build_500_response().status(), 500);
        let resp = build_405_response();
        assert_eq!(resp.status(), 405);
        assert_eq!(resp.headers()["Allow"], ALLOWED_METHODS);
        assert_eq!(build_416_response(10).headers()["Content-Range"], "bytes */10");
    }

    #[test]
    fn test_redirect_location() {
        let resp = build_redirect_response("/docs/");
        assert_eq!(resp.status(), 301);
        assert_eq!(resp.headers()["Location"], "/docs/");
    }
}
