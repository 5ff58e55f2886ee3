//! HTTP response building module
//!
//! Builders for the responses the routes produce. Every builder falls back
//! to a bare response if the header set turns out to be invalid.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{CACHE_CONTROL, CONTENT_LENGTH, CONTENT_TYPE, ETAG, LOCATION};
use hyper::http::response::Builder;
use hyper::{Response, StatusCode};
use serde::Serialize;

use super::cache::CachePolicy;

pub type HttpResponse = Response<Full<Bytes>>;

const HTML: &str = "text/html; charset=utf-8";
const JSON: &str = "application/json; charset=utf-8";
const TEXT: &str = "text/plain; charset=utf-8";

fn with_cache(builder: Builder, cache: Option<CachePolicy>) -> Builder {
    match cache {
        Some(policy) => builder.header(CACHE_CONTROL, policy.to_header_value()),
        None => builder,
    }
}

fn finish(builder: Builder, body: Bytes, label: &str) -> HttpResponse {
    builder.body(Full::new(body)).unwrap_or_else(|e| {
        log_build_error(label, &e);
        Response::new(Full::new(Bytes::new()))
    })
}

/// Response with a body and explicit content type
pub fn build_body_response(
    status: StatusCode,
    content_type: &str,
    body: impl Into<Bytes>,
    cache: Option<CachePolicy>,
) -> HttpResponse {
    let body = body.into();
    let builder = Response::builder()
        .status(status)
        .header(CONTENT_TYPE, content_type)
        .header(CONTENT_LENGTH, body.len());
    finish(with_cache(builder, cache), body, status.as_str())
}

/// Build HTML page response
pub fn build_html_response(content: String, cache: Option<CachePolicy>) -> HttpResponse {
    build_body_response(StatusCode::OK, HTML, content, cache)
}

/// Build JSON response
pub fn build_json_response<T: Serialize + ?Sized>(
    body: &T,
    cache: Option<CachePolicy>,
) -> Result<HttpResponse, serde_json::Error> {
    let json = serde_json::to_vec(body)?;
    Ok(build_body_response(StatusCode::OK, JSON, json, cache))
}

/// Build static file response carrying an `ETag`
pub fn build_file_response(
    data: Vec<u8>,
    content_type: &str,
    etag: &str,
    cache: CachePolicy,
) -> HttpResponse {
    let builder = Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, content_type)
        .header(CONTENT_LENGTH, data.len())
        .header(ETAG, etag)
        .header(CACHE_CONTROL, cache.to_header_value());
    finish(builder, Bytes::from(data), "200")
}

/// Build 304 Not Modified response
pub fn build_304_response(etag: &str, cache: CachePolicy) -> HttpResponse {
    let builder = Response::builder()
        .status(StatusCode::NOT_MODIFIED)
        .header(ETAG, etag)
        .header(CACHE_CONTROL, cache.to_header_value());
    finish(builder, Bytes::new(), "304")
}

/// Build 302 redirect response
pub fn build_redirect_response(target: &str) -> HttpResponse {
    let builder = Response::builder()
        .status(StatusCode::FOUND)
        .header(LOCATION, target)
        .header(CONTENT_TYPE, TEXT);
    finish(builder, Bytes::from(format!("Redirecting to {target}.")), "302")
}

/// Build 404 Not Found response (empty body)
pub fn build_404_response() -> HttpResponse {
    let builder = Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header(CONTENT_LENGTH, 0);
    finish(builder, Bytes::new(), "404")
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> HttpResponse {
    let builder = Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header("Allow", "GET, HEAD");
    build_text(builder, "405 Method Not Allowed", "405")
}

/// Build 500 Internal Server Error response
pub fn build_500_response() -> HttpResponse {
    let builder = Response::builder().status(StatusCode::INTERNAL_SERVER_ERROR);
    build_text(builder, "Internal Server Error", "500")
}

fn build_text(builder: Builder, text: &'static str, label: &str) -> HttpResponse {
    let builder = builder
        .header(CONTENT_TYPE, TEXT)
        .header(CONTENT_LENGTH, text.len());
    finish(builder, Bytes::from_static(text.as_bytes()), label)
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_response_headers() {
        let resp = build_html_response("<p>hi</p>".to_string(), Some(CachePolicy::SHELL));
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[CONTENT_TYPE], HTML);
        assert_eq!(resp.headers()[CONTENT_LENGTH], "9");
        assert_eq!(resp.headers()[CACHE_CONTROL], "public, max-age=300");
    }

    #[test]
    fn test_uncached_response_has_no_cache_header() {
        let resp = build_html_response(String::new(), None);
        assert!(resp.headers().get(CACHE_CONTROL).is_none());
    }

    #[test]
    fn test_redirect_response() {
        let resp = build_redirect_response("/games/reversi");
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(resp.headers()[LOCATION], "/games/reversi");
    }

    #[test]
    fn test_invalid_location_falls_back() {
        let resp = build_redirect_response("bad\nheader");
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().get(LOCATION).is_none());
    }

    #[test]
    fn test_json_response() {
        let resp = build_json_response(&Vec::<u8>::new(), None).unwrap();
        assert_eq!(resp.headers()[CONTENT_TYPE], JSON);
        assert_eq!(resp.headers()[CONTENT_LENGTH], "2");
    }
}
