//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method gate, route matching,
//! dispatch, and the headers every response carries.

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderValue, IF_NONE_MATCH, X_FRAME_OPTIONS};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use super::{docs, info, manifest, openapi, pages, static_files, url_preview};
use crate::config::AppState;
use crate::error::Result;
use crate::http::{self, CachePolicy, HttpResponse};
use crate::logger::{self, AccessLogEntry};
use crate::routing::{match_route, redirect, Matched, RouteKind, ROUTES};

/// Request context encapsulating information needed for request processing
#[derive(Debug, Clone, Copy)]
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub if_none_match: Option<&'a str>,
}

impl<'a> RequestContext<'a> {
    pub fn from_request<B>(req: &'a Request<B>) -> Self {
        Self {
            path: req.uri().path(),
            query: req.uri().query(),
            if_none_match: req
                .headers()
                .get(IF_NONE_MATCH)
                .and_then(|v| v.to_str().ok()),
        }
    }

    /// Context with no query and no conditional headers
    #[cfg(test)]
    pub const fn bare(path: &'a str) -> Self {
        Self {
            path,
            query: None,
            if_none_match: None,
        }
    }

    /// First value of a query parameter, percent-decoded
    pub fn query_param(&self, name: &str) -> Option<String> {
        url::form_urlencoded::parse(self.query?.as_bytes())
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer: Option<SocketAddr>,
) -> std::result::Result<HttpResponse, Infallible> {
    let started = Instant::now();
    let is_head = req.method() == Method::HEAD;

    let response = match req.method() {
        &Method::GET | &Method::HEAD => {
            let ctx = RequestContext::from_request(&req);
            match dispatch(&ctx, &state).await {
                Ok(resp) => resp,
                Err(e) => {
                    logger::log_error(&format!("{} {}: {e}", req.method(), ctx.path));
                    http::build_500_response()
                }
            }
        }
        method => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            http::build_405_response()
        }
    };

    let response = finalize(response, is_head);

    if state.access_log {
        let mut entry = AccessLogEntry::from_request(
            peer,
            req.method(),
            req.uri(),
            req.version(),
            req.headers(),
        );
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Stamp the framing policy and drop the body of HEAD responses
fn finalize(response: HttpResponse, is_head: bool) -> HttpResponse {
    let (mut parts, body) = response.into_parts();
    parts
        .headers
        .insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    let body = if is_head { Full::new(Bytes::new()) } else { body };
    Response::from_parts(parts, body)
}

/// Resolve the route and run its handler
async fn dispatch(ctx: &RequestContext<'_>, state: &AppState) -> Result<HttpResponse> {
    let Some(Matched { route, capture }) = match_route(ctx.path, ROUTES) else {
        return pages::shell(state).await;
    };
    let client = state.config.web.client_dir.as_path();

    match route.kind {
        RouteKind::Favicon => {
            static_files::send(ctx, client, "/assets/favicon.png", CachePolicy::FAVICON).await
        }
        RouteKind::Assets => static_files::send(ctx, client, ctx.path, CachePolicy::ASSETS).await,
        RouteKind::AppleTouchIcon => {
            static_files::send(
                ctx,
                client,
                "/assets/apple-touch-icon.png",
                CachePolicy::SEND_DEFAULT,
            )
            .await
        }
        RouteKind::ServiceWorker => {
            let file = format!("/assets/sw.{}.js", capture.unwrap_or_default());
            static_files::send(ctx, client, &file, CachePolicy::SEND_DEFAULT).await
        }
        RouteKind::Manifest => manifest::serve(state).await,
        RouteKind::Robots => {
            static_files::send(ctx, client, "/assets/robots.txt", CachePolicy::SEND_DEFAULT).await
        }
        RouteKind::ApiDoc => {
            static_files::send(ctx, client, "/assets/redoc.html", CachePolicy::SEND_DEFAULT).await
        }
        RouteKind::UrlPreview => Ok(url_preview::serve(ctx, state).await),
        RouteKind::OpenApi => openapi::serve(state).await,
        RouteKind::Docs => docs::serve(ctx, state).await,
        RouteKind::Note => {
            let raw = capture.unwrap_or_default();
            let note_id = urlencoding::decode(raw).map_or_else(|_| raw.into(), |id| id);
            pages::note(state, &note_id).await
        }
        RouteKind::Info => info::serve(state).await,
        RouteKind::Othello => Ok(http::build_redirect_response(&redirect::othello(ctx.path))),
        RouteKind::Reversi => Ok(http::build_redirect_response(&redirect::reversi(ctx.path))),
        RouteKind::Flush => pages::flush(state),
        RouteKind::Shell => pages::shell(state).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{self, body_string, get, request};
    use hyper::header::{ALLOW, CACHE_CONTROL, CONTENT_LENGTH, LOCATION};
    use hyper::StatusCode;

    #[test]
    fn test_query_param() {
        let ctx = RequestContext {
            path: "/docs.json",
            query: Some("a=1&lang=ja-JP&url=https%3A%2F%2Fexample.com%2F%3Fq%3D1"),
            if_none_match: None,
        };
        assert_eq!(ctx.query_param("lang").as_deref(), Some("ja-JP"));
        assert_eq!(
            ctx.query_param("url").as_deref(),
            Some("https://example.com/?q=1")
        );
        assert_eq!(ctx.query_param("missing"), None);
        assert_eq!(RequestContext::bare("/").query_param("lang"), None);
    }

    #[tokio::test]
    async fn test_assets_cached_and_framed() {
        let fx = test_support::fixture();
        let resp = get(&fx, "/assets/app.js").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[CACHE_CONTROL], "public, max-age=604800");
        assert_eq!(resp.headers()[X_FRAME_OPTIONS], "DENY");
        assert_eq!(body_string(resp).await, "console.log(1);\n");
    }

    #[tokio::test]
    async fn test_every_response_denies_framing() {
        let fx = test_support::fixture();
        for path in ["/", "/notes/unknown", "/othello", "/docs.json", "/assets/none.js"] {
            let resp = get(&fx, path).await;
            assert_eq!(resp.headers()[X_FRAME_OPTIONS], "DENY", "{path}");
        }
    }

    #[tokio::test]
    async fn test_static_aliases() {
        let fx = test_support::fixture();

        let resp = get(&fx, "/favicon.ico").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[CACHE_CONTROL], "public, max-age=86400");

        let resp = get(&fx, "/sw.abc123.js").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[CACHE_CONTROL], "max-age=0");
        assert_eq!(body_string(resp).await, "// sw\n");

        let resp = get(&fx, "/robots.txt").await;
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = get(&fx, "/sw.missing.js").await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = get(&fx, "/apple-touch-icon.png").await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_docs_unsupported_locale_is_empty() {
        let fx = test_support::fixture();
        let resp = get(&fx, "/docs.json?lang=xx-XX").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_string(resp).await, "[]");

        let resp = get(&fx, "/docs.json").await;
        assert_eq!(body_string(resp).await, "[]");
    }

    #[tokio::test]
    async fn test_docs_lists_first_headings() {
        let fx = test_support::fixture();
        let resp = get(&fx, "/docs.json?lang=ja-JP").await;
        assert_eq!(resp.status(), StatusCode::OK);
        let docs: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
        assert_eq!(
            docs,
            serde_json::json!([
                { "path": "api", "title": "Misskey <em>API</em>" },
                { "path": "reactions", "title": "リアクション" },
            ])
        );
    }

    #[tokio::test]
    async fn test_unknown_note_is_empty_404() {
        let fx = test_support::fixture();
        let resp = get(&fx, "/notes/nope").await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_string(resp).await, "");
    }

    #[tokio::test]
    async fn test_note_cache_follows_visibility() {
        let fx = test_support::fixture();

        let resp = get(&fx, "/notes/public1").await;
        assert_eq!(resp.status(), StatusCode::OK);
        let cache = resp.headers()[CACHE_CONTROL].to_str().unwrap().to_string();
        assert!(cache.contains("public"), "{cache}");
        let body = body_string(resp).await;
        assert!(body.contains("hello world"));
        assert!(body.contains("Test Instance"));
        assert!(body.contains("<strong>Alice</strong>"));
        assert!(body.contains("<span>@alice</span>"));

        let resp = get(&fx, "/notes/secret1").await;
        assert_eq!(resp.status(), StatusCode::OK);
        let cache = resp.headers()[CACHE_CONTROL].to_str().unwrap();
        assert!(cache.contains("private"), "{cache}");
        assert!(cache.contains("must-revalidate"), "{cache}");
    }

    #[tokio::test]
    async fn test_legacy_redirects() {
        let fx = test_support::fixture();

        let resp = get(&fx, "/othello/abc").await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(resp.headers()[LOCATION], "/games/reversi/abc");

        let resp = get(&fx, "/reversi").await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(resp.headers()[LOCATION], "/games/reversi");
    }

    #[tokio::test]
    async fn test_unmatched_path_renders_shell() {
        let fx = test_support::fixture();
        let resp = get(&fx, "/@alice/following").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[CACHE_CONTROL], "public, max-age=300");
        assert!(body_string(resp).await.contains("Test Instance"));
    }

    #[tokio::test]
    async fn test_shell_falls_back_to_brand() {
        let fx = test_support::fixture_with_snapshot("");
        let resp = get(&fx, "/").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_string(resp).await.contains("Hitorisskey"));
    }

    #[tokio::test]
    async fn test_info_page() {
        let fx = test_support::fixture();
        let resp = get(&fx, "/info").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().get(CACHE_CONTROL).is_none());
        let body = body_string(resp).await;
        assert!(body.contains("PostgreSQL 15.4"));
        assert!(body.contains("<th>Minimum Rust</th><td>rustc 1.75+</td>"));
        assert!(body.contains(":blobcat:"));
        assert!(!body.contains(":remote_only:"));
    }

    #[tokio::test]
    async fn test_failing_backend_is_500() {
        let fx = test_support::fixture_with_failing_backend();
        let resp = get(&fx, "/info").await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(resp.headers()[X_FRAME_OPTIONS], "DENY");
    }

    #[tokio::test]
    async fn test_manifest_carries_instance_name() {
        let fx = test_support::fixture();
        let resp = get(&fx, "/manifest.json").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[CACHE_CONTROL], "max-age=300");
        let manifest: serde_json::Value =
            serde_json::from_str(&body_string(resp).await).unwrap();
        assert_eq!(manifest["name"], "Test Instance");
        assert_eq!(manifest["short_name"], "Test Instance");
        assert_eq!(manifest["display"], "standalone");
    }

    #[tokio::test]
    async fn test_url_preview_success_and_failure() {
        let fx = test_support::fixture();

        let resp = get(&fx, "/url?url=https%3A%2F%2Fexample.com%2Fpage").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[CACHE_CONTROL], "max-age=604800, immutable");
        let summary: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
        assert_eq!(summary["title"], "Stub page");
        assert_eq!(summary["url"], "https://example.com/page");

        let resp = get(&fx, "/url?url=https%3A%2F%2Ffail.example%2F").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[CACHE_CONTROL], "max-age=86400, immutable");
        assert_eq!(body_string(resp).await, "{}");

        let resp = get(&fx, "/url").await;
        assert_eq!(body_string(resp).await, "{}");
    }

    #[tokio::test]
    async fn test_api_document() {
        let fx = test_support::fixture();
        let resp = get(&fx, "/api.json").await;
        assert_eq!(resp.status(), StatusCode::OK);
        let doc: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
        assert_eq!(doc["info"]["title"], "Test Instance");
        assert_eq!(doc["servers"][0]["url"], "https://test.example");
    }

    #[tokio::test]
    async fn test_flush_page() {
        let fx = test_support::fixture();
        let resp = get(&fx, "/flush").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_string(resp).await.contains("localStorage.clear()"));
    }

    #[tokio::test]
    async fn test_head_strips_body_keeps_length() {
        let fx = test_support::fixture();
        let resp = request(&fx, Method::HEAD, "/assets/app.js").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[CONTENT_LENGTH], "16");
        assert_eq!(body_string(resp).await, "");
    }

    #[tokio::test]
    async fn test_other_methods_rejected() {
        let fx = test_support::fixture();
        let resp = request(&fx, Method::POST, "/notes/public1").await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers()[ALLOW], "GET, HEAD");
        assert_eq!(resp.headers()[X_FRAME_OPTIONS], "DENY");
    }
}
