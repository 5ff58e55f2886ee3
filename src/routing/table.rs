//! Route table
//!
//! Routes are tried in registration order and the first match wins. The
//! final entry matches everything and renders the application shell.

/// How a route recognizes a request path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathMatch {
    /// Exactly this path (one trailing slash tolerated)
    Exact(&'static str),
    /// Anything starting with this prefix
    Prefix(&'static str),
    /// This path or anything below it
    Segment(&'static str),
    /// A single non-empty segment after `prefix`, captured
    Param(&'static str),
    /// `prefix<token>suffix` with a non-empty token, captured
    Wrapped {
        prefix: &'static str,
        suffix: &'static str,
    },
    /// Every path
    Any,
}

/// Handler a route dispatches to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    Favicon,
    Assets,
    AppleTouchIcon,
    ServiceWorker,
    Manifest,
    Robots,
    ApiDoc,
    UrlPreview,
    OpenApi,
    Docs,
    Note,
    Info,
    Othello,
    Reversi,
    Flush,
    Shell,
}

#[derive(Debug, Clone, Copy)]
pub struct Route {
    pub path: PathMatch,
    pub kind: RouteKind,
    /// Path template for the API document; `None` keeps the route out of it
    pub doc_path: Option<&'static str>,
    pub summary: &'static str,
}

const fn route(
    path: PathMatch,
    kind: RouteKind,
    doc_path: Option<&'static str>,
    summary: &'static str,
) -> Route {
    Route {
        path,
        kind,
        doc_path,
        summary,
    }
}

pub static ROUTES: &[Route] = &[
    route(PathMatch::Exact("/favicon.ico"), RouteKind::Favicon, None, "Favicon"),
    route(PathMatch::Prefix("/assets/"), RouteKind::Assets, None, "Client assets"),
    route(
        PathMatch::Exact("/apple-touch-icon.png"),
        RouteKind::AppleTouchIcon,
        None,
        "Touch icon",
    ),
    route(
        PathMatch::Wrapped {
            prefix: "/sw.",
            suffix: ".js",
        },
        RouteKind::ServiceWorker,
        None,
        "Versioned service worker",
    ),
    route(
        PathMatch::Exact("/manifest.json"),
        RouteKind::Manifest,
        Some("/manifest.json"),
        "Web app manifest carrying the instance name",
    ),
    route(PathMatch::Exact("/robots.txt"), RouteKind::Robots, None, "Robots rules"),
    route(PathMatch::Exact("/api-doc"), RouteKind::ApiDoc, None, "API document viewer"),
    route(
        PathMatch::Exact("/url"),
        RouteKind::UrlPreview,
        Some("/url"),
        "Summary of a remote page",
    ),
    route(
        PathMatch::Exact("/api.json"),
        RouteKind::OpenApi,
        Some("/api.json"),
        "This document",
    ),
    route(
        PathMatch::Exact("/docs.json"),
        RouteKind::Docs,
        Some("/docs.json"),
        "Documentation index for a locale",
    ),
    route(
        PathMatch::Param("/notes/"),
        RouteKind::Note,
        Some("/notes/{note}"),
        "Rendered note page",
    ),
    route(
        PathMatch::Exact("/info"),
        RouteKind::Info,
        Some("/info"),
        "Instance information page",
    ),
    route(PathMatch::Segment("/othello"), RouteKind::Othello, None, "Legacy reversi URL"),
    route(PathMatch::Segment("/reversi"), RouteKind::Reversi, None, "Legacy games URL"),
    route(PathMatch::Exact("/flush"), RouteKind::Flush, None, "Clear client-side data"),
    route(PathMatch::Any, RouteKind::Shell, None, "Application shell"),
];
