//! HTTP cache control module
//!
//! Cache-Control policies used by the routes, plus `ETag` generation and
//! conditional request handling for static files.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Cache-Control policy attached to a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// `public, max-age=N`
    Public(u32),
    /// `max-age=N`
    MaxAge(u32),
    /// `max-age=N, immutable`
    Immutable(u32),
    /// `private, max-age=0, must-revalidate`
    PrivateRevalidate,
}

impl CachePolicy {
    /// Versioned client assets
    pub const ASSETS: Self = Self::Public(7 * 24 * 60 * 60);
    /// Favicon
    pub const FAVICON: Self = Self::Public(24 * 60 * 60);
    /// Note pages visible to everyone
    pub const SHARED_NOTE: Self = Self::Public(180);
    /// Application shell
    pub const SHELL: Self = Self::Public(300);
    /// Files sent without an explicit lifetime
    pub const SEND_DEFAULT: Self = Self::MaxAge(0);
    /// Web app manifest
    pub const MANIFEST: Self = Self::MaxAge(300);
    /// Successful URL preview
    pub const PREVIEW: Self = Self::Immutable(7 * 24 * 60 * 60);
    /// Failed URL preview
    pub const PREVIEW_FAILED: Self = Self::Immutable(24 * 60 * 60);

    /// Convert to Cache-Control header value
    pub fn to_header_value(self) -> String {
        match self {
            Self::Public(max_age) => format!("public, max-age={max_age}"),
            Self::MaxAge(max_age) => format!("max-age={max_age}"),
            Self::Immutable(max_age) => format!("max-age={max_age}, immutable"),
            Self::PrivateRevalidate => "private, max-age=0, must-revalidate".to_string(),
        }
    }
}

/// Generate `ETag` using fast hashing
///
/// Returns a quoted `ETag` string, e.g. `"abc123def"`.
pub fn generate_etag(content: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    let v = hasher.finish();
    format!("\"{v:x}\"")
}

/// Check if client's `If-None-Match` header matches the server's `ETag`
///
/// Supports a single tag, a comma-separated list, and the `*` wildcard.
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|client_etag| {
        client_etag
            .split(',')
            .any(|e| e.trim() == etag || e.trim() == "*")
    })
}
