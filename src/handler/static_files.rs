//! Static file serving module
//!
//! Sends a file from a fixed root. Paths are percent-decoded, dotfiles are
//! hidden, and anything that resolves outside the root is refused.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

use super::router::RequestContext;
use crate::error::Result;
use crate::http::{self, cache, mime, CachePolicy, HttpResponse};
use crate::logger;

/// Send `rel_path` (URL form, leading slash optional) from `root`
///
/// Missing files, directories and refused paths yield 404. Other read
/// failures propagate.
pub async fn send(
    ctx: &RequestContext<'_>,
    root: &Path,
    rel_path: &str,
    cache_policy: CachePolicy,
) -> Result<HttpResponse> {
    let Some(relative) = sanitize(rel_path) else {
        logger::log_debug(&format!("Refusing static path '{rel_path}'"));
        return Ok(http::build_404_response());
    };

    let Some(file_path) = resolve_within(root, &relative).await? else {
        return Ok(http::build_404_response());
    };

    let data = match fs::read(&file_path).await {
        Ok(data) => data,
        Err(e) if is_not_found(&e) => return Ok(http::build_404_response()),
        Err(e) => return Err(e.into()),
    };

    let etag = cache::generate_etag(&data);
    if cache::check_etag_match(ctx.if_none_match, &etag) {
        return Ok(http::build_304_response(&etag, cache_policy));
    }

    Ok(http::build_file_response(
        data,
        mime::content_type_for(&file_path),
        &etag,
        cache_policy,
    ))
}

/// Decode a URL path into a relative filesystem path
///
/// `None` for malformed encoding, parent components or hidden segments.
fn sanitize(rel_path: &str) -> Option<PathBuf> {
    let decoded = urlencoding::decode(rel_path).ok()?;
    let mut relative = PathBuf::new();
    for segment in decoded.split('/').filter(|s| !s.is_empty()) {
        if segment.starts_with('.') || segment.contains('\\') || segment.contains('\0') {
            return None;
        }
        relative.push(segment);
    }
    let only_normal = relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)));
    (only_normal && !relative.as_os_str().is_empty()).then_some(relative)
}

/// Join and canonicalize, refusing symlinks that escape `root`
async fn resolve_within(root: &Path, relative: &Path) -> Result<Option<PathBuf>> {
    let root_canonical = match fs::canonicalize(root).await {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Static root not found or inaccessible '{}': {e}",
                root.display()
            ));
            return Ok(None);
        }
    };

    let file_canonical = match fs::canonicalize(root.join(relative)).await {
        Ok(p) => p,
        Err(e) if is_not_found(&e) => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    if !file_canonical.starts_with(&root_canonical) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {} -> {}",
            relative.display(),
            file_canonical.display()
        ));
        return Ok(None);
    }

    if !fs::metadata(&file_canonical).await?.is_file() {
        return Ok(None);
    }

    Ok(Some(file_canonical))
}

fn is_not_found(e: &std::io::Error) -> bool {
    // ENOTDIR and ENAMETOOLONG count as missing
    e.kind() == ErrorKind::NotFound || matches!(e.raw_os_error(), Some(20 | 36))
}
