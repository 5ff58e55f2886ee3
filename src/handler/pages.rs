//! Server-rendered pages
//!
//! The note page, the application shell served for every unmatched path,
//! and the flush page.

use minijinja::context;

use crate::config::AppState;
use crate::error::Result;
use crate::http::{self, CachePolicy, HttpResponse};
use crate::summary;

/// `GET /notes/:note`
///
/// Unknown notes are a 404 with an empty body. Cacheability follows the
/// note's visibility.
pub async fn note(state: &AppState, note_id: &str) -> Result<HttpResponse> {
    let Some(note) = state.services.notes.find_one(note_id).await? else {
        return Ok(http::build_404_response());
    };

    let packed = state.services.notes.pack(&note).await?;
    let summary = summary::summarize(&packed);
    let meta = state.services.meta.fetch(false).await?;

    let html = state.views.render(
        "note.html",
        context! {
            note => &packed,
            author_name => packed.user.display_name(),
            author_acct => packed.user.acct(),
            summary => summary,
            instance_name => meta.name_or(state.brand_name()),
            icon => &meta.icon_url,
        },
    )?;

    let cache = if note.visibility.is_shared_cacheable() {
        CachePolicy::SHARED_NOTE
    } else {
        CachePolicy::PrivateRevalidate
    };
    Ok(http::build_html_response(html, Some(cache)))
}

/// Application shell for any path no other route claims
pub async fn shell(state: &AppState) -> Result<HttpResponse> {
    let meta = state.services.meta.fetch(false).await?;
    let name = meta.name_or(state.brand_name());

    let html = state.views.render(
        "base.html",
        context! {
            title => name,
            instance_name => name,
            desc => &meta.description,
            img => &meta.banner_url,
            icon => &meta.icon_url,
        },
    )?;
    Ok(http::build_html_response(html, Some(CachePolicy::SHELL)))
}

/// `GET /flush`
pub fn flush(state: &AppState) -> Result<HttpResponse> {
    let html = state.views.render("flush.html", context! {})?;
    Ok(http::build_html_response(html, None))
}
