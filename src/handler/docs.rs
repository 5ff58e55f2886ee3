//! Documentation index
//!
//! Lists `<docs_dir>/<name>.<locale>.md` for a supported locale, titling each
//! entry with the HTML of the document's first heading.

use pulldown_cmark::{html, Event, Options, Parser, Tag};
use serde::Serialize;
use std::path::Path;
use tokio::fs;

use super::router::RequestContext;
use crate::config::AppState;
use crate::error::Result;
use crate::http::{self, HttpResponse};
use crate::logger;

/// Locales documentation may be requested in
pub const SUPPORTED_LOCALES: &[&str] = &[
    "ar-SA", "ca-ES", "cs-CZ", "da-DK", "de-DE", "en-US", "es-ES", "fr-FR", "id-ID", "it-IT",
    "ja-JP", "ja-KS", "kab-KAB", "kn-IN", "ko-KR", "nl-NL", "no-NO", "pl-PL", "pt-PT", "ru-RU",
    "uk-UA", "zh-CN", "zh-TW",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocEntry {
    pub path: String,
    pub title: String,
}

pub fn is_supported_locale(lang: &str) -> bool {
    SUPPORTED_LOCALES.contains(&lang)
}

/// `GET /docs.json?lang=<locale>`
pub async fn serve(ctx: &RequestContext<'_>, state: &AppState) -> Result<HttpResponse> {
    let docs = match ctx.query_param("lang") {
        Some(lang) if is_supported_locale(&lang) => {
            build_index(&state.config.web.docs_dir, &lang).await?
        }
        _ => Vec::new(),
    };
    Ok(http::build_json_response(&docs, None)?)
}

/// Build the index for one locale, sorted by file name
///
/// A missing directory is an empty index. Documents without a heading are
/// skipped.
pub async fn build_index(docs_dir: &Path, lang: &str) -> Result<Vec<DocEntry>> {
    let suffix = format!(".{lang}.md");

    let mut dir = match fs::read_dir(docs_dir).await {
        Ok(dir) => dir,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut files = Vec::new();
    while let Some(entry) = dir.next_entry().await? {
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        // Hidden files are not documents
        if name.starts_with('.') || !name.ends_with(&suffix) {
            continue;
        }
        if entry.file_type().await?.is_file() {
            files.push(name);
        }
    }
    files.sort();

    let mut docs = Vec::with_capacity(files.len());
    for name in files {
        let markdown = fs::read_to_string(docs_dir.join(&name)).await?;
        let id = doc_id(&name);
        match first_heading_html(&markdown) {
            Some(title) if !id.is_empty() => docs.push(DocEntry {
                path: id.to_string(),
                title,
            }),
            Some(_) => logger::log_debug(&format!("Skipping doc without a name: {name}")),
            None => logger::log_debug(&format!("Skipping doc without heading: {name}")),
        }
    }
    Ok(docs)
}

/// File-name text before the first period
fn doc_id(file_name: &str) -> &str {
    file_name.split('.').next().unwrap_or(file_name)
}

/// Inline HTML of the first heading, if the document has one
pub fn first_heading_html(markdown: &str) -> Option<String> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let mut inside = false;
    let mut captured = Vec::new();
    for event in Parser::new_ext(markdown, options) {
        match event {
            Event::Start(Tag::Heading(..)) if !inside => inside = true,
            Event::End(Tag::Heading(..)) if inside => {
                let mut out = String::new();
                html::push_html(&mut out, captured.into_iter());
                return Some(out);
            }
            event if inside => captured.push(event),
            _ => {}
        }
    }
    None
}
