//! URL preview endpoint
//!
//! `GET /url?url=<target>` answers with a short summary of a remote page.
//! Failures never surface as errors: the client gets `{}` with a shorter
//! cache lifetime.

use async_trait::async_trait;
use scraper::{Html, Selector};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use super::router::RequestContext;
use crate::config::{AppState, PreviewConfig};
use crate::http::{self, CachePolicy, HttpResponse};
use crate::logger;

const TITLE_MAX: usize = 100;
const DESCRIPTION_MAX: usize = 300;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UrlSummary {
    pub url: String,
    pub title: Option<String>,
    pub icon: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    pub sitename: Option<String>,
    pub sensitive: bool,
}

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("missing url parameter")]
    MissingUrl,

    #[error("invalid url '{0}'")]
    InvalidUrl(String),

    #[error("fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("upstream returned status {0}")]
    Status(u16),

    #[error("not an HTML page ({0})")]
    NotHtml(String),

    #[error("page exceeds {0} bytes")]
    TooLarge(usize),
}

/// Summarizes remote pages
#[async_trait]
pub trait UrlPreviewer: Send + Sync {
    async fn summarize(&self, url: &Url) -> Result<UrlSummary, PreviewError>;
}

/// Fetches the page over HTTP and reads its OpenGraph/HTML metadata
pub struct HttpPreviewer {
    client: reqwest::Client,
    max_bytes: usize,
}

impl HttpPreviewer {
    pub fn new(config: &PreviewConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;
        Ok(Self {
            client,
            max_bytes: config.max_bytes,
        })
    }
}

#[async_trait]
impl UrlPreviewer for HttpPreviewer {
    async fn summarize(&self, url: &Url) -> Result<UrlSummary, PreviewError> {
        let mut resp = self.client.get(url.clone()).send().await?;
        if !resp.status().is_success() {
            return Err(PreviewError::Status(resp.status().as_u16()));
        }

        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();
        if !content_type.contains("html") {
            return Err(PreviewError::NotHtml(content_type));
        }

        let final_url = resp.url().clone();
        let mut body = Vec::new();
        while let Some(chunk) = resp.chunk().await? {
            if body.len() + chunk.len() > self.max_bytes {
                return Err(PreviewError::TooLarge(self.max_bytes));
            }
            body.extend_from_slice(&chunk);
        }

        Ok(extract_summary(&String::from_utf8_lossy(&body), &final_url))
    }
}

/// `GET /url`
pub async fn serve(ctx: &RequestContext<'_>, state: &AppState) -> HttpResponse {
    match preview(ctx, state).await {
        Ok(summary) => match http::build_json_response(&summary, Some(CachePolicy::PREVIEW)) {
            Ok(resp) => resp,
            Err(e) => failed(&e),
        },
        Err(e) => failed(&e),
    }
}

async fn preview(ctx: &RequestContext<'_>, state: &AppState) -> Result<UrlSummary, PreviewError> {
    let raw = ctx.query_param("url").ok_or(PreviewError::MissingUrl)?;
    let url = Url::parse(&raw).map_err(|_| PreviewError::InvalidUrl(raw.clone()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(PreviewError::InvalidUrl(raw));
    }
    state.previewer.summarize(&url).await
}

fn failed(e: &dyn std::fmt::Display) -> HttpResponse {
    logger::log_warning(&format!("URL preview failed: {e}"));
    http::build_body_response(
        hyper::StatusCode::OK,
        "application/json; charset=utf-8",
        "{}",
        Some(CachePolicy::PREVIEW_FAILED),
    )
}

/// Read title, description, images and site name out of a page
pub fn extract_summary(html: &str, base: &Url) -> UrlSummary {
    let doc = Html::parse_document(html);

    let meta = |keys: &[&str]| {
        keys.iter().find_map(|key| {
            select_attr(&doc, &format!("meta[property=\"{key}\"]"), "content")
                .or_else(|| select_attr(&doc, &format!("meta[name=\"{key}\"]"), "content"))
        })
    };

    let title = meta(&["og:title", "twitter:title"]).or_else(|| select_text(&doc, "title"));
    let description = meta(&["og:description", "twitter:description", "description"]);
    let thumbnail = meta(&["og:image", "twitter:image"]).and_then(|src| resolve(base, &src));
    let icon = [
        "link[rel=\"icon\"]",
        "link[rel=\"shortcut icon\"]",
        "link[rel=\"apple-touch-icon\"]",
    ]
    .iter()
    .find_map(|sel| select_attr(&doc, sel, "href"))
    .and_then(|href| resolve(base, &href))
    .or_else(|| resolve(base, "/favicon.ico"));
    let sitename = meta(&["og:site_name", "application-name"])
        .or_else(|| base.host_str().map(ToString::to_string));

    UrlSummary {
        url: base.to_string(),
        title: title.map(|t| clip(&t, TITLE_MAX)),
        icon,
        description: description.map(|d| clip(&d, DESCRIPTION_MAX)),
        thumbnail,
        sitename,
        sensitive: false,
    }
}

fn select_attr(doc: &Html, selector: &str, attr: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    doc.select(&selector)
        .find_map(|el| el.value().attr(attr))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

fn select_text(doc: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    let text: String = doc.select(&selector).next()?.text().collect();
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!text.is_empty()).then_some(text)
}

fn resolve(base: &Url, href: &str) -> Option<String> {
    base.join(href).ok().map(String::from)
}

fn clip(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= max_chars {
        trimmed.to_string()
    } else {
        let mut clipped: String = trimmed.chars().take(max_chars - 1).collect();
        clipped.push('…');
        clipped
    }
}
