//! Test harness: an application state wired to in-memory collaborators and
//! a temporary client/docs tree.

use async_trait::async_trait;
use http_body_util::{BodyExt, Empty};
use hyper::body::Bytes;
use hyper::{Method, Request};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use url::Url;

use crate::config::{AppState, Config};
use crate::handler::handle_request;
use crate::handler::url_preview::{PreviewError, UrlPreviewer, UrlSummary};
use crate::http::HttpResponse;
use crate::store::{BackendInfo, Services, SnapshotStore, StoreError};
use crate::views::Views;

pub const SNAPSHOT: &str = r#"
[meta]
name = "Test Instance"
description = "An instance for tests"
banner_url = "https://test.example/banner.png"

[backend]
database = "PostgreSQL 15.4"
cache = "7.2.0"

[[users]]
id = "u1"
username = "alice"
name = "Alice"

[[notes]]
id = "public1"
created_at = "2023-05-01T12:00:00Z"
user_id = "u1"
text = "hello world"
visibility = "public"

[[notes]]
id = "secret1"
created_at = "2023-05-01T12:30:00Z"
user_id = "u1"
text = "just for you"
visibility = "specified"

[[emojis]]
id = "e1"
name = "blobcat"
url = "https://test.example/emoji/blobcat.png"

[[emojis]]
id = "e2"
name = "remote_only"
host = "remote.example"
url = "https://remote.example/emoji/remote_only.png"
"#;

pub struct Fixture {
    _dir: TempDir,
    pub state: Arc<AppState>,
}

/// Answers every URL except those on `fail.example`
pub struct StubPreviewer;

#[async_trait]
impl UrlPreviewer for StubPreviewer {
    async fn summarize(&self, url: &Url) -> Result<UrlSummary, PreviewError> {
        if url.host_str() == Some("fail.example") {
            return Err(PreviewError::Status(500));
        }
        Ok(UrlSummary {
            url: url.to_string(),
            title: Some("Stub page".to_string()),
            sitename: url.host_str().map(ToString::to_string),
            ..UrlSummary::default()
        })
    }
}

/// Backend whose version queries always fail
pub struct FailingBackend;

#[async_trait]
impl BackendInfo for FailingBackend {
    async fn database_version(&self) -> Result<String, StoreError> {
        Err(unreachable_backend("database"))
    }

    async fn cache_version(&self) -> Result<String, StoreError> {
        Err(unreachable_backend("cache"))
    }
}

fn unreachable_backend(name: &str) -> StoreError {
    StoreError::Read {
        path: name.to_string(),
        source: std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused"),
    }
}

pub fn fixture() -> Fixture {
    fixture_with_snapshot(SNAPSHOT)
}

pub fn fixture_with_snapshot(snapshot: &str) -> Fixture {
    let store = Arc::new(SnapshotStore::from_toml_str(snapshot).unwrap());
    build(Services::from_snapshot(store))
}

pub fn fixture_with_failing_backend() -> Fixture {
    let store = Arc::new(SnapshotStore::from_toml_str(SNAPSHOT).unwrap());
    let mut services = Services::from_snapshot(store);
    services.backend = Arc::new(FailingBackend);
    build(services)
}

fn build(services: Services) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    write_tree(dir.path());

    let mut config = Config::load_from("no-such-config-for-tests").unwrap();
    config.web.url = "https://test.example".to_string();
    config.web.version = "0.0.0-test".to_string();
    config.web.client_dir = dir.path().join("client");
    config.web.docs_dir = dir.path().join("docs");
    config.web.brand_name = "Hitorisskey".to_string();
    config.logging.access_log = false;

    let views = Views::new(None, &config.web.version, &config.web.url);
    let state = AppState::new(config, services, views, Arc::new(StubPreviewer));
    Fixture {
        _dir: dir,
        state: Arc::new(state),
    }
}

fn write_tree(root: &Path) {
    let assets = root.join("client").join("assets");
    let docs = root.join("docs");
    std::fs::create_dir_all(&assets).unwrap();
    std::fs::create_dir_all(&docs).unwrap();

    let write = |dir: &Path, name: &str, body: &str| std::fs::write(dir.join(name), body).unwrap();
    write(&assets, "app.js", "console.log(1);\n");
    write(&assets, "favicon.png", "png");
    write(&assets, "sw.abc123.js", "// sw\n");
    write(&assets, "robots.txt", "User-agent: *\n");
    write(
        &assets,
        "manifest.json",
        r#"{"name":"Misskey","short_name":"Misskey","display":"standalone"}"#,
    );
    write(&docs, "api.ja-JP.md", "# Misskey *API*\n\nbody\n");
    write(&docs, "reactions.ja-JP.md", "# リアクション\n");
    write(&docs, "blank.ja-JP.md", "");
    write(&docs, "api.en-US.md", "# API\n");
}

pub async fn request(fx: &Fixture, method: Method, uri: &str) -> HttpResponse {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .body(Empty::<Bytes>::new())
        .unwrap();
    handle_request(req, Arc::clone(&fx.state), None).await.unwrap()
}

pub async fn get(fx: &Fixture, uri: &str) -> HttpResponse {
    request(fx, Method::GET, uri).await
}

pub async fn body_string(resp: HttpResponse) -> String {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}
