//! Instance information page

use minijinja::context;
use serde::Serialize;
use sysinfo::{CpuRefreshKind, RefreshKind, System};

use crate::config::AppState;
use crate::error::{Result, WebError};
use crate::http::{self, HttpResponse};

/// Oldest toolchain this build supports, from the package manifest
const MINIMUM_RUST: &str = concat!("rustc ", env!("CARGO_PKG_RUST_VERSION"), "+");

#[derive(Debug, Clone, Serialize)]
pub struct CpuInfo {
    pub model: String,
    pub cores: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct HostInfo {
    pub machine: String,
    pub os: String,
    pub cpu: CpuInfo,
}

/// Hostname, OS and first CPU of this machine
///
/// Blocking; call from `spawn_blocking`.
pub fn read_host() -> HostInfo {
    let sys = System::new_with_specifics(
        RefreshKind::new().with_cpu(CpuRefreshKind::everything()),
    );
    let cpus = sys.cpus();
    HostInfo {
        machine: System::host_name().unwrap_or_else(|| "unknown".to_string()),
        os: std::env::consts::OS.to_string(),
        cpu: CpuInfo {
            model: cpus
                .first()
                .map(|cpu| cpu.brand().trim().to_string())
                .unwrap_or_default(),
            cores: cpus.len(),
        },
    }
}

/// `GET /info`
pub async fn serve(state: &AppState) -> Result<HttpResponse> {
    let services = &state.services;
    let (database, cache, emojis, meta, users, notes, host) = tokio::try_join!(
        async { Ok::<_, WebError>(services.backend.database_version().await?) },
        async { Ok::<_, WebError>(services.backend.cache_version().await?) },
        async { Ok::<_, WebError>(services.emojis.find_local().await?) },
        async { Ok::<_, WebError>(services.meta.fetch(true).await?) },
        async { Ok::<_, WebError>(services.users.count_local().await?) },
        async { Ok::<_, WebError>(services.notes.count_local().await?) },
        async { Ok::<_, WebError>(tokio::task::spawn_blocking(read_host).await?) },
    )?;

    let html = state.views.render(
        "info.html",
        context! {
            instance_name => meta.name_or(state.brand_name()),
            icon => &meta.icon_url,
            meta => &meta,
            version => &state.config.web.version,
            machine => host.machine,
            os => host.os,
            rust_version => MINIMUM_RUST,
            database => database,
            cache => cache,
            cpu => host.cpu,
            original_users_count => users,
            original_notes_count => notes,
            emojis => emojis,
        },
    )?;
    Ok(http::build_html_response(html, None))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_host() {
        let host = read_host();
        assert!(!host.machine.is_empty());
        assert_eq!(host.os, std::env::consts::OS);
    }
}
