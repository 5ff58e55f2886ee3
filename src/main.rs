use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tokio::sync::Notify;

mod config;
mod error;
mod handler;
mod http;
mod logger;
mod routing;
mod server;
mod store;
mod summary;
mod views;

#[cfg(test)]
mod test_support;

use handler::url_preview::HttpPreviewer;
use store::{Services, SnapshotStore};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config::DEFAULT_CONFIG_PATH.to_string());
    let cfg = config::Config::load_from(&config_path)?;
    logger::init(&cfg)?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_reusable_listener(addr)?;

    let store = SnapshotStore::load(&cfg.data.snapshot_path).await?;
    let counts = store.counts();
    logger::log_info(&format!(
        "Loaded {} ({} users, {} notes, {} poll votes from {} voters)",
        cfg.data.snapshot_path.display(),
        counts.users,
        counts.notes,
        counts.votes,
        counts.voters
    ));

    let views = views::Views::new(cfg.web.views_dir.clone(), &cfg.web.version, &cfg.web.url);
    let previewer = Arc::new(HttpPreviewer::new(&cfg.preview)?);
    let services = Services::from_snapshot(Arc::new(store));

    logger::log_server_start(&addr, &cfg);
    let state = Arc::new(config::AppState::new(cfg, services, views, previewer));

    let shutdown = Arc::new(Notify::new());
    server::start_signal_handler(Arc::clone(&shutdown))?;

    // Connections are served with spawn_local
    let local = tokio::task::LocalSet::new();
    local
        .run_until(server::start_server_loop(
            listener,
            state,
            Arc::new(AtomicUsize::new(0)),
            shutdown,
        ))
        .await;
    Ok(())
}
