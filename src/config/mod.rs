// Configuration module entry point
// Loads layered configuration and holds the per-process application state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{Config, PreviewConfig};

/// Default configuration file (without extension)
pub const DEFAULT_CONFIG_PATH: &str = "config";

impl Config {
    /// Load configuration from specified file path (without extension)
    ///
    /// Sources, lowest priority first: built-in defaults, the config file,
    /// `HITORISSKEY__SECTION__KEY` environment variables.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("HITORISSKEY").separator("__"))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("web.url", "http://127.0.0.1:3000")?
            .set_default("web.version", env!("CARGO_PKG_VERSION"))?
            .set_default("web.client_dir", "built/client")?
            .set_default("web.docs_dir", "src/docs")?
            .set_default("web.brand_name", "Hitorisskey")?
            .set_default("data.snapshot_path", "instance.toml")?
            .set_default("preview.timeout_secs", 10)?
            .set_default("preview.max_bytes", 2_097_152)? // 2MB
            .set_default(
                "preview.user_agent",
                concat!("HitorisskeyWeb/", env!("CARGO_PKG_VERSION")),
            )?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}
