// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub web: WebConfig,
    pub data: DataConfig,
    pub preview: PreviewConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
}

/// Web tier configuration
#[derive(Debug, Deserialize, Clone)]
pub struct WebConfig {
    /// Public base URL of the instance
    pub url: String,
    /// Deployment version shown on the info page and in the API document
    pub version: String,
    /// Root of the built client; static assets live under `<client_dir>/assets`
    pub client_dir: PathBuf,
    /// Directory holding `<name>.<locale>.md` documentation files
    pub docs_dir: PathBuf,
    /// Optional directory whose templates override the embedded views
    #[serde(default)]
    pub views_dir: Option<PathBuf>,
    /// Name used when the instance has none configured
    pub brand_name: String,
}

impl WebConfig {
    pub fn assets_dir(&self) -> PathBuf {
        self.client_dir.join("assets")
    }
}

/// Data source configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DataConfig {
    pub snapshot_path: PathBuf,
}

/// URL preview fetcher configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PreviewConfig {
    pub timeout_secs: u64,
    pub max_bytes: usize,
    pub user_agent: String,
}
