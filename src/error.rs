//! Error types for request handling

use thiserror::Error;

use crate::store::StoreError;

/// Failure while producing a response
///
/// Anything reaching the router as an `Err` becomes a 500.
#[derive(Error, Debug)]
pub enum WebError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, WebError>;
