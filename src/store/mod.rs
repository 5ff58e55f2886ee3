//! Data-access seams
//!
//! The web tier never talks to a database directly. Every collaborator is a
//! trait object carried in [`Services`], so handlers can be exercised against
//! fakes and the binary can plug in whatever backend it is deployed with.

pub mod model;
pub mod poll_vote;
mod snapshot;

pub use model::{Emoji, Meta, Note, PackedNote};
pub use snapshot::SnapshotStore;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid snapshot '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("note {note} references missing {what} {id}")]
    Dangling {
        note: String,
        what: &'static str,
        id: String,
    },
}

/// Instance metadata source
#[async_trait]
pub trait MetaProvider: Send + Sync {
    /// Fetch the metadata record; `fresh` bypasses any cached copy
    async fn fetch(&self, fresh: bool) -> Result<Meta, StoreError>;
}

#[async_trait]
pub trait NoteRepository: Send + Sync {
    async fn find_one(&self, id: &str) -> Result<Option<Note>, StoreError>;

    /// Build the API-facing projection of a note
    async fn pack(&self, note: &Note) -> Result<PackedNote, StoreError>;

    /// Number of notes authored on this instance
    async fn count_local(&self) -> Result<u64, StoreError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Number of users registered on this instance
    async fn count_local(&self) -> Result<u64, StoreError>;
}

#[async_trait]
pub trait EmojiRepository: Send + Sync {
    /// Custom emojis hosted on this instance
    async fn find_local(&self) -> Result<Vec<Emoji>, StoreError>;
}

/// Versions reported by the backing servers
#[async_trait]
pub trait BackendInfo: Send + Sync {
    async fn database_version(&self) -> Result<String, StoreError>;
    async fn cache_version(&self) -> Result<String, StoreError>;
}

/// Bundle of data-access collaborators handed to every handler
#[derive(Clone)]
pub struct Services {
    pub meta: Arc<dyn MetaProvider>,
    pub notes: Arc<dyn NoteRepository>,
    pub users: Arc<dyn UserRepository>,
    pub emojis: Arc<dyn EmojiRepository>,
    pub backend: Arc<dyn BackendInfo>,
}

impl Services {
    /// Wire every seam to a single snapshot store
    pub fn from_snapshot(store: Arc<SnapshotStore>) -> Self {
        Self {
            meta: store.clone(),
            notes: store.clone(),
            users: store.clone(),
            emojis: store.clone(),
            backend: store,
        }
    }
}
