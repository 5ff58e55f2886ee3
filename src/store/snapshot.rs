//! File-backed store
//!
//! Loads an instance snapshot (TOML) into memory and serves every data seam
//! from it. Metadata is cached and re-read from disk on a fresh fetch.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

use super::model::{Emoji, Meta, Note, PackedChoice, PackedNote, PackedPoll, PackedUser, User};
use super::poll_vote::{PollVote, PollVoteIndex};
use super::{BackendInfo, EmojiRepository, MetaProvider, NoteRepository, StoreError, UserRepository};

/// Nesting depth of packed replies/renotes
const PACK_DEPTH: usize = 1;

#[derive(Debug, Default, Deserialize)]
struct Snapshot {
    #[serde(default)]
    meta: Meta,
    #[serde(default)]
    backend: BackendVersions,
    #[serde(default)]
    users: Vec<User>,
    #[serde(default)]
    notes: Vec<Note>,
    #[serde(default)]
    emojis: Vec<Emoji>,
    #[serde(default)]
    poll_votes: Vec<PollVote>,
}

#[derive(Debug, Default, Deserialize)]
struct MetaOnly {
    #[serde(default)]
    meta: Meta,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct BackendVersions {
    database: Option<String>,
    cache: Option<String>,
}

/// Record counts logged at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotCounts {
    pub users: usize,
    pub notes: usize,
    pub votes: usize,
    pub voters: usize,
}

pub struct SnapshotStore {
    path: Option<PathBuf>,
    meta: RwLock<Meta>,
    backend: BackendVersions,
    users: HashMap<String, User>,
    notes: HashMap<String, Note>,
    emojis: Vec<Emoji>,
    votes: PollVoteIndex,
}

impl SnapshotStore {
    /// Load a snapshot file; a missing file yields an empty instance
    pub async fn load(path: &Path) -> Result<Self, StoreError> {
        let display = path.display().to_string();
        let snapshot = match tokio::fs::read_to_string(path).await {
            Ok(raw) => parse::<Snapshot>(&raw, &display)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Snapshot::default(),
            Err(source) => {
                return Err(StoreError::Read {
                    path: display,
                    source,
                })
            }
        };
        Ok(Self::build(Some(path.to_path_buf()), snapshot))
    }

    /// Build an in-memory store from TOML text (never re-read)
    pub fn from_toml_str(raw: &str) -> Result<Self, StoreError> {
        let snapshot = parse::<Snapshot>(raw, "<memory>")?;
        Ok(Self::build(None, snapshot))
    }

    fn build(path: Option<PathBuf>, snapshot: Snapshot) -> Self {
        let mut emojis = snapshot.emojis;
        emojis.sort_by(|a, b| a.name.cmp(&b.name));
        Self {
            path,
            meta: RwLock::new(snapshot.meta),
            backend: snapshot.backend,
            users: snapshot.users.into_iter().map(|u| (u.id.clone(), u)).collect(),
            notes: snapshot.notes.into_iter().map(|n| (n.id.clone(), n)).collect(),
            emojis,
            votes: PollVoteIndex::new(snapshot.poll_votes),
        }
    }

    pub fn counts(&self) -> SnapshotCounts {
        SnapshotCounts {
            users: self.users.len(),
            notes: self.notes.len(),
            votes: self.votes.len(),
            voters: self.votes.voter_count(),
        }
    }

    fn pack_at(&self, note: &Note, depth: usize) -> Result<PackedNote, StoreError> {
        let user = self
            .users
            .get(&note.user_id)
            .ok_or_else(|| StoreError::Dangling {
                note: note.id.clone(),
                what: "user",
                id: note.user_id.clone(),
            })?;

        let nested = |id: &Option<String>, what: &'static str| -> Result<Option<Box<PackedNote>>, StoreError> {
            let Some(id) = id else { return Ok(None) };
            if depth >= PACK_DEPTH {
                return Ok(None);
            }
            // Deleted targets are dropped, not an error
            match self.notes.get(id) {
                Some(target) => Ok(Some(Box::new(self.pack_at(target, depth + 1)?))),
                None => {
                    crate::logger::log_debug(&format!(
                        "Note {} references missing {what} {id}",
                        note.id
                    ));
                    Ok(None)
                }
            }
        };

        let poll = note.poll.as_ref().map(|poll| {
            let tally = self.votes.tally(&note.id, poll.choices.len());
            PackedPoll {
                multiple: poll.multiple,
                expires_at: poll.expires_at,
                choices: poll
                    .choices
                    .iter()
                    .zip(tally)
                    .map(|(text, votes)| PackedChoice {
                        text: text.clone(),
                        votes,
                    })
                    .collect(),
            }
        });

        Ok(PackedNote {
            id: note.id.clone(),
            created_at: note.created_at,
            user: PackedUser::from(user),
            text: note.text.clone(),
            cw: note.cw.clone(),
            visibility: note.visibility,
            file_ids: note.file_ids.clone(),
            reply: nested(&note.reply_id, "reply")?,
            renote: nested(&note.renote_id, "renote")?,
            poll,
        })
    }
}

fn parse<T: for<'de> Deserialize<'de>>(raw: &str, path: &str) -> Result<T, StoreError> {
    toml::from_str(raw).map_err(|source| StoreError::Parse {
        path: path.to_string(),
        source,
    })
}

#[async_trait]
impl MetaProvider for SnapshotStore {
    async fn fetch(&self, fresh: bool) -> Result<Meta, StoreError> {
        if fresh {
            if let Some(path) = &self.path {
                let display = path.display().to_string();
                match tokio::fs::read_to_string(path).await {
                    Ok(raw) => {
                        let reloaded = parse::<MetaOnly>(&raw, &display)?.meta;
                        *self.meta.write().await = reloaded;
                    }
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(source) => {
                        return Err(StoreError::Read {
                            path: display,
                            source,
                        })
                    }
                }
            }
        }
        Ok(self.meta.read().await.clone())
    }
}

#[async_trait]
impl NoteRepository for SnapshotStore {
    async fn find_one(&self, id: &str) -> Result<Option<Note>, StoreError> {
        Ok(self.notes.get(id).cloned())
    }

    async fn pack(&self, note: &Note) -> Result<PackedNote, StoreError> {
        self.pack_at(note, 0)
    }

    async fn count_local(&self) -> Result<u64, StoreError> {
        Ok(self.notes.values().filter(|n| n.user_host.is_none()).count() as u64)
    }
}

#[async_trait]
impl UserRepository for SnapshotStore {
    async fn count_local(&self) -> Result<u64, StoreError> {
        Ok(self.users.values().filter(|u| u.host.is_none()).count() as u64)
    }
}

#[async_trait]
impl EmojiRepository for SnapshotStore {
    async fn find_local(&self) -> Result<Vec<Emoji>, StoreError> {
        Ok(self
            .emojis
            .iter()
            .filter(|e| e.host.is_none())
            .cloned()
            .collect())
    }
}

#[async_trait]
impl BackendInfo for SnapshotStore {
    async fn database_version(&self) -> Result<String, StoreError> {
        Ok(self
            .backend
            .database
            .clone()
            .unwrap_or_else(|| "snapshot".to_string()))
    }

    async fn cache_version(&self) -> Result<String, StoreError> {
        Ok(self
            .backend
            .cache
            .clone()
            .unwrap_or_else(|| "none".to_string()))
    }
}
