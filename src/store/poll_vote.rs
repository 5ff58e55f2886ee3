//! Poll votes
//!
//! A vote is immutable once cast. Uniqueness per (user, note) is not
//! enforced here; lookups go through the by-user and by-note indices.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PollVote {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub user_id: String,
    pub note_id: String,
    pub choice: usize,
    #[serde(default)]
    pub passed: Option<bool>,
}

/// Vote storage with secondary indices on voter and note
#[derive(Debug, Default)]
pub struct PollVoteIndex {
    votes: Vec<PollVote>,
    by_user: HashMap<String, Vec<usize>>,
    by_note: HashMap<String, Vec<usize>>,
}

impl PollVoteIndex {
    pub fn new(votes: Vec<PollVote>) -> Self {
        let mut index = Self::default();
        for vote in votes {
            index.insert(vote);
        }
        index
    }

    pub fn insert(&mut self, vote: PollVote) {
        let pos = self.votes.len();
        self.by_user.entry(vote.user_id.clone()).or_default().push(pos);
        self.by_note.entry(vote.note_id.clone()).or_default().push(pos);
        self.votes.push(vote);
    }

    #[cfg(test)]
    pub fn by_user(&self, user_id: &str) -> Vec<&PollVote> {
        self.lookup(&self.by_user, user_id)
    }

    pub fn by_note(&self, note_id: &str) -> Vec<&PollVote> {
        self.lookup(&self.by_note, note_id)
    }

    /// Per-choice vote counts for a note's poll
    ///
    /// Votes pointing past the last choice are ignored.
    pub fn tally(&self, note_id: &str, choices: usize) -> Vec<usize> {
        let mut counts = vec![0; choices];
        for vote in self.by_note(note_id) {
            if let Some(slot) = counts.get_mut(vote.choice) {
                *slot += 1;
            }
        }
        counts
    }

    pub fn len(&self) -> usize {
        self.votes.len()
    }

    /// Number of distinct voters
    pub fn voter_count(&self) -> usize {
        self.by_user.len()
    }

    fn lookup<'a>(&'a self, map: &HashMap<String, Vec<usize>>, key: &str) -> Vec<&'a PollVote> {
        map.get(key)
            .map(|positions| positions.iter().map(|&i| &self.votes[i]).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vote(id: &str, user: &str, note: &str, choice: usize) -> PollVote {
        PollVote {
            id: id.to_string(),
            created_at: Utc::now(),
            user_id: user.to_string(),
            note_id: note.to_string(),
            choice,
            passed: None,
        }
    }

    #[test]
    fn test_indices() {
        let index = PollVoteIndex::new(vec![
            vote("v1", "alice", "n1", 0),
            vote("v2", "bob", "n1", 1),
            vote("v3", "alice", "n2", 0),
        ]);
        assert_eq!(index.len(), 3);
        assert_eq!(index.voter_count(), 2);
        assert_eq!(index.by_user("alice").len(), 2);
        assert_eq!(index.by_note("n1").len(), 2);
        assert!(index.by_note("missing").is_empty());
    }

    #[test]
    fn test_duplicate_votes_are_kept() {
        let index = PollVoteIndex::new(vec![
            vote("v1", "alice", "n1", 0),
            vote("v2", "alice", "n1", 0),
        ]);
        assert_eq!(index.by_user("alice").len(), 2);
        assert_eq!(index.tally("n1", 2), vec![2, 0]);
    }

    #[test]
    fn test_tally_ignores_out_of_range_choice() {
        let index = PollVoteIndex::new(vec![
            vote("v1", "alice", "n1", 1),
            vote("v2", "bob", "n1", 7),
        ]);
        assert_eq!(index.tally("n1", 3), vec![0, 1, 0]);
    }
}
