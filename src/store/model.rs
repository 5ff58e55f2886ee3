//! Entity types read by the web tier
//!
//! Mirrors the rows owned by the data-access layer. Everything here is
//! read-only from the point of view of the HTTP handlers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Instance-wide metadata record
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Meta {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon_url: Option<String>,
    #[serde(default)]
    pub banner_url: Option<String>,
    #[serde(default)]
    pub maintainer_name: Option<String>,
    #[serde(default)]
    pub maintainer_email: Option<String>,
}

impl Meta {
    /// Instance name, or `fallback` when unset or empty
    pub fn name_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => fallback,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub name: Option<String>,
    /// `None` for users registered on this instance
    #[serde(default)]
    pub host: Option<String>,
}

/// Access scope of a note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Public,
    Home,
    Followers,
    Specified,
}

impl Visibility {
    /// Whether shared caches may store pages showing this note
    pub const fn is_shared_cacheable(self) -> bool {
        matches!(self, Self::Public | Self::Home)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Poll {
    pub choices: Vec<String>,
    #[serde(default)]
    pub multiple: bool,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Note {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub user_id: String,
    /// Denormalized author host, `None` for local authors
    #[serde(default)]
    pub user_host: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub cw: Option<String>,
    pub visibility: Visibility,
    #[serde(default)]
    pub file_ids: Vec<String>,
    #[serde(default)]
    pub reply_id: Option<String>,
    #[serde(default)]
    pub renote_id: Option<String>,
    #[serde(default)]
    pub poll: Option<Poll>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Emoji {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub host: Option<String>,
    pub url: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
}

// ============================================
// Packed (API-facing) projections
// ============================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackedUser {
    pub id: String,
    pub username: String,
    pub name: Option<String>,
    pub host: Option<String>,
}

impl PackedUser {
    /// Display name, falling back to the username
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.username)
    }

    /// `@user` or `@user@host`
    pub fn acct(&self) -> String {
        match &self.host {
            Some(host) => format!("@{}@{host}", self.username),
            None => format!("@{}", self.username),
        }
    }
}

impl From<&User> for PackedUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            name: user.name.clone(),
            host: user.host.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackedChoice {
    pub text: String,
    pub votes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackedPoll {
    pub multiple: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub choices: Vec<PackedChoice>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackedNote {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub user: PackedUser,
    pub text: Option<String>,
    pub cw: Option<String>,
    pub visibility: Visibility,
    pub file_ids: Vec<String>,
    pub reply: Option<Box<PackedNote>>,
    pub renote: Option<Box<PackedNote>>,
    pub poll: Option<PackedPoll>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_cacheability() {
        assert!(Visibility::Public.is_shared_cacheable());
        assert!(Visibility::Home.is_shared_cacheable());
        assert!(!Visibility::Followers.is_shared_cacheable());
        assert!(!Visibility::Specified.is_shared_cacheable());
    }

    #[test]
    fn test_meta_name_fallback() {
        let mut meta = Meta::default();
        assert_eq!(meta.name_or("Hitorisskey"), "Hitorisskey");
        meta.name = Some(String::new());
        assert_eq!(meta.name_or("Hitorisskey"), "Hitorisskey");
        meta.name = Some("   ".to_string());
        assert_eq!(meta.name_or("Hitorisskey"), "   ");
        meta.name = Some("Example".to_string());
        assert_eq!(meta.name_or("Hitorisskey"), "Example");
    }

    #[test]
    fn test_packed_user_acct() {
        let mut user = PackedUser {
            id: "u1".to_string(),
            username: "alice".to_string(),
            name: None,
            host: None,
        };
        assert_eq!(user.acct(), "@alice");
        assert_eq!(user.display_name(), "alice");
        user.host = Some("remote.example".to_string());
        user.name = Some("Alice".to_string());
        assert_eq!(user.acct(), "@alice@remote.example");
        assert_eq!(user.display_name(), "Alice");
    }
}
