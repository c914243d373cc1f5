use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{any::AnyRow, FromRow, Row as _};

use super::person::{NewPerson, Person};

pub mod manager;

/// Trait for managing commits.
#[async_trait]
pub trait Manager {
    /// Find all commits linked to a build record, in the order they were pushed.
    async fn find_all_by_build_record(&self, build_record_id: i64) -> anyhow::Result<Vec<Commit>>;
}

/// Trait for managing transactional commits.
#[async_trait]
pub trait TxManager {
    /// Insert a commit together with its author, or fetch the id of the commit with the same sha.
    async fn upsert(&mut self, commit: &NewCommit) -> anyhow::Result<i64>;
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
/// Model for a commit included in a push.
pub struct Commit {
    /// Row id.
    pub id: i64,
    /// Unique commit hash.
    pub sha: String,
    /// Commit message.
    pub message: String,
    /// Link to the commit on the origin host.
    pub url: String,
    /// Paths modified by the commit, in the order reported by the push.
    pub modified_files: Vec<String>,
    /// Author of the commit.
    pub author: Person,
}

/// A commit that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NewCommit {
    /// Unique commit hash.
    pub sha: String,
    /// Commit message.
    pub message: String,
    /// Link to the commit on the origin host.
    pub url: String,
    /// Paths modified by the commit.
    pub modified_files: Vec<String>,
    /// Author of the commit.
    pub author: NewPerson,
}

/// Serialize modified file paths for storage.
///
/// Paths are kept as a JSON array so that commas and other separators inside a
/// path survive the round trip.
///
/// # Errors
/// Errors if the paths cannot be serialized.
pub fn encode_modified_files(paths: &[String]) -> anyhow::Result<String> {
    Ok(serde_json::to_string(paths)?)
}

/// Inverse of [`encode_modified_files`].
///
/// # Errors
/// Errors if the stored value is not a JSON array of strings.
pub fn decode_modified_files(stored: &str) -> Result<Vec<String>, serde_json::Error> {
    serde_json::from_str(stored)
}

impl FromRow<'_, AnyRow> for Commit {
    fn from_row(row: &AnyRow) -> anyhow::Result<Self, sqlx::Error> {
        let modified_files: String = row.try_get("modified_files")?;
        Ok(Self {
            id: row.try_get("id")?,
            sha: row.try_get("sha")?,
            message: row.try_get("message")?,
            url: row.try_get("url")?,
            modified_files: decode_modified_files(&modified_files)
                .map_err(|err| sqlx::Error::Decode(Box::new(err)))?,
            author: Person {
                id: row.try_get("author_id")?,
                name: row.try_get("author_name")?,
                handle: row.try_get("author_handle")?,
                contact_key: row.try_get("author_contact_key")?,
                profile_url: row.try_get("author_profile_url").ok(),
                avatar_url: row.try_get("author_avatar_url").ok(),
            },
        })
    }
}
