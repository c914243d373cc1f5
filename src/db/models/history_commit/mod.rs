use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod manager;

/// Trait for managing transactional links between build records and commits.
#[async_trait]
pub trait TxManager {
    /// Insert a bulk of links.
    async fn insert_bulk(&mut self, links: Vec<HistoryCommit>) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
/// Model for the join between a build record and one of the commits of its push.
pub struct HistoryCommit {
    /// Foreign key reference to the build record.
    pub build_record_id: i64,
    /// Foreign key reference to the commit.
    pub commit_id: i64,
    /// Index of the commit within the push.
    pub position: i64,
}

impl HistoryCommit {
    /// Create a new link.
    #[must_use]
    pub const fn new(build_record_id: i64, commit_id: i64, position: i64) -> Self {
        Self {
            build_record_id,
            commit_id,
            position,
        }
    }
}
