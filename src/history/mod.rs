//! The history module is the normalized store of build attempts.
//!
//! People are deduplicated by contact key and commits by sha. Each build record links to
//! the commits of the push that triggered it, in push order.
use chrono::{DateTime, Utc};
use tracing::instrument;

use crate::db::models::{
    build_record::{self, BuildDetails, BuildRecord, NewBuildRecord, TestDetails},
    commit::{self, Commit, NewCommit},
    history_commit::{self, HistoryCommit},
    person::{self, NewPerson},
};
use crate::db::{DatabaseConnection, DatabaseTransaction, Tx as _};
use crate::errors::PersistenceError;

/// Read and write access to the build history.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    /// Shared connection pool.
    db: DatabaseConnection,
}

impl HistoryStore {
    /// Create a store on top of a connected database.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Underlying database connection.
    #[must_use]
    pub const fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Add a person, returning the id of the stored person with the same contact key.
    ///
    /// When the key is already known the candidate's other fields are discarded.
    ///
    /// # Errors
    /// Errors if the store cannot be written to.
    #[instrument(level = "debug", skip(self, candidate), fields(contact_key = %candidate.contact_key))]
    pub async fn add_person(&self, candidate: &NewPerson) -> Result<i64, PersistenceError> {
        let mut tx = self.begin().await?;
        let result = person::TxManager::upsert(&mut tx, candidate).await;
        finish(tx, result).await
    }

    /// Add a commit and its author, returning the id of the stored commit with the same sha.
    ///
    /// # Errors
    /// Errors if the store cannot be written to.
    #[instrument(level = "debug", skip(self, candidate), fields(sha = %candidate.sha))]
    pub async fn add_commit(&self, candidate: &NewCommit) -> Result<i64, PersistenceError> {
        let mut tx = self.begin().await?;
        let result = commit::TxManager::upsert(&mut tx, candidate).await;
        finish(tx, result).await
    }

    /// Record a build attempt.
    ///
    /// Upserts the sender, then every commit in order, then inserts the build record
    /// followed by one link per commit in the same order. Everything happens in a
    /// single transaction; on error nothing is kept.
    ///
    /// # Errors
    /// Errors if the store cannot be written to.
    #[instrument(skip_all, fields(branch = %branch, commits = commits.len()))]
    pub async fn add_build_record(
        &self,
        sender: &NewPerson,
        commits: &[NewCommit],
        build: &BuildDetails,
        test: &TestDetails,
        branch: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<i64, PersistenceError> {
        let mut tx = self.begin().await?;
        let result =
            insert_build_record(&mut tx, sender, commits, build, test, branch, timestamp).await;
        let id = finish(tx, result).await?;
        tracing::info!(build_id = id, outcome = %build.outcome, "Recorded build");
        Ok(id)
    }

    /// Find a build record by id, `None` if it was never inserted.
    ///
    /// # Errors
    /// Errors if the store cannot be read.
    pub async fn get_build_record(&self, id: i64) -> Result<Option<BuildRecord>, PersistenceError> {
        build_record::Manager::find_by_id(&self.db, id)
            .await
            .map_err(PersistenceError::Read)
    }

    /// All build records in insertion order.
    ///
    /// # Errors
    /// Errors if the store cannot be read.
    pub async fn get_all_build_records(&self) -> Result<Vec<BuildRecord>, PersistenceError> {
        build_record::Manager::find_all(&self.db)
            .await
            .map_err(PersistenceError::Read)
    }

    /// Commits of a build in the order they were supplied, each with its author.
    ///
    /// Empty for unknown build ids.
    ///
    /// # Errors
    /// Errors if the store cannot be read.
    pub async fn get_commits_for(&self, build_id: i64) -> Result<Vec<Commit>, PersistenceError> {
        commit::Manager::find_all_by_build_record(&self.db, build_id)
            .await
            .map_err(PersistenceError::Read)
    }

    /// Begin a write transaction on the shared pool.
    async fn begin(&self) -> Result<DatabaseTransaction, PersistenceError> {
        DatabaseTransaction::begin(self.db.pool.clone())
            .await
            .map_err(PersistenceError::Write)
    }
}

/// Commit `tx` when `result` is a success, roll it back otherwise.
async fn finish(
    tx: DatabaseTransaction,
    result: anyhow::Result<i64>,
) -> Result<i64, PersistenceError> {
    match result {
        Ok(id) => {
            tx.commit().await.map_err(PersistenceError::Write)?;
            Ok(id)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::error!("Failed to roll back history write: {rollback_err:?}");
            }
            Err(PersistenceError::Write(err))
        }
    }
}

/// Insert a build record and everything it references.
async fn insert_build_record(
    tx: &mut DatabaseTransaction,
    sender: &NewPerson,
    commits: &[NewCommit],
    build: &BuildDetails,
    test: &TestDetails,
    branch: &str,
    timestamp: DateTime<Utc>,
) -> anyhow::Result<i64> {
    let sender_id = person::TxManager::upsert(&mut *tx, sender).await?;
    let mut commit_ids = Vec::with_capacity(commits.len());
    for candidate in commits {
        commit_ids.push(commit::TxManager::upsert(&mut *tx, candidate).await?);
    }
    let record = NewBuildRecord::new(sender_id, build, test, branch, timestamp);
    let build_record_id = build_record::TxManager::create(&mut *tx, &record).await?;
    let links = commit_ids
        .into_iter()
        .zip(0_i64..)
        .map(|(commit_id, position)| HistoryCommit::new(build_record_id, commit_id, position))
        .collect();
    history_commit::TxManager::insert_bulk(&mut *tx, links).await?;
    Ok(build_record_id)
}
