use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{any::AnyRow, FromRow, Row as _};

use super::person::Person;
use crate::ci::outcome::Outcome;

pub mod manager;

/// Trait for managing build records.
#[async_trait]
pub trait Manager {
    /// Find a build record by id.
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<BuildRecord>>;
    /// Find all build records in insertion order.
    async fn find_all(&self) -> anyhow::Result<Vec<BuildRecord>>;
}

/// Trait for managing transactional build records.
#[async_trait]
pub trait TxManager {
    /// Create a new build record, returning its id.
    async fn create(&mut self, record: &NewBuildRecord) -> anyhow::Result<i64>;
}

/// Result of the assemble phase.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BuildDetails {
    /// Classified outcome of the attempt.
    pub outcome: Outcome,
    /// Captured output of the assemble phase.
    pub log: String,
}

/// Result of the test phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct TestDetails {
    /// Number of tests found in the test report.
    pub total: i64,
    /// Number of tests that passed.
    pub passed: i64,
    /// Captured output of the test phase.
    pub log: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
/// Model for one build attempt.
pub struct BuildRecord {
    /// Row id.
    pub id: i64,
    /// Sender of the push that triggered the build.
    pub sender: Person,
    /// Classified outcome of the attempt.
    pub outcome: Outcome,
    /// Captured output of the assemble phase.
    pub build_log: String,
    /// Number of tests found in the test report.
    pub total_tests: i64,
    /// Number of tests that passed.
    pub passed_tests: i64,
    /// Captured output of the test phase.
    pub test_log: String,
    /// When the triggering push happened.
    pub timestamp: DateTime<Utc>,
    /// Branch that was built.
    pub branch: String,
}

/// Row to insert for a new build attempt.
#[derive(Debug, Clone)]
pub struct NewBuildRecord {
    /// Foreign key reference to the sender.
    pub sender_id: i64,
    /// Classified outcome of the attempt.
    pub outcome: Outcome,
    /// Captured output of the assemble phase.
    pub build_log: String,
    /// Number of tests found in the test report.
    pub total_tests: i64,
    /// Number of tests that passed.
    pub passed_tests: i64,
    /// Captured output of the test phase.
    pub test_log: String,
    /// When the triggering push happened.
    pub timestamp: DateTime<Utc>,
    /// Branch that was built.
    pub branch: String,
}

impl NewBuildRecord {
    /// Create a new build record row from the pipeline results.
    #[must_use]
    pub fn new(
        sender_id: i64,
        build: &BuildDetails,
        test: &TestDetails,
        branch: &str,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            sender_id,
            outcome: build.outcome,
            build_log: build.log.clone(),
            total_tests: test.total,
            passed_tests: test.passed,
            test_log: test.log.clone(),
            timestamp,
            branch: branch.to_owned(),
        }
    }
}

impl FromRow<'_, AnyRow> for BuildRecord {
    fn from_row(row: &AnyRow) -> anyhow::Result<Self, sqlx::Error> {
        let outcome: String = row.try_get("outcome")?;
        let timestamp: String = row.try_get("timestamp")?;
        Ok(Self {
            id: row.try_get("id")?,
            sender: Person {
                id: row.try_get("sender_id")?,
                name: row.try_get("sender_name")?,
                handle: row.try_get("sender_handle")?,
                contact_key: row.try_get("sender_contact_key")?,
                profile_url: row.try_get("sender_profile_url").ok(),
                avatar_url: row.try_get("sender_avatar_url").ok(),
            },
            outcome: outcome
                .parse()
                .map_err(|err: anyhow::Error| sqlx::Error::Decode(err.into()))?,
            build_log: row.try_get("build_log")?,
            total_tests: row.try_get("total_tests")?,
            passed_tests: row.try_get("passed_tests")?,
            test_log: row.try_get("test_log")?,
            timestamp: DateTime::parse_from_rfc3339(&timestamp)
                .map_err(|err| sqlx::Error::Decode(Box::new(err)))?
                .with_timezone(&Utc),
            branch: row.try_get("branch")?,
        })
    }
}
