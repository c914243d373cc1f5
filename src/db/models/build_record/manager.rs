//! Manager for the build record model.
use super::{BuildRecord, NewBuildRecord};
use crate::db::{DatabaseConnection, DatabaseTransaction};
use anyhow::Context as _;
use async_trait::async_trait;
use chrono::SecondsFormat;

/// Build record columns with the sender's columns flattened under a `sender_` prefix.
const SELECT_BUILD_RECORD_WITH_SENDER: &str = "
    SELECT b.id, b.outcome, b.build_log, b.total_tests, b.passed_tests, b.test_log,
        b.timestamp, b.branch,
        p.id AS sender_id, p.name AS sender_name, p.handle AS sender_handle,
        p.contact_key AS sender_contact_key, p.profile_url AS sender_profile_url,
        p.avatar_url AS sender_avatar_url
    FROM build_records b
    JOIN people p ON p.id = b.sender_id
";

#[async_trait]
impl super::Manager for DatabaseConnection {
    /// Find a build record by id.
    ///
    /// # Errors
    /// Errors if can't establish a connection to the database.
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<BuildRecord>> {
        let statement = format!("{SELECT_BUILD_RECORD_WITH_SENDER} WHERE b.id = $1");
        let mut connection = self.pool.acquire().await?;
        let row = sqlx::query_as::<_, BuildRecord>(&statement)
            .bind(id)
            .fetch_optional(&mut *connection)
            .await?;
        Ok(row)
    }

    /// Find all build records, oldest first.
    ///
    /// # Errors
    /// Errors if can't establish a connection to the database.
    async fn find_all(&self) -> anyhow::Result<Vec<BuildRecord>> {
        let statement = format!("{SELECT_BUILD_RECORD_WITH_SENDER} ORDER BY b.id ASC");
        let mut connection = self.pool.acquire().await?;
        let rows = sqlx::query_as::<_, BuildRecord>(&statement)
            .fetch_all(&mut *connection)
            .await?;
        Ok(rows)
    }
}

#[async_trait]
impl super::TxManager for DatabaseTransaction {
    /// Insert a new build record into the database.
    ///
    /// # Errors
    /// Errors if the build record cannot be inserted into the database.
    async fn create(&mut self, record: &NewBuildRecord) -> anyhow::Result<i64> {
        let statement = "
            INSERT INTO build_records ( sender_id, outcome, build_log, total_tests, passed_tests, test_log, timestamp, branch )
            VALUES ( $1, $2, $3, $4, $5, $6, $7, $8 )
        ";
        let id = sqlx::query(statement)
            .bind(record.sender_id)
            .bind(record.outcome.as_str())
            .bind(&record.build_log)
            .bind(record.total_tests)
            .bind(record.passed_tests)
            .bind(&record.test_log)
            .bind(record.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true))
            .bind(&record.branch)
            .execute(&mut *self.tx)
            .await?
            .last_insert_id()
            .context("Database did not report the id of the new build record")?;
        Ok(id)
    }
}
