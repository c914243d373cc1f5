//! Manager for the commit model.
use super::{encode_modified_files, Commit, NewCommit};
use crate::db::models::person;
use crate::db::{DatabaseConnection, DatabaseTransaction};
use async_trait::async_trait;

/// Commit columns with the author's columns flattened under an `author_` prefix.
const SELECT_COMMIT_WITH_AUTHOR: &str = "
    SELECT c.id, c.sha, c.message, c.url, c.modified_files,
        p.id AS author_id, p.name AS author_name, p.handle AS author_handle,
        p.contact_key AS author_contact_key, p.profile_url AS author_profile_url,
        p.avatar_url AS author_avatar_url
    FROM commits c
    JOIN people p ON p.id = c.author_id
";

#[async_trait]
impl super::Manager for DatabaseConnection {
    /// Find all commits linked to a build record, in link order.
    ///
    /// # Errors
    /// Errors if can't establish a connection to the database.
    async fn find_all_by_build_record(&self, build_record_id: i64) -> anyhow::Result<Vec<Commit>> {
        let statement = format!(
            "{SELECT_COMMIT_WITH_AUTHOR}
            JOIN history_commit_links l ON l.commit_id = c.id
            WHERE l.build_record_id = $1
            ORDER BY l.position ASC"
        );
        let mut connection = self.pool.acquire().await?;
        let rows = sqlx::query_as::<_, Commit>(&statement)
            .bind(build_record_id)
            .fetch_all(&mut *connection)
            .await?;
        Ok(rows)
    }
}

#[async_trait]
impl super::TxManager for DatabaseTransaction {
    /// Upsert a commit, upserting its author first.
    ///
    /// A known sha keeps its stored message, url and author.
    ///
    /// # Errors
    /// Errors if the commit or its author cannot be inserted into the database.
    async fn upsert(&mut self, commit: &NewCommit) -> anyhow::Result<i64> {
        let author_id = person::TxManager::upsert(&mut *self, &commit.author).await?;
        let statement = "
            INSERT INTO commits ( sha, message, author_id, url, modified_files )
            VALUES ( $1, $2, $3, $4, $5 )
            ON CONFLICT ( sha ) DO UPDATE SET sha = excluded.sha
            RETURNING id
        ";
        let row = sqlx::query_as::<_, (i64,)>(statement)
            .bind(&commit.sha)
            .bind(&commit.message)
            .bind(author_id)
            .bind(&commit.url)
            .bind(encode_modified_files(&commit.modified_files)?)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(row.0)
    }
}
