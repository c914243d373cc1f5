//! Manager for the `history_commit_links` table.
use crate::db::{models::BATCH_SIZE, DatabaseTransaction};
use async_trait::async_trait;
use sqlx::QueryBuilder;

use super::HistoryCommit;

#[async_trait]
impl super::TxManager for DatabaseTransaction {
    /// Insert a bulk of build record to commit links into the database.
    ///
    /// # Errors
    /// Errors if the links cannot be inserted, e.g. when either side does not exist.
    async fn insert_bulk(&mut self, links: Vec<HistoryCommit>) -> anyhow::Result<()> {
        let mut query_builder = QueryBuilder::new(
            "INSERT INTO history_commit_links ( build_record_id, commit_id, position ) ",
        );
        for chunk in links.chunks(BATCH_SIZE) {
            query_builder.push_values(chunk, |mut bindings, link| {
                bindings
                    .push_bind(link.build_record_id)
                    .push_bind(link.commit_id)
                    .push_bind(link.position);
            });
            let query = query_builder.build();
            query.execute(&mut *self.tx).await?;
            query_builder.reset();
        }
        Ok(())
    }
}
