//! Manager for the person model.
use super::{NewPerson, Person};
use crate::db::{DatabaseConnection, DatabaseTransaction};
use async_trait::async_trait;

#[async_trait]
impl super::Manager for DatabaseConnection {
    /// Find a person by their contact key.
    ///
    /// # Errors
    /// Errors if can't establish a connection to the database.
    async fn find_by_contact_key(&self, contact_key: &str) -> anyhow::Result<Option<Person>> {
        let statement = "
            SELECT *
            FROM people
            WHERE contact_key = $1
        ";
        let mut connection = self.pool.acquire().await?;
        let row = sqlx::query_as::<_, Person>(statement)
            .bind(contact_key)
            .fetch_optional(&mut *connection)
            .await?;
        Ok(row)
    }
}

#[async_trait]
impl super::TxManager for DatabaseTransaction {
    /// Upsert a person into the database.
    ///
    /// The conflict branch rewrites the key with itself, so an existing row keeps its
    /// original fields while `RETURNING` still yields its id. Insert and lookup happen in
    /// one statement, which keeps concurrent writers from creating duplicates.
    ///
    /// # Errors
    /// Errors if the person cannot be inserted into the database.
    async fn upsert(&mut self, person: &NewPerson) -> anyhow::Result<i64> {
        let statement = "
            INSERT INTO people ( name, handle, contact_key, profile_url, avatar_url )
            VALUES ( $1, $2, $3, $4, $5 )
            ON CONFLICT ( contact_key ) DO UPDATE SET contact_key = excluded.contact_key
            RETURNING id
        ";
        let row = sqlx::query_as::<_, (i64,)>(statement)
            .bind(&person.name)
            .bind(&person.handle)
            .bind(&person.contact_key)
            .bind(person.profile_url.clone())
            .bind(person.avatar_url.clone())
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(row.0)
    }
}
