//! Connecting to the history database.
use crate::db::{DatabaseConnection, Db as _};
use std::path::{Path, PathBuf};

/// File name of the default `SQLite` history database.
pub const DEFAULT_DB_FILE: &str = "hookci.sqlite3";

/// Build the default `SQLite` URL for a database file inside `data_dir`.
#[must_use]
pub fn default_database_url(data_dir: &Path) -> String {
    let sqlite_db_path = data_dir.join(PathBuf::from(DEFAULT_DB_FILE));
    format!("sqlite://{}?mode=rwc", sqlite_db_path.to_string_lossy())
}

/// Connects to a database and applies migrations.
/// We use `SQLite` by default, but the URL can be overridden with the `DATABASE_URL`
/// environment variable or the `--database-url` flag.
///
/// # Errors
/// Errors if connection to database fails.
/// Connections can fail if the database file cannot be created, or if the database URL is invalid.
pub async fn connect(db_url: &str) -> anyhow::Result<DatabaseConnection> {
    let connection = DatabaseConnection::connect(db_url).await?;
    tracing::info!("Connected to database");
    sqlx::migrate!("./migrations/sqlite")
        .run(&connection.pool)
        .await?;
    tracing::debug!("Database migrations applied");
    Ok(connection)
}
