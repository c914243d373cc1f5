//! This module contains all the sqlx structs for the database tables.

/// sqlx structs for build_records table.
pub mod build_record;
/// sqlx structs for commits table.
pub mod commit;
/// sqlx structs for history_commit_links table.
pub mod history_commit;
/// sqlx structs for people table.
pub mod person;

/// Maximum rows per multi-row insert statement.
pub const BATCH_SIZE: usize = 1000;
