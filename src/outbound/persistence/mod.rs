//! SQLite persistence via sqlx.
//!
//! All repositories share one pool capped at a single connection: SQLite
//! has a single writer anyway, and serialising access through the pool
//! keeps the enroll transaction free of `SQLITE_BUSY` retries.

pub mod sqlite_course_repository;
pub mod sqlite_enrollment_repository;
pub mod sqlite_student_repository;

use std::str::FromStr;

use sqlx::SqlitePool;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
};

pub use sqlite_course_repository::SqliteCourseRepository;
pub use sqlite_enrollment_repository::SqliteEnrollmentRepository;
pub use sqlite_student_repository::SqliteStudentRepository;

/// Open (or create) the database and bring the schema up to date.
pub async fn connect(url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    sqlx::migrate!().run(&pool).await?;

    Ok(pool)
}

/// Ephemeral in-memory database, used by tests and `sqlite::memory:` runs.
pub async fn connect_in_memory() -> Result<SqlitePool, sqlx::Error> {
    connect("sqlite::memory:").await
}
