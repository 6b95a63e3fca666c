//! Repository Module
//!
//! CRUD operations over the SQLite schema. Repositories are free functions
//! taking `&SqlitePool`; transactions wrap every multi-table write.

pub mod permission;
pub mod role;
pub mod user;

use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        // Concurrent inserts can slip past the pre-insert name checks; the
        // UNIQUE constraint still catches them and must surface as a
        // duplicate, not a generic database failure.
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            return RepoError::Duplicate(db_err.message().to_string());
        }
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;
