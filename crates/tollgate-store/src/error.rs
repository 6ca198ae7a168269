//! Error types for the store crate.

use thiserror::Error;

/// Errors raised by a store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("failed to acquire lock")]
    LockError,

    #[error("stored row is corrupt: {0}")]
    Corrupt(String),

    #[error("constraint violated: {0}")]
    Constraint(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Which phase of a claim replacement failed.
///
/// Either way the previous claim set is still in place.
#[derive(Debug, Error)]
pub enum ReplaceError {
    #[error("failed to delete existing claims: {0}")]
    Delete(#[source] StoreError),

    #[error("failed to create claims: {0}")]
    Create(#[source] StoreError),
}
