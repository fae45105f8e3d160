//! Database error types
//!
//! This module provides error types for database operations and their
//! mapping into the ledger core's store-error contract.

use folio_core::StoreError;
use thiserror::Error;

/// Database-related errors
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Username already taken: {0}")]
    UsernameTaken(String),

    #[error("Concurrent modification: {0}")]
    Conflict(String),

    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),
}

/// Type alias for database results
pub type DatabaseResult<T> = Result<T, DatabaseError>;

impl From<DatabaseError> for StoreError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::Conflict(_) => StoreError::Conflict,
            DatabaseError::NotFound(what) => StoreError::NotFound(what),
            other => StoreError::Backend(other.to_string()),
        }
    }
}
