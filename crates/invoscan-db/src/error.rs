//! Database error types.

use thiserror::Error;

/// Database-specific errors.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to open or create database connection.
    #[error("failed to open database: {0}")]
    Open(String),

    /// Migration execution failed.
    #[error("migration failed: {0}")]
    Migration(String),

    /// Failed to decode database value.
    #[error("decode error: {0}")]
    Decode(String),

    /// The IBAN is already on the blacklist.
    #[error("IBAN is already blacklisted: {0}")]
    AlreadyBlacklisted(String),

    /// No blacklist entry for the IBAN.
    #[error("IBAN is not blacklisted: {0}")]
    NotFound(String),

    /// Input rejected before reaching the database.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Underlying `SQLx` error.
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

/// Result type alias for database operations.
pub type Result<T> = std::result::Result<T, DatabaseError>;

impl From<DatabaseError> for invoscan_core::InvoscanError {
    fn from(err: DatabaseError) -> Self {
        Self::Database(err.to_string())
    }
}
