//! Custom error types for the common library
//!
//! This module defines the storage error type shared by every repository
//! in the storefront.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred during database connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred during database query execution
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// A unique constraint rejected the write
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// Error occurred during database migration
    #[error("Database migration error: {0}")]
    Migration(String),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

impl DatabaseError {
    /// Classify an error returned by a query.
    ///
    /// Unique violations are split out so callers can answer with a
    /// conflict instead of a server error.
    pub fn from_query(err: SqlxError) -> Self {
        let constraint = err
            .as_database_error()
            .filter(|db_err| db_err.is_unique_violation())
            .map(|db_err| db_err.constraint().unwrap_or("unique").to_string());

        match constraint {
            Some(constraint) => DatabaseError::UniqueViolation(constraint),
            None => DatabaseError::Query(err),
        }
    }

    /// Whether this error was caused by a duplicate key
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, DatabaseError::UniqueViolation(_))
    }
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;
