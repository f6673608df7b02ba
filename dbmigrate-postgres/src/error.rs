//! Error types for PostgreSQL operations.

use thiserror::Error;
use tokio_postgres::error::SqlState;

/// Result type for PostgreSQL operations.
pub type PgResult<T> = Result<T, PgError>;

/// Errors that can occur during PostgreSQL operations.
#[derive(Error, Debug)]
pub enum PgError {
    /// Connection pool error.
    #[error("pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    /// PostgreSQL error.
    #[error("postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl PgError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// The server's SQLSTATE code, if the server reported one.
    pub fn sql_state(&self) -> Option<&SqlState> {
        match self {
            Self::Postgres(e) => e.code(),
            _ => None,
        }
    }

    /// Check if the server rejected a DDL statement because the object exists.
    pub fn is_already_exists(&self) -> bool {
        match self.sql_state() {
            Some(state) => is_already_exists_state(state),
            None => match self {
                Self::Postgres(e) => e.to_string().contains("already exists"),
                _ => false,
            },
        }
    }

    /// Check if this is a unique constraint violation.
    pub fn is_unique_violation(&self) -> bool {
        self.sql_state() == Some(&SqlState::UNIQUE_VIOLATION)
    }
}

/// SQLSTATEs returned when creating an object that already exists.
pub(crate) fn is_already_exists_state(state: &SqlState) -> bool {
    *state == SqlState::DUPLICATE_TABLE || *state == SqlState::DUPLICATE_OBJECT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = PgError::config("invalid URL");
        assert!(matches!(err, PgError::Config(_)));
        assert!(!err.is_already_exists());
        assert!(!err.is_unique_violation());
        assert!(err.sql_state().is_none());
    }

    #[test]
    fn test_already_exists_states() {
        // 42P07: relation "idx_migrations_name" already exists
        assert!(is_already_exists_state(&SqlState::DUPLICATE_TABLE));
        assert!(is_already_exists_state(&SqlState::DUPLICATE_OBJECT));
        assert!(!is_already_exists_state(&SqlState::UNIQUE_VIOLATION));
        assert!(!is_already_exists_state(&SqlState::SYNTAX_ERROR));
    }
}
