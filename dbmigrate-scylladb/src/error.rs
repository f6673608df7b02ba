//! Error types for ScyllaDB operations.

use thiserror::Error;

/// Result type for ScyllaDB operations.
pub type ScyllaResult<T> = Result<T, ScyllaError>;

/// Errors that can occur during ScyllaDB operations.
#[derive(Error, Debug)]
pub enum ScyllaError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Connection error.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution error.
    #[error("Query error: {0}")]
    Query(String),

    /// Operation timed out.
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Syntax error in CQL.
    #[error("CQL syntax error: {0}")]
    Syntax(String),

    /// Invalid query.
    #[error("Invalid query: {0}")]
    Invalid(String),

    /// Table or keyspace already exists.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Authentication or authorization failure.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The server returned a row shape the store does not understand.
    #[error("Unexpected result: {0}")]
    UnexpectedResult(String),
}

impl ScyllaError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create an unexpected result error.
    pub fn unexpected(msg: impl Into<String>) -> Self {
        Self::UnexpectedResult(msg.into())
    }

    /// Check if the error reports an already existing table.
    ///
    /// Older Cassandra versions only say so in the message text
    /// ("Cannot add already existing column family").
    #[must_use]
    pub fn is_already_exists(&self) -> bool {
        match self {
            Self::AlreadyExists(_) => true,
            Self::Query(msg) | Self::Invalid(msg) => {
                let msg = msg.to_lowercase();
                msg.contains("already exist")
            }
            _ => false,
        }
    }
}

// Conversion from scylla driver errors
impl From<scylla::transport::errors::NewSessionError> for ScyllaError {
    fn from(err: scylla::transport::errors::NewSessionError) -> Self {
        Self::Connection(err.to_string())
    }
}

impl From<scylla::transport::errors::QueryError> for ScyllaError {
    fn from(err: scylla::transport::errors::QueryError) -> Self {
        use scylla::transport::errors::{DbError, QueryError};

        match &err {
            QueryError::TimeoutError => Self::Timeout(err.to_string()),
            QueryError::DbError(db_err, msg) => match db_err {
                DbError::AlreadyExists { .. } => Self::AlreadyExists(msg.clone()),
                DbError::WriteTimeout { .. } | DbError::ReadTimeout { .. } => {
                    Self::Timeout(msg.clone())
                }
                DbError::SyntaxError => Self::Syntax(msg.clone()),
                DbError::Invalid => Self::Invalid(msg.clone()),
                DbError::Unauthorized | DbError::AuthenticationError => {
                    Self::Authentication(msg.clone())
                }
                _ => Self::Query(format!("{db_err}: {msg}")),
            },
            _ => Self::Query(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_already_exists() {
        assert!(ScyllaError::AlreadyExists("migrations".into()).is_already_exists());
        assert!(
            ScyllaError::Invalid("Cannot add already existing column family \"migrations\"".into())
                .is_already_exists()
        );
        assert!(!ScyllaError::Syntax("line 1:0 no viable alternative".into()).is_already_exists());
        assert!(!ScyllaError::Connection("already exists".into()).is_already_exists());
    }

    #[test]
    fn test_from_db_error() {
        use scylla::transport::errors::{DbError, QueryError};

        let err: ScyllaError = QueryError::DbError(
            DbError::AlreadyExists {
                keyspace: "app".into(),
                table: "migrations".into(),
            },
            "Table app.migrations already exists".into(),
        )
        .into();
        assert!(err.is_already_exists());

        let err: ScyllaError =
            QueryError::DbError(DbError::SyntaxError, "bad input".into()).into();
        assert!(matches!(err, ScyllaError::Syntax(_)));
    }
}
