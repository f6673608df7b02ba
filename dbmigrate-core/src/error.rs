//! Error types for the migration runner.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for migration operations.
pub type MigrateResult<T> = Result<T, MigrationError>;

/// Errors that can occur while applying migrations.
///
/// Every variant aborts the run. The only failure a store is allowed to swallow
/// is "bookkeeping structure already exists", which never reaches this type.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// The migrations directory or a migration file could not be read.
    #[error("I/O error at '{}': {source}", path.display())]
    Io {
        /// Path being read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Creating or verifying the bookkeeping structure failed.
    #[error("Failed to prepare migrations table: {0}")]
    Bookkeeping(String),

    /// Checking whether a migration already ran failed.
    #[error("Failed to check migration '{name}': {message}")]
    Query {
        /// Migration file name.
        name: String,
        /// Store error message.
        message: String,
    },

    /// The migration body failed to execute.
    #[error("Migration '{name}' failed: {message}")]
    Execution {
        /// Migration file name.
        name: String,
        /// Store error message.
        message: String,
    },

    /// The body executed but the completion record could not be written.
    #[error("Migration '{name}' was executed but could not be recorded: {message}")]
    Record {
        /// Migration file name.
        name: String,
        /// Store error message.
        message: String,
    },

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl MigrationError {
    /// Create an I/O error for the given path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a bookkeeping error.
    pub fn bookkeeping(msg: impl ToString) -> Self {
        Self::Bookkeeping(msg.to_string())
    }

    /// Create a query error.
    pub fn query(name: impl Into<String>, msg: impl ToString) -> Self {
        Self::Query {
            name: name.into(),
            message: msg.to_string(),
        }
    }

    /// Create an execution error.
    pub fn execution(name: impl Into<String>, msg: impl ToString) -> Self {
        Self::Execution {
            name: name.into(),
            message: msg.to_string(),
        }
    }

    /// Create a record-insertion error.
    pub fn record(name: impl Into<String>, msg: impl ToString) -> Self {
        Self::Record {
            name: name.into(),
            message: msg.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// The migration this error belongs to, if any.
    pub fn migration(&self) -> Option<&str> {
        match self {
            Self::Query { name, .. } | Self::Execution { name, .. } | Self::Record { name, .. } => {
                Some(name)
            }
            _ => None,
        }
    }

    /// Whether the store may now hold an executed but unrecorded body.
    ///
    /// Re-running will attempt the body again.
    pub fn is_inconsistent(&self) -> bool {
        matches!(self, Self::Record { .. })
    }
}
