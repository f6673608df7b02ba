//! CLI error types and result alias.

use dbmigrate_core::MigrationError;
use miette::Diagnostic;
use thiserror::Error;

/// Result type alias for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// CLI error types
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// IO error
    #[error("IO error: {0}")]
    #[diagnostic(code(dbmigrate::io))]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    #[diagnostic(code(dbmigrate::config))]
    Config(String),

    /// Connecting to the database failed
    #[error("Database error: {0}")]
    #[diagnostic(code(dbmigrate::database))]
    Database(String),

    /// Migration error
    #[error(transparent)]
    #[diagnostic(code(dbmigrate::migration))]
    Migration(#[from] MigrationError),
}

impl From<toml::de::Error> for CliError {
    fn from(err: toml::de::Error) -> Self {
        CliError::Config(format!("Failed to parse TOML: {}", err))
    }
}

impl From<toml::ser::Error> for CliError {
    fn from(err: toml::ser::Error) -> Self {
        CliError::Config(format!("Failed to serialize TOML: {}", err))
    }
}

#[cfg(feature = "postgres")]
impl From<dbmigrate_postgres::PgError> for CliError {
    fn from(err: dbmigrate_postgres::PgError) -> Self {
        CliError::Database(err.to_string())
    }
}

#[cfg(feature = "scylladb")]
impl From<dbmigrate_scylladb::ScyllaError> for CliError {
    fn from(err: dbmigrate_scylladb::ScyllaError) -> Self {
        CliError::Database(err.to_string())
    }
}
