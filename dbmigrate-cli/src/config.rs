//! CLI configuration handling.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::CliResult;

/// Default config file name (lives in project root)
pub const CONFIG_FILE_NAME: &str = "dbmigrate.toml";

/// Default migrations directory (relative to project root)
pub const MIGRATIONS_DIR: &str = "migrations";

/// dbmigrate CLI configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Database configuration
    pub database: DatabaseConfig,

    /// Migration configuration
    pub migrations: MigrationConfig,
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration if the file exists, defaults otherwise
    pub fn load_or_default(path: &Path) -> CliResult<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load the file named on the command line, which must exist, or else
    /// the default file if it is present.
    pub fn resolve(explicit: Option<&Path>, default: &Path) -> CliResult<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => Self::load_or_default(default),
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> CliResult<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Database configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database provider (postgresql, scylladb)
    pub provider: String,

    /// Database connection URL
    pub url: Option<String>,

    /// Session used for bookkeeping reads (scylladb only)
    pub reader_url: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            provider: "postgresql".to_string(),
            url: None,
            reader_url: None,
        }
    }
}

/// Migration configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationConfig {
    /// Directory for migration files
    pub directory: String,

    /// Migration table name
    pub table_name: String,

    /// Apply each migration and its record in one transaction (postgresql only)
    pub transactional: bool,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            directory: MIGRATIONS_DIR.to_string(),
            table_name: dbmigrate_core::DEFAULT_TABLE.to_string(),
            transactional: true,
        }
    }
}
