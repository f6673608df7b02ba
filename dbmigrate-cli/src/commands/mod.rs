//! CLI command implementations.

pub mod status;
pub mod up;
pub mod version;

use std::path::PathBuf;

use dbmigrate_core::{MigrationStore, validate_table_name};

use crate::cli::{ConnectionArgs, DatabaseProvider};
use crate::config::Config;
use crate::error::{CliError, CliResult};
use crate::output;

/// Connection settings after merging flags, environment and config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Database provider
    pub provider: DatabaseProvider,
    /// Connection URL (writer session for scylladb)
    pub url: String,
    /// Reader session URL (scylladb only)
    pub reader_url: Option<String>,
    /// Migrations directory
    pub dir: PathBuf,
    /// Bookkeeping table name
    pub table: String,
    /// Apply body and record in one transaction (postgresql only)
    pub transactional: bool,
}

impl Settings {
    /// Merge command-line flags over the config file.
    ///
    /// `--url` (or `DATABASE_URL`, which clap folds into it) wins over
    /// `database.url`.
    pub fn resolve(config: &Config, args: &ConnectionArgs) -> CliResult<Self> {
        let provider = match args.provider {
            Some(provider) => provider,
            None => config
                .database
                .provider
                .parse()
                .map_err(CliError::Config)?,
        };

        let url = args
            .url
            .clone()
            .or_else(|| config.database.url.clone())
            .ok_or_else(|| {
                CliError::Config(
                    "No database URL configured (use --url or DATABASE_URL)".to_string(),
                )
            })?;

        let table = args
            .table
            .clone()
            .unwrap_or_else(|| config.migrations.table_name.clone());
        validate_table_name(&table)?;

        Ok(Self {
            provider,
            url,
            reader_url: args
                .reader_url
                .clone()
                .or_else(|| config.database.reader_url.clone()),
            dir: args
                .dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(&config.migrations.directory)),
            table,
            transactional: config.migrations.transactional,
        })
    }
}

/// Connect to the configured database and build its migration store.
pub async fn open_store(settings: &Settings) -> CliResult<Box<dyn MigrationStore>> {
    match settings.provider {
        DatabaseProvider::Postgresql => open_postgres(settings).await,
        DatabaseProvider::Scylladb => open_scylladb(settings).await,
    }
}

#[cfg(feature = "postgres")]
async fn open_postgres(settings: &Settings) -> CliResult<Box<dyn MigrationStore>> {
    use dbmigrate_postgres::{PgPool, PgMigrationStore};

    if settings.reader_url.is_some() {
        output::warn("reader_url is ignored for postgresql");
    }

    let pool = PgPool::from_url(&settings.url)?;
    let store = PgMigrationStore::new(pool)
        .with_table(&settings.table)?
        .transactional(settings.transactional);
    Ok(Box::new(store))
}

#[cfg(not(feature = "postgres"))]
async fn open_postgres(_settings: &Settings) -> CliResult<Box<dyn MigrationStore>> {
    Err(CliError::Config(
        "postgresql support is not compiled in (enable the `postgres` feature)".to_string(),
    ))
}

#[cfg(feature = "scylladb")]
async fn open_scylladb(settings: &Settings) -> CliResult<Box<dyn MigrationStore>> {
    use dbmigrate_scylladb::{ScyllaConfig, ScyllaMigrationStore, connect};

    if !settings.transactional {
        output::warn("scylladb migrations are never transactional");
    }

    let writer = connect(ScyllaConfig::from_url(&settings.url)?).await?;
    let reader = match &settings.reader_url {
        Some(url) => connect(ScyllaConfig::from_url(url)?).await?,
        None => writer.clone(),
    };

    let store = ScyllaMigrationStore::new(reader, writer).with_table(&settings.table)?;
    Ok(Box::new(store))
}

#[cfg(not(feature = "scylladb"))]
async fn open_scylladb(_settings: &Settings) -> CliResult<Box<dyn MigrationStore>> {
    Err(CliError::Config(
        "scylladb support is not compiled in (enable the `scylladb` feature)".to_string(),
    ))
}
