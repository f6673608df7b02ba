//! # dbmigrate
//!
//! Ordered, idempotent schema migrations for PostgreSQL and ScyllaDB.
//!
//! Point dbmigrate at a directory of `.sql` or `.cql` files. Each run applies
//! every file that has not been applied yet, in ascending file-name order, and
//! records it so that it never runs twice. For each applied file the line
//! `Migrated <filename>` is printed to stdout. The first failure stops the
//! run.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! # #[cfg(feature = "postgres")]
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! use dbmigrate::postgres::PgPool;
//!
//! let pool = PgPool::from_url("postgresql://localhost/app")?;
//! dbmigrate::run(&pool, "./migrations").await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Any store
//!
//! Anything implementing [`MigrationStore`] can be migrated:
//!
//! ```rust
//! use dbmigrate::{MemoryStore, MigrationConfig, Migrator, SilentReporter};
//!
//! # async fn example() -> dbmigrate::MigrateResult<()> {
//! let migrator = Migrator::new(
//!     MemoryStore::new(),
//!     MigrationConfig::new().migrations_dir("./migrations"),
//! )
//! .with_reporter(SilentReporter);
//!
//! let report = migrator.run().await?;
//! println!("{}", report.summary());
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `postgres` (default): PostgreSQL store and `run`
//! - `scylladb`: ScyllaDB store and `run_scylladb`
//! - `logging`: [`logging::init`] installs a `tracing-subscriber`

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub use dbmigrate_core::{
    DEFAULT_EXTENSIONS, DEFAULT_TABLE, MemoryStore, MigrateResult, MigrationConfig,
    MigrationError, MigrationFile, MigrationFileManager, MigrationRecord, MigrationReport,
    MigrationStatus, MigrationStore, Migrator, Reporter, SilentReporter, StdoutReporter,
    apply_migrations, logging, progress_line, validate_table_name,
};

/// PostgreSQL backend.
#[cfg(feature = "postgres")]
#[cfg_attr(docsrs, doc(cfg(feature = "postgres")))]
pub mod postgres {
    pub use dbmigrate_postgres::*;
}

/// ScyllaDB backend.
#[cfg(feature = "scylladb")]
#[cfg_attr(docsrs, doc(cfg(feature = "scylladb")))]
pub mod scylladb {
    pub use dbmigrate_scylladb::*;
}

/// Apply the migrations in `dir` to PostgreSQL.
///
/// This is the default entry point: relational store, `migrations` table,
/// one transaction per migration.
#[cfg(feature = "postgres")]
#[cfg_attr(docsrs, doc(cfg(feature = "postgres")))]
pub async fn run(
    pool: &dbmigrate_postgres::PgPool,
    dir: impl AsRef<std::path::Path>,
) -> MigrateResult<MigrationReport> {
    dbmigrate_postgres::run(pool, dir).await
}

/// Apply the migrations in `dir` to ScyllaDB through one session.
#[cfg(feature = "scylladb")]
#[cfg_attr(docsrs, doc(cfg(feature = "scylladb")))]
pub async fn run_scylladb(
    connection: &dbmigrate_scylladb::ScyllaConnection,
    dir: impl AsRef<std::path::Path>,
) -> MigrateResult<MigrationReport> {
    dbmigrate_scylladb::run(connection, dir).await
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use dbmigrate_core::{
        MigrateResult, MigrationConfig, MigrationError, MigrationReport, MigrationStore,
        Migrator, apply_migrations,
    };

    #[cfg(feature = "postgres")]
    pub use dbmigrate_postgres::{PgMigrationStore, PgPool};

    #[cfg(feature = "scylladb")]
    pub use dbmigrate_scylladb::{ScyllaConfig, ScyllaMigrationStore, connect};
}
