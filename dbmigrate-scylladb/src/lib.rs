//! # dbmigrate-scylladb
//!
//! ScyllaDB (and Cassandra) backend for dbmigrate.
//!
//! Migration files are plain CQL. A file may hold several statements
//! separated by `;`; they are sent to the cluster one at a time, in order.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dbmigrate_scylladb::{ScyllaConfig, connect};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ScyllaConfig::from_url("scylla://127.0.0.1:9042/app")?;
//!     let connection = connect(config).await?;
//!
//!     dbmigrate_scylladb::run(&connection, "./migrations").await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Separate reader and writer
//!
//! The reader decides whether a migration already ran, so it must see the
//! writer's records. Pick consistency levels whose read and write replica
//! sets overlap, such as `LOCAL_QUORUM` for both.
//!
//! ```rust,no_run
//! use dbmigrate_scylladb::{ConsistencyLevel, ScyllaConfig, ScyllaMigrationStore, connect};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let reader = connect(
//!     ScyllaConfig::builder()
//!         .default_keyspace("app")
//!         .consistency(ConsistencyLevel::LocalQuorum)
//!         .build(),
//! )
//! .await?;
//! let writer = connect(ScyllaConfig::builder().default_keyspace("app").build()).await?;
//!
//! let store = ScyllaMigrationStore::new(reader, writer);
//! dbmigrate_core::apply_migrations(store, "./migrations").await?;
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

use std::path::Path;

use dbmigrate_core::{MigrateResult, MigrationReport, apply_migrations};

mod config;
mod connection;
mod error;
mod statements;
mod store;

pub use config::{ConsistencyLevel, DEFAULT_PORT, ScyllaConfig, ScyllaConfigBuilder};
pub use connection::{ScyllaConnection, connect};
pub use error::{ScyllaError, ScyllaResult};
pub use statements::split_statements;
pub use store::ScyllaMigrationStore;

/// Apply the migrations in `dir` through one session.
///
/// Uses the default `migrations` table for both reads and writes.
///
/// # Errors
///
/// Returns the first [`MigrationError`](dbmigrate_core::MigrationError) hit.
pub async fn run(
    connection: &ScyllaConnection,
    dir: impl AsRef<Path>,
) -> MigrateResult<MigrationReport> {
    apply_migrations(ScyllaMigrationStore::from_connection(connection.clone()), dir).await
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::{ConsistencyLevel, ScyllaConfig, ScyllaConfigBuilder};
    pub use crate::connection::{ScyllaConnection, connect};
    pub use crate::error::{ScyllaError, ScyllaResult};
    pub use crate::store::ScyllaMigrationStore;
    pub use crate::run;
}
