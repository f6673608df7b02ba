//! # dbmigrate-core
//!
//! Backend-agnostic migration runner for dbmigrate.
//!
//! This crate provides:
//! - The [`MigrationStore`] capability implemented by each database backend
//! - Discovery of `.sql` / `.cql` migration files in a directory
//! - The [`Migrator`] that applies pending files in byte-wise name order
//! - An in-memory store for tests and dry runs
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐     ┌────────────────────┐     ┌──────────────────┐
//! │ migrations/  │────▶│ Migrator           │────▶│ MigrationStore   │
//! │ 001_a.sql    │     │ list, sort, skip   │     │ ensure/has/apply │
//! │ 002_b.sql    │     │ read, apply, report│     └──────────────────┘
//! └──────────────┘     └────────────────────┘              │
//!                                │                         ▼
//!                                ▼                  ┌─────────────┐
//!                       "Migrated 001_a.sql"        │ migrations  │
//!                                                   └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use dbmigrate_core::{MemoryStore, MigrationConfig, Migrator};
//!
//! # async fn example() -> dbmigrate_core::MigrateResult<()> {
//! let config = MigrationConfig::new().migrations_dir("./migrations");
//! let migrator = Migrator::new(MemoryStore::new(), config);
//!
//! let report = migrator.run().await?;
//! println!("{}", report.summary());
//! # Ok(())
//! # }
//! ```
//!
//! ## Migration Files
//!
//! Every top-level `.sql` or `.cql` file is one migration, identified by its
//! file name. Files are applied in byte-wise lexicographic order, so name
//! them with a zero-padded number or a timestamp:
//!
//! ```text
//! migrations/
//! ├── 001_create_users.sql
//! ├── 002_add_posts.sql
//! └── README.md              # ignored
//! ```
//!
//! ## Limitations
//!
//! Runners do not coordinate with each other. Two processes migrating the
//! same store at once can both apply the same file; guard deployments with an
//! external lock.

pub mod engine;
pub mod error;
pub mod file;
pub mod history;
pub mod logging;
pub mod memory;
pub mod report;

// Re-exports
pub use engine::{MigrationConfig, MigrationReport, MigrationStatus, Migrator, apply_migrations};
pub use error::{MigrateResult, MigrationError};
pub use file::{DEFAULT_EXTENSIONS, MigrationFile, MigrationFileManager};
pub use history::{DEFAULT_TABLE, MigrationRecord, MigrationStore, validate_table_name};
pub use memory::MemoryStore;
pub use report::{Reporter, SilentReporter, StdoutReporter, progress_line};
