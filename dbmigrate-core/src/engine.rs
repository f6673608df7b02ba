//! Migration runner.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info};

use crate::error::MigrateResult;
use crate::file::{DEFAULT_EXTENSIONS, MigrationFileManager};
use crate::history::MigrationStore;
use crate::report::{Reporter, StdoutReporter};

/// Configuration for the migration runner.
#[derive(Debug, Clone)]
pub struct MigrationConfig {
    /// Path to the migrations directory.
    pub migrations_dir: PathBuf,
    /// Recognized file extensions, without leading dot.
    pub extensions: Vec<String>,
    /// Whether to run in dry-run mode.
    pub dry_run: bool,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            migrations_dir: PathBuf::from("./migrations"),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            dry_run: false,
        }
    }
}

impl MigrationConfig {
    /// Create a new configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the migrations directory.
    pub fn migrations_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.migrations_dir = dir.into();
        self
    }

    /// Set the recognized extensions.
    pub fn extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Enable dry-run mode.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Result of a migration run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Migrations applied by this run (or that would be, in dry-run mode).
    pub applied: Vec<String>,
    /// Migrations skipped because a record already existed.
    pub already_applied: Vec<String>,
    /// Migrations skipped because the file was empty.
    pub empty: Vec<String>,
    /// Whether this was a dry run.
    pub dry_run: bool,
    /// Total duration in milliseconds.
    pub duration_ms: i64,
}

impl MigrationReport {
    /// Number of migrations applied.
    pub fn applied_count(&self) -> usize {
        self.applied.len()
    }

    /// Check if any migrations were applied.
    pub fn has_changes(&self) -> bool {
        !self.applied.is_empty()
    }

    /// Get a summary of the report.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();

        if !self.applied.is_empty() {
            let verb = if self.dry_run { "to apply" } else { "applied" };
            parts.push(format!("{} {}", self.applied.len(), verb));
        }

        if !self.already_applied.is_empty() {
            parts.push(format!("{} already applied", self.already_applied.len()));
        }

        if !self.empty.is_empty() {
            parts.push(format!("{} empty", self.empty.len()));
        }

        if parts.is_empty() {
            "No migrations found".to_string()
        } else {
            format!("{} in {}ms", parts.join(", "), self.duration_ms)
        }
    }
}

/// Migration status information.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationStatus {
    /// Migrations with a record.
    pub applied: Vec<String>,
    /// Non-empty migrations without a record.
    pub pending: Vec<String>,
    /// Empty migration files. These are never recorded.
    pub empty: Vec<String>,
}

impl MigrationStatus {
    /// Check if everything has been applied.
    pub fn is_up_to_date(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Applies migration files from a directory to a [`MigrationStore`].
pub struct Migrator<S: MigrationStore> {
    store: S,
    config: MigrationConfig,
    files: MigrationFileManager,
    reporter: Box<dyn Reporter>,
}

impl<S: MigrationStore> Migrator<S> {
    /// Create a new runner reporting progress on stdout.
    pub fn new(store: S, config: MigrationConfig) -> Self {
        let files = MigrationFileManager::new(&config.migrations_dir)
            .with_extensions(config.extensions.iter().cloned());
        Self {
            store,
            config,
            files,
            reporter: Box::new(StdoutReporter),
        }
    }

    /// Replace the progress reporter.
    pub fn with_reporter(mut self, reporter: impl Reporter + 'static) -> Self {
        self.reporter = Box::new(reporter);
        self
    }

    /// Get the store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get the configuration.
    pub fn config(&self) -> &MigrationConfig {
        &self.config
    }

    /// Apply every pending migration, in order, stopping at the first error.
    pub async fn run(&self) -> MigrateResult<MigrationReport> {
        let start = Instant::now();
        let mut report = MigrationReport {
            dry_run: self.config.dry_run,
            ..MigrationReport::default()
        };

        self.store.ensure_bookkeeping().await?;

        let names = self.files.list_names().await?;
        debug!(
            dir = %self.files.migrations_dir().display(),
            candidates = names.len(),
            "Discovered migration files"
        );

        for name in names {
            if self.store.has_applied(&name).await? {
                report.already_applied.push(name);
                continue;
            }

            let file = self.files.read(&name).await?;
            if file.is_empty() {
                debug!(migration = %name, "Skipping empty migration");
                report.empty.push(name);
                continue;
            }

            if self.config.dry_run {
                info!(migration = %name, "Would apply migration");
                report.applied.push(name);
                continue;
            }

            let migration_start = Instant::now();
            self.store.apply(&file.name, &file.body).await?;
            info!(
                migration = %name,
                duration_ms = migration_start.elapsed().as_millis() as u64,
                "Applied migration"
            );

            self.reporter.migrated(&name);
            report.applied.push(name);
        }

        report.duration_ms = start.elapsed().as_millis() as i64;
        Ok(report)
    }

    /// Classify every candidate file without applying anything.
    pub async fn status(&self) -> MigrateResult<MigrationStatus> {
        self.store.ensure_bookkeeping().await?;

        let mut status = MigrationStatus::default();
        for name in self.files.list_names().await? {
            if self.store.has_applied(&name).await? {
                status.applied.push(name);
            } else if self.files.read(&name).await?.is_empty() {
                status.empty.push(name);
            } else {
                status.pending.push(name);
            }
        }

        Ok(status)
    }
}

/// Apply migrations from `dir` to any store, printing progress on stdout.
pub async fn apply_migrations<S: MigrationStore>(
    store: S,
    dir: impl AsRef<Path>,
) -> MigrateResult<MigrationReport> {
    let config = MigrationConfig::new().migrations_dir(dir.as_ref());
    Migrator::new(store, config).run().await
}
