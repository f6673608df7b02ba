//! End-to-end behaviour of the migration runner against in-process stores.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use dbmigrate::{
    MemoryStore, MigrateResult, MigrationConfig, MigrationError, MigrationStore, Migrator,
};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn write(dir: &Path, name: &str, body: &str) {
    fs::write(dir.join(name), body).unwrap();
}

/// Runs the directory against `store`, returning the progress lines printed.
async fn run_capturing<S: MigrationStore>(
    store: S,
    dir: &Path,
) -> (MigrateResult<dbmigrate::MigrationReport>, Vec<String>) {
    let lines = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&lines);

    let migrator = Migrator::new(store, MigrationConfig::new().migrations_dir(dir))
        .with_reporter(move |name: &str| sink.lock().push(dbmigrate::progress_line(name)));
    let result = migrator.run().await;

    let lines = lines.lock().clone();
    (result, lines)
}

/// Wraps a [`MemoryStore`] and fails one phase for one migration.
struct FailingStore {
    inner: MemoryStore,
    fail_on: &'static str,
    phase: Phase,
    attempted: Mutex<Vec<String>>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Phase {
    Bookkeeping,
    Query,
    Execute,
    Record,
}

impl FailingStore {
    fn new(fail_on: &'static str, phase: Phase) -> Self {
        Self {
            inner: MemoryStore::new(),
            fail_on,
            phase,
            attempted: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl MigrationStore for FailingStore {
    async fn ensure_bookkeeping(&self) -> MigrateResult<()> {
        if self.phase == Phase::Bookkeeping {
            return Err(MigrationError::bookkeeping("permission denied"));
        }
        self.inner.ensure_bookkeeping().await
    }

    async fn has_applied(&self, name: &str) -> MigrateResult<bool> {
        if self.phase == Phase::Query && name == self.fail_on {
            return Err(MigrationError::query(name, "connection reset"));
        }
        self.inner.has_applied(name).await
    }

    async fn apply(&self, name: &str, body: &str) -> MigrateResult<()> {
        self.attempted.lock().push(name.to_string());
        if name == self.fail_on {
            match self.phase {
                Phase::Execute => {
                    return Err(MigrationError::execution(name, "syntax error at or near \"TABEL\""));
                }
                Phase::Record => {
                    return Err(MigrationError::record(name, "connection lost"));
                }
                _ => {}
            }
        }
        self.inner.apply(name, body).await
    }
}

#[tokio::test]
async fn test_first_and_second_run() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "001_init.sql", "CREATE TABLE users (id SERIAL PRIMARY KEY);");
    write(dir.path(), "002_seed.sql", "INSERT INTO users DEFAULT VALUES;");
    write(dir.path(), "notes.txt", "not a migration");

    let store = MemoryStore::new();

    let (report, lines) = run_capturing(&store, dir.path()).await;
    let report = report.unwrap();
    assert_eq!(lines, vec!["Migrated 001_init.sql", "Migrated 002_seed.sql"]);
    assert_eq!(report.applied, vec!["001_init.sql", "002_seed.sql"]);
    assert_eq!(store.applied_names(), vec!["001_init.sql", "002_seed.sql"]);

    let (report, lines) = run_capturing(&store, dir.path()).await;
    let report = report.unwrap();
    assert!(lines.is_empty());
    assert!(!report.has_changes());
    assert_eq!(report.already_applied, vec!["001_init.sql", "002_seed.sql"]);
    assert_eq!(store.records().len(), 2);
    assert_eq!(store.executed().len(), 2);
}

#[tokio::test]
async fn test_applies_in_byte_order_not_creation_order() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "b.sql", "SELECT 2;");
    write(dir.path(), "a.sql", "SELECT 1;");
    write(dir.path(), "10_late.sql", "SELECT 10;");
    write(dir.path(), "2_early.sql", "SELECT 20;");
    write(dir.path(), "B_upper.sql", "SELECT 3;");

    let store = MemoryStore::new();
    let (result, _) = run_capturing(&store, dir.path()).await;
    result.unwrap();

    // Plain byte order: digits, then upper case, then lower case.
    assert_eq!(
        store.applied_names(),
        vec!["10_late.sql", "2_early.sql", "B_upper.sql", "a.sql", "b.sql"]
    );
}

#[tokio::test]
async fn test_bodies_are_passed_verbatim() {
    let dir = TempDir::new().unwrap();
    let body = "-- comment\nCREATE TABLE a (id INT);\n\nCREATE TABLE b (id INT);\n";
    write(dir.path(), "001.sql", body);

    let store = MemoryStore::new();
    let (result, _) = run_capturing(&store, dir.path()).await;
    result.unwrap();

    assert_eq!(
        store.executed(),
        vec![("001.sql".to_string(), body.to_string())]
    );
}

#[tokio::test]
async fn test_empty_files_are_never_recorded() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "001_init.sql", "CREATE TABLE a (id INT);");
    write(dir.path(), "002_placeholder.sql", "");
    write(dir.path(), "003_more.sql", "CREATE TABLE b (id INT);");

    let store = MemoryStore::new();
    let (report, lines) = run_capturing(&store, dir.path()).await;
    let report = report.unwrap();

    assert_eq!(lines, vec!["Migrated 001_init.sql", "Migrated 003_more.sql"]);
    assert_eq!(report.empty, vec!["002_placeholder.sql"]);
    assert_eq!(store.applied_names(), vec!["001_init.sql", "003_more.sql"]);

    // Still skipped, and still unrecorded, on the next run.
    let (report, _) = run_capturing(&store, dir.path()).await;
    assert_eq!(report.unwrap().empty, vec!["002_placeholder.sql"]);
    assert_eq!(store.records().len(), 2);
}

#[tokio::test]
async fn test_filled_in_empty_file_is_applied_later() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "001.sql", "");

    let store = MemoryStore::new();
    run_capturing(&store, dir.path()).await.0.unwrap();
    assert!(store.applied_names().is_empty());

    write(dir.path(), "001.sql", "CREATE TABLE a (id INT);");
    let (_, lines) = run_capturing(&store, dir.path()).await;
    assert_eq!(lines, vec!["Migrated 001.sql"]);
}

#[tokio::test]
async fn test_failure_stops_the_run() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "A.sql", "SELECT 1;");
    write(dir.path(), "B.sql", "SELECT 2;");
    write(dir.path(), "C.sql", "CREATE TABEL broken;");
    write(dir.path(), "D.sql", "SELECT 4;");

    let store = FailingStore::new("C.sql", Phase::Execute);
    let (result, lines) = run_capturing(&store, dir.path()).await;

    let err = result.unwrap_err();
    assert!(matches!(&err, MigrationError::Execution { name, .. } if name == "C.sql"));
    assert_eq!(err.migration(), Some("C.sql"));
    assert!(!err.is_inconsistent());

    assert_eq!(lines, vec!["Migrated A.sql", "Migrated B.sql"]);
    assert_eq!(*store.attempted.lock(), vec!["A.sql", "B.sql", "C.sql"]);
    assert_eq!(store.inner.applied_names(), vec!["A.sql", "B.sql"]);
}

#[tokio::test]
async fn test_rerun_after_fix_resumes_at_failed_file() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "A.sql", "SELECT 1;");
    write(dir.path(), "B.sql", "CREATE TABEL broken;");
    write(dir.path(), "C.sql", "SELECT 3;");

    let failing = FailingStore::new("B.sql", Phase::Execute);
    assert!(run_capturing(&failing, dir.path()).await.0.is_err());

    // Same records, store no longer failing.
    let store = MemoryStore::with_applied(failing.inner.applied_names());
    let (result, lines) = run_capturing(&store, dir.path()).await;
    result.unwrap();
    assert_eq!(lines, vec!["Migrated B.sql", "Migrated C.sql"]);
}

#[tokio::test]
async fn test_record_failure_is_reported_as_inconsistent() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "001.sql", "SELECT 1;");
    write(dir.path(), "002.sql", "SELECT 2;");

    let store = FailingStore::new("001.sql", Phase::Record);
    let (result, lines) = run_capturing(&store, dir.path()).await;

    let err = result.unwrap_err();
    assert!(err.is_inconsistent());
    assert!(err.to_string().contains("could not be recorded"));
    assert!(lines.is_empty());
    assert_eq!(*store.attempted.lock(), vec!["001.sql"]);
}

#[tokio::test]
async fn test_query_failure_applies_nothing_further() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "001.sql", "SELECT 1;");
    write(dir.path(), "002.sql", "SELECT 2;");

    let store = FailingStore::new("002.sql", Phase::Query);
    let (result, _) = run_capturing(&store, dir.path()).await;

    assert!(matches!(result, Err(MigrationError::Query { .. })));
    assert_eq!(*store.attempted.lock(), vec!["001.sql"]);
}

#[tokio::test]
async fn test_bookkeeping_failure_aborts_before_any_file() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "001.sql", "SELECT 1;");

    let store = FailingStore::new("", Phase::Bookkeeping);
    let (result, lines) = run_capturing(&store, dir.path()).await;

    assert!(matches!(result, Err(MigrationError::Bookkeeping(_))));
    assert!(lines.is_empty());
    assert!(store.attempted.lock().is_empty());
}

#[tokio::test]
async fn test_existing_bookkeeping_is_reused() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "001_init.sql", "SELECT 1;");
    write(dir.path(), "002_next.sql", "SELECT 2;");

    let store = MemoryStore::with_applied(["001_init.sql"]);
    let (report, lines) = run_capturing(&store, dir.path()).await;

    assert_eq!(report.unwrap().already_applied, vec!["001_init.sql"]);
    assert_eq!(lines, vec!["Migrated 002_next.sql"]);
    assert_eq!(store.executed().len(), 1);
}

#[tokio::test]
async fn test_other_files_are_never_read() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "001.sql", "SELECT 1;");
    write(dir.path(), "002.cql", "CREATE TABLE t (id int PRIMARY KEY);");
    write(dir.path(), "README.md", "# migrations");
    write(dir.path(), "003.sql.bak", "DROP TABLE users;");
    write(dir.path(), "004.SQL", "DROP TABLE users;");
    fs::create_dir(dir.path().join("005_dir.sql")).unwrap();

    let store = MemoryStore::new();
    run_capturing(&store, dir.path()).await.0.unwrap();

    assert_eq!(store.applied_names(), vec!["001.sql", "002.cql"]);
}

#[tokio::test]
async fn test_extensions_can_be_narrowed() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "001.sql", "SELECT 1;");
    write(dir.path(), "002.cql", "SELECT now() FROM system.local;");

    let store = MemoryStore::new();
    let migrator = Migrator::new(
        &store,
        MigrationConfig::new()
            .migrations_dir(dir.path())
            .extensions(["cql"]),
    )
    .with_reporter(dbmigrate::SilentReporter);
    migrator.run().await.unwrap();

    assert_eq!(store.applied_names(), vec!["002.cql"]);
}

#[tokio::test]
async fn test_missing_directory() {
    let dir = TempDir::new().unwrap();
    let store = MemoryStore::new();

    let (result, _) = run_capturing(&store, &dir.path().join("missing")).await;
    assert!(matches!(result, Err(MigrationError::Io { .. })));
}

#[tokio::test]
async fn test_empty_directory() {
    let dir = TempDir::new().unwrap();
    let store = MemoryStore::new();

    let (report, lines) = run_capturing(&store, dir.path()).await;
    let report = report.unwrap();
    assert!(lines.is_empty());
    assert_eq!(report.summary(), "No migrations found");
    assert!(store.has_bookkeeping());
}

#[tokio::test]
async fn test_dry_run_then_status() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "001.sql", "SELECT 1;");
    write(dir.path(), "002.sql", "");
    write(dir.path(), "003.sql", "SELECT 3;");

    let store = MemoryStore::with_applied(["001.sql"]);
    let migrator = Migrator::new(
        &store,
        MigrationConfig::new().migrations_dir(dir.path()).dry_run(true),
    )
    .with_reporter(dbmigrate::SilentReporter);

    let report = migrator.run().await.unwrap();
    assert!(report.dry_run);
    assert_eq!(report.applied, vec!["003.sql"]);
    assert!(store.executed().is_empty());

    let status = migrator.status().await.unwrap();
    assert_eq!(status.applied, vec!["001.sql"]);
    assert_eq!(status.pending, vec!["003.sql"]);
    assert_eq!(status.empty, vec!["002.sql"]);
    assert!(!status.is_up_to_date());
}

#[tokio::test]
async fn test_apply_migrations_entry_point() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "001.sql", "SELECT 1;");

    let store = MemoryStore::new();
    let report = dbmigrate::apply_migrations(&store, dir.path()).await.unwrap();

    assert_eq!(report.applied_count(), 1);
    assert_eq!(store.applied_names(), vec!["001.sql"]);
}
