//! PostgreSQL migration store.

use async_trait::async_trait;
use dbmigrate_core::{
    DEFAULT_TABLE, MigrateResult, MigrationError, MigrationStore, validate_table_name,
};
use tracing::debug;

use crate::error::PgError;
use crate::pool::PgPool;

/// Applies migrations to PostgreSQL and tracks them in a table.
///
/// Bookkeeping layout:
///
/// ```sql
/// CREATE TABLE IF NOT EXISTS migrations (
///     id SERIAL,
///     name TEXT NOT NULL,
///     applied_at TIMESTAMP WITH TIME ZONE NOT NULL
/// );
/// CREATE UNIQUE INDEX idx_migrations_name ON migrations (name);
/// ```
///
/// By default a migration body and its record are written in one
/// transaction, so a failed record insert also rolls the body back. Bodies
/// that cannot run inside a transaction (`CREATE INDEX CONCURRENTLY`,
/// `ALTER TYPE ... ADD VALUE` on old servers, their own `BEGIN`/`COMMIT`)
/// need [`transactional(false)`](Self::transactional).
#[derive(Debug, Clone)]
pub struct PgMigrationStore {
    pool: PgPool,
    table: String,
    transactional: bool,
}

impl PgMigrationStore {
    /// Create a store using the default `migrations` table.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            table: DEFAULT_TABLE.to_string(),
            transactional: true,
        }
    }

    /// Use a different bookkeeping table.
    pub fn with_table(mut self, table: impl Into<String>) -> MigrateResult<Self> {
        let table = table.into();
        validate_table_name(&table)?;
        self.table = table;
        Ok(self)
    }

    /// Choose whether body and record share one transaction.
    pub fn transactional(mut self, transactional: bool) -> Self {
        self.transactional = transactional;
        self
    }

    /// Get the bookkeeping table name.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Whether body and record share one transaction.
    pub fn is_transactional(&self) -> bool {
        self.transactional
    }

    /// Get the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn create_table_sql(&self) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {} (id SERIAL, name TEXT NOT NULL, applied_at TIMESTAMP WITH TIME ZONE NOT NULL)",
            self.table
        )
    }

    fn create_index_sql(&self) -> String {
        format!(
            "CREATE UNIQUE INDEX idx_{table}_name ON {table} (name)",
            table = self.table
        )
    }

    fn has_applied_sql(&self) -> String {
        format!("SELECT COUNT(1) FROM {} WHERE name = $1", self.table)
    }

    fn insert_sql(&self) -> String {
        format!(
            "INSERT INTO {} (name, applied_at) VALUES ($1, CURRENT_TIMESTAMP)",
            self.table
        )
    }
}

#[async_trait]
impl MigrationStore for PgMigrationStore {
    async fn ensure_bookkeeping(&self) -> MigrateResult<()> {
        let conn = self.pool.get().await.map_err(MigrationError::bookkeeping)?;

        conn.batch_execute(&self.create_table_sql())
            .await
            .map_err(MigrationError::bookkeeping)?;

        match conn.batch_execute(&self.create_index_sql()).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_already_exists() => {
                debug!(table = %self.table, "Migrations index already exists");
                Ok(())
            }
            Err(e) => Err(MigrationError::bookkeeping(e)),
        }
    }

    async fn has_applied(&self, name: &str) -> MigrateResult<bool> {
        let conn = self
            .pool
            .get()
            .await
            .map_err(|e| MigrationError::query(name, e))?;

        let row = conn
            .query_one(&self.has_applied_sql(), &[&name])
            .await
            .map_err(|e| MigrationError::query(name, e))?;
        let count: i64 = row.try_get(0).map_err(|e| MigrationError::query(name, e))?;

        Ok(count > 0)
    }

    async fn apply(&self, name: &str, body: &str) -> MigrateResult<()> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| MigrationError::execution(name, e))?;
        let insert = self.insert_sql();

        if !self.transactional {
            conn.batch_execute(body)
                .await
                .map_err(|e| MigrationError::execution(name, e))?;
            conn.execute(&insert, &[&name])
                .await
                .map_err(|e| record_error(name, e))?;
            return Ok(());
        }

        let txn = conn
            .transaction()
            .await
            .map_err(|e| MigrationError::execution(name, e))?;

        // Dropping `txn` on an early return rolls everything back.
        txn.batch_execute(body)
            .await
            .map_err(|e| MigrationError::execution(name, e))?;
        txn.execute(&insert, &[&name])
            .await
            .map_err(|e| record_error(name, e))?;
        txn.commit()
            .await
            .map_err(|e| MigrationError::record(name, e))
    }
}

/// A duplicate name in the unique index means another runner recorded the
/// same migration first.
fn record_error(name: &str, err: PgError) -> MigrationError {
    if err.is_unique_violation() {
        MigrationError::record(name, format!("already recorded by a concurrent run: {err}"))
    } else {
        MigrationError::record(name, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> PgMigrationStore {
        let pool = PgPool::from_url("postgresql://localhost/app").unwrap();
        PgMigrationStore::new(pool)
    }

    #[test]
    fn test_defaults() {
        let store = store();
        assert_eq!(store.table(), "migrations");
        assert!(store.is_transactional());
        assert!(!store.transactional(false).is_transactional());
    }

    #[test]
    fn test_bookkeeping_sql() {
        let store = store();
        assert_eq!(
            store.create_table_sql(),
            "CREATE TABLE IF NOT EXISTS migrations (id SERIAL, name TEXT NOT NULL, applied_at TIMESTAMP WITH TIME ZONE NOT NULL)"
        );
        assert_eq!(
            store.create_index_sql(),
            "CREATE UNIQUE INDEX idx_migrations_name ON migrations (name)"
        );
    }

    #[test]
    fn test_record_sql_uses_parameters() {
        let store = store().with_table("schema_history").unwrap();
        assert_eq!(
            store.has_applied_sql(),
            "SELECT COUNT(1) FROM schema_history WHERE name = $1"
        );
        assert_eq!(
            store.insert_sql(),
            "INSERT INTO schema_history (name, applied_at) VALUES ($1, CURRENT_TIMESTAMP)"
        );
    }

    #[test]
    fn test_with_table_rejects_unsafe_names() {
        let err = store().with_table("migrations; DROP TABLE users").unwrap_err();
        assert!(matches!(err, MigrationError::Config(_)));
    }

    #[test]
    fn test_record_error_keeps_message() {
        let err = record_error("001_init.sql", PgError::config("pool closed"));
        assert!(matches!(
            err,
            MigrationError::Record { ref name, ref message }
                if name == "001_init.sql" && message == "configuration error: pool closed"
        ));
    }
}
