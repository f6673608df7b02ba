//! ScyllaDB migration store.

use async_trait::async_trait;
use dbmigrate_core::{
    DEFAULT_TABLE, MigrateResult, MigrationError, MigrationStore, validate_table_name,
};
use scylla::frame::response::result::CqlValue;
use tracing::debug;

use crate::connection::ScyllaConnection;
use crate::error::{ScyllaError, ScyllaResult};
use crate::statements::split_statements;

/// Applies CQL migrations and tracks them in a table.
///
/// Bookkeeping layout:
///
/// ```cql
/// CREATE TABLE migrations (name TEXT, applied_at TIMESTAMP, PRIMARY KEY (name));
/// ```
///
/// Reads go through the reader session and writes through the writer
/// session, which lets the two use different consistency levels. There are
/// no transactions: if the record insert fails after the body ran, the
/// database is left migrated but unrecorded and the run reports a
/// [`MigrationError::Record`].
#[derive(Debug, Clone)]
pub struct ScyllaMigrationStore {
    reader: ScyllaConnection,
    writer: ScyllaConnection,
    table: String,
}

impl ScyllaMigrationStore {
    /// Create a store with separate reader and writer sessions.
    #[must_use]
    pub fn new(reader: ScyllaConnection, writer: ScyllaConnection) -> Self {
        Self {
            reader,
            writer,
            table: DEFAULT_TABLE.to_string(),
        }
    }

    /// Create a store that reads and writes through one session.
    #[must_use]
    pub fn from_connection(connection: ScyllaConnection) -> Self {
        Self::new(connection.clone(), connection)
    }

    /// Use a different bookkeeping table.
    pub fn with_table(mut self, table: impl Into<String>) -> MigrateResult<Self> {
        let table = table.into();
        validate_table_name(&table)?;
        self.table = table;
        Ok(self)
    }

    /// Get the bookkeeping table name.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Get the reader session.
    #[must_use]
    pub fn reader(&self) -> &ScyllaConnection {
        &self.reader
    }

    /// Get the writer session.
    #[must_use]
    pub fn writer(&self) -> &ScyllaConnection {
        &self.writer
    }

    async fn count(&self, name: &str) -> ScyllaResult<i64> {
        let result = self
            .reader
            .execute_with_name(&has_applied_cql(&self.table), name)
            .await?;

        let value = result
            .rows
            .and_then(|rows| rows.into_iter().next())
            .and_then(|row| row.columns.into_iter().next().flatten());

        match value {
            Some(CqlValue::BigInt(count)) => Ok(count),
            Some(CqlValue::Int(count)) => Ok(i64::from(count)),
            other => Err(ScyllaError::unexpected(format!(
                "expected a count, got {other:?}"
            ))),
        }
    }
}

fn create_table_cql(table: &str) -> String {
    format!("CREATE TABLE {table} (name TEXT, applied_at TIMESTAMP, PRIMARY KEY (name))")
}

fn has_applied_cql(table: &str) -> String {
    format!("SELECT COUNT(*) FROM {table} WHERE name = ?")
}

fn insert_cql(table: &str) -> String {
    format!("INSERT INTO {table} (name, applied_at) VALUES (?, toTimestamp(now()))")
}

/// Split a migration body, refusing bodies that hold no statement at all.
///
/// A record must only exist once something was executed, so a body made of
/// comments alone fails instead of being recorded as applied.
fn statements_for(name: &str, body: &str) -> MigrateResult<Vec<String>> {
    let statements = split_statements(body);
    if statements.is_empty() {
        return Err(MigrationError::execution(
            name,
            "the file holds no CQL statement, only comments or whitespace",
        ));
    }
    Ok(statements)
}

#[async_trait]
impl MigrationStore for ScyllaMigrationStore {
    async fn ensure_bookkeeping(&self) -> MigrateResult<()> {
        match self.writer.execute(&create_table_cql(&self.table)).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_already_exists() => {
                debug!(table = %self.table, "Migrations table already exists");
                Ok(())
            }
            Err(e) => Err(MigrationError::bookkeeping(e)),
        }
    }

    async fn has_applied(&self, name: &str) -> MigrateResult<bool> {
        let count = self
            .count(name)
            .await
            .map_err(|e| MigrationError::query(name, e))?;
        Ok(count > 0)
    }

    async fn apply(&self, name: &str, body: &str) -> MigrateResult<()> {
        for statement in statements_for(name, body)? {
            self.writer
                .execute(&statement)
                .await
                .map_err(|e| MigrationError::execution(name, e))?;
        }

        self.writer
            .execute_with_name(&insert_cql(&self.table), name)
            .await
            .map_err(|e| MigrationError::record(name, e))?;

        Ok(())
    }
}
