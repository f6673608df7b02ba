//! In-process migration store.
//!
//! Keeps records and the executed bodies in memory. Useful for tests, for
//! embedding the runner in tools that manage their own persistence, and for
//! checking a migrations directory without a database.

use parking_lot::Mutex;

use crate::error::{MigrateResult, MigrationError};
use crate::history::{MigrationRecord, MigrationStore};

/// A [`MigrationStore`] backed by process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
    bookkeeping: bool,
    records: Vec<MigrationRecord>,
    executed: Vec<(String, String)>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds records for `names`.
    pub fn with_applied<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let store = Self::new();
        {
            let mut state = store.state.lock();
            state.bookkeeping = true;
            state.records = names.into_iter().map(MigrationRecord::now).collect();
        }
        store
    }

    /// Whether the bookkeeping structure was created.
    pub fn has_bookkeeping(&self) -> bool {
        self.state.lock().bookkeeping
    }

    /// All records, in insertion order.
    pub fn records(&self) -> Vec<MigrationRecord> {
        self.state.lock().records.clone()
    }

    /// Names of applied migrations, in insertion order.
    pub fn applied_names(&self) -> Vec<String> {
        self.state
            .lock()
            .records
            .iter()
            .map(|r| r.name.clone())
            .collect()
    }

    /// `(name, body)` pairs in the order they were executed.
    pub fn executed(&self) -> Vec<(String, String)> {
        self.state.lock().executed.clone()
    }
}

#[async_trait::async_trait]
impl MigrationStore for MemoryStore {
    async fn ensure_bookkeeping(&self) -> MigrateResult<()> {
        self.state.lock().bookkeeping = true;
        Ok(())
    }

    async fn has_applied(&self, name: &str) -> MigrateResult<bool> {
        let state = self.state.lock();
        if !state.bookkeeping {
            return Err(MigrationError::query(name, "migrations table does not exist"));
        }
        Ok(state.records.iter().any(|r| r.name == name))
    }

    async fn apply(&self, name: &str, body: &str) -> MigrateResult<()> {
        let mut state = self.state.lock();
        if !state.bookkeeping {
            return Err(MigrationError::record(name, "migrations table does not exist"));
        }
        state.executed.push((name.to_string(), body.to_string()));
        if state.records.iter().any(|r| r.name == name) {
            return Err(MigrationError::record(
                name,
                format!("duplicate migration record '{}'", name),
            ));
        }
        state.records.push(MigrationRecord::now(name));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_requires_bookkeeping() {
        let store = MemoryStore::new();
        assert!(store.has_applied("001_init.sql").await.is_err());

        store.ensure_bookkeeping().await.unwrap();
        store.ensure_bookkeeping().await.unwrap();
        assert!(store.has_bookkeeping());
        assert!(!store.has_applied("001_init.sql").await.unwrap());
    }

    #[tokio::test]
    async fn test_apply_records() {
        let store = MemoryStore::new();
        store.ensure_bookkeeping().await.unwrap();
        store
            .apply("001_init.sql", "CREATE TABLE t(id int)")
            .await
            .unwrap();

        assert!(store.has_applied("001_init.sql").await.unwrap());
        assert_eq!(store.applied_names(), vec!["001_init.sql"]);
        assert_eq!(
            store.executed(),
            vec![("001_init.sql".to_string(), "CREATE TABLE t(id int)".to_string())]
        );
    }

    #[tokio::test]
    async fn test_duplicate_record_is_rejected() {
        let store = MemoryStore::with_applied(["001_init.sql"]);

        let err = store.apply("001_init.sql", "SELECT 1").await.unwrap_err();

        assert!(err.is_inconsistent());
        assert_eq!(store.records().len(), 1);
    }
}
