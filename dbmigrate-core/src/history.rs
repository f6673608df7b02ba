//! Migration history tracking.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{MigrateResult, MigrationError};

/// Default name of the bookkeeping table / column family.
pub const DEFAULT_TABLE: &str = "migrations";

/// A record of an applied migration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationRecord {
    /// Migration file name, extension included.
    pub name: String,
    /// When the migration was applied.
    pub applied_at: DateTime<Utc>,
}

impl MigrationRecord {
    /// Create a record stamped with the current time.
    pub fn now(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            applied_at: Utc::now(),
        }
    }
}

/// A backing store migrations can be applied to.
///
/// Implementations wrap one concrete database technology. The runner only
/// ever calls these three operations, sequentially.
#[async_trait::async_trait]
pub trait MigrationStore: Send + Sync {
    /// Create the bookkeeping structure if it does not exist yet.
    ///
    /// Must be idempotent: "already exists" is success.
    async fn ensure_bookkeeping(&self) -> MigrateResult<()>;

    /// Check whether a record exists for `name`.
    async fn has_applied(&self, name: &str) -> MigrateResult<bool>;

    /// Execute `body`, then record `name` as applied.
    ///
    /// No record may be written if the body fails.
    async fn apply(&self, name: &str, body: &str) -> MigrateResult<()>;
}

#[async_trait::async_trait]
impl<S: MigrationStore + ?Sized> MigrationStore for &S {
    async fn ensure_bookkeeping(&self) -> MigrateResult<()> {
        (**self).ensure_bookkeeping().await
    }

    async fn has_applied(&self, name: &str) -> MigrateResult<bool> {
        (**self).has_applied(name).await
    }

    async fn apply(&self, name: &str, body: &str) -> MigrateResult<()> {
        (**self).apply(name, body).await
    }
}

#[async_trait::async_trait]
impl<S: MigrationStore + ?Sized> MigrationStore for Box<S> {
    async fn ensure_bookkeeping(&self) -> MigrateResult<()> {
        (**self).ensure_bookkeeping().await
    }

    async fn has_applied(&self, name: &str) -> MigrateResult<bool> {
        (**self).has_applied(name).await
    }

    async fn apply(&self, name: &str, body: &str) -> MigrateResult<()> {
        (**self).apply(name, body).await
    }
}

#[async_trait::async_trait]
impl<S: MigrationStore + ?Sized> MigrationStore for Arc<S> {
    async fn ensure_bookkeeping(&self) -> MigrateResult<()> {
        (**self).ensure_bookkeeping().await
    }

    async fn has_applied(&self, name: &str) -> MigrateResult<bool> {
        (**self).has_applied(name).await
    }

    async fn apply(&self, name: &str, body: &str) -> MigrateResult<()> {
        (**self).apply(name, body).await
    }
}

/// Validate a bookkeeping table name.
///
/// Table names are interpolated into DDL, so only `[A-Za-z_][A-Za-z0-9_]*`
/// is accepted.
pub fn validate_table_name(name: &str) -> MigrateResult<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(MigrationError::config(format!(
            "invalid migrations table name '{}'",
            name
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migration_record_now() {
        let before = Utc::now();
        let record = MigrationRecord::now("001_init.sql");

        assert_eq!(record.name, "001_init.sql");
        assert!(record.applied_at >= before);
    }

    #[test]
    fn test_validate_table_name() {
        assert!(validate_table_name(DEFAULT_TABLE).is_ok());
        assert!(validate_table_name("_schema_migrations2").is_ok());

        assert!(validate_table_name("").is_err());
        assert!(validate_table_name("1migrations").is_err());
        assert!(validate_table_name("migrations; DROP TABLE users").is_err());
        assert!(validate_table_name("public.migrations").is_err());
    }
}
