//! Migration file discovery.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{MigrateResult, MigrationError};

/// Extensions recognized as migration files by default.
pub const DEFAULT_EXTENSIONS: &[&str] = &["sql", "cql"];

/// A migration file read from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationFile {
    /// File name including extension. This is the migration's identity.
    pub name: String,
    /// Full path to the file.
    pub path: PathBuf,
    /// File content.
    pub body: String,
}

impl MigrationFile {
    /// Whether the file has no content at all.
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Lists and reads migration files in a single directory.
#[derive(Debug, Clone)]
pub struct MigrationFileManager {
    migrations_dir: PathBuf,
    extensions: Vec<String>,
}

impl MigrationFileManager {
    /// Create a file manager recognizing the default extensions.
    pub fn new(migrations_dir: impl Into<PathBuf>) -> Self {
        Self {
            migrations_dir: migrations_dir.into(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }

    /// Replace the recognized extensions (without leading dot).
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.into().trim_start_matches('.').to_string())
            .collect();
        self
    }

    /// Get the migrations directory.
    pub fn migrations_dir(&self) -> &Path {
        &self.migrations_dir
    }

    /// Get the recognized extensions.
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// List migration file names, sorted byte-wise.
    ///
    /// Only top-level regular files with a recognized extension are returned.
    pub async fn list_names(&self) -> MigrateResult<Vec<String>> {
        let dir = &self.migrations_dir;
        let mut entries = tokio::fs::read_dir(dir)
            .await
            .map_err(|e| MigrationError::io(dir, e))?;

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| MigrationError::io(dir, e))?
        {
            let path = entry.path();

            let Some(name) = entry.file_name().to_str().map(String::from) else {
                warn!(path = %path.display(), "Ignoring non UTF-8 file name");
                continue;
            };

            if !self.has_migration_extension(&name) {
                continue;
            }

            // Follows symlinks; broken links and directories are not migrations.
            match tokio::fs::metadata(&path).await {
                Ok(meta) if meta.is_file() => names.push(name),
                Ok(_) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(MigrationError::io(path, e)),
            }
        }

        names.sort();
        Ok(names)
    }

    /// Read a migration file by name.
    pub async fn read(&self, name: &str) -> MigrateResult<MigrationFile> {
        let path = self.migrations_dir.join(name);
        let body = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| MigrationError::io(&path, e))?;

        Ok(MigrationFile {
            name: name.to_string(),
            path,
            body,
        })
    }

    /// The extension is everything after the last `.`, so a file named just
    /// `.sql` is a migration.
    fn has_migration_extension(&self, name: &str) -> bool {
        name.rsplit_once('.')
            .is_some_and(|(_, ext)| self.extensions.iter().any(|e| e == ext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn write(dir: &Path, name: &str, content: &str) {
        std::fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn test_has_migration_extension() {
        let manager = MigrationFileManager::new("migrations");
        assert!(manager.has_migration_extension("001_init.sql"));
        assert!(manager.has_migration_extension("002_keyspace.cql"));
        assert!(!manager.has_migration_extension("README.md"));
        assert!(!manager.has_migration_extension("001_init.SQL"));
        assert!(!manager.has_migration_extension("sql"));
        assert!(!manager.has_migration_extension(".sql.bak"));
        assert!(manager.has_migration_extension(".sql"));
        assert!(manager.has_migration_extension("001.init.cql"));
    }

    #[test]
    fn test_with_extensions_strips_dot() {
        let manager = MigrationFileManager::new("migrations").with_extensions([".sql"]);
        assert_eq!(manager.extensions(), &["sql".to_string()]);
        assert!(!manager.has_migration_extension("002_keyspace.cql"));
    }

    #[tokio::test]
    async fn test_list_names_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "010_later.sql", "SELECT 1;");
        write(dir.path(), "002_b.cql", "SELECT now() FROM system.local;");
        write(dir.path(), "001_a.sql", "SELECT 1;");
        write(dir.path(), "notes.txt", "not a migration");
        write(dir.path(), "README.md", "# docs");
        std::fs::create_dir(dir.path().join("003_dir.sql")).unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        write(&dir.path().join("nested"), "000_hidden.sql", "SELECT 1;");

        let manager = MigrationFileManager::new(dir.path());
        let names = manager.list_names().await.unwrap();

        assert_eq!(names, vec!["001_a.sql", "002_b.cql", "010_later.sql"]);
    }

    #[tokio::test]
    async fn test_list_names_is_bytewise() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "10_ten.sql", "");
        write(dir.path(), "9_nine.sql", "");
        write(dir.path(), "A_upper.sql", "");
        write(dir.path(), "a_lower.sql", "");

        let names = MigrationFileManager::new(dir.path())
            .list_names()
            .await
            .unwrap();

        assert_eq!(
            names,
            vec!["10_ten.sql", "9_nine.sql", "A_upper.sql", "a_lower.sql"]
        );
    }

    #[tokio::test]
    async fn test_list_names_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");

        let err = MigrationFileManager::new(&missing)
            .list_names()
            .await
            .unwrap_err();

        assert!(matches!(err, MigrationError::Io { ref path, .. } if *path == missing));
    }

    #[tokio::test]
    async fn test_read() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "001_init.sql", "CREATE TABLE t(id int)");

        let file = MigrationFileManager::new(dir.path())
            .read("001_init.sql")
            .await
            .unwrap();

        assert_eq!(file.name, "001_init.sql");
        assert_eq!(file.body, "CREATE TABLE t(id int)");
        assert_eq!(file.path, dir.path().join("001_init.sql"));
        assert!(!file.is_empty());
    }

    #[tokio::test]
    async fn test_read_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("001_bin.sql"), [0xff, 0xfe, 0x00]).unwrap();

        let err = MigrationFileManager::new(dir.path())
            .read("001_bin.sql")
            .await
            .unwrap_err();

        assert!(matches!(err, MigrationError::Io { .. }));
    }

    #[tokio::test]
    async fn test_list_names_includes_bare_extension() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), ".sql", "SELECT 1;");
        write(dir.path(), "001_a.sql", "SELECT 1;");

        let names = MigrationFileManager::new(dir.path())
            .list_names()
            .await
            .unwrap();

        assert_eq!(names, vec![".sql", "001_a.sql"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_list_names_skips_non_utf8_names() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "001_a.sql", "SELECT 1;");
        std::fs::write(dir.path().join(OsStr::from_bytes(b"002_\xff.sql")), "SELECT 2;").unwrap();
        write(dir.path(), "003_c.sql", "SELECT 3;");

        let names = MigrationFileManager::new(dir.path())
            .list_names()
            .await
            .unwrap();

        assert_eq!(names, vec!["001_a.sql", "003_c.sql"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_list_names_follows_symlinks() {
        use std::os::unix::fs::symlink;

        let dir = tempfile::tempdir().unwrap();
        let shared = tempfile::tempdir().unwrap();
        write(shared.path(), "seed.sql", "INSERT INTO t VALUES (1);");
        write(dir.path(), "001_a.sql", "SELECT 1;");
        symlink(shared.path().join("seed.sql"), dir.path().join("002_link.sql")).unwrap();
        symlink(dir.path().join("missing.sql"), dir.path().join("003_broken.sql")).unwrap();
        symlink(shared.path(), dir.path().join("004_dir_link.sql")).unwrap();

        let manager = MigrationFileManager::new(dir.path());
        let names = manager.list_names().await.unwrap();
        assert_eq!(names, vec!["001_a.sql", "002_link.sql"]);

        let file = manager.read("002_link.sql").await.unwrap();
        assert_eq!(file.body, "INSERT INTO t VALUES (1);");
    }
}
