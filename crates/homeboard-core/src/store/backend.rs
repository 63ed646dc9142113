//! Durable record storage behind the store registry.
//!
//! Each store is persisted as one opaque JSON document under a namespaced
//! key. Backends never see partial values.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use rusqlite::{params, Connection};

use super::data_dir;
use crate::error::PersistError;

/// Where serialized store values live between sessions.
pub trait StoreBackend {
    /// Read the raw record for `key`, or `None` if it was never written.
    fn read(&self, key: &str) -> Result<Option<String>, PersistError>;

    /// Replace the raw record for `key`.
    fn write(&mut self, key: &str, value: &str) -> Result<(), PersistError>;
}

/// In-process backend.
///
/// Clones share the same records, so a test can hand one clone to a
/// registry and keep another to inspect what was written or to build a
/// second registry that "reloads" the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    records: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw record for `key`, as last written.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.records.borrow().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }
}

impl StoreBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>, PersistError> {
        Ok(self.raw(key))
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        self.records
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// SQLite key-value backend.
///
/// Stores records in a single `kv` table at `~/.config/homeboard/homeboard.db`.
pub struct SqliteBackend {
    conn: Connection,
}

impl SqliteBackend {
    /// Open the database in the data directory.
    ///
    /// # Errors
    /// Returns an error if the data directory is unavailable or the database
    /// cannot be opened or migrated.
    pub fn open() -> Result<Self, PersistError> {
        let path = data_dir()?.join("homeboard.db");
        Self::open_at(path)
    }

    /// Open (or create) the database at an explicit path.
    pub fn open_at(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| PersistError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let backend = Self { conn };
        backend.migrate()?;
        Ok(backend)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, PersistError> {
        let conn = Connection::open_in_memory()?;
        let backend = Self { conn };
        backend.migrate()?;
        Ok(backend)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }
}

impl StoreBackend for SqliteBackend {
    fn read(&self, key: &str) -> Result<Option<String>, PersistError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_clones_share_records() {
        let backend = MemoryBackend::new();
        let mut writer = backend.clone();
        writer.write("homeboard.timer", "{}").unwrap();
        assert_eq!(backend.raw("homeboard.timer").as_deref(), Some("{}"));
        assert_eq!(backend.len(), 1);
    }

    #[test]
    fn sqlite_kv_roundtrip() {
        let mut backend = SqliteBackend::open_memory().unwrap();
        assert!(backend.read("homeboard.work").unwrap().is_none());
        backend.write("homeboard.work", r#"{"items":[]}"#).unwrap();
        assert_eq!(
            backend.read("homeboard.work").unwrap().as_deref(),
            Some(r#"{"items":[]}"#)
        );
    }

    #[test]
    fn sqlite_write_replaces_whole_record() {
        let mut backend = SqliteBackend::open_memory().unwrap();
        backend.write("k", "first").unwrap();
        backend.write("k", "second").unwrap();
        assert_eq!(backend.read("k").unwrap().as_deref(), Some("second"));
    }
}
