//! Key-value blob storage.
//!
//! The domain stores persist their state as opaque serialized records in
//! a key-value store. The production backend is a SQLite `kv` table; an
//! in-memory backend exists for tests and embedding without a disk.
//!
//! All operations are synchronous and best-effort: the owning stores
//! treat a failed write as non-fatal (the in-memory mutation stands) and
//! a missing or unreadable record as "no data".

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::StorageError;

use super::data_dir;

/// Synchronous key-value blob store.
pub trait KeyValueStore: Send + Sync {
    /// Fetch the record for `key`, or `None` if absent or unreadable.
    fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Write the record for `key`.
    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError>;

    /// Remove the record for `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// SQLite-backed key-value store.
///
/// A single `kv` table at `~/.config/ritual/ritual.db`.
pub struct SqliteKvStore {
    conn: Mutex<Connection>,
}

impl SqliteKvStore {
    /// Open the store at `~/.config/ritual/ritual.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StorageError> {
        let path = data_dir()?.join("ritual.db");
        Self::open_at(&path)
    }

    /// Open the store at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|e| StorageError::OpenFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.migrate().map_err(|e| StorageError::OpenFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(store)
    }

    /// Open an in-memory database (for tests).
    #[cfg(test)]
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(|e| StorageError::OpenFailed {
            path: ":memory:".to_string(),
            message: e.to_string(),
        })?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.migrate().map_err(|e| StorageError::OpenFailed {
            path: ":memory:".to_string(),
            message: e.to_string(),
        })?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        let conn = self.conn.lock().expect("kv connection poisoned");
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value BLOB NOT NULL
            );",
        )
    }
}

impl KeyValueStore for SqliteKvStore {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        let conn = self.conn.lock().expect("kv connection poisoned");
        conn.query_row(
            "SELECT value FROM kv WHERE key = ?1",
            params![key],
            |row| row.get::<_, Vec<u8>>(0),
        )
        .optional()
        .ok()
        .flatten()
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        let conn = self.conn.lock().expect("kv connection poisoned");
        conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )
        .map_err(|e| StorageError::WriteFailed {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let conn = self.conn.lock().expect("kv connection poisoned");
        conn.execute("DELETE FROM kv WHERE key = ?1", params![key])
            .map_err(|e| StorageError::WriteFailed {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }
}

/// In-memory key-value store for tests and fakes.
#[derive(Default)]
pub struct MemoryKvStore {
    records: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKvStore {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.records
            .lock()
            .expect("kv map poisoned")
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        self.records
            .lock()
            .expect("kv map poisoned")
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.records.lock().expect("kv map poisoned").remove(key);
        Ok(())
    }
}
