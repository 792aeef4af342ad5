//! SQLite marker store

use chrono::Local;
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use std::path::Path;

use super::MarkerStore;
use crate::error::Result;

/// Markers kept as rows of a single SQLite table
pub struct SqliteMarkerStore {
    conn: Mutex<Connection>,
}

impl SqliteMarkerStore {
    /// Open or create database at path
    pub fn open(path: &Path) -> Result<Self> {
        Self::with_connection(Connection::open(path)?)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<()> {
        self.conn.lock().execute_batch(
            "CREATE TABLE IF NOT EXISTS markers (
                key TEXT PRIMARY KEY,
                created_at TEXT NOT NULL
            );",
        )?;
        Ok(())
    }
}

impl MarkerStore for SqliteMarkerStore {
    fn exists(&self, key: &str) -> Result<bool> {
        let found: bool = self.conn.lock().query_row(
            "SELECT EXISTS(SELECT 1 FROM markers WHERE key = ?1)",
            params![key],
            |row| row.get(0),
        )?;
        Ok(found)
    }

    fn create(&self, key: &str) -> Result<()> {
        self.conn.lock().execute(
            "INSERT OR IGNORE INTO markers (key, created_at) VALUES (?1, ?2)",
            params![key, Local::now().to_rfc3339()],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_insert_is_idempotent() {
        let store = SqliteMarkerStore::open_in_memory().unwrap();
        store.create("a").unwrap();
        store.create("a").unwrap();

        let rows: i64 = store
            .conn
            .lock()
            .query_row("SELECT COUNT(*) FROM markers", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
        assert!(store.exists("a").unwrap());
        assert!(!store.exists("b").unwrap());
    }

    #[test]
    fn test_markers_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("markers.sqlite");

        SqliteMarkerStore::open(&path).unwrap().create("persisted").unwrap();

        let reopened = SqliteMarkerStore::open(&path).unwrap();
        assert!(reopened.exists("persisted").unwrap());
    }
}
