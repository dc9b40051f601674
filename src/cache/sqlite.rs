//! `SQLite`-backed result cache: the preferred, durable, cross-process
//! store for validation results.
//!
//! Schema is a single table keyed by `(namespace, key)`; `WAL` mode is
//! enabled for concurrent readers. Every public method returns a
//! `rusqlite::Result` internally and is converted to the silent,
//! `Option`-returning [`crate::cache::ResultCache`] contract one layer up
//! in [`super::LayeredResultCache`] — this type itself never hides a
//! backend failure from its caller.

use std::path::Path;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{CacheError, Result};

const SCHEMA_SQL: &str = r"
CREATE TABLE IF NOT EXISTS cache_entries (
    namespace TEXT NOT NULL,
    key TEXT NOT NULL,
    value BLOB NOT NULL,
    expires_at INTEGER NOT NULL,
    PRIMARY KEY (namespace, key)
);
CREATE INDEX IF NOT EXISTS idx_cache_entries_expires_at ON cache_entries(expires_at);
";

fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

/// Durable result cache backed by a `SQLite` database file.
pub struct SqliteResultCache {
    conn: Mutex<Connection>,
}

impl SqliteResultCache {
    /// Opens or creates the cache database at `path`, creating the
    /// parent directory and schema if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or the schema
    /// cannot be created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute("PRAGMA foreign_keys = ON;", [])?;
        let _: String = conn.query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))?;
        conn.execute_batch(SCHEMA_SQL)?;

        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Opens an in-memory database, used in tests to exercise the
    /// `SQLite` code path without touching the filesystem.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be created.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Looks up a live entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying query fails.
    pub fn try_get(&self, namespace: &str, key: &str) -> Result<Option<Vec<u8>>> {
        let conn = self.conn.lock().map_err(|_| CacheError::Backend("poisoned lock".to_string()))?;
        let row: Option<(Vec<u8>, i64)> = conn
            .query_row(
                "SELECT value, expires_at FROM cache_entries WHERE namespace = ?1 AND key = ?2",
                params![namespace, key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match row {
            Some((value, expires_at)) if expires_at > now_unix() => Ok(Some(value)),
            Some(_) => {
                conn.execute(
                    "DELETE FROM cache_entries WHERE namespace = ?1 AND key = ?2",
                    params![namespace, key],
                )?;
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Inserts or replaces an entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying write fails.
    pub fn try_set(&self, namespace: &str, key: &str, value: &[u8], ttl_s: u64) -> Result<()> {
        let conn = self.conn.lock().map_err(|_| CacheError::Backend("poisoned lock".to_string()))?;
        let expires_at = now_unix() + i64::try_from(ttl_s).unwrap_or(i64::MAX);
        conn.execute(
            "INSERT OR REPLACE INTO cache_entries (namespace, key, value, expires_at) VALUES (?1, ?2, ?3, ?4)",
            params![namespace, key, value, expires_at],
        )?;
        Ok(())
    }

    /// Deletes every entry, or only those in `namespace` when given.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying delete fails.
    pub fn try_clear(&self, namespace: Option<&str>) -> Result<()> {
        let conn = self.conn.lock().map_err(|_| CacheError::Backend("poisoned lock".to_string()))?;
        match namespace {
            Some(ns) => {
                conn.execute("DELETE FROM cache_entries WHERE namespace = ?1", params![ns])?;
            }
            None => {
                conn.execute("DELETE FROM cache_entries", [])?;
            }
        }
        Ok(())
    }

    /// Counts live (non-expired) entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying query fails.
    pub fn try_count(&self) -> Result<usize> {
        let conn = self.conn.lock().map_err(|_| CacheError::Backend("poisoned lock".to_string()))?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM cache_entries WHERE expires_at > ?1",
            params![now_unix()],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_get() {
        let cache = SqliteResultCache::in_memory().unwrap();
        cache.try_set("validation", "fp1", b"result", 3600).unwrap();
        assert_eq!(cache.try_get("validation", "fp1").unwrap(), Some(b"result".to_vec()));
    }

    #[test]
    fn test_expired_entry_is_deleted_on_read() {
        let cache = SqliteResultCache::in_memory().unwrap();
        cache.try_set("validation", "fp1", b"result", 0).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(1100));
        assert_eq!(cache.try_get("validation", "fp1").unwrap(), None);
        assert_eq!(cache.try_count().unwrap(), 0);
    }

    #[test]
    fn test_clear_namespace() {
        let cache = SqliteResultCache::in_memory().unwrap();
        cache.try_set("validation", "fp1", b"v", 3600).unwrap();
        cache.try_set("synthesis", "fp1", b"s", 3600).unwrap();
        cache.try_clear(Some("validation")).unwrap();
        assert_eq!(cache.try_get("validation", "fp1").unwrap(), None);
        assert_eq!(cache.try_get("synthesis", "fp1").unwrap(), Some(b"s".to_vec()));
    }

    #[test]
    fn test_insert_or_replace_overwrites() {
        let cache = SqliteResultCache::in_memory().unwrap();
        cache.try_set("validation", "fp1", b"one", 3600).unwrap();
        cache.try_set("validation", "fp1", b"two", 3600).unwrap();
        assert_eq!(cache.try_get("validation", "fp1").unwrap(), Some(b"two".to_vec()));
    }
}
