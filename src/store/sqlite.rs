//! SQLite-backed key-value store with a byte quota

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use super::{LocalStore, Result};
use crate::error::StoreError;

/// Schema version - increment to trigger nuke-and-rebuild
const SCHEMA_VERSION: i32 = 1;

const DB_FILE: &str = "store.db";

/// Persistent store in a single SQLite file.
///
/// Writes that would push the total stored bytes (keys plus values) past the
/// quota fail with [`StoreError::QuotaExceeded`], the same way browser storage
/// refuses writes once an origin is full.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    db_path: PathBuf,
    quota_bytes: usize,
}

impl SqliteStore {
    /// Open or create the store inside `dir`
    pub fn open_at(dir: &Path, quota_bytes: usize) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .map_err(|e| StoreError::Io(format!("Failed to create data dir: {}", e)))?;

        let db_path = dir.join(DB_FILE);
        let conn = Connection::open(&db_path)?;

        // Check schema version - nuke if mismatched
        let version: i32 = conn
            .pragma_query_value(None, "user_version", |r| r.get(0))
            .unwrap_or(0);

        if version != 0 && version != SCHEMA_VERSION {
            log::info!(
                "Store schema version mismatch ({} != {}), rebuilding",
                version,
                SCHEMA_VERSION
            );
            drop(conn);
            std::fs::remove_file(&db_path)
                .map_err(|e| StoreError::Io(format!("Failed to remove store DB: {}", e)))?;
            return Self::open_at(dir, quota_bytes);
        }

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv_entries (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL,
                size_bytes INTEGER NOT NULL
            );
            "#,
        )?;

        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;

        Ok(Self {
            conn: Mutex::new(conn),
            db_path,
            quota_bytes,
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Backend("store lock poisoned".to_string()))
    }
}

impl LocalStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.lock()?;
        let value = conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.lock()?;
        let size = key.len() + value.len();

        let used_elsewhere: i64 = conn.query_row(
            "SELECT COALESCE(SUM(size_bytes), 0) FROM kv_entries WHERE key != ?1",
            [key],
            |r| r.get(0),
        )?;
        let needed = used_elsewhere as usize + size;
        if needed > self.quota_bytes {
            return Err(StoreError::QuotaExceeded {
                needed,
                quota: self.quota_bytes,
            });
        }

        conn.execute(
            "INSERT OR REPLACE INTO kv_entries (key, value, updated_at, size_bytes)
             VALUES (?1, ?2, ?3, ?4)",
            params![key, value, Utc::now().timestamp(), size],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let conn = self.lock()?;
        let deleted = conn.execute("DELETE FROM kv_entries WHERE key = ?1", [key])?;
        Ok(deleted > 0)
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let conn = self.lock()?;
        // substr avoids LIKE wildcard escaping for prefixes containing '_' or '%'
        let mut stmt = conn.prepare(
            "SELECT key FROM kv_entries WHERE substr(key, 1, ?1) = ?2 ORDER BY key",
        )?;
        let keys = stmt
            .query_map(params![prefix.chars().count() as i64, prefix], |row| {
                row.get(0)
            })?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(keys)
    }

    fn usage(&self) -> Result<usize> {
        let conn = self.lock()?;
        let used: i64 = conn.query_row(
            "SELECT COALESCE(SUM(size_bytes), 0) FROM kv_entries",
            [],
            |r| r.get(0),
        )?;
        Ok(used as usize)
    }

    fn location(&self) -> Option<PathBuf> {
        Some(self.db_path.clone())
    }
}
