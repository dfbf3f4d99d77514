//! Local key-value persistence
//!
//! Everything animetrack keeps on disk (watchlist, settings, API response cache)
//! goes through the [`LocalStore`] trait. Every operation may fail; callers decide
//! whether a failure is fatal (watchlist writes) or best-effort (cache writes).

pub mod memory;
pub mod sqlite;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::StoreError;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

pub type Result<T> = std::result::Result<T, StoreError>;

/// Default storage quota, matching what browsers give a single origin.
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// String-keyed persistent storage.
pub trait LocalStore: Send + Sync {
    /// Read a value
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a value, returning whether it existed
    fn remove(&self, key: &str) -> Result<bool>;

    /// All keys starting with `prefix`
    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>>;

    /// Bytes currently counted against the quota (keys plus values)
    fn usage(&self) -> Result<usize>;

    /// Where the data lives, if it lives on disk
    fn location(&self) -> Option<PathBuf> {
        None
    }
}

/// Get the data directory path (~/.local/share/animetrack on Linux)
pub fn data_dir() -> Result<PathBuf> {
    let base = dirs::data_dir().ok_or(StoreError::NoDataDir)?;
    Ok(base.join("animetrack"))
}

/// Open the SQLite store in `dir`, falling back to memory if that fails.
///
/// The fallback keeps read-only commands and API lookups working when the
/// data directory is unwritable; nothing written in that mode survives exit.
pub fn open_or_memory(dir: &Path, quota_bytes: usize) -> Arc<dyn LocalStore> {
    match SqliteStore::open_at(dir, quota_bytes) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            log::warn!(
                "Could not open store at {} ({}), using in-memory storage",
                dir.display(),
                e
            );
            Arc::new(MemoryStore::with_quota(quota_bytes))
        }
    }
}
