//! TTL response cache layered over the local store
//!
//! Each entry is a JSON envelope `{"stored_at": <ms>, "payload": ...}` stored
//! under its fingerprint. Freshness is decided on read; nothing is trusted to
//! have been cleaned up in advance.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::key::CACHE_PREFIX;
use crate::clock::Clock;
use crate::store::{LocalStore, Result};

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    stored_at: i64,
    payload: Value,
}

/// A cached payload returned regardless of freshness.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedResponse {
    pub payload: Value,
    /// Milliseconds since the Unix epoch
    pub stored_at: i64,
}

/// Result of a non-destructive cache lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Fresh(CachedResponse),
    /// Past its TTL but kept for the offline fallback
    Expired(CachedResponse),
    Missing,
}

/// What happened to a cache write.
///
/// Writes never fail from the caller's point of view; this records how much
/// effort it took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Written on the first try
    Stored,
    /// Written after sweeping every cache entry to make room
    Degraded { swept: usize },
    /// Could not be written even after sweeping
    Dropped,
}

/// Statistics about cache state
#[derive(Debug, Default, PartialEq)]
pub struct CacheStats {
    pub total_entries: usize,
    pub valid_entries: usize,
    pub expired_entries: usize,
    pub total_size_bytes: usize,
    pub oldest_entry: Option<i64>,
    pub newest_entry: Option<i64>,
}

/// Response cache with a single TTL for every entry.
#[derive(Clone)]
pub struct ResponseCache {
    store: Arc<dyn LocalStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl ResponseCache {
    pub fn new(store: Arc<dyn LocalStore>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self { store, clock, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn is_fresh(&self, entry: &CacheEntry, now: i64) -> bool {
        now - entry.stored_at < self.ttl.as_millis() as i64
    }

    /// Read and decode an entry; undecodable entries are removed.
    fn read(&self, key: &str) -> Option<CacheEntry> {
        let raw = match self.store.get(key) {
            Ok(raw) => raw?,
            Err(e) => {
                log::debug!("Cache read failed for {}: {}", key, e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::warn!("Discarding corrupt cache entry {}: {}", key, e);
                let _ = self.store.remove(key);
                None
            }
        }
    }

    /// Get the payload if it is still within its TTL.
    ///
    /// An expired entry is removed as a side effect.
    pub fn get(&self, key: &str) -> Option<Value> {
        let entry = self.read(key)?;

        if self.is_fresh(&entry, self.clock.now_millis()) {
            return Some(entry.payload);
        }

        log::debug!("Cache entry expired: {}", key);
        let _ = self.store.remove(key);
        None
    }

    /// Classify an entry by freshness without removing anything.
    ///
    /// The client uses this instead of [`get`](Self::get) so an expired entry
    /// survives until the network has had its chance.
    pub fn lookup(&self, key: &str) -> Lookup {
        match self.read(key) {
            Some(entry) => {
                let fresh = self.is_fresh(&entry, self.clock.now_millis());
                let cached = CachedResponse {
                    payload: entry.payload,
                    stored_at: entry.stored_at,
                };
                if fresh {
                    Lookup::Fresh(cached)
                } else {
                    Lookup::Expired(cached)
                }
            }
            None => Lookup::Missing,
        }
    }

    /// Get the payload at any age. Used for the offline fallback.
    pub fn get_stale(&self, key: &str) -> Option<CachedResponse> {
        self.read(key).map(|entry| CachedResponse {
            payload: entry.payload,
            stored_at: entry.stored_at,
        })
    }

    /// Store a payload stamped with the current time.
    ///
    /// If the store refuses the write, every cache entry is swept and the write
    /// is tried once more before being dropped.
    pub fn set(&self, key: &str, payload: &Value) -> WriteOutcome {
        let entry = CacheEntry {
            stored_at: self.clock.now_millis(),
            payload: payload.clone(),
        };
        let Ok(json) = serde_json::to_string(&entry) else {
            return WriteOutcome::Dropped;
        };

        match self.store.set(key, &json) {
            Ok(()) => WriteOutcome::Stored,
            Err(first) => {
                log::debug!("Cache write failed for {} ({}), sweeping", key, first);
                let swept = self.clear_prefix(CACHE_PREFIX).unwrap_or(0);

                match self.store.set(key, &json) {
                    Ok(()) => WriteOutcome::Degraded { swept },
                    Err(e) => {
                        log::warn!("Dropping cache write for {}: {}", key, e);
                        WriteOutcome::Dropped
                    }
                }
            }
        }
    }

    /// Remove every cache entry whose age has reached the TTL.
    ///
    /// Returns the number removed. Safe to call repeatedly.
    pub fn evict_expired(&self) -> Result<usize> {
        let now = self.clock.now_millis();
        let mut removed = 0;

        for key in self.store.keys_with_prefix(CACHE_PREFIX)? {
            let expired = match self.store.get(&key)? {
                Some(raw) => match serde_json::from_str::<CacheEntry>(&raw) {
                    Ok(entry) => !self.is_fresh(&entry, now),
                    Err(_) => true,
                },
                None => false,
            };

            if expired && self.store.remove(&key)? {
                removed += 1;
            }
        }

        if removed > 0 {
            log::debug!("Evicted {} expired cache entries", removed);
        }
        Ok(removed)
    }

    /// Remove every entry whose key starts with `prefix`.
    pub fn clear_prefix(&self, prefix: &str) -> Result<usize> {
        let mut removed = 0;
        for key in self.store.keys_with_prefix(prefix)? {
            if self.store.remove(&key)? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Get cache statistics
    pub fn stats(&self) -> Result<CacheStats> {
        let now = self.clock.now_millis();
        let mut stats = CacheStats::default();

        for key in self.store.keys_with_prefix(CACHE_PREFIX)? {
            let Some(raw) = self.store.get(&key)? else {
                continue;
            };
            stats.total_entries += 1;
            stats.total_size_bytes += key.len() + raw.len();

            match serde_json::from_str::<CacheEntry>(&raw) {
                Ok(entry) if self.is_fresh(&entry, now) => {
                    stats.valid_entries += 1;
                    stats.oldest_entry = Some(
                        stats
                            .oldest_entry
                            .map_or(entry.stored_at, |t| t.min(entry.stored_at)),
                    );
                    stats.newest_entry = Some(
                        stats
                            .newest_entry
                            .map_or(entry.stored_at, |t| t.max(entry.stored_at)),
                    );
                }
                _ => stats.expired_entries += 1,
            }
        }

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::store::{MemoryStore, SqliteStore};
    use serde_json::json;
    use tempfile::TempDir;

    const TTL: Duration = Duration::from_secs(60 * 60);

    fn test_cache(store: Arc<dyn LocalStore>) -> (ResponseCache, ManualClock) {
        let clock = ManualClock::new(1_700_000_000_000);
        let cache = ResponseCache::new(store, Arc::new(clock.clone()), TTL);
        (cache, clock)
    }

    #[test]
    fn test_set_then_get() {
        let (cache, _clock) = test_cache(Arc::new(MemoryStore::new()));

        assert_eq!(cache.set("anilist_k", &json!({"x": 1})), WriteOutcome::Stored);
        assert_eq!(cache.get("anilist_k"), Some(json!({"x": 1})));
    }

    #[test]
    fn test_get_after_ttl_removes_entry() {
        let store = Arc::new(MemoryStore::new());
        let (cache, clock) = test_cache(store.clone());

        cache.set("anilist_k", &json!({"x": 1}));
        clock.advance(TTL);

        assert_eq!(cache.get("anilist_k"), None);
        assert!(store.get("anilist_k").unwrap().is_none());
    }

    #[test]
    fn test_get_just_before_ttl() {
        let (cache, clock) = test_cache(Arc::new(MemoryStore::new()));

        cache.set("anilist_k", &json!(1));
        clock.advance(TTL - Duration::from_millis(1));

        assert_eq!(cache.get("anilist_k"), Some(json!(1)));
    }

    #[test]
    fn test_get_stale_ignores_ttl() {
        let (cache, clock) = test_cache(Arc::new(MemoryStore::new()));

        cache.set("anilist_k", &json!({"old": true}));
        let stored_at = clock.now_millis();
        clock.advance(TTL * 3);

        let stale = cache.get_stale("anilist_k").unwrap();
        assert_eq!(stale.payload, json!({"old": true}));
        assert_eq!(stale.stored_at, stored_at);
    }

    #[test]
    fn test_lookup_keeps_expired_entry() {
        let store = Arc::new(MemoryStore::new());
        let (cache, clock) = test_cache(store.clone());

        cache.set("anilist_k", &json!(1));
        assert!(matches!(cache.lookup("anilist_k"), Lookup::Fresh(c) if c.payload == json!(1)));

        clock.advance(TTL);
        assert!(matches!(cache.lookup("anilist_k"), Lookup::Expired(_)));
        assert!(store.get("anilist_k").unwrap().is_some());
        assert_eq!(cache.lookup("anilist_missing"), Lookup::Missing);
    }

    #[test]
    fn test_corrupt_entry_is_removed() {
        let store = Arc::new(MemoryStore::new());
        store.set("anilist_bad", "not json").unwrap();
        let (cache, _clock) = test_cache(store.clone());

        assert_eq!(cache.get("anilist_bad"), None);
        assert!(store.get("anilist_bad").unwrap().is_none());
    }

    #[test]
    fn test_set_sweeps_on_quota_and_reports_degraded() {
        let store = Arc::new(MemoryStore::with_quota(300));
        let (cache, _clock) = test_cache(store.clone());
        store.set("watchlist.items", "[]").unwrap();

        // Each entry takes 109 bytes, so the third one does not fit
        assert_eq!(cache.set("anilist_a", &json!("a".repeat(60))), WriteOutcome::Stored);
        assert_eq!(cache.set("anilist_b", &json!("b".repeat(60))), WriteOutcome::Stored);

        let outcome = cache.set("anilist_c", &json!("c".repeat(60)));

        assert_eq!(outcome, WriteOutcome::Degraded { swept: 2 });
        assert!(cache.get("anilist_c").is_some());
        assert!(cache.get("anilist_a").is_none());
        // Only cache entries are swept
        assert_eq!(store.get("watchlist.items").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_set_drops_when_payload_never_fits() {
        let store = Arc::new(MemoryStore::with_quota(64));
        let (cache, _clock) = test_cache(store.clone());

        let outcome = cache.set("anilist_big", &json!("x".repeat(500)));

        assert_eq!(outcome, WriteOutcome::Dropped);
        assert!(cache.get("anilist_big").is_none());
    }

    #[test]
    fn test_evict_expired_is_idempotent() {
        let (cache, clock) = test_cache(Arc::new(MemoryStore::new()));

        cache.set("anilist_old", &json!(1));
        clock.advance(TTL / 2);
        cache.set("anilist_new", &json!(2));
        clock.advance(TTL / 2);

        assert_eq!(cache.evict_expired().unwrap(), 1);
        assert_eq!(cache.evict_expired().unwrap(), 0);
        assert_eq!(cache.get("anilist_new"), Some(json!(2)));
    }

    #[test]
    fn test_clear_prefix_counts() {
        let store = Arc::new(MemoryStore::new());
        let (cache, _clock) = test_cache(store.clone());
        store.set("watchlist.settings", "{}").unwrap();

        cache.set("anilist_1", &json!(1));
        cache.set("anilist_2", &json!(2));

        assert_eq!(cache.clear_prefix(CACHE_PREFIX).unwrap(), 2);
        assert_eq!(cache.clear_prefix(CACHE_PREFIX).unwrap(), 0);
        assert!(store.get("watchlist.settings").unwrap().is_some());
    }

    #[test]
    fn test_stats() {
        let (cache, clock) = test_cache(Arc::new(MemoryStore::new()));

        cache.set("anilist_1", &json!("data1"));
        clock.advance(TTL);
        cache.set("anilist_2", &json!("data2"));
        let newest = clock.now_millis();

        let stats = cache.stats().unwrap();
        assert_eq!(stats.total_entries, 2);
        assert_eq!(stats.valid_entries, 1);
        assert_eq!(stats.expired_entries, 1);
        assert_eq!(stats.newest_entry, Some(newest));
        assert!(stats.total_size_bytes > 0);
    }

    #[test]
    fn test_cache_over_sqlite_store() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(SqliteStore::open_at(dir.path(), 1024 * 1024).unwrap());
        let (cache, clock) = test_cache(store);

        cache.set("anilist_k", &json!({"data": {"Page": {"media": []}}}));
        assert!(cache.get("anilist_k").is_some());

        clock.advance(TTL + Duration::from_secs(1));
        assert_eq!(cache.evict_expired().unwrap(), 1);
        assert!(cache.get_stale("anilist_k").is_none());
    }
}
