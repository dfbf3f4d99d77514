//! Background task that evicts expired cache entries on a fixed interval

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::ResponseCache;

const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Periodic eviction task. Stops when dropped.
pub struct CacheSweeper {
    handle: JoinHandle<()>,
}

impl CacheSweeper {
    /// Spawn a sweeper that calls `evict_expired` every `every`.
    ///
    /// The first sweep happens immediately. Intervals under one second are
    /// raised to one second.
    pub fn spawn(cache: ResponseCache, every: Duration) -> Self {
        let every = every.max(MIN_INTERVAL);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if let Err(e) = cache.evict_expired() {
                    log::warn!("Cache sweep failed: {}", e);
                }
            }
        });

        Self { handle }
    }
}

impl Drop for CacheSweeper {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::store::{LocalStore, MemoryStore};
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_evicts_on_tick() {
        let ttl = Duration::from_secs(60);
        let store = Arc::new(MemoryStore::new());
        let clock = ManualClock::new(0);
        let cache = ResponseCache::new(store.clone(), Arc::new(clock.clone()), ttl);

        cache.set("anilist_k", &json!(1));
        let _sweeper = CacheSweeper::spawn(cache.clone(), ttl);

        clock.advance(ttl);
        tokio::time::sleep(ttl * 2).await;

        assert!(store.get("anilist_k").unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_sweeper_stops() {
        let ttl = Duration::from_secs(60);
        let store = Arc::new(MemoryStore::new());
        let clock = ManualClock::new(0);
        let cache = ResponseCache::new(store.clone(), Arc::new(clock.clone()), ttl);

        let sweeper = CacheSweeper::spawn(cache.clone(), ttl);
        // Let the immediate first tick run before stopping
        tokio::task::yield_now().await;
        drop(sweeper);

        cache.set("anilist_k", &json!(1));
        clock.advance(ttl);
        tokio::time::sleep(ttl * 3).await;

        assert!(store.get("anilist_k").unwrap().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_is_clamped() {
        let store = Arc::new(MemoryStore::new());
        let clock = ManualClock::new(0);
        let cache = ResponseCache::new(store.clone(), Arc::new(clock.clone()), Duration::ZERO);

        let _sweeper = CacheSweeper::spawn(cache.clone(), Duration::ZERO);
        cache.set("anilist_k", &json!(1));
        clock.advance(Duration::from_secs(1));
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert!(store.get("anilist_k").unwrap().is_none());
    }
}
