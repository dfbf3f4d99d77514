//! Local cache for AniList API responses
//!
//! Responses are stored in the local store under a fingerprint of the request,
//! kept for a fixed TTL, and served past their TTL only as an offline fallback.

pub mod key;
pub mod storage;
pub mod sweeper;

use std::time::Duration;

/// Default freshness window for cached responses (1 hour)
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

// Re-export main types
pub use key::{CACHE_PREFIX, fingerprint};
pub use storage::{CacheStats, CachedResponse, Lookup, ResponseCache, WriteOutcome};
pub use sweeper::CacheSweeper;
