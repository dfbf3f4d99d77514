//! Cached, rate-limited AniList client
//!
//! Per query:
//!
//! ```text
//! cache check ──hit──> return
//!     │ miss
//!     v
//! admit ──> send ──success──> cache write ──> return
//!   ^         ├──429──────────> hold (retry budget untouched) ─┐
//!   │         ├──failure, retries left──> flat backoff ────────┤
//!   └─────────┴────────────────────────────────────────────────┘
//!             └──failure, no retries──> stale cache or terminal error
//! ```

use std::sync::Arc;

use log::{debug, info, warn};
use serde_json::Value;

use super::rate_limit::SlidingWindowLimiter;
use super::retry::{Attempt, RetryPolicy, classify};
use super::{GraphqlRequest, GraphqlTransport, RawResponse, Variables};
use crate::cache::{Lookup, ResponseCache, WriteOutcome, fingerprint};
use crate::error::{ApiError, Result};

/// Where a query result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Fresh cache entry, served directly or after failed attempts under `--no-cache`
    Cache,
    /// Live response
    Network,
    /// Expired cache entry served because every attempt failed
    Stale { stored_at: i64 },
}

/// A query result and its provenance.
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    pub payload: Value,
    pub source: Source,
}

impl QueryOutcome {
    /// True when the payload is an expired cache entry
    pub fn is_stale(&self) -> bool {
        matches!(self.source, Source::Stale { .. })
    }
}

/// A logical request and the retries it has left.
#[derive(Debug, Clone, Copy)]
struct RequestDescriptor<'a> {
    query: &'a str,
    variables: &'a Variables,
    retries_remaining: u32,
}

impl RequestDescriptor<'_> {
    fn after_failure(self) -> Self {
        Self {
            retries_remaining: self.retries_remaining.saturating_sub(1),
            ..self
        }
    }
}

/// AniList client with response caching, rate limiting, retry, and stale fallback.
///
/// The cache and limiter are handed in rather than created here, so several
/// clients can share a limiter and tests can inspect both.
pub struct AniListClient<T: GraphqlTransport> {
    transport: T,
    cache: ResponseCache,
    limiter: Arc<SlidingWindowLimiter>,
    policy: RetryPolicy,
    skip_fresh_cache: bool,
}

impl<T: GraphqlTransport> AniListClient<T> {
    pub fn new(
        transport: T,
        cache: ResponseCache,
        limiter: Arc<SlidingWindowLimiter>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            transport,
            cache,
            limiter,
            policy,
            skip_fresh_cache: false,
        }
    }

    /// Always go to the network first (`--no-cache`).
    ///
    /// Responses are still cached, and stale entries still back up failures.
    pub fn skip_fresh_cache(mut self, skip: bool) -> Self {
        self.skip_fresh_cache = skip;
        self
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run a query with the configured retry budget.
    pub async fn query(
        &self,
        query: &str,
        variables: &Variables,
    ) -> std::result::Result<QueryOutcome, ApiError> {
        self.query_with_retries(query, variables, self.policy.retries)
            .await
    }

    /// Run a query allowing `retries` retries after the first attempt.
    ///
    /// Only [`ApiError::Terminal`] is returned: every other failure is retried
    /// or covered by a stale cache entry.
    pub async fn query_with_retries(
        &self,
        query: &str,
        variables: &Variables,
        retries: u32,
    ) -> std::result::Result<QueryOutcome, ApiError> {
        let key = fingerprint(query, variables);

        let fallback = match self.cache.lookup(&key) {
            Lookup::Fresh(cached) if !self.skip_fresh_cache => {
                debug!("Cache hit: {}", key);
                return Ok(QueryOutcome {
                    payload: cached.payload,
                    source: Source::Cache,
                });
            }
            fresh @ Lookup::Fresh(_) => fresh,
            expired @ Lookup::Expired(_) => {
                debug!("Cache entry expired: {}", key);
                expired
            }
            Lookup::Missing => {
                debug!("Cache miss: {}", key);
                Lookup::Missing
            }
        };

        let mut descriptor = RequestDescriptor {
            query,
            variables,
            retries_remaining: retries,
        };
        let mut quota_waits = 0u32;

        let last_error = loop {
            self.limiter.admit().await;

            let request = GraphqlRequest::new(descriptor.query, descriptor.variables.clone());
            let response = self.transport.post(&request).await;
            if let Ok(raw) = &response {
                self.observe_rate_headers(raw).await;
            }

            match classify(response) {
                Attempt::Success(payload) => {
                    match self.cache.set(&key, &payload) {
                        WriteOutcome::Stored => {}
                        WriteOutcome::Degraded { swept } => {
                            info!("Cache was full; swept {} entries to store {}", swept, key)
                        }
                        WriteOutcome::Dropped => warn!("Response for {} was not cached", key),
                    }
                    return Ok(QueryOutcome {
                        payload,
                        source: Source::Network,
                    });
                }
                Attempt::Quota { retry_after } => {
                    quota_waits += 1;
                    let wait = retry_after.unwrap_or(self.policy.quota_wait);
                    if quota_waits > self.policy.max_quota_waits {
                        break ApiError::QuotaExceeded(wait);
                    }
                    warn!("Rate limited by AniList, waiting {:?}", wait);
                    if retry_after.is_none() {
                        self.limiter.hold_for(wait).await;
                    }
                }
                Attempt::Failed(err) => {
                    if descriptor.retries_remaining == 0 {
                        break err;
                    }
                    debug!(
                        "Attempt failed ({}), retrying in {:?} ({} left)",
                        err, self.policy.backoff, descriptor.retries_remaining
                    );
                    tokio::time::sleep(self.policy.backoff).await;
                    descriptor = descriptor.after_failure();
                }
            }
        };

        self.fall_back_to_stale(&key, fallback, last_error)
    }

    /// Feed rate-limit headers from any response to the limiter.
    async fn observe_rate_headers(&self, raw: &RawResponse) {
        if let Some(wait) = raw.retry_after {
            self.limiter.hold_for(wait).await;
        }
        if let Some(remaining) = raw.remaining {
            self.limiter.observe_remaining(remaining).await;
        }
    }

    /// Serve whatever the store holds now, else the copy read before the
    /// first attempt. A copy still within its TTL is reported as a cache hit.
    fn fall_back_to_stale(
        &self,
        key: &str,
        earlier: Lookup,
        last_error: ApiError,
    ) -> std::result::Result<QueryOutcome, ApiError> {
        let current = match self.cache.lookup(key) {
            Lookup::Missing => earlier,
            current => current,
        };

        let (cached, source) = match current {
            Lookup::Fresh(cached) => (cached, Source::Cache),
            Lookup::Expired(cached) => {
                let stored_at = cached.stored_at;
                (cached, Source::Stale { stored_at })
            }
            Lookup::Missing => {
                return Err(ApiError::Terminal {
                    message: last_error.to_string(),
                });
            }
        };

        warn!("Using cached data (API error/offline): {}", last_error);
        Ok(QueryOutcome {
            payload: cached.payload,
            source,
        })
    }

    /// Remove every cached response whose key starts with `prefix`.
    pub fn clear_cache(&self, prefix: &str) -> Result<usize> {
        Ok(self.cache.clear_prefix(prefix)?)
    }
}
