//! Configuration management for animetrack

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cache::DEFAULT_TTL;
use crate::client::{ANILIST_GRAPHQL_URL, RetryPolicy};
use crate::error::{ConfigError, Result};
use crate::store::DEFAULT_QUOTA_BYTES;

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// AniList GraphQL endpoint
    pub api_url: String,

    pub cache: CacheConfig,

    pub rate_limit: RateLimitConfig,

    pub retry: RetryConfig,

    pub store: StoreConfig,
}

/// Response cache settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Seconds a cached response stays fresh
    pub ttl_secs: u64,
}

/// Client-side rate limit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub max_requests: usize,
    pub window_secs: u64,
    /// Back off when the server reports this many requests left, or fewer
    pub low_remaining: u32,
}

/// Retry behaviour for failed requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub retries: u32,
    pub backoff_ms: u64,
    /// Wait after a 429 without `Retry-After`
    pub quota_wait_secs: u64,
    pub max_quota_waits: u32,
}

/// Local store settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Data directory override
    pub path: Option<PathBuf>,
    pub quota_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: ANILIST_GRAPHQL_URL.to_string(),
            cache: CacheConfig::default(),
            rate_limit: RateLimitConfig::default(),
            retry: RetryConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: DEFAULT_TTL.as_secs(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 90,
            window_secs: 60,
            low_remaining: 2,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            retries: 2,
            backoff_ms: 1000,
            quota_wait_secs: 60,
            max_quota_waits: 10,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: None,
            quota_bytes: DEFAULT_QUOTA_BYTES,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            retries: self.retries,
            backoff: Duration::from_millis(self.backoff_ms),
            quota_wait: Duration::from_secs(self.quota_wait_secs),
            max_quota_waits: self.max_quota_waits,
        }
    }
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".animetrack").join("config.yaml"))
    }

    /// Resolve an optional override to a concrete path
    pub fn resolve_path(path: Option<&str>) -> Result<PathBuf> {
        match path {
            Some(p) => Ok(PathBuf::from(p)),
            None => Self::default_path(),
        }
    }

    /// Load from `path` (or the default path). A missing file gives defaults.
    pub fn load_at(path: Option<&str>) -> Result<Self> {
        Self::load_from(&Self::resolve_path(path)?)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = if contents.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(&contents).map_err(ConfigError::from)?
        };
        config.validate()?;

        Ok(config)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents =
            serde_yaml::to_string(self).map_err(|e| ConfigError::SaveError(e.to_string()))?;
        std::fs::write(path, contents)?;

        Ok(())
    }

    /// Reject values the client cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.api_url.trim().is_empty() {
            return Err(ConfigError::Invalid("api_url must not be empty".to_string()).into());
        }
        if self.rate_limit.max_requests == 0 {
            return Err(
                ConfigError::Invalid("rate_limit.max_requests must be at least 1".to_string())
                    .into(),
            );
        }
        if self.rate_limit.window_secs == 0 {
            return Err(
                ConfigError::Invalid("rate_limit.window_secs must be at least 1".to_string())
                    .into(),
            );
        }
        if self.cache.ttl_secs == 0 {
            return Err(ConfigError::Invalid("cache.ttl_secs must be at least 1".to_string()).into());
        }
        Ok(())
    }
}
