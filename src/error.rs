//! Error types for animetrack

use std::time::Duration;
use thiserror::Error;

/// Result type alias for animetrack operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the application
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Interactive prompt error: {0}")]
    Dialoguer(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Operation failed: {0}")]
    Other(String),
}

impl From<dialoguer::Error> for Error {
    fn from(err: dialoguer::Error) -> Self {
        Error::Dialoguer(err.to_string())
    }
}

/// AniList API errors.
///
/// Everything except `Terminal` is absorbed by the client's retry and fallback
/// logic; `Terminal` is what callers see when nothing could be served.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Network failure or a non-2xx status other than 429
    #[error("Network error: {0}")]
    Transport(String),

    /// 429 from the server, with the wait it asked for
    #[error("Rate limit exceeded. Retry after {0:?}")]
    QuotaExceeded(Duration),

    /// 2xx response carrying a GraphQL error list
    #[error("AniList error: {0}")]
    Application(String),

    /// All attempts failed and no cached data exists at any freshness
    #[error("API Error: {message}")]
    Terminal { message: String },

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Transport("Request timed out".to_string())
        } else if err.is_connect() {
            ApiError::Transport("Failed to connect to API".to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to save configuration: {0}")]
    SaveError(String),
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Local store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage quota exceeded ({needed} bytes needed, quota is {quota})")]
    QuotaExceeded { needed: usize, quota: usize },

    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Storage I/O error: {0}")]
    Io(String),

    #[error("Could not determine a data directory")]
    NoDataDir,

    #[error("No watchlist entry with id '{0}'")]
    NotFound(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}
