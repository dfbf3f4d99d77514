//! JSON output formatting
//!
//! Every JSON document is `{"data": ..., "meta": {...}}`. Results that came
//! from AniList also say where they came from, so scripts can tell a stale
//! offline answer from a live one.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::client::Source;

/// Wrapper for JSON output with metadata
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub data: T,
    pub meta: Metadata,
}

/// Metadata included in JSON output
#[derive(Debug, Serialize)]
pub struct Metadata {
    /// When the output was produced
    pub timestamp: String,

    /// CLI version
    pub version: String,

    /// `network`, `cache`, or `stale` for API-backed results
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<&'static str>,

    /// When a stale result was originally fetched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<String>,
}

impl<T> JsonOutput<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            meta: Metadata {
                timestamp: Utc::now().to_rfc3339(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                source: None,
                fetched_at: None,
            },
        }
    }

    /// Record where an API-backed result came from
    pub fn with_source(mut self, source: Source) -> Self {
        let (label, fetched_at) = match source {
            Source::Network => ("network", None),
            Source::Cache => ("cache", None),
            Source::Stale { stored_at } => (
                "stale",
                DateTime::from_timestamp_millis(stored_at).map(|dt| dt.to_rfc3339()),
            ),
        };
        self.meta.source = Some(label);
        self.meta.fetched_at = fetched_at;
        self
    }
}

/// Format data as pretty-printed JSON
pub fn format_json<T: Serialize + ?Sized>(data: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&JsonOutput::new(data))
}

/// Format API-backed data, noting its source
pub fn format_json_from<T: Serialize + ?Sized>(
    data: &T,
    source: Source,
) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&JsonOutput::new(data).with_source(source))
}
