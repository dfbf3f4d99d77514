//! AniList API client
//!
//! The pieces, from the wire up:
//! - [`GraphqlTransport`] posts one request and hands back the raw response
//! - [`retry::classify`] sorts a raw response into success, 429, or failure
//! - [`SlidingWindowLimiter`] keeps us under the server's request quota
//! - [`AniListClient`] ties them to the response cache with retry and fallback

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::ser::SerializeMap;
use serde_json::Value;

use crate::error::ApiError;

pub mod anilist;
pub mod catalog;
#[cfg(test)]
pub mod mock;
pub mod models;
pub mod queries;
pub mod rate_limit;
pub mod retry;
pub mod transport;

pub use anilist::{AniListClient, QueryOutcome, Source};
pub use catalog::{CategoryPage, CategoryResult, find_media, load_discover, search};
#[cfg(test)]
pub use mock::ScriptedTransport;
pub use models::Media;
pub use queries::{Category, DiscoverFilters, Season};
pub use rate_limit::SlidingWindowLimiter;
pub use retry::RetryPolicy;
pub use transport::{ANILIST_GRAPHQL_URL, HttpTransport};

/// GraphQL variables, kept in insertion order.
///
/// Values are expected to be scalars (strings, numbers, booleans, null).
/// Order is irrelevant to the server and to the cache fingerprint.
#[derive(Debug, Clone, Default)]
pub struct Variables {
    entries: Vec<(String, Value)>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace a variable
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Variables {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Body of a GraphQL POST
#[derive(Debug, Clone, Serialize)]
pub struct GraphqlRequest {
    pub query: String,
    pub variables: Variables,
}

impl GraphqlRequest {
    pub fn new(query: impl Into<String>, variables: Variables) -> Self {
        Self {
            query: query.into(),
            variables,
        }
    }
}

/// What came back from one POST, before any interpretation.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    /// `Retry-After` header, if present
    pub retry_after: Option<Duration>,
    /// `X-RateLimit-Remaining` header, if present
    pub remaining: Option<u32>,
    /// Response body text
    pub body: String,
}

/// Sends a GraphQL request to the remote endpoint.
///
/// An `Err` means the request never produced an HTTP response (DNS, connect,
/// TLS, reset). Any HTTP status, including errors, is an `Ok`.
#[async_trait]
pub trait GraphqlTransport: Send + Sync {
    async fn post(&self, request: &GraphqlRequest) -> Result<RawResponse, ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_variables_insert_replaces() {
        let mut vars = Variables::new().with("page", 1);
        vars.insert("page", 2);

        assert_eq!(vars.get("page"), Some(&json!(2)));
        assert_eq!(vars.iter().count(), 1);
    }

    #[test]
    fn test_request_serializes_as_graphql_body() {
        let request = GraphqlRequest::new(
            "query ($search: String) { Media(search: $search) { id } }",
            Variables::new().with("search", "Frieren").with("perPage", 8),
        );

        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(
            body,
            json!({
                "query": "query ($search: String) { Media(search: $search) { id } }",
                "variables": { "search": "Frieren", "perPage": 8 }
            })
        );
    }

    #[test]
    fn test_empty_variables_serialize_as_object() {
        let body = serde_json::to_string(&Variables::new()).unwrap();
        assert_eq!(body, "{}");
        assert!(Variables::new().is_empty());
    }
}
