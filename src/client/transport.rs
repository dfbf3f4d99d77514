//! HTTP transport for the AniList GraphQL endpoint

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap};

use super::{GraphqlRequest, GraphqlTransport, RawResponse};
use crate::error::ApiError;

/// AniList GraphQL endpoint
pub const ANILIST_GRAPHQL_URL: &str = "https://graphql.anilist.co";

const RETRY_AFTER: &str = "retry-after";
const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";

/// reqwest-backed transport posting to a single endpoint.
///
/// No request timeout is configured; slow responses are left to complete.
pub struct HttpTransport {
    http: HttpClient,
    endpoint: String,
}

impl HttpTransport {
    /// Create a transport for `endpoint`
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ApiError> {
        let http = HttpClient::builder()
            .user_agent(concat!("animetrack/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Parse a numeric header, ignoring anything malformed
fn header_number<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<T>().ok())
}

#[async_trait]
impl GraphqlTransport for HttpTransport {
    async fn post(&self, request: &GraphqlRequest) -> Result<RawResponse, ApiError> {
        let response = self
            .http
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .json(request)
            .send()
            .await
            .map_err(ApiError::from)?;

        let status = response.status().as_u16();
        let headers = response.headers();
        let retry_after = header_number::<u64>(headers, RETRY_AFTER).map(Duration::from_secs);
        let remaining = header_number::<u32>(headers, RATE_LIMIT_REMAINING);

        let body = response.text().await.map_err(ApiError::from)?;
        log::debug!("POST {} -> {} ({} bytes)", self.endpoint, status, body.len());

        Ok(RawResponse {
            status,
            retry_after,
            remaining,
            body,
        })
    }
}
