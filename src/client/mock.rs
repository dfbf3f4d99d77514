//! Scripted GraphQL transport for testing
//!
//! Replays a queue of canned responses so the client's retry, quota, and
//! fallback paths can be driven without a network.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::{GraphqlRequest, GraphqlTransport, RawResponse};
use crate::error::ApiError;

/// One scripted reply
#[derive(Debug, Clone)]
pub enum Scripted {
    Response(RawResponse),
    NetworkError(String),
}

/// Transport that answers from a script and records what it was sent.
///
/// When the script runs out, `fallback` answers every further call.
///
/// # Example
/// ```ignore
/// let transport = ScriptedTransport::new()
///     .then_status(500)
///     .then_json(r#"{"data":{"x":1}}"#);
/// ```
#[derive(Clone)]
pub struct ScriptedTransport {
    script: Arc<Mutex<VecDeque<Scripted>>>,
    fallback: Arc<Mutex<Option<Scripted>>>,
    requests: Arc<Mutex<Vec<GraphqlRequest>>>,
}

impl Default for ScriptedTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            fallback: Arc::new(Mutex::new(None)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn push(self, reply: Scripted) -> Self {
        self.script.lock().unwrap().push_back(reply);
        self
    }

    /// Queue a 200 with the given body
    pub fn then_json(self, body: &str) -> Self {
        self.then_response(RawResponse {
            status: 200,
            retry_after: None,
            remaining: None,
            body: body.to_string(),
        })
    }

    /// Queue an empty-bodied response with the given status
    pub fn then_status(self, status: u16) -> Self {
        self.then_response(RawResponse {
            status,
            retry_after: None,
            remaining: None,
            body: String::new(),
        })
    }

    /// Queue a 429, optionally with a `Retry-After`
    pub fn then_quota(self, retry_after: Option<Duration>) -> Self {
        self.then_response(RawResponse {
            status: 429,
            retry_after,
            remaining: Some(0),
            body: String::new(),
        })
    }

    pub fn then_response(self, response: RawResponse) -> Self {
        self.push(Scripted::Response(response))
    }

    pub fn then_network_error(self) -> Self {
        self.push(Scripted::NetworkError(
            "Failed to connect to API".to_string(),
        ))
    }

    /// Answer every unscripted call with this status
    pub fn always_status(self, status: u16) -> Self {
        *self.fallback.lock().unwrap() = Some(Scripted::Response(RawResponse {
            status,
            retry_after: None,
            remaining: None,
            body: String::new(),
        }));
        self
    }

    /// Number of requests received so far
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Requests received so far, oldest first
    pub fn requests(&self) -> Vec<GraphqlRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl GraphqlTransport for ScriptedTransport {
    async fn post(&self, request: &GraphqlRequest) -> Result<RawResponse, ApiError> {
        self.requests.lock().unwrap().push(request.clone());

        let next = self.script.lock().unwrap().pop_front();
        let reply = match next {
            Some(reply) => reply,
            None => self
                .fallback
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| Scripted::NetworkError("script exhausted".to_string())),
        };

        match reply {
            Scripted::Response(response) => Ok(response),
            Scripted::NetworkError(msg) => Err(ApiError::Transport(msg)),
        }
    }
}
