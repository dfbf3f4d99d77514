//! Retry policy and response classification

use std::time::Duration;

use serde_json::Value;

use super::RawResponse;
use crate::error::ApiError;

/// How the client retries failed requests.
///
/// The backoff between generic failures is flat. 429 responses are handled on
/// their own channel and do not spend `retries`.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt for transport/application failures
    pub retries: u32,
    /// Fixed delay before each retry
    pub backoff: Duration,
    /// Wait applied on a 429 that carries no `Retry-After`
    pub quota_wait: Duration,
    /// Upper bound on consecutive 429 waits for one query
    pub max_quota_waits: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 2,
            backoff: Duration::from_secs(1),
            quota_wait: Duration::from_secs(60),
            max_quota_waits: 10,
        }
    }
}

/// Interpretation of a single attempt.
#[derive(Debug)]
pub enum Attempt {
    /// 2xx with a usable body; the whole body is the payload
    Success(Value),
    /// 429, with the server's requested wait if it gave one
    Quota { retry_after: Option<Duration> },
    /// Anything else that went wrong; spends a retry
    Failed(ApiError),
}

/// Sort a transport result into success, quota, or failure.
pub fn classify(result: Result<RawResponse, ApiError>) -> Attempt {
    let response = match result {
        Ok(response) => response,
        Err(e) => return Attempt::Failed(e),
    };

    if response.status == 429 {
        return Attempt::Quota {
            retry_after: response.retry_after,
        };
    }

    if !(200..300).contains(&response.status) {
        return Attempt::Failed(ApiError::Transport(format!(
            "HTTP error! status: {}",
            response.status
        )));
    }

    let body: Value = match serde_json::from_str(&response.body) {
        Ok(body) => body,
        Err(e) => {
            return Attempt::Failed(ApiError::InvalidResponse(format!(
                "Failed to parse response: {}",
                e
            )));
        }
    };

    if let Some(errors) = body.get("errors").and_then(Value::as_array)
        && !errors.is_empty()
    {
        let message = errors[0]
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("Unknown error")
            .to_string();
        return Attempt::Failed(ApiError::Application(message));
    }

    Attempt::Success(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(status: u16, body: &str) -> RawResponse {
        RawResponse {
            status,
            retry_after: None,
            remaining: None,
            body: body.to_string(),
        }
    }

    #[test]
    fn test_success_keeps_whole_body() {
        match classify(Ok(raw(200, r#"{"data":{"x":1}}"#))) {
            Attempt::Success(body) => assert_eq!(body, json!({"data": {"x": 1}})),
            other => panic!("Expected success, got {:?}", other),
        }
    }

    #[test]
    fn test_server_error_is_transport_failure() {
        match classify(Ok(raw(500, "oops"))) {
            Attempt::Failed(ApiError::Transport(msg)) => assert!(msg.contains("500")),
            other => panic!("Expected transport failure, got {:?}", other),
        }
    }

    #[test]
    fn test_429_is_quota_with_retry_after() {
        let mut response = raw(429, "");
        response.retry_after = Some(Duration::from_secs(7));

        match classify(Ok(response)) {
            Attempt::Quota { retry_after } => {
                assert_eq!(retry_after, Some(Duration::from_secs(7)))
            }
            other => panic!("Expected quota, got {:?}", other),
        }
    }

    #[test]
    fn test_error_list_in_200_is_application_failure() {
        let body = r#"{"data":null,"errors":[{"message":"Not Found.","status":404}]}"#;
        match classify(Ok(raw(200, body))) {
            Attempt::Failed(ApiError::Application(msg)) => assert_eq!(msg, "Not Found."),
            other => panic!("Expected application failure, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_error_list_is_success() {
        assert!(matches!(
            classify(Ok(raw(200, r#"{"data":{},"errors":[]}"#))),
            Attempt::Success(_)
        ));
    }

    #[test]
    fn test_unparseable_body_is_failure() {
        assert!(matches!(
            classify(Ok(raw(200, "<html>"))),
            Attempt::Failed(ApiError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_network_error_passes_through() {
        let result = classify(Err(ApiError::Transport("Failed to connect to API".into())));
        assert!(matches!(result, Attempt::Failed(ApiError::Transport(_))));
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.retries, 2);
        assert_eq!(policy.backoff, Duration::from_secs(1));
    }
}
