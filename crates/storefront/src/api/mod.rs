//! REST transport for the restaurant API.
//!
//! # Architecture
//!
//! - [`Transport`] is the seam between the catalog adapters and the network:
//!   a GET or POST of a path relative to the API base URL, answered with the
//!   decoded JSON body.
//! - [`HttpTransport`] implements it over `reqwest`.
//! - Transport failures are normalized into [`ApiError`] before they reach
//!   callers, so the rest of the crate sees one shape regardless of whether
//!   the request failed in flight, with a status, or while parsing.
//!
//! Raw response shapes live in [`types`]; conversion to view models happens
//! in the catalog module.

mod client;
pub mod types;

use std::future::Future;

pub use client::HttpTransport;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Errors raised while talking to the API.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Rate limited by the API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Base URL or path could not form a valid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// A request/response channel to the restaurant API.
///
/// Paths are relative to the API base URL and start with `/`.
pub trait Transport: Send + Sync {
    /// GET `path` with `query` parameters.
    fn get(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> impl Future<Output = Result<Value, TransportError>> + Send;

    /// POST `body` as JSON to `path`.
    fn post(
        &self,
        path: &str,
        body: &Value,
    ) -> impl Future<Output = Result<Value, TransportError>> + Send;
}

/// Error body shape returned by the API.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    code: Option<String>,
}

/// Failure of an API call, normalized for display and retry decisions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ApiError {
    /// Human-readable description.
    pub message: String,
    /// Machine-readable code from the error body, if any.
    pub code: Option<String>,
    /// HTTP status, when a response was received.
    pub status: Option<u16>,
}

impl ApiError {
    /// Error with only a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            status: None,
        }
    }

    /// Whether the status says the resource does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status == Some(404)
    }

    /// Whether retrying later may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self.status {
            None => true,
            Some(status) => status == 429 || status >= 500,
        }
    }
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Status { status, body } => {
                match serde_json::from_str::<ErrorBody>(&body) {
                    Ok(parsed) => Self {
                        message: parsed.message,
                        code: parsed.code,
                        status: Some(status),
                    },
                    Err(_) => Self {
                        message: format!("Request failed with status {status}"),
                        code: None,
                        status: Some(status),
                    },
                }
            }
            TransportError::Http(e) => Self {
                message: e.to_string(),
                code: None,
                status: e.status().map(|s| s.as_u16()),
            },
            TransportError::Parse(e) => Self {
                message: format!("Invalid response: {e}"),
                code: Some("invalid_response".to_string()),
                status: None,
            },
            TransportError::RateLimited(secs) => Self {
                message: format!("Too many requests, retry after {secs} seconds"),
                code: Some("rate_limited".to_string()),
                status: Some(429),
            },
            TransportError::InvalidUrl(e) => Self {
                message: format!("Invalid request URL: {e}"),
                code: Some("invalid_url".to_string()),
                status: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_with_error_body() {
        let err = ApiError::from(TransportError::Status {
            status: 422,
            body: r#"{"message":"Address is outside the delivery area","code":"OUT_OF_AREA"}"#
                .to_string(),
        });
        assert_eq!(err.message, "Address is outside the delivery area");
        assert_eq!(err.code.as_deref(), Some("OUT_OF_AREA"));
        assert_eq!(err.status, Some(422));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_status_without_error_body() {
        let err = ApiError::from(TransportError::Status {
            status: 503,
            body: "<html>Service Unavailable</html>".to_string(),
        });
        assert_eq!(err.message, "Request failed with status 503");
        assert_eq!(err.code, None);
        assert!(err.is_retryable());
    }

    #[test]
    fn test_rate_limited() {
        let err = ApiError::from(TransportError::RateLimited(7));
        assert_eq!(err.status, Some(429));
        assert!(err.is_retryable());
        assert!(err.to_string().contains('7'));
    }

    #[test]
    fn test_not_found() {
        let err = ApiError::from(TransportError::Status {
            status: 404,
            body: r#"{"message":"Restaurant not found"}"#.to_string(),
        });
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Restaurant not found");
    }
}
