//! `reqwest`-backed [`Transport`].

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use super::{Transport, TransportError};

/// Response bodies are truncated to this many characters in logs and errors.
const MAX_LOGGED_BODY: usize = 500;

/// HTTP client for the restaurant API.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct HttpTransport {
    inner: Arc<HttpTransportInner>,
}

struct HttpTransportInner {
    client: reqwest::Client,
    base_url: Url,
    token: Option<SecretString>,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.inner.base_url.as_str())
            .field("token", &self.inner.token.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}

impl HttpTransport {
    /// Create a transport for the API at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not a valid URL or the HTTP client
    /// fails to build.
    pub fn new(
        base_url: &str,
        token: Option<SecretString>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let mut base_url = Url::parse(base_url)?;
        // Url::join replaces the last segment unless the path ends with '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            inner: Arc::new(HttpTransportInner {
                client,
                base_url,
                token,
            }),
        })
    }

    /// Absolute URL for an API path.
    fn url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, TransportError> {
        let mut url = self.inner.base_url.join(path.trim_start_matches('/'))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Value, TransportError> {
        let request_id = uuid::Uuid::new_v4().to_string();
        let mut request = request
            .header("Accept", "application/json")
            .header("X-Request-Id", &request_id);
        if let Some(token) = &self.inner.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(TransportError::RateLimited(retry_after));
        }

        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(
                status = %status,
                request_id = %request_id,
                body = %body.chars().take(MAX_LOGGED_BODY).collect::<String>(),
                "API returned non-success status"
            );
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_LOGGED_BODY).collect(),
            });
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                request_id = %request_id,
                body = %body.chars().take(MAX_LOGGED_BODY).collect::<String>(),
                "Failed to parse API response"
            );
            TransportError::Parse(e)
        })
    }
}

impl Transport for HttpTransport {
    #[instrument(skip(self, query), fields(path = %path))]
    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, TransportError> {
        let url = self.url(path, query)?;
        debug!(url = %url, "GET");
        self.send(self.inner.client.get(url)).await
    }

    #[instrument(skip(self, body), fields(path = %path))]
    async fn post(&self, path: &str, body: &Value) -> Result<Value, TransportError> {
        let url = self.url(path, &[])?;
        debug!(url = %url, "POST");
        self.send(self.inner.client.post(url).json(body)).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn transport(base: &str) -> HttpTransport {
        HttpTransport::new(base, None, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_url_keeps_base_path() {
        let t = transport("https://api.grubline.test/v1");
        let url = t.url("/restaurants/3/menus", &[("lang", "ko")]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.grubline.test/v1/restaurants/3/menus?lang=ko"
        );
    }

    #[test]
    fn test_url_encodes_query() {
        let t = transport("https://api.grubline.test/");
        let url = t
            .url("/restaurants/nearby", &[("category", "fried chicken"), ("lang", "en")])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.grubline.test/restaurants/nearby?category=fried+chicken&lang=en"
        );
    }

    #[test]
    fn test_url_without_query_has_no_question_mark() {
        let t = transport("https://api.grubline.test");
        assert_eq!(
            t.url("/orders", &[]).unwrap().as_str(),
            "https://api.grubline.test/orders"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            HttpTransport::new("not a url", None, Duration::from_secs(1)),
            Err(TransportError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_debug_redacts_token() {
        let t = HttpTransport::new(
            "https://api.grubline.test",
            Some(SecretString::from("tok_9f8e7d6c5b4a")),
            Duration::from_secs(1),
        )
        .unwrap();
        let debug = format!("{t:?}");
        assert!(!debug.contains("tok_9f8e7d6c5b4a"));
        assert!(debug.contains("[REDACTED]"));
    }
}
