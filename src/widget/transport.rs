//! HTTP transport for the widget.

use url::Url;

use super::QueryTransport;
use crate::api::{QUERY_PATH, QueryRequest};

/// Errors from a query exchange. The widget treats them all alike.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The request could not be sent or the body could not be read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body was not JSON.
    #[error("Invalid JSON in response: {0}")]
    Json(#[from] serde_json::Error),
}

/// [`QueryTransport`] that posts to `<base>/api/query`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    endpoint: Url,
    http: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport for the server at `base_url`
    /// (e.g. `http://localhost:5001` or the page origin).
    pub fn new(base_url: impl AsRef<str>) -> Result<Self, TransportError> {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Create a transport with a custom reqwest client.
    pub fn with_client(
        base_url: impl AsRef<str>,
        http: reqwest::Client,
    ) -> Result<Self, TransportError> {
        let endpoint = Url::parse(base_url.as_ref())?.join(QUERY_PATH)?;
        Ok(Self { endpoint, http })
    }

    /// The full query endpoint URL.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait::async_trait(?Send)]
impl QueryTransport for HttpTransport {
    async fn query(&self, query: &str) -> Result<serde_json::Value, TransportError> {
        let body = QueryRequest {
            query: query.to_string(),
        };

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // Still a reply as long as the body is JSON.
            tracing::warn!(status = %status, endpoint = %self.endpoint, "Query endpoint returned error status");
        }

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_query_path() {
        let transport = HttpTransport::new("http://localhost:5001").expect("valid url");
        assert_eq!(
            transport.endpoint().as_str(),
            "http://localhost:5001/api/query"
        );

        // The path is absolute, so a page path on the base is replaced.
        let transport = HttpTransport::new("https://example.com/chat/").expect("valid url");
        assert_eq!(
            transport.endpoint().as_str(),
            "https://example.com/api/query"
        );
    }

    #[test]
    fn test_relative_base_rejected() {
        let err = HttpTransport::new("/api").expect_err("relative url");
        assert!(matches!(err, TransportError::InvalidUrl(_)));
    }
}
