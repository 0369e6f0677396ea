//! Status API source over HTTP.
//!
//! Fetches `GET {endpoint}/api/v1/status`, which answers
//! `{ "components": [...] }`.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use statuswatch::{HttpSource, StatusSource};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = HttpSource::builder()
//!         .endpoint("https://status.example.com")
//!         .timeout(Duration::from_secs(5))
//!         .build()?;
//!
//!     for component in source.fetch_status().await? {
//!         println!("{}: {} monitors", component.name(), component.monitors().len());
//!     }
//!
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use statuswatch_types::{Component, StatusResponse};
use tracing::debug;

use super::StatusSource;
use crate::error::SourceError;

const STATUS_PATH: &str = "/api/v1/status";

/// Source backed by the status page's public API.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    endpoint: String,
    description: String,
}

impl HttpSource {
    /// Create a new builder for configuring the source.
    pub fn builder() -> HttpSourceBuilder {
        HttpSourceBuilder::default()
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn status_url(&self) -> String {
        format!("{}{}", self.endpoint, STATUS_PATH)
    }
}

#[async_trait]
impl StatusSource for HttpSource {
    async fn fetch_status(&self) -> Result<Vec<Component>, SourceError> {
        let url = self.status_url();
        debug!("Fetching {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if status == StatusCode::NO_CONTENT {
            return Ok(Vec::new());
        }

        let body = response.text().await?;

        if !status.is_success() {
            return Err(SourceError::Api {
                status: status.as_u16(),
                message: api_error_message(status.as_u16(), &body),
            });
        }

        let payload: StatusResponse = serde_json::from_str(&body)?;
        Ok(payload.components)
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Builder for [`HttpSource`].
#[derive(Debug, Default)]
pub struct HttpSourceBuilder {
    endpoint: Option<String>,
    timeout: Option<Duration>,
}

impl HttpSourceBuilder {
    /// Set the base URL (e.g., "https://status.example.com").
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the source.
    pub fn build(self) -> Result<HttpSource, SourceError> {
        let timeout = self.timeout.unwrap_or(Duration::from_secs(10));

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::Http(e.to_string()))?;

        let endpoint = self
            .endpoint
            .unwrap_or_else(|| "http://localhost:8000".to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(HttpSource {
            client,
            description: format!("http: {}", endpoint),
            endpoint,
        })
    }
}

/// Error text for a failed response.
///
/// Uses the body's `detail` (a string, or the first validation entry's `msg`),
/// falling back to `HTTP {status}`.
fn api_error_message(status: u16, body: &str) -> String {
    let detail = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("detail").cloned());

    let message = match detail {
        Some(Value::Array(items)) => items
            .first()
            .and_then(|item| item.get("msg"))
            .and_then(Value::as_str)
            .map(str::to_string),
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        _ => None,
    };
    message.unwrap_or_else(|| format!("HTTP {}", status))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let source = HttpSource::builder().build().unwrap();
        assert_eq!(source.endpoint(), "http://localhost:8000");
        assert_eq!(source.status_url(), "http://localhost:8000/api/v1/status");
        assert_eq!(source.description(), "http: http://localhost:8000");
    }

    #[test]
    fn test_builder_trims_trailing_slash() {
        let source = HttpSource::builder()
            .endpoint("https://status.example.com/")
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap();
        assert_eq!(source.status_url(), "https://status.example.com/api/v1/status");
    }

    #[test]
    fn test_error_message_from_string_detail() {
        let msg = api_error_message(404, r#"{"detail": "Not found"}"#);
        assert_eq!(msg, "Not found");
    }

    #[test]
    fn test_error_message_from_validation_list() {
        let body = r#"{"detail": [{"loc": ["query"], "msg": "field required"}, {"msg": "other"}]}"#;
        assert_eq!(api_error_message(422, body), "field required");
    }

    #[test]
    fn test_error_message_fallback() {
        assert_eq!(api_error_message(500, ""), "HTTP 500");
        assert_eq!(api_error_message(502, "<html>bad gateway</html>"), "HTTP 502");
        assert_eq!(api_error_message(503, r#"{"detail": []}"#), "HTTP 503");
        assert_eq!(api_error_message(503, r#"{"error": "x"}"#), "HTTP 503");
    }
}
