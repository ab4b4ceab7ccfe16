//! API client for the upstream REST service.
//!
//! Each fetch is one GET against `<base>/<resource>[/<id>]` with a JSON body.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{header, Client};
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use crate::models::{Record, ResourceKind};

use super::{ApiError, RecordSource};

// ============================================================================
// Constants
// ============================================================================

/// Public API the dashboard reads from when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.org";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// API client for the record service.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a new API client against `base_url`
    pub fn new(base_url: &str) -> Result<Self> {
        let parsed = Url::parse(base_url)
            .with_context(|| format!("Invalid API base URL: {}", base_url))?;
        if parsed.cannot_be_a_base() {
            anyhow::bail!("API base URL cannot be used as a base: {}", base_url);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Set the bearer token sent as `Authorization` on every request
    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn collection_url(&self, kind: ResourceKind) -> String {
        format!("{}/{}", self.base_url, kind.segment())
    }

    pub fn item_url(&self, kind: ResourceKind, id: i64) -> String {
        format!("{}/{}/{}", self.base_url, kind.segment(), id)
    }

    fn auth_headers(&self) -> Result<header::HeaderMap, ApiError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        if let Some(ref token) = self.token {
            let value = header::HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| ApiError::InvalidToken)?;
            headers.insert(header::AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn get_json(&self, url: &str) -> Result<Value, ApiError> {
        let response = self
            .client
            .get(url)
            .headers(self.auth_headers()?)
            .send()
            .await
            .map_err(|e| {
                warn!(url = url, error = %e, "Request failed");
                ApiError::NetworkError(e)
            })?;

        let response = Self::check_response(response).await?;
        let text = response.text().await?;
        debug!(url = url, bytes = text.len(), "Response received");

        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse JSON from {}: {}", url, e)))
    }
}

#[async_trait]
impl RecordSource for ApiClient {
    async fn fetch_collection(&self, kind: ResourceKind) -> Result<Vec<Record>, ApiError> {
        let url = self.collection_url(kind);
        info!(%kind, url = %url, "Fetching collection");
        let body = self.get_json(&url).await?;
        if !body.is_array() {
            warn!(%kind, "Collection response was not an array, treating as empty");
        }
        kind.parse_collection(body)
            .map_err(|e| ApiError::InvalidResponse(format!("Malformed {} collection: {}", kind, e)))
    }

    async fn fetch_item(&self, kind: ResourceKind, id: i64) -> Result<Record, ApiError> {
        let url = self.item_url(kind, id);
        info!(%kind, id, url = %url, "Fetching item");
        let body = self.get_json(&url).await?;
        kind.parse_item(body)
            .map_err(|e| ApiError::InvalidResponse(format!("Malformed {} #{}: {}", kind.singular(), id, e)))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_strip_trailing_slash() {
        let client = ApiClient::new("https://example.com/api/").unwrap();
        assert_eq!(client.base_url(), "https://example.com/api");
        assert_eq!(
            client.collection_url(ResourceKind::Comments),
            "https://example.com/api/comments"
        );
        assert_eq!(
            client.item_url(ResourceKind::Users, 7),
            "https://example.com/api/users/7"
        );
    }

    #[test]
    fn test_default_base_url() {
        let client = ApiClient::new(DEFAULT_BASE_URL).unwrap();
        assert_eq!(
            client.collection_url(ResourceKind::Posts),
            "https://jsonplaceholder.org/posts"
        );
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        assert!(ApiClient::new("not a url").is_err());
        assert!(ApiClient::new("mailto:someone@example.com").is_err());
    }

    #[test]
    fn test_auth_headers_with_token() {
        let mut client = ApiClient::new(DEFAULT_BASE_URL).unwrap();
        assert!(client.auth_headers().unwrap().get(header::AUTHORIZATION).is_none());

        client.set_token("abc".to_string());
        let headers = client.auth_headers().unwrap();
        assert_eq!(headers.get(header::AUTHORIZATION).unwrap(), "Bearer abc");

        client.set_token("bad\ntoken".to_string());
        assert!(matches!(client.auth_headers(), Err(ApiError::InvalidToken)));
    }
}
