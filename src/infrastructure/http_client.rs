//! HTTP client for provider lookups
//!
//! Thin wrapper over `reqwest` that applies the configured timeout and user
//! agent. Responses are returned whatever their status code; interpreting
//! the page is the caller's job.

use anyhow::{Context, Result};
use reqwest::{
    Client, StatusCode,
    header::{HeaderMap, HeaderValue, USER_AGENT},
};
use std::time::Duration;
use tracing::debug;

use crate::infrastructure::config::{ProviderConfig, defaults};

/// HTTP client configuration
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct HttpClientConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub follow_redirects: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::USER_AGENT.to_string(),
            timeout_seconds: defaults::REQUEST_TIMEOUT_SECONDS,
            follow_redirects: true,
        }
    }
}

impl From<&ProviderConfig> for HttpClientConfig {
    fn from(config: &ProviderConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            timeout_seconds: config.timeout_seconds,
            ..Self::default()
        }
    }
}

/// Body and status of a fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: StatusCode,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpClient {
    /// Create a new HTTP client with the given configuration
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent).context("Invalid user agent")?,
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .default_headers(headers)
            .redirect(if config.follow_redirects {
                reqwest::redirect::Policy::limited(10)
            } else {
                reqwest::redirect::Policy::none()
            })
            .gzip(true)
            .brotli(true)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, config })
    }

    /// GETs `url` and reads the whole body. Only transport problems
    /// (connect, timeout, body read) are errors.
    pub async fn fetch_page(&self, url: &str) -> Result<FetchedPage> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .with_context(|| format!("Failed to read body from {}", url))?;
        debug!("GET {} -> {} ({} bytes)", url, status, body.len());

        Ok(FetchedPage { status, body })
    }

    #[must_use]
    pub const fn config(&self) -> &HttpClientConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_client_creation() {
        let client = HttpClient::new(HttpClientConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_invalid_user_agent_is_rejected() {
        let config = HttpClientConfig {
            user_agent: "bad\nagent".to_string(),
            ..HttpClientConfig::default()
        };
        assert!(HttpClient::new(config).is_err());
    }

    #[test]
    fn test_config_from_provider_settings() {
        let provider = ProviderConfig {
            timeout_seconds: 7,
            user_agent: "probe/1.0".to_string(),
            ..ProviderConfig::default()
        };
        let config = HttpClientConfig::from(&provider);
        assert_eq!(config.timeout_seconds, 7);
        assert_eq!(config.user_agent, "probe/1.0");
        assert!(config.follow_redirects);
    }
}
