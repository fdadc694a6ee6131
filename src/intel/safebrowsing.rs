//! Google Safe Browsing blocklist adapter.
//!
//! Queries the Safe Browsing v4 `threatMatches:find` endpoint for
//! malware, social-engineering, and unwanted-software listings. A URL is
//! considered listed when any match is returned.

use crate::intel::BlocklistProvider;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use std::time::Duration;
use url::Url;

/// Safe Browsing adapter configuration.
#[derive(Debug, Clone)]
pub struct SafeBrowsingConfig {
    /// API key (kept secret).
    pub api_key: SecretString,

    /// Endpoint for `threatMatches:find`.
    pub endpoint: String,

    /// Request timeout.
    pub timeout: Duration,
}

impl SafeBrowsingConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into().into()),
            endpoint: "https://safebrowsing.googleapis.com/v4/threatMatches:find".to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Sets the endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Safe Browsing blocklist provider.
#[derive(Debug)]
pub struct SafeBrowsingProvider {
    config: SafeBrowsingConfig,
    client: reqwest::Client,
}

impl SafeBrowsingProvider {
    /// Creates a provider from a configuration.
    ///
    /// Returns `None` when the HTTP client cannot be constructed.
    pub fn new(config: SafeBrowsingConfig) -> Option<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .ok()?;
        Some(Self { config, client })
    }

    /// Creates a provider from the `GOOGLE_SAFE_BROWSING_API_KEY`
    /// environment variable, when set.
    pub fn from_env() -> Option<Self> {
        let key = std::env::var("GOOGLE_SAFE_BROWSING_API_KEY").ok()?;
        if key.is_empty() {
            return None;
        }
        Self::new(SafeBrowsingConfig::new(key))
    }
}

#[async_trait]
impl BlocklistProvider for SafeBrowsingProvider {
    fn name(&self) -> &str {
        "safe-browsing"
    }

    async fn is_listed(&self, url: &Url) -> bool {
        let endpoint = format!(
            "{}?key={}",
            self.config.endpoint,
            self.config.api_key.expose_secret()
        );

        let body = json!({
            "client": {
                "clientId": "vetkit",
                "clientVersion": "0.1"
            },
            "threatInfo": {
                "threatTypes": ["MALWARE", "SOCIAL_ENGINEERING", "UNWANTED_SOFTWARE"],
                "platformTypes": ["ANY_PLATFORM"],
                "threatEntryTypes": ["URL"],
                "threatEntries": [{ "url": url.as_str() }]
            }
        });

        let response = match self.client.post(&endpoint).json(&body).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(error = %e, "Safe Browsing lookup failed");
                return false;
            }
        };

        if !response.status().is_success() {
            tracing::debug!(status = %response.status(), "Safe Browsing returned non-success");
            return false;
        }

        match response.json::<serde_json::Value>().await {
            Ok(body) => body["matches"]
                .as_array()
                .map(|matches| !matches.is_empty())
                .unwrap_or(false),
            Err(e) => {
                tracing::debug!(error = %e, "Safe Browsing response unparseable");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_endpoint_is_unlisted() {
        let config = SafeBrowsingConfig::new("test-key")
            .with_endpoint("http://unreachable.invalid/v4/threatMatches:find")
            .with_timeout(Duration::from_millis(200));
        let provider = SafeBrowsingProvider::new(config).unwrap();

        let url = Url::parse("https://example.com/").unwrap();
        assert!(!provider.is_listed(&url).await);
    }
}
