//! VirusTotal URL reputation adapter.
//!
//! Looks up URLs against the VirusTotal v3 API. The URL identifier is
//! the unpadded base64 of the URL itself; the verdict is derived from
//! the `last_analysis_stats` block: any `malicious` engine vote flags
//! malware, more than two `suspicious` votes flag phishing.
//!
//! # Requirements
//!
//! - VirusTotal API key
//! - Network access to api.virustotal.com

use crate::intel::{UrlReputationProvider, UrlVerdict};

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use url::Url;

/// VirusTotal adapter configuration.
#[derive(Debug, Clone)]
pub struct VirusTotalConfig {
    /// API key (kept secret).
    pub api_key: SecretString,

    /// Base URL for the API.
    pub base_url: String,

    /// Request timeout.
    pub timeout: Duration,
}

impl VirusTotalConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into().into()),
            base_url: "https://www.virustotal.com/api/v3".to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// VirusTotal reputation provider.
#[derive(Debug)]
pub struct VirusTotalProvider {
    config: VirusTotalConfig,
    client: reqwest::Client,
}

impl VirusTotalProvider {
    /// Creates a provider from a configuration.
    ///
    /// Returns `None` when the HTTP client cannot be constructed, so a
    /// broken environment degrades to "no provider" rather than an error.
    pub fn new(config: VirusTotalConfig) -> Option<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .ok()?;
        Some(Self { config, client })
    }

    /// Creates a provider from the `VIRUSTOTAL_API_KEY` environment
    /// variable, when set.
    pub fn from_env() -> Option<Self> {
        let key = std::env::var("VIRUSTOTAL_API_KEY").ok()?;
        if key.is_empty() {
            return None;
        }
        Self::new(VirusTotalConfig::new(key))
    }

    /// VirusTotal URL identifier: unpadded base64 of the URL.
    fn url_id(url: &Url) -> String {
        STANDARD
            .encode(url.as_str())
            .trim_end_matches('=')
            .to_string()
    }
}

#[async_trait]
impl UrlReputationProvider for VirusTotalProvider {
    fn name(&self) -> &str {
        "virustotal"
    }

    async fn lookup(&self, url: &Url) -> UrlVerdict {
        let endpoint = format!("{}/urls/{}", self.config.base_url, Self::url_id(url));

        let response = match self
            .client
            .get(&endpoint)
            .header("x-apikey", self.config.api_key.expose_secret())
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(error = %e, "VirusTotal lookup failed");
                return UrlVerdict::BENIGN;
            }
        };

        if !response.status().is_success() {
            tracing::debug!(status = %response.status(), "VirusTotal returned non-success");
            return UrlVerdict::BENIGN;
        }

        let body: serde_json::Value = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!(error = %e, "VirusTotal response unparseable");
                return UrlVerdict::BENIGN;
            }
        };

        let stats = &body["data"]["attributes"]["last_analysis_stats"];
        let malicious = stats["malicious"].as_u64().unwrap_or(0);
        let suspicious = stats["suspicious"].as_u64().unwrap_or(0);

        UrlVerdict {
            malware: malicious > 0,
            // Phishing only when more than two engines agree.
            phishing: suspicious > 2,
        }
    }
}
