//! Bounded redirect-chain resolution.
//!
//! The resolver performs a header-only fetch loop capped at five
//! attempts, recording status and headers on every hop and resolving
//! `Location` values against the current URL. Markup responses get one
//! additional body fetch solely to extract a page title from a bounded
//! prefix. Resolution never fails: connection and DNS errors end the
//! loop early and the partial chain already collected is returned.

use crate::core::error::AnalysisError;
use crate::core::result::ResolvedUrl;

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::redirect::Policy;
use reqwest::Client;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use url::Url;

/// Fixed identifying client signature sent on every request.
pub const USER_AGENT: &str = "Mozilla/5.0 (compatible; vetkit/0.1)";

/// First `<title>` text in a markup body.
static TITLE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<title[^>]*>([^<]+)</title>").expect("title pattern compiles"));

/// Configuration for the URL resolver.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Maximum fetch attempts, redirects included.
    pub max_attempts: usize,

    /// Per-request timeout.
    pub request_timeout: Duration,

    /// Maximum number of body bytes read during the title scan.
    pub title_scan_limit: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            request_timeout: Duration::from_secs(10),
            title_scan_limit: 64 * 1024,
        }
    }
}

impl ResolverConfig {
    /// Creates a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the fetch attempt cap.
    pub fn with_max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Sets the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the title-scan byte limit.
    pub fn with_title_scan_limit(mut self, limit: usize) -> Self {
        self.title_scan_limit = limit;
        self
    }
}

/// Resolves redirect chains and captures response metadata.
#[derive(Debug, Clone)]
pub struct UrlResolver {
    client: Client,
    config: ResolverConfig,
}

impl UrlResolver {
    /// Creates a resolver with its own HTTP client.
    pub fn new(config: ResolverConfig) -> Result<Self, AnalysisError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(Policy::none())
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AnalysisError::configuration(format!("HTTP client: {e}")))?;
        Ok(Self::with_client(client, config))
    }

    /// Creates a resolver around an existing manual-redirect client.
    pub fn with_client(client: Client, config: ResolverConfig) -> Self {
        Self { client, config }
    }

    /// The underlying HTTP client, shared with the probes.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Resolves one URL, following redirects up to the attempt cap.
    ///
    /// Always returns a result; every error state degrades to a
    /// partially-filled `ResolvedUrl` with absent status or title.
    pub async fn resolve(&self, url: &Url) -> ResolvedUrl {
        let started = Instant::now();
        let mut current = url.clone();
        let mut redirect_chain = Vec::new();
        let mut response_headers = HashMap::new();
        let mut status_code = None;
        let mut content_type = None;

        for attempt in 0..self.config.max_attempts {
            let response = match self.client.head(current.clone()).send().await {
                Ok(response) => response,
                Err(e) => {
                    tracing::debug!(url = %current, error = %e, "head fetch failed");
                    break;
                }
            };

            status_code = Some(response.status().as_u16());
            // Accumulated across hops; later hops override per key.
            response_headers.extend(response.headers().iter().filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
            }));
            content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.to_string());

            // Follow a redirect only while another fetch attempt
            // remains, keeping the chain at most attempts - 1 long.
            if response.status().is_redirection() && attempt + 1 < self.config.max_attempts {
                let location = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|v| v.to_str().ok());
                if let Some(location) = location {
                    match current.join(location) {
                        Ok(next) => {
                            redirect_chain.push(current.to_string());
                            current = next;
                            continue;
                        }
                        Err(e) => {
                            tracing::debug!(location, error = %e, "unresolvable location header");
                        }
                    }
                }
            }
            break;
        }

        let page_title = match &content_type {
            Some(ct) if ct.contains("text/html") => self.fetch_title(&current).await,
            _ => None,
        };

        ResolvedUrl {
            original: url.to_string(),
            final_url: current.to_string(),
            redirect_chain,
            status_code,
            response_headers,
            content_type,
            page_title,
            elapsed: started.elapsed(),
        }
    }

    /// Fetches a bounded body prefix and extracts the first title tag.
    /// Failures are swallowed; the title simply stays absent.
    async fn fetch_title(&self, url: &Url) -> Option<String> {
        let mut response = self.client.get(url.clone()).send().await.ok()?;
        let mut body = Vec::with_capacity(8 * 1024);

        while let Ok(Some(chunk)) = response.chunk().await {
            let remaining = self.config.title_scan_limit.saturating_sub(body.len());
            if remaining == 0 {
                break;
            }
            body.extend_from_slice(&chunk[..chunk.len().min(remaining)]);
        }

        let text = String::from_utf8_lossy(&body);
        TITLE_PATTERN
            .captures(&text)
            .and_then(|captures| captures.get(1))
            .map(|title| title.as_str().trim().to_string())
            .filter(|title| !title.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_pattern_extraction() {
        let html = "<html><head><TITLE class=\"x\"> Hello World </TITLE></head></html>";
        let captures = TITLE_PATTERN.captures(html).unwrap();
        assert_eq!(captures.get(1).unwrap().as_str().trim(), "Hello World");
    }

    #[test]
    fn test_title_pattern_requires_tag() {
        assert!(TITLE_PATTERN.captures("no markup here").is_none());
    }

    #[test]
    fn test_config_builders() {
        let config = ResolverConfig::new()
            .with_max_attempts(3)
            .with_request_timeout(Duration::from_secs(2))
            .with_title_scan_limit(1024);
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.request_timeout, Duration::from_secs(2));
        assert_eq!(config.title_scan_limit, 1024);
    }

    #[tokio::test]
    async fn test_unreachable_host_degrades_to_partial_result() {
        let resolver = UrlResolver::new(
            ResolverConfig::new().with_request_timeout(Duration::from_millis(200)),
        )
        .unwrap();
        // Reserved TLD guaranteed not to resolve.
        let url = Url::parse("http://unreachable.invalid/").unwrap();
        let resolved = resolver.resolve(&url).await;

        assert_eq!(resolved.original, "http://unreachable.invalid/");
        assert_eq!(resolved.final_url, "http://unreachable.invalid/");
        assert!(resolved.redirect_chain.is_empty());
        assert!(resolved.status_code.is_none());
        assert!(resolved.page_title.is_none());
    }
}
