//! Mock intel providers for testing.
//!
//! Configurable providers that return fixed verdicts per URL, letting
//! tests exercise the analyzer without network access.

use crate::intel::{BlocklistProvider, UrlReputationProvider, UrlVerdict};

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use url::Url;

/// A reputation provider returning configured verdicts per URL.
///
/// # Examples
///
/// ```rust
/// use vetkit::intel::{MockReputation, UrlVerdict};
///
/// let provider = MockReputation::new().with_verdict(
///     "https://evil.example/",
///     UrlVerdict { malware: true, phishing: false },
/// );
/// ```
#[derive(Debug)]
pub struct MockReputation {
    name: String,
    verdicts: RwLock<HashMap<String, UrlVerdict>>,
    default_verdict: UrlVerdict,
    lookup_count: AtomicU64,
}

impl MockReputation {
    /// Creates a provider that reports every URL as benign.
    pub fn new() -> Self {
        Self {
            name: "mock-reputation".to_string(),
            verdicts: RwLock::new(HashMap::new()),
            default_verdict: UrlVerdict::BENIGN,
            lookup_count: AtomicU64::new(0),
        }
    }

    /// Creates a provider that flags every URL with the given verdict.
    pub fn new_flagging(verdict: UrlVerdict) -> Self {
        Self {
            default_verdict: verdict,
            ..Self::new()
        }
    }

    /// Sets the provider name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds a verdict for a specific URL.
    pub fn with_verdict(self, url: impl Into<String>, verdict: UrlVerdict) -> Self {
        self.verdicts
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(url.into(), verdict);
        self
    }

    /// Number of lookups performed.
    pub fn lookup_count(&self) -> u64 {
        self.lookup_count.load(Ordering::Relaxed)
    }
}

impl Default for MockReputation {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UrlReputationProvider for MockReputation {
    fn name(&self) -> &str {
        &self.name
    }

    async fn lookup(&self, url: &Url) -> UrlVerdict {
        self.lookup_count.fetch_add(1, Ordering::Relaxed);
        self.verdicts
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(url.as_str())
            .copied()
            .unwrap_or(self.default_verdict)
    }
}

/// A blocklist provider listing a configured set of URLs.
#[derive(Debug)]
pub struct MockBlocklist {
    name: String,
    listed: HashSet<String>,
}

impl MockBlocklist {
    /// Creates an empty blocklist.
    pub fn new() -> Self {
        Self {
            name: "mock-blocklist".to_string(),
            listed: HashSet::new(),
        }
    }

    /// Sets the provider name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds a URL to the list.
    pub fn with_listed(mut self, url: impl Into<String>) -> Self {
        self.listed.insert(url.into());
        self
    }
}

impl Default for MockBlocklist {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlocklistProvider for MockBlocklist {
    fn name(&self) -> &str {
        &self.name
    }

    async fn is_listed(&self, url: &Url) -> bool {
        self.listed.contains(url.as_str())
    }
}
