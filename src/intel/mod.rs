//! Threat-intelligence adapters.
//!
//! External reputation services are consulted as black-box oracles
//! behind two traits: [`UrlReputationProvider`] for malware/phishing
//! verdicts and [`BlocklistProvider`] for a single known-threat flag.
//! Adapters never error: an unconfigured, unreachable, or malformed
//! provider yields a benign default so a failing oracle can never block
//! an analysis.
//!
//! ## Available adapters
//!
//! - [`mock`] - Configurable static verdicts for testing
//! - [`virustotal`] - VirusTotal v3 URL reports
//! - [`safebrowsing`] - Google Safe Browsing v4 threat matches

pub mod mock;
pub mod safebrowsing;
pub mod virustotal;

pub use mock::{MockBlocklist, MockReputation};
pub use safebrowsing::SafeBrowsingProvider;
pub use virustotal::VirusTotalProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use url::Url;

/// A malware/phishing verdict for one URL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlVerdict {
    /// The provider considers the URL malware-hosting.
    pub malware: bool,

    /// The provider considers the URL a phishing page.
    pub phishing: bool,
}

impl UrlVerdict {
    /// The benign default returned when a provider is unavailable.
    pub const BENIGN: Self = Self {
        malware: false,
        phishing: false,
    };

    /// Returns `true` if either flag is set.
    pub fn is_flagged(&self) -> bool {
        self.malware || self.phishing
    }

    /// Combines two verdicts, keeping every raised flag.
    pub fn merge(self, other: Self) -> Self {
        Self {
            malware: self.malware || other.malware,
            phishing: self.phishing || other.phishing,
        }
    }
}

/// A reputation oracle returning malware/phishing verdicts for URLs.
///
/// Implementations must tolerate absence of configuration by returning
/// [`UrlVerdict::BENIGN`], never by erroring.
#[async_trait]
pub trait UrlReputationProvider: Send + Sync + Debug {
    /// Stable, human-readable provider name.
    fn name(&self) -> &str;

    /// Looks up the verdict for a URL. Never fails.
    async fn lookup(&self, url: &Url) -> UrlVerdict;
}

/// A blocklist oracle returning a single known-threat flag for URLs.
#[async_trait]
pub trait BlocklistProvider: Send + Sync + Debug {
    /// Stable, human-readable provider name.
    fn name(&self) -> &str;

    /// Returns `true` if the URL is on the provider's blocklist.
    /// Never fails; unavailable providers report `false`.
    async fn is_listed(&self, url: &Url) -> bool;
}

/// An arc-wrapped reputation provider for shared ownership.
pub type ArcReputationProvider = std::sync::Arc<dyn UrlReputationProvider>;

/// An arc-wrapped blocklist provider for shared ownership.
pub type ArcBlocklistProvider = std::sync::Arc<dyn BlocklistProvider>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_merge() {
        let a = UrlVerdict {
            malware: true,
            phishing: false,
        };
        let b = UrlVerdict {
            malware: false,
            phishing: true,
        };
        let merged = a.merge(b);
        assert!(merged.malware);
        assert!(merged.phishing);
        assert!(merged.is_flagged());
        assert!(!UrlVerdict::BENIGN.is_flagged());
    }
}
