//! Side-effect-free URL probes.
//!
//! Each probe is independent, owns its own error handling, and returns a
//! best-effort default on failure rather than propagating. The analyzer
//! fans these out concurrently and joins on all of them; none depends on
//! another's result.

use crate::signatures::url::{DIGIT_HEAVY_HOST, DISPOSABLE_TLDS, ESTABLISHED_DOMAINS};

use reqwest::header::LOCATION;
use reqwest::Client;
use url::{Host, Url};

/// Age (days) assigned to long-established domains.
pub const AGE_ESTABLISHED: u32 = 5000;

/// Age (days) assigned to domains on disposable free TLDs.
pub const AGE_DISPOSABLE_TLD: u32 = 15;

/// Age (days) assigned to digit-heavy hostnames.
pub const AGE_DIGIT_HEAVY: u32 = 40;

/// Age (days) assigned when no heuristic class applies.
pub const AGE_DEFAULT: u32 = 270;

/// Returns `true` if the URL's host is a raw IP literal (v4 or v6).
pub fn is_ip_literal(url: &Url) -> bool {
    matches!(url.host(), Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)))
}

/// Confirms that a TLS connection to the host actually answers.
///
/// A non-HTTPS URL reports `false` immediately; otherwise a header-only
/// request is made and anything short of a server error (or a transport
/// failure) counts as working TLS.
pub async fn check_ssl(client: &Client, url: &Url) -> bool {
    if url.scheme() != "https" {
        return false;
    }
    match client.head(url.clone()).send().await {
        Ok(response) => response.status().as_u16() < 500,
        Err(e) => {
            tracing::debug!(url = %url, error = %e, "TLS probe failed");
            false
        }
    }
}

/// Resolves the first redirect target of a shortener URL.
///
/// Returns `None` when the response is not a redirect or the request
/// fails.
pub async fn resolve_shortener_target(client: &Client, url: &Url) -> Option<String> {
    let response = client.head(url.clone()).send().await.ok()?;
    if !response.status().is_redirection() {
        return None;
    }
    response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

/// Estimates a domain's age in days without a registry lookup.
///
/// Long-established domains are treated as old; disposable free TLDs and
/// digit-heavy hostnames as recently registered. Each heuristic class
/// maps to a fixed representative value so estimates are deterministic.
pub fn estimate_domain_age_days(host: &str) -> Option<u32> {
    if host.is_empty() {
        return None;
    }
    if ESTABLISHED_DOMAINS.iter().any(|d| host.contains(d)) {
        return Some(AGE_ESTABLISHED);
    }
    if DISPOSABLE_TLDS.iter().any(|tld| host.ends_with(tld)) {
        return Some(AGE_DISPOSABLE_TLD);
    }
    if DIGIT_HEAVY_HOST.is_match(host) {
        return Some(AGE_DIGIT_HEAVY);
    }
    Some(AGE_DEFAULT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ip_literal_detection() {
        assert!(is_ip_literal(&Url::parse("http://192.168.0.1/a").unwrap()));
        assert!(is_ip_literal(&Url::parse("http://[::1]/a").unwrap()));
        assert!(!is_ip_literal(&Url::parse("https://example.com/").unwrap()));
    }

    #[test]
    fn test_domain_age_is_deterministic() {
        assert_eq!(estimate_domain_age_days("www.google.com"), Some(AGE_ESTABLISHED));
        assert_eq!(estimate_domain_age_days("free-stuff.tk"), Some(AGE_DISPOSABLE_TLD));
        assert_eq!(estimate_domain_age_days("promo12345.example"), Some(AGE_DIGIT_HEAVY));
        assert_eq!(estimate_domain_age_days("ordinary.example"), Some(AGE_DEFAULT));
        assert_eq!(estimate_domain_age_days(""), None);

        assert_eq!(
            estimate_domain_age_days("ordinary.example"),
            estimate_domain_age_days("ordinary.example")
        );
    }

    #[test]
    fn test_age_classes_respect_classifier_bands() {
        // The disposable-TLD estimate lands in the <30 band, digit-heavy
        // in the <90 band, default outside both.
        assert!(AGE_DISPOSABLE_TLD < 30);
        assert!((30..90).contains(&AGE_DIGIT_HEAVY));
        assert!(AGE_DEFAULT >= 90);
    }
}
