//! URL signature tables.
//!
//! Static rule sets consulted by the URL engine: suspicious URL shapes,
//! shortener domains, and the domain lists backing the age estimator.
//! All tables are immutable after first use and safe for unsynchronized
//! concurrent reads.

use once_cell::sync::Lazy;
use regex::Regex;

/// A suspicious URL shape with its human-readable name.
#[derive(Debug)]
pub struct UrlPattern {
    /// Compiled matcher.
    pub pattern: Regex,
    /// Name surfaced in findings.
    pub name: &'static str,
}

/// Suspicious URL shapes, matched against the URL plus any page title.
pub static SUSPICIOUS_URL_PATTERNS: Lazy<Vec<UrlPattern>> = Lazy::new(|| {
    [
        (
            r"bit\.ly|tinyurl|goo\.gl|t\.co|short\.link|ow\.ly|is\.gd",
            "shortener fragment in URL",
        ),
        (
            r"[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}",
            "embedded IP address",
        ),
        (r"[a-z0-9]{15,}\.com", "unusually long random hostname"),
        (r"[0-9]{5,}", "excessive digit run"),
        (
            r"secure-|bank-|paypal-|amazon-|apple-|microsoft-",
            "brand-prefix phishing keyword",
        ),
        (r"\.tk$|\.ml$|\.ga$|\.cf$|\.pw$", "disposable free TLD"),
        (
            r"login|signin|verify|update|suspended|limited",
            "credential-harvest path keyword",
        ),
        (r"[a-z]+-[0-9]+\.", "auto-generated hostname pattern"),
        (
            r"\d{1,3}-\d{1,3}-\d{1,3}-\d{1,3}",
            "dash-separated IP variant",
        ),
    ]
    .into_iter()
    .map(|(pattern, name)| UrlPattern {
        pattern: Regex::new(pattern).expect("URL pattern compiles"),
        name,
    })
    .collect()
});

/// Returns the names of every suspicious pattern matching `text`, in
/// table order.
pub fn match_suspicious_patterns(text: &str) -> Vec<String> {
    SUSPICIOUS_URL_PATTERNS
        .iter()
        .filter(|entry| entry.pattern.is_match(text))
        .map(|entry| entry.name.to_string())
        .collect()
}

/// Domains whose sole function is redirecting short paths to long URLs.
pub const URL_SHORTENERS: &[&str] = &[
    "bit.ly",
    "tinyurl.com",
    "goo.gl",
    "t.co",
    "short.link",
    "ow.ly",
    "is.gd",
    "buff.ly",
    "rebrand.ly",
    "tiny.cc",
    "tr.im",
    "snurl.com",
    "x.co",
    "smarturl.it",
    "cutt.ly",
];

/// Returns `true` if the host belongs to a known shortener.
pub fn is_shortener_host(host: &str) -> bool {
    URL_SHORTENERS.iter().any(|s| host.contains(s))
}

/// Long-established domains, treated as old by the age estimator.
pub const ESTABLISHED_DOMAINS: &[&str] = &[
    "google.com",
    "naver.com",
    "youtube.com",
    "facebook.com",
    "twitter.com",
    "amazon.com",
    "microsoft.com",
    "apple.com",
    "wikipedia.org",
    "github.com",
];

/// TLDs handed out for free, heavily used by throwaway phishing domains.
pub const DISPOSABLE_TLDS: &[&str] = &[".tk", ".ml", ".ga", ".cf", ".pw"];

/// Matches hostnames carrying a long digit run.
pub static DIGIT_HEAVY_HOST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9]{5,}").expect("digit pattern compiles"));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shortener_lookup() {
        assert!(is_shortener_host("bit.ly"));
        assert!(is_shortener_host("www.tinyurl.com"));
        assert!(!is_shortener_host("example.com"));
    }

    #[test]
    fn test_pattern_matching_order_and_names() {
        let matches = match_suspicious_patterns("http://192.168.0.1/login");
        assert!(matches.contains(&"embedded IP address".to_string()));
        assert!(matches.contains(&"credential-harvest path keyword".to_string()));
    }

    #[test]
    fn test_clean_url_matches_nothing() {
        assert!(match_suspicious_patterns("https://example.org/about").is_empty());
    }

    #[test]
    fn test_brand_prefix_keyword() {
        let matches = match_suspicious_patterns("https://paypal-account.example.com/");
        assert!(matches.contains(&"brand-prefix phishing keyword".to_string()));
    }
}
