//! The main artifact analyzer.
//!
//! Owns per-request orchestration: input validation and normalization,
//! the concurrent fan-out of independent URL probes, and the file scan
//! pipeline. Probes are joined with a per-probe timeout and every probe
//! degrades to a benign default on failure; only invalid input ever
//! surfaces as an error.

use crate::core::error::AnalysisError;
use crate::core::input::FilePayload;
use crate::core::result::{FileScanResult, ResolvedUrl, UrlAnalysis};
use crate::file::{FileScanner, FileScannerConfig};
use crate::intel::{
    ArcBlocklistProvider, ArcReputationProvider, BlocklistProvider, UrlReputationProvider,
    UrlVerdict,
};
use crate::risk::{classify_url, UrlSignals};
use crate::signatures::url::{is_shortener_host, match_suspicious_patterns};
use crate::url::probes;
use crate::url::{ResolverConfig, UrlResolver};

use chrono::Utc;
use futures::future::join_all;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Configuration for the artifact analyzer.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Timeout applied to each independent probe.
    pub probe_timeout: Duration,

    /// Maximum accepted payload size.
    pub max_file_size: u64,

    /// URL resolver configuration.
    pub resolver: ResolverConfig,

    /// File scanner configuration.
    pub file: FileScannerConfig,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            probe_timeout: Duration::from_secs(10),
            max_file_size: 100 * 1024 * 1024, // 100 MB
            resolver: ResolverConfig::default(),
            file: FileScannerConfig::default(),
        }
    }
}

impl AnalyzerConfig {
    /// Creates a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the per-probe timeout.
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Sets the maximum accepted payload size.
    pub fn with_max_file_size(mut self, size: u64) -> Self {
        self.max_file_size = size;
        self
    }

    /// Sets the resolver configuration.
    pub fn with_resolver(mut self, resolver: ResolverConfig) -> Self {
        self.resolver = resolver;
        self
    }

    /// Sets the file scanner configuration.
    pub fn with_file_scanner(mut self, file: FileScannerConfig) -> Self {
        self.file = file;
        self
    }
}

/// Builder for creating an `ArtifactAnalyzer`.
pub struct ArtifactAnalyzerBuilder {
    reputation: Vec<ArcReputationProvider>,
    blocklists: Vec<ArcBlocklistProvider>,
    config: AnalyzerConfig,
}

impl ArtifactAnalyzerBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            reputation: Vec::new(),
            blocklists: Vec::new(),
            config: AnalyzerConfig::default(),
        }
    }

    /// Adds a URL reputation provider.
    pub fn with_reputation_provider<P: UrlReputationProvider + 'static>(
        mut self,
        provider: P,
    ) -> Self {
        self.reputation.push(Arc::new(provider));
        self
    }

    /// Adds a blocklist provider.
    pub fn with_blocklist_provider<P: BlocklistProvider + 'static>(mut self, provider: P) -> Self {
        self.blocklists.push(Arc::new(provider));
        self
    }

    /// Sets the configuration.
    pub fn with_config(mut self, config: AnalyzerConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the analyzer.
    pub fn build(self) -> Result<ArtifactAnalyzer, AnalysisError> {
        let resolver = UrlResolver::new(self.config.resolver.clone())?;
        Ok(ArtifactAnalyzer {
            resolver,
            reputation: self.reputation,
            blocklists: self.blocklists,
            file_scanner: FileScanner::with_config(self.config.file.clone()),
            config: self.config,
        })
    }
}

impl Default for ArtifactAnalyzerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Inspects URLs and file payloads and produces structured risk
/// verdicts, without executing or rendering anything.
pub struct ArtifactAnalyzer {
    resolver: UrlResolver,
    reputation: Vec<ArcReputationProvider>,
    blocklists: Vec<ArcBlocklistProvider>,
    file_scanner: FileScanner,
    config: AnalyzerConfig,
}

impl ArtifactAnalyzer {
    /// Creates a new builder.
    pub fn builder() -> ArtifactAnalyzerBuilder {
        ArtifactAnalyzerBuilder::new()
    }

    /// Returns a reference to the configuration.
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyzes one URL.
    ///
    /// The input is normalized (a missing scheme defaults to `https`)
    /// and validated before any network call; malformed input is
    /// rejected immediately. All probes then run concurrently, each
    /// bounded by the probe timeout and degrading to a benign default
    /// on failure.
    pub async fn analyze_url(&self, raw: &str) -> Result<UrlAnalysis, AnalysisError> {
        let url = normalize_url(raw)?;
        let host = url.host_str().unwrap_or_default().to_string();
        let shortener = is_shortener_host(&host);
        let timeout = self.config.probe_timeout;

        tracing::info!(url = %url, "starting URL analysis");

        let resolve_fut = async {
            match tokio::time::timeout(timeout, self.resolver.resolve(&url)).await {
                Ok(resolved) => resolved,
                Err(_) => {
                    tracing::debug!(url = %url, "resolution timed out");
                    ResolvedUrl::unresolved(url.as_str(), timeout)
                }
            }
        };

        let ssl_fut = probe_or(timeout, probes::check_ssl(self.resolver.client(), &url), false);

        let reputation_fut = async {
            let lookups = self
                .reputation
                .iter()
                .map(|provider| probe_or(timeout, provider.lookup(&url), UrlVerdict::BENIGN));
            join_all(lookups)
                .await
                .into_iter()
                .fold(UrlVerdict::BENIGN, UrlVerdict::merge)
        };

        let blocklist_fut = async {
            let lookups = self
                .blocklists
                .iter()
                .map(|provider| probe_or(timeout, provider.is_listed(&url), false));
            join_all(lookups).await.into_iter().any(|listed| listed)
        };

        let shortener_fut = async {
            if shortener {
                probe_or(
                    timeout,
                    probes::resolve_shortener_target(self.resolver.client(), &url),
                    None,
                )
                .await
            } else {
                None
            }
        };

        let (resolved, ssl, verdict, blocklisted, shortener_target) = tokio::join!(
            resolve_fut,
            ssl_fut,
            reputation_fut,
            blocklist_fut,
            shortener_fut
        );

        let domain_age_days = probes::estimate_domain_age_days(&host);
        let ip_literal = probes::is_ip_literal(&url);

        // Patterns match against the URL plus the page title, when one
        // was captured.
        let pattern_text = match &resolved.page_title {
            Some(title) => format!("{url} {title}"),
            None => url.to_string(),
        };
        let suspicious_patterns = match_suspicious_patterns(&pattern_text);

        let malware_detected = verdict.malware || blocklisted;
        let phishing_detected = verdict.phishing;

        let signals = UrlSignals {
            ssl,
            ip_literal,
            shortener,
            suspicious_pattern_count: suspicious_patterns.len(),
            domain_age_days,
            malware_verdict: malware_detected,
            phishing_verdict: phishing_detected,
            redirect_count: resolved.redirect_count(),
            latency: resolved.elapsed,
        };
        let assessment = classify_url(&signals);

        let analysis = UrlAnalysis {
            id: uuid::Uuid::new_v4().to_string(),
            resolved,
            ssl,
            ip_literal,
            shortener,
            suspicious_patterns,
            domain_age_days,
            malware_detected,
            phishing_detected,
            shortener_target,
            assessment,
            analyzed_at: Utc::now(),
        };

        tracing::info!(
            url = %url,
            risk_score = analysis.assessment.score,
            risk_level = %analysis.assessment.level,
            "URL analysis completed"
        );
        crate::audit::emit_url_analysis(&analysis);

        Ok(analysis)
    }

    /// Scans a batch of file payloads.
    ///
    /// An empty batch and oversized payloads are rejected before any
    /// scanning starts; results come back in submission order.
    pub async fn scan_files(
        &self,
        payloads: &[FilePayload],
    ) -> Result<Vec<FileScanResult>, AnalysisError> {
        if payloads.is_empty() {
            return Err(AnalysisError::EmptyFileSet);
        }
        for payload in payloads {
            let size = payload.len() as u64;
            if size > self.config.max_file_size {
                return Err(AnalysisError::FileTooLarge {
                    size,
                    max: self.config.max_file_size,
                });
            }
        }

        let mut results = Vec::with_capacity(payloads.len());
        for payload in payloads {
            tracing::info!(filename = payload.filename(), size = payload.len(), "starting file scan");
            let result = self.file_scanner.scan(payload).await;
            tracing::info!(
                filename = payload.filename(),
                risk_score = result.assessment.score,
                risk_level = %result.assessment.level,
                malware = result.malware_detected,
                "file scan completed"
            );
            crate::audit::emit_file_scan(&result);
            results.push(result);
        }
        Ok(results)
    }
}

impl std::fmt::Debug for ArtifactAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactAnalyzer")
            .field("reputation_providers", &self.reputation.len())
            .field("blocklist_providers", &self.blocklists.len())
            .field("config", &self.config)
            .finish()
    }
}

/// Runs a probe with a timeout, returning the default on expiry.
async fn probe_or<T, F>(timeout: Duration, probe: F, default: T) -> T
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(timeout, probe).await {
        Ok(value) => value,
        Err(_) => default,
    }
}

/// Normalizes and validates a raw URL string.
///
/// A missing scheme defaults to `https`; anything that does not parse
/// as an absolute HTTP(S) URL with a host is rejected before any
/// network call.
pub(crate) fn normalize_url(raw: &str) -> Result<Url, AnalysisError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AnalysisError::MissingUrl);
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let url = Url::parse(&candidate).map_err(|e| AnalysisError::invalid_url(e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(AnalysisError::invalid_url(format!(
            "unsupported scheme '{}'",
            url.scheme()
        )));
    }
    if url.host_str().map(str::is_empty).unwrap_or(true) {
        return Err(AnalysisError::invalid_url("missing host"));
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::RiskLevel;
    use crate::intel::{MockBlocklist, MockReputation};

    fn fast_config() -> AnalyzerConfig {
        AnalyzerConfig::new()
            .with_probe_timeout(Duration::from_millis(500))
            .with_resolver(ResolverConfig::new().with_request_timeout(Duration::from_millis(300)))
    }

    #[test]
    fn test_normalize_prefixes_https() {
        let url = normalize_url("example.com/path").unwrap();
        assert_eq!(url.as_str(), "https://example.com/path");
    }

    #[test]
    fn test_normalize_keeps_http() {
        let url = normalize_url("http://example.com/").unwrap();
        assert_eq!(url.scheme(), "http");
    }

    #[test]
    fn test_normalize_rejects_bad_input() {
        assert!(matches!(
            normalize_url(""),
            Err(AnalysisError::MissingUrl)
        ));
        assert!(matches!(
            normalize_url("   "),
            Err(AnalysisError::MissingUrl)
        ));
        assert!(matches!(
            normalize_url("ftp://example.com/"),
            Err(AnalysisError::InvalidUrl { .. })
        ));
        assert!(matches!(
            normalize_url("http://"),
            Err(AnalysisError::InvalidUrl { .. })
        ));
        assert!(matches!(
            normalize_url("ht!tp://bad url"),
            Err(AnalysisError::InvalidUrl { .. })
        ));
    }

    #[tokio::test]
    async fn test_scan_files_rejects_empty_batch() {
        let analyzer = ArtifactAnalyzer::builder().build().unwrap();
        let result = analyzer.scan_files(&[]).await;
        assert!(matches!(result, Err(AnalysisError::EmptyFileSet)));
    }

    #[tokio::test]
    async fn test_scan_files_rejects_oversized_payload() {
        let analyzer = ArtifactAnalyzer::builder()
            .with_config(AnalyzerConfig::new().with_max_file_size(16))
            .build()
            .unwrap();
        let payloads = vec![FilePayload::new("big.bin", vec![0u8; 64])];
        let result = analyzer.scan_files(&payloads).await;
        assert!(matches!(result, Err(AnalysisError::FileTooLarge { .. })));
    }

    #[tokio::test]
    async fn test_scan_files_returns_results_in_order() {
        let analyzer = ArtifactAnalyzer::builder().build().unwrap();
        let payloads = vec![
            FilePayload::new("clean.txt", b"nothing here".to_vec()),
            FilePayload::new("invoice.pdf.exe", b"MZ\x90\x00".to_vec()),
        ];

        let results = analyzer.scan_files(&payloads).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].filename, "clean.txt");
        assert!(!results[0].malware_detected);
        assert_eq!(results[1].filename, "invoice.pdf.exe");
        assert!(results[1].malware_detected);
    }

    #[tokio::test]
    async fn test_analyze_url_degrades_probes_and_uses_intel() {
        // Reputation flags everything; resolution and TLS probes fail
        // fast on the reserved .invalid TLD and degrade to defaults.
        let analyzer = ArtifactAnalyzer::builder()
            .with_reputation_provider(MockReputation::new_flagging(UrlVerdict {
                malware: true,
                phishing: false,
            }))
            .with_blocklist_provider(MockBlocklist::new())
            .with_config(fast_config())
            .build()
            .unwrap();

        let analysis = analyzer
            .analyze_url("http://unreachable.invalid/login")
            .await
            .unwrap();

        // +3 no TLS, +1 credential-harvest path keyword, +5 malware.
        assert!(!analysis.ssl);
        assert!(analysis.malware_detected);
        assert!(!analysis.phishing_detected);
        assert_eq!(analysis.assessment.score, 9);
        assert_eq!(analysis.assessment.level, RiskLevel::High);
        assert!(analysis.resolved.status_code.is_none());
    }

    #[tokio::test]
    async fn test_analyze_url_blocklist_counts_as_malware() {
        let analyzer = ArtifactAnalyzer::builder()
            .with_blocklist_provider(
                MockBlocklist::new().with_listed("https://blocked.invalid/"),
            )
            .with_config(fast_config())
            .build()
            .unwrap();

        let analysis = analyzer.analyze_url("blocked.invalid").await.unwrap();
        assert!(analysis.malware_detected);
    }
}
