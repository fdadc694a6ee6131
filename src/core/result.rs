//! Analysis result structures.
//!
//! This module defines the result envelopes produced by the three
//! engines: URL resolution/analysis, file scanning, and workbook
//! scanning. Every result is owned exclusively by the request that
//! produced it and is immutable once returned.

use crate::core::types::{DigestSet, RiskAssessment, RiskLevel, Severity, SniffedFormat};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// The outcome of bounded redirect-chain resolution for one URL.
///
/// At most five fetch attempts are made, so `redirect_chain` holds at
/// most four pre-redirect URLs. `final_url` is the last successfully
/// fetched URL, or the last attempted URL when resolution stopped on a
/// network failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedUrl {
    /// The URL as submitted (after normalization).
    pub original: String,

    /// The last fetched or attempted URL.
    pub final_url: String,

    /// Every URL visited before being redirected, in order.
    pub redirect_chain: Vec<String>,

    /// HTTP status of the last completed response, if any.
    pub status_code: Option<u16>,

    /// Response headers of the last completed response, keys lowercased.
    pub response_headers: HashMap<String, String>,

    /// Content type of the last completed response.
    pub content_type: Option<String>,

    /// Page title extracted from markup responses, when available.
    pub page_title: Option<String>,

    /// Wall-clock time spent resolving.
    #[serde(with = "duration_millis")]
    pub elapsed: Duration,
}

impl ResolvedUrl {
    /// Builds the degraded result used when resolution never completed
    /// a single fetch (for example on a probe timeout).
    pub fn unresolved(url: impl Into<String>, elapsed: Duration) -> Self {
        let url = url.into();
        Self {
            original: url.clone(),
            final_url: url,
            redirect_chain: Vec::new(),
            status_code: None,
            response_headers: HashMap::new(),
            content_type: None,
            page_title: None,
            elapsed,
        }
    }

    /// Number of redirects followed.
    pub fn redirect_count(&self) -> usize {
        self.redirect_chain.len()
    }
}

/// The complete verdict for one analyzed URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlAnalysis {
    /// Unique identifier for this analysis.
    pub id: String,

    /// Redirect-chain resolution outcome.
    pub resolved: ResolvedUrl,

    /// Whether the URL uses TLS and the host answered over it.
    pub ssl: bool,

    /// Whether the host is a raw IP literal.
    pub ip_literal: bool,

    /// Whether the host is a known URL shortener.
    pub shortener: bool,

    /// Names of matched suspicious URL patterns, in table order.
    pub suspicious_patterns: Vec<String>,

    /// Estimated domain age in days, when an estimate was possible.
    pub domain_age_days: Option<u32>,

    /// Whether any reputation or blocklist provider flagged the URL as malware.
    pub malware_detected: bool,

    /// Whether any reputation provider flagged the URL as phishing.
    pub phishing_detected: bool,

    /// Resolved target when the URL belongs to a shortener.
    pub shortener_target: Option<String>,

    /// The scored verdict.
    pub assessment: RiskAssessment,

    /// When the analysis completed.
    pub analyzed_at: DateTime<Utc>,
}

/// The outcome of statically scanning one file payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileScanResult {
    /// Original filename (archive entries keep their internal path).
    pub filename: String,

    /// Payload size in bytes.
    pub size_bytes: u64,

    /// Declared terminal extension, lowercased.
    pub declared_extension: String,

    /// MIME type inferred from the declared extension.
    pub mime_type: String,

    /// Format inferred from the leading bytes.
    pub sniffed_type: SniffedFormat,

    /// Fixed-algorithm digests over the full content.
    pub digests: DigestSet,

    /// Heuristic findings, in evaluation order.
    pub suspicious_patterns: Vec<String>,

    /// Whether the malware determination was positive.
    pub malware_detected: bool,

    /// Whether the declared extension marks this as an archive.
    pub is_archive: bool,

    /// Scan results for archive entries.
    ///
    /// `Some` iff `is_archive` and extraction succeeded; `None` on an
    /// archive signals extraction failure, not an empty archive.
    pub archive_entries: Option<Vec<FileScanResult>>,

    /// Workbook scan result when the payload is a spreadsheet.
    pub workbook_findings: Option<WorkbookScanResult>,

    /// The scored verdict (0–20 scale).
    pub assessment: RiskAssessment,

    /// When the scan completed.
    pub scanned_at: DateTime<Utc>,

    /// How long the scan took, including nested entries.
    #[serde(with = "duration_millis")]
    pub scan_duration: Duration,
}

impl FileScanResult {
    /// Returns `true` if this result or any nested entry was flagged as malware.
    pub fn any_malware(&self) -> bool {
        self.malware_detected
            || self
                .archive_entries
                .iter()
                .flatten()
                .any(FileScanResult::any_malware)
    }
}

/// Category of a workbook finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkbookCategory {
    /// Embedded macro program payload.
    Macro,
    /// External workbook/URI/UNC reference.
    ExternalLink,
    /// Hidden sheet, row, or column.
    HiddenContent,
    /// Use of an I/O- or execution-capable function.
    MaliciousFormula,
    /// Embedded OLE or foreign object.
    EmbeddedObject,
    /// DDE invocation shape.
    DdeAttack,
    /// Command-line argument shape.
    CommandInjection,
    /// Anything else, including parse failures and auto-exec names.
    SuspiciousPattern,
}

/// A single workbook finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkbookFinding {
    /// What kind of threat indicator this is.
    pub category: WorkbookCategory,

    /// Severity of the indicator.
    pub severity: Severity,

    /// Cell or sheet where the indicator was found, e.g. `Sheet1!B2`.
    pub location: Option<String>,

    /// Human-readable description.
    pub description: String,

    /// Up to 100 characters of the matched content.
    pub snippet: Option<String>,
}

/// The outcome of scanning one workbook.
///
/// `risk_score` is strictly additive across findings and capped at a
/// fixed ceiling before level mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkbookScanResult {
    /// Number of sheets declared by the workbook.
    pub sheet_count: usize,

    /// Number of formula-bearing cells observed.
    pub formula_count: usize,

    /// Whether a macro program payload is embedded.
    pub has_macros: bool,

    /// Whether any sheet is marked hidden.
    pub has_hidden_sheets: bool,

    /// Whether any row or column is marked hidden.
    pub has_hidden_cell_ranges: bool,

    /// Whether any cell or hyperlink references an external resource.
    pub has_external_links: bool,

    /// Number of external references observed.
    pub external_link_count: usize,

    /// Whether the workbook declares embedded objects.
    pub has_embedded_objects: bool,

    /// Whether any cell matched a DDE invocation shape.
    pub has_formula_injection: bool,

    /// Whether any cell matched a command-line argument shape.
    pub has_shell_command_pattern: bool,

    /// All findings, in evaluation order.
    pub findings: Vec<WorkbookFinding>,

    /// Additive risk score, capped.
    pub risk_score: u32,

    /// Risk level mapped from the score.
    pub risk_level: RiskLevel,
}

/// Serde helper serializing `Duration` as integer milliseconds.
pub(crate) mod duration_millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
