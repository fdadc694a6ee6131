//! Audit event types and emission functions.

use crate::core::result::{FileScanResult, UrlAnalysis};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Base trait for audit events.
pub trait AuditEvent: Serialize {
    /// Returns the event type name.
    fn event_type(&self) -> &'static str;

    /// Returns the timestamp of the event.
    fn timestamp(&self) -> DateTime<Utc>;
}

/// Audit event for a completed URL analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlAuditEvent {
    /// Event type.
    pub event_type: String,

    /// Timestamp of the event.
    pub timestamp: DateTime<Utc>,

    /// Unique analysis ID.
    pub analysis_id: String,

    /// The URL as submitted (after normalization).
    pub url: String,

    /// The final URL after redirects.
    pub final_url: String,

    /// Number of redirects followed.
    pub redirect_count: usize,

    /// Risk score on the URL scale.
    pub risk_score: u32,

    /// Risk level.
    pub risk_level: String,

    /// Whether malware was detected.
    pub malware_detected: bool,

    /// Whether phishing was detected.
    pub phishing_detected: bool,
}

impl AuditEvent for UrlAuditEvent {
    fn event_type(&self) -> &'static str {
        "url_analysis"
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Audit event for a completed file scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileAuditEvent {
    /// Event type.
    pub event_type: String,

    /// Timestamp of the event.
    pub timestamp: DateTime<Utc>,

    /// Scanned filename.
    pub filename: String,

    /// SHA256 of the content.
    pub sha256: String,

    /// Payload size in bytes.
    pub size_bytes: u64,

    /// Risk score on the file scale.
    pub risk_score: u32,

    /// Risk level.
    pub risk_level: String,

    /// Whether the malware determination was positive.
    pub malware_detected: bool,

    /// Number of findings recorded.
    pub finding_count: usize,

    /// Whether the payload was an archive.
    pub is_archive: bool,
}

impl AuditEvent for FileAuditEvent {
    fn event_type(&self) -> &'static str {
        "file_scan"
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Emits an audit event for a completed URL analysis.
pub fn emit_url_analysis(analysis: &UrlAnalysis) {
    tracing::info!(
        target: "vetkit::audit",
        event_type = "url_analysis",
        analysis_id = %analysis.id,
        url = %analysis.resolved.original,
        final_url = %analysis.resolved.final_url,
        redirect_count = analysis.resolved.redirect_count(),
        risk_score = analysis.assessment.score,
        risk_level = %analysis.assessment.level,
        malware_detected = analysis.malware_detected,
        phishing_detected = analysis.phishing_detected,
        "URL analysis recorded"
    );
}

/// Emits an audit event for a completed file scan.
pub fn emit_file_scan(result: &FileScanResult) {
    tracing::info!(
        target: "vetkit::audit",
        event_type = "file_scan",
        filename = %result.filename,
        sha256 = %result.digests.sha256,
        size_bytes = result.size_bytes,
        risk_score = result.assessment.score,
        risk_level = %result.assessment.level,
        malware_detected = result.malware_detected,
        finding_count = result.suspicious_patterns.len(),
        is_archive = result.is_archive,
        "file scan recorded"
    );
}

/// Builds the serializable event for a URL analysis.
pub fn url_audit_event(analysis: &UrlAnalysis) -> UrlAuditEvent {
    UrlAuditEvent {
        event_type: "url_analysis".to_string(),
        timestamp: Utc::now(),
        analysis_id: analysis.id.clone(),
        url: analysis.resolved.original.clone(),
        final_url: analysis.resolved.final_url.clone(),
        redirect_count: analysis.resolved.redirect_count(),
        risk_score: analysis.assessment.score,
        risk_level: analysis.assessment.level.to_string(),
        malware_detected: analysis.malware_detected,
        phishing_detected: analysis.phishing_detected,
    }
}

/// Builds the serializable event for a file scan.
pub fn file_audit_event(result: &FileScanResult) -> FileAuditEvent {
    FileAuditEvent {
        event_type: "file_scan".to_string(),
        timestamp: Utc::now(),
        filename: result.filename.clone(),
        sha256: result.digests.sha256.clone(),
        size_bytes: result.size_bytes,
        risk_score: result.assessment.score,
        risk_level: result.assessment.level.to_string(),
        malware_detected: result.malware_detected,
        finding_count: result.suspicious_patterns.len(),
        is_archive: result.is_archive,
    }
}
