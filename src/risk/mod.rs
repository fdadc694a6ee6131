//! The risk classifier.
//!
//! Converts heuristic signals into a bounded numeric score and a
//! discrete risk level. Two scales coexist deliberately: URL analysis
//! scores on 0–10 with three levels, file and workbook analysis score on
//! 0–20 with four levels. Both classifiers are pure functions — identical
//! inputs always yield identical assessments, with no hidden state.

use crate::core::types::{RiskAssessment, RiskLevel};
use crate::signatures::file::FileFinding;

use std::time::Duration;

/// Ceiling for URL-context scores.
pub const URL_SCORE_CAP: u32 = 10;

/// Ceiling for file-context scores.
pub const FILE_SCORE_CAP: u32 = 20;

/// Flat score added when the malware determination is positive.
pub const MALWARE_WEIGHT: u32 = 10;

/// Latency above which a URL is considered suspiciously slow.
pub const SLOW_RESPONSE: Duration = Duration::from_millis(5000);

/// Heuristic signals feeding the URL classifier.
///
/// Every signal has a safe default (`false`/`None`/zero) so a failed
/// probe never blocks classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlSignals {
    /// TLS present and answering.
    pub ssl: bool,
    /// Host is a raw IP literal.
    pub ip_literal: bool,
    /// Host is a known shortener.
    pub shortener: bool,
    /// Number of suspicious URL patterns matched.
    pub suspicious_pattern_count: usize,
    /// Estimated domain age in days, when available.
    pub domain_age_days: Option<u32>,
    /// Malware verdict from reputation providers.
    pub malware_verdict: bool,
    /// Phishing verdict from reputation providers.
    pub phishing_verdict: bool,
    /// Number of redirects followed during resolution.
    pub redirect_count: usize,
    /// Resolution latency.
    pub latency: Duration,
}

impl Default for UrlSignals {
    fn default() -> Self {
        Self {
            ssl: true,
            ip_literal: false,
            shortener: false,
            suspicious_pattern_count: 0,
            domain_age_days: None,
            malware_verdict: false,
            phishing_verdict: false,
            redirect_count: 0,
            latency: Duration::ZERO,
        }
    }
}

/// Maps a URL-context score to its level.
pub fn url_level_for(score: u32) -> RiskLevel {
    match score {
        0..=2 => RiskLevel::Low,
        3..=6 => RiskLevel::Medium,
        _ => RiskLevel::High,
    }
}

/// Maps a file-context score to its level.
pub fn file_level_for(score: u32) -> RiskLevel {
    match score {
        s if s >= 15 => RiskLevel::Critical,
        s if s >= 10 => RiskLevel::High,
        s if s >= 5 => RiskLevel::Medium,
        _ => RiskLevel::Low,
    }
}

/// Classifies a URL from its heuristic signals.
///
/// Scoring is additive and order-independent: +3 without TLS, +4 for an
/// IP-literal host, +2 for a shortener, +1 per suspicious pattern, +3
/// for a domain younger than 30 days (+1 if younger than 90), +5 per
/// malware/phishing verdict, +2 for more than two redirects, +1 for a
/// response slower than five seconds. The score is clamped to 10.
pub fn classify_url(signals: &UrlSignals) -> RiskAssessment {
    let mut score = 0u32;
    let mut factors = Vec::new();

    if !signals.ssl {
        score += 3;
        factors.push("no TLS on the connection".to_string());
    }

    if signals.ip_literal {
        score += 4;
        factors.push("host is a raw IP address".to_string());
    }

    if signals.shortener {
        score += 2;
        factors.push("host is a known URL shortener".to_string());
    }

    if signals.suspicious_pattern_count > 0 {
        score += signals.suspicious_pattern_count as u32;
        factors.push(format!(
            "{} suspicious pattern(s) matched",
            signals.suspicious_pattern_count
        ));
    }

    match signals.domain_age_days {
        Some(age) if age < 30 => {
            score += 3;
            factors.push("domain registered fewer than 30 days ago".to_string());
        }
        Some(age) if age < 90 => {
            score += 1;
            factors.push("domain registered fewer than 90 days ago".to_string());
        }
        _ => {}
    }

    if signals.malware_verdict {
        score += 5;
        factors.push("flagged as malware by a reputation provider".to_string());
    }

    if signals.phishing_verdict {
        score += 5;
        factors.push("flagged as phishing by a reputation provider".to_string());
    }

    if signals.redirect_count > 2 {
        score += 2;
        factors.push(format!(
            "{} redirects in the chain",
            signals.redirect_count
        ));
    }

    if signals.latency > SLOW_RESPONSE {
        score += 1;
        factors.push("response latency above 5000 ms".to_string());
    }

    let score = score.min(URL_SCORE_CAP);
    RiskAssessment::new(score, url_level_for(score), factors)
}

/// Scores file-scanner findings into a 0–20 assessment.
///
/// The score is a severity-weighted sum over the rule table, plus a flat
/// addition when the malware determination is positive, clamped to 20.
pub fn score_file_findings(findings: &[FileFinding], malware_detected: bool) -> RiskAssessment {
    let mut score = 0u32;
    let mut factors = Vec::with_capacity(findings.len());

    for finding in findings {
        score += finding.category.rule().weight;
        factors.push(finding.description.clone());
    }

    if malware_detected {
        score += MALWARE_WEIGHT;
        factors.push("multiple malware indicators present".to_string());
    }

    let score = score.min(FILE_SCORE_CAP);
    RiskAssessment::new(score, file_level_for(score), factors)
}

/// Rebuilds a file assessment after merging workbook findings, taking
/// the maximum of the file-heuristic score and the workbook risk score
/// on the file scale.
pub fn merge_workbook_score(
    file_assessment: &RiskAssessment,
    workbook_score: u32,
    workbook_factors: Vec<String>,
) -> RiskAssessment {
    let score = file_assessment
        .score
        .max(workbook_score.min(FILE_SCORE_CAP));
    let mut factors = file_assessment.contributing_factors.clone();
    factors.extend(workbook_factors);
    RiskAssessment::new(score, file_level_for(score), factors)
}
