//! Core types used throughout the vetkit library.
//!
//! This module defines the fundamental data structures shared by the
//! analysis engines: risk levels, finding severities, risk assessments,
//! and content digests.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Overall risk level assigned to an analyzed artifact.
///
/// URL analysis only produces `Low`, `Medium`, or `High`; file and
/// workbook analysis may additionally produce `Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// No meaningful risk indicators.
    Low,
    /// Some risk indicators; caution advised.
    Medium,
    /// Strong risk indicators.
    High,
    /// Severe indicators requiring immediate attention (file/workbook contexts only).
    Critical,
}

impl RiskLevel {
    /// Returns `true` if the level is `Medium` or above.
    pub fn is_elevated(&self) -> bool {
        *self >= Self::Medium
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// Severity of an individual finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational or low-impact observation.
    Low,
    /// Suspicious but not directly harmful on its own.
    Medium,
    /// Strongly associated with malicious content.
    High,
    /// Directly attack-capable content.
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// A scored risk verdict for a single analyzed artifact.
///
/// The score scale depends on the producing engine: the URL classifier
/// clamps to 10, the file scanner clamps to 20. `level` is always a pure
/// monotonic function of `score` for the producing engine's thresholds.
/// An assessment is created once per analysis and never mutated; callers
/// build a new assessment if signals change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Clamped numeric score.
    pub score: u32,

    /// Discrete risk level derived from the score.
    pub level: RiskLevel,

    /// Human-readable reasons behind the score, in evaluation order.
    ///
    /// The presentation layer owns all formatting and localization of
    /// these strings.
    pub contributing_factors: Vec<String>,
}

impl RiskAssessment {
    /// Creates a new assessment.
    pub fn new(score: u32, level: RiskLevel, contributing_factors: Vec<String>) -> Self {
        Self {
            score,
            level,
            contributing_factors,
        }
    }

    /// Returns `true` if the level is `Medium` or above.
    pub fn is_elevated(&self) -> bool {
        self.level.is_elevated()
    }
}

/// Content digests over a file's full byte content.
///
/// The three algorithms are fixed: MD5 and SHA1 for compatibility with
/// external reputation systems, SHA256 as the primary identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DigestSet {
    /// MD5 digest, hex-encoded.
    pub md5: String,

    /// SHA1 digest, hex-encoded.
    pub sha1: String,

    /// SHA256 digest, hex-encoded.
    pub sha256: String,
}

impl DigestSet {
    /// Returns the primary digest (SHA256) for identity and deduplication.
    pub fn primary(&self) -> &str {
        &self.sha256
    }
}

impl fmt::Display for DigestSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sha256:{}", self.sha256)
    }
}

/// Binary format inferred from a file's leading bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SniffedFormat {
    /// Windows PE executable (`MZ` header).
    WindowsExecutable,
    /// Zip container (also the envelope of OOXML documents).
    ZipArchive,
    /// OLE compound file (legacy Office container).
    OleCompound,
    /// RAR archive.
    RarArchive,
    /// 7-Zip archive.
    SevenZipArchive,
    /// Gzip stream.
    GzipArchive,
    /// No recognized signature.
    Unknown,
}

impl SniffedFormat {
    /// Human-readable name of the format.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::WindowsExecutable => "Windows executable",
            Self::ZipArchive => "zip archive",
            Self::OleCompound => "OLE compound document",
            Self::RarArchive => "RAR archive",
            Self::SevenZipArchive => "7-Zip archive",
            Self::GzipArchive => "gzip stream",
            Self::Unknown => "unknown format",
        }
    }

    /// Returns `true` for container formats that can hold other files.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            Self::ZipArchive | Self::RarArchive | Self::SevenZipArchive | Self::GzipArchive
        )
    }
}

impl fmt::Display for SniffedFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_level_ordering() {
        assert!(RiskLevel::Low < RiskLevel::Medium);
        assert!(RiskLevel::Medium < RiskLevel::High);
        assert!(RiskLevel::High < RiskLevel::Critical);
        assert!(!RiskLevel::Low.is_elevated());
        assert!(RiskLevel::Medium.is_elevated());
    }

    #[test]
    fn test_severity_display() {
        assert_eq!(Severity::Critical.to_string(), "critical");
        assert_eq!(Severity::Low.to_string(), "low");
    }

    #[test]
    fn test_digest_set_display_uses_sha256() {
        let digests = DigestSet {
            md5: "a".into(),
            sha1: "b".into(),
            sha256: "c".into(),
        };
        assert_eq!(digests.to_string(), "sha256:c");
        assert_eq!(digests.primary(), "c");
    }

    #[test]
    fn test_sniffed_format_container() {
        assert!(SniffedFormat::ZipArchive.is_container());
        assert!(!SniffedFormat::WindowsExecutable.is_container());
        assert!(!SniffedFormat::OleCompound.is_container());
    }

    #[test]
    fn test_risk_level_serde_lowercase() {
        let json = serde_json::to_string(&RiskLevel::High).unwrap();
        assert_eq!(json, "\"high\"");
    }
}
