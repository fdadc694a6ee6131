//! # Vetkit
//!
//! Passive threat inspection for attacker-controlled artifacts: URLs,
//! uploaded files, and spreadsheet documents. Every artifact gets a
//! structured risk verdict without ever being executed, rendered, or
//! evaluated.
//!
//! ## Overview
//!
//! Vetkit provides three cooperating analysis engines behind one API:
//!
//! - Resolve a URL's redirect chain and score it from heuristic signals
//!   plus external reputation oracles
//! - Statically scan files: digests, magic-byte sniffing, filename
//!   heuristics, and recursive archive inspection
//! - Parse spreadsheet structure and match cell content against
//!   DDE/command-injection attack tables
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use vetkit::{ArtifactAnalyzer, FilePayload};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let analyzer = ArtifactAnalyzer::builder().build()?;
//!
//!     // Analyze a URL
//!     let analysis = analyzer.analyze_url("bit.ly/2x4fZk").await?;
//!     println!("{}: {}", analysis.assessment.score, analysis.assessment.level);
//!
//!     // Scan an upload
//!     let payload = FilePayload::new("invoice.pdf.exe", std::fs::read("upload.bin")?);
//!     let results = analyzer.scan_files(&[payload]).await?;
//!     if results[0].malware_detected {
//!         println!("malware indicators present");
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! The library is organized into several layers:
//!
//! - **Core**: Fundamental types, payloads, digests, and error handling
//! - **Signatures**: Process-wide read-only rule tables
//! - **Risk**: The pure classifier mapping signals to scores and levels
//! - **Url**: Redirect-chain resolution and independent probes
//! - **Intel**: Black-box reputation and blocklist adapters
//! - **File**: Static file and archive scanning
//! - **Workbook**: Spreadsheet structure parsing and attack-pattern checks
//! - **Analyzer**: Per-request orchestration with concurrent probe fan-out
//! - **Audit**: Structured analysis events for any tracing subscriber

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod analyzer;
pub mod audit;
pub mod core;
pub mod file;
pub mod intel;
pub mod risk;
pub mod signatures;
pub mod url;
pub mod workbook;

// Re-export commonly used types at the crate root
pub use crate::analyzer::{AnalyzerConfig, ArtifactAnalyzer, ArtifactAnalyzerBuilder};
pub use crate::core::{
    AnalysisError, ContentDigester, DigestSet, FilePayload, FileScanResult, ResolvedUrl,
    RiskAssessment, RiskLevel, Severity, SniffedFormat, UrlAnalysis, WorkbookFinding,
    WorkbookScanResult,
};
pub use crate::file::{ArchiveLimits, FileScanner, FileScannerConfig};
pub use crate::intel::{BlocklistProvider, UrlReputationProvider, UrlVerdict};
pub use crate::url::{ResolverConfig, UrlResolver};
pub use crate::workbook::WorkbookScanner;

/// Prelude module for convenient imports.
///
/// ```rust
/// use vetkit::prelude::*;
/// ```
pub mod prelude {
    pub use crate::analyzer::{AnalyzerConfig, ArtifactAnalyzer, ArtifactAnalyzerBuilder};
    pub use crate::core::{
        AnalysisError, FilePayload, FileScanResult, ResolvedUrl, RiskAssessment, RiskLevel,
        Severity, UrlAnalysis, WorkbookScanResult,
    };
    pub use crate::file::{FileScanner, FileScannerConfig};
    pub use crate::intel::{BlocklistProvider, UrlReputationProvider, UrlVerdict};
    pub use crate::url::{ResolverConfig, UrlResolver};
    pub use crate::workbook::WorkbookScanner;
}
