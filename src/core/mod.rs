//! Core types for the vetkit library.
//!
//! This module provides the fundamental building blocks used throughout
//! the library:
//!
//! - [`types`] - Common types like `RiskLevel`, `RiskAssessment`, `DigestSet`
//! - [`error`] - Structured error types
//! - [`input`] - File payload abstraction
//! - [`digest`] - Fixed-algorithm content digests
//! - [`result`] - Analysis result structures

pub mod digest;
pub mod error;
pub mod input;
pub mod result;
pub mod types;

// Re-export commonly used types at the core level
pub use digest::ContentDigester;
pub use error::{AnalysisError, AnalysisResult};
pub use input::FilePayload;
pub use result::{
    FileScanResult, ResolvedUrl, UrlAnalysis, WorkbookCategory, WorkbookFinding,
    WorkbookScanResult,
};
pub use types::{DigestSet, RiskAssessment, RiskLevel, Severity, SniffedFormat};
