//! Per-request orchestration.
//!
//! The `ArtifactAnalyzer` validates input, fans independent URL probes
//! out concurrently with per-probe timeouts, runs the file pipeline, and
//! assembles the final verdicts.

mod artifact_analyzer;

pub use artifact_analyzer::{AnalyzerConfig, ArtifactAnalyzer, ArtifactAnalyzerBuilder};
