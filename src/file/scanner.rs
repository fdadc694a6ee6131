//! The static file scanner.
//!
//! Orchestrates digesting, type sniffing, filename/content heuristics,
//! the workbook sub-step for spreadsheet payloads, and recursive
//! re-scanning of archive entries. A parse or extraction failure in one
//! entry is recorded as a finding and never aborts its siblings.

use crate::core::digest::ContentDigester;
use crate::core::input::{extension_of, FilePayload};
use crate::core::result::{FileScanResult, WorkbookFinding};
use crate::file::archive::{extract_zip, ArchiveLimits, ExtractedEntry};
use crate::file::heuristics;
use crate::file::sniff::sniff_format;
use crate::risk;
use crate::signatures::file::{
    is_archive_extension, mime_for_extension, spreadsheet_kind, FileFinding, FileRuleCategory,
};
use crate::workbook::WorkbookScanner;

use chrono::Utc;
use futures::future::BoxFuture;
use futures::stream::{self, StreamExt};
use std::sync::atomic::AtomicUsize;
use std::time::Instant;

/// Configuration for the file scanner.
#[derive(Debug, Clone)]
pub struct FileScannerConfig {
    /// How many leading bytes the embedded-marker scan inspects.
    pub content_prefix_limit: usize,

    /// Archive traversal limits.
    pub archive: ArchiveLimits,
}

impl Default for FileScannerConfig {
    fn default() -> Self {
        Self {
            content_prefix_limit: 4096,
            archive: ArchiveLimits::default(),
        }
    }
}

impl FileScannerConfig {
    /// Creates a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the content-prefix scan limit.
    pub fn with_content_prefix_limit(mut self, limit: usize) -> Self {
        self.content_prefix_limit = limit;
        self
    }

    /// Sets the archive traversal limits.
    pub fn with_archive_limits(mut self, limits: ArchiveLimits) -> Self {
        self.archive = limits;
        self
    }
}

/// Scans file payloads without executing or rendering them.
#[derive(Debug, Default)]
pub struct FileScanner {
    config: FileScannerConfig,
    digester: ContentDigester,
    workbook: WorkbookScanner,
}

impl FileScanner {
    /// Creates a scanner with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a scanner with the given configuration.
    pub fn with_config(config: FileScannerConfig) -> Self {
        Self {
            config,
            digester: ContentDigester::new(),
            workbook: WorkbookScanner::new(),
        }
    }

    /// Returns a reference to the configuration.
    pub fn config(&self) -> &FileScannerConfig {
        &self.config
    }

    /// Scans one payload, recursing into archive entries.
    pub async fn scan(&self, payload: &FilePayload) -> FileScanResult {
        let entry_budget = AtomicUsize::new(0);
        self.scan_entry(payload.filename(), payload.data(), 0, &entry_budget)
            .await
    }

    /// Scans one named byte buffer at the given archive depth.
    ///
    /// Boxed for async recursion into archive entries. Entries within an
    /// archive are independent and scanned concurrently up to the
    /// configured bound, preserving entry order in the results.
    fn scan_entry<'a>(
        &'a self,
        filename: &'a str,
        data: &'a [u8],
        depth: usize,
        entry_budget: &'a AtomicUsize,
    ) -> BoxFuture<'a, FileScanResult> {
        Box::pin(async move {
            let started = Instant::now();
            let ext = extension_of(filename);

            tracing::debug!(filename, size = data.len(), depth, "scanning payload");

            let digests = self.digester.digest_bytes(data);
            let sniffed_type = sniff_format(data);
            let mut report = heuristics::evaluate(filename, data, self.config.content_prefix_limit);
            let is_archive = is_archive_extension(&ext);

            // Extract archive contents first so extraction findings
            // participate in the composite score.
            let mut extraction: Option<Vec<ExtractedEntry>> = None;
            if is_archive {
                if depth >= self.config.archive.max_depth {
                    report.findings.push(FileFinding::new(
                        FileRuleCategory::ExtractionFailure,
                        "archive nesting depth limit reached; entries not expanded",
                    ));
                } else {
                    match extract_zip(data, &self.config.archive, entry_budget) {
                        Ok((entries, extraction_findings)) => {
                            report.findings.extend(extraction_findings);
                            extraction = Some(entries);
                        }
                        Err(reason) => {
                            tracing::debug!(filename, %reason, "archive extraction failed");
                            report.findings.push(FileFinding::new(
                                FileRuleCategory::ExtractionFailure,
                                format!("archive extraction failed: {reason}"),
                            ));
                        }
                    }
                }
            }

            // Spreadsheet sub-step.
            let workbook_findings = if spreadsheet_kind(&ext).is_some() {
                Some(self.workbook.scan(data))
            } else {
                None
            };

            let mut assessment =
                risk::score_file_findings(&report.findings, report.malware_detected);
            let mut suspicious_patterns: Vec<String> = report
                .findings
                .iter()
                .map(|f| f.description.clone())
                .collect();

            // Merge workbook findings into the pattern list and take the
            // worse of the two scores.
            if let Some(workbook) = &workbook_findings {
                let merged: Vec<String> =
                    workbook.findings.iter().map(describe_workbook_finding).collect();
                suspicious_patterns.extend(merged.clone());
                assessment = risk::merge_workbook_score(&assessment, workbook.risk_score, merged);
            }

            // Scan extracted entries, bounded concurrency, order kept.
            let archive_entries = match extraction {
                Some(entries) => {
                    let mut entry_futures = Vec::with_capacity(entries.len());
                    for entry in &entries {
                        entry_futures.push(self.scan_entry(
                            &entry.name,
                            &entry.data,
                            depth + 1,
                            entry_budget,
                        ));
                    }
                    let results = stream::iter(entry_futures)
                        .buffered(self.config.archive.entry_concurrency)
                        .collect::<Vec<_>>()
                        .await;
                    Some(results)
                }
                None => None,
            };

            FileScanResult {
                filename: filename.to_string(),
                size_bytes: data.len() as u64,
                declared_extension: ext.clone(),
                mime_type: mime_for_extension(&ext).to_string(),
                sniffed_type,
                digests,
                suspicious_patterns,
                malware_detected: report.malware_detected,
                is_archive,
                archive_entries,
                workbook_findings,
                assessment,
                scanned_at: Utc::now(),
                scan_duration: started.elapsed(),
            }
        })
    }
}

/// Renders a workbook finding for the file-level pattern list.
fn describe_workbook_finding(finding: &WorkbookFinding) -> String {
    match &finding.location {
        Some(location) => format!("{location}: {}", finding.description),
        None => finding.description.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{RiskLevel, SniffedFormat};
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        for (name, data) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[tokio::test]
    async fn test_benign_file_is_low_risk() {
        let scanner = FileScanner::new();
        let payload = FilePayload::new("notes.txt", b"just some text".to_vec());

        let result = scanner.scan(&payload).await;

        assert_eq!(result.filename, "notes.txt");
        assert_eq!(result.declared_extension, "txt");
        assert_eq!(result.mime_type, "text/plain");
        assert_eq!(result.sniffed_type, SniffedFormat::Unknown);
        assert!(result.suspicious_patterns.is_empty());
        assert!(!result.malware_detected);
        assert!(!result.is_archive);
        assert!(result.archive_entries.is_none());
        assert!(result.workbook_findings.is_none());
        assert_eq!(result.assessment.level, RiskLevel::Low);
    }

    #[tokio::test]
    async fn test_disguised_invoice_is_malware() {
        let scanner = FileScanner::new();
        let payload = FilePayload::new("invoice_final.pdf.exe", b"MZ\x90\x00\x03".to_vec());

        let result = scanner.scan(&payload).await;

        assert!(result.malware_detected);
        assert_eq!(result.sniffed_type, SniffedFormat::WindowsExecutable);
        assert!(result
            .suspicious_patterns
            .iter()
            .any(|p| p.contains("deceptive filename")));
        assert!(result
            .suspicious_patterns
            .iter()
            .any(|p| p.contains("double extension")));
        assert!(result.assessment.level >= RiskLevel::High);
    }

    #[tokio::test]
    async fn test_scanning_is_idempotent() {
        let scanner = FileScanner::new();
        let payload = FilePayload::new("invoice.pdf.exe", b"MZ\x90\x00".to_vec());

        let first = scanner.scan(&payload).await;
        let second = scanner.scan(&payload).await;

        assert_eq!(first.digests, second.digests);
        assert_eq!(first.suspicious_patterns, second.suspicious_patterns);
        assert_eq!(first.assessment.score, second.assessment.score);
        assert_eq!(first.malware_detected, second.malware_detected);
    }

    #[tokio::test]
    async fn test_archive_entries_are_scanned_individually() {
        let scanner = FileScanner::new();
        let zip = build_zip(&[("readme.txt", b"hello"), ("tool.exe", b"MZ\x90")]);
        let payload = FilePayload::new("bundle.zip", zip);

        let result = scanner.scan(&payload).await;

        assert!(result.is_archive);
        let entries = result.archive_entries.as_ref().unwrap();
        assert_eq!(entries.len(), 2);

        let flagged: Vec<_> = entries
            .iter()
            .filter(|e| e.assessment.level >= RiskLevel::Medium)
            .collect();
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].filename, "tool.exe");
    }

    #[tokio::test]
    async fn test_corrupt_archive_keeps_scanning() {
        let scanner = FileScanner::new();
        let payload = FilePayload::new("broken.zip", b"PK\x03\x04 truncated".to_vec());

        let result = scanner.scan(&payload).await;

        assert!(result.is_archive);
        assert!(result.archive_entries.is_none());
        assert!(result
            .suspicious_patterns
            .iter()
            .any(|p| p.contains("extraction failed")));
    }

    #[tokio::test]
    async fn test_nested_archive_depth_is_bounded() {
        let scanner = FileScanner::with_config(
            FileScannerConfig::new()
                .with_archive_limits(ArchiveLimits::default().with_max_depth(1)),
        );

        let inner = build_zip(&[("deep.txt", b"bottom")]);
        let outer = build_zip(&[("inner.zip", &inner)]);
        let payload = FilePayload::new("outer.zip", outer);

        let result = scanner.scan(&payload).await;
        let entries = result.archive_entries.as_ref().unwrap();
        assert_eq!(entries.len(), 1);

        // The nested archive hit the depth bound: recognized as an
        // archive but not expanded.
        let inner_result = &entries[0];
        assert!(inner_result.is_archive);
        assert!(inner_result.archive_entries.is_none());
        assert!(inner_result
            .suspicious_patterns
            .iter()
            .any(|p| p.contains("depth limit")));
    }

    #[tokio::test]
    async fn test_empty_archive_yields_empty_entries() {
        let scanner = FileScanner::new();
        let payload = FilePayload::new("empty.zip", build_zip(&[]));

        let result = scanner.scan(&payload).await;

        assert!(result.is_archive);
        assert_eq!(result.archive_entries.as_ref().unwrap().len(), 0);
    }
}
