//! The spreadsheet threat scanner.
//!
//! Parses workbook structure without evaluating a single formula and
//! scores each independent check additively: macros, hidden content,
//! DDE and command-injection shapes, dangerous functions, external
//! references, embedded objects, and auto-execution defined names.
//! A corrupt or unrecognized container yields a degraded
//! suspicious-by-default result instead of an error.

use crate::core::result::{WorkbookCategory, WorkbookFinding, WorkbookScanResult};
use crate::core::types::{RiskLevel, Severity, SniffedFormat};
use crate::file::sniff::sniff_format;
use crate::risk::file_level_for;
use crate::signatures::workbook::{
    find_dangerous_function, find_suspicious_protocol, has_external_reference_marker,
    is_exec_capable, is_local_resource_protocol, matches_command_injection, matches_dde,
};
use crate::workbook::{legacy, ooxml};

/// Ceiling applied to the strictly additive risk score before level
/// mapping.
pub const WORKBOOK_SCORE_CEILING: u32 = 100;

/// Fixed score assigned to unparseable workbooks.
pub const PARSE_FAILURE_SCORE: u32 = 5;

/// Maximum snippet length carried on a finding.
const SNIPPET_LIMIT: usize = 100;

/// Scans workbook bytes for threat indicators.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkbookScanner;

impl WorkbookScanner {
    /// Creates a scanner.
    pub fn new() -> Self {
        Self
    }

    /// Scans one workbook.
    ///
    /// Never fails: a parse failure produces the degraded
    /// fail-safe-toward-suspicion result.
    pub fn scan(&self, data: &[u8]) -> WorkbookScanResult {
        let mut acc = WorkbookAccumulator::new();

        let result = match sniff_format(data) {
            SniffedFormat::ZipArchive => match ooxml::scan(data, &mut acc) {
                Ok(()) => acc.finish(),
                Err(reason) => {
                    tracing::debug!(%reason, "workbook parse failed");
                    degraded_result()
                }
            },
            SniffedFormat::OleCompound => {
                legacy::scan(data, &mut acc);
                acc.finish()
            }
            _ => degraded_result(),
        };

        tracing::debug!(
            risk_score = result.risk_score,
            risk_level = %result.risk_level,
            finding_count = result.findings.len(),
            "workbook scan completed"
        );
        result
    }
}

/// The degraded result for corrupt or unrecognized containers: all
/// capability flags false, one medium finding, fixed medium score.
pub(crate) fn degraded_result() -> WorkbookScanResult {
    WorkbookScanResult {
        sheet_count: 0,
        formula_count: 0,
        has_macros: false,
        has_hidden_sheets: false,
        has_hidden_cell_ranges: false,
        has_external_links: false,
        external_link_count: 0,
        has_embedded_objects: false,
        has_formula_injection: false,
        has_shell_command_pattern: false,
        findings: vec![WorkbookFinding {
            category: WorkbookCategory::SuspiciousPattern,
            severity: Severity::Medium,
            location: None,
            description: "workbook container is corrupt or unrecognized; content checks skipped"
                .to_string(),
            snippet: None,
        }],
        risk_score: PARSE_FAILURE_SCORE,
        risk_level: RiskLevel::Medium,
    }
}

/// Collects flags, counters, and findings while a container is walked.
///
/// The risk score is strictly additive: recording a finding only ever
/// increases it.
#[derive(Debug)]
pub(crate) struct WorkbookAccumulator {
    result: WorkbookScanResult,
}

impl WorkbookAccumulator {
    pub(crate) fn new() -> Self {
        Self {
            result: WorkbookScanResult {
                sheet_count: 0,
                formula_count: 0,
                has_macros: false,
                has_hidden_sheets: false,
                has_hidden_cell_ranges: false,
                has_external_links: false,
                external_link_count: 0,
                has_embedded_objects: false,
                has_formula_injection: false,
                has_shell_command_pattern: false,
                findings: Vec::new(),
                risk_score: 0,
                risk_level: RiskLevel::Low,
            },
        }
    }

    pub(crate) fn set_sheet_count(&mut self, count: usize) {
        self.result.sheet_count = count;
    }

    pub(crate) fn count_formula(&mut self) {
        self.result.formula_count += 1;
    }

    /// Records a finding and adds its weight to the score.
    pub(crate) fn add_finding(
        &mut self,
        category: WorkbookCategory,
        severity: Severity,
        weight: u32,
        location: Option<String>,
        description: impl Into<String>,
        snippet: Option<&str>,
    ) {
        self.result.findings.push(WorkbookFinding {
            category,
            severity,
            location,
            description: description.into(),
            snippet: snippet.map(truncate_snippet),
        });
        self.result.risk_score = self.result.risk_score.saturating_add(weight);
    }

    pub(crate) fn record_macros(&mut self) {
        if self.result.has_macros {
            return;
        }
        self.result.has_macros = true;
        self.add_finding(
            WorkbookCategory::Macro,
            Severity::Critical,
            10,
            None,
            "embedded macro program payload",
            None,
        );
    }

    pub(crate) fn record_embedded_objects(&mut self) {
        if self.result.has_embedded_objects {
            return;
        }
        self.result.has_embedded_objects = true;
        self.add_finding(
            WorkbookCategory::EmbeddedObject,
            Severity::Critical,
            8,
            None,
            "embedded foreign object declared by the workbook",
            None,
        );
    }

    pub(crate) fn record_hidden_sheet(&mut self, sheet: &str) {
        self.result.has_hidden_sheets = true;
        self.add_finding(
            WorkbookCategory::HiddenContent,
            Severity::High,
            5,
            Some(sheet.to_string()),
            format!("hidden sheet: {sheet}"),
            None,
        );
    }

    /// Hidden rows/columns are recorded once per sheet.
    pub(crate) fn record_hidden_cell_ranges(&mut self, sheet: &str) {
        let already = self.result.findings.iter().any(|f| {
            f.category == WorkbookCategory::HiddenContent
                && f.location.as_deref() == Some(sheet)
                && f.description.contains("rows or columns")
        });
        self.result.has_hidden_cell_ranges = true;
        if already {
            return;
        }
        self.add_finding(
            WorkbookCategory::HiddenContent,
            Severity::Medium,
            3,
            Some(sheet.to_string()),
            "hidden rows or columns",
            None,
        );
    }

    pub(crate) fn record_auto_exec_name(&mut self, name: &str) {
        self.add_finding(
            WorkbookCategory::SuspiciousPattern,
            Severity::Critical,
            10,
            None,
            format!("auto-execution defined name: {name}"),
            Some(name),
        );
    }

    /// Runs every cell-content check over one cell's textual candidates
    /// (formula, raw value, cached display text). Each check records at
    /// most one finding per cell.
    pub(crate) fn check_cell_content(&mut self, location: Option<&str>, candidates: &[String]) {
        let location_string = |loc: Option<&str>| loc.map(|l| l.to_string());

        // DDE / formula-injection shapes; capped at one finding per cell.
        if let Some(hit) = candidates.iter().find(|c| matches_dde(c)) {
            self.result.has_formula_injection = true;
            self.add_finding(
                WorkbookCategory::DdeAttack,
                Severity::Critical,
                15,
                location_string(location),
                "DDE invocation shape in cell content",
                Some(hit),
            );
        }

        // Command-line argument shapes.
        if let Some(hit) = candidates.iter().find(|c| matches_command_injection(c)) {
            self.result.has_shell_command_pattern = true;
            self.add_finding(
                WorkbookCategory::CommandInjection,
                Severity::Critical,
                12,
                location_string(location),
                "command-line argument shape in cell content",
                Some(hit),
            );
        }

        // Dangerous function usage.
        if let Some((function, hit)) = candidates
            .iter()
            .find_map(|c| find_dangerous_function(c).map(|f| (f, c)))
        {
            let (severity, weight) = if is_exec_capable(function) {
                (Severity::Critical, 10)
            } else {
                (Severity::High, 6)
            };
            self.add_finding(
                WorkbookCategory::MaliciousFormula,
                severity,
                weight,
                location_string(location),
                format!("dangerous function usage: {function}"),
                Some(hit),
            );
        }

        // External references and suspicious protocols.
        if candidates
            .iter()
            .any(|c| has_external_reference_marker(c))
        {
            self.result.has_external_links = true;
            self.result.external_link_count += 1;

            if let Some((protocol, hit)) = candidates
                .iter()
                .find_map(|c| find_suspicious_protocol(c).map(|p| (p, c)))
            {
                let (severity, weight) = if is_local_resource_protocol(protocol) {
                    (Severity::Critical, 8)
                } else {
                    (Severity::High, 6)
                };
                self.add_finding(
                    WorkbookCategory::ExternalLink,
                    severity,
                    weight,
                    location_string(location),
                    format!("suspicious external reference ({protocol})"),
                    Some(hit),
                );
            }
        }
    }

    /// Checks a hyperlink target the same way as cell content.
    pub(crate) fn check_hyperlink_target(&mut self, location: Option<&str>, target: &str) {
        self.result.has_external_links = true;
        self.result.external_link_count += 1;

        if let Some(protocol) = find_suspicious_protocol(target) {
            let (severity, weight) = if is_local_resource_protocol(protocol) {
                (Severity::Critical, 8)
            } else {
                (Severity::High, 6)
            };
            self.add_finding(
                WorkbookCategory::ExternalLink,
                severity,
                weight,
                location.map(|l| l.to_string()),
                format!("hyperlink to suspicious target ({protocol})"),
                Some(target),
            );
        }
    }

    /// Caps the score and maps the level.
    pub(crate) fn finish(mut self) -> WorkbookScanResult {
        self.result.risk_score = self.result.risk_score.min(WORKBOOK_SCORE_CEILING);
        self.result.risk_level = file_level_for(self.result.risk_score);
        self.result
    }
}

fn truncate_snippet(text: &str) -> String {
    text.chars().take(SNIPPET_LIMIT).collect()
}
