//! Filename and content heuristics.
//!
//! Every heuristic is a rule-table match: a check either records a
//! [`FileFinding`] for its category or stays silent, and the composite
//! score is computed later from the table weights. The malware
//! determination combines indicator categories so a single weak hit
//! never flags a file on its own.

use crate::core::input::extension_of;
use crate::file::sniff::{matches_archive_extension, sniff_format};
use crate::core::types::SniffedFormat;
use crate::signatures::file::{
    describe_extension, is_archive_extension, is_dangerous_extension,
    is_valid_dangerous_terminal, spreadsheet_kind, FileFinding, FileRuleCategory,
    SpreadsheetKind, DECEPTIVE_FILENAME_PATTERNS, DECOY_EXTENSIONS, DOS_STUB_MARKER,
    INTERPRETER_MARKERS, LOADER_MARKERS, MZ_SIGNATURE, OLE_SIGNATURE, ZIP_SIGNATURES,
};

/// The outcome of running every heuristic against one payload.
#[derive(Debug, Clone, Default)]
pub struct HeuristicReport {
    /// Findings in evaluation order.
    pub findings: Vec<FileFinding>,
    /// Result of the malware determination.
    pub malware_detected: bool,
}

/// Runs all filename and content heuristics.
///
/// `prefix_limit` bounds the content-marker scans so arbitrarily large
/// payloads stay cheap to inspect.
pub fn evaluate(filename: &str, data: &[u8], prefix_limit: usize) -> HeuristicReport {
    let ext = extension_of(filename);
    let basename = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let mut findings = Vec::new();

    // Dangerous-extension check; archives are containers, not payloads.
    if is_dangerous_extension(&ext) && !is_archive_extension(&ext) {
        findings.push(FileFinding::new(
            FileRuleCategory::DangerousExtension,
            format!("dangerous extension .{ext}: {}", describe_extension(&ext)),
        ));
    }

    // Deceptive-filename check.
    if DECEPTIVE_FILENAME_PATTERNS
        .iter()
        .any(|p| p.is_match(basename))
    {
        findings.push(FileFinding::new(
            FileRuleCategory::DeceptiveFilename,
            "deceptive filename: innocuous-looking name paired with an executable suffix",
        ));
    }

    // Double-extension check. Only a syntactically valid dangerous
    // terminal extension behind a plausible second extension counts.
    if let Some(decoy) = double_extension_decoy(basename, &ext) {
        findings.push(FileFinding::new(
            FileRuleCategory::DoubleExtension,
            format!("double extension ({decoy}.{ext}): possible attempt to hide the real file type"),
        ));
    }

    // Magic-byte sniffing.
    if data.starts_with(MZ_SIGNATURE) {
        if is_archive_extension(&ext) {
            findings.push(FileFinding::new(
                FileRuleCategory::DisguisedExecutable,
                format!("executable header under archive extension .{ext}: disguised executable"),
            ));
        } else if is_dangerous_extension(&ext) {
            findings.push(FileFinding::new(
                FileRuleCategory::ConfirmedExecutable,
                "confirmed Windows executable structure",
            ));
        } else if ext.is_empty() {
            findings.push(FileFinding::new(
                FileRuleCategory::ExtensionSpoofing,
                "executable content in a file with no extension",
            ));
        } else {
            findings.push(FileFinding::new(
                FileRuleCategory::ExtensionSpoofing,
                format!("executable content masquerading as .{ext}"),
            ));
        }
    }

    // Archive-signature validation.
    if is_archive_extension(&ext) && !matches_archive_extension(&ext, data) {
        let actual = sniff_format(data);
        let description = if actual == SniffedFormat::Unknown {
            format!("declared .{ext} archive has no valid {ext} signature: corrupt or mislabeled")
        } else {
            format!("declared .{ext} archive actually looks like a {actual}")
        };
        findings.push(FileFinding::new(
            FileRuleCategory::ArchiveSignatureMismatch,
            description,
        ));
    }

    // Spreadsheet-signature validation.
    match spreadsheet_kind(&ext) {
        Some(SpreadsheetKind::Ooxml)
            if !ZIP_SIGNATURES.iter().any(|sig| data.starts_with(sig)) =>
        {
            findings.push(FileFinding::new(
                FileRuleCategory::WorkbookSignatureMismatch,
                format!("declared .{ext} workbook is not a zip-based container"),
            ));
        }
        Some(SpreadsheetKind::Legacy) if !data.starts_with(&OLE_SIGNATURE) => {
            findings.push(FileFinding::new(
                FileRuleCategory::WorkbookSignatureMismatch,
                format!("declared .{ext} workbook is not a compound-file container"),
            ));
        }
        _ => {}
    }

    // Embedded-marker scan over a bounded prefix.
    let prefix = &data[..data.len().min(prefix_limit)];
    if memchr::memmem::find(prefix, DOS_STUB_MARKER).is_some() {
        findings.push(FileFinding::new(
            FileRuleCategory::DosStub,
            "DOS stub message present: Windows executable trait",
        ));
    }
    for marker in LOADER_MARKERS {
        if memchr::memmem::find(prefix, marker.as_bytes()).is_some() {
            findings.push(FileFinding::new(
                FileRuleCategory::EmbeddedMarker,
                format!("embedded loader marker: {marker}"),
            ));
        }
    }
    for marker in INTERPRETER_MARKERS {
        if memchr::memmem::find(prefix, marker.as_bytes()).is_some() {
            findings.push(FileFinding::new(
                FileRuleCategory::EmbeddedMarker,
                format!("command interpreter token: {marker}"),
            ));
        }
    }

    // Executable hidden inside an archive (entry paths carry separators).
    if (filename.contains('/') || filename.contains('\\'))
        && is_dangerous_extension(&ext)
        && !is_archive_extension(&ext)
    {
        findings.push(FileFinding::new(
            FileRuleCategory::NestedExecutable,
            "executable file inside an archive",
        ));
    }

    let malware_detected = determine_malware(&findings);

    HeuristicReport {
        findings,
        malware_detected,
    }
}

/// Returns the decoy extension when the basename embeds one immediately
/// before a valid dangerous terminal extension.
fn double_extension_decoy(basename: &str, terminal: &str) -> Option<String> {
    if !is_valid_dangerous_terminal(terminal) {
        return None;
    }
    let parts: Vec<&str> = basename.split('.').filter(|p| !p.is_empty()).collect();
    if parts.len() < 3 {
        return None;
    }
    let decoy = parts[parts.len() - 2].to_ascii_lowercase();
    let looks_like_extension = DECOY_EXTENSIONS.contains(&decoy.as_str())
        || (decoy.len() <= 4 && decoy.chars().all(|c| c.is_ascii_alphanumeric()));
    looks_like_extension.then_some(decoy)
}

/// Malware determination over indicator categories.
///
/// Strong indicators (executable content disguised by the container or
/// extension) flag on their own; weak indicators (filename tricks) only
/// flag in combination.
fn determine_malware(findings: &[FileFinding]) -> bool {
    let has = |category: FileRuleCategory| findings.iter().any(|f| f.category == category);

    let strong = [
        FileRuleCategory::DisguisedExecutable,
        FileRuleCategory::ExtensionSpoofing,
    ];
    let weak = [
        FileRuleCategory::DeceptiveFilename,
        FileRuleCategory::DoubleExtension,
    ];

    let strong_count = strong.iter().filter(|c| has(**c)).count();
    let weak_count = weak.iter().filter(|c| has(**c)).count();

    strong_count >= 1 || strong_count + weak_count >= 2
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREFIX_LIMIT: usize = 4096;

    fn categories(report: &HeuristicReport) -> Vec<FileRuleCategory> {
        report.findings.iter().map(|f| f.category).collect()
    }

    #[test]
    fn test_disguised_invoice_executable() {
        let report = evaluate("invoice_final.pdf.exe", b"MZ\x90\x00\x03", PREFIX_LIMIT);
        let cats = categories(&report);

        assert!(cats.contains(&FileRuleCategory::DangerousExtension));
        assert!(cats.contains(&FileRuleCategory::DeceptiveFilename));
        assert!(cats.contains(&FileRuleCategory::DoubleExtension));
        assert!(cats.contains(&FileRuleCategory::ConfirmedExecutable));
        assert!(report.malware_detected);
    }

    #[test]
    fn test_plain_executable_is_not_malware() {
        let report = evaluate("setup.exe", b"MZ\x90\x00", PREFIX_LIMIT);
        let cats = categories(&report);

        assert!(cats.contains(&FileRuleCategory::DangerousExtension));
        assert!(cats.contains(&FileRuleCategory::ConfirmedExecutable));
        assert!(!report.malware_detected);
    }

    #[test]
    fn test_executable_disguised_as_zip() {
        let report = evaluate("backup.zip", b"MZ\x90\x00", PREFIX_LIMIT);
        let cats = categories(&report);

        assert!(cats.contains(&FileRuleCategory::DisguisedExecutable));
        assert!(cats.contains(&FileRuleCategory::ArchiveSignatureMismatch));
        assert!(report.malware_detected);
    }

    #[test]
    fn test_executable_masquerading_as_image() {
        let report = evaluate("holiday.png", b"MZ\x90\x00", PREFIX_LIMIT);
        let cats = categories(&report);

        assert!(cats.contains(&FileRuleCategory::ExtensionSpoofing));
        assert!(report.malware_detected);
    }

    #[test]
    fn test_multiple_dots_without_real_extension_not_flagged() {
        let report = evaluate("archive.v1.2.3.tar", &[0u8; 600], PREFIX_LIMIT);
        let cats = categories(&report);

        assert!(!cats.contains(&FileRuleCategory::DoubleExtension));
        assert!(!report.malware_detected);
    }

    #[test]
    fn test_benign_document_is_clean() {
        let report = evaluate("report.pdf", b"%PDF-1.7 ...", PREFIX_LIMIT);
        assert!(report.findings.is_empty());
        assert!(!report.malware_detected);
    }

    #[test]
    fn test_dos_stub_and_interpreter_markers() {
        let mut data = b"MZ\x90\x00 garbage ".to_vec();
        data.extend_from_slice(b"This program cannot be run in DOS mode");
        data.extend_from_slice(b" powershell -enc SQBFAFgA");

        let report = evaluate("dropper.exe", &data, PREFIX_LIMIT);
        let cats = categories(&report);

        assert!(cats.contains(&FileRuleCategory::DosStub));
        assert!(cats.contains(&FileRuleCategory::EmbeddedMarker));
    }

    #[test]
    fn test_marker_scan_respects_prefix_limit() {
        let mut data = vec![b'a'; 256];
        data.extend_from_slice(b"powershell");

        let report = evaluate("notes.txt", &data, 128);
        assert!(report.findings.is_empty());
    }

    #[test]
    fn test_nested_executable_entry() {
        let report = evaluate("payload/run.bat", b"@echo off", PREFIX_LIMIT);
        let cats = categories(&report);

        assert!(cats.contains(&FileRuleCategory::NestedExecutable));
        assert!(cats.contains(&FileRuleCategory::DangerousExtension));
    }

    #[test]
    fn test_workbook_signature_mismatch() {
        let report = evaluate("sheet.xlsx", b"MZ\x90\x00", PREFIX_LIMIT);
        let cats = categories(&report);

        assert!(cats.contains(&FileRuleCategory::WorkbookSignatureMismatch));
        assert!(cats.contains(&FileRuleCategory::ExtensionSpoofing));

        let ok = evaluate("sheet.xlsx", b"PK\x03\x04rest", PREFIX_LIMIT);
        assert!(!categories(&ok).contains(&FileRuleCategory::WorkbookSignatureMismatch));
    }
}
