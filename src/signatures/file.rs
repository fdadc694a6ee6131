//! File signature tables.
//!
//! Static rule sets consulted by the file scanner: dangerous extensions,
//! deceptive filename shapes, container magic bytes, embedded content
//! markers, and the weighted rule table driving the composite score.

use crate::core::types::Severity;

use once_cell::sync::Lazy;
use regex::Regex;

/// Executable and script extensions considered dangerous, with human
/// descriptions. Archive extensions are deliberately excluded; archives
/// are containers, not directly executable.
pub const DANGEROUS_EXTENSIONS: &[(&str, &str)] = &[
    ("exe", "Windows executable"),
    ("scr", "screen saver executable"),
    ("vbs", "Visual Basic script"),
    ("pif", "MS-DOS program information file"),
    ("cmd", "Windows command script"),
    ("bat", "Windows batch file"),
    ("com", "MS-DOS executable"),
    ("jar", "Java archive executable"),
    ("reg", "registry merge file"),
    ("vbe", "encoded Visual Basic script"),
    ("js", "JavaScript file"),
    ("jse", "encoded JScript file"),
    ("lnk", "Windows shortcut"),
    ("dll", "Windows dynamic library"),
    ("sys", "Windows driver"),
    ("ps1", "PowerShell script"),
    ("psm1", "PowerShell module"),
    ("ps1xml", "PowerShell display configuration"),
    ("ps2", "PowerShell script"),
    ("ps2xml", "PowerShell display configuration"),
    ("psc1", "PowerShell console file"),
    ("psc2", "PowerShell console file"),
    ("msh", "Monad shell script"),
    ("msh1", "Monad shell script"),
    ("msh2", "Monad shell script"),
    ("mshxml", "Monad shell configuration"),
    ("msh1xml", "Monad shell configuration"),
    ("msh2xml", "Monad shell configuration"),
    ("scf", "Windows Explorer command file"),
    ("inf", "setup information file"),
    ("msi", "Windows installer package"),
    ("app", "application bundle"),
];

/// Returns `true` if the extension is in the dangerous table.
pub fn is_dangerous_extension(ext: &str) -> bool {
    DANGEROUS_EXTENSIONS.iter().any(|(e, _)| *e == ext)
}

/// Human description for a dangerous extension.
pub fn describe_extension(ext: &str) -> &'static str {
    DANGEROUS_EXTENSIONS
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, d)| *d)
        .unwrap_or("executable or script file")
}

/// A terminal extension only counts as a "real" dangerous second
/// extension when it is short, purely alphanumeric, and in the table.
/// This keeps filenames that merely contain dots from being flagged.
pub fn is_valid_dangerous_terminal(ext: &str) -> bool {
    !ext.is_empty()
        && ext.len() <= 4
        && ext.chars().all(|c| c.is_ascii_alphanumeric())
        && is_dangerous_extension(ext)
}

/// Archive container extensions.
pub const ARCHIVE_EXTENSIONS: &[&str] = &["zip", "rar", "7z", "tar", "gz"];

/// Returns `true` for archive container extensions.
pub fn is_archive_extension(ext: &str) -> bool {
    ARCHIVE_EXTENSIONS.contains(&ext)
}

/// Innocuous document/image extensions used as decoys in front of a
/// dangerous terminal extension.
pub const DECOY_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "doc", "docx", "pdf", "xls", "xlsx", "txt",
];

/// Spreadsheet container kind implied by a declared extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpreadsheetKind {
    /// Modern zip-based OOXML workbook.
    Ooxml,
    /// Legacy OLE compound-file workbook.
    Legacy,
}

/// Maps a declared extension to its spreadsheet container kind.
pub fn spreadsheet_kind(ext: &str) -> Option<SpreadsheetKind> {
    match ext {
        "xlsx" | "xlsm" | "xltx" | "xltm" => Some(SpreadsheetKind::Ooxml),
        "xls" | "xlt" | "xla" => Some(SpreadsheetKind::Legacy),
        _ => None,
    }
}

/// Extension → MIME type lookup. Unknown extensions map to a generic
/// binary type.
pub const MIME_TYPES: &[(&str, &str)] = &[
    ("txt", "text/plain"),
    ("html", "text/html"),
    ("css", "text/css"),
    ("js", "application/javascript"),
    ("json", "application/json"),
    ("pdf", "application/pdf"),
    ("doc", "application/msword"),
    (
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    ("xls", "application/vnd.ms-excel"),
    (
        "xlsx",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    ),
    (
        "xlsm",
        "application/vnd.ms-excel.sheet.macroEnabled.12",
    ),
    ("zip", "application/zip"),
    ("rar", "application/x-rar-compressed"),
    ("7z", "application/x-7z-compressed"),
    ("gz", "application/gzip"),
    ("tar", "application/x-tar"),
    ("exe", "application/x-msdownload"),
    ("dll", "application/x-msdownload"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
];

/// MIME type for a declared extension.
pub fn mime_for_extension(ext: &str) -> &'static str {
    MIME_TYPES
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, m)| *m)
        .unwrap_or("application/octet-stream")
}

/// Windows executable header.
pub const MZ_SIGNATURE: &[u8] = b"MZ";

/// Valid zip container signatures (local file, empty, spanned).
pub const ZIP_SIGNATURES: [[u8; 4]; 3] = [
    [0x50, 0x4B, 0x03, 0x04],
    [0x50, 0x4B, 0x05, 0x06],
    [0x50, 0x4B, 0x07, 0x08],
];

/// OLE compound file signature (legacy Office container).
pub const OLE_SIGNATURE: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// RAR archive signature.
pub const RAR_SIGNATURE: &[u8] = b"Rar!\x1a\x07";

/// 7-Zip archive signature.
pub const SEVEN_ZIP_SIGNATURE: [u8; 6] = [0x37, 0x7A, 0xBC, 0xAF, 0x27, 0x1C];

/// Gzip stream signature.
pub const GZIP_SIGNATURE: [u8; 2] = [0x1F, 0x8B];

/// The DOS stub message every PE file carries.
pub const DOS_STUB_MARKER: &[u8] = b"This program cannot be run in DOS mode";

/// Dynamic-loading and process-creation API names scanned for in the
/// content prefix.
pub const LOADER_MARKERS: &[&str] = &[
    "LoadLibrary",
    "GetProcAddress",
    "CreateProcess",
    "WinExec",
    "ShellExecute",
    "URLDownloadToFile",
];

/// Command-interpreter tokens scanned for in the content prefix.
pub const INTERPRETER_MARKERS: &[&str] = &[
    "cmd.exe",
    "powershell",
    "wscript",
    "cscript",
    "rundll32",
    "mshta",
];

/// Filename shapes that pair an innocuous-looking name with an
/// executable suffix, applied to the basename.
pub static DECEPTIVE_FILENAME_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)^invoice.*\.(exe|scr|bat|cmd|com|pif|vbs|js)$",
        r"(?i)^receipt.*\.(exe|scr|bat|cmd|com|pif|vbs|js)$",
        r"(?i)^document.*\.(exe|scr|bat|cmd|com|pif|vbs|js)$",
        r"(?i)^photo.*\.(exe|scr|bat|cmd|com|pif|vbs|js)$",
        r"(?i)^scan.*\.(exe|scr|bat|cmd|com|pif|vbs|js)$",
        r"(?i)\.(jpg|jpeg|png|gif|doc|pdf).*\.(exe|scr|bat|cmd|com|pif|vbs|js)$",
        r"(?i)^\..*\.(exe|scr|bat|cmd|com|pif|vbs|js)$",
    ]
    .into_iter()
    .map(|p| Regex::new(p).expect("filename pattern compiles"))
    .collect()
});

/// Category of a file-scanner heuristic rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileRuleCategory {
    /// Declared extension is in the dangerous table.
    DangerousExtension,
    /// Filename pairs an innocuous name with an executable suffix.
    DeceptiveFilename,
    /// Decoy extension immediately before a dangerous terminal extension.
    DoubleExtension,
    /// Executable content under an archive extension.
    DisguisedExecutable,
    /// Executable content under a non-executable, non-archive extension.
    ExtensionSpoofing,
    /// Executable content under an executable extension (informational).
    ConfirmedExecutable,
    /// DOS stub message in the content prefix.
    DosStub,
    /// Dangerous-extension file inside an archive.
    NestedExecutable,
    /// Archive extension whose content is not that archive format.
    ArchiveSignatureMismatch,
    /// Spreadsheet extension whose content is not the expected container.
    WorkbookSignatureMismatch,
    /// Loader API name or interpreter token in the content prefix.
    EmbeddedMarker,
    /// Archive could not be extracted or was truncated by limits.
    ExtractionFailure,
}

/// A weighted heuristic rule. New heuristics are added as table rows,
/// not as new control flow.
#[derive(Debug, Clone, Copy)]
pub struct FileRule {
    /// The heuristic this rule scores.
    pub category: FileRuleCategory,
    /// Severity attached to findings from this rule.
    pub severity: Severity,
    /// Contribution to the composite score.
    pub weight: u32,
}

/// The file-scanner rule table.
pub const FILE_RULES: &[FileRule] = &[
    FileRule {
        category: FileRuleCategory::DisguisedExecutable,
        severity: Severity::High,
        weight: 8,
    },
    FileRule {
        category: FileRuleCategory::ExtensionSpoofing,
        severity: Severity::High,
        weight: 8,
    },
    FileRule {
        category: FileRuleCategory::DosStub,
        severity: Severity::High,
        weight: 8,
    },
    FileRule {
        category: FileRuleCategory::NestedExecutable,
        severity: Severity::High,
        weight: 7,
    },
    FileRule {
        category: FileRuleCategory::DoubleExtension,
        severity: Severity::Medium,
        weight: 6,
    },
    FileRule {
        category: FileRuleCategory::DangerousExtension,
        severity: Severity::Medium,
        weight: 5,
    },
    FileRule {
        category: FileRuleCategory::ArchiveSignatureMismatch,
        severity: Severity::Medium,
        weight: 5,
    },
    FileRule {
        category: FileRuleCategory::WorkbookSignatureMismatch,
        severity: Severity::Medium,
        weight: 5,
    },
    FileRule {
        category: FileRuleCategory::DeceptiveFilename,
        severity: Severity::Medium,
        weight: 4,
    },
    FileRule {
        category: FileRuleCategory::ConfirmedExecutable,
        severity: Severity::Low,
        weight: 2,
    },
    FileRule {
        category: FileRuleCategory::EmbeddedMarker,
        severity: Severity::Low,
        weight: 2,
    },
    FileRule {
        category: FileRuleCategory::ExtractionFailure,
        severity: Severity::Low,
        weight: 2,
    },
];

impl FileRuleCategory {
    /// Looks up this category's rule in the table.
    pub fn rule(&self) -> &'static FileRule {
        FILE_RULES
            .iter()
            .find(|r| r.category == *self)
            .expect("every category has a table row")
    }
}

/// A recorded match of a heuristic rule against one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFinding {
    /// Which rule matched.
    pub category: FileRuleCategory,
    /// Human-readable description of the match.
    pub description: String,
}

impl FileFinding {
    /// Creates a finding for a rule category.
    pub fn new(category: FileRuleCategory, description: impl Into<String>) -> Self {
        Self {
            category,
            description: description.into(),
        }
    }
}
