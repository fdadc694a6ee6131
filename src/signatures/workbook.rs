//! Workbook signature tables.
//!
//! Attack-pattern tables consulted by the spreadsheet scanner: DDE
//! invocation shapes, command-line argument shapes, dangerous functions,
//! suspicious protocols, and auto-execution defined-name triggers.

use once_cell::sync::Lazy;
use regex::Regex;

/// DDE invocation shapes, including forms without a leading `=` since
/// some producers write them as strings rather than evaluated formulas.
pub static DDE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // Classic formula forms
        r"(?i)=DDE\(",
        r"(?i)=DDEAUTO\(",
        r"(?i)=cmd\|",
        r"(?i)=msexcel\|",
        r"(?i)=excel\|",
        r"(?i)@SUM\(.*cmd",
        r"(?i)=.*\|'.*!",
        // Forms without a leading formula marker
        r"(?i)^cmd\|",
        r"(?i)^msexcel\|",
        r"(?i)^excel\|",
        r"(?i)^winword\|",
        r"(?i)^powershell\|",
        r"(?i)^[a-zA-Z]+\|.*![A-Z0-9]+$",
        // Interpreter launch fragments
        r"(?i)cmd.*/c",
        r"(?i)powershell.*exe",
        r"(?i)system32.*exe",
        r"(?i)calc\.exe",
        r"(?i)notepad\.exe",
        r"(?i)cmd\.exe",
        // Auto-executing DDE forms
        r"(?i)DDEAUTO.*cmd",
        r"(?i)DDEAUTO.*powershell",
        r"(?i)DDEAUTO.*system32",
    ]
    .into_iter()
    .map(|p| Regex::new(p).expect("DDE pattern compiles"))
    .collect()
});

/// Command-line argument shapes: interpreter switches, system paths, and
/// executable/script filename suffixes.
pub static COMMAND_INJECTION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)/c\s+",
        r"(?i)/k\s+",
        r"(?i)-c\s+",
        r"(?i)-e\s+",
        r"(?i)\\system32\\",
        r"(?i)\\windows\\",
        r"(?i)\.exe\b",
        r"(?i)\.bat\b",
        r"(?i)\.cmd\b",
        r"(?i)\.ps1\b",
        r"(?i)calc\b",
        r"(?i)notepad\b",
        r"(?i)taskkill",
        r"(?i)net\s+user",
    ]
    .into_iter()
    .map(|p| Regex::new(p).expect("command pattern compiles"))
    .collect()
});

/// Returns `true` if any DDE shape matches.
pub fn matches_dde(text: &str) -> bool {
    DDE_PATTERNS.iter().any(|p| p.is_match(text))
}

/// Returns `true` if any command-line argument shape matches.
pub fn matches_command_injection(text: &str) -> bool {
    COMMAND_INJECTION_PATTERNS.iter().any(|p| p.is_match(text))
}

/// Functions capable of external I/O or dynamic execution, in check
/// order.
pub const DANGEROUS_FUNCTIONS: &[&str] = &[
    "HYPERLINK",
    "WEBSERVICE",
    "FILTERXML",
    "RTD",
    "CUBEVALUE",
    "CUBEMEMBER",
    "CUBERANKEDMEMBER",
    "CUBESET",
    "CUBESETCOUNT",
    "CUBEKPIMEMBER",
    "CALL",
    "REGISTER",
    "EVALUATE",
    "EXEC",
    "SHELL",
];

/// The execution-capable subset, rated critical rather than high.
pub const EXEC_CAPABLE_FUNCTIONS: &[&str] = &["CALL", "REGISTER", "EXEC", "SHELL"];

/// Returns the first dangerous function whose name appears in the
/// uppercased cell content.
pub fn find_dangerous_function(text: &str) -> Option<&'static str> {
    let upper = text.to_uppercase();
    DANGEROUS_FUNCTIONS
        .iter()
        .find(|f| upper.contains(*f))
        .copied()
}

/// Returns `true` if the function can launch or register external code.
pub fn is_exec_capable(function: &str) -> bool {
    EXEC_CAPABLE_FUNCTIONS.contains(&function)
}

/// Schemes and path forms that reach outside the workbook.
pub const SUSPICIOUS_PROTOCOLS: &[&str] = &[
    "file://",
    "ftp://",
    "http://",
    "https://",
    "ldap://",
    "mailto:",
    "news:",
    "nntp:",
    "telnet:",
    "gopher:",
    "wais:",
    "smb://",
    "unc://",
    "\\\\",
];

/// Local-file and network-share forms, rated critical rather than high.
pub fn is_local_resource_protocol(protocol: &str) -> bool {
    matches!(protocol, "file://" | "smb://" | "unc://" | "\\\\")
}

/// Returns the first suspicious protocol appearing in the lowercased
/// content.
pub fn find_suspicious_protocol(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    SUSPICIOUS_PROTOCOLS
        .iter()
        .find(|p| lower.contains(&p.to_lowercase()))
        .copied()
}

/// Returns `true` if the content carries any external-reference marker:
/// a bracketed workbook reference, a sheet-qualifying `!`, an embedded
/// URI scheme, or a UNC path.
pub fn has_external_reference_marker(text: &str) -> bool {
    text.contains('[') || text.contains('!') || text.contains("://") || text.contains("\\\\")
}

/// Defined-name conventions that trigger automatic execution when the
/// workbook is opened or closed.
pub const AUTO_EXEC_NAMES: &[&str] = &[
    "AUTO_OPEN",
    "AUTO_CLOSE",
    "AUTO_EXEC",
    "AUTOOPEN",
    "AUTOCLOSE",
    "AUTOEXEC",
    "WORKBOOK_OPEN",
    "WORKBOOK_CLOSE",
    "WORKBOOK_ACTIVATE",
    "WORKBOOK_DEACTIVATE",
];

/// Returns `true` if a defined name matches an auto-execution trigger
/// convention.
pub fn is_auto_exec_name(name: &str) -> bool {
    let upper = name.to_uppercase();
    AUTO_EXEC_NAMES.iter().any(|n| upper.contains(n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dde_shapes() {
        assert!(matches_dde("=DDE(\"cmd\";\"/c calc\";\"x\")"));
        assert!(matches_dde("=DDEAUTO(\"cmd\" \"/c notepad\")"));
        assert!(matches_dde("cmd|'/c calc.exe'!A1"));
        assert!(matches_dde("powershell|'iex x'!A1"));
        assert!(!matches_dde("=SUM(A1:A5)"));
        assert!(!matches_dde("quarterly totals"));
    }

    #[test]
    fn test_command_injection_shapes() {
        assert!(matches_command_injection("cmd /c whoami"));
        assert!(matches_command_injection("powershell -e ZQBjAGgAbwA="));
        assert!(matches_command_injection("C:\\Windows\\System32\\calc.exe"));
        assert!(matches_command_injection("run payload.bat now"));
        assert!(!matches_command_injection("net income statement"));
    }

    #[test]
    fn test_dangerous_function_lookup() {
        assert_eq!(find_dangerous_function("=WEBSERVICE(A1)"), Some("WEBSERVICE"));
        assert_eq!(find_dangerous_function("=call(\"kernel32\")"), Some("CALL"));
        assert_eq!(find_dangerous_function("=SUM(A1)"), None);
        assert!(is_exec_capable("SHELL"));
        assert!(!is_exec_capable("HYPERLINK"));
    }

    #[test]
    fn test_protocol_classification() {
        assert_eq!(
            find_suspicious_protocol("=HYPERLINK(\"file:///etc/passwd\")"),
            Some("file://")
        );
        assert_eq!(
            find_suspicious_protocol("see https://example.com"),
            Some("https://")
        );
        assert!(is_local_resource_protocol("file://"));
        assert!(is_local_resource_protocol("\\\\"));
        assert!(!is_local_resource_protocol("https://"));
    }

    #[test]
    fn test_external_reference_markers() {
        assert!(has_external_reference_marker("[Book2.xlsx]Sheet1!A1"));
        assert!(has_external_reference_marker("Sheet2!B4"));
        assert!(has_external_reference_marker("\\\\share\\payload"));
        assert!(!has_external_reference_marker("plain text"));
    }

    #[test]
    fn test_auto_exec_names() {
        assert!(is_auto_exec_name("Auto_Open"));
        assert!(is_auto_exec_name("Workbook_Open"));
        assert!(is_auto_exec_name("my_auto_open_range"));
        assert!(!is_auto_exec_name("TotalSales"));
    }
}
