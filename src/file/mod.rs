//! Static file and archive scanning.
//!
//! The scanner digests, sniffs, and heuristically inspects byte payloads
//! without executing them, recursing into archive entries and handing
//! spreadsheet payloads to the workbook scanner.

pub mod archive;
pub mod heuristics;
pub mod scanner;
pub mod sniff;

pub use archive::ArchiveLimits;
pub use scanner::{FileScanner, FileScannerConfig};
pub use sniff::sniff_format;
