//! Spreadsheet threat scanning.
//!
//! The scanner dispatches on the container signature: zip-based OOXML
//! workbooks get full structural parsing, legacy compound-file workbooks
//! get container-level checks, and anything unparseable degrades to a
//! conservative suspicious-by-default result. No formula is ever
//! evaluated and no hyperlink is ever followed.

mod legacy;
mod ooxml;
mod scanner;

pub use scanner::{WorkbookScanner, PARSE_FAILURE_SCORE, WORKBOOK_SCORE_CEILING};
