//! Process-wide read-only signature tables.
//!
//! Every heuristic the engines consult lives here as immutable data:
//! suspicious URL shapes, shortener domains, dangerous file extensions,
//! container magic bytes, workbook attack patterns, and the weighted
//! rule table driving the file-scanner score. Tables are initialized on
//! first use and never mutated afterwards, so unsynchronized concurrent
//! reads are safe.

pub mod file;
pub mod url;
pub mod workbook;

pub use file::{FileFinding, FileRule, FileRuleCategory};
