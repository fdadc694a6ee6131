//! Archive extraction.
//!
//! Zip containers are extracted in memory so each entry can be fed back
//! through the scanning pipeline. Extraction is defensive: recursion
//! depth and a global visited-entry budget are bounded explicitly (an
//! archive nesting archives must terminate on the counter, not on good
//! faith), oversized entries are skipped with a finding, and entry names
//! in legacy regional encodings are recovered rather than mangled.

use crate::signatures::file::{FileFinding, FileRuleCategory};

use std::io::Read;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Limits applied while walking archives.
#[derive(Debug, Clone)]
pub struct ArchiveLimits {
    /// Maximum nesting depth for archives inside archives.
    pub max_depth: usize,

    /// Global budget of entries visited per scan request.
    pub max_entries: usize,

    /// Maximum decompressed size accepted per entry.
    pub max_entry_bytes: u64,

    /// How many sibling entries may be scanned concurrently.
    pub entry_concurrency: usize,
}

impl Default for ArchiveLimits {
    fn default() -> Self {
        Self {
            max_depth: 3,
            max_entries: 256,
            max_entry_bytes: 64 * 1024 * 1024,
            entry_concurrency: 4,
        }
    }
}

impl ArchiveLimits {
    /// Creates limits with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the nesting depth bound.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Sets the visited-entry budget.
    pub fn with_max_entries(mut self, entries: usize) -> Self {
        self.max_entries = entries;
        self
    }

    /// Sets the per-entry decompressed size cap.
    pub fn with_max_entry_bytes(mut self, bytes: u64) -> Self {
        self.max_entry_bytes = bytes;
        self
    }

    /// Sets the sibling-entry concurrency.
    pub fn with_entry_concurrency(mut self, concurrency: usize) -> Self {
        self.entry_concurrency = concurrency.max(1);
        self
    }
}

/// One extracted, non-directory archive entry.
#[derive(Debug, Clone)]
pub struct ExtractedEntry {
    /// Entry name with its archive-internal path.
    pub name: String,

    /// Decompressed bytes.
    pub data: Vec<u8>,
}

/// Extracts every non-directory entry of a zip archive.
///
/// Returns the extracted entries plus findings for anything skipped by
/// the limits. A container that cannot be opened at all returns `Err`
/// with the reason; the caller records it as a finding rather than
/// aborting the scan.
pub fn extract_zip(
    data: &[u8],
    limits: &ArchiveLimits,
    entry_budget: &AtomicUsize,
) -> Result<(Vec<ExtractedEntry>, Vec<FileFinding>), String> {
    let cursor = std::io::Cursor::new(data);
    let mut archive = zip::ZipArchive::new(cursor).map_err(|e| e.to_string())?;

    let mut entries = Vec::new();
    let mut findings = Vec::new();

    for index in 0..archive.len() {
        if entry_budget.fetch_add(1, Ordering::Relaxed) >= limits.max_entries {
            findings.push(FileFinding::new(
                FileRuleCategory::ExtractionFailure,
                format!(
                    "entry budget of {} exhausted; remaining entries skipped",
                    limits.max_entries
                ),
            ));
            break;
        }

        let mut entry = match archive.by_index(index) {
            Ok(entry) => entry,
            Err(e) => {
                findings.push(FileFinding::new(
                    FileRuleCategory::ExtractionFailure,
                    format!("archive entry {index} unreadable: {e}"),
                ));
                continue;
            }
        };

        if entry.is_dir() {
            continue;
        }

        if entry.size() > limits.max_entry_bytes {
            findings.push(FileFinding::new(
                FileRuleCategory::ExtractionFailure,
                format!(
                    "archive entry '{}' skipped: {} bytes exceeds the {} byte cap",
                    entry.name(),
                    entry.size(),
                    limits.max_entry_bytes
                ),
            ));
            continue;
        }

        let name = decode_entry_name(entry.name_raw(), entry.name());

        let mut bytes = Vec::with_capacity(entry.size() as usize);
        if let Err(e) = entry.read_to_end(&mut bytes) {
            findings.push(FileFinding::new(
                FileRuleCategory::ExtractionFailure,
                format!("archive entry '{name}' unreadable: {e}"),
            ));
            continue;
        }

        entries.push(ExtractedEntry { name, data: bytes });
    }

    Ok((entries, findings))
}

/// Recovers an entry name, trying EUC-KR when the raw bytes are not
/// valid UTF-8. Legacy Korean archivers write CP949 names that would
/// otherwise come out mangled.
fn decode_entry_name(raw: &[u8], fallback: &str) -> String {
    if std::str::from_utf8(raw).is_ok() {
        return fallback.to_string();
    }
    let (decoded, _, had_errors) = encoding_rs::EUC_KR.decode(raw);
    if had_errors {
        fallback.to_string()
    } else {
        decoded.into_owned()
    }
}
