//! Legacy compound-file workbook checks.
//!
//! Full BIFF record parsing is out of proportion for passive triage, so
//! legacy workbooks get container-level checks: macro and embedded-object
//! storage markers located in the raw container, plus the complete
//! cell-content pattern tables run over every printable ASCII and
//! UTF-16LE string extracted from it. Sheet and row structure is not
//! reconstructed for this format.

use crate::workbook::scanner::WorkbookAccumulator;

/// Storage names written into compound files that carry VBA projects.
const MACRO_MARKERS: &[&str] = &["_VBA_PROJECT", "Macros", "ThisWorkbook"];

/// Storage names associated with embedded OLE objects.
const EMBEDDED_MARKERS: &[&str] = &["Ole10Native", "MBD00"];

/// Minimum length for an extracted string to be considered.
const MIN_STRING_LEN: usize = 5;

/// Upper bound on extracted strings fed through the pattern tables.
const MAX_STRINGS: usize = 2000;

/// Scans a legacy compound-file workbook into the accumulator.
pub(crate) fn scan(data: &[u8], acc: &mut WorkbookAccumulator) {
    if MACRO_MARKERS.iter().any(|m| contains_marker(data, m)) {
        acc.record_macros();
    }
    if EMBEDDED_MARKERS.iter().any(|m| contains_marker(data, m)) {
        acc.record_embedded_objects();
    }

    let mut strings = extract_ascii_strings(data, MIN_STRING_LEN, MAX_STRINGS);
    let remaining = MAX_STRINGS.saturating_sub(strings.len());
    strings.extend(extract_utf16le_strings(data, MIN_STRING_LEN, remaining));

    for text in &strings {
        acc.check_cell_content(None, std::slice::from_ref(text));
    }
}

/// Looks for a marker in both its ASCII and UTF-16LE encodings;
/// compound-file directory entry names are stored as UTF-16.
fn contains_marker(data: &[u8], marker: &str) -> bool {
    if memchr::memmem::find(data, marker.as_bytes()).is_some() {
        return true;
    }
    let wide: Vec<u8> = marker
        .as_bytes()
        .iter()
        .flat_map(|&b| [b, 0u8])
        .collect();
    memchr::memmem::find(data, &wide).is_some()
}

fn extract_ascii_strings(data: &[u8], min_len: usize, cap: usize) -> Vec<String> {
    let mut strings = Vec::new();
    let mut current = String::new();

    for &byte in data {
        if (0x20..0x7F).contains(&byte) {
            current.push(byte as char);
        } else {
            if current.len() >= min_len {
                strings.push(std::mem::take(&mut current));
                if strings.len() >= cap {
                    return strings;
                }
            } else {
                current.clear();
            }
        }
    }
    if current.len() >= min_len && strings.len() < cap {
        strings.push(current);
    }
    strings
}

fn extract_utf16le_strings(data: &[u8], min_len: usize, cap: usize) -> Vec<String> {
    let mut strings = Vec::new();
    let mut current = String::new();

    for pair in data.chunks_exact(2) {
        let unit = u16::from_le_bytes([pair[0], pair[1]]);
        let printable = (0x20..0x7F).contains(&unit);
        if printable {
            current.push(unit as u8 as char);
        } else {
            if current.len() >= min_len {
                strings.push(std::mem::take(&mut current));
                if strings.len() >= cap {
                    return strings;
                }
            } else {
                current.clear();
            }
        }
    }
    if current.len() >= min_len && strings.len() < cap {
        strings.push(current);
    }
    strings
}
