//! OOXML workbook parsing.
//!
//! Walks the zip container of a modern workbook: `xl/workbook.xml` for
//! sheet metadata and defined names, `xl/sharedStrings.xml` for cached
//! text, each worksheet part for rows, columns, and cells, and the
//! worksheet relationship parts for hyperlink targets. Formulas are
//! read as text and matched against the attack tables; nothing is ever
//! evaluated.

use crate::signatures::workbook::is_auto_exec_name;
use crate::workbook::scanner::WorkbookAccumulator;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::Read;

/// Scans a zip-based workbook into the accumulator.
///
/// Returns `Err` only when the container itself cannot be walked (not a
/// readable zip, or no workbook part); the caller degrades that to the
/// fail-safe result.
pub(crate) fn scan(data: &[u8], acc: &mut WorkbookAccumulator) -> Result<(), String> {
    let cursor = std::io::Cursor::new(data);
    let mut archive = zip::ZipArchive::new(cursor).map_err(|e| e.to_string())?;
    let names: Vec<String> = archive.file_names().map(String::from).collect();

    // Macro payload and embedded objects are container-level facts.
    if names.iter().any(|n| n.ends_with("vbaProject.bin")) {
        acc.record_macros();
    }
    if names
        .iter()
        .any(|n| n.starts_with("xl/embeddings/") || n.starts_with("xl/activeX/"))
    {
        acc.record_embedded_objects();
    }

    let workbook_xml = read_entry(&mut archive, "xl/workbook.xml")
        .ok_or_else(|| "missing xl/workbook.xml".to_string())?;
    let (sheets, defined_names) = parse_workbook_xml(&workbook_xml);

    acc.set_sheet_count(sheets.len());
    for sheet in &sheets {
        if sheet.hidden {
            acc.record_hidden_sheet(&sheet.name);
        }
    }
    for name in &defined_names {
        if is_auto_exec_name(name) {
            acc.record_auto_exec_name(name);
        }
    }

    let shared = read_entry(&mut archive, "xl/sharedStrings.xml")
        .map(|xml| parse_shared_strings(&xml))
        .unwrap_or_default();

    // Worksheet parts, in sheet order.
    let mut sheet_parts: Vec<(usize, String)> = names
        .iter()
        .filter_map(|n| worksheet_index(n).map(|i| (i, n.clone())))
        .collect();
    sheet_parts.sort();

    for (index, part) in &sheet_parts {
        let sheet_name = index
            .checked_sub(1)
            .and_then(|i| sheets.get(i))
            .map(|s| s.name.clone())
            .unwrap_or_else(|| format!("sheet{index}"));
        if let Some(xml) = read_entry(&mut archive, part) {
            parse_sheet(&xml, &sheet_name, &shared, acc);
        }
    }

    // Hyperlink targets live in the worksheet relationship parts.
    let rel_parts: Vec<(usize, String)> = names
        .iter()
        .filter_map(|n| rels_index(n).map(|i| (i, n.clone())))
        .collect();
    for (index, part) in rel_parts {
        let sheet_name = index
            .checked_sub(1)
            .and_then(|i| sheets.get(i))
            .map(|s| s.name.clone())
            .unwrap_or_else(|| format!("sheet{index}"));
        if let Some(xml) = read_entry(&mut archive, &part) {
            for target in parse_hyperlink_targets(&xml) {
                let location = format!("{sheet_name} (hyperlink)");
                acc.check_hyperlink_target(Some(&location), &target);
            }
        }
    }

    Ok(())
}

/// Sheet metadata from `xl/workbook.xml`.
#[derive(Debug, Clone)]
struct SheetMeta {
    name: String,
    hidden: bool,
}

fn attr_value(element: &BytesStart<'_>, name: &[u8]) -> Option<String> {
    element
        .attributes()
        .with_checks(false)
        .flatten()
        .find_map(|attr| {
            if attr.key.local_name().as_ref() == name {
                attr.unescape_value().ok().map(|v| v.into_owned())
            } else {
                None
            }
        })
}

fn is_true(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

/// Index of a worksheet part: `xl/worksheets/sheet<N>.xml`.
fn worksheet_index(name: &str) -> Option<usize> {
    name.strip_prefix("xl/worksheets/sheet")?
        .strip_suffix(".xml")?
        .parse()
        .ok()
}

/// Index of a worksheet relationship part:
/// `xl/worksheets/_rels/sheet<N>.xml.rels`.
fn rels_index(name: &str) -> Option<usize> {
    name.strip_prefix("xl/worksheets/_rels/sheet")?
        .strip_suffix(".xml.rels")?
        .parse()
        .ok()
}

fn read_entry<R: Read + std::io::Seek>(
    archive: &mut zip::ZipArchive<R>,
    name: &str,
) -> Option<String> {
    let mut entry = archive.by_name(name).ok()?;
    let mut bytes = Vec::new();
    entry.read_to_end(&mut bytes).ok()?;
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

fn parse_workbook_xml(xml: &str) -> (Vec<SheetMeta>, Vec<String>) {
    let mut reader = Reader::from_str(xml);
    let mut sheets = Vec::new();
    let mut defined_names = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                match e.local_name().as_ref() {
                    b"sheet" => {
                        let name = attr_value(e, b"name").unwrap_or_default();
                        let hidden = attr_value(e, b"state")
                            .map(|s| s == "hidden" || s == "veryHidden")
                            .unwrap_or(false);
                        sheets.push(SheetMeta { name, hidden });
                    }
                    b"definedName" => {
                        if let Some(name) = attr_value(e, b"name") {
                            defined_names.push(name);
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
    }

    (sheets, defined_names)
}

fn parse_shared_strings(xml: &str) -> Vec<String> {
    let mut reader = Reader::from_str(xml);
    let mut strings = Vec::new();
    let mut current = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"si" => current.clear(),
                b"t" => in_text = true,
                _ => {}
            },
            Ok(Event::Text(ref t)) if in_text => {
                if let Ok(text) = t.unescape() {
                    current.push_str(&text);
                }
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"si" => strings.push(current.clone()),
                _ => {}
            },
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
    }

    strings
}

/// What text content is currently being captured inside a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Capture {
    None,
    Formula,
    Value,
    InlineText,
}

fn parse_sheet(xml: &str, sheet_name: &str, shared: &[String], acc: &mut WorkbookAccumulator) {
    let mut reader = Reader::from_str(xml);

    let mut capture = Capture::None;
    let mut cell_ref: Option<String> = None;
    let mut cell_type: Option<String> = None;
    let mut formula: Option<String> = None;
    let mut value: Option<String> = None;
    let mut inline: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e))
                if matches!(e.local_name().as_ref(), b"row" | b"col") =>
            {
                if attr_value(e, b"hidden").map(|v| is_true(&v)).unwrap_or(false) {
                    acc.record_hidden_cell_ranges(sheet_name);
                }
            }
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"c" => {
                    cell_ref = attr_value(e, b"r");
                    cell_type = attr_value(e, b"t");
                    formula = None;
                    value = None;
                    inline = None;
                }
                b"f" => {
                    capture = Capture::Formula;
                    formula = Some(String::new());
                }
                b"v" => {
                    capture = Capture::Value;
                    value = Some(String::new());
                }
                b"t" => {
                    capture = Capture::InlineText;
                    if inline.is_none() {
                        inline = Some(String::new());
                    }
                }
                _ => {}
            },
            Ok(Event::Text(ref t)) if capture != Capture::None => {
                if let Ok(text) = t.unescape() {
                    let target = match capture {
                        Capture::Formula => formula.as_mut(),
                        Capture::Value => value.as_mut(),
                        Capture::InlineText => inline.as_mut(),
                        Capture::None => None,
                    };
                    if let Some(buffer) = target {
                        buffer.push_str(&text);
                    }
                }
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"f" | b"v" | b"t" => capture = Capture::None,
                b"c" => {
                    process_cell(
                        sheet_name,
                        cell_ref.take(),
                        cell_type.take(),
                        formula.take(),
                        value.take(),
                        inline.take(),
                        shared,
                        acc,
                    );
                }
                _ => {}
            },
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn process_cell(
    sheet_name: &str,
    cell_ref: Option<String>,
    cell_type: Option<String>,
    formula: Option<String>,
    value: Option<String>,
    inline: Option<String>,
    shared: &[String],
    acc: &mut WorkbookAccumulator,
) {
    let mut candidates = Vec::new();

    // Formula text, checked both bare and with the leading `=` Excel
    // displays, so patterns anchored either way can match.
    if let Some(f) = formula.filter(|f| !f.trim().is_empty()) {
        acc.count_formula();
        candidates.push(format!("={f}"));
        candidates.push(f);
    }

    // Raw or cached value, resolved through the shared-string table.
    let resolved = match cell_type.as_deref() {
        Some("s") => value
            .as_deref()
            .and_then(|v| v.trim().parse::<usize>().ok())
            .and_then(|index| shared.get(index))
            .cloned(),
        Some("inlineStr") => inline,
        _ => value,
    };

    if let Some(v) = resolved.filter(|v| !v.trim().is_empty()) {
        // Some producers store attack strings as plain values with a
        // formula marker; count those as formulas too.
        if v.starts_with('=') && candidates.is_empty() {
            acc.count_formula();
        }
        candidates.push(v);
    }

    if candidates.is_empty() {
        return;
    }

    let location = format!(
        "{sheet_name}!{}",
        cell_ref.as_deref().unwrap_or("?")
    );
    acc.check_cell_content(Some(&location), &candidates);
}

fn parse_hyperlink_targets(xml: &str) -> Vec<String> {
    let mut reader = Reader::from_str(xml);
    let mut targets = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e))
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let relationship_type = attr_value(e, b"Type").unwrap_or_default();
                if !relationship_type.contains("/hyperlink") {
                    continue;
                }
                let external = attr_value(e, b"TargetMode")
                    .map(|m| m.eq_ignore_ascii_case("External"))
                    .unwrap_or(false);
                if let Some(target) = attr_value(e, b"Target") {
                    if external || target.contains("://") || target.starts_with("\\\\") {
                        targets.push(target);
                    }
                }
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
    }

    targets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::result::WorkbookCategory;
    use crate::core::types::RiskLevel;
    use crate::workbook::WorkbookScanner;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn build_container(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        for (name, content) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn workbook_xml(sheets: &str, defined: &str) -> String {
        format!(
            "<?xml version=\"1.0\"?><workbook><sheets>{sheets}</sheets>\
             <definedNames>{defined}</definedNames></workbook>"
        )
    }

    fn sheet_with_cells(cells: &str) -> String {
        format!(
            "<?xml version=\"1.0\"?><worksheet><sheetData><row r=\"1\">{cells}</row>\
             </sheetData></worksheet>"
        )
    }

    #[test]
    fn test_clean_workbook_is_low_with_no_findings() {
        let container = build_container(&[
            (
                "xl/workbook.xml",
                &workbook_xml("<sheet name=\"Sheet1\" sheetId=\"1\"/>", ""),
            ),
            (
                "xl/worksheets/sheet1.xml",
                &sheet_with_cells(
                    "<c r=\"A1\"><v>42</v></c>\
                     <c r=\"A2\"><f>SUM(A1:A1)</f><v>42</v></c>\
                     <c r=\"A3\" t=\"inlineStr\"><is><t>quarterly totals</t></is></c>",
                ),
            ),
        ]);

        let result = WorkbookScanner::new().scan(&container);

        assert_eq!(result.sheet_count, 1);
        assert_eq!(result.formula_count, 1);
        assert!(!result.has_macros);
        assert!(!result.has_hidden_sheets);
        assert!(!result.has_external_links);
        assert!(result.findings.is_empty());
        assert_eq!(result.risk_score, 0);
        assert_eq!(result.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_dde_cell_is_critical_with_location() {
        let container = build_container(&[
            (
                "xl/workbook.xml",
                &workbook_xml("<sheet name=\"Sheet1\" sheetId=\"1\"/>", ""),
            ),
            (
                "xl/worksheets/sheet1.xml",
                &sheet_with_cells(
                    "<c r=\"A1\" t=\"inlineStr\"><is><t>cmd|&quot;/c calc.exe&quot;!A1</t></is></c>",
                ),
            ),
        ]);

        let result = WorkbookScanner::new().scan(&container);

        assert!(result.has_formula_injection);
        let finding = result
            .findings
            .iter()
            .find(|f| f.category == WorkbookCategory::DdeAttack)
            .unwrap();
        assert_eq!(finding.severity, crate::core::types::Severity::Critical);
        assert_eq!(finding.location.as_deref(), Some("Sheet1!A1"));
        assert!(finding.snippet.as_deref().unwrap().starts_with("cmd|"));
        assert_eq!(result.risk_level, RiskLevel::Critical);
    }

    #[test]
    fn test_dde_via_shared_string() {
        let container = build_container(&[
            (
                "xl/workbook.xml",
                &workbook_xml("<sheet name=\"Data\" sheetId=\"1\"/>", ""),
            ),
            (
                "xl/sharedStrings.xml",
                "<?xml version=\"1.0\"?><sst><si><t>=DDEAUTO(\"cmd\" \"/c notepad\")</t></si></sst>",
            ),
            (
                "xl/worksheets/sheet1.xml",
                &sheet_with_cells("<c r=\"B2\" t=\"s\"><v>0</v></c>"),
            ),
        ]);

        let result = WorkbookScanner::new().scan(&container);

        assert!(result.has_formula_injection);
        let finding = result
            .findings
            .iter()
            .find(|f| f.category == WorkbookCategory::DdeAttack)
            .unwrap();
        assert_eq!(finding.location.as_deref(), Some("Data!B2"));
    }

    #[test]
    fn test_formula_with_dangerous_function() {
        let container = build_container(&[
            (
                "xl/workbook.xml",
                &workbook_xml("<sheet name=\"Sheet1\" sheetId=\"1\"/>", ""),
            ),
            (
                "xl/worksheets/sheet1.xml",
                &sheet_with_cells(
                    "<c r=\"C3\"><f>WEBSERVICE(\"http://attacker.example/x\")</f></c>",
                ),
            ),
        ]);

        let result = WorkbookScanner::new().scan(&container);

        assert_eq!(result.formula_count, 1);
        assert!(result
            .findings
            .iter()
            .any(|f| f.category == WorkbookCategory::MaliciousFormula));
        // The embedded URI also counts as an external reference.
        assert!(result.has_external_links);
    }

    #[test]
    fn test_hidden_sheet_and_rows() {
        let container = build_container(&[
            (
                "xl/workbook.xml",
                &workbook_xml(
                    "<sheet name=\"Visible\" sheetId=\"1\"/>\
                     <sheet name=\"Stash\" sheetId=\"2\" state=\"hidden\"/>",
                    "",
                ),
            ),
            (
                "xl/worksheets/sheet1.xml",
                "<?xml version=\"1.0\"?><worksheet><sheetData>\
                 <row r=\"2\" hidden=\"1\"><c r=\"A2\"><v>99</v></c></row>\
                 </sheetData></worksheet>",
            ),
            (
                "xl/worksheets/sheet2.xml",
                &sheet_with_cells("<c r=\"A1\"><v>1</v></c>"),
            ),
        ]);

        let result = WorkbookScanner::new().scan(&container);

        assert_eq!(result.sheet_count, 2);
        assert!(result.has_hidden_sheets);
        assert!(result.has_hidden_cell_ranges);
        assert!(result
            .findings
            .iter()
            .any(|f| f.description.contains("hidden sheet: Stash")));
        // +5 hidden sheet, +3 hidden rows
        assert_eq!(result.risk_score, 8);
    }

    #[test]
    fn test_macros_and_auto_exec_names() {
        let container = build_container(&[
            (
                "xl/workbook.xml",
                &workbook_xml(
                    "<sheet name=\"Sheet1\" sheetId=\"1\"/>",
                    "<definedName name=\"Auto_Open\">Sheet1.A1</definedName>",
                ),
            ),
            ("xl/vbaProject.bin", "not really vba"),
            (
                "xl/worksheets/sheet1.xml",
                &sheet_with_cells("<c r=\"A1\"><v>1</v></c>"),
            ),
        ]);

        let result = WorkbookScanner::new().scan(&container);

        assert!(result.has_macros);
        assert!(result
            .findings
            .iter()
            .any(|f| f.description.contains("Auto_Open")));
        // +10 macros, +10 auto-exec name
        assert_eq!(result.risk_score, 20);
        assert_eq!(result.risk_level, RiskLevel::Critical);
    }

    #[test]
    fn test_embedded_objects_flagged_once() {
        let container = build_container(&[
            (
                "xl/workbook.xml",
                &workbook_xml("<sheet name=\"Sheet1\" sheetId=\"1\"/>", ""),
            ),
            ("xl/embeddings/oleObject1.bin", "blob"),
            ("xl/embeddings/oleObject2.bin", "blob"),
            (
                "xl/worksheets/sheet1.xml",
                &sheet_with_cells("<c r=\"A1\"><v>1</v></c>"),
            ),
        ]);

        let result = WorkbookScanner::new().scan(&container);

        assert!(result.has_embedded_objects);
        let embedded = result
            .findings
            .iter()
            .filter(|f| f.category == WorkbookCategory::EmbeddedObject)
            .count();
        assert_eq!(embedded, 1);
        assert_eq!(result.risk_score, 8);
    }

    #[test]
    fn test_hyperlink_target_via_rels() {
        let container = build_container(&[
            (
                "xl/workbook.xml",
                &workbook_xml("<sheet name=\"Sheet1\" sheetId=\"1\"/>", ""),
            ),
            (
                "xl/worksheets/sheet1.xml",
                &sheet_with_cells("<c r=\"A1\"><v>1</v></c>"),
            ),
            (
                "xl/worksheets/_rels/sheet1.xml.rels",
                "<?xml version=\"1.0\"?><Relationships>\
                 <Relationship Id=\"rId1\" \
                 Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink\" \
                 Target=\"file:///C:/Windows/System32/calc.exe\" TargetMode=\"External\"/>\
                 </Relationships>",
            ),
        ]);

        let result = WorkbookScanner::new().scan(&container);

        assert!(result.has_external_links);
        assert_eq!(result.external_link_count, 1);
        let finding = result
            .findings
            .iter()
            .find(|f| f.category == WorkbookCategory::ExternalLink)
            .unwrap();
        assert_eq!(finding.severity, crate::core::types::Severity::Critical);
        assert!(finding.location.as_deref().unwrap().contains("Sheet1"));
    }

    #[test]
    fn test_zip_without_workbook_part_degrades() {
        let container = build_container(&[("random.txt", "not a workbook")]);
        let result = WorkbookScanner::new().scan(&container);

        assert_eq!(result.risk_score, crate::workbook::scanner::PARSE_FAILURE_SCORE);
        assert_eq!(result.risk_level, RiskLevel::Medium);
        assert_eq!(result.findings.len(), 1);
    }
}
