//! Output serialization (§6): writes the `<out>/` tree — section text
//! files, table text/CSV/JSON triples, and the document-level provenance
//! and diagnostic files.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use crate::error::{FatalError, ParseReport};
use crate::sections::FlushedSection;
use crate::tables::PendingTable;

fn io_err(page: usize, detail: impl std::fmt::Display) -> FatalError {
    FatalError::UnhandledException {
        page,
        detail: detail.to_string(),
    }
}

/// Render an ascending, contiguous-checked page list as `a` or `a–b`.
/// Fails if the pages aren't contiguous (gaps in an emitted record are
/// fatal per §6).
fn render_page_range(pages: &[usize]) -> Result<String, String> {
    if pages.is_empty() {
        return Err("empty page list".to_string());
    }
    let mut sorted = pages.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    for window in sorted.windows(2) {
        if window[1] != window[0] + 1 {
            return Err(format!("non-contiguous page list: {sorted:?}"));
        }
    }
    let first = sorted[0];
    let last = *sorted.last().unwrap();
    if first == last {
        Ok(first.to_string())
    } else {
        Ok(format!("{first}\u{2013}{last}"))
    }
}

/// Write `section_<ID>.txt` for one flushed section.
pub fn write_section_file(out_dir: &Path, section: &FlushedSection, chapter: &str) -> Result<(), FatalError> {
    let pages: Vec<usize> = (section.start_page..=section.end_page).collect();
    let page_range =
        render_page_range(&pages).map_err(|detail| io_err(section.start_page, detail))?;

    let mut contents = String::new();
    contents.push_str(&format!("PDF_PAGE: {page_range}\n"));
    contents.push_str(&format!("SECTION_ID: {}\n", section.id));
    contents.push_str(&format!("SECTION: IRC 2021 | {chapter} | Section {}\n", section.id));
    contents.push('\n');
    for line in &section.lines {
        contents.push_str(line);
        contents.push('\n');
    }

    let filename = format!("section_{}.txt", sanitize_id(&section.id));
    fs::write(out_dir.join(filename), contents).map_err(|e| io_err(section.start_page, e))
}

/// Write the `table_<ID>.txt` / `.csv` / `.json` triple for one finalized
/// table.
pub fn write_table_files(out_dir: &Path, table: &PendingTable) -> Result<(), FatalError> {
    let page = table.pdf_pages.first().copied().unwrap_or(0);
    let page_range = render_page_range(&table.pdf_pages).map_err(|detail| io_err(page, detail))?;
    let base = sanitize_id(&table.id);

    let mut txt = String::new();
    txt.push_str(&format!("PDF_PAGE: {page_range}\n"));
    txt.push_str(&format!("TABLE_ID: {}\n", table.id));
    txt.push_str(&format!("TITLE: {}\n", table.title));
    txt.push_str("COLUMNS:\n");
    txt.push_str(&format!("{}\n", table.columns.join(" | ")));
    txt.push_str("ROWS:\n");
    for row in &table.rows {
        txt.push_str(&format!("{}\n", row.join(" | ")));
    }
    txt.push_str("FOOTNOTES:\n");
    for footnote in &table.footnotes {
        txt.push_str(footnote);
        txt.push('\n');
    }
    fs::write(out_dir.join(format!("table_{base}.txt")), txt).map_err(|e| io_err(page, e))?;

    let mut csv = String::new();
    csv.push_str(&csv_row(&table.columns));
    csv.push('\n');
    for row in &table.rows {
        csv.push_str(&csv_row(row));
        csv.push('\n');
    }
    fs::write(out_dir.join(format!("table_{base}.csv")), csv).map_err(|e| io_err(page, e))?;

    let json = table_to_json(table, &page_range);
    let rendered =
        serde_json::to_string_pretty(&json).map_err(|e| io_err(page, format!("serializing table json: {e}")))?;
    fs::write(out_dir.join(format!("table_{base}.json")), rendered).map_err(|e| io_err(page, e))
}

fn csv_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn csv_row(fields: &[String]) -> String {
    fields.iter().map(|f| csv_field(f)).collect::<Vec<_>>().join(",")
}

fn table_to_json(table: &PendingTable, page_range: &str) -> serde_json::Value {
    serde_json::json!({
        "table_id": table.id,
        "pdf_page": page_range,
        "title": table.title,
        "columns": table.columns,
        "rows": table.rows,
        "footnotes": table.footnotes,
        "rotation": table.rotation,
        "pdf_pages": table.pdf_pages,
        "bbox_list": table.bbox_list.iter().map(|b| {
            serde_json::json!({"x0": b.x0, "top": b.top, "x1": b.x1, "bottom": b.bottom})
        }).collect::<Vec<_>>(),
    })
}

/// Escape an id for use in a filename: parens and dots are kept as-is
/// (they're valid on every target filesystem this tool runs on), but
/// path separators are rejected outright — a canonical id should never
/// contain one.
fn sanitize_id(id: &str) -> String {
    id.replace(['/', '\\'], "_")
}

/// Write `_source_pdf_sha256.txt`.
pub fn write_source_hash(out_dir: &Path, sha256: &str) -> io::Result<()> {
    fs::write(out_dir.join("_source_pdf_sha256.txt"), format!("{sha256}\n"))
}

/// Write `_parse_report.json`.
pub fn write_parse_report(out_dir: &Path, report: &ParseReport) -> io::Result<()> {
    let rendered = serde_json::to_string_pretty(&report_to_json(report)).expect("report always serializes");
    fs::write(out_dir.join("_parse_report.json"), rendered)
}

fn report_to_json(report: &ParseReport) -> serde_json::Value {
    serde_json::json!({
        "warnings": report.warnings.iter().map(|w| serde_json::json!({
            "code": w.code.as_str(),
            "page": w.page,
            "detail": w.detail,
        })).collect::<Vec<_>>(),
        "sections_emitted": report.sections_emitted,
        "tables_emitted": report.tables_emitted,
        "source_sha256": report.source_sha256,
        "allowlisted": report.allowlisted,
        "page_start": report.page_start,
        "page_end": report.page_end,
        "fatal": report.fatal,
    })
}

/// Write a `fallback_text/page_<NNNN>.txt` artifact — used only when the
/// whole run emits zero sections (§6).
pub fn write_fallback_page(out_dir: &Path, page_number: usize, text: &str) -> Result<(), FatalError> {
    let dir = out_dir.join("fallback_text");
    fs::create_dir_all(&dir).map_err(|e| io_err(page_number, e))?;
    fs::write(dir.join(format!("page_{page_number:04}.txt")), text).map_err(|e| io_err(page_number, e))
}

/// Aggregate page→content map used by the driver to decide whether the
/// whole-run fallback applies.
pub type FallbackPages = BTreeMap<usize, String>;
