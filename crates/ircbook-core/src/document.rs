//! Document-level traversal driver (§5): the single lexical owner of every
//! piece of shared mutable state across pages — the section stack, the
//! pending table slot, the accepted-id set, and the parse-report
//! accumulator. Pages are processed strictly in ascending order.

use std::path::PathBuf;

use crate::debug::DebugPageArtifact;
use crate::error::{FatalError, ParseReport, Warning, WarningCode};
use crate::geometry::native_bbox;
use crate::integrity::enforce_integrity;
use crate::lines::{reconstruct_lines, Column};
use crate::output::{self, FallbackPages};
use crate::primitives::{check_allowlist, check_amendment_scan, split_bands, Document};
use crate::rulings::detect_tables;
use crate::sections::{
    body_median_size, is_header_position, is_header_style, is_toc_page, recognize_heading,
    FlushedSection, SectionStack,
};
use crate::tables::{advance_continuation, bind_label, capture_footnotes, BoundTable, PendingTable};

#[cfg(feature = "tracing")]
fn trace_page_start(page_number: usize) {
    tracing::info!(page = page_number, "processing page");
}
#[cfg(not(feature = "tracing"))]
fn trace_page_start(_page_number: usize) {}

#[cfg(feature = "tracing")]
fn trace_fatal(err: &FatalError) {
    tracing::error!(rule = err.code(), "run aborted");
}
#[cfg(not(feature = "tracing"))]
fn trace_fatal(_err: &FatalError) {}

/// Invocation configuration — the CLI's flat argument struct, lowered to
/// what the core pipeline needs. No config-file layer; see SPEC_FULL.md §1a.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub pdf_path: PathBuf,
    pub out_dir: PathBuf,
    pub page_start: Option<usize>,
    pub page_end: Option<usize>,
    pub debug_dump: bool,
}

/// The document-level driver. Owns every cross-page mutable state object
/// named in §5.
pub struct Run {
    config: RunConfig,
    stack: SectionStack,
    pending_table: Option<PendingTable>,
    report: ParseReport,
    finalized_tables: Vec<PendingTable>,
    flushed_sections: Vec<FlushedSection>,
    fallback_pages: FallbackPages,
}

impl Run {
    pub fn new(config: RunConfig) -> Self {
        Self {
            config,
            stack: SectionStack::new(),
            pending_table: None,
            report: ParseReport::default(),
            finalized_tables: Vec::new(),
            flushed_sections: Vec::new(),
            fallback_pages: FallbackPages::new(),
        }
    }

    /// Run the full pipeline. On any fatal error, the parse report (and
    /// whatever provenance files were already produced) is still written
    /// before the error is returned — §7's "flushes up to and including
    /// the failing page's diagnostic".
    pub fn execute(mut self) -> Result<ParseReport, FatalError> {
        let result = self.execute_inner();
        if let Err(ref err) = result {
            trace_fatal(err);
            self.report.fatal = Some(err.to_string());
        }
        let _ = std::fs::create_dir_all(&self.config.out_dir);
        let _ = output::write_parse_report(&self.config.out_dir, &self.report);
        result.map(|()| self.report.clone())
    }

    fn execute_inner(&mut self) -> Result<(), FatalError> {
        std::fs::create_dir_all(&self.config.out_dir).map_err(|e| FatalError::PdfInputMissing {
            detail: format!("creating output directory: {e}"),
        })?;

        let document = Document::open(&self.config.pdf_path)?;
        self.report.source_sha256 = document.sha256.clone();
        output::write_source_hash(&self.config.out_dir, &document.sha256).map_err(|e| {
            FatalError::PdfInputMissing {
                detail: format!("writing source hash: {e}"),
            }
        })?;

        let allowlist_path = self.config.out_dir.join("_allowed_pdf_hashes.txt");
        let decision = check_allowlist(&allowlist_path, &document.sha256)?;
        self.report.allowlisted = decision.allowed;
        if decision.seeded {
            self.report.push_warning(Warning::new(
                WarningCode::AllowlistAutoSeeded,
                None,
                format!("seeded allowlist with {}", document.sha256),
            ));
        }
        if !decision.allowed {
            return Err(FatalError::PdfHashNotAllowed {
                page: 0,
                detail: format!("hash {} not present in allowlist", document.sha256),
            });
        }

        let (start, end) = self.resolve_page_range(document.page_count)?;
        self.report.page_start = start;
        self.report.page_end = end;

        for page_number in start..=end {
            self.process_page(&document, page_number)?;
        }

        if let Some(pending) = self.pending_table.take() {
            return Err(FatalError::TableContinuation {
                page: end,
                detail: format!("pending table {} never closed by end of document", pending.id),
            });
        }

        for section in self.stack.flush_all() {
            self.flushed_sections.push(section);
        }

        enforce_integrity(&self.flushed_sections, self.stack.accepted_ids())?;

        for section in &self.flushed_sections {
            let chapter = section.id.split('.').next().unwrap_or(&section.id);
            output::write_section_file(&self.config.out_dir, section, chapter)?;
        }
        for table in &self.finalized_tables {
            output::write_table_files(&self.config.out_dir, table)?;
        }

        self.report.sections_emitted = self.flushed_sections.len();
        self.report.tables_emitted = self.finalized_tables.len();

        if self.report.sections_emitted == 0 {
            for (page_number, text) in &self.fallback_pages {
                output::write_fallback_page(&self.config.out_dir, *page_number, text)?;
            }
        }

        Ok(())
    }

    fn resolve_page_range(&mut self, page_count: usize) -> Result<(usize, usize), FatalError> {
        let start = self.config.page_start.unwrap_or(1);
        if start < 1 || start > page_count {
            return Err(FatalError::PageRangeInvalid {
                detail: format!("page_start={start} out of range for {page_count}-page document"),
            });
        }
        let requested_end = self.config.page_end.unwrap_or(page_count);
        let end = if requested_end > page_count {
            self.report.push_warning(Warning::new(
                WarningCode::PageEndClamped,
                None,
                format!("page_end {requested_end} clamped to {page_count}"),
            ));
            page_count
        } else {
            requested_end
        };
        if start > end {
            return Err(FatalError::PageRangeInvalid {
                detail: format!("page_start={start} > page_end={end}"),
            });
        }
        Ok((start, end))
    }

    fn process_page(&mut self, document: &Document, page_number: usize) -> Result<(), FatalError> {
        trace_page_start(page_number);
        let intake = document.intake_page(page_number - 1, page_number)?;
        let (header_text, footer_text, body_chars) = split_bands(&intake)?;
        check_amendment_scan(page_number, &header_text, &footer_text)?;

        let rotation_result = detect_tables(
            page_number,
            &intake.raw_segments,
            &intake.chars,
            &intake.words,
            intake.width,
            intake.height,
        )?;
        if let Some(warning) = rotation_result.warning.clone() {
            self.report.push_warning(warning);
        }

        let table_bboxes_native: Vec<_> = rotation_result
            .candidates
            .iter()
            .map(|c| native_bbox(c.bbox, rotation_result.rotation, intake.width, intake.height))
            .collect();

        let filtered_body: Vec<_> = body_chars
            .into_iter()
            .filter(|ch| {
                let cx = (ch.bbox.x0 + ch.bbox.x1) / 2.0;
                let cy = (ch.bbox.top + ch.bbox.bottom) / 2.0;
                !table_bboxes_native
                    .iter()
                    .any(|b| cx >= b.x0 && cx <= b.x1 && cy >= b.top && cy <= b.bottom)
            })
            .collect();

        let reconstruction = reconstruct_lines(page_number, &filtered_body, intake.width, &table_bboxes_native)?;

        if self.config.debug_dump {
            let artifact = DebugPageArtifact::new(
                page_number,
                rotation_result.rotation,
                &rotation_result.candidates,
                Some(reconstruction.bounds.split_x),
                &reconstruction.lines,
            );
            let _ = artifact.write(&self.config.out_dir);
        }

        let all_lines_ref: Vec<&_> = reconstruction.lines.iter().collect();
        let mut bound_tables = Vec::new();
        for (idx, candidate) in rotation_result.candidates.into_iter().enumerate() {
            let native = table_bboxes_native[idx];
            let label = bind_label(&native, &all_lines_ref, page_number, idx, &mut self.report.warnings);
            let footnotes = capture_footnotes(&native, &all_lines_ref);
            bound_tables.push(BoundTable {
                candidate,
                label,
                footnotes,
            });
        }

        let outcome = advance_continuation(
            page_number,
            intake.height,
            self.pending_table.take(),
            bound_tables,
            &all_lines_ref,
        )?;
        self.finalized_tables.extend(outcome.finalized);
        self.pending_table = outcome.pending;

        let page_is_toc = is_toc_page(&header_text);

        let fallback_text: String = reconstruction
            .lines
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        self.fallback_pages.insert(page_number, fallback_text);

        if page_is_toc {
            return Ok(());
        }

        self.process_section_lines(page_number, &reconstruction.lines, &reconstruction.bounds)
    }

    fn process_section_lines(
        &mut self,
        page_number: usize,
        lines: &[crate::lines::ReconstructedLine],
        bounds: &crate::lines::ColumnBounds,
    ) -> Result<(), FatalError> {
        let candidate_lines: Vec<&crate::lines::ReconstructedLine> = lines
            .iter()
            .filter(|l| matches!(l.column, Column::Left | Column::Right))
            .collect();
        let Some(median_size) = body_median_size(
            &candidate_lines.iter().map(|l| (*l).clone()).collect::<Vec<_>>(),
        ) else {
            return Ok(());
        };

        let mut skip_next = false;
        let mut i = 0usize;
        while i < candidate_lines.len() {
            if skip_next {
                skip_next = false;
                i += 1;
                continue;
            }
            let line = candidate_lines[i];
            let margin = match line.column {
                Column::Left => bounds.left_margin,
                _ => bounds.right_margin,
            };
            let in_position = is_header_position(line.bbox.x0, margin, bounds.char_width);
            let in_style = is_header_style(line, median_size);

            if in_position && in_style {
                let next_text = candidate_lines.get(i + 1).map(|l| l.text.as_str());
                match recognize_heading(&line.text, next_text) {
                    Some(heading) => {
                        if heading.is_bare_marker {
                            self.stack.implicit_pop(page_number, &mut self.flushed_sections);
                        } else {
                            self.stack
                                .accept_heading(&heading, page_number, &mut self.flushed_sections)?;
                            if next_text.is_some() && heading.title == next_text.unwrap().trim() {
                                skip_next = true;
                            }
                        }
                    }
                    None => {
                        // Bold/margin-aligned but not a recognizable heading shape
                        // (e.g. a defined term like "AMBIENT." in a definitions
                        // section) — append as body text rather than fail.
                        if self.stack.has_open_section() {
                            self.stack.append_line(page_number, &line.text);
                        }
                    }
                }
            } else if self.stack.has_open_section() {
                self.stack.append_line(page_number, &line.text);
            }
            i += 1;
        }
        Ok(())
    }
}

/// Convenience entry point used by `ircbook-cli`.
pub fn run(config: RunConfig) -> Result<ParseReport, FatalError> {
    Run::new(config).execute()
}
