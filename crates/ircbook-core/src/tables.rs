//! Label Binder & Continuation Controller (§4.5, §4.6): binds a
//! `TABLE <id>[(variant)] <title?>` caption to each extracted grid,
//! captures trailing footnotes, and carries multi-page tables across
//! page boundaries via a single `PendingTable` slot.

use std::sync::LazyLock;

use regex::Regex;

use pdfplumber_core::geometry::BBox;

use crate::constants::{
    TABLE_BOTTOM_TOUCH_DISTANCE, TABLE_FOOTNOTE_WINDOW, TABLE_LABEL_SEARCH_WINDOW,
    TABLE_LABEL_TOP_BAND_RATIO,
};
use crate::error::{FatalError, Warning, WarningCode};
use crate::lines::ReconstructedLine;
use crate::rulings::TableCandidate;

static TABLE_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^TABLE\s+([A-Z0-9][A-Z0-9.\-]*)(\(([^)]*)\))?\s*(.*)$").unwrap());

static FOOTNOTE_STAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\*").unwrap());
static FOOTNOTE_LETTER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-z]\.").unwrap());

/// A parsed `TABLE <id>[(variant)] <title?>` caption line.
#[derive(Debug, Clone)]
pub struct TableLabelBinding {
    pub base_id: String,
    pub variant: Option<String>,
    pub title: String,
    pub is_continued_marker: bool,
    pub bbox: BBox,
}

impl TableLabelBinding {
    /// The emitted id: base id with variant suffix preserved, e.g. `T301(1)`.
    pub fn emitted_id(&self) -> String {
        match &self.variant {
            Some(v) => format!("{}({v})", self.base_id),
            None => self.base_id.clone(),
        }
    }
}

fn parse_label(line: &ReconstructedLine) -> Option<TableLabelBinding> {
    let caps = TABLE_LABEL_RE.captures(line.text.trim())?;
    let base_id = caps[1].to_uppercase();
    let variant = caps.get(3).map(|m| m.as_str().to_string());
    let title = caps.get(4).map(|m| m.as_str().trim().to_string()).unwrap_or_default();
    let is_continued_marker = line.text.to_uppercase().contains("CONTINUED");
    Some(TableLabelBinding {
        base_id,
        variant,
        title,
        is_continued_marker,
        bbox: line.bbox,
    })
}

/// Bind the best label line to a candidate's bbox, per §4.5 steps 1-3.
/// `page_number`/`table_index` are used only to synthesize the unlabeled
/// fallback id.
pub fn bind_label(
    candidate_bbox: &BBox,
    label_lines: &[&ReconstructedLine],
    page_number: usize,
    table_index: usize,
    warnings: &mut Vec<Warning>,
) -> TableLabelBinding {
    let overlapping: Vec<&&ReconstructedLine> = label_lines
        .iter()
        .filter(|l| l.bbox.x0 <= candidate_bbox.x1 && l.bbox.x1 >= candidate_bbox.x0)
        .filter(|l| parse_label(l).is_some())
        .collect();

    let above: Vec<&&&ReconstructedLine> = overlapping
        .iter()
        .filter(|l| {
            l.bbox.bottom <= candidate_bbox.top
                && candidate_bbox.top - l.bbox.bottom <= TABLE_LABEL_SEARCH_WINDOW
        })
        .collect();

    if let Some(best) = above
        .iter()
        .max_by(|a, b| a.bbox.bottom.partial_cmp(&b.bbox.bottom).unwrap())
    {
        return parse_label(best).expect("filtered for parseability above");
    }

    let top_band = candidate_bbox.top + candidate_bbox.height() * TABLE_LABEL_TOP_BAND_RATIO;
    let inside: Vec<&&ReconstructedLine> = overlapping
        .iter()
        .filter(|l| l.bbox.top >= candidate_bbox.top && l.bbox.top <= top_band)
        .cloned()
        .collect();
    if let Some(best) = inside
        .iter()
        .min_by(|a, b| a.bbox.top.partial_cmp(&b.bbox.top).unwrap())
    {
        return parse_label(best).expect("filtered for parseability inside");
    }

    warnings.push(Warning::new(
        WarningCode::TableUnlabeled,
        Some(page_number),
        format!("no caption bound to table candidate at index {table_index}"),
    ));
    TableLabelBinding {
        base_id: format!("UNLABELED_P{page_number}_T{table_index}"),
        variant: None,
        title: String::new(),
        is_continued_marker: false,
        bbox: *candidate_bbox,
    }
}

/// Capture footnote lines within `TABLE_FOOTNOTE_WINDOW` below a table's
/// bbox, per the "ADDED — footnote capture" note in §4.5.
pub fn capture_footnotes(candidate_bbox: &BBox, body_lines: &[&ReconstructedLine]) -> Vec<String> {
    let mut footnotes: Vec<&&ReconstructedLine> = body_lines
        .iter()
        .filter(|l| {
            l.bbox.top >= candidate_bbox.bottom
                && l.bbox.top - candidate_bbox.bottom <= TABLE_FOOTNOTE_WINDOW
        })
        .filter(|l| {
            let t = l.text.trim_start();
            FOOTNOTE_STAR_RE.is_match(t) || FOOTNOTE_LETTER_RE.is_match(t) || t.starts_with("For SI:")
        })
        .collect();
    footnotes.sort_by(|a, b| a.bbox.top.partial_cmp(&b.bbox.top).unwrap());
    footnotes.into_iter().map(|l| l.text.clone()).collect()
}

/// A table whose grid touched the page's bottom band and may continue
/// onto the following page (§3, §4.6).
#[derive(Debug, Clone)]
pub struct PendingTable {
    pub id: String,
    pub base_id: String,
    pub title: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub footnotes: Vec<String>,
    pub rotation: i32,
    pub bbox_list: Vec<BBox>,
    pub pdf_pages: Vec<usize>,
}

impl PendingTable {
    fn touches_bottom(&self, page_height: f64) -> bool {
        self.bbox_list
            .last()
            .map(|b| b.bottom >= page_height - TABLE_BOTTOM_TOUCH_DISTANCE)
            .unwrap_or(false)
    }
}

/// A fully bound, ready-to-emit table candidate for one page.
pub struct BoundTable {
    pub candidate: TableCandidate,
    pub label: TableLabelBinding,
    pub footnotes: Vec<String>,
}

/// Outcome of running the continuation controller for one page.
pub struct ContinuationOutcome {
    /// Tables finalized (written) on this page.
    pub finalized: Vec<PendingTable>,
    /// The new pending table, if any grid on this page still touches bottom.
    pub pending: Option<PendingTable>,
}

fn touches_bottom_candidate(bbox: &BBox, page_height: f64) -> bool {
    bbox.bottom >= page_height - TABLE_BOTTOM_TOUCH_DISTANCE
}

/// True if any of `label_lines` parses as a `TABLE <id>...` caption for
/// `base_id`, and whether any such caption also carries a `CONTINUED` marker.
fn carryover_label_state(label_lines: &[&ReconstructedLine], base_id: &str) -> (bool, bool) {
    let mut label_present = false;
    let mut marker_present = false;
    for line in label_lines {
        if let Some(binding) = parse_label(line) {
            if binding.base_id == base_id {
                label_present = true;
                if binding.is_continued_marker {
                    marker_present = true;
                }
            }
        }
    }
    (label_present, marker_present)
}

/// Run the continuation controller for one page's bound tables against the
/// carried-over pending table, per §4.6. `label_lines` is every label-layer
/// line on this page (not just ones bound to a grid) — needed to detect a
/// `CONTINUED` marker or carryover `TABLE <id>` caption on a page that has
/// no table grid at all.
pub fn advance_continuation(
    page_number: usize,
    page_height: f64,
    mut pending: Option<PendingTable>,
    bound: Vec<BoundTable>,
    label_lines: &[&ReconstructedLine],
) -> Result<ContinuationOutcome, FatalError> {
    let mut finalized = Vec::new();

    if bound.is_empty() {
        if let Some(p) = pending.take() {
            let (label_present, marker_present) = carryover_label_state(label_lines, &p.base_id);
            if marker_present {
                return Err(FatalError::TableContinuation {
                    page: page_number,
                    detail: format!(
                        "CONTINUED marker for pending table {} present on page {page_number} with no table grid",
                        p.id
                    ),
                });
            }
            if label_present {
                return Err(FatalError::TableContinuation {
                    page: page_number,
                    detail: format!(
                        "carryover label for pending table {} present on page {page_number} with no table grid",
                        p.id
                    ),
                });
            }
            finalized.push(p);
            return Ok(ContinuationOutcome {
                finalized,
                pending: None,
            });
        }
        return Ok(ContinuationOutcome {
            finalized,
            pending: None,
        });
    }

    let Some(prior) = pending.take() else {
        // No pending table: every grid on this page starts fresh. Reusing a
        // base id without a pending predecessor is a fresh table, not a
        // continuation — nothing to validate here beyond normal binding.
        return finish_fresh(page_number, page_height, bound, finalized);
    };

    let matches: Vec<&BoundTable> = bound
        .iter()
        .filter(|b| {
            let same_base = b.label.base_id == prior.base_id;
            let continued_marker = b.label.is_continued_marker;
            let columns_match = b.candidate.columns == prior.columns;
            same_base && (continued_marker || columns_match)
        })
        .collect();

    if matches.len() > 1 {
        return Err(FatalError::TableContinuation {
            page: page_number,
            detail: format!(
                "more than one grid on page {page_number} matches pending table {}",
                prior.id
            ),
        });
    }

    let continued_marker_present = bound.iter().any(|b| b.label.is_continued_marker);

    if matches.is_empty() {
        if continued_marker_present {
            return Err(FatalError::TableContinuation {
                page: page_number,
                detail: format!(
                    "CONTINUED marker present on page {page_number} with no matching grid for {}",
                    prior.id
                ),
            });
        }
        // No match for the pending table: flush it as-is, and process the
        // rest of this page's grids fresh.
        finalized.push(prior);
        return finish_fresh(page_number, page_height, bound, finalized);
    }

    let matched = matches[0];
    if matched.candidate.rotation != prior.rotation {
        return Err(FatalError::TableContinuation {
            page: page_number,
            detail: format!(
                "rotation mismatch continuing table {}: pending={} matched={}",
                prior.id, prior.rotation, matched.candidate.rotation
            ),
        });
    }

    let mut merged = prior.clone();
    merged.rows.extend(matched.candidate.rows.clone());
    merged.footnotes.extend(matched.footnotes.clone());
    merged.bbox_list.push(matched.candidate.bbox);
    merged.pdf_pages.push(page_number);

    let matched_bbox = matched.candidate.bbox;
    let matched_base_id = matched.label.base_id.clone();

    let mut remaining_pending = None;
    if touches_bottom_candidate(&matched_bbox, page_height) {
        remaining_pending = Some(merged);
    } else {
        finalized.push(merged);
    }

    for b in &bound {
        if b.label.base_id == matched_base_id && b.candidate.bbox != matched_bbox {
            return Err(FatalError::TableContinuation {
                page: page_number,
                detail: format!(
                    "grid on page {page_number} reuses id {matched_base_id} without proven continuation"
                ),
            });
        }
    }

    let other_fresh: Vec<BoundTable> = bound
        .into_iter()
        .filter(|b| b.candidate.bbox != matched_bbox)
        .collect();

    let mut outcome = finish_fresh(page_number, page_height, other_fresh, finalized)?;
    if remaining_pending.is_some() {
        if outcome.pending.is_some() {
            return Err(FatalError::TableContinuation {
                page: page_number,
                detail: format!(
                    "more than one table touches the bottom of page {page_number}"
                ),
            });
        }
        outcome.pending = remaining_pending;
    }
    Ok(outcome)
}

fn finish_fresh(
    page_number: usize,
    page_height: f64,
    bound: Vec<BoundTable>,
    mut finalized: Vec<PendingTable>,
) -> Result<ContinuationOutcome, FatalError> {
    let mut pending = None;
    for b in bound {
        let table = PendingTable {
            id: b.label.emitted_id(),
            base_id: b.label.base_id.clone(),
            title: b.label.title.clone(),
            columns: b.candidate.columns.clone(),
            rows: b.candidate.rows.clone(),
            footnotes: b.footnotes.clone(),
            rotation: b.candidate.rotation,
            bbox_list: vec![b.candidate.bbox],
            pdf_pages: vec![page_number],
        };
        if table.touches_bottom(page_height) {
            if pending.is_some() {
                return Err(FatalError::TableContinuation {
                    page: page_number,
                    detail: "more than one fresh table touches the page bottom".to_string(),
                });
            }
            pending = Some(table);
        } else {
            finalized.push(table);
        }
    }
    Ok(ContinuationOutcome { finalized, pending })
}
