//! Section Recognizer & Stack (§4.4): canonical id matching, heading
//! acceptance, TOC rejection, and the depth-ordered section stack that
//! drives when a section's accumulated body is flushed to output.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::constants::{COLUMN_MARGIN_TOLERANCE, COLUMN_MARGIN_WIDTH_MULTIPLIER, HEADER_STYLE_SIZE_DELTA};
use crate::error::FatalError;
use crate::geometry::median;
use crate::lines::{Column, ReconstructedLine};

/// `L{1-3}D{3-4}(.D+)*`, e.g. `R301`, `E3401.2`, `AF103.1.2`.
static CANONICAL_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[A-Z]{1,3}\d{3,4}(\.\d+)*$").unwrap());

/// `Appendix L{1-3}`, e.g. `Appendix A`, `Appendix AF`.
static APPENDIX_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^APPENDIX\s+([A-Z]{1,3})$").unwrap());

static DOT_LEADER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.{3,}").unwrap());

/// `SECTION <ID> <Title>` / `Appendix <L> <Title>` / `<ID> <Title>`.
static SECTION_TEXT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(SECTION\s+)?((?:[A-Z]{1,3}\d{3,4}(?:\.\d+)*)|(?:APPENDIX\s+[A-Z]{1,3}))\s+(.+)$")
        .unwrap()
});

/// Bare `SECTION <ID>` marker line, title expected on the next line.
static SECTION_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^SECTION\s+([A-Z]{1,3}\d{3,4}(\.\d+)*)$").unwrap());

/// `APPENDIX <L> <Title>`.
static APPENDIX_TEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^APPENDIX\s+([A-Z]{1,3})\s+(.+)$").unwrap());

/// Fallback header-style match: any canonical id optionally preceded by
/// `SECTION`, with no title requirement (style/position already decided
/// this is a heading candidate).
static SECTION_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(SECTION\s+)?([A-Z]{1,3}\d{3,4}(\.\d+)*)\b").unwrap()
});

static TABLE_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^TABLE\s+[A-Z0-9.\-]+(\([^)]*\))?\b").unwrap());

/// True if `text` looks like a `TABLE <id>...` caption, used by the line
/// reconstructor to keep such lines out of the centered-structural bucket.
pub fn is_table_label_text(text: &str) -> bool {
    TABLE_LABEL_RE.is_match(text.trim())
}

fn has_dot_leaders(text: &str, min_count: usize) -> bool {
    DOT_LEADER_RE.find_iter(text).count() >= min_count
}

/// Canonical id extracted from a heading candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionId(pub String);

impl SectionId {
    /// Count of decimal groups, e.g. `R301.2.1.3` → depth 4.
    pub fn depth(&self) -> usize {
        if self.0.to_uppercase().starts_with("APPENDIX") {
            return 1;
        }
        1 + self.0.matches('.').count()
    }

    fn normalized(&self) -> String {
        self.0.to_uppercase()
    }
}

/// True if `text` is, on its own, a canonical section or appendix id.
fn is_canonical_id(text: &str) -> bool {
    let t = text.trim();
    CANONICAL_ID_RE.is_match(t) || APPENDIX_ID_RE.is_match(t)
}

fn extract_appendix_letter(text: &str) -> Option<String> {
    APPENDIX_ID_RE
        .captures(text.trim())
        .map(|c| format!("APPENDIX {}", c[1].to_uppercase()))
}

/// Title acceptance (§4.4): starts uppercase/digit, has an alphanumeric
/// after stripping id-like tokens, and is not an all-caps no-space token
/// of length > 4 (unless an appendix title).
fn title_is_acceptable(title: &str, is_appendix: bool) -> bool {
    let t = title.trim();
    if t.is_empty() {
        return false;
    }
    let first = t.chars().next().unwrap();
    if !(first.is_uppercase() || first.is_ascii_digit()) {
        return false;
    }
    if !t.chars().any(|c| c.is_alphanumeric()) {
        return false;
    }
    let no_space = !t.contains(' ');
    let all_caps = t.chars().filter(|c| c.is_alphabetic()).all(|c| c.is_uppercase());
    if no_space && all_caps && t.chars().count() > 4 && !is_appendix {
        return false;
    }
    true
}

/// True if the (presumptive) title line looks like a valid continuation
/// for a bare id line: has a space or lowercase letter, starts
/// uppercase/digit, has no dot leaders, no prose-terminal punctuation
/// mid-line, and is not an all-caps no-space run of ≥ 5 chars.
fn looks_like_bare_id_title(text: &str) -> bool {
    let t = text.trim();
    if t.is_empty() || has_dot_leaders(t, 1) {
        return false;
    }
    let first = t.chars().next().unwrap();
    if !(first.is_uppercase() || first.is_ascii_digit()) {
        return false;
    }
    let has_space_or_lower = t.contains(' ') || t.chars().any(|c| c.is_lowercase());
    if !has_space_or_lower {
        return false;
    }
    let no_space = !t.contains(' ');
    let all_caps = t.chars().filter(|c| c.is_alphabetic()).all(|c| c.is_uppercase());
    if no_space && all_caps && t.chars().count() >= 5 {
        return false;
    }
    true
}

/// A recognized heading: its canonical id and title (empty if the title
/// sits on a following line and hasn't been folded in yet).
#[derive(Debug, Clone)]
pub struct HeadingMatch {
    pub id: SectionId,
    pub title: String,
    /// True when this line was a bare `SECTION <ID>` marker with no title —
    /// an implicit pop rather than a new heading to push.
    pub is_bare_marker: bool,
}

/// True if `text` alone is recognizable as a section heading candidate's
/// text shape (used by the line reconstructor to keep such lines out of
/// the "centered structural" bucket even when not yet stack-validated).
pub fn is_section_heading_text(text: &str) -> bool {
    let t = text.trim();
    if has_dot_leaders(t, 3) {
        return false;
    }
    is_canonical_id(t)
        || SECTION_TEXT_RE.is_match(t)
        || SECTION_MARKER_RE.is_match(t)
        || APPENDIX_TEXT_RE.is_match(t)
}

/// True if a line is in "header position": x0 within
/// `max(COLUMN_MARGIN_TOLERANCE, 3*char_width)` of the column's
/// 5th-percentile left margin.
pub fn is_header_position(line_x0: f64, column_margin: f64, char_width: f64) -> bool {
    let tolerance = COLUMN_MARGIN_TOLERANCE.max(COLUMN_MARGIN_WIDTH_MULTIPLIER * char_width);
    (line_x0 - column_margin).abs() <= tolerance
}

/// True if a line is in "header style": bold, or font size at least
/// `body_median_size + HEADER_STYLE_SIZE_DELTA`.
pub fn is_header_style(line: &ReconstructedLine, body_median_size: f64) -> bool {
    line.bold || line.font_size >= body_median_size + HEADER_STYLE_SIZE_DELTA
}

/// Try to recognize `line` (with the following line available for bare-id
/// lookahead) as a section heading, given it has already passed the
/// header-position and header-style gates.
pub fn recognize_heading(line_text: &str, next_line_text: Option<&str>) -> Option<HeadingMatch> {
    let t = line_text.trim();
    if has_dot_leaders(t, 3) {
        return None;
    }

    if let Some(caps) = SECTION_TEXT_RE.captures(t) {
        let id_str = caps[2].to_string();
        let title = caps[3].to_string();
        let is_appendix = id_str.to_uppercase().starts_with("APPENDIX");
        let title_ok = title_is_acceptable(&title, is_appendix)
            && (title.trim_end().ends_with('.')
                || title.contains(" - ")
                || title.contains(" \u{2013} ")
                || title.contains(" \u{2014} ")
                || is_appendix);
        if title_ok {
            let id = if is_appendix {
                SectionId(id_str.to_uppercase())
            } else {
                SectionId(id_str.to_uppercase())
            };
            return Some(HeadingMatch {
                id,
                title,
                is_bare_marker: false,
            });
        }
    }

    if let Some(caps) = APPENDIX_TEXT_RE.captures(t) {
        let letter = caps[1].to_uppercase();
        let title = caps[2].to_string();
        if title_is_acceptable(&title, true) {
            return Some(HeadingMatch {
                id: SectionId(format!("APPENDIX {letter}")),
                title,
                is_bare_marker: false,
            });
        }
    }

    if let Some(caps) = SECTION_MARKER_RE.captures(t) {
        return Some(HeadingMatch {
            id: SectionId(caps[1].to_uppercase()),
            title: String::new(),
            is_bare_marker: true,
        });
    }

    if is_canonical_id(t) {
        if let Some(next) = next_line_text {
            if looks_like_bare_id_title(next) {
                let id = extract_appendix_letter(t).unwrap_or_else(|| t.to_uppercase());
                return Some(HeadingMatch {
                    id: SectionId(id),
                    title: next.trim().to_string(),
                    is_bare_marker: false,
                });
            }
        }
    }

    if let Some(caps) = SECTION_HEADER_RE.captures(t) {
        return Some(HeadingMatch {
            id: SectionId(caps[2].to_uppercase()),
            title: String::new(),
            is_bare_marker: false,
        });
    }

    None
}

/// True if `header_text` marks this page as a table of contents, which is
/// skipped entirely for section recognition. Collapses whitespace runs
/// itself so callers can pass raw header text straight from the page.
pub fn is_toc_page(header_text: &str) -> bool {
    let collapsed = header_text.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.to_uppercase().contains("TABLE OF CONTENTS")
}

/// One entry on the document-level section stack.
#[derive(Debug, Clone)]
pub struct SectionStackEntry {
    pub id: SectionId,
    pub depth: usize,
    pub lines: Vec<String>,
    pub start_page: usize,
    pub end_page: usize,
}

/// A flushed section, ready to be written to `section_<ID>.txt`.
#[derive(Debug, Clone)]
pub struct FlushedSection {
    pub id: String,
    pub lines: Vec<String>,
    pub start_page: usize,
    pub end_page: usize,
}

/// The document-wide, depth-ordered section stack (§4.4, §5).
#[derive(Debug, Default)]
pub struct SectionStack {
    entries: Vec<SectionStackEntry>,
    accepted_ids: HashSet<String>,
}

impl SectionStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept a new heading at the current page, flushing/popping any
    /// stack entries at depth `>=` the new id's depth, and failing
    /// `SECTION_DUPLICATE` if the id was already accepted.
    pub fn accept_heading(
        &mut self,
        heading: &HeadingMatch,
        page: usize,
        flushed: &mut Vec<FlushedSection>,
    ) -> Result<(), FatalError> {
        let depth = heading.id.depth();
        let normalized = heading.id.normalized();

        while let Some(top) = self.entries.last() {
            if top.depth >= depth && top.id.normalized() != normalized {
                let popped = self.entries.pop().unwrap();
                flushed.push(FlushedSection {
                    id: popped.id.0,
                    lines: popped.lines,
                    start_page: popped.start_page,
                    end_page: popped.end_page,
                });
            } else {
                break;
            }
        }

        if self.accepted_ids.contains(&normalized) {
            return Err(FatalError::SectionDuplicate {
                page,
                detail: format!("section id {} accepted more than once", heading.id.0),
            });
        }
        self.accepted_ids.insert(normalized);

        self.entries.push(SectionStackEntry {
            id: heading.id.clone(),
            depth,
            lines: Vec::new(),
            start_page: page,
            end_page: page,
        });
        Ok(())
    }

    /// Implicit pop for a bare `SECTION` marker line with no title: pops
    /// the top entry if present, otherwise is a no-op.
    pub fn implicit_pop(&mut self, page: usize, flushed: &mut Vec<FlushedSection>) {
        if let Some(mut popped) = self.entries.pop() {
            popped.end_page = page;
            flushed.push(FlushedSection {
                id: popped.id.0,
                lines: popped.lines,
                start_page: popped.start_page,
                end_page: popped.end_page,
            });
        }
    }

    /// Append a body line to the top-of-stack section, if any.
    pub fn append_line(&mut self, page: usize, text: &str) {
        if let Some(top) = self.entries.last_mut() {
            top.lines.push(text.to_string());
            top.end_page = page;
        }
    }

    pub fn has_open_section(&self) -> bool {
        !self.entries.is_empty()
    }

    /// Every section id accepted so far in the document, for integrity
    /// checking and "has any section ever opened" tests.
    pub fn accepted_ids(&self) -> &HashSet<String> {
        &self.accepted_ids
    }

    /// Flush the entire stack in stack order (top-to-bottom pop) at
    /// end-of-document.
    pub fn flush_all(&mut self) -> Vec<FlushedSection> {
        let mut flushed = Vec::new();
        while let Some(popped) = self.entries.pop() {
            flushed.push(FlushedSection {
                id: popped.id.0,
                lines: popped.lines,
                start_page: popped.start_page,
                end_page: popped.end_page,
            });
        }
        flushed
    }
}

/// True if this line should be routed to the section stack body rather
/// than treated as a heading/spanning/table-label line, given its
/// reconstructed column.
pub fn is_body_line(line: &ReconstructedLine) -> bool {
    matches!(line.column, Column::Left | Column::Right)
        && !is_table_label_text(&line.text)
}

/// Compute the body median font size over a set of lines, used for
/// header-style classification. `None` if `lines` is empty.
pub fn body_median_size(lines: &[ReconstructedLine]) -> Option<f64> {
    let sizes: Vec<f64> = lines.iter().map(|l| l.font_size).collect();
    median(&sizes)
}
