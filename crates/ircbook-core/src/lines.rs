//! Line Reconstructor & Column Classifier (§4.3): groups non-table-interior
//! characters into lines, splits spanning content out of the two-column
//! flow, finds the column gutter, and classifies every remaining line as
//! left or right column.
//!
//! Column-split and gutter classification operate at line granularity
//! rather than per-word — each reconstructed line already carries one
//! coherent run of tokens by the time this runs. See DESIGN.md.

use std::sync::LazyLock;

use regex::Regex;

use pdfplumber_core::geometry::BBox;
use pdfplumber_core::text::Char;

use crate::constants::{
    CENTER_BAND_RATIO, COLUMN_SPLIT_OFFCENTER_RATIO, GUTTER_SHORT_FRAGMENT_MAX_CHARS,
    GUTTER_SHORT_FRAGMENT_WIDTH_MULTIPLIER, GUTTER_TOLERANCE, LINE_TOP_TOLERANCE,
    SPANNING_NOTE_SIZE_DELTA, SPANNING_NOTE_WIDTH_RATIO, TOP_HEADER_GAP_MAX,
};
use crate::error::FatalError;
use crate::geometry::{center_x, median, percentile};
use crate::sections::{is_section_heading_text, is_table_label_text};

/// Column classification of an output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Left,
    Right,
    Spanning,
    CenterStructural,
    Single,
}

/// Fine-grained role of a spanning line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    SpanningHeader,
    SpanningReference,
    CenterStructural,
}

/// A reconstructed, classified output line.
#[derive(Debug, Clone)]
pub struct ReconstructedLine {
    pub bbox: BBox,
    pub text: String,
    pub font_size: f64,
    pub bold: bool,
    pub column: Column,
    pub role: Option<Role>,
}

impl ReconstructedLine {
    pub fn center(&self) -> f64 {
        center_x(&self.bbox)
    }
}

/// Column geometry captured for downstream header-position checks (§4.4).
#[derive(Debug, Clone, Copy)]
pub struct ColumnBounds {
    pub split_x: f64,
    pub gutter_left: f64,
    pub gutter_right: f64,
    pub left_margin: f64,
    pub right_margin: f64,
    pub char_width: f64,
}

struct PhysicalLine {
    chars: Vec<Char>,
    bbox: BBox,
    text: String,
    font_size: f64,
    bold: bool,
}

/// Median character width over `chars`; fails `CHAR_WIDTH_MISSING` if empty.
pub fn median_char_width(page_number: usize, chars: &[Char]) -> Result<f64, FatalError> {
    let widths: Vec<f64> = chars
        .iter()
        .filter(|c| !c.text.is_empty())
        .map(|c| c.bbox.width() / c.text.chars().count() as f64)
        .filter(|w| w.is_finite() && *w > 0.0)
        .collect();
    median(&widths).ok_or_else(|| FatalError::CharWidthMissing {
        page: page_number,
        detail: "no body characters to compute median width".to_string(),
    })
}

fn group_physical_lines(chars: &[Char], char_width: f64) -> Vec<PhysicalLine> {
    let mut sorted: Vec<&Char> = chars.iter().collect();
    sorted.sort_by(|a, b| {
        a.bbox
            .top
            .partial_cmp(&b.bbox.top)
            .unwrap()
            .then(a.bbox.x0.partial_cmp(&b.bbox.x0).unwrap())
    });

    let mut groups: Vec<Vec<&Char>> = Vec::new();
    let mut anchor_top = f64::NAN;
    for ch in sorted {
        if groups.is_empty() || (ch.bbox.top - anchor_top).abs() > LINE_TOP_TOLERANCE {
            groups.push(vec![ch]);
            anchor_top = ch.bbox.top;
        } else {
            groups.last_mut().unwrap().push(ch);
        }
    }

    let gap_threshold = 0.5 * char_width;
    groups
        .into_iter()
        .map(|mut group| {
            group.sort_by(|a, b| a.bbox.x0.partial_cmp(&b.bbox.x0).unwrap());
            let mut text = String::new();
            let mut last_x1: Option<f64> = None;
            for ch in &group {
                if let Some(last) = last_x1 {
                    let gap = ch.bbox.x0 - last;
                    if gap > gap_threshold {
                        let spaces = (gap / char_width).round().max(1.0) as usize;
                        text.push_str(&" ".repeat(spaces));
                    }
                }
                text.push_str(&ch.text);
                last_x1 = Some(ch.bbox.x1);
            }
            let bbox = group
                .iter()
                .map(|c| c.bbox)
                .reduce(|a, b| a.union(&b))
                .unwrap();
            let sizes: Vec<f64> = group.iter().map(|c| c.size).collect();
            let font_size = median(&sizes).unwrap_or(0.0);
            let bold = group
                .iter()
                .any(|c| c.fontname.to_uppercase().contains("BOLD"));
            PhysicalLine {
                chars: group.into_iter().cloned().collect(),
                bbox,
                text,
                font_size,
                bold,
            }
        })
        .collect()
}

fn is_centered(bbox: &BBox, page_width: f64) -> bool {
    let half_band = page_width * CENTER_BAND_RATIO / 2.0;
    let page_center = page_width / 2.0;
    bbox.x0 >= page_center - half_band && bbox.x1 <= page_center + half_band
}

fn is_all_uppercase_letters(text: &str, min_letters: usize) -> bool {
    let letters: Vec<char> = text.chars().filter(|c| c.is_alphabetic()).collect();
    letters.len() >= min_letters && letters.iter().all(|c| c.is_uppercase())
}

static DOT_LEADER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.{3,}").unwrap());
static APPENDIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^APPENDIX\s+[A-Z]{1,3}\b").unwrap());
static TOC_REFERENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(SECTION\s+)?[A-Z]{1,3}\d{3,4}(\.\d+)*\s").unwrap());
static REFERENCE_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(REFERENCED STANDARDS?|INDEX|GLOSSARY)\b").unwrap());
static INDEX_LETTER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z0-9]$").unwrap());
static SPANNING_SYMBOL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[\p{P}\s]+$").unwrap());
static PUNCT_OR_NUMERIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\d\p{P}\s]+$").unwrap());

fn has_dot_leaders(text: &str, min_count: usize) -> bool {
    DOT_LEADER_RE.find_iter(text).count() >= min_count
}

fn is_spanning_note(line: &PhysicalLine, page_width: f64, body_median_size: f64) -> bool {
    line.bbox.width() >= SPANNING_NOTE_WIDTH_RATIO * page_width
        && line.font_size <= body_median_size - SPANNING_NOTE_SIZE_DELTA
}

fn is_spanning_heading(line: &PhysicalLine, page_width: f64) -> bool {
    is_all_uppercase_letters(&line.text, 4) && is_centered(&line.bbox, page_width)
}

/// Extract leading "top header" lines: contiguous centered lines starting
/// from the top of the page, broken by the first non-centered line or a
/// vertical gap greater than `TOP_HEADER_GAP_MAX` (§4.3 step 4).
fn extract_top_headers(lines: &[PhysicalLine], page_width: f64) -> usize {
    let mut count = 0;
    let mut prev_bottom: Option<f64> = None;
    for line in lines {
        if !is_centered(&line.bbox, page_width) {
            break;
        }
        if let Some(prev) = prev_bottom {
            if line.bbox.top - prev > TOP_HEADER_GAP_MAX {
                break;
            }
        }
        prev_bottom = Some(line.bbox.bottom);
        count += 1;
    }
    count
}

/// Classify a gutter-straddling line as an acceptable spanning reference,
/// per §4.3 step 7.
fn classify_gutter_line(line: &PhysicalLine, char_width: f64) -> bool {
    let text = line.text.trim();
    if text.is_empty() {
        return true;
    }
    if has_dot_leaders(text, 1) {
        return true;
    }
    if TOC_REFERENCE_RE.is_match(text) {
        return true;
    }
    if APPENDIX_RE.is_match(text) {
        return true;
    }
    if REFERENCE_HEADER_RE.is_match(text) {
        return true;
    }
    if INDEX_LETTER_RE.is_match(text) {
        return true;
    }
    if SPANNING_SYMBOL_RE.is_match(text) {
        return true;
    }
    let char_count = text.chars().filter(|c| !c.is_whitespace()).count();
    if char_count <= GUTTER_SHORT_FRAGMENT_MAX_CHARS
        && line.bbox.width() <= GUTTER_SHORT_FRAGMENT_WIDTH_MULTIPLIER * char_width
    {
        return true;
    }
    if PUNCT_OR_NUMERIC_RE.is_match(text)
        && line.bbox.width() <= GUTTER_SHORT_FRAGMENT_WIDTH_MULTIPLIER * char_width
    {
        return true;
    }
    if line.bbox.width() <= GUTTER_SHORT_FRAGMENT_WIDTH_MULTIPLIER * char_width {
        return true;
    }
    false
}

/// True if `line` is a single, tall, uppercase character sitting fully
/// inside the gutter — a "center-spanning token" (§4.3 step 6b), e.g. an
/// index-letter heading.
fn is_center_spanning_token(
    line: &PhysicalLine,
    split_x: f64,
    median_word_height: f64,
    table_bboxes: &[BBox],
) -> bool {
    let trimmed = line.text.trim();
    if trimmed.chars().count() != 1 {
        return false;
    }
    let ch = trimmed.chars().next().unwrap();
    if !ch.is_alphabetic() || !ch.is_uppercase() {
        return false;
    }
    if line.bbox.height() < 0.9 * median_word_height {
        return false;
    }
    // Fully inside the gutter: both edges within the gutter band around the split.
    if line.bbox.x0 < split_x - GUTTER_TOLERANCE || line.bbox.x1 > split_x + GUTTER_TOLERANCE {
        return false;
    }
    !table_bboxes.iter().any(|t| {
        line.bbox.x0 >= t.x0 && line.bbox.x1 <= t.x1 && line.bbox.top >= t.top && line.bbox.bottom <= t.bottom
    })
}

/// Result of the line reconstructor: ordered output lines and the column
/// geometry used to produce them.
pub struct ReconstructionResult {
    pub lines: Vec<ReconstructedLine>,
    pub bounds: ColumnBounds,
}

/// Run the full line reconstructor and column classifier for one page.
///
/// `body_chars` must already have header/footer bands and table-interior
/// characters excluded. `table_bboxes` are the page's accepted table grids,
/// in native (unrotated) page coordinates, used only for the center-spanning
/// token exemption.
pub fn reconstruct_lines(
    page_number: usize,
    body_chars: &[Char],
    page_width: f64,
    table_bboxes: &[BBox],
) -> Result<ReconstructionResult, FatalError> {
    if body_chars.is_empty() {
        return Err(FatalError::BodyCharMissing {
            page: page_number,
            detail: "no body characters after header/footer/table exclusion".to_string(),
        });
    }

    let char_width = median_char_width(page_number, body_chars)?;
    let physical = group_physical_lines(body_chars, char_width);
    if physical.is_empty() {
        return Err(FatalError::LineDataMissing {
            page: page_number,
            detail: "no physical lines reconstructed".to_string(),
        });
    }

    let body_sizes: Vec<f64> = physical.iter().map(|l| l.font_size).collect();
    let body_median_size = median(&body_sizes).unwrap_or(0.0);

    let top_header_count = extract_top_headers(&physical, page_width);
    let mut output = Vec::new();
    let mut remaining: Vec<&PhysicalLine> = Vec::new();

    for (i, line) in physical.iter().enumerate() {
        if i < top_header_count {
            output.push(ReconstructedLine {
                bbox: line.bbox,
                text: line.text.clone(),
                font_size: line.font_size,
                bold: line.bold,
                column: Column::Spanning,
                role: Some(Role::SpanningHeader),
            });
            continue;
        }
        let centered = is_centered(&line.bbox, page_width);
        if centered
            && !is_section_heading_text(&line.text)
            && !is_table_label_text(&line.text)
            && centered
        {
            // Centered structural line only if it isn't itself a recognizable
            // section/table-label caption (those stay spanning headers via
            // the section recognizer's own header-position check instead).
            if is_spanning_heading(line, page_width) {
                output.push(ReconstructedLine {
                    bbox: line.bbox,
                    text: line.text.clone(),
                    font_size: line.font_size,
                    bold: line.bold,
                    column: Column::Spanning,
                    role: Some(Role::SpanningHeader),
                });
                continue;
            }
            output.push(ReconstructedLine {
                bbox: line.bbox,
                text: line.text.clone(),
                font_size: line.font_size,
                bold: line.bold,
                column: Column::CenterStructural,
                role: Some(Role::CenterStructural),
            });
            continue;
        }
        if is_spanning_note(line, page_width, body_median_size) {
            output.push(ReconstructedLine {
                bbox: line.bbox,
                text: line.text.clone(),
                font_size: line.font_size,
                bold: line.bold,
                column: Column::Spanning,
                role: Some(Role::SpanningReference),
            });
            continue;
        }
        remaining.push(line);
    }

    let page_center = page_width / 2.0;

    // Lines that straddle the centerline within the gutter tolerance are set
    // aside for gutter classification rather than feeding split detection.
    let mut gutter_candidates: Vec<&PhysicalLine> = Vec::new();
    let mut split_inputs: Vec<&PhysicalLine> = Vec::new();
    for line in &remaining {
        let straddles = line.bbox.x0 < page_center + GUTTER_TOLERANCE
            && line.bbox.x1 > page_center - GUTTER_TOLERANCE
            && line.bbox.x0 < page_center
            && line.bbox.x1 > page_center;
        if straddles {
            gutter_candidates.push(line);
        } else {
            split_inputs.push(line);
        }
    }

    if split_inputs.is_empty() {
        return Err(FatalError::ColumnSplitMissing {
            page: page_number,
            detail: "no non-straddling lines available to compute column split".to_string(),
        });
    }

    let mut split_x = compute_column_split(page_number, &split_inputs, page_width)?;

    if (split_x - page_center).abs() > COLUMN_SPLIT_OFFCENTER_RATIO * page_width {
        split_x = recompute_split_by_clustering(page_number, &split_inputs, page_center)?;
        if (split_x - page_center).abs() > COLUMN_SPLIT_OFFCENTER_RATIO * page_width {
            return Err(FatalError::ColumnSplitOffcenter {
                page: page_number,
                detail: format!("split_x={split_x} too far from page center {page_center}"),
            });
        }
    }

    let heights: Vec<f64> = remaining.iter().map(|l| l.bbox.height()).collect();
    let median_word_height = median(&heights).unwrap_or(body_median_size);

    for line in gutter_candidates {
        if is_center_spanning_token(line, split_x, median_word_height, table_bboxes) {
            output.push(ReconstructedLine {
                bbox: line.bbox,
                text: line.text.clone(),
                font_size: line.font_size,
                bold: line.bold,
                column: Column::Spanning,
                role: Some(Role::SpanningReference),
            });
            continue;
        }
        if classify_gutter_line(line, char_width) {
            output.push(ReconstructedLine {
                bbox: line.bbox,
                text: line.text.clone(),
                font_size: line.font_size,
                bold: line.bold,
                column: Column::Spanning,
                role: Some(Role::SpanningReference),
            });
            continue;
        }
        return Err(FatalError::GutterLineAmbiguous {
            page: page_number,
            detail: format!("gutter-straddling line {:?} matched no known pattern", line.text),
        });
    }

    // Cross-split check: any split-input line straddling split_x outside the
    // gutter tolerance is fatal unless it is a center-spanning token.
    for line in &split_inputs {
        let center = center_x(&line.bbox);
        let straddles_split = line.bbox.x0 < split_x && line.bbox.x1 > split_x;
        if straddles_split && (center - split_x).abs() > GUTTER_TOLERANCE {
            if is_center_spanning_token(line, split_x, median_word_height, table_bboxes) {
                continue;
            }
            return Err(FatalError::ColumnSplitCross {
                page: page_number,
                detail: format!("line {:?} straddles split at {split_x}", line.text),
            });
        }
    }

    let mut left_lines = Vec::new();
    let mut right_lines = Vec::new();
    for line in split_inputs {
        let center = center_x(&line.bbox);
        let column = if center < split_x - 1.0 {
            Column::Left
        } else if center > split_x + 1.0 {
            Column::Right
        } else {
            Column::Left
        };
        let reconstructed = ReconstructedLine {
            bbox: line.bbox,
            text: line.text.clone(),
            font_size: line.font_size,
            bold: line.bold,
            column,
            role: None,
        };
        match column {
            Column::Left => left_lines.push(reconstructed),
            _ => right_lines.push(reconstructed),
        }
    }

    if left_lines.is_empty() && right_lines.is_empty() {
        return Err(FatalError::ColumnBodyMissing {
            page: page_number,
            detail: "no lines assigned to either column".to_string(),
        });
    }

    let left_x0s: Vec<f64> = left_lines.iter().map(|l| l.bbox.x0).collect();
    let right_x0s: Vec<f64> = right_lines.iter().map(|l| l.bbox.x0).collect();
    let left_margin = percentile(&left_x0s, 0.05).unwrap_or(split_x);
    let right_margin = percentile(&right_x0s, 0.05).unwrap_or(split_x);

    output.sort_by(|a, b| a.bbox.top.partial_cmp(&b.bbox.top).unwrap());
    left_lines.sort_by(|a, b| a.bbox.top.partial_cmp(&b.bbox.top).unwrap());
    right_lines.sort_by(|a, b| a.bbox.top.partial_cmp(&b.bbox.top).unwrap());

    output.extend(left_lines);
    output.extend(right_lines);

    let bounds = ColumnBounds {
        split_x,
        gutter_left: split_x - GUTTER_TOLERANCE,
        gutter_right: split_x + GUTTER_TOLERANCE,
        left_margin,
        right_margin,
        char_width,
    };

    Ok(ReconstructionResult {
        lines: output,
        bounds,
    })
}

fn compute_column_split(
    page_number: usize,
    lines: &[&PhysicalLine],
    page_width: f64,
) -> Result<f64, FatalError> {
    let _ = page_width;
    let mut sorted: Vec<&&PhysicalLine> = lines.iter().collect();
    sorted.sort_by(|a, b| a.bbox.x0.partial_cmp(&b.bbox.x0).unwrap());

    let mut gaps: Vec<(f64, f64)> = Vec::new();
    let mut running_max_x1 = sorted[0].bbox.x1;
    for line in sorted.iter().skip(1) {
        let gap = line.bbox.x0 - running_max_x1;
        if gap > 0.0 {
            gaps.push((running_max_x1, line.bbox.x0));
        }
        running_max_x1 = running_max_x1.max(line.bbox.x1);
    }

    if gaps.is_empty() {
        return Err(FatalError::ColumnSplitMissing {
            page: page_number,
            detail: "no horizontal gap found among body lines".to_string(),
        });
    }

    gaps.sort_by(|a, b| (b.1 - b.0).partial_cmp(&(a.1 - a.0)).unwrap());
    let largest = gaps[0];
    let largest_width = largest.1 - largest.0;
    let competing = gaps
        .iter()
        .skip(1)
        .any(|g| (g.1 - g.0 - largest_width).abs() < 1e-6);
    if competing {
        return Err(FatalError::ColumnSplitCompeting {
            page: page_number,
            detail: "multiple equal-width gaps found".to_string(),
        });
    }

    Ok((largest.0 + largest.1) / 2.0)
}

fn recompute_split_by_clustering(
    page_number: usize,
    lines: &[&PhysicalLine],
    page_center: f64,
) -> Result<f64, FatalError> {
    let left_max_x1 = lines
        .iter()
        .filter(|l| center_x(&l.bbox) < page_center)
        .map(|l| l.bbox.x1)
        .fold(f64::MIN, f64::max);
    let right_min_x0 = lines
        .iter()
        .filter(|l| center_x(&l.bbox) >= page_center)
        .map(|l| l.bbox.x0)
        .fold(f64::MAX, f64::min);

    if left_max_x1 == f64::MIN || right_min_x0 == f64::MAX {
        return Err(FatalError::ColumnSplitClusterMissing {
            page: page_number,
            detail: "could not cluster lines strictly left/right of page center".to_string(),
        });
    }
    if left_max_x1 >= right_min_x0 {
        return Err(FatalError::ColumnSplitOverlap {
            page: page_number,
            detail: "left/right clusters overlap".to_string(),
        });
    }
    Ok((left_max_x1 + right_min_x0) / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdfplumber_core::text::TextDirection;

    fn make_char(text: &str, x0: f64, top: f64, size: f64) -> Char {
        Char {
            text: text.to_string(),
            bbox: BBox::new(x0, top, x0 + size * 0.6, top + size),
            fontname: "Times".to_string(),
            size,
            doctop: top,
            upright: true,
            direction: TextDirection::Ltr,
            stroking_color: None,
            non_stroking_color: None,
            ctm: [1.0, 0.0, 0.0, 1.0, x0, top],
            char_code: text.chars().next().map(|c| c as u32).unwrap_or(0),
            mcid: None,
            tag: None,
        }
    }

    fn word_chars(word: &str, x0: f64, top: f64, size: f64) -> Vec<Char> {
        let mut chars = Vec::new();
        let mut x = x0;
        for c in word.chars() {
            chars.push(make_char(&c.to_string(), x, top, size));
            x += size * 0.6;
        }
        chars
    }

    #[test]
    fn two_column_page_splits_and_orders() {
        let mut chars = Vec::new();
        chars.extend(word_chars("LeftHeading", 50.0, 100.0, 10.0));
        chars.extend(word_chars("RightHeading", 350.0, 100.0, 10.0));
        chars.extend(word_chars("Body", 50.0, 120.0, 10.0));
        chars.extend(word_chars("Body", 350.0, 120.0, 10.0));

        let result = reconstruct_lines(1, &chars, 600.0, &[]).expect("reconstruction succeeds");
        assert!(result.bounds.split_x > 200.0 && result.bounds.split_x < 400.0);
        assert!(result.lines.iter().any(|l| l.column == Column::Left));
        assert!(result.lines.iter().any(|l| l.column == Column::Right));
    }

    #[test]
    fn empty_body_chars_fails() {
        let err = reconstruct_lines(1, &[], 600.0, &[]).unwrap_err();
        assert_eq!(err.code(), "BODY_CHAR_MISSING");
    }

    #[test]
    fn median_char_width_rejects_empty() {
        let err = median_char_width(1, &[]).unwrap_err();
        assert_eq!(err.code(), "CHAR_WIDTH_MISSING");
    }
}
