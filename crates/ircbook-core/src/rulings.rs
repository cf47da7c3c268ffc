//! Ruled-table detector (§4.2): clusters ruling primitives into grids across
//! each candidate rotation, scores rotations, and extracts cells.

use std::collections::BTreeMap;

use pdfplumber_core::geometry::BBox;
use pdfplumber_core::text::Char;
use pdfplumber_core::words::Word;

use crate::constants::{
    CHAR_ROTATION_TOLERANCE, RULING_AXIS_TOLERANCE, RULING_INTERSECTION_TOLERANCE,
    RULING_JOIN_TOLERANCE, RULING_MIN_LEN, RULING_SNAP_GRID, TABLE_EMPTY_CELL_RATIO_MAX,
    TABLE_INTERSECTION_MIN, TABLE_MIN_H_RULINGS, TABLE_MIN_V_RULINGS, TABLE_OVERLAP_TOLERANCE,
};
use crate::error::{FatalError, Warning, WarningCode};
use crate::geometry::rotate_bbox;
use crate::primitives::RawSegment;

/// Axis of a clustered ruling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// A clustered, snapped ruling: a horizontal or vertical segment at least
/// `RULING_MIN_LEN` long, in the frame of a single candidate rotation.
#[derive(Debug, Clone, Copy)]
pub struct Ruling {
    pub axis: Axis,
    /// Position along the perpendicular axis (y for horizontal, x for vertical).
    pub pos: f64,
    /// Extent along the ruling's own axis: (start, end).
    pub span: (f64, f64),
}

impl Ruling {
    fn len(&self) -> f64 {
        self.span.1 - self.span.0
    }
}

fn snap(v: f64) -> f64 {
    (v / RULING_SNAP_GRID).round() * RULING_SNAP_GRID
}

/// Classify raw segments into axis-snapped, length-filtered, collinear-merged
/// rulings, in the frame of rotation `r`.
pub fn build_rulings(
    segments: &[RawSegment],
    rotation: i32,
    page_width: f64,
    page_height: f64,
) -> Vec<Ruling> {
    let mut horizontal: BTreeMap<i64, Vec<(f64, f64)>> = BTreeMap::new();
    let mut vertical: BTreeMap<i64, Vec<(f64, f64)>> = BTreeMap::new();

    for seg in segments {
        let bbox = BBox::new(seg.x0, seg.top, seg.x1, seg.bottom);
        let rotated = rotate_bbox(bbox, rotation, page_width, page_height);
        let dx = (rotated.x1 - rotated.x0).abs();
        let dy = (rotated.bottom - rotated.top).abs();

        if dy <= RULING_AXIS_TOLERANCE && dx >= RULING_MIN_LEN {
            let y = (rotated.top + rotated.bottom) / 2.0;
            let key = (snap(y) * 100.0).round() as i64;
            let (x0, x1) = (rotated.x0.min(rotated.x1), rotated.x0.max(rotated.x1));
            horizontal.entry(key).or_default().push((x0, x1));
        } else if dx <= RULING_AXIS_TOLERANCE && dy >= RULING_MIN_LEN {
            let x = (rotated.x0 + rotated.x1) / 2.0;
            let key = (snap(x) * 100.0).round() as i64;
            let (y0, y1) = (rotated.top.min(rotated.bottom), rotated.top.max(rotated.bottom));
            vertical.entry(key).or_default().push((y0, y1));
        }
    }

    let mut rulings = Vec::new();
    for (key, spans) in horizontal {
        for span in merge_collinear(spans) {
            if span.1 - span.0 >= RULING_MIN_LEN {
                rulings.push(Ruling {
                    axis: Axis::Horizontal,
                    pos: key as f64 / 100.0,
                    span,
                });
            }
        }
    }
    for (key, spans) in vertical {
        for span in merge_collinear(spans) {
            if span.1 - span.0 >= RULING_MIN_LEN {
                rulings.push(Ruling {
                    axis: Axis::Vertical,
                    pos: key as f64 / 100.0,
                    span,
                });
            }
        }
    }
    rulings
}

/// Merge spans whose endpoints lie within `RULING_JOIN_TOLERANCE` of each
/// other (collinear joining), by repeatedly sorting and absorbing overlaps.
fn merge_collinear(mut spans: Vec<(f64, f64)>) -> Vec<(f64, f64)> {
    spans.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
    let mut merged: Vec<(f64, f64)> = Vec::new();
    for (start, end) in spans {
        if let Some(last) = merged.last_mut() {
            if start <= last.1 + RULING_JOIN_TOLERANCE {
                last.1 = last.1.max(end);
                continue;
            }
        }
        merged.push((start, end));
    }
    merged
}

/// A ruled-table candidate: the connected component of intersecting
/// horizontal/vertical rulings, its bbox, and (once extracted) its cells.
#[derive(Debug, Clone)]
pub struct TableCandidate {
    pub bbox: BBox,
    pub rotation: i32,
    pub horizontal: Vec<Ruling>,
    pub vertical: Vec<Ruling>,
    pub intersection_count: usize,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub empty_cell_ratio: f64,
}

impl TableCandidate {
    pub fn area(&self) -> f64 {
        self.bbox.width().max(0.0) * self.bbox.height().max(0.0)
    }

    pub fn touches_bottom(&self, page_height: f64, tolerance: f64) -> bool {
        self.bbox.bottom >= page_height - tolerance
    }
}

fn intersects(h: &Ruling, v: &Ruling) -> bool {
    let y = h.pos;
    let x = v.pos;
    x >= h.span.0 - RULING_INTERSECTION_TOLERANCE
        && x <= h.span.1 + RULING_INTERSECTION_TOLERANCE
        && y >= v.span.0 - RULING_INTERSECTION_TOLERANCE
        && y <= v.span.1 + RULING_INTERSECTION_TOLERANCE
}

/// Group rulings into connected components via their intersection graph,
/// keeping only components meeting the minimum H/V/intersection thresholds
/// (§4.2 step 2). Does not yet extract cells.
fn cluster_components(rulings: &[Ruling], rotation: i32) -> Vec<TableCandidate> {
    let h_indices: Vec<usize> = (0..rulings.len())
        .filter(|&i| rulings[i].axis == Axis::Horizontal)
        .collect();
    let v_indices: Vec<usize> = (0..rulings.len())
        .filter(|&i| rulings[i].axis == Axis::Vertical)
        .collect();

    // adjacency: ruling index -> connected ruling indices (via intersection)
    let mut adjacency: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for &hi in &h_indices {
        for &vi in &v_indices {
            if intersects(&rulings[hi], &rulings[vi]) {
                adjacency.entry(hi).or_default().push(vi);
                adjacency.entry(vi).or_default().push(hi);
            }
        }
    }

    let mut visited = vec![false; rulings.len()];
    let mut candidates = Vec::new();

    for start in 0..rulings.len() {
        if visited[start] || !adjacency.contains_key(&start) {
            continue;
        }
        let mut stack = vec![start];
        let mut component = Vec::new();
        visited[start] = true;
        while let Some(node) = stack.pop() {
            component.push(node);
            if let Some(neighbors) = adjacency.get(&node) {
                for &n in neighbors {
                    if !visited[n] {
                        visited[n] = true;
                        stack.push(n);
                    }
                }
            }
        }

        let horizontal: Vec<Ruling> = component
            .iter()
            .filter(|&&i| rulings[i].axis == Axis::Horizontal)
            .map(|&i| rulings[i])
            .collect();
        let vertical: Vec<Ruling> = component
            .iter()
            .filter(|&&i| rulings[i].axis == Axis::Vertical)
            .map(|&i| rulings[i])
            .collect();

        let mut intersection_count = 0;
        for h in &horizontal {
            for v in &vertical {
                if intersects(h, v) {
                    intersection_count += 1;
                }
            }
        }

        if horizontal.len() < TABLE_MIN_H_RULINGS
            || vertical.len() < TABLE_MIN_V_RULINGS
            || intersection_count < TABLE_INTERSECTION_MIN
        {
            continue;
        }

        let x0 = vertical.iter().map(|v| v.pos).fold(f64::MAX, f64::min).min(
            horizontal
                .iter()
                .map(|h| h.span.0)
                .fold(f64::MAX, f64::min),
        );
        let x1 = vertical.iter().map(|v| v.pos).fold(f64::MIN, f64::max).max(
            horizontal
                .iter()
                .map(|h| h.span.1)
                .fold(f64::MIN, f64::max),
        );
        let top = horizontal.iter().map(|h| h.pos).fold(f64::MAX, f64::min).min(
            vertical.iter().map(|v| v.span.0).fold(f64::MAX, f64::min),
        );
        let bottom = horizontal.iter().map(|h| h.pos).fold(f64::MIN, f64::max).max(
            vertical.iter().map(|v| v.span.1).fold(f64::MIN, f64::max),
        );

        candidates.push(TableCandidate {
            bbox: BBox::new(x0, top, x1, bottom),
            rotation,
            horizontal,
            vertical,
            intersection_count,
            columns: Vec::new(),
            rows: Vec::new(),
            empty_cell_ratio: 0.0,
        });
    }

    candidates
}

/// Extraction outcome for one candidate.
pub enum ExtractionOutcome {
    Extracted(TableCandidate),
    Degenerate,
}

/// Build a cell grid from a candidate's rulings and assign words whose
/// center falls in each cell (§4.2 step 3). `words` must already be
/// rotated into the candidate's rotation frame.
fn extract_cells(mut candidate: TableCandidate, words: &[(BBox, &str)]) -> ExtractionOutcome {
    let mut row_positions: Vec<f64> = candidate.horizontal.iter().map(|h| h.pos).collect();
    row_positions.sort_by(|a, b| a.partial_cmp(b).unwrap());
    dedup_close(&mut row_positions, RULING_SNAP_GRID);

    let mut col_positions: Vec<f64> = candidate.vertical.iter().map(|v| v.pos).collect();
    col_positions.sort_by(|a, b| a.partial_cmp(b).unwrap());
    dedup_close(&mut col_positions, RULING_SNAP_GRID);

    if row_positions.len() < 2 || col_positions.len() < 2 {
        return ExtractionOutcome::Degenerate;
    }

    let n_rows = row_positions.len() - 1;
    let n_cols = col_positions.len() - 1;
    let mut grid: Vec<Vec<String>> = vec![vec![String::new(); n_cols]; n_rows];

    for (bbox, text) in words {
        let cx = (bbox.x0 + bbox.x1) / 2.0;
        let cy = (bbox.top + bbox.bottom) / 2.0;
        if cx < candidate.bbox.x0 || cx > candidate.bbox.x1 {
            continue;
        }
        if cy < candidate.bbox.top || cy > candidate.bbox.bottom {
            continue;
        }
        let row = match row_positions.windows(2).position(|w| cy >= w[0] && cy <= w[1]) {
            Some(r) => r,
            None => continue,
        };
        let col = match col_positions.windows(2).position(|w| cx >= w[0] && cx <= w[1]) {
            Some(c) => c,
            None => continue,
        };
        if !grid[row][col].is_empty() {
            grid[row][col].push(' ');
        }
        grid[row][col].push_str(text);
    }

    if n_rows < 2 || n_cols < 2 {
        return ExtractionOutcome::Degenerate;
    }

    let empty_cells = grid.iter().flatten().filter(|c| c.trim().is_empty()).count();
    let empty_ratio = empty_cells as f64 / (n_rows * n_cols) as f64;

    candidate.columns = grid[0].clone();
    candidate.rows = grid[1..].to_vec();
    candidate.empty_cell_ratio = empty_ratio;

    if empty_ratio > TABLE_EMPTY_CELL_RATIO_MAX {
        return ExtractionOutcome::Degenerate;
    }

    ExtractionOutcome::Extracted(candidate)
}

fn dedup_close(sorted: &mut Vec<f64>, tolerance: f64) {
    let mut out: Vec<f64> = Vec::new();
    for &v in sorted.iter() {
        if out.last().map(|&last| (v - last).abs() > tolerance).unwrap_or(true) {
            out.push(v);
        }
    }
    *sorted = out;
}

/// Count characters whose classified rotation equals the target angle for
/// rotation `r`, i.e. `(360 - r) mod 360` (§4.2 rotation choice).
fn orientation_score(chars: &[Char], r: i32) -> usize {
    let target = (360 - r).rem_euclid(360);
    chars
        .iter()
        .filter(|c| c.classify_rotation(CHAR_ROTATION_TOLERANCE) == Some(target))
        .count()
}

/// Result of running the detector across all candidate rotations.
pub struct RotationResult {
    pub rotation: i32,
    pub candidates: Vec<TableCandidate>,
    pub warning: Option<Warning>,
}

/// Run the full ruled-table detector for one page: build rulings, cluster
/// into candidates, extract cells, then choose the best rotation (§4.2).
#[allow(clippy::too_many_arguments)]
pub fn detect_tables(
    page_number: usize,
    segments: &[RawSegment],
    chars: &[Char],
    words: &[Word],
    page_width: f64,
    page_height: f64,
) -> Result<RotationResult, FatalError> {
    let rotations = [0, 90, 270];
    let mut per_rotation: BTreeMap<i32, (Vec<TableCandidate>, usize, f64)> = BTreeMap::new();

    for &r in &rotations {
        let rulings = build_rulings(segments, r, page_width, page_height);
        let raw_candidates = cluster_components(&rulings, r);

        let rotated_words: Vec<(BBox, &str)> = words
            .iter()
            .map(|w| (rotate_bbox(w.bbox, r, page_width, page_height), w.text.as_str()))
            .collect();

        let mut extracted = Vec::new();
        let mut total_intersections = 0usize;
        let mut total_area = 0.0;
        for candidate in raw_candidates {
            total_intersections += candidate.intersection_count;
            total_area += candidate.area();
            match extract_cells(candidate, &rotated_words) {
                ExtractionOutcome::Extracted(c) => extracted.push(c),
                ExtractionOutcome::Degenerate => {}
            }
        }

        per_rotation.insert(r, (extracted, total_intersections, total_area));
    }

    let scores: BTreeMap<i32, usize> = rotations
        .iter()
        .map(|&r| (r, orientation_score(chars, r)))
        .collect();

    let mut ranked: Vec<(i32, usize, usize, f64)> = rotations
        .iter()
        .map(|&r| {
            let (_, intersections, area) = &per_rotation[&r];
            (r, scores[&r], *intersections, *area)
        })
        .collect();

    // Rank by (orientation_score, intersection_count, area, -r) descending.
    ranked.sort_by(|a, b| {
        b.1.cmp(&a.1)
            .then(b.2.cmp(&a.2))
            .then(b.3.partial_cmp(&a.3).unwrap())
            .then(a.0.cmp(&b.0))
    });

    let best = ranked[0];
    let second = ranked.get(1);

    let mut warning = None;
    if let Some(second) = second {
        if best.1 == second.1 && best.2 == second.2 && (best.3 - second.3).abs() < 1e-6 {
            if best.1 == 0 && second.1 == 0 {
                // Tie with zero orientation score on both top rotations: default to 0.
                let chosen = if best.0 == 0 || second.0 == 0 {
                    0
                } else {
                    best.0
                };
                warning = Some(Warning::new(
                    WarningCode::TableRotationTieDefaulted,
                    Some(page_number),
                    format!("rotations {} and {} tied; defaulted to 0", best.0, second.0),
                ));
                let candidates = real_table_filter(per_rotation.remove(&chosen).unwrap().0);
                return Ok(RotationResult {
                    rotation: chosen,
                    candidates,
                    warning,
                });
            }
            let mut stats = BTreeMap::new();
            stats.insert(format!("rotation_{}", best.0), best.1.to_string());
            stats.insert(format!("rotation_{}", second.0), second.1.to_string());
            return Err(FatalError::TableRotationAmbiguous {
                page: page_number,
                detail: format!("rotations {} and {} tied on all ranking components", best.0, second.0),
                stats,
            });
        }
    }

    let chosen = best.0;
    let candidates = real_table_filter(per_rotation.remove(&chosen).unwrap().0);
    Ok(RotationResult {
        rotation: chosen,
        candidates,
        warning,
    })
}

/// Retain only candidates where ≥2 H and ≥2 V rulings actually overlap the
/// bbox within tolerance (§4.2 real-table filter).
fn real_table_filter(candidates: Vec<TableCandidate>) -> Vec<TableCandidate> {
    candidates
        .into_iter()
        .filter(|c| {
            let h_overlap = c
                .horizontal
                .iter()
                .filter(|h| {
                    h.span.0 <= c.bbox.x1 + TABLE_OVERLAP_TOLERANCE
                        && h.span.1 >= c.bbox.x0 - TABLE_OVERLAP_TOLERANCE
                })
                .count();
            let v_overlap = c
                .vertical
                .iter()
                .filter(|v| {
                    v.span.0 <= c.bbox.bottom + TABLE_OVERLAP_TOLERANCE
                        && v.span.1 >= c.bbox.top - TABLE_OVERLAP_TOLERANCE
                })
                .count();
            h_overlap >= TABLE_MIN_H_RULINGS && v_overlap >= TABLE_MIN_V_RULINGS
        })
        .collect()
}
