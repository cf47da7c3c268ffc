//! `DebugPageArtifact` (§3, §6): a per-page structured dump written under
//! `_debug_pages/` when `--debug-dump` is set. Image overlay rendering is
//! explicitly the serializer/CLI's job, not the core's — see §1's
//! collaborator boundary.

use std::fs;
use std::path::Path;

use pdfplumber_core::geometry::BBox;

use crate::lines::{Column, ReconstructedLine};
use crate::rulings::TableCandidate;

/// Per-page diagnostic snapshot: resolved rotation, ruling-derived table
/// candidates, the chosen column split, and every reconstructed line's
/// classification.
#[derive(Debug, Clone)]
pub struct DebugPageArtifact {
    pub page_number: usize,
    pub resolved_rotation: i32,
    pub candidate_bboxes: Vec<BBox>,
    pub split_x: Option<f64>,
    pub line_classifications: Vec<LineClassification>,
}

#[derive(Debug, Clone)]
pub struct LineClassification {
    pub bbox: BBox,
    pub text: String,
    pub column: &'static str,
}

fn column_label(column: Column) -> &'static str {
    match column {
        Column::Left => "left",
        Column::Right => "right",
        Column::Spanning => "spanning",
        Column::CenterStructural => "center_structural",
        Column::Single => "single",
    }
}

impl DebugPageArtifact {
    pub fn new(
        page_number: usize,
        resolved_rotation: i32,
        candidates: &[TableCandidate],
        split_x: Option<f64>,
        lines: &[ReconstructedLine],
    ) -> Self {
        Self {
            page_number,
            resolved_rotation,
            candidate_bboxes: candidates.iter().map(|c| c.bbox).collect(),
            split_x,
            line_classifications: lines
                .iter()
                .map(|l| LineClassification {
                    bbox: l.bbox,
                    text: l.text.clone(),
                    column: column_label(l.column),
                })
                .collect(),
        }
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "page_number": self.page_number,
            "resolved_rotation": self.resolved_rotation,
            "candidate_bboxes": self.candidate_bboxes.iter().map(|b| {
                serde_json::json!({"x0": b.x0, "top": b.top, "x1": b.x1, "bottom": b.bottom})
            }).collect::<Vec<_>>(),
            "split_x": self.split_x,
            "lines": self.line_classifications.iter().map(|l| serde_json::json!({
                "bbox": {"x0": l.bbox.x0, "top": l.bbox.top, "x1": l.bbox.x1, "bottom": l.bbox.bottom},
                "text": l.text,
                "column": l.column,
            })).collect::<Vec<_>>(),
        })
    }

    /// Write this artifact as `_debug_pages/page_<NNNN>.json`.
    pub fn write(&self, out_dir: &Path) -> std::io::Result<()> {
        let dir = out_dir.join("_debug_pages");
        fs::create_dir_all(&dir)?;
        let rendered = serde_json::to_string_pretty(&self.to_json()).expect("debug artifact always serializes");
        fs::write(dir.join(format!("page_{:04}.json", self.page_number)), rendered)
    }
}
