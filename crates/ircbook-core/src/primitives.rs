//! Primitive intake: bridges the PDF collaborator (`pdfplumber-parse`) to
//! the page-layout analysis pipeline, and the provenance guard that runs
//! immediately after intake.
//!
//! Grounded in `pdfplumber::Pdf`'s own `CollectingHandler` (see
//! `pdfplumber/src/pdf.rs`), generalized to also collect painted paths —
//! the facade crate leaves `on_path_painted` a no-op today, which is why
//! this crate talks to `pdfplumber-parse` directly rather than through the
//! facade (see DESIGN.md).

use std::collections::BTreeSet;
use std::path::Path;

use pdfplumber_core::geometry::BBox;
use pdfplumber_core::painting::PaintedPath;
use pdfplumber_core::path::Path as VectorPath;
use pdfplumber_core::shapes::{Curve, Line as ShapeLine, Rect, extract_shapes};
use pdfplumber_core::error::ExtractOptions;
use pdfplumber_core::text::Char;
use pdfplumber_core::words::{Word, WordExtractor, WordOptions};
use pdfplumber_parse::{
    CharEvent, ContentHandler, ImageEvent, LopdfBackend, LopdfDocument, PaintOp, PathEvent,
    PdfBackend, char_from_event,
};
use sha2::{Digest, Sha256};

use crate::constants::{AMENDMENT_KEYWORDS, HEADER_FOOTER_BAND_RATIO};
use crate::error::FatalError;

/// Raw, page-scoped primitives handed off by the PDF collaborator: the
/// geometry the rest of the pipeline works from.
#[derive(Debug, Clone)]
pub struct PageIntake {
    /// 1-indexed PDF page number, as it appears in diagnostics.
    pub page_number: usize,
    pub width: f64,
    pub height: f64,
    pub chars: Vec<Char>,
    pub words: Vec<Word>,
    /// Axis-aligned segments contributed by edges, lines, and rectangle sides,
    /// in native (unrotated) page coordinates; not yet clustered into rulings.
    pub raw_segments: Vec<RawSegment>,
}

/// A single straight segment contributed by a painted line or one side of a
/// painted rectangle, before axis classification or clustering.
#[derive(Debug, Clone, Copy)]
pub struct RawSegment {
    pub x0: f64,
    pub top: f64,
    pub x1: f64,
    pub bottom: f64,
}

struct CollectingHandler {
    chars: Vec<CharEvent>,
    paths: Vec<PathEvent>,
}

impl CollectingHandler {
    fn new() -> Self {
        Self {
            chars: Vec::new(),
            paths: Vec::new(),
        }
    }
}

impl ContentHandler for CollectingHandler {
    fn on_char(&mut self, event: CharEvent) {
        self.chars.push(event);
    }

    fn on_path_painted(&mut self, event: PathEvent) {
        self.paths.push(event);
    }

    fn on_image(&mut self, _event: ImageEvent) {}
}

fn path_event_to_painted(event: &PathEvent) -> PaintedPath {
    let (stroke, fill) = match event.paint_op {
        PaintOp::Stroke => (true, false),
        PaintOp::Fill => (false, true),
        PaintOp::FillAndStroke => (true, true),
    };
    PaintedPath {
        path: VectorPath {
            segments: event.segments.clone(),
        },
        stroke,
        fill,
        fill_rule: event.fill_rule.unwrap_or_default(),
        line_width: event.line_width,
        stroke_color: event.stroking_color.unwrap_or_default(),
        fill_color: event.non_stroking_color.unwrap_or_default(),
    }
}

fn rect_segments(rect: &Rect) -> [RawSegment; 4] {
    [
        RawSegment {
            x0: rect.x0,
            top: rect.top,
            x1: rect.x1,
            bottom: rect.top,
        },
        RawSegment {
            x0: rect.x0,
            top: rect.bottom,
            x1: rect.x1,
            bottom: rect.bottom,
        },
        RawSegment {
            x0: rect.x0,
            top: rect.top,
            x1: rect.x0,
            bottom: rect.bottom,
        },
        RawSegment {
            x0: rect.x1,
            top: rect.top,
            x1: rect.x1,
            bottom: rect.bottom,
        },
    ]
}

fn line_segment(line: &ShapeLine) -> RawSegment {
    RawSegment {
        x0: line.x0,
        top: line.top,
        x1: line.x1,
        bottom: line.bottom,
    }
}

/// An opened document, ready for page-by-page traversal.
pub struct Document {
    backend: LopdfDocument,
    pub page_count: usize,
    pub sha256: String,
}

impl Document {
    /// Open `path`, computing its SHA-256 digest and page count up front.
    pub fn open(path: &Path) -> Result<Self, FatalError> {
        let bytes = std::fs::read(path).map_err(|e| FatalError::PdfInputMissing {
            detail: format!("{}: {e}", path.display()),
        })?;
        let sha256 = {
            let mut hasher = Sha256::new();
            hasher.update(&bytes);
            format!("{:x}", hasher.finalize())
        };
        let backend = LopdfBackend::open(&bytes).map_err(|e| FatalError::PdfInputMissing {
            detail: format!("{}: {e}", path.display()),
        })?;
        let page_count = LopdfBackend::page_count(&backend);
        Ok(Self {
            backend,
            page_count,
            sha256,
        })
    }

    /// Intake the `index`-th page (0-indexed), producing its raw geometry.
    /// `page_number` is the 1-indexed page number used in diagnostics.
    pub fn intake_page(&self, index: usize, page_number: usize) -> Result<PageIntake, FatalError> {
        let page =
            LopdfBackend::get_page(&self.backend, index).map_err(|e| FatalError::CharDataMissing {
                page: page_number,
                detail: e.to_string(),
            })?;
        let media_box =
            LopdfBackend::page_media_box(&self.backend, &page).map_err(|e| FatalError::CharDataMissing {
                page: page_number,
                detail: e.to_string(),
            })?;
        let width = media_box.width();
        let height = media_box.height();

        let mut handler = CollectingHandler::new();
        LopdfBackend::interpret_page(
            &self.backend,
            &page,
            &mut handler,
            &ExtractOptions::default(),
        )
        .map_err(|e| FatalError::CharDataMissing {
            page: page_number,
            detail: e.to_string(),
        })?;

        if handler.chars.is_empty() {
            return Err(FatalError::CharDataMissing {
                page: page_number,
                detail: "page produced no character events".to_string(),
            });
        }

        let mut chars = Vec::with_capacity(handler.chars.len());
        for event in &handler.chars {
            if event.font_size <= 0.0 || event.font_name.is_empty() {
                return Err(FatalError::FontMetadataMissing {
                    page: page_number,
                    detail: format!("char_code={}", event.char_code),
                });
            }
            chars.push(char_from_event(event, height, None, None));
        }

        let mut raw_segments = Vec::new();
        for event in &handler.paths {
            let painted = path_event_to_painted(event);
            let (lines, rects, _curves): (Vec<ShapeLine>, Vec<Rect>, Vec<Curve>) =
                extract_shapes(&painted, height);
            for line in &lines {
                raw_segments.push(line_segment(line));
            }
            for rect in &rects {
                raw_segments.extend_from_slice(&rect_segments(rect));
            }
        }

        let words = WordExtractor::extract(&chars, &WordOptions::default());

        Ok(PageIntake {
            page_number,
            width,
            height,
            chars,
            words,
            raw_segments,
        })
    }
}

/// Header/footer band boundaries for a page, computed as the top and bottom
/// `HEADER_FOOTER_BAND_RATIO` fraction of page height.
#[derive(Debug, Clone, Copy)]
pub struct Bands {
    pub header_bottom: f64,
    pub footer_top: f64,
}

impl Bands {
    pub fn for_page(height: f64) -> Self {
        Self {
            header_bottom: height * HEADER_FOOTER_BAND_RATIO,
            footer_top: height * (1.0 - HEADER_FOOTER_BAND_RATIO),
        }
    }

    pub fn is_header(&self, bbox: &BBox) -> bool {
        bbox.bottom <= self.header_bottom
    }

    pub fn is_footer(&self, bbox: &BBox) -> bool {
        bbox.top >= self.footer_top
    }
}

/// Split a page's characters into (header band text, footer band text, body
/// characters), per §4.1/§4.3. Fails `HEADER_FOOTER_MISSING` if both bands
/// are empty.
pub fn split_bands(
    intake: &PageIntake,
) -> Result<(String, String, Vec<Char>), FatalError> {
    let bands = Bands::for_page(intake.height);
    let mut header_chars: Vec<&Char> = Vec::new();
    let mut footer_chars: Vec<&Char> = Vec::new();
    let mut body = Vec::new();

    for ch in &intake.chars {
        if bands.is_header(&ch.bbox) {
            header_chars.push(ch);
        } else if bands.is_footer(&ch.bbox) {
            footer_chars.push(ch);
        } else {
            body.push(ch.clone());
        }
    }

    if header_chars.is_empty() && footer_chars.is_empty() {
        return Err(FatalError::HeaderFooterMissing {
            page: intake.page_number,
            detail: "no characters found in header or footer band".to_string(),
        });
    }

    let header_text = chars_to_text(&header_chars);
    let footer_text = chars_to_text(&footer_chars);
    Ok((header_text, footer_text, body))
}

fn chars_to_text(chars: &[&Char]) -> String {
    let mut sorted: Vec<&&Char> = chars.iter().collect();
    sorted.sort_by(|a, b| {
        a.bbox
            .top
            .partial_cmp(&b.bbox.top)
            .unwrap()
            .then(a.bbox.x0.partial_cmp(&b.bbox.x0).unwrap())
    });
    let mut out = String::new();
    for ch in sorted {
        out.push_str(&ch.text);
    }
    out
}

/// Collapse runs of whitespace into single spaces and trim ends — used by
/// the TOC-page and amendment scans, which match against "loosely spaced"
/// text rather than raw layout whitespace.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Scan header+footer text for a case-insensitive, whole-word match of any
/// amendment keyword (§4.1). Returns the matched keyword, if any.
pub fn scan_amendment_keywords(header_text: &str, footer_text: &str) -> Option<&'static str> {
    let combined = format!("{header_text} {footer_text}").to_uppercase();
    let words: BTreeSet<&str> = combined.split_whitespace().collect();
    for keyword in AMENDMENT_KEYWORDS {
        if words.contains(keyword) {
            return Some(keyword);
        }
    }
    None
}

/// The provenance guard (§4.1): amendment scan plus hash/allowlist check.
/// Performed once per page for the amendment scan; the hash/allowlist check
/// is document-level and performed once by the driver before any page is
/// processed.
pub fn check_amendment_scan(
    page_number: usize,
    header_text: &str,
    footer_text: &str,
) -> Result<(), FatalError> {
    if let Some(keyword) = scan_amendment_keywords(header_text, footer_text) {
        return Err(FatalError::AmendmentScan {
            page: page_number,
            detail: format!("matched keyword {keyword:?} in header/footer band"),
        });
    }
    Ok(())
}

/// Result of checking a document's hash against an allowlist file.
pub struct AllowlistDecision {
    pub allowed: bool,
    /// True if the allowlist file did not exist and was just seeded with
    /// this document's hash.
    pub seeded: bool,
}

/// Check `sha256` against the allowlist at `allowlist_path`, creating it
/// (seeded with `sha256`) if it does not exist (§4.1).
pub fn check_allowlist(
    allowlist_path: &Path,
    sha256: &str,
) -> Result<AllowlistDecision, FatalError> {
    if !allowlist_path.exists() {
        if let Some(parent) = allowlist_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| FatalError::PdfInputMissing {
                detail: format!("creating allowlist directory: {e}"),
            })?;
        }
        std::fs::write(allowlist_path, format!("{sha256}\n")).map_err(|e| {
            FatalError::PdfInputMissing {
                detail: format!("seeding allowlist: {e}"),
            }
        })?;
        return Ok(AllowlistDecision {
            allowed: true,
            seeded: true,
        });
    }

    let contents = std::fs::read_to_string(allowlist_path).map_err(|e| FatalError::PdfInputMissing {
        detail: format!("reading allowlist: {e}"),
    })?;
    let allowed = contents.lines().any(|line| line.trim() == sha256);
    Ok(AllowlistDecision {
        allowed,
        seeded: false,
    })
}
