use crate::geometry::BBox;
use crate::painting::Color;

/// Reading direction derived from the dominant axis of a character's rendering matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextDirection {
    /// Left to right (the common case).
    Ltr,
    /// Right to left.
    Rtl,
    /// Top to bottom.
    Ttb,
    /// Bottom to top.
    Btt,
}

/// A single character extracted from a PDF page.
#[derive(Debug, Clone, PartialEq)]
pub struct Char {
    /// The text content of this character.
    pub text: String,
    /// Bounding box in top-left origin coordinates.
    pub bbox: BBox,
    /// Font name.
    pub fontname: String,
    /// Font size in points.
    pub size: f64,
    /// Distance from the top of the page to the top of the bounding box.
    pub doctop: f64,
    /// True if the character's rendering matrix has no rotation or shear.
    pub upright: bool,
    /// Dominant reading direction derived from the rendering matrix.
    pub direction: TextDirection,
    /// Stroking color in effect when this character was painted.
    pub stroking_color: Option<Color>,
    /// Non-stroking (fill) color in effect when this character was painted.
    pub non_stroking_color: Option<Color>,
    /// The character's text rendering matrix `[a, b, c, d, e, f]`.
    pub ctm: [f64; 6],
    /// Raw character code from the PDF string byte(s) that produced this glyph.
    pub char_code: u32,
    /// Marked-content identifier, if this character lies inside a tagged span.
    pub mcid: Option<u32>,
    /// Structure tag name, if this character lies inside a tagged span.
    pub tag: Option<String>,
}

impl Char {
    /// Classify the character's rotation into one of {0, 90, 180, 270} degrees,
    /// tolerant to `tolerance_degrees` of skew. `None` means the matrix's rotation
    /// angle does not land near any of the four canonical orientations.
    pub fn classify_rotation(&self, tolerance_degrees: f64) -> Option<i32> {
        let [a, b, ..] = self.ctm;
        if a == 0.0 && b == 0.0 {
            return if self.upright { Some(0) } else { None };
        }
        let angle = b.atan2(a).to_degrees().rem_euclid(360.0);
        for candidate in [0, 90, 180, 270] {
            let diff = (angle - candidate as f64).abs() % 360.0;
            let diff = diff.min(360.0 - diff);
            if diff <= tolerance_degrees {
                return Some(candidate);
            }
        }
        None
    }
}

/// Returns true if `ch` falls in a CJK (Chinese/Japanese/Korean) Unicode block.
pub fn is_cjk(ch: char) -> bool {
    matches!(
        ch as u32,
        0x4E00..=0x9FFF
            | 0x3400..=0x4DBF
            | 0x20000..=0x2A6DF
            | 0x3040..=0x309F
            | 0x30A0..=0x30FF
            | 0xAC00..=0xD7A3
    )
}

/// Returns true if any character in `text` is CJK.
pub fn is_cjk_text(text: &str) -> bool {
    text.chars().any(is_cjk)
}
