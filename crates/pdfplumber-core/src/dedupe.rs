//! Duplicate character deduplication.
//!
//! Removes duplicate overlapping characters that some PDF generators output
//! (for bold effect or due to bugs). Reference: pdfplumber(Py) `Page.dedupe_chars()`.

use crate::text::Char;

/// Options for duplicate character detection and removal.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DedupeOptions {
    /// Maximum distance (in points) between character positions to consider
    /// them as duplicates. Default: `1.0`.
    pub tolerance: f64,
    /// Additional character attributes that must match for two characters to be
    /// considered duplicates. Default: `["fontname", "size"]`.
    ///
    /// Supported attribute names: `"fontname"`, `"size"`, `"upright"`,
    /// `"stroking_color"`, `"non_stroking_color"`.
    pub extra_attrs: Vec<String>,
}

impl Default for DedupeOptions {
    fn default() -> Self {
        Self {
            tolerance: 1.0,
            extra_attrs: vec!["fontname".to_string(), "size".to_string()],
        }
    }
}

/// Returns whether two characters match on the given attribute name.
fn attrs_match(a: &Char, b: &Char, attr: &str) -> bool {
    match attr {
        "fontname" => a.fontname == b.fontname,
        "size" => (a.size - b.size).abs() < f64::EPSILON,
        "upright" => a.upright == b.upright,
        "stroking_color" => a.stroking_color == b.stroking_color,
        "non_stroking_color" => a.non_stroking_color == b.non_stroking_color,
        _ => true, // Unknown attributes are ignored (treated as matching)
    }
}

/// Returns whether two characters are duplicates according to the given options.
///
/// Two characters are considered duplicates if:
/// 1. They have the same text content
/// 2. Their positions (x0, top) are within the tolerance
/// 3. All specified extra attributes match
fn is_duplicate(a: &Char, b: &Char, options: &DedupeOptions) -> bool {
    // Must have the same text
    if a.text != b.text {
        return false;
    }

    // Positions must be within tolerance
    let dx = (a.bbox.x0 - b.bbox.x0).abs();
    let dy = (a.bbox.top - b.bbox.top).abs();
    if dx > options.tolerance || dy > options.tolerance {
        return false;
    }

    // All extra attributes must match
    options
        .extra_attrs
        .iter()
        .all(|attr| attrs_match(a, b, attr))
}

/// Remove duplicate overlapping characters from a slice.
///
/// Iterates through characters in order, keeping the first occurrence and
/// discarding subsequent duplicates. Two characters are duplicates if their
/// positions overlap within `tolerance` and the specified `extra_attrs` match.
///
/// The original slice is not modified; a new `Vec<Char>` is returned.
pub fn dedupe_chars(chars: &[Char], options: &DedupeOptions) -> Vec<Char> {
    let mut kept: Vec<Char> = Vec::with_capacity(chars.len());

    for ch in chars {
        let dominated = kept.iter().any(|k| is_duplicate(k, ch, options));
        if !dominated {
            kept.push(ch.clone());
        }
    }

    kept
}
