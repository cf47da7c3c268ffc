//! Text search with position — find text patterns and return matches with bounding boxes.

use regex::Regex;

use crate::geometry::BBox;

/// Options controlling text search behavior.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchOptions {
    /// Whether to interpret the pattern as a regex (default: `true`).
    /// When `false`, the pattern is treated as a literal string.
    pub regex: bool,
    /// Whether the search is case-sensitive (default: `true`).
    pub case_sensitive: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            regex: true,
            case_sensitive: true,
        }
    }
}

/// A single text search match with its bounding box and position information.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchMatch {
    /// The matched text.
    pub text: String,
    /// Union bounding box of all constituent characters.
    pub bbox: BBox,
    /// Page number (0-indexed).
    pub page_number: usize,
    /// Indices into the page's char array for the matched characters.
    pub char_indices: Vec<usize>,
}

/// Search for a pattern in a sequence of characters and return matches with bounding boxes.
///
/// The algorithm:
/// 1. Concatenate all char texts into a single string, tracking byte-offset → char-index mapping.
/// 2. Run the pattern (regex or literal) against the concatenated string.
/// 3. For each match, determine which chars contribute and compute the union bbox.
///
/// # Arguments
///
/// * `chars` - The characters to search within (from a page).
/// * `pattern` - The search pattern (regex or literal string).
/// * `options` - Search options (regex mode, case sensitivity).
/// * `page_number` - The page number for the returned matches.
///
/// # Returns
///
/// A vector of [`SearchMatch`] with bounding boxes computed from constituent chars.
/// Returns an empty vector if the pattern is invalid or no matches are found.
pub fn search_chars(
    chars: &[crate::text::Char],
    pattern: &str,
    options: &SearchOptions,
    page_number: usize,
) -> Vec<SearchMatch> {
    if chars.is_empty() || pattern.is_empty() {
        return Vec::new();
    }

    // Build the concatenated text and mapping from byte offset to char index.
    // Each char's text maps to a range of byte offsets in the concatenated string.
    let mut full_text = String::new();
    // byte_to_char_idx[byte_offset] = index into chars array
    let mut byte_to_char_idx: Vec<usize> = Vec::new();

    for (i, ch) in chars.iter().enumerate() {
        let start = full_text.len();
        full_text.push_str(&ch.text);
        let end = full_text.len();
        for _ in start..end {
            byte_to_char_idx.push(i);
        }
    }

    // Build the regex pattern
    let regex_pattern = if options.regex {
        if options.case_sensitive {
            pattern.to_string()
        } else {
            format!("(?i){pattern}")
        }
    } else {
        let escaped = regex::escape(pattern);
        if options.case_sensitive {
            escaped
        } else {
            format!("(?i){escaped}")
        }
    };

    let re = match Regex::new(&regex_pattern) {
        Ok(re) => re,
        Err(_) => return Vec::new(),
    };

    let mut results = Vec::new();

    for m in re.find_iter(&full_text) {
        let match_start = m.start();
        let match_end = m.end();

        if match_start >= byte_to_char_idx.len() || match_end == 0 {
            continue;
        }

        // Collect unique char indices for this match
        let mut char_indices: Vec<usize> = Vec::new();
        for byte_offset in match_start..match_end {
            if byte_offset < byte_to_char_idx.len() {
                let idx = byte_to_char_idx[byte_offset];
                if char_indices.last() != Some(&idx) {
                    char_indices.push(idx);
                }
            }
        }

        if char_indices.is_empty() {
            continue;
        }

        // Compute the union bbox of matched chars
        let mut bbox = chars[char_indices[0]].bbox;
        for &idx in &char_indices[1..] {
            bbox = bbox.union(&chars[idx].bbox);
        }

        results.push(SearchMatch {
            text: m.as_str().to_string(),
            bbox,
            page_number,
            char_indices,
        });
    }

    results
}
