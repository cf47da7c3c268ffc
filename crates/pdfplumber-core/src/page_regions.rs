//! Header/footer detection and page region classification.
//!
//! Provides cross-page analysis to detect repeating headers and footers
//! by comparing candidate regions across pages with fuzzy matching.

use crate::geometry::BBox;

/// Configuration for page region detection.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageRegionOptions {
    /// Fraction of page height to scan for headers (from top). Default: 0.1 (10%).
    pub header_margin: f64,
    /// Fraction of page height to scan for footers (from bottom). Default: 0.1 (10%).
    pub footer_margin: f64,
    /// Minimum number of pages required for detection. Default: 3.
    pub min_pages: usize,
}

impl Default for PageRegionOptions {
    fn default() -> Self {
        Self {
            header_margin: 0.1,
            footer_margin: 0.1,
            min_pages: 3,
        }
    }
}

/// Detected regions for a single page.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageRegions {
    /// Header region, if a repeating header was detected.
    pub header: Option<BBox>,
    /// Footer region, if a repeating footer was detected.
    pub footer: Option<BBox>,
    /// Body region (the area between header and footer).
    pub body: BBox,
}

/// Mask variable elements in text for fuzzy comparison.
///
/// Replaces sequences of digits with `#` and normalizes whitespace.
/// This allows detecting repeating text even when page numbers, dates,
/// or other variable elements change across pages.
pub fn mask_variable_elements(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut in_digit_run = false;

    for ch in text.chars() {
        if ch.is_ascii_digit() {
            if !in_digit_run {
                result.push('#');
                in_digit_run = true;
            }
            // Skip additional digits in the run
        } else {
            in_digit_run = false;
            result.push(ch);
        }
    }

    result
}

/// Detect repeating headers and footers across multiple pages.
///
/// Takes a list of (header_text, footer_text, page_width, page_height) tuples
/// for each page, along with options. Returns a `PageRegions` for each page.
///
/// The algorithm:
/// 1. For each page, compute the header/footer candidate region BBox
/// 2. Mask variable elements (digits → `#`) in candidate text
/// 3. Count how many pages share the same masked text
/// 4. If the same masked text appears on at least `min_pages` pages,
///    mark that region as a header/footer
/// 5. Handle odd/even page variation by checking both uniform and alternating patterns
pub fn detect_page_regions(
    page_data: &[(String, String, f64, f64)],
    options: &PageRegionOptions,
) -> Vec<PageRegions> {
    let num_pages = page_data.len();

    if num_pages < options.min_pages {
        // Not enough pages for detection — return full page as body
        return page_data
            .iter()
            .map(|(_, _, width, height)| PageRegions {
                header: None,
                footer: None,
                body: BBox::new(0.0, 0.0, *width, *height),
            })
            .collect();
    }

    // Collect masked header/footer texts
    let masked_headers: Vec<String> = page_data
        .iter()
        .map(|(h, _, _, _)| mask_variable_elements(h.trim()))
        .collect();
    let masked_footers: Vec<String> = page_data
        .iter()
        .map(|(_, f, _, _)| mask_variable_elements(f.trim()))
        .collect();

    // Detect repeating headers
    let has_header = detect_repeating_text(&masked_headers, options.min_pages);

    // Detect repeating footers
    let has_footer = detect_repeating_text(&masked_footers, options.min_pages);

    // Build PageRegions for each page
    page_data
        .iter()
        .enumerate()
        .map(|(i, (_, _, width, height))| {
            let header_height = height * options.header_margin;
            let footer_height = height * options.footer_margin;

            let header = if has_header[i] && !page_data[i].0.trim().is_empty() {
                Some(BBox::new(0.0, 0.0, *width, header_height))
            } else {
                None
            };

            let footer = if has_footer[i] && !page_data[i].1.trim().is_empty() {
                Some(BBox::new(0.0, height - footer_height, *width, *height))
            } else {
                None
            };

            let body_top = if header.is_some() { header_height } else { 0.0 };
            let body_bottom = if footer.is_some() {
                height - footer_height
            } else {
                *height
            };

            PageRegions {
                header,
                footer,
                body: BBox::new(0.0, body_top, *width, body_bottom),
            }
        })
        .collect()
}

/// Detect which pages have repeating text that appears on enough pages.
///
/// Returns a boolean for each page indicating whether it participates in
/// a repeating pattern. Handles both uniform repetition (same text on all pages)
/// and odd/even alternation (different text on odd vs even pages).
fn detect_repeating_text(masked_texts: &[String], min_pages: usize) -> Vec<bool> {
    let n = masked_texts.len();
    let mut is_repeating = vec![false; n];

    // Count occurrences of each non-empty masked text
    let mut counts: std::collections::HashMap<&str, usize> = std::collections::HashMap::new();
    for text in masked_texts {
        if !text.is_empty() {
            *counts.entry(text.as_str()).or_insert(0) += 1;
        }
    }

    // A text is "repeating" if it appears on >= min_pages pages
    for (i, text) in masked_texts.iter().enumerate() {
        if !text.is_empty() {
            if let Some(&count) = counts.get(text.as_str()) {
                if count >= min_pages {
                    is_repeating[i] = true;
                }
            }
        }
    }

    // Also check odd/even alternation pattern:
    // If odd pages share text A and even pages share text B,
    // and each appears on >= min_pages/2 pages, mark both as repeating
    if !is_repeating.iter().any(|&r| r) {
        let odd_texts: Vec<&str> = masked_texts
            .iter()
            .enumerate()
            .filter(|(i, t)| i % 2 == 0 && !t.is_empty()) // 0-indexed, so "page 1" is index 0
            .map(|(_, t)| t.as_str())
            .collect();
        let even_texts: Vec<&str> = masked_texts
            .iter()
            .enumerate()
            .filter(|(i, t)| i % 2 == 1 && !t.is_empty())
            .map(|(_, t)| t.as_str())
            .collect();

        let min_alt = min_pages.div_ceil(2);

        let odd_repeating = if !odd_texts.is_empty() {
            let first = odd_texts[0];
            odd_texts.iter().filter(|&&t| t == first).count() >= min_alt
        } else {
            false
        };

        let even_repeating = if !even_texts.is_empty() {
            let first = even_texts[0];
            even_texts.iter().filter(|&&t| t == first).count() >= min_alt
        } else {
            false
        };

        if odd_repeating && even_repeating {
            for (i, text) in masked_texts.iter().enumerate() {
                if !text.is_empty() {
                    is_repeating[i] = true;
                }
            }
        }
    }

    is_repeating
}
