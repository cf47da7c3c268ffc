//! Document-level Markdown conversion types.
//!
//! Provides [`MarkdownConversionOptions`] and [`MarkdownConversionResult`] for
//! converting entire PDF documents to Markdown with metadata, images, and warnings.

use crate::error::ExtractWarning;
use crate::images::{ExportedImage, ImageExportOptions};

/// Options for document-level Markdown conversion.
///
/// Controls how pages are combined, whether images are included,
/// and strict-mode behavior for warnings.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarkdownConversionOptions {
    /// Separator inserted between page Markdown outputs.
    /// Default: `"\n\n---\n\n"`
    pub page_separator: String,
    /// Whether to include extracted images in the result.
    /// Default: `true`
    pub include_images: bool,
    /// Options for image export (naming pattern, deduplication).
    pub image_options: ImageExportOptions,
    /// When true, any warning is escalated to an error.
    /// Default: `false`
    pub strict_mode: bool,
}

impl Default for MarkdownConversionOptions {
    fn default() -> Self {
        Self {
            page_separator: "\n\n---\n\n".to_string(),
            include_images: true,
            image_options: ImageExportOptions::default(),
            strict_mode: false,
        }
    }
}

/// Result of a document-level Markdown conversion.
///
/// Contains the combined Markdown text, a plain-text version,
/// optional title, extracted images, warnings, and page count.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarkdownConversionResult {
    /// Combined Markdown text from all pages.
    pub markdown: String,
    /// Plain text version with Markdown formatting stripped.
    pub plain_text: String,
    /// Document title from PDF metadata or first heading.
    pub title: Option<String>,
    /// Extracted images (empty if `include_images` is false).
    pub images: Vec<ExportedImage>,
    /// Warnings collected during conversion.
    pub warnings: Vec<ExtractWarning>,
    /// Number of pages processed.
    pub page_count: usize,
}

/// Strip Markdown formatting from text, returning plain text.
///
/// Removes heading markers (`# `), emphasis markers (`*`, `**`, `_`),
/// horizontal rules (`---`), and collapses whitespace.
pub fn strip_markdown(markdown: &str) -> String {
    let mut result = String::with_capacity(markdown.len());

    for line in markdown.lines() {
        let trimmed = line.trim();

        // Skip horizontal rules
        if trimmed == "---" || trimmed == "***" || trimmed == "___" {
            result.push('\n');
            continue;
        }

        // Strip heading markers
        let stripped = if trimmed.starts_with('#') {
            trimmed.trim_start_matches('#').trim_start()
        } else {
            trimmed
        };

        // Strip bold/italic markers
        let stripped = strip_emphasis(stripped);

        if !stripped.is_empty() {
            if !result.is_empty() && !result.ends_with('\n') {
                result.push('\n');
            }
            result.push_str(&stripped);
        } else if !result.is_empty() {
            result.push('\n');
        }
    }

    // Clean up trailing whitespace
    result.trim().to_string()
}

/// Strip bold/italic emphasis markers from a string.
fn strip_emphasis(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let chars: Vec<char> = s.chars().collect();
    let len = chars.len();
    let mut i = 0;

    while i < len {
        if chars[i] == '*' || chars[i] == '_' {
            // Skip consecutive emphasis markers
            while i < len && (chars[i] == '*' || chars[i] == '_') {
                i += 1;
            }
        } else {
            result.push(chars[i]);
            i += 1;
        }
    }

    result
}

/// Extract a title from the first Markdown heading in the text.
///
/// Looks for lines starting with `# ` (H1) and returns the heading text.
/// Returns `None` if no H1 heading is found.
pub fn extract_title_from_markdown(markdown: &str) -> Option<String> {
    for line in markdown.lines() {
        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix("# ") {
            let title = rest.trim();
            if !title.is_empty() {
                return Some(title.to_string());
            }
        }
    }
    None
}
