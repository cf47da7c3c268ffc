//! PDF structure tree types for tagged PDF access.
//!
//! Tagged PDFs contain a logical structure tree that describes the document's
//! semantic structure (headings, paragraphs, tables, lists). This module provides
//! the [`StructElement`] type for representing structure tree nodes.

use crate::geometry::BBox;

/// A node in the PDF structure tree.
///
/// Represents a logical structure element from a tagged PDF's `/StructTreeRoot`.
/// Each element has a type (e.g., "H1", "P", "Table"), optional marked content
/// identifiers (MCIDs) linking it to page content, and optional child elements
/// forming a tree structure.
///
/// # Tagged PDF Support
///
/// Tagged PDFs (ISO 32000-1, Section 14.8) embed semantic structure that is
/// critical for accessibility and increasingly important for AI/LLM document
/// understanding. The structure tree maps logical elements (headings, paragraphs,
/// tables) to their visual representation on the page via MCID references.
///
/// # Example
///
/// ```
/// use pdfplumber_core::StructElement;
///
/// let heading = StructElement {
///     element_type: "H1".to_string(),
///     mcids: vec![0],
///     alt_text: None,
///     actual_text: Some("Chapter 1".to_string()),
///     lang: Some("en".to_string()),
///     bbox: None,
///     children: vec![],
///     page_index: Some(0),
/// };
/// assert_eq!(heading.element_type, "H1");
/// assert_eq!(heading.mcids, vec![0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StructElement {
    /// The structure type name (e.g., "Document", "H1", "P", "Table", "TR", "TD",
    /// "L", "LI", "Span", "Figure").
    pub element_type: String,
    /// Marked content identifiers linking this element to page content.
    /// Each MCID corresponds to a marked-content sequence in a page's content stream.
    pub mcids: Vec<u32>,
    /// Alternative text for accessibility (from `/Alt` entry).
    pub alt_text: Option<String>,
    /// Replacement text for the element's content (from `/ActualText` entry).
    pub actual_text: Option<String>,
    /// Language of the element's content (from `/Lang` entry, e.g., "en-US").
    pub lang: Option<String>,
    /// Bounding box of the element, if available.
    pub bbox: Option<BBox>,
    /// Child structure elements forming the tree hierarchy.
    pub children: Vec<StructElement>,
    /// Page index (0-based) this element belongs to, if determinable.
    pub page_index: Option<usize>,
}
