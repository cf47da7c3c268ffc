//! PDF annotation types.
//!
//! Provides [`Annotation`] and [`AnnotationType`] for representing PDF page
//! annotations such as text notes, links, highlights, and stamps.

use crate::BBox;

/// Common PDF annotation subtypes.
///
/// Covers the most frequently used annotation types defined in PDF 1.7 (Table 169).
/// Unknown or rare subtypes are represented as [`AnnotationType::Other`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AnnotationType {
    /// Text annotation (sticky note).
    Text,
    /// Link annotation (hyperlink or internal navigation).
    Link,
    /// Free text annotation (directly displayed text).
    FreeText,
    /// Highlight markup annotation.
    Highlight,
    /// Underline markup annotation.
    Underline,
    /// Strikeout markup annotation.
    StrikeOut,
    /// Stamp annotation.
    Stamp,
    /// Square annotation (rectangle shape).
    Square,
    /// Circle annotation (ellipse shape).
    Circle,
    /// Ink annotation (freehand drawing).
    Ink,
    /// Popup annotation (associated with another annotation).
    Popup,
    /// Widget annotation (form field).
    Widget,
    /// Other / unknown annotation subtype.
    Other(String),
}

impl AnnotationType {
    /// Parse an annotation type from a PDF /Subtype name.
    pub fn from_subtype(subtype: &str) -> Self {
        match subtype {
            "Text" => Self::Text,
            "Link" => Self::Link,
            "FreeText" => Self::FreeText,
            "Highlight" => Self::Highlight,
            "Underline" => Self::Underline,
            "StrikeOut" => Self::StrikeOut,
            "Stamp" => Self::Stamp,
            "Square" => Self::Square,
            "Circle" => Self::Circle,
            "Ink" => Self::Ink,
            "Popup" => Self::Popup,
            "Widget" => Self::Widget,
            other => Self::Other(other.to_string()),
        }
    }
}

/// A PDF annotation extracted from a page.
///
/// Represents a single annotation with its type, bounding box, and optional
/// metadata fields (contents, author, modification date).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Annotation {
    /// The annotation type (parsed from /Subtype).
    pub annot_type: AnnotationType,
    /// Bounding box of the annotation on the page.
    pub bbox: BBox,
    /// Text contents of the annotation (/Contents entry).
    pub contents: Option<String>,
    /// Author of the annotation (/T entry).
    pub author: Option<String>,
    /// Modification date (/M entry, raw PDF date string).
    pub date: Option<String>,
    /// Raw /Subtype name as it appears in the PDF.
    pub raw_subtype: String,
}
