//! PDF hyperlink types.
//!
//! Provides [`Hyperlink`] for representing resolved URI links extracted from
//! PDF Link annotations.

use crate::BBox;

/// A resolved hyperlink extracted from a PDF page.
///
/// Represents a Link annotation with its bounding box and resolved URI target.
/// Created by filtering annotations with `/Subtype /Link` and resolving their
/// `/A` (action) or `/Dest` entries.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Hyperlink {
    /// Bounding box of the link on the page.
    pub bbox: BBox,
    /// The resolved URI or destination string.
    pub uri: String,
}
