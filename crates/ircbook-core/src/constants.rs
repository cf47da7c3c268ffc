//! Tolerance constants driving every geometric decision in the pipeline.
//!
//! Every name here traces back to a constant in the original page-layout
//! analysis script. Keeping them grouped in one module (rather than
//! scattering magic numbers through the pipeline modules) matches how
//! `pdfplumber-core`'s `TableSettings`/`WordOptions` document their own
//! defaults as named fields.

/// Header and footer band height, as a fraction of page height.
pub const HEADER_FOOTER_BAND_RATIO: f64 = 0.10;

/// Full centered-band width, as a fraction of page width. A line is
/// "centered" when its bbox lies within the middle `CENTER_BAND_RATIO`
/// of the page, i.e. within `CENTER_BAND_RATIO / 2` of the centerline on
/// either side. Reused verbatim for index-letter/digit classification
/// (see SPEC_FULL.md Open Questions).
pub const CENTER_BAND_RATIO: f64 = 0.2;

/// Vertical tolerance for grouping characters into the same line.
pub const LINE_TOP_TOLERANCE: f64 = 3.0;

/// Gap, in units of median character width, above which a line break in
/// the top-header scan is treated as ending the run of centered lines.
pub const TOP_HEADER_GAP_MAX: f64 = 12.0;

/// Width of the gutter straddle-rejection band around the column split.
pub const GUTTER_TOLERANCE: f64 = 2.0;

/// Fraction of page width a column split may drift from the page center
/// before the off-center fallback/failure kicks in.
pub const COLUMN_SPLIT_OFFCENTER_RATIO: f64 = 0.15;

/// Minimum width, as a fraction of page width, for a spanning note line.
pub const SPANNING_NOTE_WIDTH_RATIO: f64 = 0.70;

/// Minimum point size a spanning note must fall short of the body
/// median by.
pub const SPANNING_NOTE_SIZE_DELTA: f64 = 1.0;

/// Column-header-position tolerance: a heading's x0 must lie within
/// `max(COLUMN_MARGIN_TOLERANCE, 3 * median_char_width)` of its column's
/// 5th-percentile left margin.
pub const COLUMN_MARGIN_TOLERANCE: f64 = 3.0;
/// Multiplier on median character width for the header-position check.
pub const COLUMN_MARGIN_WIDTH_MULTIPLIER: f64 = 3.0;

/// Minimum font-size delta over the body median for header style
/// (alternative to bold).
pub const HEADER_STYLE_SIZE_DELTA: f64 = 1.0;

/// Multiplier on median character width for "short fragment" gutter
/// line classification.
pub const GUTTER_SHORT_FRAGMENT_WIDTH_MULTIPLIER: f64 = 3.0;
/// Maximum character count for a "short alphanumeric fragment" gutter line.
pub const GUTTER_SHORT_FRAGMENT_MAX_CHARS: usize = 3;

/// Ruling snap grid, in points.
pub const RULING_SNAP_GRID: f64 = 0.5;
/// Minimum ruling length, in points.
pub const RULING_MIN_LEN: f64 = 6.0;
/// Maximum gap between endpoints for collinear rulings to be joined.
pub const RULING_JOIN_TOLERANCE: f64 = 2.0;
/// Tolerance for classifying a segment as horizontal or vertical.
pub const RULING_AXIS_TOLERANCE: f64 = 1.0;
/// Tolerance for computing ruling intersections.
pub const RULING_INTERSECTION_TOLERANCE: f64 = 1.5;

/// Minimum horizontal rulings for a table candidate.
pub const TABLE_MIN_H_RULINGS: usize = 2;
/// Minimum vertical rulings for a table candidate.
pub const TABLE_MIN_V_RULINGS: usize = 2;
/// Minimum total intersections for a table candidate.
pub const TABLE_INTERSECTION_MIN: usize = 4;
/// Maximum fraction of empty cells before a table extraction is
/// rejected as degenerate.
pub const TABLE_EMPTY_CELL_RATIO_MAX: f64 = 0.80;
/// Tolerance for overlap checks in the real-table filter.
pub const TABLE_OVERLAP_TOLERANCE: f64 = 1.0;

/// Distance from the page bottom within which a table is considered to
/// "touch the bottom" and become a continuation candidate.
pub const TABLE_BOTTOM_TOUCH_DISTANCE: f64 = 15.0;

/// Maximum distance above a table bbox a caption line may sit and still
/// be preferred as "immediately above".
pub const TABLE_LABEL_SEARCH_WINDOW: f64 = 60.0;
/// Top-band fraction of a table bbox within which an interior label is
/// still accepted when no label-above is found.
pub const TABLE_LABEL_TOP_BAND_RATIO: f64 = 0.15;
/// Maximum distance below a table bbox within which a line may be
/// captured as a footnote.
pub const TABLE_FOOTNOTE_WINDOW: f64 = 60.0;

/// Character rotation classification tolerance, in degrees.
pub const CHAR_ROTATION_TOLERANCE: f64 = 5.0;

/// Tolerance for matching a character/word center against a bbox edge
/// during label/footnote/table-interior membership tests.
pub const POINT_IN_BBOX_TOLERANCE: f64 = 0.1;

/// Case-insensitive whole-word amendment indicators. A match anywhere
/// in the combined header/footer text of any page is fatal.
pub const AMENDMENT_KEYWORDS: &[&str] = &["UTAH", "STATE", "AMENDED", "MODIFIED", "AMENDMENTS"];
