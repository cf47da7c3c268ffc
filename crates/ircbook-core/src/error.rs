//! Fatal errors, non-fatal warnings, and the document-level parse report.
//!
//! Modeled on `pdfplumber_core::error`'s `PdfError`/`ExtractWarning` split:
//! a closed enum of fatal conditions that abort the run, and a separate
//! warning type accumulated into a report rather than printed as it occurs.

use std::collections::BTreeMap;
use std::fmt;

/// A fatal, page-tagged error. Every variant corresponds to one entry in
/// the error taxonomy: `RULE=<KIND> PDF_PAGE=<n> detail=<...> [stats={...}]`.
#[derive(Debug, Clone, PartialEq)]
pub enum FatalError {
    PdfInputMissing { detail: String },
    PdfHashNotAllowed { page: usize, detail: String },
    AmendmentScan { page: usize, detail: String },
    PageRangeInvalid { detail: String },

    CharDataMissing { page: usize, detail: String },
    FontMetadataMissing { page: usize, detail: String },
    HeaderFooterMissing { page: usize, detail: String },
    CharWidthMissing { page: usize, detail: String },
    BodyCharMissing { page: usize, detail: String },
    LineDataMissing { page: usize, detail: String },

    ColumnSplitMissing { page: usize, detail: String },
    ColumnSplitCompeting { page: usize, detail: String },
    ColumnSplitOffcenter { page: usize, detail: String },
    ColumnSplitClusterMissing { page: usize, detail: String },
    ColumnSplitOverlap { page: usize, detail: String },
    ColumnSplitCross { page: usize, detail: String },
    GutterLineAmbiguous { page: usize, detail: String },
    ColumnBodyMissing { page: usize, detail: String },
    ColumnBoundsMissing { page: usize, detail: String },

    TableRotationAmbiguous {
        page: usize,
        detail: String,
        stats: BTreeMap<String, String>,
    },
    TableContinuation { page: usize, detail: String },

    SectionDuplicate { page: usize, detail: String },
    SectionHeaderSkipped { page: usize, detail: String },
    SectionAppendViolation { page: usize, detail: String },
    SectionIntegrityViolation { page: usize, detail: String },

    RotationInvalid { page: usize, detail: String },
    PdfPageRange { page: usize, detail: String },
    MedianEmpty { page: usize, detail: String },
    PercentileEmpty { page: usize, detail: String },
    UnhandledException { page: usize, detail: String },
}

impl FatalError {
    /// The machine-readable `RULE=<KIND>` tag for this error.
    pub fn code(&self) -> &'static str {
        match self {
            FatalError::PdfInputMissing { .. } => "PDF_INPUT_MISSING",
            FatalError::PdfHashNotAllowed { .. } => "PDF_HASH_NOT_ALLOWED",
            FatalError::AmendmentScan { .. } => "AMENDMENT_SCAN",
            FatalError::PageRangeInvalid { .. } => "PAGE_RANGE_INVALID",
            FatalError::CharDataMissing { .. } => "CHAR_DATA_MISSING",
            FatalError::FontMetadataMissing { .. } => "FONT_METADATA_MISSING",
            FatalError::HeaderFooterMissing { .. } => "HEADER_FOOTER_MISSING",
            FatalError::CharWidthMissing { .. } => "CHAR_WIDTH_MISSING",
            FatalError::BodyCharMissing { .. } => "BODY_CHAR_MISSING",
            FatalError::LineDataMissing { .. } => "LINE_DATA_MISSING",
            FatalError::ColumnSplitMissing { .. } => "COLUMN_SPLIT_MISSING",
            FatalError::ColumnSplitCompeting { .. } => "COLUMN_SPLIT_COMPETING",
            FatalError::ColumnSplitOffcenter { .. } => "COLUMN_SPLIT_OFFCENTER",
            FatalError::ColumnSplitClusterMissing { .. } => "COLUMN_SPLIT_CLUSTER_MISSING",
            FatalError::ColumnSplitOverlap { .. } => "COLUMN_SPLIT_OVERLAP",
            FatalError::ColumnSplitCross { .. } => "COLUMN_SPLIT_CROSS",
            FatalError::GutterLineAmbiguous { .. } => "GUTTER_LINE_AMBIGUOUS",
            FatalError::ColumnBodyMissing { .. } => "COLUMN_BODY_MISSING",
            FatalError::ColumnBoundsMissing { .. } => "COLUMN_BOUNDS_MISSING",
            FatalError::TableRotationAmbiguous { .. } => "TABLE_ROTATION_AMBIGUOUS",
            FatalError::TableContinuation { .. } => "TABLE_CONTINUATION",
            FatalError::SectionDuplicate { .. } => "SECTION_DUPLICATE",
            FatalError::SectionHeaderSkipped { .. } => "SECTION_HEADER_SKIPPED",
            FatalError::SectionAppendViolation { .. } => "SECTION_APPEND_VIOLATION",
            FatalError::SectionIntegrityViolation { .. } => "SECTION_INTEGRITY_VIOLATION",
            FatalError::RotationInvalid { .. } => "ROTATION_INVALID",
            FatalError::PdfPageRange { .. } => "PDF_PAGE_RANGE",
            FatalError::MedianEmpty { .. } => "MEDIAN_EMPTY",
            FatalError::PercentileEmpty { .. } => "PERCENTILE_EMPTY",
            FatalError::UnhandledException { .. } => "UNHANDLED_EXCEPTION",
        }
    }

    /// The page this error is tagged with, if the variant carries one.
    /// Document-level variants (`PdfInputMissing`, `PageRangeInvalid`) have
    /// no page and return `None`.
    pub fn page(&self) -> Option<usize> {
        match self {
            FatalError::PdfInputMissing { .. } | FatalError::PageRangeInvalid { .. } => None,
            FatalError::PdfHashNotAllowed { page, .. }
            | FatalError::AmendmentScan { page, .. }
            | FatalError::CharDataMissing { page, .. }
            | FatalError::FontMetadataMissing { page, .. }
            | FatalError::HeaderFooterMissing { page, .. }
            | FatalError::CharWidthMissing { page, .. }
            | FatalError::BodyCharMissing { page, .. }
            | FatalError::LineDataMissing { page, .. }
            | FatalError::ColumnSplitMissing { page, .. }
            | FatalError::ColumnSplitCompeting { page, .. }
            | FatalError::ColumnSplitOffcenter { page, .. }
            | FatalError::ColumnSplitClusterMissing { page, .. }
            | FatalError::ColumnSplitOverlap { page, .. }
            | FatalError::ColumnSplitCross { page, .. }
            | FatalError::GutterLineAmbiguous { page, .. }
            | FatalError::ColumnBodyMissing { page, .. }
            | FatalError::ColumnBoundsMissing { page, .. }
            | FatalError::TableRotationAmbiguous { page, .. }
            | FatalError::TableContinuation { page, .. }
            | FatalError::SectionDuplicate { page, .. }
            | FatalError::SectionHeaderSkipped { page, .. }
            | FatalError::SectionAppendViolation { page, .. }
            | FatalError::SectionIntegrityViolation { page, .. }
            | FatalError::RotationInvalid { page, .. }
            | FatalError::PdfPageRange { page, .. }
            | FatalError::MedianEmpty { page, .. }
            | FatalError::PercentileEmpty { page, .. }
            | FatalError::UnhandledException { page, .. } => Some(*page),
        }
    }

    fn detail(&self) -> &str {
        match self {
            FatalError::PdfInputMissing { detail }
            | FatalError::PageRangeInvalid { detail }
            | FatalError::PdfHashNotAllowed { detail, .. }
            | FatalError::AmendmentScan { detail, .. }
            | FatalError::CharDataMissing { detail, .. }
            | FatalError::FontMetadataMissing { detail, .. }
            | FatalError::HeaderFooterMissing { detail, .. }
            | FatalError::CharWidthMissing { detail, .. }
            | FatalError::BodyCharMissing { detail, .. }
            | FatalError::LineDataMissing { detail, .. }
            | FatalError::ColumnSplitMissing { detail, .. }
            | FatalError::ColumnSplitCompeting { detail, .. }
            | FatalError::ColumnSplitOffcenter { detail, .. }
            | FatalError::ColumnSplitClusterMissing { detail, .. }
            | FatalError::ColumnSplitOverlap { detail, .. }
            | FatalError::ColumnSplitCross { detail, .. }
            | FatalError::GutterLineAmbiguous { detail, .. }
            | FatalError::ColumnBodyMissing { detail, .. }
            | FatalError::ColumnBoundsMissing { detail, .. }
            | FatalError::TableRotationAmbiguous { detail, .. }
            | FatalError::TableContinuation { detail, .. }
            | FatalError::SectionDuplicate { detail, .. }
            | FatalError::SectionHeaderSkipped { detail, .. }
            | FatalError::SectionAppendViolation { detail, .. }
            | FatalError::SectionIntegrityViolation { detail, .. }
            | FatalError::RotationInvalid { detail, .. }
            | FatalError::PdfPageRange { detail, .. }
            | FatalError::MedianEmpty { detail, .. }
            | FatalError::PercentileEmpty { detail, .. }
            | FatalError::UnhandledException { detail, .. } => detail,
        }
    }

    fn stats(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            FatalError::TableRotationAmbiguous { stats, .. } => Some(stats),
            _ => None,
        }
    }
}

impl fmt::Display for FatalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RULE={}", self.code())?;
        if let Some(page) = self.page() {
            write!(f, " PDF_PAGE={page}")?;
        }
        write!(f, " detail={}", self.detail())?;
        if let Some(stats) = self.stats() {
            write!(f, " stats={{")?;
            for (i, (k, v)) in stats.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{k}: {v}")?;
            }
            write!(f, "}}")?;
        }
        Ok(())
    }
}

impl std::error::Error for FatalError {}

/// Machine-readable code for a non-fatal warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WarningCode {
    TableRotationTieDefaulted,
    TableExtractionDegenerate,
    TableUnlabeled,
    TableTitleMissing,
    ContinuedFromMissingPrior,
    PageEndClamped,
    AllowlistAutoSeeded,
}

impl WarningCode {
    /// String tag matching the taxonomy used in `_parse_report.json`.
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningCode::TableRotationTieDefaulted => "TABLE_ROTATION_TIE_DEFAULTED",
            WarningCode::TableExtractionDegenerate => "TABLE_EXTRACTION_DEGENERATE",
            WarningCode::TableUnlabeled => "TABLE_UNLABELED",
            WarningCode::TableTitleMissing => "TABLE_TITLE_MISSING",
            WarningCode::ContinuedFromMissingPrior => "CONTINUED_FROM_MISSING_PRIOR",
            WarningCode::PageEndClamped => "PAGE_RANGE_CLAMPED",
            WarningCode::AllowlistAutoSeeded => "ALLOWLIST_AUTO_SEEDED",
        }
    }
}

impl fmt::Display for WarningCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-fatal warning recorded into the parse report.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Warning {
    pub code: WarningCode,
    /// Page the warning applies to (document-level warnings use `None`).
    pub page: Option<usize>,
    pub detail: String,
}

impl Warning {
    pub fn new(code: WarningCode, page: Option<usize>, detail: impl Into<String>) -> Self {
        Self {
            code,
            page,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code)?;
        if let Some(page) = self.page {
            write!(f, " PDF_PAGE={page}")?;
        }
        write!(f, " detail={}", self.detail)
    }
}

/// Document-level diagnostic accumulator: warnings collected across the
/// whole run, plus the counts and provenance facts needed to serialize
/// `_parse_report.json`.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParseReport {
    pub warnings: Vec<Warning>,
    pub sections_emitted: usize,
    pub tables_emitted: usize,
    pub source_sha256: String,
    pub allowlisted: bool,
    pub page_start: usize,
    pub page_end: usize,
    /// Present only when the run aborted on a fatal error.
    pub fatal: Option<String>,
}

impl ParseReport {
    pub fn push_warning(&mut self, warning: Warning) {
        self.warnings.push(warning);
    }
}
