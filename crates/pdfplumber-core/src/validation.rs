//! PDF validation types for detecting specification violations.
//!
//! Provides [`ValidationIssue`] for reporting detected issues and
//! [`Severity`] for classifying their impact on extraction.

use std::fmt;

/// Severity of a validation issue.
///
/// Indicates whether a PDF specification violation is likely to cause
/// extraction failures or is merely a non-conformance that still allows
/// best-effort extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Severity {
    /// Specification violation likely to cause extraction failure.
    Error,
    /// Non-conformance but data is likely still extractable.
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A validation issue found in a PDF document.
///
/// Describes a specific PDF specification violation or non-conformance,
/// including its severity, an identifying code, a human-readable message,
/// and an optional location within the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Severity of the issue.
    pub severity: Severity,
    /// Machine-readable issue code (e.g., "MISSING_TYPE", "BROKEN_REF").
    pub code: String,
    /// Human-readable description of the issue.
    pub message: String,
    /// Optional location within the PDF (e.g., "page 3", "object 5 0").
    pub location: Option<String>,
}

impl ValidationIssue {
    /// Create a new validation issue.
    pub fn new(severity: Severity, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: code.into(),
            message: message.into(),
            location: None,
        }
    }

    /// Create a new validation issue with a location.
    pub fn with_location(
        severity: Severity,
        code: impl Into<String>,
        message: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            code: code.into(),
            message: message.into(),
            location: Some(location.into()),
        }
    }

    /// Returns `true` if the issue is an error.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Returns `true` if the issue is a warning.
    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.code, self.message)?;
        if let Some(ref loc) = self.location {
            write!(f, " (at {loc})")?;
        }
        Ok(())
    }
}
