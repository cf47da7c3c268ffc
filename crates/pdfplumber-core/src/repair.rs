//! PDF repair types for best-effort fixing of common PDF issues.
//!
//! Provides [`RepairOptions`] for configuring which repairs to attempt
//! and [`RepairResult`] for reporting what was fixed.

use std::fmt;

/// Options for controlling which PDF repairs to attempt.
///
/// Each field enables a specific repair strategy. All default to `true`.
#[derive(Debug, Clone)]
pub struct RepairOptions {
    /// Rebuild the cross-reference table by scanning for `obj`/`endobj` markers.
    pub rebuild_xref: bool,
    /// Recalculate stream `/Length` entries from actual stream data.
    pub fix_stream_lengths: bool,
    /// Remove or skip unresolvable object references with warnings.
    pub remove_broken_objects: bool,
}

impl Default for RepairOptions {
    fn default() -> Self {
        Self {
            rebuild_xref: true,
            fix_stream_lengths: true,
            remove_broken_objects: true,
        }
    }
}

impl fmt::Display for RepairOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RepairOptions(rebuild_xref={}, fix_stream_lengths={}, remove_broken_objects={})",
            self.rebuild_xref, self.fix_stream_lengths, self.remove_broken_objects
        )
    }
}

/// Result of a PDF repair operation.
///
/// Contains the log of repairs that were applied and whether the
/// document was modified.
#[derive(Debug, Clone, Default)]
pub struct RepairResult {
    /// Log of repairs applied, one entry per fix.
    pub log: Vec<String>,
}

impl RepairResult {
    /// Create a new empty repair result.
    pub fn new() -> Self {
        Self { log: Vec::new() }
    }

    /// Returns `true` if any repairs were applied.
    pub fn has_repairs(&self) -> bool {
        !self.log.is_empty()
    }
}
