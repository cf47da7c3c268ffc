//! Integrity Enforcer (§4.7): after all sections are written, re-parse each
//! section's body and confirm it carries no recognizable heading for a
//! *different* accepted id — a sign the section/column pipeline leaked
//! content across a boundary it should have split on.

use std::collections::HashSet;

use crate::error::FatalError;
use crate::sections::{is_section_heading_text, recognize_heading, FlushedSection};

/// Check every flushed section's body lines against the full set of
/// accepted ids. Fails `SECTION_INTEGRITY_VIOLATION` on the first foreign
/// canonical heading found.
pub fn enforce_integrity(
    sections: &[FlushedSection],
    accepted_ids: &HashSet<String>,
) -> Result<(), FatalError> {
    for section in sections {
        let own_id = section.id.to_uppercase();
        for (i, line) in section.lines.iter().enumerate() {
            if !is_section_heading_text(line) {
                continue;
            }
            let next = section.lines.get(i + 1).map(|s| s.as_str());
            if let Some(heading) = recognize_heading(line, next) {
                let found = heading.id.0.to_uppercase();
                if found != own_id && accepted_ids.contains(&found) {
                    return Err(FatalError::SectionIntegrityViolation {
                        page: section.start_page,
                        detail: format!(
                            "section {} body line {:?} matches heading shape of accepted id {found}",
                            section.id, line
                        ),
                    });
                }
            }
        }
    }
    Ok(())
}
