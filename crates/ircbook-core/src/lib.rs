//! Page-layout analysis pipeline that extracts a structured, machine-readable
//! representation of the 2021 International Residential Code from PDF
//! geometry — characters, words, and ruling primitives — rather than from
//! any logical PDF structure tree.
//!
//! The pipeline runs strictly page-by-page through [`document::Run`]: raw
//! primitive intake and provenance guarding ([`primitives`]), ruled-table
//! detection ([`rulings`]), two-column line reconstruction
//! ([`lines`]), section recognition ([`sections`]), table label binding and
//! multi-page continuation ([`tables`]), and a final integrity pass
//! ([`integrity`]) before [`output`] serializes everything to disk.

pub mod constants;
pub mod debug;
pub mod document;
pub mod error;
pub mod geometry;
pub mod integrity;
pub mod lines;
pub mod output;
pub mod primitives;
pub mod rulings;
pub mod sections;
pub mod tables;

pub use document::{run, Run, RunConfig};
pub use error::{FatalError, ParseReport, Warning, WarningCode};
