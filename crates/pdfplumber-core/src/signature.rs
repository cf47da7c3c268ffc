//! PDF digital signature information types.
//!
//! Provides [`SignatureInfo`] for extracting metadata from PDF signature
//! fields. This is metadata extraction only — not signature verification.

/// Digital signature metadata extracted from a PDF signature field.
///
/// Represents the metadata from a `/FT /Sig` form field and its
/// signature value dictionary (`/V`). When `is_signed` is `false`,
/// the field exists but has no signature value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SignatureInfo {
    /// Signer name from the `/Name` entry in the signature dictionary.
    pub signer_name: Option<String>,
    /// Signing date from the `/M` entry (PDF date format).
    pub sign_date: Option<String>,
    /// Reason for signing from the `/Reason` entry.
    pub reason: Option<String>,
    /// Location of signing from the `/Location` entry.
    pub location: Option<String>,
    /// Contact information from the `/ContactInfo` entry.
    pub contact_info: Option<String>,
    /// Whether this signature field has been signed (has a `/V` value).
    pub is_signed: bool,
}
