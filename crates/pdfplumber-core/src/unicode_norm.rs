//! Unicode normalization for extracted text.
//!
//! Provides [`UnicodeNorm`] enum for selecting normalization form and
//! [`normalize_chars`] for applying normalization to character text.

use unicode_normalization::UnicodeNormalization;

use crate::text::Char;

/// Unicode normalization form to apply to extracted text.
///
/// Different PDF generators may produce different Unicode representations
/// for the same visual text (e.g., composed vs. decomposed accented chars).
/// Normalizing ensures consistent text output regardless of the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnicodeNorm {
    /// No normalization (default).
    #[default]
    None,
    /// Canonical Decomposition, followed by Canonical Composition (NFC).
    Nfc,
    /// Canonical Decomposition (NFD).
    Nfd,
    /// Compatibility Decomposition, followed by Canonical Composition (NFKC).
    Nfkc,
    /// Compatibility Decomposition (NFKD).
    Nfkd,
}

impl UnicodeNorm {
    /// Apply this normalization form to the given string.
    ///
    /// Returns the input unchanged if normalization is `None`.
    pub fn normalize(&self, text: &str) -> String {
        match self {
            UnicodeNorm::None => text.to_string(),
            UnicodeNorm::Nfc => text.nfc().collect(),
            UnicodeNorm::Nfd => text.nfd().collect(),
            UnicodeNorm::Nfkc => text.nfkc().collect(),
            UnicodeNorm::Nfkd => text.nfkd().collect(),
        }
    }
}

/// Apply Unicode normalization to the text of each character.
///
/// Returns a new `Vec<Char>` with normalized text values. All other
/// fields (bbox, fontname, size, etc.) are preserved unchanged.
/// If normalization is `None`, the chars are returned as clones.
pub fn normalize_chars(chars: &[Char], norm: &UnicodeNorm) -> Vec<Char> {
    if *norm == UnicodeNorm::None {
        return chars.to_vec();
    }

    chars
        .iter()
        .map(|ch| {
            let mut normalized = ch.clone();
            normalized.text = norm.normalize(&ch.text);
            normalized
        })
        .collect()
}
