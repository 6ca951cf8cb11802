//! Canonical keys for field names and descriptions.
//!
//! Diacritics are stripped after canonical decomposition, text is lowercased
//! and every run of non-alphanumeric characters becomes one separator.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Normalizes free text: `"Bank Número"` and `"BANK  NUMERO"` both become `"bank numero"`.
pub fn normalize(text: &str) -> String {
    fold(text, Some(' '))
}

/// Normalizes a description. Same as [`normalize`].
pub fn normalize_description(text: &str) -> String {
    normalize(text)
}

/// Normalizes an identifier with separators removed: `"IBAN_RULE"` becomes `"ibanrule"`.
pub fn normalize_field_name(text: &str) -> String {
    fold(text, None)
}

fn fold(text: &str, separator: Option<char>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_separator = false;
    for ch in text.nfd().filter(|c| !is_combining_mark(*c)) {
        if ch.is_alphanumeric() {
            if pending_separator
                && !out.is_empty()
                && let Some(sep) = separator
            {
                out.push(sep);
            }
            pending_separator = false;
            out.extend(ch.to_lowercase());
        } else {
            pending_separator = true;
        }
    }
    out
}
