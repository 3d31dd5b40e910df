//! Internal helpers for input validation.
//!
//! These utilities are **not** part of the public API. Every create and patch
//! path runs its fields through them before touching the database.

use unicode_normalization::UnicodeNormalization;

use crate::{EngineError, ResultEngine};

pub(crate) const NAME_MAX_LEN: usize = 40;
pub(crate) const NOTE_MAX_LEN: usize = 128;

/// Trim `value` and check its length (in chars) against `min..=max`.
pub(crate) fn validate_len(value: &str, field: &str, min: usize, max: usize) -> ResultEngine<String> {
    let trimmed = value.trim();
    let len = trimmed.chars().count();
    if len < min || len > max {
        let message = if min == 0 {
            format!("{field} must be at most {max} characters")
        } else {
            format!("{field} must be between {min} and {max} characters")
        };
        return Err(EngineError::Validation(message));
    }
    Ok(trimmed.to_string())
}

/// Like [`validate_len`] with `min = 0`, mapping blank input to `None`.
pub(crate) fn validate_optional_text(
    value: Option<&str>,
    field: &str,
    max: usize,
) -> ResultEngine<Option<String>> {
    value
        .map(|v| validate_len(v, field, 0, max))
        .transpose()
        .map(|v| v.filter(|s| !s.is_empty()))
}

/// Accepts `#RGB` and `#RRGGBB` (hex digits in either case).
pub(crate) fn validate_hex_color(value: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    let valid = trimmed
        .strip_prefix('#')
        .is_some_and(|hex| matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()));
    if !valid {
        return Err(EngineError::Validation(
            "Color must be in the HEX format (#XXX or #XXXXXX)".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

/// Minimal structural email check: one `@`, non-empty local part, a dotted
/// domain and no whitespace. Returns the lowercased address.
pub(crate) fn validate_email(value: &str) -> ResultEngine<String> {
    let invalid = || EngineError::Validation(format!("invalid email: '{}'", value.trim()));
    let email = value.trim().to_lowercase();
    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let labels_ok = domain.split('.').all(|label| !label.is_empty());
    if !domain.contains('.') || !labels_ok {
        return Err(invalid());
    }
    Ok(email)
}

/// Search key stored next to every searchable column: NFKC, then full
/// Unicode lowercase. Filters fold their needle the same way.
pub(crate) fn fold_text(value: &str) -> String {
    value.nfkc().flat_map(char::to_lowercase).collect()
}

pub(crate) fn validate_password(value: &str) -> ResultEngine<&str> {
    if value.chars().count() < 8 {
        return Err(EngineError::Validation(
            "password must be at least 8 characters".to_string(),
        ));
    }
    Ok(value)
}
