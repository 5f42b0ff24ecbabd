//! Common validation utilities.

use validator::ValidationError;

/// Characters used for registration and invitation codes.
///
/// Excludes the easily confused 0, O, 1 and I.
pub const ACCESS_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Shortest accepted access code.
pub const MIN_ACCESS_CODE_LENGTH: usize = 6;

/// Longest accepted access code.
pub const MAX_ACCESS_CODE_LENGTH: usize = 8;

/// Normalises a user-entered access code: trims whitespace, drops
/// separators and uppercases.
pub fn normalize_access_code(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| !matches!(c, '-' | ' '))
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Returns true if `code` is an already-normalised access code.
pub fn is_valid_access_code(code: &str) -> bool {
    (MIN_ACCESS_CODE_LENGTH..=MAX_ACCESS_CODE_LENGTH).contains(&code.len())
        && code.bytes().all(|b| ACCESS_CODE_ALPHABET.contains(&b))
}

/// Validator hook for access code fields. Accepts any input that
/// normalises to a valid code.
pub fn validate_access_code(code: &str) -> Result<(), ValidationError> {
    if is_valid_access_code(&normalize_access_code(code)) {
        Ok(())
    } else {
        let mut err = ValidationError::new("access_code_format");
        err.message = Some(
            format!(
                "Code must be {}-{} characters using letters and digits (no 0, O, 1 or I)",
                MIN_ACCESS_CODE_LENGTH, MAX_ACCESS_CODE_LENGTH
            )
            .into(),
        );
        Err(err)
    }
}

/// Validator hook rejecting strings that are empty after trimming.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Value must not be blank".into());
        Err(err)
    } else {
        Ok(())
    }
}
