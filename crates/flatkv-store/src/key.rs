//! Key and value validation.
//!
//! A key is any (possibly empty) string made only of ASCII letters, digits,
//! `_` and `-`. The `:` separator can therefore never appear in a key, which
//! is what makes the first `:` on a persisted line unambiguous.

use crate::error::{StoreError, StoreResult};

/// Separator between key and value on a persisted line.
pub const SEPARATOR: char = ':';

/// Returns `true` if `c` may appear in a key.
#[inline]
pub fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Returns `true` if every character of `key` is a valid key character.
///
/// The match is anchored on both ends, so the empty string is a valid key.
pub fn is_valid_key(key: &str) -> bool {
    key.chars().all(is_key_char)
}

/// Check `key` against the key format, returning [`StoreError::InvalidKey`]
/// on failure.
pub fn validate_key(key: &str) -> StoreResult<()> {
    if is_valid_key(key) {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

/// Values may hold anything except a line terminator.
pub fn validate_value(key: &str, value: &str) -> StoreResult<()> {
    if value.contains('\n') {
        Err(StoreError::InvalidValue(key.to_string()))
    } else {
        Ok(())
    }
}
