//! Short code generation and validation utilities.
//!
//! Provides random code generation and validation for custom user-provided
//! slugs.

use crate::error::AppError;
use rand::Rng;
use serde_json::json;

/// Characters used for generated codes.
///
/// Vowels are left out so generated codes do not spell words, and `l` is
/// dropped because it is easily confused with `1`.
pub const ALPHABET: &[u8] = b"0123456789bcdfghjkmnpqrstvwxyzBCDFGHJKMNPQRSTVWXYZ";

/// Default length for generated codes.
pub const DEFAULT_SHORT_CODE_LENGTH: usize = 5;

/// Smallest length accepted for generated codes.
pub const MIN_SHORT_CODE_LENGTH: usize = 4;

/// Longest custom slug accepted on creation.
const MAX_CUSTOM_SLUG_LENGTH: usize = 100;

/// Slugs that would shadow service routes.
const RESERVED_SLUGS: &[&str] = &["api", "health", "rest"];

/// Generates a random short code of exactly `length` characters from [`ALPHABET`].
///
/// Uses the thread-local CSPRNG seeded from the operating system, so
/// consecutive codes are not predictable from one another.
///
/// # Panics
///
/// Panics if the operating system random source cannot seed the generator.
/// This is treated as a fatal configuration problem and is never retried.
///
/// # Examples
///
/// ```ignore
/// let code = generate_short_code(5);
/// assert_eq!(code.len(), 5);
/// ```
pub fn generate_short_code(length: usize) -> String {
    let mut rng = rand::rng();

    (0..length)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Validates a user-provided custom slug.
///
/// # Rules
///
/// - Length: 1-100 characters
/// - No whitespace and none of `/`, `\\`, `?`, `#`, `%`
/// - Cannot be `.` or `..`
/// - Cannot be a reserved route name
///
/// Any other character is accepted; the renderer percent-encodes it.
///
/// # Errors
///
/// Returns [`AppError::Validation`] if any rule is violated.
pub fn validate_custom_slug(slug: &str) -> Result<(), AppError> {
    let length = slug.chars().count();
    if length == 0 || length > MAX_CUSTOM_SLUG_LENGTH {
        return Err(AppError::bad_request(
            "Custom slug must be 1-100 characters",
            json!({ "provided_length": length }),
        ));
    }

    if slug
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '/' | '\\' | '?' | '#' | '%'))
    {
        return Err(AppError::bad_request(
            "Custom slug cannot contain whitespace or any of / \\ ? # %",
            json!({ "custom_slug": slug }),
        ));
    }

    if is_dot_segment(slug) {
        return Err(AppError::bad_request(
            "Custom slug cannot be . or ..",
            json!({ "custom_slug": slug }),
        ));
    }

    if RESERVED_SLUGS.contains(&slug.to_ascii_lowercase().as_str()) {
        return Err(AppError::bad_request(
            "This slug is reserved",
            json!({ "custom_slug": slug }),
        ));
    }

    Ok(())
}

/// Validates a short code carried by an imported record.
///
/// Imports are trusted beyond this: the code only has to be non-blank and
/// usable as a single path segment.
///
/// # Errors
///
/// Returns [`AppError::Validation`] for a blank code, `.`, `..` or a code
/// containing `/`.
pub fn validate_imported_short_code(short_code: &str) -> Result<(), AppError> {
    if short_code.trim().is_empty() {
        return Err(AppError::bad_request(
            "Imported short code must not be blank",
            json!({ "invalidElements": ["shortCode"] }),
        ));
    }

    if is_dot_segment(short_code) || short_code.contains('/') {
        return Err(AppError::bad_request(
            "Imported short code is not a valid path segment",
            json!({ "shortCode": short_code, "invalidElements": ["shortCode"] }),
        ));
    }

    Ok(())
}

/// URL parsers collapse these, so they can never be reached as a code.
fn is_dot_segment(code: &str) -> bool {
    matches!(code, "." | "..")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_exact_length() {
        for length in [1, 4, 5, 8, 32] {
            assert_eq!(generate_short_code(length).chars().count(), length);
        }
    }

    #[test]
    fn test_generate_uses_alphabet_only() {
        let code = generate_short_code(200);
        assert!(code.bytes().all(|b| ALPHABET.contains(&b)));
    }

    #[test]
    fn test_alphabet_excludes_lookalikes() {
        for c in [b'a', b'e', b'i', b'o', b'u', b'l', b'A', b'E', b'I', b'O', b'U', b'L'] {
            assert!(!ALPHABET.contains(&c), "{} should be excluded", c as char);
        }
    }

    #[test]
    fn test_generate_is_not_guessable_in_sequence() {
        let mut codes = HashSet::new();

        for _ in 0..10_000 {
            codes.insert(generate_short_code(5));
        }

        assert!(codes.len() >= 9_990, "only {} distinct codes", codes.len());
    }

    #[test]
    fn test_validate_simple_slug() {
        assert!(validate_custom_slug("promo").is_ok());
        assert!(validate_custom_slug("summer-sale_2024").is_ok());
    }

    #[test]
    fn test_validate_unicode_slug() {
        assert!(validate_custom_slug("café").is_ok());
    }

    #[test]
    fn test_validate_empty_slug() {
        let err = validate_custom_slug("").unwrap_err();
        assert!(err.to_string().contains("1-100 characters"));
    }

    #[test]
    fn test_validate_too_long_slug() {
        let slug = "a".repeat(101);
        assert!(validate_custom_slug(&slug).is_err());
    }

    #[test]
    fn test_validate_rejects_path_characters() {
        for slug in ["a/b", "a\\b", "a?b", "a#b", "a%20b", "a b"] {
            assert!(validate_custom_slug(slug).is_err(), "{slug} should be rejected");
        }
    }

    #[test]
    fn test_validate_reserved_slugs() {
        for &reserved in RESERVED_SLUGS {
            assert!(validate_custom_slug(reserved).is_err());
        }
        assert!(validate_custom_slug("HEALTH").is_err());
    }

    #[test]
    fn test_validate_rejects_dot_segments() {
        assert!(validate_custom_slug(".").is_err());
        assert!(validate_custom_slug("..").is_err());
        assert!(validate_custom_slug("...").is_ok());
        assert!(validate_custom_slug("v1.2").is_ok());
    }

    #[test]
    fn test_validate_imported_short_code() {
        assert!(validate_imported_short_code("abc").is_ok());
        assert!(validate_imported_short_code("a\\b").is_ok());
        assert!(validate_imported_short_code("caf%C3%A9").is_ok());

        for code in ["", "   ", ".", "..", "a/b"] {
            assert!(
                validate_imported_short_code(code).is_err(),
                "{code:?} should be rejected"
            );
        }
    }
}
