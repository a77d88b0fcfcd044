//! Short code, custom slug and secret generation/validation.

use std::sync::LazyLock;

use base64::Engine as _;
use rand::Rng;
use regex::Regex;
use serde_json::json;

use crate::error::AppError;

/// Characters used for random short codes. Vowels and look-alikes are left
/// out so generated codes never spell words or confuse readers.
const SHORT_CODE_ALPHABET: &[u8] = b"0123456789bcdfghjkmnpqrstvwxyzBCDFGHJKLMNPQRSTVWXYZ";

const ALPHANUMERIC: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

pub const MIN_SHORT_CODE_LENGTH: usize = 4;
pub const DEFAULT_SHORT_CODE_LENGTH: usize = 5;
const MAX_CUSTOM_SLUG_LENGTH: usize = 255;

/// Random bytes behind an API key before base64 encoding.
const API_KEY_BYTES: usize = 32;

/// Paths served by the application itself, never usable as slugs.
const RESERVED_SLUGS: &[&str] = &["api", "health", "robots.txt", "favicon.ico"];

static CUSTOM_SLUG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\p{L}\p{N}._~-]+$").expect("valid slug regex"));

/// Generates a random short code of `length` characters (at least
/// [`MIN_SHORT_CODE_LENGTH`]).
pub fn generate_short_code(length: usize) -> String {
    random_string(SHORT_CODE_ALPHABET, length.max(MIN_SHORT_CODE_LENGTH))
}

/// Random `[A-Za-z0-9]` string, used for generated secrets.
pub fn random_alphanumeric(length: usize) -> String {
    random_string(ALPHANUMERIC, length)
}

fn random_string(alphabet: &[u8], length: usize) -> String {
    let mut rng = rand::rng();

    (0..length)
        .map(|_| alphabet[rng.random_range(0..alphabet.len())] as char)
        .collect()
}

/// Generates a raw API key: 32 bytes from the OS RNG, URL-safe base64
/// without padding (43 characters).
///
/// # Errors
///
/// Returns [`AppError::Internal`] if the system RNG is unavailable.
pub fn generate_api_key() -> Result<String, AppError> {
    let mut buffer = [0u8; API_KEY_BYTES];

    getrandom::fill(&mut buffer).map_err(|e| {
        AppError::internal(
            "Failed to generate random bytes",
            json!({ "reason": e.to_string() }),
        )
    })?;

    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buffer))
}

/// Validates a user-provided custom slug.
///
/// # Rules
///
/// - Not blank, at most 255 characters
/// - Letters, digits and `-`, `_`, `.`, `~` only (no `/`, no whitespace)
/// - Not one of the paths served by the application
///
/// # Errors
///
/// Returns [`AppError::Validation`] naming `custom_slug` as the invalid element.
pub fn validate_custom_slug(slug: &str) -> Result<(), AppError> {
    let invalid = |reason: &str| AppError::from_fields([("custom_slug", reason)]);

    if slug.trim().is_empty() {
        return Err(invalid("Custom slug cannot be empty"));
    }

    if slug.chars().count() > MAX_CUSTOM_SLUG_LENGTH {
        return Err(invalid("Custom slug cannot be longer than 255 characters"));
    }

    if !CUSTOM_SLUG_REGEX.is_match(slug) {
        return Err(invalid(
            "Custom slug can only contain letters, digits, '-', '_', '.' and '~'",
        ));
    }

    if RESERVED_SLUGS.iter().any(|r| r.eq_ignore_ascii_case(slug)) {
        return Err(invalid("This slug is reserved"));
    }

    Ok(())
}
