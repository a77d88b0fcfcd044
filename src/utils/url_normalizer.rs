//! Long URL validation and normalization.

use url::Url;

/// Errors that can occur while normalizing a long URL.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum UrlNormalizationError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,
}

/// Normalizes a long URL before it is stored.
///
/// - Surrounding whitespace is trimmed
/// - Only `http` and `https` are accepted
/// - Scheme and host are lowercased by the parser, default ports dropped
/// - Path, query and fragment are kept untouched
///
/// # Errors
///
/// Returns [`UrlNormalizationError::InvalidFormat`] for malformed URLs.
/// Returns [`UrlNormalizationError::UnsupportedProtocol`] for non-HTTP(S) schemes.
pub fn normalize_url(input: &str) -> Result<String, UrlNormalizationError> {
    let url = Url::parse(input.trim())
        .map_err(|e| UrlNormalizationError::InvalidFormat(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(UrlNormalizationError::UnsupportedProtocol),
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(UrlNormalizationError::InvalidFormat(
            "URL has no host".to_string(),
        ));
    }

    Ok(url.to_string())
}
