//! Long URL validation.
//!
//! Locally created short URLs must point at an absolute HTTP(S) URL. Imported
//! short URLs skip this step because their source is trusted.

use url::Url;

/// Errors that can occur while validating a long URL.
#[derive(Debug, thiserror::Error)]
pub enum UrlNormalizationError {
    #[error("A URL was not provided")]
    Empty,

    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("URL has no host")]
    MissingHost,
}

/// Validates a long URL and returns its canonical form.
///
/// The host is lowercased and default ports are dropped. Path, query and
/// fragment are kept exactly as given since the redirect target must not
/// change meaning.
///
/// # Errors
///
/// Returns [`UrlNormalizationError`] for empty, malformed, hostless or
/// non-HTTP(S) input.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(
///     normalize_url("HTTPS://Example.COM:443/Path?q=1").unwrap(),
///     "https://example.com/Path?q=1"
/// );
/// ```
pub fn normalize_url(input: &str) -> Result<String, UrlNormalizationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlNormalizationError::Empty);
    }

    let url = Url::parse(trimmed).map_err(|e| UrlNormalizationError::InvalidFormat(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(UrlNormalizationError::UnsupportedProtocol),
    }

    // The url crate already lowercases hosts and strips default ports for
    // special schemes.
    if url.host_str().is_none_or(str::is_empty) {
        return Err(UrlNormalizationError::MissingHost);
    }

    Ok(url.to_string())
}
