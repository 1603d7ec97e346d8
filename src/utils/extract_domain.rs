//! Hosting authority extraction from HTTP request headers.

use crate::AppError;
use axum::http::{HeaderMap, header};

/// Extracts the requested authority (`host[:port]`) from the `Host` header.
///
/// The value is lowercased; the port is kept because two authorities that
/// differ only by port are distinct domains.
///
/// # Errors
///
/// Returns [`AppError::Validation`] if the header is missing, empty or not
/// valid UTF-8.
///
/// # Examples
///
/// ```ignore
/// let mut headers = HeaderMap::new();
/// headers.insert(header::HOST, "S.Example.com:8080".parse().unwrap());
///
/// assert_eq!(extract_authority_from_headers(&headers).unwrap(), "s.example.com:8080");
/// ```
pub fn extract_authority_from_headers(headers: &HeaderMap) -> Result<String, AppError> {
    let host = headers
        .get(header::HOST)
        .ok_or_else(|| AppError::bad_request("Missing Host header", serde_json::json!({})))?
        .to_str()
        .map_err(|_| AppError::bad_request("Invalid Host header", serde_json::json!({})))?
        .trim();

    if host.is_empty() {
        return Err(AppError::bad_request(
            "Invalid Host header",
            serde_json::json!({}),
        ));
    }

    Ok(host.to_ascii_lowercase())
}
