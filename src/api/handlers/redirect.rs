//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::extract_domain::extract_authority_from_headers;

/// Redirects a short code to its long URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Request Flow
///
/// 1. Extract the requested authority from the `Host` header; without one
///    only the default domain is searched
/// 2. Look the code up under that domain, falling back to the default domain
/// 3. Reject short URLs that are outside their validity window or out of visits
/// 4. Count the visit (failures are logged only)
/// 5. Return 302 Found
///
/// # Errors
///
/// Returns 404 Not Found if the short code doesn't exist.
/// Returns 410 Gone if it exists but is disabled.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let authority = extract_authority_from_headers(&headers).ok();

    let short_url = state
        .short_url_service
        .visit(&code, authority.as_deref())
        .await?;

    let location = HeaderValue::from_str(short_url.long_url()).map_err(|_| {
        AppError::internal(
            "Stored long URL is not a valid header value",
            json!({ "shortCode": code }),
        )
    })?;

    tracing::debug!(short_code = %code, authority = ?authority, "Redirecting");

    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}
