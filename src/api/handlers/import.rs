//! Handler for importing short URLs from other systems.

use axum::{Json, extract::State};
use validator::Validate;

use crate::api::dto::import::{ImportRequest, ImportResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Imports a batch of short URLs.
///
/// # Endpoint
///
/// `POST /rest/short-urls/import`
///
/// # Request Body
///
/// ```json
/// {
///   "importShortCodes": true,
///   "mode": "merge",             // or "skip" (default)
///   "onConflict": "regenerate",  // or "skip"
///   "shortUrls": [
///     {
///       "source": "bitly",
///       "longUrl": "https://example.com",
///       "shortCode": "abc",
///       "domain": "s.example.com",
///       "createdAt": "2020-01-01T00:00:00Z",
///       "tags": ["old"]
///     }
///   ]
/// }
/// ```
///
/// Records are processed independently; a failed record is reported in
/// `items` and does not fail the request.
///
/// # Errors
///
/// Returns 400 Bad Request if the batch is empty or too large.
pub async fn import_handler(
    State(state): State<AppState>,
    Json(payload): Json<ImportRequest>,
) -> Result<Json<ImportResponse>, AppError> {
    payload.validate()?;

    let options = payload.options();
    let summary = state
        .import_service
        .import_many(payload.short_urls, options)
        .await;

    Ok(Json(ImportResponse::from_summary(summary, |short_url| {
        state.short_url_service.render(short_url)
    })))
}
