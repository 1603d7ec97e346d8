//! Handlers for the short URL REST endpoints.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use validator::Validate;

use crate::api::dto::short_url::{
    CreateShortUrlRequest, DomainQuery, EditShortUrlRequest, ShortUrlResponse, ShortenQuery,
};
use crate::domain::entities::ShortUrl;
use crate::error::AppError;
use crate::state::AppState;

fn respond(state: &AppState, short_url: &ShortUrl) -> Json<ShortUrlResponse> {
    Json(ShortUrlResponse::new(
        short_url,
        state.short_url_service.render(short_url),
    ))
}

/// Creates a short URL.
///
/// # Endpoint
///
/// `POST /rest/short-urls`
///
/// # Request Body
///
/// ```json
/// {
///   "longUrl": "https://example.com/page",
///   "customSlug": "promo",            // optional
///   "domain": "s.example.com",        // optional
///   "validSince": "2024-01-01T00:00:00Z",
///   "validUntil": null,
///   "maxVisits": 100,
///   "shortCodeLength": 6,
///   "tags": ["campaign"]
/// }
/// ```
///
/// # Errors
///
/// - 400 for invalid input
/// - 409 if the custom slug is taken in that domain
/// - 503 if no free short code could be found
pub async fn create_short_url_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateShortUrlRequest>,
) -> Result<Json<ShortUrlResponse>, AppError> {
    payload.validate()?;

    let (long_url, meta) = payload.into_parts();
    let short_url = state.short_url_service.create(&long_url, meta).await?;

    Ok(respond(&state, &short_url))
}

/// Creates a short URL from a query string alone.
///
/// # Endpoint
///
/// `GET /rest/short-urls/shorten?longUrl=https://example.com`
///
/// # Errors
///
/// Returns 400 "A URL was not provided" without `longUrl`.
pub async fn shorten_handler(
    State(state): State<AppState>,
    Query(query): Query<ShortenQuery>,
) -> Result<Json<ShortUrlResponse>, AppError> {
    let short_url = state
        .short_url_service
        .shorten(query.long_url.as_deref())
        .await?;

    Ok(respond(&state, &short_url))
}

/// Returns a short URL, enabled or not.
///
/// # Endpoint
///
/// `GET /rest/short-urls/{code}?domain=s.example.com`
///
/// # Errors
///
/// Returns 404 if the short code doesn't exist.
pub async fn get_short_url_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Query(query): Query<DomainQuery>,
) -> Result<Json<ShortUrlResponse>, AppError> {
    let short_url = state
        .short_url_service
        .resolve(&code, query.domain.as_deref())
        .await?;

    Ok(respond(&state, &short_url))
}

/// Partially updates a short URL.
///
/// # Endpoint
///
/// `PATCH /rest/short-urls/{code}?domain=s.example.com`
///
/// Absent fields are unchanged, `null` clears `validSince`, `validUntil`
/// or `maxVisits`.
///
/// # Errors
///
/// - 400 for invalid input
/// - 404 if the short code doesn't exist
pub async fn edit_short_url_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Query(query): Query<DomainQuery>,
    Json(payload): Json<EditShortUrlRequest>,
) -> Result<Json<ShortUrlResponse>, AppError> {
    payload.validate()?;

    let short_url = state
        .short_url_service
        .edit(&code, query.domain.as_deref(), payload.into())
        .await?;

    Ok(respond(&state, &short_url))
}
