//! REST API route configuration.

use crate::api::handlers::{
    create_short_url_handler, edit_short_url_handler, get_short_url_handler, import_handler,
    shorten_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Short URL management routes, nested under `/rest`.
///
/// # Endpoints
///
/// - `POST  /short-urls`          - Create a short URL
/// - `GET   /short-urls/shorten`  - Create a short URL from `?longUrl=`
/// - `POST  /short-urls/import`   - Import short URLs from another system
/// - `GET   /short-urls/{code}`   - Fetch a short URL (`?domain=` optional)
/// - `PATCH /short-urls/{code}`   - Partially update a short URL
pub fn rest_routes() -> Router<AppState> {
    Router::new()
        .route("/short-urls", post(create_short_url_handler))
        .route("/short-urls/shorten", get(shorten_handler))
        .route("/short-urls/import", post(import_handler))
        .route(
            "/short-urls/{code}",
            get(get_short_url_handler).patch(edit_short_url_handler),
        )
}
