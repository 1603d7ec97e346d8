//! Repository trait for short URLs.

use crate::domain::entities::ShortUrl;
use crate::error::AppError;
use async_trait::async_trait;

/// Stores short URLs.
///
/// `domain_id` of `None` addresses short URLs without a domain of their own.
/// Lookups are exact: a short URL stored without a domain is not returned for
/// `Some(id)`. Falling back is up to the caller.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgShortUrlRepository`] - PostgreSQL
/// - [`crate::infrastructure::persistence::InMemoryShortUrlRepository`] - in memory
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShortUrlRepository: Send + Sync {
    /// Inserts a new short URL and returns its id.
    ///
    /// The short URL's domain, if any, must already carry a stored id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if `(domain, short_code)` is taken.
    /// Returns [`AppError::Internal`] on storage errors.
    async fn insert(&self, short_url: &ShortUrl) -> Result<i64, AppError>;

    /// Finds a short URL by code within exactly one domain scope.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn find_by_code(
        &self,
        short_code: &str,
        domain_id: Option<i64>,
    ) -> Result<Option<ShortUrl>, AppError>;

    /// Finds a previously imported short URL by its provenance.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn find_imported(
        &self,
        source: &str,
        original_short_code: &str,
        domain_id: Option<i64>,
    ) -> Result<Option<ShortUrl>, AppError>;

    /// Writes back the editable fields (long URL, validity window, max
    /// visits, tags) of a persisted short URL.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the short URL has no stored row.
    /// Returns [`AppError::Internal`] on storage errors.
    async fn update(&self, short_url: &ShortUrl) -> Result<(), AppError>;

    /// Atomically increments the visit counter and returns the new value.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no row has this id.
    /// Returns [`AppError::Internal`] on storage errors.
    async fn record_visit(&self, id: i64) -> Result<u64, AppError>;
}
