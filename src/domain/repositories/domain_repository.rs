//! Repository trait for domains.

use crate::domain::entities::Domain;
use crate::error::AppError;
use async_trait::async_trait;

/// Stores the hosting authorities short URLs are scoped to.
///
/// Authorities are stored normalized (trimmed, lowercased) and are unique.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DomainRepository: Send + Sync {
    /// Finds a domain by its authority (e.g. `"s.example.com:8080"`).
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn find_by_authority(&self, authority: &str) -> Result<Option<Domain>, AppError>;

    /// Returns the stored domain for `authority`, creating it if needed.
    ///
    /// Safe to call concurrently for the same authority.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn find_or_create(&self, authority: &str) -> Result<Domain, AppError>;
}
