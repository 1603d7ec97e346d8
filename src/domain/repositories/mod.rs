//! Storage contracts for the domain layer.
//!
//! Implementations live in [`crate::infrastructure::persistence`]: one backed
//! by PostgreSQL, one in memory. Mocks are generated with `mockall` for unit
//! tests.
//!
//! - [`ShortUrlRepository`] - short URL rows, lookups and visit counting
//! - [`DomainRepository`] - authority to domain row

pub mod domain_repository;
pub mod short_url_repository;

pub use domain_repository::DomainRepository;
pub use short_url_repository::ShortUrlRepository;

#[cfg(test)]
pub use domain_repository::MockDomainRepository;
#[cfg(test)]
pub use short_url_repository::MockShortUrlRepository;
