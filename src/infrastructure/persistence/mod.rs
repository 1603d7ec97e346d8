//! Repository implementations.
//!
//! - [`PgShortUrlRepository`], [`PgDomainRepository`] - PostgreSQL via SQLx
//! - [`InMemoryShortUrlRepository`], [`InMemoryDomainRepository`] - process
//!   memory, used without a database and in tests

pub mod memory;
pub mod pg_domain_repository;
pub mod pg_short_url_repository;

pub use memory::{InMemoryDomainRepository, InMemoryShortUrlRepository};
pub use pg_domain_repository::PgDomainRepository;
pub use pg_short_url_repository::PgShortUrlRepository;
