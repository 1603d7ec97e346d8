//! Core domain entities.
//!
//! - [`ShortUrl`] - the aggregate: a long URL reachable through a short code
//! - [`Domain`] - a hosting authority under which short codes are scoped
//! - [`ShortUrlMeta`] - optional creation inputs
//! - [`ShortUrlEdit`] - sparse patch applied to an existing short URL
//! - [`ImportedShortUrl`] - a record coming from another system

pub mod domain;
pub mod imported;
pub mod short_url;
pub mod short_url_edit;
pub mod short_url_meta;

pub use domain::Domain;
pub use imported::ImportedShortUrl;
pub use short_url::{ImportProvenance, Lifecycle, ShortUrl, ShortUrlParts};
pub use short_url_edit::{Patch, ShortUrlEdit};
pub use short_url_meta::ShortUrlMeta;
