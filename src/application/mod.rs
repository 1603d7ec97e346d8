//! Application layer services.
//!
//! Services coordinate the domain rules with the repositories and are what
//! HTTP handlers and the admin CLI call into.
//!
//! - [`services::short_url_service::ShortUrlService`] - create, resolve, edit, render
//! - [`services::import_service::ImportService`] - import and merge external records

pub mod services;
