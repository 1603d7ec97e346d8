//! Business logic services for the application layer.

pub mod import_service;
pub mod short_url_service;

pub use import_service::{
    ConflictStrategy, ImportMode, ImportOptions, ImportOutcome, ImportResult, ImportService,
    ImportSummary, SkipReason,
};
pub use short_url_service::{ShortUrlService, ShortUrlSettings};
