//! Creation metadata for short URLs.

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::error::AppError;
use crate::utils::code_generator::{MIN_SHORT_CODE_LENGTH, validate_custom_slug};

/// Optional settings applied when a short URL is constructed.
///
/// `short_code_length` of `None` means "use the configured default".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShortUrlMeta {
    pub valid_since: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub max_visits: Option<u32>,
    pub custom_slug: Option<String>,
    pub domain: Option<String>,
    pub short_code_length: Option<usize>,
    pub tags: Vec<String>,
    /// Whether the long URL must be validated before construction.
    /// Imports turn this off.
    pub validate_url: bool,
}

impl ShortUrlMeta {
    /// Metadata with no constraints that still validates the long URL.
    pub fn empty() -> Self {
        Self {
            validate_url: true,
            ..Self::default()
        }
    }

    pub fn has_custom_slug(&self) -> bool {
        self.custom_slug.is_some()
    }

    /// Checks cross-field rules that the entity itself does not enforce.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] when `valid_since` is after
    /// `valid_until`, `max_visits` is zero, the requested code length is too
    /// short, or the custom slug is not acceptable.
    pub fn validate(&self) -> Result<(), AppError> {
        if let (Some(since), Some(until)) = (self.valid_since, self.valid_until)
            && since > until
        {
            return Err(AppError::bad_request(
                "validSince must not be later than validUntil",
                json!({ "invalidElements": ["validSince", "validUntil"] }),
            ));
        }

        if self.max_visits == Some(0) {
            return Err(AppError::bad_request(
                "maxVisits must be at least 1",
                json!({ "invalidElements": ["maxVisits"] }),
            ));
        }

        if let Some(length) = self.short_code_length
            && length < MIN_SHORT_CODE_LENGTH
        {
            return Err(AppError::bad_request(
                "shortCodeLength is too small",
                json!({ "invalidElements": ["shortCodeLength"], "min": MIN_SHORT_CODE_LENGTH }),
            ));
        }

        if let Some(slug) = &self.custom_slug {
            validate_custom_slug(slug)?;
        }

        Ok(())
    }
}
