//! DTOs for the short URL endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use validator::Validate;

use crate::domain::entities::{ShortUrl, ShortUrlEdit, ShortUrlMeta};

/// Request body for `POST /rest/short-urls`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateShortUrlRequest {
    #[validate(length(min = 1, message = "A URL was not provided"))]
    pub long_url: String,

    pub valid_since: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,

    #[validate(range(min = 1))]
    pub max_visits: Option<u32>,

    pub custom_slug: Option<String>,

    /// Authority the short URL is scoped to; absent means the default domain.
    pub domain: Option<String>,

    #[validate(range(min = 4))]
    pub short_code_length: Option<usize>,

    #[serde(default)]
    pub tags: Vec<String>,
}

impl CreateShortUrlRequest {
    /// Splits the request into the long URL and creation metadata.
    pub fn into_parts(self) -> (String, ShortUrlMeta) {
        let meta = ShortUrlMeta {
            valid_since: self.valid_since,
            valid_until: self.valid_until,
            max_visits: self.max_visits,
            custom_slug: self.custom_slug,
            domain: self.domain,
            short_code_length: self.short_code_length,
            tags: self.tags,
            validate_url: true,
        };

        (self.long_url, meta)
    }
}

/// Request body for `PATCH /rest/short-urls/{code}`.
///
/// Absent fields are left unchanged; `null` clears a nullable field.
#[serde_as]
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EditShortUrlRequest {
    #[validate(length(min = 1, message = "A URL was not provided"))]
    pub long_url: Option<String>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    pub valid_since: Option<Option<DateTime<Utc>>>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    pub valid_until: Option<Option<DateTime<Utc>>>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    pub max_visits: Option<Option<u32>>,
}

impl From<EditShortUrlRequest> for ShortUrlEdit {
    fn from(request: EditShortUrlRequest) -> Self {
        ShortUrlEdit {
            long_url: request.long_url,
            valid_since: request.valid_since.into(),
            valid_until: request.valid_until.into(),
            max_visits: request.max_visits.into(),
        }
    }
}

/// Query of `GET /rest/short-urls/shorten`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortenQuery {
    pub long_url: Option<String>,
}

/// Optional `?domain=` selecting which domain a short code is looked up in.
#[derive(Debug, Default, Deserialize)]
pub struct DomainQuery {
    pub domain: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortUrlMetaResponse {
    pub valid_since: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub max_visits: Option<u32>,
}

/// A short URL as returned by the API.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortUrlResponse {
    pub short_code: String,
    pub short_url: String,
    pub long_url: String,
    pub date_created: DateTime<Utc>,
    pub visits_count: u64,
    pub tags: Vec<String>,
    pub meta: ShortUrlMetaResponse,
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub import_source: Option<String>,
}

impl ShortUrlResponse {
    /// `short_url` is the rendered public URL.
    pub fn new(short_url: &ShortUrl, rendered: String) -> Self {
        Self {
            short_code: short_url.short_code().to_string(),
            short_url: rendered,
            long_url: short_url.long_url().to_string(),
            date_created: short_url.date_created(),
            visits_count: short_url.visit_count(),
            tags: short_url.tags().map(str::to_string).collect(),
            meta: ShortUrlMetaResponse {
                valid_since: short_url.valid_since(),
                valid_until: short_url.valid_until(),
                max_visits: short_url.max_visits(),
            },
            domain: short_url.authority().map(str::to_string),
            import_source: short_url.import_source().map(str::to_string),
        }
    }
}
