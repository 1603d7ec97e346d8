//! PostgreSQL implementation of the short URL repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{Domain, ImportProvenance, ShortUrl, ShortUrlParts};
use crate::domain::repositories::ShortUrlRepository;
use crate::error::AppError;
use crate::utils::code_generator::DEFAULT_SHORT_CODE_LENGTH;

const SELECT_SHORT_URL: &str = r#"
    SELECT s.id, s.long_url, s.short_code, s.short_code_length, s.domain_id, d.authority,
           s.date_created, s.valid_since, s.valid_until, s.max_visits, s.visit_count,
           s.tags, s.custom_slug_provided, s.import_source, s.import_original_short_code
    FROM short_urls s
    LEFT JOIN domains d ON d.id = s.domain_id
"#;

#[derive(sqlx::FromRow)]
struct ShortUrlRow {
    id: i64,
    long_url: String,
    short_code: String,
    short_code_length: i32,
    domain_id: Option<i64>,
    authority: Option<String>,
    date_created: DateTime<Utc>,
    valid_since: Option<DateTime<Utc>>,
    valid_until: Option<DateTime<Utc>>,
    max_visits: Option<i64>,
    visit_count: i64,
    tags: Vec<String>,
    custom_slug_provided: bool,
    import_source: Option<String>,
    import_original_short_code: Option<String>,
}

impl From<ShortUrlRow> for ShortUrl {
    fn from(row: ShortUrlRow) -> Self {
        let domain = match (row.domain_id, row.authority) {
            (Some(id), Some(authority)) => Some(Domain::with_id(id, authority)),
            _ => None,
        };
        let import = match (row.import_source, row.import_original_short_code) {
            (Some(source), Some(original_short_code)) => Some(ImportProvenance {
                source,
                original_short_code,
            }),
            _ => None,
        };

        ShortUrl::from_parts(ShortUrlParts {
            id: row.id,
            long_url: row.long_url,
            short_code: row.short_code,
            short_code_length: usize::try_from(row.short_code_length)
                .unwrap_or(DEFAULT_SHORT_CODE_LENGTH),
            domain,
            date_created: row.date_created,
            valid_since: row.valid_since,
            valid_until: row.valid_until,
            max_visits: row.max_visits.and_then(|v| u32::try_from(v).ok()),
            visit_count: u64::try_from(row.visit_count).unwrap_or(0),
            tags: row.tags,
            custom_slug_provided: row.custom_slug_provided,
            import,
        })
    }
}

fn domain_id(short_url: &ShortUrl) -> Option<i64> {
    short_url.domain().and_then(Domain::id)
}

fn tags(short_url: &ShortUrl) -> Vec<String> {
    short_url.tags().map(str::to_string).collect()
}

/// PostgreSQL repository for short URLs.
///
/// `(domain_id, short_code)` is unique with NULLs not distinct, so short
/// URLs without a domain share one scope.
pub struct PgShortUrlRepository {
    pool: Arc<PgPool>,
}

impl PgShortUrlRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShortUrlRepository for PgShortUrlRepository {
    async fn insert(&self, short_url: &ShortUrl) -> Result<i64, AppError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO short_urls (
                long_url, short_code, short_code_length, domain_id, date_created,
                valid_since, valid_until, max_visits, visit_count, tags,
                custom_slug_provided, import_source, import_original_short_code
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING id
            "#,
        )
        .bind(short_url.long_url())
        .bind(short_url.short_code())
        .bind(i32::try_from(short_url.short_code_length()).unwrap_or(i32::MAX))
        .bind(domain_id(short_url))
        .bind(short_url.date_created())
        .bind(short_url.valid_since())
        .bind(short_url.valid_until())
        .bind(short_url.max_visits().map(i64::from))
        .bind(i64::try_from(short_url.visit_count()).unwrap_or(i64::MAX))
        .bind(tags(short_url))
        .bind(short_url.custom_slug_provided())
        .bind(short_url.import_source())
        .bind(short_url.import_original_short_code())
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(id)
    }

    async fn find_by_code(
        &self,
        short_code: &str,
        domain_id: Option<i64>,
    ) -> Result<Option<ShortUrl>, AppError> {
        let query = format!(
            "{SELECT_SHORT_URL} WHERE s.short_code = $1 AND s.domain_id IS NOT DISTINCT FROM $2"
        );

        let row = sqlx::query_as::<_, ShortUrlRow>(&query)
            .bind(short_code)
            .bind(domain_id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(ShortUrl::from))
    }

    async fn find_imported(
        &self,
        source: &str,
        original_short_code: &str,
        domain_id: Option<i64>,
    ) -> Result<Option<ShortUrl>, AppError> {
        let query = format!(
            "{SELECT_SHORT_URL} WHERE s.import_source = $1 \
             AND s.import_original_short_code = $2 \
             AND s.domain_id IS NOT DISTINCT FROM $3 \
             LIMIT 1"
        );

        let row = sqlx::query_as::<_, ShortUrlRow>(&query)
            .bind(source)
            .bind(original_short_code)
            .bind(domain_id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(ShortUrl::from))
    }

    async fn update(&self, short_url: &ShortUrl) -> Result<(), AppError> {
        let id = short_url.id().ok_or_else(|| {
            AppError::not_found(
                "Short URL has not been stored yet",
                json!({ "shortCode": short_url.short_code() }),
            )
        })?;

        let result = sqlx::query(
            r#"
            UPDATE short_urls SET
                long_url    = $2,
                valid_since = $3,
                valid_until = $4,
                max_visits  = $5,
                tags        = $6
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(short_url.long_url())
        .bind(short_url.valid_since())
        .bind(short_url.valid_until())
        .bind(short_url.max_visits().map(i64::from))
        .bind(tags(short_url))
        .execute(self.pool.as_ref())
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(
                "Short URL not found",
                json!({ "id": id }),
            ));
        }

        Ok(())
    }

    async fn record_visit(&self, id: i64) -> Result<u64, AppError> {
        let visit_count: Option<i64> = sqlx::query_scalar(
            "UPDATE short_urls SET visit_count = visit_count + 1 WHERE id = $1 RETURNING visit_count",
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        visit_count
            .map(|c| u64::try_from(c).unwrap_or(0))
            .ok_or_else(|| AppError::not_found("Short URL not found", json!({ "id": id })))
    }
}
