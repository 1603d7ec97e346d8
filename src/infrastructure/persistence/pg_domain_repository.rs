//! PostgreSQL implementation of the domain repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::Domain;
use crate::domain::repositories::DomainRepository;
use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct DomainRow {
    id: i64,
    authority: String,
}

impl From<DomainRow> for Domain {
    fn from(row: DomainRow) -> Self {
        Domain::with_id(row.id, row.authority)
    }
}

/// PostgreSQL repository for domains.
pub struct PgDomainRepository {
    pool: Arc<PgPool>,
}

impl PgDomainRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DomainRepository for PgDomainRepository {
    async fn find_by_authority(&self, authority: &str) -> Result<Option<Domain>, AppError> {
        let row = sqlx::query_as::<_, DomainRow>(
            "SELECT id, authority FROM domains WHERE authority = $1",
        )
        .bind(authority.to_ascii_lowercase())
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Domain::from))
    }

    async fn find_or_create(&self, authority: &str) -> Result<Domain, AppError> {
        // The no-op update makes RETURNING yield the existing row on conflict.
        let row = sqlx::query_as::<_, DomainRow>(
            r#"
            INSERT INTO domains (authority)
            VALUES ($1)
            ON CONFLICT (authority) DO UPDATE SET authority = EXCLUDED.authority
            RETURNING id, authority
            "#,
        )
        .bind(authority.to_ascii_lowercase())
        .fetch_one(self.pool.as_ref())
        .await?;

        tracing::debug!(id = row.id, authority = %row.authority, "Domain resolved");
        Ok(row.into())
    }
}
