//! In-memory repositories.
//!
//! Used when no database is configured and by the HTTP integration tests.
//! Each map sits behind one mutex, which also makes inserts and visit
//! increments atomic.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;

use crate::domain::entities::{Domain, ShortUrl};
use crate::domain::repositories::{DomainRepository, ShortUrlRepository};
use crate::error::AppError;

fn poisoned() -> AppError {
    AppError::internal("In-memory store lock poisoned", json!({}))
}

#[derive(Debug, Default)]
pub struct InMemoryDomainRepository {
    by_authority: Mutex<HashMap<String, Domain>>,
}

impl InMemoryDomainRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DomainRepository for InMemoryDomainRepository {
    async fn find_by_authority(&self, authority: &str) -> Result<Option<Domain>, AppError> {
        let domains = self.by_authority.lock().map_err(|_| poisoned())?;
        Ok(domains.get(&authority.to_ascii_lowercase()).cloned())
    }

    async fn find_or_create(&self, authority: &str) -> Result<Domain, AppError> {
        let mut domains = self.by_authority.lock().map_err(|_| poisoned())?;
        let authority = authority.to_ascii_lowercase();
        let next_id = i64::try_from(domains.len()).unwrap_or(i64::MAX) + 1;

        Ok(domains
            .entry(authority.clone())
            .or_insert_with(|| Domain::with_id(next_id, authority))
            .clone())
    }
}

#[derive(Debug, Default)]
struct Rows {
    next_id: i64,
    by_id: HashMap<i64, ShortUrl>,
}

impl Rows {
    fn find(&self, predicate: impl Fn(&ShortUrl) -> bool) -> Option<ShortUrl> {
        self.by_id.values().find(|s| predicate(s)).cloned()
    }
}

fn domain_id(short_url: &ShortUrl) -> Option<i64> {
    short_url.domain().and_then(Domain::id)
}

#[derive(Debug, Default)]
pub struct InMemoryShortUrlRepository {
    rows: Mutex<Rows>,
}

impl InMemoryShortUrlRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().map(|r| r.by_id.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ShortUrlRepository for InMemoryShortUrlRepository {
    async fn insert(&self, short_url: &ShortUrl) -> Result<i64, AppError> {
        let mut rows = self.rows.lock().map_err(|_| poisoned())?;

        let taken = rows.by_id.values().any(|s| {
            s.short_code() == short_url.short_code() && domain_id(s) == domain_id(short_url)
        });
        if taken {
            return Err(AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": "short_urls_domain_code_key" }),
            ));
        }

        rows.next_id += 1;
        let id = rows.next_id;
        let mut stored = short_url.clone();
        stored.mark_persisted(id);
        rows.by_id.insert(id, stored);

        Ok(id)
    }

    async fn find_by_code(
        &self,
        short_code: &str,
        domain_id_filter: Option<i64>,
    ) -> Result<Option<ShortUrl>, AppError> {
        let rows = self.rows.lock().map_err(|_| poisoned())?;
        Ok(rows.find(|s| s.short_code() == short_code && domain_id(s) == domain_id_filter))
    }

    async fn find_imported(
        &self,
        source: &str,
        original_short_code: &str,
        domain_id_filter: Option<i64>,
    ) -> Result<Option<ShortUrl>, AppError> {
        let rows = self.rows.lock().map_err(|_| poisoned())?;
        Ok(rows.find(|s| {
            s.import_source() == Some(source)
                && s.import_original_short_code() == Some(original_short_code)
                && domain_id(s) == domain_id_filter
        }))
    }

    async fn update(&self, short_url: &ShortUrl) -> Result<(), AppError> {
        let mut rows = self.rows.lock().map_err(|_| poisoned())?;

        let stored = short_url
            .id()
            .and_then(|id| rows.by_id.get_mut(&id))
            .ok_or_else(|| {
                AppError::not_found(
                    "Short URL not found",
                    json!({ "shortCode": short_url.short_code() }),
                )
            })?;

        // The visit counter belongs to the store, not to the caller's copy.
        let visit_count = stored.visit_count();
        *stored = short_url.clone();
        stored.set_visit_count(visit_count);

        Ok(())
    }

    async fn record_visit(&self, id: i64) -> Result<u64, AppError> {
        let mut rows = self.rows.lock().map_err(|_| poisoned())?;

        let stored = rows
            .by_id
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found("Short URL not found", json!({ "id": id })))?;

        let visit_count = stored.visit_count() + 1;
        stored.set_visit_count(visit_count);
        Ok(visit_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ShortUrlMeta;
    use crate::domain::resolver::SimpleDomainResolver;

    fn with_code(short_code: &str, domain: Option<Domain>) -> ShortUrl {
        let mut short_url = ShortUrl::new(
            "https://example.com",
            ShortUrlMeta {
                custom_slug: Some(short_code.to_string()),
                ..ShortUrlMeta::empty()
            },
            &SimpleDomainResolver,
        );
        if let Some(domain) = domain {
            short_url.attach_domain(domain);
        }
        short_url
    }

    #[tokio::test]
    async fn test_insert_enforces_uniqueness_per_domain() {
        let repository = InMemoryShortUrlRepository::new();

        repository.insert(&with_code("abc", None)).await.unwrap();
        repository
            .insert(&with_code("abc", Some(Domain::with_id(1, "s.example.com"))))
            .await
            .unwrap();
        let err = repository.insert(&with_code("abc", None)).await.unwrap_err();

        assert!(err.is_conflict());
        assert_eq!(repository.len(), 2);
    }

    #[tokio::test]
    async fn test_find_by_code_is_exact() {
        let repository = InMemoryShortUrlRepository::new();
        repository
            .insert(&with_code("abc", Some(Domain::with_id(1, "s.example.com"))))
            .await
            .unwrap();

        assert!(repository.find_by_code("abc", None).await.unwrap().is_none());
        let found = repository.find_by_code("abc", Some(1)).await.unwrap().unwrap();
        assert!(found.is_persisted());
    }

    #[tokio::test]
    async fn test_record_visit_increments() {
        let repository = InMemoryShortUrlRepository::new();
        let id = repository.insert(&with_code("abc", None)).await.unwrap();

        assert_eq!(repository.record_visit(id).await.unwrap(), 1);
        assert_eq!(repository.record_visit(id).await.unwrap(), 2);
        assert!(repository.record_visit(id + 100).await.is_err());
    }

    #[tokio::test]
    async fn test_update_keeps_visit_count() {
        let repository = InMemoryShortUrlRepository::new();
        let id = repository.insert(&with_code("abc", None)).await.unwrap();
        repository.record_visit(id).await.unwrap();

        let mut short_url = repository.find_by_code("abc", None).await.unwrap().unwrap();
        short_url.set_visit_count(0);
        short_url.add_tag("x");
        repository.update(&short_url).await.unwrap();

        let stored = repository.find_by_code("abc", None).await.unwrap().unwrap();
        assert_eq!(stored.visit_count(), 1);
        assert!(stored.has_tag("x"));
    }

    #[tokio::test]
    async fn test_domain_find_or_create_is_idempotent() {
        let repository = InMemoryDomainRepository::new();

        let first = repository.find_or_create("S.example.com").await.unwrap();
        let second = repository.find_or_create("s.example.com").await.unwrap();

        assert_eq!(first.id(), second.id());
        assert!(repository.find_by_authority("other.com").await.unwrap().is_none());
    }
}
