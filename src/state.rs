//! Shared application state injected into handlers.

use std::sync::Arc;

use crate::application::services::{ImportService, ShortUrlService, ShortUrlSettings};
use crate::domain::repositories::{DomainRepository, ShortUrlRepository};
use crate::infrastructure::persistence::{InMemoryDomainRepository, InMemoryShortUrlRepository};

pub type DynShortUrlService = ShortUrlService<dyn ShortUrlRepository, dyn DomainRepository>;
pub type DynImportService = ImportService<dyn ShortUrlRepository, dyn DomainRepository>;

/// Where short URLs are stored, reported by the health check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Postgres,
    Memory,
}

impl StorageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Memory => "memory",
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub short_url_service: Arc<DynShortUrlService>,
    pub import_service: Arc<DynImportService>,
    pub storage: StorageKind,
}

impl AppState {
    pub fn new(
        short_url_repository: Arc<dyn ShortUrlRepository>,
        domain_repository: Arc<dyn DomainRepository>,
        settings: ShortUrlSettings,
        storage: StorageKind,
    ) -> Self {
        let short_url_service = Arc::new(ShortUrlService::new(
            short_url_repository,
            domain_repository,
            settings,
        ));
        let import_service = Arc::new(ImportService::new(short_url_service.clone()));

        Self {
            short_url_service,
            import_service,
            storage,
        }
    }

    /// State backed by the in-memory repositories.
    pub fn in_memory(settings: ShortUrlSettings) -> Self {
        Self::new(
            Arc::new(InMemoryShortUrlRepository::new()),
            Arc::new(InMemoryDomainRepository::new()),
            settings,
            StorageKind::Memory,
        )
    }
}
