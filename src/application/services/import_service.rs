//! Importing short URLs exported by other systems.
//!
//! Records are matched against earlier imports by source, original short
//! code and domain, so running the same import twice does not duplicate
//! anything.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::short_url_service::ShortUrlService;
use crate::domain::entities::{ImportedShortUrl, Patch, ShortUrl, ShortUrlEdit};
use crate::domain::repositories::{DomainRepository, ShortUrlRepository};
use crate::error::AppError;
use crate::utils::code_generator::validate_imported_short_code;

/// What to do with a record that was already imported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    #[default]
    Skip,
    /// Overwrite long URL and the validity fields the record carries, and add
    /// its tags to the existing ones.
    Merge,
}

/// What to do when an imported short code is taken by another short URL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictStrategy {
    #[default]
    Regenerate,
    Skip,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ImportOptions {
    /// Keep the source's short codes instead of generating new ones.
    pub import_short_codes: bool,
    pub mode: ImportMode,
    pub on_conflict: ConflictStrategy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    AlreadyImported,
    ShortCodeTaken,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AlreadyImported => "already_imported",
            Self::ShortCodeTaken => "short_code_taken",
        }
    }
}

#[derive(Debug, Clone)]
pub enum ImportOutcome {
    Imported(ShortUrl),
    Merged(ShortUrl),
    Skipped(SkipReason),
}

/// Result of one record of a batch.
#[derive(Debug)]
pub struct ImportResult {
    pub source: String,
    pub original_short_code: String,
    pub outcome: Result<ImportOutcome, AppError>,
}

#[derive(Debug, Default)]
pub struct ImportSummary {
    pub total: usize,
    pub imported: usize,
    pub merged: usize,
    pub skipped: usize,
    pub failed: usize,
    pub results: Vec<ImportResult>,
}

impl ImportSummary {
    fn push(&mut self, result: ImportResult) {
        self.total += 1;
        match &result.outcome {
            Ok(ImportOutcome::Imported(_)) => self.imported += 1,
            Ok(ImportOutcome::Merged(_)) => self.merged += 1,
            Ok(ImportOutcome::Skipped(_)) => self.skipped += 1,
            Err(_) => self.failed += 1,
        }
        self.results.push(result);
    }
}

/// Translates imported records into stored short URLs.
pub struct ImportService<R, D>
where
    R: ShortUrlRepository + ?Sized,
    D: DomainRepository + ?Sized,
{
    short_urls: Arc<ShortUrlService<R, D>>,
}

impl<R, D> ImportService<R, D>
where
    R: ShortUrlRepository + ?Sized,
    D: DomainRepository + ?Sized,
{
    pub fn new(short_urls: Arc<ShortUrlService<R, D>>) -> Self {
        Self { short_urls }
    }

    /// Imports a single record.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for a record without long URL, with
    /// an unusable short code or with a zero `maxVisits`,
    /// [`AppError::Unavailable`] if no free short code was found, and
    /// storage errors otherwise.
    pub async fn import_one(
        &self,
        mut record: ImportedShortUrl,
        options: ImportOptions,
    ) -> Result<ImportOutcome, AppError> {
        check_record(&record)?;

        record.domain = self.short_urls.scope(record.domain.as_deref());
        let existing = match record.domain.as_deref() {
            None => self.find_imported(&record, None).await?,
            Some(authority) => {
                let domain_id = self
                    .short_urls
                    .domain_repository()
                    .find_by_authority(authority)
                    .await?
                    .and_then(|d| d.id());

                // Nothing was ever imported under a domain that is not stored yet.
                match domain_id {
                    Some(id) => self.find_imported(&record, Some(id)).await?,
                    None => None,
                }
            }
        };

        if let Some(existing) = existing {
            return match options.mode {
                ImportMode::Skip => {
                    tracing::debug!(
                        source = %record.source,
                        short_code = %record.short_code,
                        "Already imported, skipping"
                    );
                    Ok(ImportOutcome::Skipped(SkipReason::AlreadyImported))
                }
                ImportMode::Merge => self.merge(existing, record).await,
            };
        }

        let mut short_url = ShortUrl::from_import(
            record,
            options.import_short_codes,
            self.short_urls.settings().default_short_code_length,
            self.short_urls.resolver(),
        );
        self.short_urls.attach_stored_domain(&mut short_url).await?;

        if options.import_short_codes && options.on_conflict == ConflictStrategy::Skip {
            let repository = self.short_urls.short_url_repository();
            return match repository.insert(&short_url).await {
                Ok(id) => {
                    short_url.mark_persisted(id);
                    Ok(ImportOutcome::Imported(short_url))
                }
                Err(e) if e.is_conflict() => {
                    tracing::warn!(
                        short_code = %short_url.short_code(),
                        "Imported short code already in use, skipping"
                    );
                    Ok(ImportOutcome::Skipped(SkipReason::ShortCodeTaken))
                }
                Err(e) => Err(e),
            };
        }

        self.short_urls.persist(&mut short_url).await?;
        Ok(ImportOutcome::Imported(short_url))
    }

    async fn find_imported(
        &self,
        record: &ImportedShortUrl,
        domain_id: Option<i64>,
    ) -> Result<Option<ShortUrl>, AppError> {
        self.short_urls
            .short_url_repository()
            .find_imported(&record.source, &record.short_code, domain_id)
            .await
    }

    async fn merge(
        &self,
        mut existing: ShortUrl,
        record: ImportedShortUrl,
    ) -> Result<ImportOutcome, AppError> {
        existing.update(ShortUrlEdit {
            long_url: Some(record.long_url),
            valid_since: present(record.valid_since),
            valid_until: present(record.valid_until),
            max_visits: present(record.max_visits),
        });
        for tag in record.tags {
            existing.add_tag(tag);
        }

        self.short_urls
            .short_url_repository()
            .update(&existing)
            .await?;

        tracing::debug!(short_code = %existing.short_code(), "Merged imported short URL");
        Ok(ImportOutcome::Merged(existing))
    }

    /// Imports records one by one. A failing record is reported in the
    /// summary and does not stop the batch.
    pub async fn import_many(
        &self,
        records: Vec<ImportedShortUrl>,
        options: ImportOptions,
    ) -> ImportSummary {
        let mut summary = ImportSummary::default();

        for record in records {
            let source = record.source.clone();
            let original_short_code = record.short_code.clone();

            let outcome = self.import_one(record, options).await;
            if let Err(e) = &outcome {
                tracing::warn!(
                    source = %source,
                    short_code = %original_short_code,
                    error = %e,
                    "Failed to import short URL"
                );
            }

            summary.push(ImportResult {
                source,
                original_short_code,
                outcome,
            });
        }

        tracing::info!(
            total = summary.total,
            imported = summary.imported,
            merged = summary.merged,
            skipped = summary.skipped,
            failed = summary.failed,
            "Import finished"
        );

        summary
    }
}

/// Imported records skip creation validation, but must still be storable
/// and reachable.
fn check_record(record: &ImportedShortUrl) -> Result<(), AppError> {
    if record.long_url.trim().is_empty() {
        return Err(AppError::bad_request(
            "A URL was not provided",
            json!({ "shortCode": record.short_code, "invalidElements": ["longUrl"] }),
        ));
    }

    validate_imported_short_code(&record.short_code)?;

    if record.max_visits == Some(0) {
        return Err(AppError::bad_request(
            "maxVisits must be at least 1",
            json!({ "shortCode": record.short_code, "invalidElements": ["maxVisits"] }),
        ));
    }

    Ok(())
}

/// A field the record does not carry leaves the stored value alone.
fn present<T>(value: Option<T>) -> Patch<T> {
    value.map_or(Patch::Untouched, Patch::Set)
}
