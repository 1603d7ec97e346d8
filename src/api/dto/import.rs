//! DTOs for the import endpoint.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::application::services::{
    ConflictStrategy, ImportMode, ImportOptions, ImportOutcome, ImportResult, ImportSummary,
};
use crate::domain::entities::{ImportedShortUrl, ShortUrl};
use crate::error::ErrorInfo;

/// Request body for `POST /rest/short-urls/import`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ImportRequest {
    #[serde(default)]
    pub import_short_codes: bool,

    #[serde(default)]
    pub mode: ImportMode,

    #[serde(default)]
    pub on_conflict: ConflictStrategy,

    #[validate(length(min = 1, max = 10000))]
    pub short_urls: Vec<ImportedShortUrl>,
}

impl ImportRequest {
    pub fn options(&self) -> ImportOptions {
        ImportOptions {
            import_short_codes: self.import_short_codes,
            mode: self.mode,
            on_conflict: self.on_conflict,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub summary: ImportSummaryResponse,
    pub items: Vec<ImportResultItem>,
}

#[derive(Debug, Serialize)]
pub struct ImportSummaryResponse {
    pub total: usize,
    pub imported: usize,
    pub merged: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Outcome for one imported record.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ImportResultItem {
    #[serde(rename_all = "camelCase")]
    Imported {
        original_short_code: String,
        short_code: String,
        short_url: String,
    },
    #[serde(rename_all = "camelCase")]
    Merged {
        original_short_code: String,
        short_code: String,
        short_url: String,
    },
    #[serde(rename_all = "camelCase")]
    Skipped {
        original_short_code: String,
        reason: &'static str,
    },
    #[serde(rename_all = "camelCase")]
    Failed {
        original_short_code: String,
        error: ErrorInfo,
    },
}

impl ImportResponse {
    /// `render` produces the public URL of an imported short URL.
    pub fn from_summary(
        summary: ImportSummary,
        render: impl Fn(&ShortUrl) -> String,
    ) -> Self {
        let items = summary
            .results
            .into_iter()
            .map(|ImportResult { original_short_code, outcome, .. }| match outcome {
                Ok(ImportOutcome::Imported(short_url)) => ImportResultItem::Imported {
                    original_short_code,
                    short_code: short_url.short_code().to_string(),
                    short_url: render(&short_url),
                },
                Ok(ImportOutcome::Merged(short_url)) => ImportResultItem::Merged {
                    original_short_code,
                    short_code: short_url.short_code().to_string(),
                    short_url: render(&short_url),
                },
                Ok(ImportOutcome::Skipped(reason)) => ImportResultItem::Skipped {
                    original_short_code,
                    reason: reason.as_str(),
                },
                Err(e) => ImportResultItem::Failed {
                    original_short_code,
                    error: e.to_error_info(),
                },
            })
            .collect();

        Self {
            summary: ImportSummaryResponse {
                total: summary.total,
                imported: summary.imported,
                merged: summary.merged,
                skipped: summary.skipped,
                failed: summary.failed,
            },
            items,
        }
    }
}
