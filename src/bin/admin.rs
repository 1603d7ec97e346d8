//! CLI administration tool for short-url.
//!
//! Imports short URLs exported by other systems and creates short URLs
//! without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Import a JSON export, keeping the original short codes
//! cargo run --bin admin -- import export.json --source bitly --import-short-codes
//!
//! # Re-run the same import, updating what was imported before
//! cargo run --bin admin -- import export.json --source bitly --merge
//!
//! # Decide per record what to do with codes that are already taken
//! cargo run --bin admin -- import export.json --import-short-codes --on-conflict ask
//!
//! # Create a short URL
//! cargo run --bin admin -- create https://example.com --slug promo
//! ```
//!
//! # Environment Variables
//!
//! Same as the server (see `short_url::config`). Without a database the
//! commands run against a throwaway in-memory store.
//!
//! # Import File
//!
//! A JSON array of records:
//!
//! ```json
//! [{ "longUrl": "https://example.com", "shortCode": "abc", "createdAt": "2020-01-01T00:00:00Z" }]
//! ```
//!
//! `source` may be given per record or once with `--source`.

use short_url::application::services::{
    ConflictStrategy, ImportMode, ImportOptions, ImportOutcome, ImportSummary, SkipReason,
};
use short_url::config;
use short_url::domain::entities::{ImportedShortUrl, ShortUrlMeta};
use short_url::server::build_state;
use short_url::state::AppState;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use dialoguer::Select;
use serde::Deserialize;
use std::path::PathBuf;

/// CLI tool for managing short-url.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import short URLs from a JSON export
    Import {
        /// Path to the JSON file
        file: PathBuf,

        /// Source name for records that do not carry one
        #[arg(short, long, default_value = "import")]
        source: String,

        /// Keep the original short codes
        #[arg(long)]
        import_short_codes: bool,

        /// Update records imported before instead of skipping them
        #[arg(long)]
        merge: bool,

        /// What to do when an original short code is already taken
        #[arg(long, value_enum, default_value_t = OnConflict::Regenerate)]
        on_conflict: OnConflict,
    },

    /// Create a short URL
    Create {
        /// The long URL
        url: String,

        /// Custom slug
        #[arg(long)]
        slug: Option<String>,

        /// Domain the short URL is scoped to
        #[arg(long)]
        domain: Option<String>,

        /// Tags (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OnConflict {
    Regenerate,
    Skip,
    /// Prompt for every taken code
    Ask,
}

/// One record of an import file; `source` falls back to `--source`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportFileRecord {
    source: Option<String>,
    long_url: String,
    short_code: String,
    #[serde(default)]
    domain: Option<String>,
    created_at: DateTime<Utc>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    valid_since: Option<DateTime<Utc>>,
    #[serde(default)]
    valid_until: Option<DateTime<Utc>>,
    #[serde(default)]
    max_visits: Option<u32>,
}

impl ImportFileRecord {
    fn into_imported(self, default_source: &str) -> ImportedShortUrl {
        ImportedShortUrl {
            source: self.source.unwrap_or_else(|| default_source.to_string()),
            long_url: self.long_url,
            short_code: self.short_code,
            domain: self.domain,
            created_at: self.created_at,
            tags: self.tags,
            valid_since: self.valid_since,
            valid_until: self.valid_until,
            max_visits: self.max_visits,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env()?;
    let state = build_state(&config).await?;

    match cli.command {
        Commands::Import {
            file,
            source,
            import_short_codes,
            merge,
            on_conflict,
        } => {
            let options = ImportOptions {
                import_short_codes,
                mode: if merge { ImportMode::Merge } else { ImportMode::Skip },
                on_conflict: match on_conflict {
                    OnConflict::Skip | OnConflict::Ask => ConflictStrategy::Skip,
                    OnConflict::Regenerate => ConflictStrategy::Regenerate,
                },
            };
            let ask = matches!(on_conflict, OnConflict::Ask);
            import(&state, file, &source, options, ask).await?;
        }
        Commands::Create {
            url,
            slug,
            domain,
            tags,
        } => create(&state, url, slug, domain, tags).await?,
    }

    Ok(())
}

fn read_records(file: &PathBuf, default_source: &str) -> Result<Vec<ImportedShortUrl>> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let records: Vec<ImportFileRecord> = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a valid import file", file.display()))?;

    Ok(records
        .into_iter()
        .map(|r| r.into_imported(default_source))
        .collect())
}

/// Imports a file, optionally asking what to do with taken codes.
async fn import(
    state: &AppState,
    file: PathBuf,
    default_source: &str,
    options: ImportOptions,
    ask: bool,
) -> Result<()> {
    println!("{}", "📥 Import short URLs".bright_blue().bold());
    println!();

    let records = read_records(&file, default_source)?;
    println!("  Records: {}", records.len().to_string().cyan());
    println!();

    let summary = if ask {
        import_interactively(state, records, options).await?
    } else {
        state.import_service.import_many(records, options).await
    };

    print_summary(state, &summary);
    Ok(())
}

/// Imports record by record, prompting whenever an original code is taken.
async fn import_interactively(
    state: &AppState,
    records: Vec<ImportedShortUrl>,
    options: ImportOptions,
) -> Result<ImportSummary> {
    let mut summary = ImportSummary::default();

    for record in records {
        let retry = record.clone();
        let mut batch = state.import_service.import_many(vec![record], options).await;

        let taken = matches!(
            batch.results.first().map(|r| &r.outcome),
            Some(Ok(ImportOutcome::Skipped(SkipReason::ShortCodeTaken)))
        );

        if taken {
            let choice = Select::new()
                .with_prompt(format!(
                    "Short code \"{}\" is already in use",
                    retry.short_code
                ))
                .items(&["Generate a new short code", "Skip this record"])
                .default(0)
                .interact()?;

            if choice == 0 {
                batch = state
                    .import_service
                    .import_many(
                        vec![retry],
                        ImportOptions {
                            on_conflict: ConflictStrategy::Regenerate,
                            ..options
                        },
                    )
                    .await;
            }
        }

        summary.total += batch.total;
        summary.imported += batch.imported;
        summary.merged += batch.merged;
        summary.skipped += batch.skipped;
        summary.failed += batch.failed;
        summary.results.append(&mut batch.results);
    }

    Ok(summary)
}

fn print_summary(state: &AppState, summary: &ImportSummary) {
    for result in &summary.results {
        let code = result.original_short_code.as_str();
        match &result.outcome {
            Ok(ImportOutcome::Imported(short_url)) => println!(
                "  {} {} → {}",
                "IMPORTED".green(),
                code.cyan(),
                state.short_url_service.render(short_url)
            ),
            Ok(ImportOutcome::Merged(short_url)) => println!(
                "  {} {} → {}",
                "MERGED".blue(),
                code.cyan(),
                state.short_url_service.render(short_url)
            ),
            Ok(ImportOutcome::Skipped(reason)) => println!(
                "  {} {} ({})",
                "SKIPPED".yellow(),
                code.cyan(),
                reason.as_str().bright_black()
            ),
            Err(e) => println!("  {} {} ({})", "FAILED".red(), code.cyan(), e),
        }
    }

    println!();
    println!("{}", "Summary:".bright_white().bold());
    println!("  Total:    {}", summary.total);
    println!("  Imported: {}", summary.imported.to_string().green());
    println!("  Merged:   {}", summary.merged.to_string().blue());
    println!("  Skipped:  {}", summary.skipped.to_string().yellow());
    println!("  Failed:   {}", summary.failed.to_string().red());
}

async fn create(
    state: &AppState,
    url: String,
    slug: Option<String>,
    domain: Option<String>,
    tags: Vec<String>,
) -> Result<()> {
    let meta = ShortUrlMeta {
        custom_slug: slug,
        domain,
        tags,
        ..ShortUrlMeta::empty()
    };

    match state.short_url_service.create(&url, meta).await {
        Ok(short_url) => {
            println!("{}", "✅ Short URL created".green().bold());
            println!();
            println!("  Short URL: {}", state.short_url_service.render(&short_url).bright_yellow().bold());
            println!("  Long URL:  {}", short_url.long_url().cyan());
            Ok(())
        }
        Err(e) => {
            println!("{} {}", "❌".red(), e.to_string().red());
            anyhow::bail!("Failed to create short URL")
        }
    }
}
