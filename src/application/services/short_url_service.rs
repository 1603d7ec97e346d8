//! Short URL creation, resolution and editing.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::domain::entities::{ShortUrl, ShortUrlEdit, ShortUrlMeta};
use crate::domain::renderer::DomainConfig;
use crate::domain::repositories::{DomainRepository, ShortUrlRepository};
use crate::domain::resolver::CachingDomainResolver;
use crate::error::AppError;
use crate::utils::code_generator::DEFAULT_SHORT_CODE_LENGTH;
use crate::utils::url_normalizer::{UrlNormalizationError, normalize_url};

/// Tunables for [`ShortUrlService`].
#[derive(Debug, Clone)]
pub struct ShortUrlSettings {
    pub domain_config: DomainConfig,
    pub default_short_code_length: usize,
    /// How many times an insert is attempted before giving up on finding a
    /// free short code.
    pub max_attempts: u32,
}

impl Default for ShortUrlSettings {
    fn default() -> Self {
        Self {
            domain_config: DomainConfig::default(),
            default_short_code_length: DEFAULT_SHORT_CODE_LENGTH,
            max_attempts: 10,
        }
    }
}

/// Creates, resolves and edits short URLs on top of the repositories.
///
/// Owns the short code allocation loop: a uniqueness conflict on insert
/// regenerates the code and retries, up to
/// [`ShortUrlSettings::max_attempts`] inserts.
pub struct ShortUrlService<R, D>
where
    R: ShortUrlRepository + ?Sized,
    D: DomainRepository + ?Sized,
{
    short_url_repository: Arc<R>,
    domain_repository: Arc<D>,
    resolver: CachingDomainResolver,
    settings: ShortUrlSettings,
}

impl<R, D> ShortUrlService<R, D>
where
    R: ShortUrlRepository + ?Sized,
    D: DomainRepository + ?Sized,
{
    pub fn new(
        short_url_repository: Arc<R>,
        domain_repository: Arc<D>,
        settings: ShortUrlSettings,
    ) -> Self {
        Self {
            short_url_repository,
            domain_repository,
            resolver: CachingDomainResolver::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &ShortUrlSettings {
        &self.settings
    }

    pub(crate) fn short_url_repository(&self) -> &R {
        &self.short_url_repository
    }

    pub(crate) fn domain_repository(&self) -> &D {
        &self.domain_repository
    }

    pub(crate) fn resolver(&self) -> &CachingDomainResolver {
        &self.resolver
    }

    /// Maps a requested authority to the scope it is stored under.
    ///
    /// The configured default hostname is the same as "no domain".
    pub fn scope(&self, authority: Option<&str>) -> Option<String> {
        let authority = authority.map(str::trim).filter(|a| !a.is_empty())?;
        let default_host = self.settings.domain_config.hostname();

        if !default_host.is_empty() && authority.eq_ignore_ascii_case(default_host) {
            return None;
        }

        Some(authority.to_ascii_lowercase())
    }

    /// Validates the input, builds a short URL and persists it.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] for an invalid long URL or metadata
    /// - [`AppError::Conflict`] if the custom slug is taken in that domain
    /// - [`AppError::Unavailable`] if no free short code was found
    pub async fn create(
        &self,
        long_url: &str,
        mut meta: ShortUrlMeta,
    ) -> Result<ShortUrl, AppError> {
        meta.validate()?;

        let long_url = if meta.validate_url {
            normalize_url(long_url).map_err(invalid_long_url)?
        } else {
            long_url.trim().to_string()
        };

        meta.domain = self.scope(meta.domain.as_deref());
        meta.short_code_length
            .get_or_insert(self.settings.default_short_code_length);

        let mut short_url = ShortUrl::new(long_url, meta, &self.resolver);
        self.attach_stored_domain(&mut short_url).await?;
        self.persist(&mut short_url).await?;

        tracing::info!(
            short_code = %short_url.short_code(),
            domain = short_url.authority().unwrap_or_default(),
            "Short URL created"
        );

        Ok(short_url)
    }

    /// Single-step creation from a bare long URL.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] with "A URL was not provided" when
    /// `long_url` is missing or blank. See [`Self::create`] otherwise.
    pub async fn shorten(&self, long_url: Option<&str>) -> Result<ShortUrl, AppError> {
        let long_url = long_url
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| invalid_long_url(UrlNormalizationError::Empty))?;

        self.create(long_url, ShortUrlMeta::empty()).await
    }

    /// Replaces the in-memory domain handle with the stored one.
    pub(crate) async fn attach_stored_domain(
        &self,
        short_url: &mut ShortUrl,
    ) -> Result<(), AppError> {
        let Some(domain) = short_url.domain() else {
            return Ok(());
        };
        if domain.id().is_some() {
            return Ok(());
        }

        let stored = self
            .domain_repository
            .find_or_create(domain.authority())
            .await?;
        self.resolver.remember(stored.clone());
        short_url.attach_domain(stored);
        Ok(())
    }

    /// Inserts a new short URL, regenerating its code on conflicts.
    ///
    /// # Errors
    ///
    /// - [`AppError::Conflict`] when the code is a custom slug and is taken
    /// - [`AppError::Unavailable`] after `max_attempts` conflicting inserts
    pub async fn persist(&self, short_url: &mut ShortUrl) -> Result<(), AppError> {
        let max_attempts = self.settings.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            match self.short_url_repository.insert(short_url).await {
                Ok(id) => {
                    short_url.mark_persisted(id);
                    return Ok(());
                }
                Err(e) if e.is_conflict() => {
                    if short_url.custom_slug_provided() && !short_url.is_imported() {
                        return Err(AppError::conflict(
                            format!(
                                "Provided slug \"{}\" is already in use",
                                short_url.short_code()
                            ),
                            json!({
                                "customSlug": short_url.short_code(),
                                "domain": short_url.authority(),
                            }),
                        ));
                    }

                    tracing::warn!(
                        short_code = %short_url.short_code(),
                        attempt,
                        "Short code already taken, regenerating"
                    );
                    short_url.regenerate_short_code()?;
                }
                Err(e) => return Err(e),
            }
        }

        tracing::error!(max_attempts, "Could not allocate a unique short code");
        Err(AppError::unavailable(
            "Could not allocate a unique short code",
            json!({ "attempts": max_attempts }),
        ))
    }

    /// Finds the short URL for `(short_code, domain)`.
    ///
    /// A short URL stored under the requested domain wins; otherwise the one
    /// stored without a domain is returned.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] when neither exists.
    pub async fn resolve(
        &self,
        short_code: &str,
        domain: Option<&str>,
    ) -> Result<ShortUrl, AppError> {
        if let Some(authority) = self.scope(domain)
            && let Some(stored) = self.domain_repository.find_by_authority(&authority).await?
            && let Some(short_url) = self
                .short_url_repository
                .find_by_code(short_code, stored.id())
                .await?
        {
            return Ok(short_url);
        }

        self.short_url_repository
            .find_by_code(short_code, None)
            .await?
            .ok_or_else(|| {
                tracing::debug!(short_code, domain, "Short URL not found");
                AppError::not_found(
                    format!("No URL found with short code \"{short_code}\""),
                    json!({ "shortCode": short_code, "domain": domain }),
                )
            })
    }

    /// Like [`Self::resolve`], but a short URL that may not redirect at `now`
    /// is an error.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Gone`] for a disabled short URL, otherwise see
    /// [`Self::resolve`].
    pub async fn resolve_enabled(
        &self,
        short_code: &str,
        domain: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<ShortUrl, AppError> {
        let short_url = self.resolve(short_code, domain).await?;

        if !short_url.is_enabled(now) {
            tracing::debug!(short_code, "Short URL is disabled");
            return Err(AppError::gone(
                format!("Short URL \"{short_code}\" is no longer available"),
                json!({ "shortCode": short_code, "domain": domain }),
            ));
        }

        Ok(short_url)
    }

    /// Resolves an enabled short URL and counts the visit.
    ///
    /// A failure to record the visit is logged and does not fail the call.
    ///
    /// # Errors
    ///
    /// See [`Self::resolve_enabled`].
    pub async fn visit(&self, short_code: &str, domain: Option<&str>) -> Result<ShortUrl, AppError> {
        let mut short_url = self.resolve_enabled(short_code, domain, Utc::now()).await?;

        if let Some(id) = short_url.id() {
            match self.short_url_repository.record_visit(id).await {
                Ok(visit_count) => short_url.set_visit_count(visit_count),
                Err(e) => tracing::error!(error = %e, short_code, "Failed to record visit"),
            }
        }

        Ok(short_url)
    }

    /// Applies a sparse edit to a stored short URL.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if there is no such short URL
    /// - [`AppError::Validation`] for an invalid long URL, a zero quota or a
    ///   validity window that ends before it starts
    pub async fn edit(
        &self,
        short_code: &str,
        domain: Option<&str>,
        mut edit: ShortUrlEdit,
    ) -> Result<ShortUrl, AppError> {
        let mut short_url = self.resolve(short_code, domain).await?;

        if let Some(long_url) = edit.long_url.take() {
            edit.long_url = Some(normalize_url(&long_url).map_err(invalid_long_url)?);
        }
        check_edit(&short_url, &edit)?;

        short_url.update(edit);
        self.short_url_repository.update(&short_url).await?;

        tracing::info!(short_code, "Short URL edited");
        Ok(short_url)
    }

    /// Checks that the store answers queries.
    ///
    /// # Errors
    ///
    /// Returns the storage error if the lookup fails.
    pub async fn ping(&self) -> Result<(), AppError> {
        self.domain_repository.find_by_authority("").await.map(|_| ())
    }

    /// Public URL of `short_url` under the configured defaults.
    pub fn render(&self, short_url: &ShortUrl) -> String {
        short_url.to_url_string(&self.settings.domain_config)
    }
}

fn invalid_long_url(e: UrlNormalizationError) -> AppError {
    AppError::bad_request(
        e.to_string(),
        json!({ "invalidElements": ["longUrl"] }),
    )
}

/// Checks the edit against the values it would produce.
fn check_edit(short_url: &ShortUrl, edit: &ShortUrlEdit) -> Result<(), AppError> {
    use crate::domain::entities::Patch;

    if matches!(edit.max_visits, Patch::Set(0)) {
        return Err(AppError::bad_request(
            "maxVisits must be at least 1",
            json!({ "invalidElements": ["maxVisits"] }),
        ));
    }

    let mut since = short_url.valid_since();
    let mut until = short_url.valid_until();
    edit.valid_since.apply_to(&mut since);
    edit.valid_until.apply_to(&mut until);

    if let (Some(since), Some(until)) = (since, until)
        && since > until
    {
        return Err(AppError::bad_request(
            "validSince must not be later than validUntil",
            json!({ "invalidElements": ["validSince", "validUntil"] }),
        ));
    }

    Ok(())
}
