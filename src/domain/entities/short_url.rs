//! Short URL aggregate.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use super::{Domain, ImportedShortUrl, ShortUrlEdit, ShortUrlMeta};
use crate::domain::enablement;
use crate::domain::errors::ShortCodeCannotBeRegenerated;
use crate::domain::renderer::{DomainConfig, render_short_url};
use crate::domain::resolver::{DomainResolver, SimpleDomainResolver};
use crate::utils::code_generator::{DEFAULT_SHORT_CODE_LENGTH, generate_short_code};

/// Storage lifecycle of a short URL.
///
/// Set to `Persisted` by the store once a row exists. The short code may only
/// change while the short URL is still a `Draft`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Lifecycle {
    #[default]
    Draft,
    Persisted { id: i64 },
}

/// Where an imported short URL came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportProvenance {
    pub source: String,
    pub original_short_code: String,
}

/// Every stored field of a short URL, used by stores to rebuild the aggregate.
#[derive(Debug, Clone)]
pub struct ShortUrlParts {
    pub id: i64,
    pub long_url: String,
    pub short_code: String,
    pub short_code_length: usize,
    pub domain: Option<Domain>,
    pub date_created: DateTime<Utc>,
    pub valid_since: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub max_visits: Option<u32>,
    pub visit_count: u64,
    pub tags: Vec<String>,
    pub custom_slug_provided: bool,
    pub import: Option<ImportProvenance>,
}

/// A long URL reachable through a short code, optionally scoped to a domain.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortUrl {
    lifecycle: Lifecycle,
    long_url: String,
    short_code: String,
    short_code_length: usize,
    domain: Option<Domain>,
    date_created: DateTime<Utc>,
    valid_since: Option<DateTime<Utc>>,
    valid_until: Option<DateTime<Utc>>,
    max_visits: Option<u32>,
    visit_count: u64,
    tags: BTreeSet<String>,
    custom_slug_provided: bool,
    import: Option<ImportProvenance>,
}

impl ShortUrl {
    /// Builds a new, unpersisted short URL.
    ///
    /// The custom slug, when present, becomes the short code verbatim.
    /// Otherwise a random code of `meta.short_code_length` characters is
    /// generated. The domain is resolved once, here.
    ///
    /// No validation happens at this level; see [`ShortUrlMeta::validate`].
    pub fn new(
        long_url: impl Into<String>,
        meta: ShortUrlMeta,
        domain_resolver: &dyn DomainResolver,
    ) -> Self {
        let short_code_length = meta.short_code_length.unwrap_or(DEFAULT_SHORT_CODE_LENGTH);
        let custom_slug_provided = meta.has_custom_slug();
        let short_code = meta
            .custom_slug
            .unwrap_or_else(|| generate_short_code(short_code_length));

        Self {
            lifecycle: Lifecycle::Draft,
            long_url: long_url.into(),
            short_code,
            short_code_length,
            domain: domain_resolver.resolve(meta.domain.as_deref()),
            date_created: Utc::now(),
            valid_since: meta.valid_since,
            valid_until: meta.valid_until,
            max_visits: meta.max_visits,
            visit_count: 0,
            tags: meta.tags.into_iter().collect(),
            custom_slug_provided,
            import: None,
        }
    }

    /// Shorthand for a short URL without metadata or domain.
    pub fn with_long_url(long_url: impl Into<String>) -> Self {
        Self::new(long_url, ShortUrlMeta::empty(), &SimpleDomainResolver)
    }

    /// Translates an imported record into a new, unpersisted short URL.
    ///
    /// With `import_short_code` the original code is kept as a custom slug;
    /// the import provenance still allows it to be regenerated if it clashes.
    /// The creation date is the one from the source system.
    pub fn from_import(
        record: ImportedShortUrl,
        import_short_code: bool,
        short_code_length: usize,
        domain_resolver: &dyn DomainResolver,
    ) -> Self {
        let meta = ShortUrlMeta {
            domain: record.domain,
            custom_slug: import_short_code.then(|| record.short_code.clone()),
            short_code_length: Some(short_code_length),
            valid_since: record.valid_since,
            valid_until: record.valid_until,
            max_visits: record.max_visits,
            tags: record.tags,
            validate_url: false,
        };

        let mut instance = Self::new(record.long_url, meta, domain_resolver);
        instance.import = Some(ImportProvenance {
            source: record.source,
            original_short_code: record.short_code,
        });
        instance.date_created = record.created_at;
        instance
    }

    /// Rebuilds a stored short URL.
    pub fn from_parts(parts: ShortUrlParts) -> Self {
        Self {
            lifecycle: Lifecycle::Persisted { id: parts.id },
            long_url: parts.long_url,
            short_code: parts.short_code,
            short_code_length: parts.short_code_length,
            domain: parts.domain,
            date_created: parts.date_created,
            valid_since: parts.valid_since,
            valid_until: parts.valid_until,
            max_visits: parts.max_visits,
            visit_count: parts.visit_count,
            tags: parts.tags.into_iter().collect(),
            custom_slug_provided: parts.custom_slug_provided,
            import: parts.import,
        }
    }

    /// Called by the store after the row was written.
    pub fn mark_persisted(&mut self, id: i64) {
        self.lifecycle = Lifecycle::Persisted { id };
    }

    /// Replaces the domain handle with the stored one (same authority, with id).
    pub fn attach_domain(&mut self, domain: Domain) {
        self.domain = Some(domain);
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn id(&self) -> Option<i64> {
        match self.lifecycle {
            Lifecycle::Persisted { id } => Some(id),
            Lifecycle::Draft => None,
        }
    }

    pub fn is_persisted(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Persisted { .. })
    }

    pub fn long_url(&self) -> &str {
        &self.long_url
    }

    pub fn short_code(&self) -> &str {
        &self.short_code
    }

    pub fn short_code_length(&self) -> usize {
        self.short_code_length
    }

    pub fn domain(&self) -> Option<&Domain> {
        self.domain.as_ref()
    }

    pub fn authority(&self) -> Option<&str> {
        self.domain.as_ref().map(Domain::authority)
    }

    pub fn date_created(&self) -> DateTime<Utc> {
        self.date_created
    }

    pub fn valid_since(&self) -> Option<DateTime<Utc>> {
        self.valid_since
    }

    pub fn valid_until(&self) -> Option<DateTime<Utc>> {
        self.valid_until
    }

    pub fn max_visits(&self) -> Option<u32> {
        self.max_visits
    }

    pub fn visit_count(&self) -> u64 {
        self.visit_count
    }

    /// Overwrites the visit counter with the value read from the visit store.
    pub fn set_visit_count(&mut self, visit_count: u64) {
        self.visit_count = visit_count;
    }

    pub fn custom_slug_provided(&self) -> bool {
        self.custom_slug_provided
    }

    pub fn import_provenance(&self) -> Option<&ImportProvenance> {
        self.import.as_ref()
    }

    pub fn import_source(&self) -> Option<&str> {
        self.import.as_ref().map(|i| i.source.as_str())
    }

    pub fn import_original_short_code(&self) -> Option<&str> {
        self.import.as_ref().map(|i| i.original_short_code.as_str())
    }

    pub fn is_imported(&self) -> bool {
        self.import.is_some()
    }

    /// Tags in lexical order.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    pub fn tag_count(&self) -> usize {
        self.tags.len()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Adds a tag; returns `false` when it was already present.
    pub fn add_tag(&mut self, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        let tag = tag.trim();
        if tag.is_empty() {
            return false;
        }
        self.tags.insert(tag.to_string())
    }

    pub fn replace_tags<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.clear();
        for tag in tags {
            self.add_tag(tag);
        }
    }

    /// Applies a sparse patch. Present fields are overwritten, including
    /// explicit clears; absent fields are left alone.
    pub fn update(&mut self, edit: ShortUrlEdit) {
        edit.valid_since.apply_to(&mut self.valid_since);
        edit.valid_until.apply_to(&mut self.valid_until);
        edit.max_visits.apply_to(&mut self.max_visits);
        if let Some(long_url) = edit.long_url {
            self.long_url = long_url;
        }
    }

    /// Replaces the short code with a freshly generated one.
    ///
    /// # Errors
    ///
    /// Fails when a custom slug was provided for a short URL that was not
    /// imported, or when the short URL has already been persisted.
    pub fn regenerate_short_code(&mut self) -> Result<(), ShortCodeCannotBeRegenerated> {
        if self.custom_slug_provided && self.import.is_none() {
            return Err(ShortCodeCannotBeRegenerated::for_custom_slug());
        }

        if self.is_persisted() {
            return Err(ShortCodeCannotBeRegenerated::for_already_persisted());
        }

        self.short_code = generate_short_code(self.short_code_length);
        Ok(())
    }

    /// See [`enablement::is_enabled`].
    pub fn is_enabled(&self, now: DateTime<Utc>) -> bool {
        enablement::is_enabled(self, now)
    }

    /// See [`render_short_url`].
    pub fn to_url_string(&self, config: &DomainConfig) -> String {
        render_short_url(self, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Patch;
    use crate::domain::errors::RegenerationBlocked;
    use crate::utils::code_generator::ALPHABET;
    use chrono::{Duration, TimeZone};

    fn imported(short_code: &str) -> ImportedShortUrl {
        ImportedShortUrl {
            source: "csv".to_string(),
            long_url: "https://example.com/imported".to_string(),
            short_code: short_code.to_string(),
            domain: Some("s.example.com".to_string()),
            created_at: Utc.with_ymd_and_hms(2019, 5, 1, 12, 0, 0).unwrap(),
            tags: vec!["foo".to_string(), "bar".to_string(), "foo".to_string()],
            valid_since: None,
            valid_until: None,
            max_visits: None,
        }
    }

    fn parts(custom_slug_provided: bool) -> ShortUrlParts {
        ShortUrlParts {
            id: 10,
            long_url: "https://example.com".to_string(),
            short_code: "abc12".to_string(),
            short_code_length: 5,
            domain: None,
            date_created: Utc::now(),
            valid_since: None,
            valid_until: None,
            max_visits: None,
            visit_count: 3,
            tags: vec![],
            custom_slug_provided,
            import: None,
        }
    }

    #[test]
    fn test_new_generates_code_of_requested_length() {
        let short_url = ShortUrl::new(
            "https://example.com",
            ShortUrlMeta {
                short_code_length: Some(8),
                ..ShortUrlMeta::empty()
            },
            &SimpleDomainResolver,
        );

        assert_eq!(short_url.short_code().len(), 8);
        assert!(short_url.short_code().bytes().all(|b| ALPHABET.contains(&b)));
        assert!(!short_url.custom_slug_provided());
        assert_eq!(short_url.lifecycle(), Lifecycle::Draft);
        assert!(short_url.id().is_none());
        assert_eq!(short_url.visit_count(), 0);
    }

    #[test]
    fn test_new_uses_default_length() {
        let short_url = ShortUrl::with_long_url("https://example.com");

        assert_eq!(short_url.short_code().len(), DEFAULT_SHORT_CODE_LENGTH);
        assert!(short_url.domain().is_none());
    }

    #[test]
    fn test_new_with_custom_slug() {
        let short_url = ShortUrl::new(
            "https://example.com",
            ShortUrlMeta {
                custom_slug: Some("promo".to_string()),
                ..ShortUrlMeta::empty()
            },
            &SimpleDomainResolver,
        );

        assert_eq!(short_url.short_code(), "promo");
        assert!(short_url.custom_slug_provided());
    }

    #[test]
    fn test_new_resolves_domain() {
        let short_url = ShortUrl::new(
            "https://example.com",
            ShortUrlMeta {
                domain: Some("s.example.com".to_string()),
                ..ShortUrlMeta::empty()
            },
            &SimpleDomainResolver,
        );

        assert_eq!(short_url.authority(), Some("s.example.com"));
    }

    #[test]
    fn test_new_deduplicates_tags() {
        let short_url = ShortUrl::new(
            "https://example.com",
            ShortUrlMeta {
                tags: vec!["b".into(), "a".into(), "b".into()],
                ..ShortUrlMeta::empty()
            },
            &SimpleDomainResolver,
        );

        assert_eq!(short_url.tags().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_regenerate_draft_without_custom_slug() {
        let mut short_url = ShortUrl::with_long_url("https://example.com");
        let first = short_url.short_code().to_string();

        let mut changed = false;
        for _ in 0..5 {
            short_url.regenerate_short_code().unwrap();
            changed |= short_url.short_code() != first;
        }

        assert!(changed);
        assert_eq!(short_url.short_code().len(), first.len());
    }

    #[test]
    fn test_regenerate_persisted_fails() {
        let mut short_url = ShortUrl::from_parts(parts(false));

        let err = short_url.regenerate_short_code().unwrap_err();

        assert_eq!(err.reason, RegenerationBlocked::AlreadyPersisted);
        assert_eq!(short_url.short_code(), "abc12");
    }

    #[test]
    fn test_regenerate_after_mark_persisted_fails() {
        let mut short_url = ShortUrl::with_long_url("https://example.com");
        short_url.mark_persisted(1);

        let err = short_url.regenerate_short_code().unwrap_err();

        assert_eq!(err.reason, RegenerationBlocked::AlreadyPersisted);
    }

    #[test]
    fn test_regenerate_custom_slug_fails() {
        let mut short_url = ShortUrl::new(
            "https://example.com",
            ShortUrlMeta {
                custom_slug: Some("promo".to_string()),
                ..ShortUrlMeta::empty()
            },
            &SimpleDomainResolver,
        );

        let err = short_url.regenerate_short_code().unwrap_err();

        assert_eq!(err.reason, RegenerationBlocked::CustomSlug);
        assert_eq!(short_url.short_code(), "promo");
    }

    #[test]
    fn test_regenerate_imported_custom_slug_succeeds() {
        let mut short_url =
            ShortUrl::from_import(imported("promo"), true, 6, &SimpleDomainResolver);
        assert!(short_url.custom_slug_provided());

        short_url.regenerate_short_code().unwrap();

        assert_ne!(short_url.short_code(), "promo");
        assert_eq!(short_url.short_code().len(), 6);
        assert_eq!(short_url.import_original_short_code(), Some("promo"));
    }

    #[test]
    fn test_from_import_keeps_provenance_and_date() {
        let record = imported("xyz");
        let created_at = record.created_at;

        let short_url = ShortUrl::from_import(record, true, 5, &SimpleDomainResolver);

        assert_eq!(short_url.short_code(), "xyz");
        assert_eq!(short_url.date_created(), created_at);
        assert_eq!(short_url.import_source(), Some("csv"));
        assert_eq!(short_url.import_original_short_code(), Some("xyz"));
        assert_eq!(short_url.authority(), Some("s.example.com"));
        assert_eq!(short_url.long_url(), "https://example.com/imported");
        assert_eq!(short_url.tag_count(), 2);
    }

    #[test]
    fn test_from_import_without_short_code_generates_one() {
        let short_url = ShortUrl::from_import(imported("xyz"), false, 7, &SimpleDomainResolver);

        assert_ne!(short_url.short_code(), "xyz");
        assert_eq!(short_url.short_code().len(), 7);
        assert!(!short_url.custom_slug_provided());
        assert_eq!(short_url.import_original_short_code(), Some("xyz"));
    }

    #[test]
    fn test_update_only_max_visits() {
        let now = Utc::now();
        let mut short_url = ShortUrl::new(
            "https://example.com",
            ShortUrlMeta {
                valid_since: Some(now),
                valid_until: Some(now + Duration::days(1)),
                ..ShortUrlMeta::empty()
            },
            &SimpleDomainResolver,
        );

        short_url.update(ShortUrlEdit {
            max_visits: Patch::Set(10),
            ..Default::default()
        });

        assert_eq!(short_url.max_visits(), Some(10));
        assert_eq!(short_url.long_url(), "https://example.com");
        assert_eq!(short_url.valid_since(), Some(now));
        assert_eq!(short_url.valid_until(), Some(now + Duration::days(1)));
    }

    #[test]
    fn test_update_clears_valid_until() {
        let now = Utc::now();
        let mut short_url = ShortUrl::new(
            "https://example.com",
            ShortUrlMeta {
                valid_until: Some(now),
                max_visits: Some(3),
                ..ShortUrlMeta::empty()
            },
            &SimpleDomainResolver,
        );

        short_url.update(ShortUrlEdit {
            valid_until: Patch::Clear,
            long_url: Some("https://example.org".to_string()),
            ..Default::default()
        });

        assert!(short_url.valid_until().is_none());
        assert_eq!(short_url.max_visits(), Some(3));
        assert_eq!(short_url.long_url(), "https://example.org");
    }

    #[test]
    fn test_tags_behave_as_set() {
        let mut short_url = ShortUrl::with_long_url("https://example.com");

        assert!(short_url.add_tag("rust"));
        assert!(!short_url.add_tag("rust"));
        assert!(!short_url.add_tag("  "));
        assert!(short_url.has_tag("rust"));

        short_url.replace_tags(["a", "b"]);

        assert_eq!(short_url.tag_count(), 2);
        assert!(!short_url.has_tag("rust"));
    }

    #[test]
    fn test_from_parts_is_persisted() {
        let short_url = ShortUrl::from_parts(parts(true));

        assert_eq!(short_url.id(), Some(10));
        assert_eq!(short_url.visit_count(), 3);
        assert!(short_url.custom_slug_provided());
        assert!(!short_url.is_imported());
    }
}
