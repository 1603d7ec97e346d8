//! Mapping requested hosting authorities to [`Domain`] handles.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::domain::entities::Domain;

/// Resolves a raw authority string to a domain handle.
///
/// `None` or an empty string resolves to `None`, meaning "the default
/// domain", which the renderer fills in from configuration.
pub trait DomainResolver: Send + Sync {
    fn resolve(&self, authority: Option<&str>) -> Option<Domain>;
}

fn normalize(authority: Option<&str>) -> Option<String> {
    authority
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_ascii_lowercase)
}

/// Builds a fresh handle on every call and leaves deduplication to the store.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleDomainResolver;

impl DomainResolver for SimpleDomainResolver {
    fn resolve(&self, authority: Option<&str>) -> Option<Domain> {
        normalize(authority).map(Domain::new)
    }
}

/// Memoizes handles per authority for the lifetime of the process.
///
/// Handles learned from storage (with ids) can be seeded via [`Self::remember`]
/// so later resolutions carry the stored id.
#[derive(Debug, Default)]
pub struct CachingDomainResolver {
    known: RwLock<HashMap<String, Domain>>,
}

impl CachingDomainResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a domain, replacing any handle cached for the same authority.
    pub fn remember(&self, domain: Domain) {
        if let Ok(mut known) = self.known.write() {
            known.insert(domain.authority().to_string(), domain);
        }
    }

    pub fn len(&self) -> usize {
        self.known.read().map(|k| k.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DomainResolver for CachingDomainResolver {
    fn resolve(&self, authority: Option<&str>) -> Option<Domain> {
        let authority = normalize(authority)?;

        if let Ok(known) = self.known.read()
            && let Some(domain) = known.get(&authority)
        {
            return Some(domain.clone());
        }

        let domain = Domain::new(authority.clone());
        match self.known.write() {
            Ok(mut known) => Some(known.entry(authority).or_insert(domain).clone()),
            // A poisoned cache still resolves, it just stops memoizing.
            Err(_) => Some(domain),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_resolver_empty_input() {
        let resolver = SimpleDomainResolver;

        assert!(resolver.resolve(None).is_none());
        assert!(resolver.resolve(Some("")).is_none());
        assert!(resolver.resolve(Some("   ")).is_none());
    }

    #[test]
    fn test_simple_resolver_builds_handle() {
        let domain = SimpleDomainResolver.resolve(Some("S.Example.com")).unwrap();

        assert_eq!(domain.authority(), "s.example.com");
        assert!(domain.id().is_none());
    }

    #[test]
    fn test_caching_resolver_memoizes() {
        let resolver = CachingDomainResolver::new();

        let first = resolver.resolve(Some("s.example.com")).unwrap();
        let second = resolver.resolve(Some("s.example.com")).unwrap();

        assert_eq!(first, second);
        assert_eq!(resolver.len(), 1);
    }

    #[test]
    fn test_caching_resolver_uses_remembered_id() {
        let resolver = CachingDomainResolver::new();
        resolver.remember(Domain::with_id(42, "s.example.com"));

        let domain = resolver.resolve(Some("s.example.com")).unwrap();

        assert_eq!(domain.id(), Some(42));
    }

    #[test]
    fn test_resolvers_are_substitutable() {
        let resolvers: Vec<Box<dyn DomainResolver>> = vec![
            Box::new(SimpleDomainResolver),
            Box::new(CachingDomainResolver::new()),
        ];

        for resolver in resolvers {
            assert!(resolver.resolve(None).is_none());
            assert_eq!(
                resolver.resolve(Some("a.example.com")).unwrap().authority(),
                "a.example.com"
            );
        }
    }
}
