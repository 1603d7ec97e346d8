//! Hosting domain identity.

/// A hosting authority (`host[:port]`) under which short codes are scoped.
///
/// Domains are value-like: two handles with the same authority denote the
/// same domain whether or not the store has assigned an id yet. Short URLs
/// hold a `Domain` as a handle only; the store owns the domain row.
#[derive(Debug, Clone, Eq)]
pub struct Domain {
    id: Option<i64>,
    authority: String,
}

impl Domain {
    /// Creates a domain handle that has not been stored yet.
    pub fn new(authority: impl Into<String>) -> Self {
        Self {
            id: None,
            authority: authority.into(),
        }
    }

    /// Creates a handle for a domain row loaded from storage.
    pub fn with_id(id: i64, authority: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            authority: authority.into(),
        }
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }
}

impl PartialEq for Domain {
    fn eq(&self, other: &Self) -> bool {
        self.authority == other.authority
    }
}

impl std::hash::Hash for Domain {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.authority.hash(state);
    }
}
