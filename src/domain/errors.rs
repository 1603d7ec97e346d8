//! Errors raised by the short URL aggregate itself.

use std::fmt;

/// Why a short code regeneration was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegenerationBlocked {
    /// The code was supplied by the caller and the short URL was not imported.
    CustomSlug,
    /// The short URL already has a storage identity.
    AlreadyPersisted,
}

impl RegenerationBlocked {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CustomSlug => "custom_slug",
            Self::AlreadyPersisted => "already_persisted",
        }
    }
}

impl fmt::Display for RegenerationBlocked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CustomSlug => write!(f, "a custom slug was provided"),
            Self::AlreadyPersisted => write!(f, "the short URL has already been persisted"),
        }
    }
}

/// Returned by [`crate::domain::entities::ShortUrl::regenerate_short_code`].
///
/// Terminal for the call: retrying with the same short URL fails the same way.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("The short code cannot be regenerated because {reason}")]
pub struct ShortCodeCannotBeRegenerated {
    pub reason: RegenerationBlocked,
}

impl ShortCodeCannotBeRegenerated {
    pub fn new(reason: RegenerationBlocked) -> Self {
        Self { reason }
    }

    pub fn for_custom_slug() -> Self {
        Self::new(RegenerationBlocked::CustomSlug)
    }

    pub fn for_already_persisted() -> Self {
        Self::new(RegenerationBlocked::AlreadyPersisted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            ShortCodeCannotBeRegenerated::for_custom_slug().to_string(),
            "The short code cannot be regenerated because a custom slug was provided"
        );
        assert_eq!(
            ShortCodeCannotBeRegenerated::for_already_persisted().to_string(),
            "The short code cannot be regenerated because the short URL has already been persisted"
        );
    }
}
