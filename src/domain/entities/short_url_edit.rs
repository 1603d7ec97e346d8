//! Sparse patch applied to an existing short URL.

use chrono::{DateTime, Utc};

/// A single nullable field in a patch.
///
/// Distinguishes "leave as is" from "clear" without relying on a
/// nullable-means-absent convention.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Patch<T> {
    #[default]
    Untouched,
    Clear,
    Set(T),
}

impl<T> Patch<T> {
    /// Whether the field was provided at all.
    pub fn is_present(&self) -> bool {
        !matches!(self, Self::Untouched)
    }

    /// Applies the patch to `target`.
    pub fn apply_to(self, target: &mut Option<T>) {
        match self {
            Self::Untouched => {}
            Self::Clear => *target = None,
            Self::Set(value) => *target = Some(value),
        }
    }
}

impl<T> From<Option<Option<T>>> for Patch<T> {
    /// Maps the serde double-option shape: absent, `null`, value.
    fn from(value: Option<Option<T>>) -> Self {
        match value {
            None => Self::Untouched,
            Some(None) => Self::Clear,
            Some(Some(v)) => Self::Set(v),
        }
    }
}

/// Partial update for a short URL.
///
/// Only present fields are written. Cross-field rules such as
/// `valid_since <= valid_until` are checked by whoever builds the edit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShortUrlEdit {
    pub long_url: Option<String>,
    pub valid_since: Patch<DateTime<Utc>>,
    pub valid_until: Patch<DateTime<Utc>>,
    pub max_visits: Patch<u32>,
}

impl ShortUrlEdit {
    pub fn has_long_url(&self) -> bool {
        self.long_url.is_some()
    }

    pub fn has_valid_since(&self) -> bool {
        self.valid_since.is_present()
    }

    pub fn has_valid_until(&self) -> bool {
        self.valid_until.is_present()
    }

    pub fn has_max_visits(&self) -> bool {
        self.max_visits.is_present()
    }

    /// Returns `true` when the edit would not change anything.
    pub fn is_empty(&self) -> bool {
        !(self.has_long_url()
            || self.has_valid_since()
            || self.has_valid_until()
            || self.has_max_visits())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_from_double_option() {
        assert_eq!(Patch::<u32>::from(None), Patch::Untouched);
        assert_eq!(Patch::<u32>::from(Some(None)), Patch::Clear);
        assert_eq!(Patch::from(Some(Some(3u32))), Patch::Set(3));
    }

    #[test]
    fn test_patch_apply() {
        let mut value = Some(5u32);

        Patch::Untouched.apply_to(&mut value);
        assert_eq!(value, Some(5));

        Patch::Set(9).apply_to(&mut value);
        assert_eq!(value, Some(9));

        Patch::Clear.apply_to(&mut value);
        assert_eq!(value, None);
    }

    #[test]
    fn test_default_edit_is_empty() {
        let edit = ShortUrlEdit::default();
        assert!(edit.is_empty());

        let edit = ShortUrlEdit {
            valid_until: Patch::Clear,
            ..Default::default()
        };
        assert!(!edit.is_empty());
        assert!(edit.has_valid_until());
        assert!(!edit.has_valid_since());
    }
}
