//! Decides whether a short URL may still redirect.

use chrono::{DateTime, Utc};

use crate::domain::entities::ShortUrl;

/// Returns `true` when `short_url` may redirect at `now`.
///
/// A short URL is disabled once its visit quota is used up, before its
/// `valid_since` or after its `valid_until`. The three checks are independent,
/// so the result is their conjunction regardless of evaluation order.
pub fn is_enabled(short_url: &ShortUrl, now: DateTime<Utc>) -> bool {
    let max_visits_reached = short_url
        .max_visits()
        .is_some_and(|max| short_url.visit_count() >= u64::from(max));
    if max_visits_reached {
        return false;
    }

    let before_valid_since = short_url.valid_since().is_some_and(|since| since > now);
    if before_valid_since {
        return false;
    }

    let after_valid_until = short_url.valid_until().is_some_and(|until| until < now);
    !after_valid_until
}
