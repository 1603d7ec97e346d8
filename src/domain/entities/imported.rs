//! Short URLs coming from an external source.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A short URL exported by another system, as read from an import file.
///
/// `source` names the system it came from (e.g. `"bitly"`, `"csv"`) and,
/// together with `short_code` and `domain`, identifies the record across
/// repeated imports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedShortUrl {
    pub source: String,
    pub long_url: String,
    pub short_code: String,
    #[serde(default)]
    pub domain: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub valid_since: Option<DateTime<Utc>>,
    #[serde(default)]
    pub valid_until: Option<DateTime<Utc>>,
    #[serde(default)]
    pub max_visits: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal_record() {
        let record: ImportedShortUrl = serde_json::from_str(
            r#"{
                "source": "csv",
                "longUrl": "https://example.com/a",
                "shortCode": "abc",
                "createdAt": "2020-01-02T03:04:05Z"
            }"#,
        )
        .unwrap();

        assert_eq!(record.source, "csv");
        assert_eq!(record.short_code, "abc");
        assert!(record.domain.is_none());
        assert!(record.tags.is_empty());
        assert_eq!(record.created_at.to_rfc3339(), "2020-01-02T03:04:05+00:00");
    }
}
