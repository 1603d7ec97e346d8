//! Public URL composition.

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde::Deserialize;

use crate::domain::entities::ShortUrl;

/// Default scheme/host used when a short URL has no domain of its own.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DomainConfig {
    pub schema: Option<String>,
    pub hostname: Option<String>,
}

impl DomainConfig {
    pub fn new(schema: impl Into<String>, hostname: impl Into<String>) -> Self {
        Self {
            schema: Some(schema.into()),
            hostname: Some(hostname.into()),
        }
    }

    pub fn schema(&self) -> &str {
        self.schema.as_deref().unwrap_or("http")
    }

    pub fn hostname(&self) -> &str {
        self.hostname.as_deref().unwrap_or("")
    }
}

/// Escaped in the code's path segment. `%`, `/` and `\` are included so the
/// segment decodes back to exactly the stored code.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Percent-encodes `short_code` as one path segment, leading slash included.
fn encode_path_segment(short_code: &str) -> String {
    format!("/{}", utf8_percent_encode(short_code, PATH_SEGMENT))
}

/// Renders `scheme://authority/short_code` for `short_url`.
///
/// The authority is the short URL's own domain when it has one, otherwise
/// the configured hostname.
pub fn render_short_url(short_url: &ShortUrl, config: &DomainConfig) -> String {
    let authority = short_url
        .domain()
        .map(|d| d.authority())
        .unwrap_or_else(|| config.hostname());

    format!(
        "{}://{}{}",
        config.schema(),
        authority,
        encode_path_segment(short_url.short_code())
    )
}
