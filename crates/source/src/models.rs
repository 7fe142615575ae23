//! Document index models.
//!
//! Field names on the wire follow the published index format (`slug`, `link`,
//! `type`, `generatedAt`); the Rust names describe what the fields are for.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

/// Document kind that is never bulk-prefetched.
pub const SYSTEM_KIND: &str = "system";
/// Address suffix of documents eligible for bulk prefetch.
const MARKDOWN_SUFFIX: &str = ".md";

/// One entry of the remote document index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Unique, stable identifier (e.g. `blog/20250924-test`)
    #[serde(rename = "slug", alias = "key")]
    pub key: String,
    /// Display title
    pub title: String,
    /// Location of the raw document text. `None` when the record carries no
    /// usable address; such records load but cannot be fetched.
    #[serde(
        rename = "link",
        alias = "address",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Free-form classifier; [`SYSTEM_KIND`] documents are skipped by prefetch
    #[serde(
        rename = "type",
        alias = "kind",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<String>,
    /// Path of the document inside the content repository
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Index generation time, in milliseconds since the Unix epoch
    #[serde(
        rename = "generatedAt",
        default,
        deserialize_with = "lenient_millis",
        skip_serializing_if = "Option::is_none"
    )]
    pub generated_at: Option<i64>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Non-string entries are dropped; anything but an array reads as no tags.
    #[serde(default, deserialize_with = "lenient_tags", skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl DocumentMetadata {
    pub fn new(key: impl Into<String>, title: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            address: Some(address.into()),
            description: None,
            kind: None,
            path: None,
            generated_at: None,
            date: None,
            tags: Vec::new(),
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn with_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_system(&self) -> bool {
        self.kind.as_deref() == Some(SYSTEM_KIND)
    }

    /// Whether the raw address names a Markdown file. Case-sensitive, and
    /// checked before normalization.
    pub fn is_markdown(&self) -> bool {
        self.address.as_deref().is_some_and(|address| address.ends_with(MARKDOWN_SUFFIX))
    }

    /// Whether bulk prefetch should fetch this document.
    pub fn is_prefetchable(&self) -> bool {
        self.is_markdown() && !self.is_system()
    }

    /// Index generation time, if present and representable.
    pub fn generated_at(&self) -> Option<OffsetDateTime> {
        let nanos = i128::from(self.generated_at?) * 1_000_000;
        OffsetDateTime::from_unix_timestamp_nanos(nanos).ok()
    }
}

/// Parses an index body into its ordered records.
///
/// The body must be a JSON array; anything else is a
/// [`Format`](ErrorKind::Format) error. Record order is preserved. A record
/// only fails when `slug` or `title` is missing or not a string; optional
/// fields with an unexpected type read as absent.
pub fn parse_index(body: &[u8]) -> Result<Vec<DocumentMetadata>> {
    let value: Value =
        serde_json::from_slice(body).or_raise(|| ErrorKind::Format("body is not valid JSON".to_string()))?;
    let Value::Array(records) = value else {
        exn::bail!(ErrorKind::Format(format!("expected an array, found {}", json_type(&value))));
    };
    records
        .into_iter()
        .enumerate()
        .map(|(position, record)| {
            serde_json::from_value(record)
                .or_raise(|| ErrorKind::Format(format!("record {position} is not a document entry")))
        })
        .collect()
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

fn lenient_tags<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(tags) => tags
            .into_iter()
            .filter_map(|tag| match tag {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

fn lenient_millis<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<i64>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        // Generators emit `Date.now()`, which is integral, but floats happen.
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        _ => None,
    })
}
