//! ARB resource bundles.
//!
//! An ARB file is a JSON object. `@@locale` names the bundle's locale, other
//! `@@…` keys are global metadata, `@key` objects describe the entry `key`,
//! and every remaining key is a translation template.

mod filename;
mod metadata;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::types::{LocaleError, LocaleId};

pub use filename::locale_from_filename;
pub use metadata::{EntryMetadata, PlaceholderMetadata};

/// Errors produced while decoding a single ARB document.
#[derive(Debug, Error)]
pub enum BundleError {
    /// The content is not valid JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The top-level JSON value is not an object.
    #[error("ARB content must be a JSON object")]
    NotAnObject,

    /// A translation entry is not a string.
    #[error("translation value for '{key}' must be a string")]
    InvalidEntry { key: String },

    /// An `@key` metadata block is not a well-formed object.
    #[error("metadata for '{key}' is invalid: {reason}")]
    InvalidMetadata { key: String, reason: String },

    /// Neither `@@locale` nor the file name identifies a locale.
    #[error("no locale: add an '@@locale' entry or a locale suffix to the file name")]
    NoLocale,

    /// `@@locale` is present but not a valid tag.
    #[error(transparent)]
    InvalidLocale(#[from] LocaleError),
}

/// A single translation entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    /// The raw message template.
    pub template: String,
    /// Metadata from the matching `@key` object, if any.
    pub metadata: Option<EntryMetadata>,
}

/// The decoded contents of one ARB file.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceBundle {
    locale: LocaleId,
    entries: BTreeMap<String, Entry>,
    orphan_metadata: Vec<String>,
    path: Option<PathBuf>,
    revision: u64,
}

impl ResourceBundle {
    /// Decode an ARB document.
    ///
    /// The locale comes from `@@locale` when present, otherwise from
    /// `locale_hint`. Metadata blocks whose entry does not exist are dropped
    /// and listed in [`ResourceBundle::orphan_metadata`].
    pub fn decode(content: &str, locale_hint: Option<&LocaleId>) -> Result<Self, BundleError> {
        let document: JsonValue = serde_json::from_str(content)?;
        let JsonValue::Object(object) = document else {
            return Err(BundleError::NotAnObject);
        };

        let mut locale = None;
        let mut templates = BTreeMap::new();
        let mut metadata = BTreeMap::new();

        for (key, value) in object {
            if let Some(global) = key.strip_prefix("@@") {
                if global == "locale" {
                    let JsonValue::String(tag) = value else {
                        return Err(BundleError::InvalidMetadata {
                            key: "@@locale".to_string(),
                            reason: "must be a string".to_string(),
                        });
                    };
                    locale = Some(LocaleId::parse(&tag)?);
                }
            } else if let Some(entry_key) = key.strip_prefix('@') {
                if !value.is_object() {
                    return Err(BundleError::InvalidMetadata {
                        key: entry_key.to_string(),
                        reason: format!("expected an object, got {}", json_kind(&value)),
                    });
                }
                let decoded: EntryMetadata =
                    serde_json::from_value(value).map_err(|e| BundleError::InvalidMetadata {
                        key: entry_key.to_string(),
                        reason: e.to_string(),
                    })?;
                metadata.insert(entry_key.to_string(), decoded);
            } else {
                let JsonValue::String(template) = value else {
                    return Err(BundleError::InvalidEntry { key });
                };
                templates.insert(key, template);
            }
        }

        let locale = match locale {
            Some(locale) => locale,
            None => locale_hint.cloned().ok_or(BundleError::NoLocale)?,
        };

        let mut entries = BTreeMap::new();
        for (key, template) in templates {
            let entry_metadata = metadata.remove(&key);
            entries.insert(
                key,
                Entry {
                    template,
                    metadata: entry_metadata,
                },
            );
        }
        let orphan_metadata: Vec<String> = metadata.into_keys().collect();

        Ok(Self {
            locale,
            entries,
            orphan_metadata,
            path: None,
            revision: 0,
        })
    }

    /// Record the file this bundle was decoded from.
    pub(crate) fn with_path(mut self, path: PathBuf) -> Self {
        self.path = Some(path);
        self
    }

    pub(crate) fn with_revision(mut self, revision: u64) -> Self {
        self.revision = revision;
        self
    }

    pub fn locale(&self) -> &LocaleId {
        &self.locale
    }

    /// The raw template for a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|entry| entry.template.as_str())
    }

    pub fn entry(&self, key: &str) -> Option<&Entry> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Translation keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Entries in key order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.entries.iter().map(|(key, entry)| (key.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys of `@key` metadata blocks that had no matching entry.
    pub fn orphan_metadata(&self) -> &[String] {
        &self.orphan_metadata
    }

    /// The file this bundle was loaded from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Incremented every time this locale is reloaded.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn en() -> LocaleId {
        LocaleId::parse("en").unwrap()
    }

    #[test]
    fn decodes_entries_and_metadata() {
        let bundle = ResourceBundle::decode(
            r#"{
                "@@locale": "en_US",
                "@@last_modified": "2024-01-01",
                "greeting": "Hello {name}",
                "@greeting": {
                    "description": "Shown on launch",
                    "placeholders": { "name": { "type": "String", "example": "Ada" } }
                },
                "farewell": "Bye"
            }"#,
            None,
        )
        .unwrap();

        assert_eq!(bundle.locale().as_str(), "en-US");
        assert_eq!(bundle.len(), 2);
        assert_eq!(bundle.get("greeting"), Some("Hello {name}"));
        let metadata = bundle.entry("greeting").unwrap().metadata.as_ref().unwrap();
        assert_eq!(metadata.description.as_deref(), Some("Shown on launch"));
        assert!(metadata.declares("name"));
        assert!(bundle.entry("farewell").unwrap().metadata.is_none());
        assert!(bundle.orphan_metadata().is_empty());
    }

    #[test]
    fn at_locale_wins_over_hint() {
        let bundle = ResourceBundle::decode(r#"{"@@locale": "fr", "a": "b"}"#, Some(&en())).unwrap();
        assert_eq!(bundle.locale().as_str(), "fr");
    }

    #[test]
    fn hint_used_without_at_locale() {
        let bundle = ResourceBundle::decode(r#"{"a": "b"}"#, Some(&en())).unwrap();
        assert_eq!(bundle.locale(), &en());
    }

    #[test]
    fn missing_locale_is_an_error() {
        let err = ResourceBundle::decode(r#"{"a": "b"}"#, None).unwrap_err();
        assert!(matches!(err, BundleError::NoLocale));
    }

    #[test]
    fn rejects_non_object_documents() {
        let err = ResourceBundle::decode("[1, 2]", Some(&en())).unwrap_err();
        assert!(matches!(err, BundleError::NotAnObject));
        let err = ResourceBundle::decode("{", Some(&en())).unwrap_err();
        assert!(matches!(err, BundleError::Json(_)));
    }

    #[test]
    fn rejects_non_string_entries() {
        let err = ResourceBundle::decode(r#"{"count": 3}"#, Some(&en())).unwrap_err();
        assert!(matches!(err, BundleError::InvalidEntry { key } if key == "count"));
    }

    #[test]
    fn rejects_non_object_metadata() {
        let err = ResourceBundle::decode(r#"{"a": "b", "@a": "oops"}"#, Some(&en())).unwrap_err();
        assert!(matches!(err, BundleError::InvalidMetadata { key, .. } if key == "a"));
    }

    #[test]
    fn orphan_metadata_is_dropped() {
        let bundle =
            ResourceBundle::decode(r#"{"a": "b", "@gone": {"description": "x"}}"#, Some(&en()))
                .unwrap();
        assert_eq!(bundle.orphan_metadata(), ["gone".to_string()]);
        assert!(bundle.entry("gone").is_none());
    }
}
