use std::collections::BTreeMap;

use serde::Deserialize;

/// Metadata attached to a translation entry by its `@key` object.
///
/// Unknown fields are ignored so that tool-specific annotations survive a
/// round trip through other editors.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EntryMetadata {
    /// Human-readable description for translators.
    #[serde(default)]
    pub description: Option<String>,

    /// Declared message kind (`text`, `plural`, `select`).
    #[serde(default, rename = "type")]
    pub kind: Option<String>,

    /// Declared placeholders, keyed by argument name. `None` when the
    /// metadata does not mention placeholders at all.
    #[serde(default)]
    pub placeholders: Option<BTreeMap<String, PlaceholderMetadata>>,
}

/// A declared placeholder inside [`EntryMetadata`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PlaceholderMetadata {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,

    #[serde(default)]
    pub example: Option<serde_json::Value>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub format: Option<String>,
}

impl EntryMetadata {
    /// Whether the metadata declares a placeholder with this name.
    pub fn declares(&self, name: &str) -> bool {
        self.placeholders
            .as_ref()
            .is_some_and(|placeholders| placeholders.contains_key(name))
    }
}
