use std::fmt;
use std::str::FromStr;

use icu_locale_core::LanguageIdentifier;
use thiserror::Error;

/// Errors produced when a locale tag cannot be normalized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocaleError {
    /// The tag is empty or is not a well-formed BCP 47 language identifier.
    #[error("invalid locale tag '{tag}'")]
    InvalidTag { tag: String },
}

/// A normalized locale identifier such as `en`, `en-GB` or `pt-BR`.
///
/// Tags are case-normalized on ingestion (language lowercase, region
/// uppercase) and `_` separators are accepted as `-`. Two identifiers are
/// equal when their normalized strings are equal.
///
/// # Example
///
/// ```
/// use arbl::LocaleId;
///
/// let id = LocaleId::parse("PT_br").unwrap();
/// assert_eq!(id.as_str(), "pt-BR");
/// assert_eq!(id.language(), "pt");
/// assert_eq!(id.language_only().as_str(), "pt");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocaleId(String);

impl LocaleId {
    /// Parse and normalize a locale tag.
    pub fn parse(tag: &str) -> Result<Self, LocaleError> {
        let invalid = || LocaleError::InvalidTag {
            tag: tag.to_string(),
        };
        let trimmed = tag.trim();
        if trimmed.is_empty() {
            return Err(invalid());
        }
        let langid: LanguageIdentifier = trimmed.replace('_', "-").parse().map_err(|_| invalid())?;
        Ok(Self(langid.to_string()))
    }

    /// The normalized tag.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The language subtag (`en` for `en-GB`).
    pub fn language(&self) -> &str {
        self.0.split_once('-').map_or(self.0.as_str(), |(lang, _)| lang)
    }

    /// Whether the tag carries subtags beyond the language.
    pub fn has_region(&self) -> bool {
        self.0.contains('-')
    }

    /// This identifier with everything after the language subtag removed.
    pub fn language_only(&self) -> LocaleId {
        LocaleId(self.language().to_string())
    }
}

impl fmt::Display for LocaleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for LocaleId {
    type Err = LocaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for LocaleId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_separator() {
        assert_eq!(LocaleId::parse("en_us").unwrap().as_str(), "en-US");
        assert_eq!(LocaleId::parse("EN").unwrap().as_str(), "en");
        assert_eq!(LocaleId::parse(" fr-ca ").unwrap().as_str(), "fr-CA");
    }

    #[test]
    fn rejects_empty_and_malformed_tags() {
        assert!(LocaleId::parse("").is_err());
        assert!(LocaleId::parse("   ").is_err());
        assert!(LocaleId::parse("not a locale").is_err());
    }

    #[test]
    fn language_only_strips_region() {
        let id = LocaleId::parse("en-GB").unwrap();
        assert!(id.has_region());
        assert_eq!(id.language_only(), LocaleId::parse("en").unwrap());
        assert!(!id.language_only().has_region());
    }
}
