//! Error types for the arbl interpreter.

use std::io;
use std::path::PathBuf;

use strsim::levenshtein;
use thiserror::Error;

use crate::bundle::BundleError;
use crate::parser::ParseError;
use crate::types::{LocaleError, LocaleId};

/// Errors that occur while loading bundles from disk.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The bundle directory itself could not be read.
    #[error("failed to read directory '{path}': {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// File I/O error when reading a bundle file.
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file was read but is not a valid ARB document.
    #[error("{path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: BundleError,
    },

    /// Another file already provided this locale.
    #[error("{path}: locale '{locale}' is already provided by '{existing}'")]
    DuplicateLocale {
        path: PathBuf,
        locale: LocaleId,
        existing: PathBuf,
    },

    /// The locale is not in the configured supported set.
    #[error("{path}: locale '{locale}' is not a supported locale")]
    UnsupportedLocale { path: PathBuf, locale: LocaleId },
}

/// No bundle could be resolved because none are loaded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("no resource bundles are loaded")]
    NoResources,
}

/// An error that occurred while rendering a parsed message.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    /// A referenced argument was not supplied.
    #[error("missing argument '{name}' for '{key}'")]
    MissingArgument { name: String, key: String },

    /// A plural construct received a non-numeric argument.
    #[error("argument '{name}' for '{key}' must be a number, got '{value}'")]
    NotANumber {
        name: String,
        key: String,
        value: String,
    },

    /// Rendering nested deeper than the renderer allows.
    #[error("maximum nesting depth exceeded while rendering '{key}'")]
    NestingTooDeep { key: String },
}

/// An error returned by a translation request.
#[derive(Debug, Error)]
pub enum TranslateError {
    /// The key is not present in any bundle on the fallback chain.
    #[error("translation key '{key}' not found for locale '{locale}'{}", suggestion_hint(.suggestions))]
    MissingKey {
        key: String,
        locale: LocaleId,
        suggestions: Vec<String>,
    },

    /// The template stored for the key does not parse.
    #[error("template '{key}' in locale '{locale}' is invalid: {source}")]
    Parse {
        key: String,
        locale: LocaleId,
        #[source]
        source: ParseError,
    },

    /// The template parsed but could not be rendered with the given arguments.
    #[error("failed to render in locale '{locale}': {source}")]
    Render {
        locale: LocaleId,
        #[source]
        source: RenderError,
    },

    /// No bundles are loaded.
    #[error("no resource bundles are loaded")]
    NoResources,
}

impl From<ResolveError> for TranslateError {
    fn from(error: ResolveError) -> Self {
        match error {
            ResolveError::NoResources => TranslateError::NoResources,
        }
    }
}

/// Errors from the hot-reload watcher.
#[derive(Debug, Error)]
pub enum WatchError {
    /// There is no directory to watch.
    #[error("no bundle directory to watch{}", directory_hint(.path))]
    MissingDirectory { path: Option<PathBuf> },

    /// The platform notification backend failed.
    #[error(transparent)]
    Notify(#[from] notify::Error),

    /// The debounce thread could not be started.
    #[error("failed to start the hot reload thread: {0}")]
    Thread(#[source] io::Error),
}

/// Errors from opening a [`Localizations`](crate::Localizations) handle.
#[derive(Debug, Error)]
pub enum L10nError {
    /// A configured locale tag is invalid.
    #[error(transparent)]
    Locale(#[from] LocaleError),

    /// The bundle directory could not be read.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Hot reload was requested but could not be started.
    #[error(transparent)]
    Watch(#[from] WatchError),
}

fn suggestion_hint(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!("; did you mean: {}?", suggestions.join(", "))
    }
}

fn directory_hint(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|path| format!(": '{}'", path.display()))
        .unwrap_or_default()
}

/// Compute typo suggestions for a key from a list of available keys.
///
/// Allows an edit distance of 1 for keys of up to 3 characters and 2 for
/// longer keys, returning at most 3 suggestions sorted by distance.
pub fn compute_suggestions<S: AsRef<str>>(key: &str, available: &[S]) -> Vec<String> {
    let max_distance = if key.len() <= 3 { 1 } else { 2 };
    let mut suggestions: Vec<(usize, &str)> = available
        .iter()
        .map(AsRef::as_ref)
        .filter_map(|candidate| {
            let dist = levenshtein(key, candidate);
            (dist <= max_distance && dist > 0).then_some((dist, candidate))
        })
        .collect();

    suggestions.sort_by_key(|(dist, _)| *dist);
    suggestions
        .into_iter()
        .take(3)
        .map(|(_, s)| s.to_string())
        .collect()
}
