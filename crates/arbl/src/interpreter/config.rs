//! Configuration for [`Localizations`](crate::Localizations).

use std::path::PathBuf;
use std::time::Duration;

use bon::Builder;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::types::{LocaleError, LocaleId};

/// Settings used to open a [`Localizations`](crate::Localizations) handle.
///
/// Field names deserialize in kebab-case (`arb-dir`, `default-locale`, ...),
/// so a host can embed this in its own configuration file.
///
/// # Example
///
/// ```
/// use arbl::L10nConfig;
///
/// let config = L10nConfig::builder()
///     .arb_dir("l10n")
///     .default_locale("en")
///     .fallback_locale("en")
///     .build();
///
/// assert_eq!(config.cache_capacity, 256);
/// assert!(!config.hot_reload);
/// ```
#[derive(Debug, Clone, Builder, Deserialize)]
#[builder(on(String, into))]
#[serde(rename_all = "kebab-case", default)]
pub struct L10nConfig {
    /// Directory containing the `*.arb` files.
    #[builder(into)]
    pub arb_dir: Option<PathBuf>,

    /// Locale selected at startup. When unset, the system locale is used
    /// if `auto_detect_locale` is on, else the fallback locale.
    pub default_locale: Option<String>,

    /// Locale consulted when a key is missing. Defaults to `default_locale`,
    /// then to `en`.
    pub fallback_locale: Option<String>,

    /// Read the system locale when no `default_locale` is configured.
    #[builder(default = true)]
    pub auto_detect_locale: bool,

    /// When non-empty, only these locales are loaded from the directory.
    #[builder(default)]
    pub supported_locales: Vec<String>,

    /// Maximum number of parsed templates kept in the cache.
    #[builder(default = 256)]
    pub cache_capacity: usize,

    /// Start watching `arb_dir` on open.
    #[builder(default)]
    pub hot_reload: bool,

    /// Quiet period before a changed file is reloaded.
    #[builder(default = 200)]
    pub debounce_ms: u64,
}

impl Default for L10nConfig {
    fn default() -> Self {
        L10nConfig::builder().build()
    }
}

impl L10nConfig {
    /// The fallback locale tag: `fallback_locale`, else `default_locale`,
    /// else `en`.
    pub fn fallback_locale(&self) -> &str {
        self.fallback_locale
            .as_deref()
            .or(self.default_locale.as_deref())
            .unwrap_or("en")
    }

    /// The locale to start in.
    ///
    /// An explicit `default_locale` always wins and must be valid. Otherwise
    /// `detect` is consulted when auto-detection is on; a missing or
    /// unparseable system tag falls back to the fallback locale.
    pub fn startup_locale(
        &self,
        detect: impl FnOnce() -> Option<String>,
    ) -> Result<LocaleId, LocaleError> {
        if let Some(tag) = &self.default_locale {
            return LocaleId::parse(tag);
        }
        if self.auto_detect_locale {
            match detect().map(|tag| (LocaleId::parse(&tag), tag)) {
                Some((Ok(locale), _)) => {
                    debug!(locale = %locale, "detected system locale");
                    return Ok(locale);
                }
                Some((Err(_), tag)) => {
                    warn!(tag = %tag, "ignoring unparseable system locale");
                }
                None => debug!("no system locale detected"),
            }
        }
        LocaleId::parse(self.fallback_locale())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
