//! The user-facing localization handle.
//!
//! [`Localizations`] ties the resolver, the pattern cache, locale-change
//! observers and the optional hot-reload watcher together behind one
//! cheaply clonable, thread-safe handle.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::bundle::BundleError;
use crate::interpreter::cache::{CacheStats, PatternCache};
use crate::interpreter::config::L10nConfig;
use crate::interpreter::error::{
    L10nError, LoadError, TranslateError, WatchError, compute_suggestions,
};
use crate::interpreter::lint::{
    self, BundleWarning, CoverageReport, TemplateIssue,
};
use crate::interpreter::observers::{ChangeCause, LocaleChange, ObserverRegistry, Subscription};
use crate::interpreter::resolver::{LoadReport, LocaleResolver};
use crate::interpreter::watcher::HotReloadWatcher;
use crate::interpreter::{RenderContext, render};
use crate::parser::Message;
use crate::types::{Args, LocaleError, LocaleId, Value};

struct Shared {
    resolver: RwLock<LocaleResolver>,
    cache: PatternCache,
    observers: ObserverRegistry,
    last_report: Mutex<Arc<LoadReport>>,
    watcher: Mutex<Option<HotReloadWatcher>>,
    arb_dir: Option<PathBuf>,
    debounce: Duration,
}

/// Loaded translations plus the current locale.
///
/// Clones share the same state. All methods take `&self`; the handle is
/// `Send + Sync` and can be used from any thread.
///
/// # Example
///
/// ```
/// use arbl::{L10nConfig, LocaleId, Localizations, args};
///
/// let l10n = Localizations::in_memory(L10nConfig::default()).unwrap();
/// l10n.load_str(
///     r#"{"@@locale": "en", "items": "{count, plural, =0{No items} one{One item} other{{count} items}}"}"#,
///     None,
/// )
/// .unwrap();
///
/// assert_eq!(l10n.translate("items", &args! { "count" => 0 }).unwrap(), "No items");
/// assert_eq!(l10n.plural("items", 3, &args! {}).unwrap(), "3 items");
/// ```
#[derive(Clone)]
pub struct Localizations {
    shared: Arc<Shared>,
}

impl Localizations {
    /// Open a handle, loading `arb_dir` when configured and starting the
    /// watcher when `hot_reload` is set.
    ///
    /// Files that fail to load are skipped and listed in
    /// [`Localizations::last_load_report`].
    ///
    /// # Errors
    ///
    /// Returns an error if a configured locale tag is invalid, the
    /// directory cannot be read, or the watcher cannot start.
    pub fn open(config: L10nConfig) -> Result<Self, L10nError> {
        let l10n = Self::in_memory(config.clone())?;
        if let Some(directory) = &config.arb_dir {
            let report = l10n.write().load(directory)?;
            l10n.store_report(report);
        }
        if config.hot_reload {
            l10n.enable_hot_reload()?;
        }
        Ok(l10n)
    }

    /// Create a handle with no bundles loaded and no directory read.
    ///
    /// The starting locale is resolved by [`L10nConfig::startup_locale`]
    /// against the system locale.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured locale tag is invalid.
    pub fn in_memory(config: L10nConfig) -> Result<Self, LocaleError> {
        let default_locale = config.startup_locale(sys_locale::get_locale)?;
        let fallback_locale = LocaleId::parse(config.fallback_locale())?;
        let mut resolver = LocaleResolver::new(default_locale, fallback_locale);
        if !config.supported_locales.is_empty() {
            let supported = config
                .supported_locales
                .iter()
                .map(|tag| LocaleId::parse(tag))
                .collect::<Result<Vec<_>, _>>()?;
            resolver = resolver.with_supported_locales(supported);
        }

        Ok(Self {
            shared: Arc::new(Shared {
                resolver: RwLock::new(resolver),
                cache: PatternCache::new(config.cache_capacity),
                observers: ObserverRegistry::new(),
                last_report: Mutex::new(Arc::new(LoadReport::default())),
                watcher: Mutex::new(None),
                debounce: config.debounce(),
                arb_dir: config.arb_dir,
            }),
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, LocaleResolver> {
        self.shared
            .resolver
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, LocaleResolver> {
        self.shared
            .resolver
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn store_report(&self, report: LoadReport) -> Arc<LoadReport> {
        let report = Arc::new(report);
        *self
            .shared
            .last_report
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Arc::clone(&report);
        report
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Add a bundle from ARB text, replacing any bundle for its locale.
    ///
    /// The locale comes from `@@locale`, else from `locale_hint`.
    pub fn load_str(
        &self,
        content: &str,
        locale_hint: Option<&LocaleId>,
    ) -> Result<LocaleId, BundleError> {
        let locale = self.write().load_str(content, locale_hint)?;
        self.shared.cache.invalidate(&locale);
        debug!(locale = %locale, "loaded bundle from string");
        Ok(locale)
    }

    /// Reload every bundle from the directory and clear the cache.
    ///
    /// Without a directory this is a no-op returning an empty report.
    pub fn reload(&self) -> Result<Arc<LoadReport>, LoadError> {
        let (report, locale, directory) = {
            let mut resolver = self.write();
            let Some(directory) = resolver.directory().map(Path::to_path_buf) else {
                return Ok(Arc::new(LoadReport::default()));
            };
            let report = resolver.load(&directory)?;
            (report, resolver.current_locale().clone(), directory)
        };
        self.shared.cache.invalidate_all();
        let report = self.store_report(report);
        info!(directory = %directory.display(), locale = %locale, "reloaded all bundles");
        self.shared.observers.notify(&LocaleChange {
            locale,
            cause: ChangeCause::Reloaded { path: directory },
        });
        Ok(report)
    }

    /// Reload a single bundle file.
    ///
    /// Only the cache entries of the affected locale are invalidated.
    /// Returns the affected locale, or `None` when the path does not
    /// correspond to any bundle.
    pub fn reload_path(&self, path: &Path) -> Result<Option<LocaleId>, LoadError> {
        let (changed, current) = {
            let mut resolver = self.write();
            let changed = resolver.reload_path(path)?;
            (changed, resolver.current_locale().clone())
        };
        if let Some(locale) = &changed {
            self.shared.cache.invalidate(locale);
            info!(path = %path.display(), locale = %locale, "reloaded bundle");
            self.shared.observers.notify(&LocaleChange {
                locale: current,
                cause: ChangeCause::Reloaded {
                    path: path.to_path_buf(),
                },
            });
        }
        Ok(changed)
    }

    /// The report of the most recent directory load.
    pub fn last_load_report(&self) -> Arc<LoadReport> {
        Arc::clone(
            &self
                .shared
                .last_report
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }

    // =========================================================================
    // Translation
    // =========================================================================

    /// Render `key` in the current locale.
    ///
    /// # Errors
    ///
    /// Returns an error if no bundle on the fallback chain has the key, the
    /// template does not parse, or the arguments do not satisfy it.
    pub fn translate(&self, key: &str, args: &Args) -> Result<String, TranslateError> {
        let (locale, template) = self.lookup_template(key)?;
        let message = self.compile(&locale, key, &template)?;
        render_message(&message, &locale, key, args)
    }

    /// Render `key`, never failing.
    ///
    /// A missing key yields the key itself; a template that cannot be
    /// parsed or rendered yields the raw template. Both are logged.
    pub fn translate_or_key(&self, key: &str, args: &Args) -> String {
        let (locale, template) = match self.lookup_template(key) {
            Ok(found) => found,
            Err(error) => {
                warn!(key, %error, "translation unavailable, using key");
                return key.to_string();
            }
        };
        let rendered = self
            .compile(&locale, key, &template)
            .and_then(|message| render_message(&message, &locale, key, args));
        match rendered {
            Ok(text) => text,
            Err(error) => {
                warn!(key, locale = %locale, %error, "translation failed, using raw template");
                template
            }
        }
    }

    /// Render a plural message with `count` bound to its plural argument.
    ///
    /// When the template's top level is a single plural construct, `count`
    /// is bound to that construct's argument; otherwise it is bound to
    /// `count`. Other arguments come from `args`.
    pub fn plural(
        &self,
        key: &str,
        count: impl Into<Value>,
        args: &Args,
    ) -> Result<String, TranslateError> {
        let (locale, template) = self.lookup_template(key)?;
        let message = self.compile(&locale, key, &template)?;
        let name = message.root_plural_argument().unwrap_or("count").to_string();
        let mut args = args.clone();
        args.insert(name, count.into());
        render_message(&message, &locale, key, &args)
    }

    /// Whether `key` resolves for the current locale.
    pub fn has_key(&self, key: &str) -> bool {
        let resolver = self.read();
        resolver.lookup(resolver.current_locale(), key).is_some()
    }

    /// The unrendered template `key` resolves to in the current locale.
    pub fn raw_template(&self, key: &str) -> Option<String> {
        self.lookup_template(key).ok().map(|(_, template)| template)
    }

    /// Find the raw template for `key` and the locale of the bundle that
    /// supplied it.
    fn lookup_template(&self, key: &str) -> Result<(LocaleId, String), TranslateError> {
        let resolver = self.read();
        let locale = resolver.current_locale();
        if let Some((bundle, template)) = resolver.lookup(locale, key) {
            return Ok((bundle.locale().clone(), template.to_string()));
        }

        let bundle = resolver.resolve_bundle(locale)?;
        let available: Vec<&str> = bundle.keys().collect();
        Err(TranslateError::MissingKey {
            key: key.to_string(),
            locale: locale.clone(),
            suggestions: compute_suggestions(key, &available),
        })
    }

    fn compile(
        &self,
        locale: &LocaleId,
        key: &str,
        template: &str,
    ) -> Result<Arc<Message>, TranslateError> {
        self.shared
            .cache
            .get_or_compile(locale, key, template)
            .map_err(|source| TranslateError::Parse {
                key: key.to_string(),
                locale: locale.clone(),
                source,
            })
    }

    // =========================================================================
    // Locale State
    // =========================================================================

    /// Change the current locale and notify listeners.
    ///
    /// Any locale is accepted; lookups fall back when no bundle matches it.
    pub fn set_locale(&self, locale: LocaleId) {
        let previous = self.write().set_locale(locale.clone());
        info!(locale = %locale, previous = %previous, "locale changed");
        self.shared.observers.notify(&LocaleChange {
            locale,
            cause: ChangeCause::LocaleSet { previous },
        });
    }

    pub fn current_locale(&self) -> LocaleId {
        self.read().current_locale().clone()
    }

    pub fn default_locale(&self) -> LocaleId {
        self.read().default_locale().clone()
    }

    pub fn fallback_locale(&self) -> LocaleId {
        self.read().fallback_locale().clone()
    }

    /// Configured supported locales, or every loaded locale.
    pub fn supported_locales(&self) -> Vec<LocaleId> {
        self.read().supported_locales()
    }

    /// Keys of the bundle that serves the current locale.
    pub fn all_keys(&self) -> Vec<String> {
        let resolver = self.read();
        resolver
            .resolve_bundle(resolver.current_locale())
            .map(|bundle| bundle.keys().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Keys of the bundle loaded for exactly `locale`.
    pub fn keys_for(&self, locale: &LocaleId) -> Vec<String> {
        self.read().keys_for(locale)
    }

    // =========================================================================
    // Observers
    // =========================================================================

    /// Register a listener for locale changes and reloads.
    ///
    /// Listeners run after internal locks are released, so they may call
    /// back into this handle.
    pub fn on_locale_change(
        &self,
        listener: impl Fn(&LocaleChange) + Send + Sync + 'static,
    ) -> Subscription {
        self.shared.observers.subscribe(listener)
    }

    /// Remove a listener. Returns `false` if it was already removed.
    pub fn remove_locale_change_listener(&self, subscription: Subscription) -> bool {
        self.shared.observers.unsubscribe(subscription)
    }

    // =========================================================================
    // Hot Reload
    // =========================================================================

    /// Start watching the bundle directory, replacing any running watcher.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no directory or it cannot be watched.
    pub fn enable_hot_reload(&self) -> Result<(), WatchError> {
        let directory = self
            .read()
            .directory()
            .map(Path::to_path_buf)
            .or_else(|| self.shared.arb_dir.clone())
            .ok_or(WatchError::MissingDirectory { path: None })?;

        let weak: Weak<Shared> = Arc::downgrade(&self.shared);
        let watcher = HotReloadWatcher::spawn(&directory, self.shared.debounce, move |path| {
            if let Some(shared) = weak.upgrade() {
                Localizations { shared }.apply_file_change(path);
            }
        })?;

        let previous = self
            .shared
            .watcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(watcher);
        if let Some(mut previous) = previous {
            previous.stop();
        }
        Ok(())
    }

    /// Stop watching. Returns `false` if no watcher was running.
    ///
    /// No reload triggered by the watcher runs after this returns.
    pub fn disable_hot_reload(&self) -> bool {
        let watcher = self
            .shared
            .watcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match watcher {
            Some(mut watcher) => {
                watcher.stop();
                true
            }
            None => false,
        }
    }

    pub fn is_hot_reload_enabled(&self) -> bool {
        self.shared
            .watcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(HotReloadWatcher::is_running)
    }

    fn apply_file_change(&self, path: &Path) {
        match self.reload_path(path) {
            Ok(Some(_)) => {}
            Ok(None) => debug!(path = %path.display(), "change to unknown bundle ignored"),
            Err(error) => warn!(path = %path.display(), %error, "failed to reload bundle"),
        }
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    /// Parse every loaded template, returning the ones that fail.
    pub fn validate_templates(&self) -> Vec<TemplateIssue> {
        lint::validate_templates(self.read().bundles())
    }

    /// Lint every loaded bundle.
    pub fn lint(&self) -> Vec<BundleWarning> {
        self.read().bundles().flat_map(lint::lint_bundle).collect()
    }

    /// Translation coverage of each loaded locale.
    pub fn coverage(&self) -> CoverageReport {
        lint::coverage(self.read().bundles())
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.shared.cache.stats()
    }
}

fn render_message(
    message: &Message,
    locale: &LocaleId,
    key: &str,
    args: &Args,
) -> Result<String, TranslateError> {
    let mut ctx = RenderContext::new(args, key, locale);
    render(message, &mut ctx).map_err(|source| TranslateError::Render {
        locale: locale.clone(),
        source,
    })
}
