//! Locale resolution over loaded resource bundles.
//!
//! The resolver owns every loaded [`ResourceBundle`], the current locale and
//! the fallback configuration. Lookups walk a fallback chain so a key missing
//! in the requested locale is served from a more general one.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::mem;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::bundle::{BundleError, ResourceBundle, locale_from_filename};
use crate::interpreter::{LoadError, ResolveError};
use crate::types::LocaleId;

/// The outcome of loading a bundle directory.
///
/// Per-file failures never abort the rest of the directory; they are
/// collected here instead.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Locales loaded successfully, in load order.
    pub loaded: Vec<LocaleId>,
    /// Files that were skipped, with the reason.
    pub errors: Vec<LoadError>,
}

impl LoadReport {
    /// Whether every file loaded.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Holds loaded bundles and resolves locales and keys against them.
#[derive(Debug)]
pub struct LocaleResolver {
    default_locale: LocaleId,
    fallback_locale: LocaleId,
    current_locale: LocaleId,
    supported: Option<BTreeSet<LocaleId>>,
    bundles: BTreeMap<LocaleId, ResourceBundle>,
    load_order: Vec<LocaleId>,
    revisions: BTreeMap<LocaleId, u64>,
    directory: Option<PathBuf>,
}

impl LocaleResolver {
    /// Create an empty resolver. The current locale starts at the default.
    pub fn new(default_locale: LocaleId, fallback_locale: LocaleId) -> Self {
        Self {
            current_locale: default_locale.clone(),
            default_locale,
            fallback_locale,
            supported: None,
            bundles: BTreeMap::new(),
            load_order: Vec::new(),
            revisions: BTreeMap::new(),
            directory: None,
        }
    }

    /// Restrict directory loading to these locales.
    pub fn with_supported_locales(mut self, supported: impl IntoIterator<Item = LocaleId>) -> Self {
        self.supported = Some(supported.into_iter().collect());
        self
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Load every `*.arb` file in a directory, replacing all loaded bundles.
    ///
    /// Files are processed in file-name order. Only an unreadable directory
    /// fails the whole load.
    pub fn load(&mut self, directory: &Path) -> Result<LoadReport, LoadError> {
        let read_dir = fs::read_dir(directory).map_err(|source| LoadError::Directory {
            path: directory.to_path_buf(),
            source,
        })?;
        let mut paths: Vec<PathBuf> = read_dir
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| is_arb_file(path))
            .collect();
        paths.sort();

        self.bundles.clear();
        self.load_order.clear();
        self.directory = Some(directory.to_path_buf());

        let mut report = LoadReport::default();
        for path in paths {
            match self.load_file(&path) {
                Ok(locale) => report.loaded.push(locale),
                Err(error) => {
                    warn!(path = %path.display(), %error, "skipping bundle file");
                    report.errors.push(error);
                }
            }
        }

        info!(
            directory = %directory.display(),
            loaded = report.loaded.len(),
            skipped = report.errors.len(),
            "loaded resource bundles"
        );
        Ok(report)
    }

    /// Decode a bundle from a string. Replaces any bundle for the same locale.
    pub fn load_str(
        &mut self,
        content: &str,
        locale_hint: Option<&LocaleId>,
    ) -> Result<LocaleId, BundleError> {
        let bundle = ResourceBundle::decode(content, locale_hint)?;
        let locale = bundle.locale().clone();
        self.insert(bundle);
        Ok(locale)
    }

    /// Re-read a single bundle file.
    ///
    /// Returns the locale whose bundle changed, or `None` when the path is
    /// neither loaded nor present on disk. A deleted file removes its bundle.
    pub fn reload_path(&mut self, path: &Path) -> Result<Option<LocaleId>, LoadError> {
        let previous = self.locale_for_path(path);
        if !path.exists() {
            if let Some(locale) = &previous {
                info!(path = %path.display(), locale = %locale, "bundle file removed");
                self.remove(locale);
            }
            return Ok(previous);
        }

        let locale = self.load_file(path)?;
        if let Some(old) = previous.filter(|old| *old != locale) {
            self.remove(&old);
        }
        info!(path = %path.display(), locale = %locale, "reloaded bundle file");
        Ok(Some(locale))
    }

    fn load_file(&mut self, path: &Path) -> Result<LocaleId, LoadError> {
        let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let hint = locale_from_filename(path);
        let bundle = ResourceBundle::decode(&content, hint.as_ref()).map_err(|source| {
            LoadError::Decode {
                path: path.to_path_buf(),
                source,
            }
        })?;
        let locale = bundle.locale().clone();

        if self
            .supported
            .as_ref()
            .is_some_and(|supported| !supported.contains(&locale))
        {
            return Err(LoadError::UnsupportedLocale {
                path: path.to_path_buf(),
                locale,
            });
        }
        let existing = self.bundles.get(&locale).and_then(ResourceBundle::path);
        if let Some(existing) = existing.filter(|existing| !same_file(existing, path)) {
            return Err(LoadError::DuplicateLocale {
                path: path.to_path_buf(),
                locale,
                existing: existing.to_path_buf(),
            });
        }

        for orphan in bundle.orphan_metadata() {
            warn!(path = %path.display(), key = %orphan, "dropping metadata without an entry");
        }
        self.insert(bundle.with_path(path.to_path_buf()));
        Ok(locale)
    }

    fn insert(&mut self, bundle: ResourceBundle) {
        let locale = bundle.locale().clone();
        let revision = *self
            .revisions
            .entry(locale.clone())
            .and_modify(|revision| *revision += 1)
            .or_insert(0);
        debug!(locale = %locale, revision, entries = bundle.len(), "inserting bundle");
        let bundle = bundle.with_revision(revision);
        if !self.load_order.contains(&locale) {
            self.load_order.push(locale.clone());
        }
        self.bundles.insert(locale, bundle);
    }

    fn remove(&mut self, locale: &LocaleId) {
        self.bundles.remove(locale);
        self.load_order.retain(|loaded| loaded != locale);
        if let Some(revision) = self.revisions.get_mut(locale) {
            *revision += 1;
        }
    }

    fn locale_for_path(&self, path: &Path) -> Option<LocaleId> {
        self.load_order
            .iter()
            .find(|locale| {
                self.bundles
                    .get(*locale)
                    .and_then(ResourceBundle::path)
                    .is_some_and(|loaded| same_file(loaded, path))
            })
            .cloned()
    }

    // =========================================================================
    // Locale State
    // =========================================================================

    /// Change the current locale, returning the previous one.
    ///
    /// The locale is recorded even if no bundle matches it exactly; lookups
    /// apply the fallback chain.
    pub fn set_locale(&mut self, requested: LocaleId) -> LocaleId {
        mem::replace(&mut self.current_locale, requested)
    }

    pub fn current_locale(&self) -> &LocaleId {
        &self.current_locale
    }

    pub fn default_locale(&self) -> &LocaleId {
        &self.default_locale
    }

    pub fn fallback_locale(&self) -> &LocaleId {
        &self.fallback_locale
    }

    /// The configured supported locales, or every loaded locale (sorted)
    /// when none were configured.
    pub fn supported_locales(&self) -> Vec<LocaleId> {
        match &self.supported {
            Some(supported) => supported.iter().cloned().collect(),
            None => self.bundles.keys().cloned().collect(),
        }
    }

    /// The directory most recently loaded, if any.
    pub fn directory(&self) -> Option<&Path> {
        self.directory.as_deref()
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    /// Loaded locales to consult for `locale`, most specific first.
    ///
    /// The chain is: exact match, language only, fallback locale, fallback
    /// language only, then the first loaded bundle. Locales without a
    /// loaded bundle are skipped and duplicates removed.
    pub fn fallback_chain(&self, locale: &LocaleId) -> Vec<LocaleId> {
        let candidates = [
            Some(locale.clone()),
            locale.has_region().then(|| locale.language_only()),
            Some(self.fallback_locale.clone()),
            self.fallback_locale
                .has_region()
                .then(|| self.fallback_locale.language_only()),
            self.load_order.first().cloned(),
        ];
        let mut chain: Vec<LocaleId> = Vec::new();
        for candidate in candidates.into_iter().flatten() {
            if self.bundles.contains_key(&candidate) && !chain.contains(&candidate) {
                chain.push(candidate);
            }
        }
        chain
    }

    /// The bundle that serves `locale`.
    pub fn resolve_bundle(&self, locale: &LocaleId) -> Result<&ResourceBundle, ResolveError> {
        self.fallback_chain(locale)
            .first()
            .and_then(|resolved| self.bundles.get(resolved))
            .ok_or(ResolveError::NoResources)
    }

    /// Find a key along the fallback chain, returning the bundle that has it
    /// and the raw template.
    pub fn lookup(&self, locale: &LocaleId, key: &str) -> Option<(&ResourceBundle, &str)> {
        self.fallback_chain(locale).iter().find_map(|candidate| {
            let bundle = self.bundles.get(candidate)?;
            bundle.get(key).map(|template| (bundle, template))
        })
    }

    /// The bundle loaded for exactly this locale.
    pub fn bundle(&self, locale: &LocaleId) -> Option<&ResourceBundle> {
        self.bundles.get(locale)
    }

    /// All loaded bundles, in load order.
    pub fn bundles(&self) -> impl Iterator<Item = &ResourceBundle> {
        self.load_order
            .iter()
            .filter_map(|locale| self.bundles.get(locale))
    }

    /// Keys of the bundle loaded for exactly this locale.
    pub fn keys_for(&self, locale: &LocaleId) -> Vec<String> {
        self.bundles
            .get(locale)
            .map(|bundle| bundle.keys().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }
}

fn is_arb_file(path: &Path) -> bool {
    path.is_file() && path.extension().is_some_and(|ext| ext == "arb")
}

/// Compare paths, tolerating differences such as symlinked temp directories.
fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.file_name(), b.file_name()) {
        (Some(x), Some(y)) if x == y => {
            let parent = |p: &Path| p.parent().and_then(|dir| fs::canonicalize(dir).ok());
            matches!((parent(a), parent(b)), (Some(x), Some(y)) if x == y)
        }
        _ => false,
    }
}
