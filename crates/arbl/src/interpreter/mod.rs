//! Locale resolution, plural rules and message rendering.
//!
//! This module takes parsed messages and resource bundles and produces
//! formatted strings. It resolves the bundle for a locale along a fallback
//! chain, selects plural and select cases, caches parsed templates and
//! reloads bundles when their files change.

mod cache;
mod config;
mod context;
mod error;
mod evaluator;
pub mod lint;
mod localizations;
mod observers;
pub mod plural;
mod resolver;
mod watcher;

pub use cache::{CacheStats, PatternCache};
pub use config::L10nConfig;
pub use context::RenderContext;
pub use error::{
    L10nError, LoadError, RenderError, ResolveError, TranslateError, WatchError,
    compute_suggestions,
};
pub use evaluator::render;
pub use lint::{BundleWarning, CoverageReport, LocaleCoverage, TemplateIssue};
pub use localizations::Localizations;
pub use observers::{ChangeCause, LocaleChange, ObserverRegistry, Subscription};
pub use plural::{plural_categories, plural_category};
pub use resolver::{LoadReport, LocaleResolver};
pub use watcher::{Debouncer, HotReloadWatcher};
