//! Validation and coverage over loaded bundles.
//!
//! Everything here works on the parsed resource model only; nothing is
//! rendered. Checks never stop at the first problem.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::bundle::{Entry, ResourceBundle};
use crate::interpreter::plural::plural_categories;
use crate::parser::ast::{Node, PluralSelector};
use crate::parser::{ParseError, parse_message};
use crate::types::{LocaleId, PluralCategory};

/// A template that failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{locale}/{key}: {error}")]
pub struct TemplateIssue {
    pub locale: LocaleId,
    pub key: String,
    pub error: ParseError,
}

/// A problem found by [`lint_bundle`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BundleWarning {
    /// The entry's template is empty or whitespace.
    #[error("{locale}/{key}: empty translation value")]
    EmptyValue { locale: LocaleId, key: String },

    /// The entry's template does not parse.
    #[error("{locale}/{key}: {error}")]
    InvalidTemplate {
        locale: LocaleId,
        key: String,
        error: ParseError,
    },

    /// The template uses an argument its metadata does not declare.
    #[error("{locale}/{key}: placeholder '{name}' is used but not declared in metadata")]
    UndeclaredPlaceholder {
        locale: LocaleId,
        key: String,
        name: String,
    },

    /// The metadata declares a placeholder the template never uses.
    #[error("{locale}/{key}: placeholder '{name}' is declared but never used")]
    UnusedPlaceholder {
        locale: LocaleId,
        key: String,
        name: String,
    },

    /// A plural case names a category the locale never produces.
    #[error("{locale}/{key}: plural case '{category}' can never be selected in this locale")]
    UnreachablePluralCase {
        locale: LocaleId,
        key: String,
        category: PluralCategory,
    },

    /// An `@key` metadata block had no matching entry and was dropped.
    #[error("{locale}: metadata '@{key}' has no matching entry")]
    OrphanMetadata { locale: LocaleId, key: String },
}

/// Parse every template of every bundle, collecting failures.
pub fn validate_templates<'a>(
    bundles: impl IntoIterator<Item = &'a ResourceBundle>,
) -> Vec<TemplateIssue> {
    let mut issues = Vec::new();
    for bundle in bundles {
        for (key, entry) in bundle.entries() {
            if let Err(error) = parse_message(&entry.template) {
                issues.push(TemplateIssue {
                    locale: bundle.locale().clone(),
                    key: key.to_string(),
                    error,
                });
            }
        }
    }
    issues
}

/// Run every lint rule over one bundle.
pub fn lint_bundle(bundle: &ResourceBundle) -> Vec<BundleWarning> {
    let mut warnings = Vec::new();
    let locale = bundle.locale();
    let categories = plural_categories(locale.as_str());

    for (key, entry) in bundle.entries() {
        lint_entry(locale, key, entry, &categories, &mut warnings);
    }
    for key in bundle.orphan_metadata() {
        warnings.push(BundleWarning::OrphanMetadata {
            locale: locale.clone(),
            key: key.clone(),
        });
    }
    warnings
}

fn lint_entry(
    locale: &LocaleId,
    key: &str,
    entry: &Entry,
    categories: &[PluralCategory],
    warnings: &mut Vec<BundleWarning>,
) {
    if entry.template.trim().is_empty() {
        warnings.push(BundleWarning::EmptyValue {
            locale: locale.clone(),
            key: key.to_string(),
        });
    }

    let message = match parse_message(&entry.template) {
        Ok(message) => message,
        Err(error) => {
            warnings.push(BundleWarning::InvalidTemplate {
                locale: locale.clone(),
                key: key.to_string(),
                error,
            });
            return;
        }
    };

    let used = message.arguments();
    if let Some(declared) = entry
        .metadata
        .as_ref()
        .and_then(|metadata| metadata.placeholders.as_ref())
    {
        for name in &used {
            if !declared.contains_key(*name) {
                warnings.push(BundleWarning::UndeclaredPlaceholder {
                    locale: locale.clone(),
                    key: key.to_string(),
                    name: (*name).to_string(),
                });
            }
        }
        for name in declared.keys() {
            if !used.contains(name.as_str()) {
                warnings.push(BundleWarning::UnusedPlaceholder {
                    locale: locale.clone(),
                    key: key.to_string(),
                    name: name.clone(),
                });
            }
        }
    }

    let mut unreachable = BTreeSet::new();
    message.walk(&mut |node| {
        let Node::Plural { cases, .. } = node else {
            return;
        };
        let named = cases.keys().filter_map(|selector| match selector {
            PluralSelector::Category(category) => Some(*category),
            PluralSelector::Exact(_) => None,
        });
        unreachable.extend(named.filter(|category| !categories.contains(category)));
    });
    for category in unreachable {
        warnings.push(BundleWarning::UnreachablePluralCase {
            locale: locale.clone(),
            key: key.to_string(),
            category,
        });
    }
}

/// Translation coverage of one locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleCoverage {
    pub locale: LocaleId,
    /// Number of keys this locale translates.
    pub translated: usize,
    /// Keys present in some other bundle but not this one, sorted.
    pub missing: Vec<String>,
}

impl LocaleCoverage {
    /// Translated keys as a percentage of all known keys.
    pub fn percent(&self) -> f64 {
        let total = self.translated + self.missing.len();
        if total == 0 {
            100.0
        } else {
            self.translated as f64 * 100.0 / total as f64
        }
    }
}

/// Coverage of every locale against the union of all keys.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CoverageReport {
    pub total_keys: usize,
    pub locales: Vec<LocaleCoverage>,
}

impl CoverageReport {
    pub fn locale(&self, locale: &LocaleId) -> Option<&LocaleCoverage> {
        self.locales.iter().find(|coverage| &coverage.locale == locale)
    }
}

/// Compute coverage for a set of bundles.
pub fn coverage<'a>(bundles: impl IntoIterator<Item = &'a ResourceBundle>) -> CoverageReport {
    let bundles: Vec<&ResourceBundle> = bundles.into_iter().collect();
    let all_keys: BTreeSet<&str> = bundles.iter().flat_map(|bundle| bundle.keys()).collect();

    let locales = bundles
        .iter()
        .map(|bundle| {
            let missing: Vec<String> = all_keys
                .iter()
                .filter(|key| !bundle.contains_key(key))
                .map(|key| (*key).to_string())
                .collect();
            LocaleCoverage {
                locale: bundle.locale().clone(),
                translated: all_keys.len() - missing.len(),
                missing,
            }
        })
        .collect();

    CoverageReport {
        total_keys: all_keys.len(),
        locales,
    }
}
