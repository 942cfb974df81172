//! Process-wide handle for the `global-instance` feature.
//!
//! Nothing is created implicitly: a [`Localizations`] must be installed
//! before [`get`] or [`translate`] succeed.

use std::sync::{PoisonError, RwLock};

use thiserror::Error;

use crate::{Args, Localizations, TranslateError};

static GLOBAL: RwLock<Option<Localizations>> = RwLock::new(None);

/// Errors from the global holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GlobalError {
    #[error("no global Localizations instance is installed")]
    NotInstalled,

    #[error("a global Localizations instance is already installed")]
    AlreadyInstalled,
}

/// Install `localizations` as the global instance.
pub fn install(localizations: Localizations) -> Result<(), GlobalError> {
    let mut global = GLOBAL.write().unwrap_or_else(PoisonError::into_inner);
    if global.is_some() {
        return Err(GlobalError::AlreadyInstalled);
    }
    *global = Some(localizations);
    Ok(())
}

/// Remove and return the global instance.
pub fn uninstall() -> Option<Localizations> {
    GLOBAL
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .take()
}

/// A handle to the global instance.
pub fn get() -> Result<Localizations, GlobalError> {
    GLOBAL
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
        .ok_or(GlobalError::NotInstalled)
}

pub fn is_installed() -> bool {
    GLOBAL
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .is_some()
}

/// Translate with the global instance.
///
/// Returns `None` when no instance is installed.
pub fn translate(key: &str, args: &Args) -> Option<Result<String, TranslateError>> {
    get().ok().map(|localizations| localizations.translate(key, args))
}
