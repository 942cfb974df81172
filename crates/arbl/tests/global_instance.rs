#![cfg(feature = "global-instance")]

//! Integration tests for the `global-instance` feature.
//!
//! The holder is process-wide, so everything runs in one test to avoid
//! interference between parallel test threads.

use arbl::global::{self, GlobalError};
use arbl::{L10nConfig, Localizations, args};

fn l10n(text: &str) -> Localizations {
    let l10n = Localizations::in_memory(L10nConfig::default()).unwrap();
    l10n.load_str(&format!(r#"{{"@@locale": "en", "hello": "{text}"}}"#), None)
        .unwrap();
    l10n
}

#[test]
fn install_get_uninstall() {
    assert!(!global::is_installed());
    assert!(matches!(global::get(), Err(GlobalError::NotInstalled)));
    assert!(global::translate("hello", &args! {}).is_none());

    global::install(l10n("Hello!")).unwrap();
    assert!(global::is_installed());
    assert_eq!(
        global::translate("hello", &args! {}).unwrap().unwrap(),
        "Hello!"
    );
    assert_eq!(
        global::install(l10n("Again")),
        Err(GlobalError::AlreadyInstalled)
    );

    let handle = global::get().unwrap();
    assert_eq!(handle.translate("hello", &args! {}).unwrap(), "Hello!");

    let removed = global::uninstall().unwrap();
    assert_eq!(removed.translate("hello", &args! {}).unwrap(), "Hello!");
    assert!(global::uninstall().is_none());
    assert!(matches!(global::get(), Err(GlobalError::NotInstalled)));

    global::install(l10n("Replaced")).unwrap();
    assert_eq!(
        global::translate("hello", &args! {}).unwrap().unwrap(),
        "Replaced"
    );
    global::uninstall();
}
