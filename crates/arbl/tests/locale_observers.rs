//! Tests for locale-change notifications.

use std::fs;
use std::sync::{Arc, Mutex};

use arbl::{ChangeCause, L10nConfig, LocaleChange, LocaleId, Localizations, args};
use tempfile::TempDir;

fn locale(tag: &str) -> LocaleId {
    LocaleId::parse(tag).unwrap()
}

fn l10n() -> Localizations {
    let l10n = Localizations::in_memory(L10nConfig::builder().default_locale("en").build()).unwrap();
    l10n.load_str(r#"{"@@locale": "en", "hi": "Hi"}"#, None)
        .unwrap();
    l10n.load_str(r#"{"@@locale": "fr", "hi": "Salut"}"#, None)
        .unwrap();
    l10n
}

fn recorder(l10n: &Localizations) -> Arc<Mutex<Vec<LocaleChange>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    l10n.on_locale_change(move |change| sink.lock().unwrap().push(change.clone()));
    events
}

#[test]
fn set_locale_notifies_with_previous() {
    let l10n = l10n();
    let events = recorder(&l10n);

    l10n.set_locale(locale("fr"));

    let events = events.lock().unwrap();
    assert_eq!(
        *events,
        vec![LocaleChange {
            locale: locale("fr"),
            cause: ChangeCause::LocaleSet {
                previous: locale("en"),
            },
        }]
    );
}

#[test]
fn listeners_fire_in_registration_order() {
    let l10n = l10n();
    let order = Arc::new(Mutex::new(Vec::new()));
    for name in ["first", "second", "third"] {
        let order = Arc::clone(&order);
        l10n.on_locale_change(move |_| order.lock().unwrap().push(name));
    }

    l10n.set_locale(locale("fr"));
    assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
}

#[test]
fn removed_listener_is_not_called() {
    let l10n = l10n();
    let calls = Arc::new(Mutex::new(0));
    let counter = Arc::clone(&calls);
    let subscription = l10n.on_locale_change(move |_| *counter.lock().unwrap() += 1);

    l10n.set_locale(locale("fr"));
    assert!(l10n.remove_locale_change_listener(subscription));
    assert!(!l10n.remove_locale_change_listener(subscription));
    l10n.set_locale(locale("en"));

    assert_eq!(*calls.lock().unwrap(), 1);
}

#[test]
fn every_set_locale_call_notifies() {
    let l10n = l10n();
    let events = recorder(&l10n);
    l10n.set_locale(locale("en"));
    l10n.set_locale(locale("en"));
    assert_eq!(events.lock().unwrap().len(), 2);
}

#[test]
fn listener_may_call_back_into_the_handle() {
    let l10n = l10n();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let handle = l10n.clone();
    let sink = Arc::clone(&seen);
    l10n.on_locale_change(move |_| {
        sink.lock()
            .unwrap()
            .push(handle.translate("hi", &args! {}).unwrap());
    });

    l10n.set_locale(locale("fr"));
    assert_eq!(*seen.lock().unwrap(), vec!["Salut"]);
}

#[test]
fn panicking_listener_does_not_block_others() {
    let l10n = l10n();
    l10n.on_locale_change(|_| panic!("listener failure"));
    let events = recorder(&l10n);

    l10n.set_locale(locale("fr"));
    assert_eq!(events.lock().unwrap().len(), 1);
    assert_eq!(l10n.current_locale(), locale("fr"));
}

#[test]
fn reload_notifies_with_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app_en.arb");
    fs::write(&path, r#"{"hi": "Hi"}"#).unwrap();
    let l10n = Localizations::open(L10nConfig::builder().arb_dir(dir.path()).default_locale("en").build()).unwrap();
    let events = recorder(&l10n);

    fs::write(&path, r#"{"hi": "Hello"}"#).unwrap();
    l10n.reload_path(&path).unwrap();
    l10n.reload().unwrap();

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(
        events[0],
        LocaleChange {
            locale: locale("en"),
            cause: ChangeCause::Reloaded { path: path.clone() },
        }
    );
    assert_eq!(
        events[1].cause,
        ChangeCause::Reloaded {
            path: dir.path().to_path_buf(),
        }
    );
}
