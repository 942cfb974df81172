//! Tests for error types and error message formatting.

use std::error::Error;
use std::io::{self, ErrorKind};
use std::path::PathBuf;

use arbl::{
    BundleError, L10nError, LoadError, LocaleError, LocaleId, RenderError, TranslateError,
    WatchError, compute_suggestions,
};

#[test]
fn compute_suggestions_finds_similar_keys() {
    let available = vec![
        "title".to_string(),
        "subtitle".to_string(),
        "items".to_string(),
        "greeting".to_string(),
    ];

    let suggestions = compute_suggestions("titel", &available);
    assert_eq!(suggestions, vec!["title"]);

    let suggestions = compute_suggestions("item", &available);
    assert_eq!(suggestions, vec!["items"]);

    assert!(compute_suggestions("xyz", &available).is_empty());
}

#[test]
fn compute_suggestions_short_keys_allow_one_edit() {
    let available = ["ok", "on", "no"];
    assert_eq!(compute_suggestions("ox", &available), vec!["ok", "on"]);
    assert!(compute_suggestions("xy", &available).is_empty());
}

#[test]
fn compute_suggestions_limits_to_three() {
    let available: Vec<String> = (0..10).map(|i| format!("key{}", i)).collect();
    let suggestions = compute_suggestions("key", &available);
    assert_eq!(suggestions.len(), 3);
}

#[test]
fn exact_key_is_not_suggested() {
    assert!(compute_suggestions("title", &["title"]).is_empty());
}

#[test]
fn missing_key_without_suggestions() {
    let err = TranslateError::MissingKey {
        key: "zzz".to_string(),
        locale: LocaleId::parse("de").unwrap(),
        suggestions: vec![],
    };
    assert_eq!(
        err.to_string(),
        "translation key 'zzz' not found for locale 'de'"
    );
}

#[test]
fn missing_key_with_suggestions() {
    let err = TranslateError::MissingKey {
        key: "titel".to_string(),
        locale: LocaleId::parse("en").unwrap(),
        suggestions: vec!["title".to_string(), "tile".to_string()],
    };
    assert_eq!(
        err.to_string(),
        "translation key 'titel' not found for locale 'en'; did you mean: title, tile?"
    );
}

#[test]
fn render_errors_name_argument_and_key() {
    let err = RenderError::NotANumber {
        name: "count".to_string(),
        key: "items".to_string(),
        value: "lots".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "argument 'count' for 'items' must be a number, got 'lots'"
    );

    let wrapped = TranslateError::Render {
        locale: LocaleId::parse("en").unwrap(),
        source: RenderError::MissingArgument {
            name: "name".to_string(),
            key: "greeting".to_string(),
        },
    };
    assert_eq!(
        wrapped.to_string(),
        "failed to render in locale 'en': missing argument 'name' for 'greeting'"
    );
}

#[test]
fn load_error_io_displays_path() {
    let err = LoadError::Io {
        path: PathBuf::from("/l10n/app_en.arb"),
        source: io::Error::new(ErrorKind::NotFound, "file not found"),
    };
    let msg = err.to_string();
    assert!(msg.contains("/l10n/app_en.arb"));
    assert!(msg.contains("file not found"));
}

#[test]
fn load_error_decode_keeps_source() {
    let err = LoadError::Decode {
        path: PathBuf::from("app_xx.arb"),
        source: BundleError::NoLocale,
    };
    assert!(err.to_string().starts_with("app_xx.arb: "));
    assert!(err.source().is_some());
}

#[test]
fn locale_errors() {
    assert_eq!(
        LocaleId::parse(""),
        Err(LocaleError::InvalidTag { tag: String::new() })
    );
    let err = L10nError::from(LocaleId::parse("!!").unwrap_err());
    assert_eq!(err.to_string(), "invalid locale tag '!!'");
}

#[test]
fn watch_error_messages() {
    assert_eq!(
        WatchError::MissingDirectory { path: None }.to_string(),
        "no bundle directory to watch"
    );
    assert_eq!(
        WatchError::MissingDirectory {
            path: Some(PathBuf::from("/tmp/l10n")),
        }
        .to_string(),
        "no bundle directory to watch: '/tmp/l10n'"
    );
}
