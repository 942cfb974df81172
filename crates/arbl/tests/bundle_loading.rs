//! Tests for loading and reloading bundle directories.

use std::fs;
use std::path::Path;

use arbl::{
    BundleError, L10nConfig, L10nError, LoadError, LocaleId, Localizations, ResourceBundle, args,
};
use tempfile::TempDir;

fn locale(tag: &str) -> LocaleId {
    LocaleId::parse(tag).unwrap()
}

fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

fn fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "app_en.arb",
        r#"{"title": "Inbox", "count": "{n, plural, one{# message} other{# messages}}"}"#,
    );
    write(
        dir.path(),
        "app_fr.arb",
        r#"{"@@locale": "fr", "title": "Boîte de réception"}"#,
    );
    write(dir.path(), "README.txt", "not a bundle");
    dir
}

fn open(dir: &Path) -> Localizations {
    Localizations::open(L10nConfig::builder().arb_dir(dir).default_locale("en").build()).unwrap()
}

// =========================================================================
// Directory loading
// =========================================================================

#[test]
fn loads_every_arb_file() {
    let dir = fixture();
    let l10n = open(dir.path());

    let report = l10n.last_load_report();
    assert!(report.is_clean());
    assert_eq!(report.loaded, vec![locale("en"), locale("fr")]);
    assert_eq!(l10n.translate("title", &args! {}).unwrap(), "Inbox");

    l10n.set_locale(locale("fr"));
    assert_eq!(
        l10n.translate("title", &args! {}).unwrap(),
        "Boîte de réception"
    );
}

#[test]
fn bad_files_are_reported_not_fatal() {
    let dir = fixture();
    write(dir.path(), "app_de.arb", "{ not json");
    write(dir.path(), "app_es.arb", r#"{"title": 42}"#);
    let l10n = open(dir.path());

    let report = l10n.last_load_report();
    assert_eq!(report.loaded, vec![locale("en"), locale("fr")]);
    assert_eq!(report.errors.len(), 2);
    assert!(matches!(
        &report.errors[0],
        LoadError::Decode { path, source: BundleError::Json(_) } if path.ends_with("app_de.arb")
    ));
    assert!(matches!(
        &report.errors[1],
        LoadError::Decode { source: BundleError::InvalidEntry { key }, .. } if key == "title"
    ));
}

#[test]
fn locale_declaration_wins_over_file_name() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "app_en.arb", r#"{"@@locale": "es", "hola": "Hola"}"#);
    let l10n = open(dir.path());
    assert_eq!(l10n.last_load_report().loaded, vec![locale("es")]);
    assert!(l10n.keys_for(&locale("en")).is_empty());
}

#[test]
fn file_without_any_locale_is_skipped() {
    let dir = fixture();
    write(dir.path(), "messages.arb", r#"{"a": "b"}"#);
    let l10n = open(dir.path());
    let report = l10n.last_load_report();
    assert!(matches!(
        &report.errors[..],
        [LoadError::Decode { source: BundleError::NoLocale, .. }]
    ));
}

#[test]
fn word_like_file_names_are_not_locales() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "app.arb", r#"{"title": "Template"}"#);
    write(dir.path(), "my_app.arb", r#"{"title": "Template"}"#);
    write(dir.path(), "app_en.arb", r#"{"title": "Inbox"}"#);
    let l10n = open(dir.path());

    let report = l10n.last_load_report();
    assert_eq!(report.loaded, vec![locale("en")]);
    assert_eq!(report.errors.len(), 2);
    assert!(report.errors.iter().all(|error| matches!(
        error,
        LoadError::Decode { source: BundleError::NoLocale, .. }
    )));
    assert_eq!(l10n.supported_locales(), vec![locale("en")]);
}

#[test]
fn duplicate_locale_is_rejected() {
    let dir = fixture();
    write(dir.path(), "intl_en.arb", r#"{"title": "Other inbox"}"#);
    let l10n = open(dir.path());

    let report = l10n.last_load_report();
    assert!(matches!(
        &report.errors[..],
        [LoadError::DuplicateLocale { locale: dup, existing, .. }]
            if *dup == locale("en") && existing.ends_with("app_en.arb")
    ));
    assert_eq!(l10n.translate("title", &args! {}).unwrap(), "Inbox");
}

#[test]
fn unsupported_locales_are_skipped() {
    let dir = fixture();
    let config = L10nConfig::builder()
        .arb_dir(dir.path())
        .default_locale("en")
        .supported_locales(vec!["en".to_string()])
        .build();
    let l10n = Localizations::open(config).unwrap();

    let report = l10n.last_load_report();
    assert_eq!(report.loaded, vec![locale("en")]);
    assert!(matches!(
        &report.errors[..],
        [LoadError::UnsupportedLocale { locale: skipped, .. }] if *skipped == locale("fr")
    ));
    assert_eq!(l10n.supported_locales(), vec![locale("en")]);
}

#[test]
fn missing_directory_fails_open() {
    let dir = TempDir::new().unwrap();
    let config = L10nConfig::builder()
        .arb_dir(dir.path().join("missing"))
        .build();
    assert!(matches!(
        Localizations::open(config),
        Err(L10nError::Load(LoadError::Directory { .. }))
    ));
}

#[test]
fn invalid_configured_locale_fails_open() {
    let config = L10nConfig::builder().default_locale("not a locale").build();
    assert!(matches!(
        Localizations::open(config),
        Err(L10nError::Locale(_))
    ));
}

// =========================================================================
// Reloading
// =========================================================================

#[test]
fn reload_path_invalidates_only_that_locale() {
    let dir = fixture();
    let l10n = open(dir.path());
    l10n.translate("title", &args! {}).unwrap();
    l10n.set_locale(locale("fr"));
    l10n.translate("title", &args! {}).unwrap();
    assert_eq!(l10n.cache_stats().size, 2);

    write(
        dir.path(),
        "app_fr.arb",
        r#"{"@@locale": "fr", "title": "Courrier"}"#,
    );
    let changed = l10n.reload_path(&dir.path().join("app_fr.arb")).unwrap();
    assert_eq!(changed, Some(locale("fr")));
    assert_eq!(l10n.cache_stats().size, 1);

    assert_eq!(l10n.translate("title", &args! {}).unwrap(), "Courrier");
    l10n.set_locale(locale("en"));
    let hits_before = l10n.cache_stats().hits;
    assert_eq!(l10n.translate("title", &args! {}).unwrap(), "Inbox");
    assert_eq!(l10n.cache_stats().hits, hits_before + 1);
}

#[test]
fn failed_reload_keeps_previous_bundle() {
    let dir = fixture();
    let l10n = open(dir.path());
    write(dir.path(), "app_en.arb", "{ broken");

    let result = l10n.reload_path(&dir.path().join("app_en.arb"));
    assert!(matches!(result, Err(LoadError::Decode { .. })));
    assert_eq!(l10n.translate("title", &args! {}).unwrap(), "Inbox");
}

#[test]
fn deleted_file_removes_its_bundle() {
    let dir = fixture();
    let l10n = open(dir.path());
    let path = dir.path().join("app_fr.arb");
    fs::remove_file(&path).unwrap();

    assert_eq!(l10n.reload_path(&path).unwrap(), Some(locale("fr")));
    assert!(l10n.keys_for(&locale("fr")).is_empty());
    assert_eq!(l10n.supported_locales(), vec![locale("en")]);
}

#[test]
fn new_file_is_picked_up_by_reload_path() {
    let dir = fixture();
    let l10n = open(dir.path());
    write(dir.path(), "app_de.arb", r#"{"title": "Posteingang"}"#);

    let changed = l10n.reload_path(&dir.path().join("app_de.arb")).unwrap();
    assert_eq!(changed, Some(locale("de")));
    l10n.set_locale(locale("de-AT"));
    assert_eq!(l10n.translate("title", &args! {}).unwrap(), "Posteingang");
}

#[test]
fn unknown_missing_path_is_ignored() {
    let dir = fixture();
    let l10n = open(dir.path());
    assert_eq!(
        l10n.reload_path(&dir.path().join("app_it.arb")).unwrap(),
        None
    );
}

#[test]
fn full_reload_clears_cache() {
    let dir = fixture();
    let l10n = open(dir.path());
    l10n.translate("title", &args! {}).unwrap();

    write(dir.path(), "app_en.arb", r#"{"title": "Mail"}"#);
    let report = l10n.reload().unwrap();
    assert!(report.is_clean());
    assert_eq!(l10n.cache_stats().size, 0);
    assert_eq!(l10n.translate("title", &args! {}).unwrap(), "Mail");
}

#[test]
fn reload_without_directory_is_empty() {
    let l10n = Localizations::in_memory(L10nConfig::default()).unwrap();
    let report = l10n.reload().unwrap();
    assert!(report.loaded.is_empty());
    assert!(report.errors.is_empty());
}

// =========================================================================
// Decoding
// =========================================================================

#[test]
fn load_str_errors() {
    let l10n = Localizations::in_memory(L10nConfig::default()).unwrap();
    assert!(matches!(
        l10n.load_str("[1, 2]", None),
        Err(BundleError::NotAnObject)
    ));
    assert!(matches!(
        l10n.load_str(r#"{"a": "b"}"#, None),
        Err(BundleError::NoLocale)
    ));
    assert!(matches!(
        l10n.load_str(r#"{"@@locale": "en", "@a": "oops", "a": "b"}"#, None),
        Err(BundleError::InvalidMetadata { key, .. }) if key == "a"
    ));
    assert!(matches!(
        l10n.load_str(r#"{"@@locale": "??"}"#, None),
        Err(BundleError::InvalidLocale(_))
    ));
}

#[test]
fn metadata_is_attached_to_entries() {
    let bundle = ResourceBundle::decode(
        r#"{
            "@@locale": "en",
            "@@last_modified": "2024-01-01",
            "welcome": "Welcome {user}",
            "@welcome": {
                "description": "Shown on the home screen",
                "placeholders": { "user": { "type": "String", "example": "Ana" } }
            },
            "@ghost": { "description": "no entry" }
        }"#,
        None,
    )
    .unwrap();

    assert_eq!(bundle.locale(), &locale("en"));
    assert_eq!(bundle.len(), 1);
    let entry = bundle.entry("welcome").unwrap();
    let metadata = entry.metadata.as_ref().unwrap();
    assert_eq!(
        metadata.description.as_deref(),
        Some("Shown on the home screen")
    );
    assert!(metadata.declares("user"));
    assert_eq!(bundle.orphan_metadata(), ["ghost".to_string()]);
}
