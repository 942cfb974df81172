use std::path::Path;

use crate::interpreter::plural::PluralRuleTable;
use crate::types::LocaleId;

/// Derive a locale from an ARB file name.
///
/// Follows the common naming conventions `app_en.arb`, `intl_es_ES.arb`,
/// `app_zh_Hant_TW.arb`, `pt-BR.arb` and `en.arb`: trailing region and
/// script subtags are collected right to left until a language subtag is
/// found. Returns `None` when the name carries no recognizable locale, so
/// `app.arb` or `my_app.arb` need an `@@locale` entry.
pub fn locale_from_filename(path: &Path) -> Option<LocaleId> {
    if path.extension().is_none_or(|ext| ext != "arb") {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    let parts: Vec<&str> = stem.split(['_', '-']).collect();

    let mut start = parts.len();
    while start > 0 {
        let part = parts[start - 1];
        if is_language(part) {
            let tag = parts[start - 1..].join("-");
            return LocaleId::parse(&tag).ok();
        }
        if !(is_region(part) || is_script(part)) {
            return None;
        }
        start -= 1;
    }
    None
}

/// Two-letter codes are taken on shape alone. Three letters collide with
/// ordinary words (`app`, `ui_kit`), so those must be a known language.
fn is_language(part: &str) -> bool {
    if !part.chars().all(|c| c.is_ascii_lowercase()) {
        return false;
    }
    match part.len() {
        2 => true,
        3 => PluralRuleTable::cldr().contains(part),
        _ => false,
    }
}

fn is_region(part: &str) -> bool {
    (part.len() == 2 && part.chars().all(|c| c.is_ascii_uppercase()))
        || (part.len() == 3 && part.chars().all(|c| c.is_ascii_digit()))
}

fn is_script(part: &str) -> bool {
    let mut chars = part.chars();
    part.len() == 4
        && chars.next().is_some_and(|c| c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locale(name: &str) -> Option<String> {
        locale_from_filename(Path::new(name)).map(|id| id.to_string())
    }

    #[test]
    fn prefixed_names() {
        assert_eq!(locale("app_en.arb").as_deref(), Some("en"));
        assert_eq!(locale("intl_es_ES.arb").as_deref(), Some("es-ES"));
        assert_eq!(locale("app_zh_Hant_TW.arb").as_deref(), Some("zh-Hant-TW"));
        assert_eq!(locale("my_app_kab.arb").as_deref(), Some("kab"));
    }

    #[test]
    fn bare_locale_names() {
        assert_eq!(locale("en.arb").as_deref(), Some("en"));
        assert_eq!(locale("pt-BR.arb").as_deref(), Some("pt-BR"));
    }

    #[test]
    fn names_without_locale() {
        assert_eq!(locale("messages.arb"), None);
        assert_eq!(locale("app_en.json"), None);
        assert_eq!(locale("US.arb"), None);
        assert_eq!(locale("app.arb"), None);
        assert_eq!(locale("my_app.arb"), None);
        assert_eq!(locale("app_xyz.arb"), None);
        assert_eq!(locale("intl_App.arb"), None);
    }
}
