//! Tests for CLDR plural category selection.

use arbl::PluralCategory::{self, Few, Many, One, Other, Two, Zero};
use arbl::interpreter::plural::{PluralRuleTable, plural_categories};
use arbl::plural_category;
use proptest::prelude::*;

fn check(locale: &str, cases: &[(f64, PluralCategory)]) {
    for &(n, expected) in cases {
        assert_eq!(
            plural_category(locale, n),
            expected,
            "plural_category({locale:?}, {n})"
        );
    }
}

#[test]
fn english() {
    check("en", &[(0.0, Other), (1.0, One), (2.0, Other), (1.5, Other)]);
}

#[test]
fn french_zero_and_one_share_a_category() {
    check("fr", &[(0.0, One), (1.0, One), (1.5, One), (2.0, Other)]);
}

#[test]
fn arabic_has_six_categories() {
    check(
        "ar",
        &[
            (0.0, Zero),
            (1.0, One),
            (2.0, Two),
            (3.0, Few),
            (10.0, Few),
            (11.0, Many),
            (99.0, Many),
            (100.0, Other),
            (103.0, Few),
        ],
    );
}

#[test]
fn russian() {
    check(
        "ru",
        &[
            (1.0, One),
            (21.0, One),
            (11.0, Many),
            (2.0, Few),
            (24.0, Few),
            (12.0, Many),
            (5.0, Many),
            (0.0, Many),
            (1.5, Other),
        ],
    );
}

#[test]
fn czech_fractions_are_many() {
    check("cs", &[(1.0, One), (3.0, Few), (5.0, Other), (1.5, Many)]);
}

#[test]
fn languages_without_plurals() {
    check("ja", &[(0.0, Other), (1.0, Other), (2.0, Other)]);
    check("zh-Hant", &[(1.0, Other)]);
}

#[test]
fn region_does_not_change_rules() {
    for n in [0.0, 1.0, 2.0, 5.0, 11.0, 21.0] {
        assert_eq!(plural_category("pt-BR", n), plural_category("pt", n));
        assert_eq!(plural_category("en_GB", n), plural_category("en", n));
        assert_eq!(plural_category("RU", n), plural_category("ru", n));
    }
}

#[test]
fn unknown_language_uses_one_other() {
    check("xx", &[(1.0, One), (0.0, Other), (2.0, Other)]);
}

#[test]
fn categories_of_common_locales() {
    assert_eq!(plural_categories("en"), vec![One, Other]);
    assert_eq!(plural_categories("ja"), vec![Other]);
    assert_eq!(plural_categories("ar"), vec![Zero, One, Two, Few, Many, Other]);
    assert_eq!(plural_categories("ru"), vec![One, Few, Many, Other]);
}

#[test]
fn rule_table_is_consistent() {
    let table = PluralRuleTable::cldr();
    assert!(table.validate().is_ok());
    assert!(table.contains("en"));
    assert!(table.languages().count() > 50);
}

proptest! {
    #[test]
    fn category_is_deterministic(n in 0u32..1_000_000, lang in "(en|fr|ru|pl|ar|cs|lt|cy|ga|he)") {
        let n = f64::from(n);
        prop_assert_eq!(plural_category(&lang, n), plural_category(&lang, n));
    }

    #[test]
    fn category_is_always_listed(n in 0u32..10_000, lang in "(en|fr|ru|pl|ar|cs|lt|lv|cy|ga|mt|sl|he|is)") {
        let category = plural_category(&lang, f64::from(n));
        prop_assert!(plural_categories(&lang).contains(&category));
    }
}
