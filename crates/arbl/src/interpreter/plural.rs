//! CLDR plural category resolution.
//!
//! Plural rules are plain data: each language maps to an ordered list of
//! [`PluralRule`]s, and a single evaluator walks that list. English has "one"
//! and "other", Russian has "one", "few", "many" and "other", and Arabic uses
//! all six categories.
//!
//! Operands follow a simplified CLDR model: `n` is the absolute value, `i` its
//! integer digits, and a value is either integral or fractional. Conditions
//! that compare exact values or remainders only hold for integral values.
//! Languages without an entry use [`DEFAULT_RULES`].

use thiserror::Error;

use crate::types::PluralCategory;

/// A single test against the operands of a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    /// `n = k`
    Is(u64),
    /// `n != k` (also holds for every fractional value)
    IsNot(u64),
    /// `n = lo..hi`
    Within(u64, u64),
    /// `n % modulus = low..high`
    ModWithin { modulus: u64, low: u64, high: u64 },
    /// `n % modulus != low..high`
    ModOutside { modulus: u64, low: u64, high: u64 },
    /// `i = lo..hi`, regardless of any fraction
    IntegerWithin(u64, u64),
    /// The value has a non-zero fraction.
    Fractional,
}

/// Assigns `category` when any of the `when` groups has all of its
/// conditions hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PluralRule {
    pub category: PluralCategory,
    pub when: &'static [&'static [Condition]],
}

/// Operands of a finite number.
#[derive(Debug, Clone, Copy)]
struct Operands {
    i: u64,
    fractional: bool,
}

impl Operands {
    fn new(n: f64) -> Self {
        let n = n.abs();
        let integer = n.trunc();
        Self {
            // `as` saturates for values beyond u64::MAX
            i: integer as u64,
            fractional: n != integer,
        }
    }

    fn integral(&self) -> Option<u64> {
        (!self.fractional).then_some(self.i)
    }
}

impl Condition {
    fn holds(&self, operands: Operands) -> bool {
        let n = operands.integral();
        match *self {
            Condition::Is(k) => n == Some(k),
            Condition::IsNot(k) => n != Some(k),
            Condition::Within(lo, hi) => n.is_some_and(|n| (lo..=hi).contains(&n)),
            Condition::ModWithin { modulus, low, high } => {
                n.is_some_and(|n| (low..=high).contains(&(n % modulus)))
            }
            Condition::ModOutside { modulus, low, high } => {
                n.is_some_and(|n| !(low..=high).contains(&(n % modulus)))
            }
            Condition::IntegerWithin(lo, hi) => (lo..=hi).contains(&operands.i),
            Condition::Fractional => operands.fractional,
        }
    }
}

impl PluralRule {
    fn matches(&self, operands: Operands) -> bool {
        self.when
            .iter()
            .any(|group| group.iter().all(|condition| condition.holds(operands)))
    }
}

// =========================================================================
// Rule data
// =========================================================================

use Condition::{Fractional, IntegerWithin, Is, IsNot, ModOutside, ModWithin, Within};
use PluralCategory::{Few, Many, One, Two, Zero};

const fn rule(category: PluralCategory, when: &'static [&'static [Condition]]) -> PluralRule {
    PluralRule { category, when }
}

/// Rules for languages without an explicit entry: `one` iff `n = 1`.
pub const DEFAULT_RULES: &[PluralRule] = &[rule(One, &[&[Is(1)]])];

const OTHER_ONLY: &[PluralRule] = &[];

const ONE_IS_ONE: &[PluralRule] = DEFAULT_RULES;

const FRENCH: &[PluralRule] = &[rule(One, &[&[IntegerWithin(0, 1)]])];

const HINDI: &[PluralRule] = &[rule(One, &[&[IntegerWithin(0, 0)], &[Is(1)]])];

const LATVIAN: &[PluralRule] = &[
    rule(
        Zero,
        &[
            &[ModWithin { modulus: 10, low: 0, high: 0 }],
            &[ModWithin { modulus: 100, low: 11, high: 19 }],
        ],
    ),
    rule(
        One,
        &[&[
            ModWithin { modulus: 10, low: 1, high: 1 },
            ModOutside { modulus: 100, low: 11, high: 11 },
        ]],
    ),
];

const CZECH: &[PluralRule] = &[
    rule(One, &[&[Is(1)]]),
    rule(Few, &[&[Within(2, 4)]]),
    rule(Many, &[&[Fractional]]),
];

const POLISH: &[PluralRule] = &[
    rule(One, &[&[Is(1)]]),
    rule(
        Few,
        &[&[
            ModWithin { modulus: 10, low: 2, high: 4 },
            ModOutside { modulus: 100, low: 12, high: 14 },
        ]],
    ),
    rule(
        Many,
        &[
            &[IsNot(1), ModWithin { modulus: 10, low: 0, high: 1 }],
            &[ModWithin { modulus: 10, low: 5, high: 9 }],
            &[ModWithin { modulus: 100, low: 12, high: 14 }],
        ],
    ),
];

const EAST_SLAVIC: &[PluralRule] = &[
    rule(
        One,
        &[&[
            ModWithin { modulus: 10, low: 1, high: 1 },
            ModOutside { modulus: 100, low: 11, high: 11 },
        ]],
    ),
    rule(
        Few,
        &[&[
            ModWithin { modulus: 10, low: 2, high: 4 },
            ModOutside { modulus: 100, low: 12, high: 14 },
        ]],
    ),
    rule(
        Many,
        &[
            &[ModWithin { modulus: 10, low: 0, high: 0 }],
            &[ModWithin { modulus: 10, low: 5, high: 9 }],
            &[ModWithin { modulus: 100, low: 11, high: 14 }],
        ],
    ),
];

const SOUTH_SLAVIC: &[PluralRule] = &[
    rule(
        One,
        &[&[
            ModWithin { modulus: 10, low: 1, high: 1 },
            ModOutside { modulus: 100, low: 11, high: 11 },
        ]],
    ),
    rule(
        Few,
        &[&[
            ModWithin { modulus: 10, low: 2, high: 4 },
            ModOutside { modulus: 100, low: 12, high: 14 },
        ]],
    ),
];

const LITHUANIAN: &[PluralRule] = &[
    rule(
        One,
        &[&[
            ModWithin { modulus: 10, low: 1, high: 1 },
            ModOutside { modulus: 100, low: 11, high: 19 },
        ]],
    ),
    rule(
        Few,
        &[&[
            ModWithin { modulus: 10, low: 2, high: 9 },
            ModOutside { modulus: 100, low: 11, high: 19 },
        ]],
    ),
    rule(Many, &[&[Fractional]]),
];

const ROMANIAN: &[PluralRule] = &[
    rule(One, &[&[Is(1)]]),
    rule(
        Few,
        &[
            &[Fractional],
            &[Is(0)],
            &[IsNot(1), ModWithin { modulus: 100, low: 1, high: 19 }],
        ],
    ),
];

const ARABIC: &[PluralRule] = &[
    rule(Zero, &[&[Is(0)]]),
    rule(One, &[&[Is(1)]]),
    rule(Two, &[&[Is(2)]]),
    rule(Few, &[&[ModWithin { modulus: 100, low: 3, high: 10 }]]),
    rule(Many, &[&[ModWithin { modulus: 100, low: 11, high: 99 }]]),
];

const WELSH: &[PluralRule] = &[
    rule(Zero, &[&[Is(0)]]),
    rule(One, &[&[Is(1)]]),
    rule(Two, &[&[Is(2)]]),
    rule(Few, &[&[Is(3)]]),
    rule(Many, &[&[Is(6)]]),
];

const IRISH: &[PluralRule] = &[
    rule(One, &[&[Is(1)]]),
    rule(Two, &[&[Is(2)]]),
    rule(Few, &[&[Within(3, 6)]]),
    rule(Many, &[&[Within(7, 10)]]),
];

const MALTESE: &[PluralRule] = &[
    rule(One, &[&[Is(1)]]),
    rule(Two, &[&[Is(2)]]),
    rule(
        Few,
        &[&[Is(0)], &[ModWithin { modulus: 100, low: 3, high: 10 }]],
    ),
    rule(Many, &[&[ModWithin { modulus: 100, low: 11, high: 19 }]]),
];

const SLOVENIAN: &[PluralRule] = &[
    rule(One, &[&[ModWithin { modulus: 100, low: 1, high: 1 }]]),
    rule(Two, &[&[ModWithin { modulus: 100, low: 2, high: 2 }]]),
    rule(
        Few,
        &[&[ModWithin { modulus: 100, low: 3, high: 4 }], &[Fractional]],
    ),
];

const ICELANDIC: &[PluralRule] = &[rule(
    One,
    &[&[
        ModWithin { modulus: 10, low: 1, high: 1 },
        ModOutside { modulus: 100, low: 11, high: 11 },
    ]],
)];

const HEBREW: &[PluralRule] = &[
    rule(One, &[&[Is(1)], &[IntegerWithin(0, 0), Fractional]]),
    rule(Two, &[&[Is(2)]]),
];

/// A group of languages sharing one rule list.
#[derive(Debug, Clone, Copy)]
pub struct RuleGroup {
    pub languages: &'static [&'static str],
    pub rules: &'static [PluralRule],
}

const fn group(languages: &'static [&'static str], rules: &'static [PluralRule]) -> RuleGroup {
    RuleGroup { languages, rules }
}

const CLDR_GROUPS: &[RuleGroup] = &[
    group(
        &[
            "zh", "ja", "ko", "th", "vi", "id", "ms", "lo", "my", "km", "jv", "su", "yo", "ig",
            "bo",
        ],
        OTHER_ONLY,
    ),
    group(
        &[
            "en", "de", "nl", "sv", "da", "no", "nb", "nn", "fi", "et", "el", "it", "es", "ca",
            "bg", "hu", "te", "ta", "ur", "sw", "tr", "az", "ka", "kk", "ky", "mn", "sq", "eu",
            "gl", "af", "fy", "lb", "uz", "ml", "mr", "ne", "ps", "so", "tk", "ha", "fo", "rm",
        ],
        ONE_IS_ONE,
    ),
    group(&["fr", "pt", "hy", "ff", "kab"], FRENCH),
    group(&["hi", "bn", "fa", "gu", "kn", "am", "zu", "as"], HINDI),
    group(&["lv"], LATVIAN),
    group(&["cs", "sk"], CZECH),
    group(&["pl"], POLISH),
    group(&["ru", "uk", "be"], EAST_SLAVIC),
    group(&["hr", "sr", "bs"], SOUTH_SLAVIC),
    group(&["lt"], LITHUANIAN),
    group(&["ro", "mo"], ROMANIAN),
    group(&["ar"], ARABIC),
    group(&["cy"], WELSH),
    group(&["ga"], IRISH),
    group(&["mt"], MALTESE),
    group(&["sl"], SLOVENIAN),
    group(&["is", "mk"], ICELANDIC),
    group(&["he"], HEBREW),
];

// =========================================================================
// Table
// =========================================================================

/// Problems detected in plural rule data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleTableError {
    #[error("language '{language}' appears in more than one rule group")]
    DuplicateLanguage { language: &'static str },

    #[error("rules for '{language}' are not in priority order")]
    OutOfOrder { language: &'static str },

    #[error("rules for '{language}' name the 'other' category")]
    NamesOther { language: &'static str },

    #[error("rules for '{language}' contain an empty or invalid condition")]
    InvalidCondition { language: &'static str },
}

/// A language-to-rules lookup table.
#[derive(Debug, Clone, Copy)]
pub struct PluralRuleTable {
    groups: &'static [RuleGroup],
}

impl PluralRuleTable {
    /// The built-in CLDR-derived table.
    pub const fn cldr() -> Self {
        Self {
            groups: CLDR_GROUPS,
        }
    }

    /// Rules for a language subtag, or [`DEFAULT_RULES`] when unlisted.
    pub fn rules_for(&self, language: &str) -> &'static [PluralRule] {
        self.groups
            .iter()
            .find(|group| group.languages.contains(&language))
            .map_or(DEFAULT_RULES, |group| group.rules)
    }

    /// Whether the language has an explicit entry.
    pub fn contains(&self, language: &str) -> bool {
        self.groups
            .iter()
            .any(|group| group.languages.contains(&language))
    }

    /// Every language with an explicit entry.
    pub fn languages(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.groups
            .iter()
            .flat_map(|group| group.languages.iter().copied())
    }

    /// Check the table's structural invariants.
    pub fn validate(&self) -> Result<(), RuleTableError> {
        let mut seen: Vec<&'static str> = Vec::new();
        for group in self.groups {
            for &language in group.languages {
                if seen.contains(&language) {
                    return Err(RuleTableError::DuplicateLanguage { language });
                }
                seen.push(language);
                validate_rules(language, group.rules)?;
            }
        }
        Ok(())
    }
}

fn validate_rules(language: &'static str, rules: &[PluralRule]) -> Result<(), RuleTableError> {
    let mut previous: Option<PluralCategory> = None;
    for rule in rules {
        if rule.category == PluralCategory::Other {
            return Err(RuleTableError::NamesOther { language });
        }
        if previous.is_some_and(|prev| prev >= rule.category) {
            return Err(RuleTableError::OutOfOrder { language });
        }
        previous = Some(rule.category);

        let valid = !rule.when.is_empty()
            && rule.when.iter().all(|group| {
                !group.is_empty() && group.iter().all(condition_is_well_formed)
            });
        if !valid {
            return Err(RuleTableError::InvalidCondition { language });
        }
    }
    Ok(())
}

fn condition_is_well_formed(condition: &Condition) -> bool {
    match *condition {
        Condition::Within(lo, hi) | Condition::IntegerWithin(lo, hi) => lo <= hi,
        Condition::ModWithin { modulus, low, high }
        | Condition::ModOutside { modulus, low, high } => modulus > 0 && low <= high,
        Condition::Is(_) | Condition::IsNot(_) | Condition::Fractional => true,
    }
}

/// Extract the lowercase language subtag of a locale tag.
fn language_of(locale: &str) -> String {
    locale
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}

/// Get the CLDR plural category for a number in a given locale.
///
/// Only the language subtag of `locale` is consulted. Non-finite values are
/// `Other`.
///
/// # Example
///
/// ```
/// use arbl::{PluralCategory, plural_category};
///
/// assert_eq!(plural_category("en", 1.0), PluralCategory::One);
/// assert_eq!(plural_category("ru-RU", 5.0), PluralCategory::Many);
/// assert_eq!(plural_category("fr", 0.0), PluralCategory::One);
/// ```
pub fn plural_category(locale: &str, n: f64) -> PluralCategory {
    if !n.is_finite() {
        return PluralCategory::Other;
    }
    let operands = Operands::new(n);
    PluralRuleTable::cldr()
        .rules_for(&language_of(locale))
        .iter()
        .find(|rule| rule.matches(operands))
        .map_or(PluralCategory::Other, |rule| rule.category)
}

/// Numbers sampled by [`plural_categories`]. Every remainder-based rule in the
/// table repeats within the first two hundred integers.
fn sample_values() -> impl Iterator<Item = f64> {
    (0..=200u32)
        .map(f64::from)
        .chain([1000.0, 1_000_000.0, 0.5, 1.5, 2.5, 10.5])
}

/// The categories a locale's rules can produce, in priority order. Always
/// ends with `Other`.
pub fn plural_categories(locale: &str) -> Vec<PluralCategory> {
    let mut found: Vec<PluralCategory> = sample_values()
        .map(|n| plural_category(locale, n))
        .collect();
    found.push(PluralCategory::Other);
    found.sort();
    found.dedup();
    found
}
