pub mod bundle;
#[cfg(feature = "global-instance")]
pub mod global;
pub mod interpreter;
pub mod parser;
pub mod types;

pub use bundle::{BundleError, Entry, EntryMetadata, PlaceholderMetadata, ResourceBundle};
pub use interpreter::{
    BundleWarning, CacheStats, ChangeCause, CoverageReport, L10nConfig, L10nError, LoadError,
    LoadReport, LocaleChange, LocaleCoverage, Localizations, RenderError, Subscription,
    TemplateIssue, TranslateError, WatchError, compute_suggestions, plural_category,
};
pub use parser::{Message, Node, ParseError, PluralSelector, parse_message};
pub use types::{Args, LocaleError, LocaleId, PluralCategory, Value};

/// Creates an [`Args`] map from key-value pairs.
///
/// Values are converted via `Into<Value>`, so integers, floats, booleans
/// and strings can be passed directly.
///
/// # Example
///
/// ```
/// use arbl::{args, Value};
///
/// let a = args! { "count" => 3, "name" => "Alice" };
/// assert_eq!(a.len(), 2);
/// assert_eq!(a["count"], Value::Number(3));
/// assert_eq!(a["name"].as_string(), Some("Alice"));
/// ```
#[macro_export]
macro_rules! args {
    {} => {
        $crate::Args::new()
    };
    { $($key:expr => $value:expr),+ $(,)? } => {
        {
            let mut map = $crate::Args::new();
            $(
                map.insert($key.to_string(), ::std::convert::Into::<$crate::Value>::into($value));
            )+
            map
        }
    };
}
