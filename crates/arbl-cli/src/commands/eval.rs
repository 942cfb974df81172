//! Implementation of the `arbl eval` command.

use std::path::{Path, PathBuf};

use arbl::{Args, LocaleId, Localizations, TranslateError, Value};
use miette::miette;
use serde::Serialize;
use tracing::debug;

use crate::commands::open_directory;
use crate::output::TemplateDiagnostic;

/// Arguments for the eval command.
#[derive(Debug, clap::Args)]
pub struct EvalArgs {
    /// Directory containing the .arb files
    #[arg(long, required = true)]
    pub dir: PathBuf,

    /// Locale to render in (e.g., en, pt-BR)
    #[arg(long, required = true)]
    pub locale: String,

    /// Message key to render
    #[arg(long, required = true)]
    pub key: String,

    /// Arguments in name=value format (repeatable)
    #[arg(short = 'p', long = "param", value_parser = parse_key_val)]
    pub params: Vec<(String, String)>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// JSON output for eval results.
#[derive(Serialize)]
pub struct EvalResult {
    pub locale: String,
    pub key: String,
    pub result: String,
}

/// Parse a name=value parameter string.
fn parse_key_val(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .ok_or_else(|| format!("invalid parameter format '{}': expected name=value", s))
}

/// Integers, then floats, then booleans; anything else is a string.
fn parse_value(raw: String) -> Value {
    if let Ok(n) = raw.parse::<i64>() {
        Value::from(n)
    } else if let Ok(f) = raw.parse::<f64>() {
        Value::from(f)
    } else if let Ok(b) = raw.parse::<bool>() {
        Value::from(b)
    } else {
        Value::from(raw)
    }
}

/// Open `dir` and switch to `locale`, keeping the configured fallback.
fn open_in_locale(dir: &Path, locale: &LocaleId) -> miette::Result<Localizations> {
    let l10n = open_directory(dir)?;
    l10n.set_locale(locale.clone());
    Ok(l10n)
}

/// Run the eval command.
pub fn run_eval(args: EvalArgs) -> miette::Result<i32> {
    let locale = LocaleId::parse(&args.locale).map_err(|e| miette!("{}", e))?;
    let l10n = open_in_locale(&args.dir, &locale)?;

    let params: Args = args
        .params
        .into_iter()
        .map(|(name, raw)| (name, parse_value(raw)))
        .collect();
    debug!(key = %args.key, locale = %locale, params = params.len(), "evaluating");

    match l10n.translate(&args.key, &params) {
        Ok(result) => {
            if args.json {
                let output = EvalResult {
                    locale: locale.to_string(),
                    key: args.key,
                    result,
                };
                let json = serde_json::to_string_pretty(&output)
                    .map_err(|e| miette!("Failed to serialize result: {}", e))?;
                println!("{}", json);
            } else {
                println!("{}", result);
            }
            Ok(exitcode::OK)
        }
        Err(TranslateError::Parse {
            key,
            locale: bundle_locale,
            source,
        }) if !args.json => {
            let template = l10n.raw_template(&key).unwrap_or_default();
            let name = format!("{}/{}", bundle_locale, key);
            Err(TemplateDiagnostic::from_parse_error(&name, &template, &source).into())
        }
        Err(e) => {
            if args.json {
                let output = serde_json::json!({
                    "error": e.to_string()
                });
                let json = serde_json::to_string_pretty(&output)
                    .map_err(|e| miette!("Failed to serialize error: {}", e))?;
                eprintln!("{}", json);
            } else {
                eprintln!("Evaluation error: {}", e);
            }
            Ok(exitcode::DATAERR)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use arbl::args;
    use tempfile::TempDir;

    use super::*;

    fn id(tag: &str) -> LocaleId {
        LocaleId::parse(tag).unwrap()
    }

    #[test]
    fn requested_locale_does_not_replace_fallback() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("app_en.arb"),
            r#"{"title": "Inbox", "only_en": "English"}"#,
        )
        .unwrap();
        fs::write(dir.path().join("app_fr.arb"), r#"{"title": "Boîte"}"#).unwrap();

        let l10n = open_in_locale(dir.path(), &id("fr")).unwrap();
        assert_eq!(l10n.current_locale(), id("fr"));
        assert_eq!(l10n.fallback_locale(), id("en"));
        assert_eq!(l10n.translate("title", &args! {}).unwrap(), "Boîte");
        assert_eq!(l10n.translate("only_en", &args! {}).unwrap(), "English");
    }

    #[test]
    fn parameter_values_are_typed() {
        assert_eq!(parse_value("3".to_string()), Value::Number(3));
        assert_eq!(parse_value("2.5".to_string()), Value::Float(2.5));
        assert_eq!(parse_value("true".to_string()), Value::Bool(true));
        assert_eq!(parse_value("Ada".to_string()), Value::from("Ada"));
        assert!(parse_key_val("novalue").is_err());
    }
}
