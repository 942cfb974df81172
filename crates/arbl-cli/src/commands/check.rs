//! Implementation of the `arbl check` command.

use std::path::PathBuf;

use arbl::BundleWarning;
use miette::{miette, Result};
use owo_colors::OwoColorize;
use serde::Serialize;

use crate::commands::open_directory;

/// Arguments for the check command.
#[derive(Debug, clap::Args)]
pub struct CheckArgs {
    /// Directory containing the .arb files
    #[arg(required = true)]
    pub dir: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Treat lint warnings as failures
    #[arg(long)]
    pub strict: bool,
}

#[derive(Debug, Serialize)]
struct CheckJson {
    errors: Vec<String>,
    warnings: Vec<String>,
}

fn is_error(warning: &BundleWarning) -> bool {
    matches!(warning, BundleWarning::InvalidTemplate { .. })
}

/// Run the check command.
///
/// Files that fail to load and templates that fail to parse are errors;
/// everything else reported by the linter is a warning.
pub fn run_check(args: CheckArgs) -> Result<i32> {
    let l10n = open_directory(&args.dir)?;
    let report = l10n.last_load_report();

    let mut errors: Vec<String> = report.errors.iter().map(ToString::to_string).collect();
    let mut warnings = Vec::new();
    for warning in l10n.lint() {
        if is_error(&warning) {
            errors.push(warning.to_string());
        } else {
            warnings.push(warning.to_string());
        }
    }

    if args.json {
        let output = CheckJson {
            errors: errors.clone(),
            warnings: warnings.clone(),
        };
        let json = serde_json::to_string_pretty(&output)
            .map_err(|e| miette!("Failed to serialize result: {}", e))?;
        println!("{}", json);
    } else {
        for error in &errors {
            eprintln!("{} {}", "error:".red().bold(), error);
        }
        for warning in &warnings {
            eprintln!("{} {}", "warning:".yellow().bold(), warning);
        }
        println!(
            "{} locale(s) loaded, {} error(s), {} warning(s)",
            report.loaded.len(),
            errors.len(),
            warnings.len()
        );
    }

    if !errors.is_empty() || (args.strict && !warnings.is_empty()) {
        Ok(exitcode::DATAERR)
    } else {
        Ok(exitcode::OK)
    }
}
