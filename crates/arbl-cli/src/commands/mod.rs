//! CLI command implementations.

mod check;
mod coverage;
mod eval;

use std::path::Path;

use arbl::{L10nConfig, Localizations};
use miette::{miette, Result};

pub use check::{run_check, CheckArgs};
pub use coverage::{run_coverage, CoverageArgs};
pub use eval::{run_eval, EvalArgs};

/// Open a bundle directory without hot reload.
fn open_directory(dir: &Path) -> Result<Localizations> {
    let config = L10nConfig::builder().arb_dir(dir).build();
    Localizations::open(config)
        .map_err(|e| miette!("Failed to open bundle directory {}: {}", dir.display(), e))
}
