//! Table formatting utilities for CLI output.

use arbl::CoverageReport;
use comfy_table::{presets, ContentArrangement, Table};

/// Format coverage data as an ASCII table.
pub fn format_coverage_table(report: &CoverageReport) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_BORDERS_ONLY);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Locale", "Coverage", "Percent", "Missing"]);

    for locale in &report.locales {
        table.add_row(vec![
            locale.locale.to_string(),
            format!("{}/{}", locale.translated, report.total_keys),
            format!("{:.1}%", locale.percent()),
            locale.missing.len().to_string(),
        ]);
    }

    table
}
