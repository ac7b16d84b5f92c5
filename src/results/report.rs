//! Report export
//!
//! Serializes a batch, its ledger and its summary into a comma-delimited
//! document: one row per test case followed by a blank line and a summary row.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::models::{Summary, TestCase};
use crate::results::ResultLedger;

/// Column names of the report header row
pub const REPORT_COLUMNS: [&str; 8] = [
    "Test Case ID",
    "Description",
    "Preconditions",
    "Steps",
    "Target URL",
    "Execution Status",
    "Execution Time (ms)",
    "Timestamp",
];

/// First field of the trailing summary row
pub const SUMMARY_MARKER: &str = "SUMMARY";

const NOT_EXECUTED: &str = "Not Executed";
const NOT_AVAILABLE: &str = "N/A";

/// Exported report ready to be written out
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Report {
    pub file_name: String,
    pub content: String,
}

impl Report {
    pub fn new(module_name: &str, content: String) -> Self {
        Self {
            file_name: report_file_name(module_name),
            content,
        }
    }

    /// Write the report into `dir`, creating it if needed
    pub fn write_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.content)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;

        info!("Report written to {}", path.display());
        Ok(path)
    }
}

/// Build the report text.
pub fn export(
    test_cases: &[TestCase],
    ledger: &ResultLedger,
    summary: &Summary,
    target_url: &str,
) -> String {
    let mut lines = Vec::with_capacity(test_cases.len() + 1);
    lines.push(REPORT_COLUMNS.join(","));

    for test_case in test_cases {
        let record = ledger.get(&test_case.id);
        let status = record
            .map(|r| r.status.label().to_string())
            .unwrap_or_else(|| NOT_EXECUTED.to_string());
        let execution_time = record
            .and_then(|r| r.execution_time_ms)
            .map(|ms| ms.to_string())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());
        let timestamp = record
            .map(|r| r.timestamp_iso())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());

        let row = [
            escape_field(&test_case.id),
            quote_field(&test_case.description),
            quote_field(&test_case.preconditions),
            quote_field(&test_case.steps),
            escape_field(target_url),
            escape_field(&status),
            execution_time,
            timestamp,
        ];
        lines.push(row.join(","));
    }

    let summary_row = [
        SUMMARY_MARKER.to_string(),
        format!("Total: {}", summary.total),
        format!("Passed: {}", summary.passed),
        format!("Failed: {}", summary.failed),
        format!("Skipped: {}", summary.skipped),
        format!("Success Rate: {}%", summary.success_rate_percent),
    ]
    .join(",");

    format!("{}\n\n{}", lines.join("\n"), summary_row)
}

/// `test_cases_<module>_with_results.csv`, whitespace runs in the module name
/// replaced by a single underscore. Path separators become underscores too,
/// so the report always lands directly in the target directory.
pub fn report_file_name(module_name: &str) -> String {
    let mut slug = String::with_capacity(module_name.len());
    let mut in_whitespace = false;
    for c in module_name.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                slug.push('_');
            }
            in_whitespace = true;
        } else {
            slug.push(if matches!(c, '/' | '\\') { '_' } else { c });
            in_whitespace = false;
        }
    }
    format!("test_cases_{slug}_with_results.csv")
}

/// Always quote, doubling embedded quotes
fn quote_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Quote only when the value would otherwise break the row
fn escape_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        quote_field(value)
    } else {
        value.to_string()
    }
}
