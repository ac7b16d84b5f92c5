//! Output formatters for execution results
//!
//! Provides JSON, Table, and summary output formats.

#![allow(dead_code)]

use crate::executor::{ExecutionEvent, SessionSnapshot};
use crate::models::{ExecutionStatus, Summary, Verdict};

const DESCRIPTION_WIDTH: usize = 40;

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    JsonPretty,
    Summary,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "table" => Some(OutputFormat::Table),
            "json" => Some(OutputFormat::Json),
            "json-pretty" | "jsonpretty" => Some(OutputFormat::JsonPretty),
            "summary" => Some(OutputFormat::Summary),
            _ => None,
        }
    }

    fn is_json(&self) -> bool {
        matches!(self, OutputFormat::Json | OutputFormat::JsonPretty)
    }
}

/// Result formatter
pub struct ResultFormatter {
    format: OutputFormat,
    colorize: bool,
}

impl ResultFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            colorize: true,
        }
    }

    pub fn no_color(mut self) -> Self {
        self.colorize = false;
        self
    }

    fn paint(&self, text: &str, status: ExecutionStatus) -> String {
        if !self.colorize {
            return text.to_string();
        }
        let code = match status {
            ExecutionStatus::Passed => "32",
            ExecutionStatus::Failed => "31",
            ExecutionStatus::Skipped => "33",
            ExecutionStatus::Executing => "36",
            ExecutionStatus::NotExecuted => return text.to_string(),
        };
        format!("\x1b[{code}m{text}\x1b[0m")
    }

    fn status_cell(&self, status: ExecutionStatus) -> String {
        let text = format!("{} {:12}", status.symbol(), status.label());
        self.paint(&text, status)
    }

    /// Progress line for a live event; JSON formats stay quiet until the end
    pub fn format_event(&self, event: &ExecutionEvent) -> Option<String> {
        if self.format.is_json() {
            return None;
        }

        match event {
            ExecutionEvent::RunStarted { total, .. } => {
                Some(format!("Executing {total} test cases..."))
            }
            ExecutionEvent::TestStarted { index, id, .. } if self.format == OutputFormat::Table => {
                Some(format!(
                    "{:3}. {:24} {}",
                    index + 1,
                    id,
                    self.status_cell(ExecutionStatus::Executing)
                ))
            }
            ExecutionEvent::TestStarted { .. } => None,
            ExecutionEvent::TestFinished {
                index,
                id,
                verdict,
                execution_time_ms,
                ..
            } => Some(self.format_verdict_line(*index, id, *verdict, *execution_time_ms)),
            ExecutionEvent::RunCompleted { summary, .. } => Some(self.format_summary(summary)),
            ExecutionEvent::RunAbandoned { .. } => Some("Run abandoned".to_string()),
        }
    }

    fn format_verdict_line(&self, index: usize, id: &str, verdict: Verdict, ms: u64) -> String {
        let status = ExecutionStatus::from(verdict);
        match self.format {
            OutputFormat::Summary => format!("{} {} ({}ms)", status.symbol(), id, ms),
            _ => format!(
                "{:3}. {:24} {} [{:>5}ms]",
                index + 1,
                id,
                self.status_cell(status),
                ms
            ),
        }
    }

    /// Format the aggregate counts
    pub fn format_summary(&self, summary: &Summary) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string(summary).unwrap_or_default(),
            OutputFormat::JsonPretty => serde_json::to_string_pretty(summary).unwrap_or_default(),
            OutputFormat::Summary => format!(
                "{}/{} passed ({}%)",
                summary.passed, summary.total, summary.success_rate_percent
            ),
            OutputFormat::Table => self.format_summary_table(summary),
        }
    }

    fn format_summary_table(&self, summary: &Summary) -> String {
        let passed = summary.passed.to_string();
        let failed = summary.failed.to_string();
        let skipped = summary.skipped.to_string();

        let mut output = String::new();
        output.push_str("\n═══════════════════════════════════════════════════════════════\n");
        output.push_str(&format!(
            " Total: {} | Passed: {} | Failed: {} | Skipped: {}\n",
            summary.total,
            self.paint(&passed, ExecutionStatus::Passed),
            if summary.failed > 0 {
                self.paint(&failed, ExecutionStatus::Failed)
            } else {
                failed
            },
            self.paint(&skipped, ExecutionStatus::Skipped),
        ));
        output.push_str(&format!(
            " Success Rate: {}%\n",
            summary.success_rate_percent
        ));
        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output
    }

    /// Format the whole batch with each test case's current record
    pub fn format_snapshot(&self, snapshot: &SessionSnapshot) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string(snapshot).unwrap_or_default(),
            OutputFormat::JsonPretty => serde_json::to_string_pretty(snapshot).unwrap_or_default(),
            OutputFormat::Summary => self.format_summary(&snapshot.summary),
            OutputFormat::Table => self.format_snapshot_table(snapshot),
        }
    }

    fn format_snapshot_table(&self, snapshot: &SessionSnapshot) -> String {
        let mut output = String::new();

        if let Some(request) = &snapshot.request {
            output.push_str(&format!(
                "\n {} - {} ({})\n",
                request.test_case_type, request.module_name, request.url
            ));
        }
        output.push_str(
            "┌──────────────────────────┬──────────────────────────────────────────┬────────────────┬──────────┐\n",
        );
        output.push_str(
            "│ Test Case ID             │ Description                              │ Status         │ Time     │\n",
        );
        output.push_str(
            "├──────────────────────────┼──────────────────────────────────────────┼────────────────┼──────────┤\n",
        );

        for test_case in &snapshot.test_cases {
            let record = snapshot.ledger.get(&test_case.id);
            let status = record.map(|r| r.status).unwrap_or_default();
            let time = record
                .and_then(|r| r.execution_time_ms)
                .map(|ms| format!("{ms}ms"))
                .unwrap_or_else(|| "N/A".to_string());

            output.push_str(&format!(
                "│ {:24} │ {:40} │ {} │ {:>8} │\n",
                truncate(&test_case.id, 24),
                truncate(&test_case.description, DESCRIPTION_WIDTH),
                self.status_cell(status),
                time
            ));
        }

        output.push_str(
            "└──────────────────────────┴──────────────────────────────────────────┴────────────────┴──────────┘\n",
        );
        output.push_str(&self.format_summary_table(&snapshot.summary));
        output
    }
}

impl Default for ResultFormatter {
    fn default() -> Self {
        Self::new(OutputFormat::Table)
    }
}

/// Cut `text` to at most `width` characters, marking the cut with `~`
fn truncate(text: &str, width: usize) -> String {
    let single_line = text.replace('\n', " ");
    if single_line.chars().count() <= width {
        return single_line;
    }
    let mut cut: String = single_line.chars().take(width.saturating_sub(1)).collect();
    cut.push('~');
    cut
}
