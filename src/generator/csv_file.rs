//! Reload the test cases of a previously exported report

use async_trait::async_trait;
use std::path::PathBuf;

use super::{GenerationError, TestCaseSource};
use crate::models::{GenerationRequest, TestCase};
use crate::results::{REPORT_COLUMNS, SUMMARY_MARKER};

/// Reads test cases from a report file; execution columns are ignored
#[derive(Clone, Debug)]
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TestCaseSource for CsvSource {
    fn name(&self) -> &'static str {
        "report file"
    }

    async fn fetch(&self, _request: &GenerationRequest) -> Result<Vec<TestCase>, GenerationError> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            GenerationError::Upstream(format!("Failed to read {}: {e}", self.path.display()))
        })?;
        parse_report(&content)
    }
}

/// Extract test cases from report text, stopping at the summary row
pub fn parse_report(content: &str) -> Result<Vec<TestCase>, GenerationError> {
    let shape = |e: csv::Error| GenerationError::UnexpectedShape(e.to_string());

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader.headers().map_err(shape)?.clone();
    let column = |name: &str| {
        headers.iter().position(|h| h == name).ok_or_else(|| {
            GenerationError::UnexpectedShape(format!("missing column '{name}'"))
        })
    };
    let id_col = column(REPORT_COLUMNS[0])?;
    let description_col = column(REPORT_COLUMNS[1])?;
    let preconditions_col = column(REPORT_COLUMNS[2])?;
    let steps_col = column(REPORT_COLUMNS[3])?;

    let mut test_cases = Vec::new();
    for record in reader.records() {
        let record = record.map_err(shape)?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        if record.get(0) == Some(SUMMARY_MARKER) {
            break;
        }

        let field = |idx: usize| record.get(idx).unwrap_or_default().to_string();
        test_cases.push(TestCase::new(
            field(id_col),
            field(description_col),
            field(preconditions_col),
            field(steps_col),
        ));
    }

    Ok(test_cases)
}
