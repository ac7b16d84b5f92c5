//! Test case sources
//!
//! The orchestrator consumes test cases from an upstream generator. The
//! remote generation service is reached over HTTP; templates and previously
//! exported reports serve as offline sources.

#![allow(dead_code)]

mod api;
mod csv_file;
mod template;

pub use api::ApiSource;
pub use csv_file::CsvSource;
pub use template::TemplateSource;

use async_trait::async_trait;
use std::collections::HashSet;
use thiserror::Error;

use crate::models::{GenerationRequest, TestCase};

/// Errors that keep a batch from being installed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Upstream(String),

    #[error("Unexpected response: {0}")]
    UnexpectedShape(String),
}

/// Anything that can turn a generation request into test cases
#[async_trait]
pub trait TestCaseSource: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    async fn fetch(&self, request: &GenerationRequest) -> Result<Vec<TestCase>, GenerationError>;
}

/// A batch must hold at least one test case; ids must be present and unique
pub fn check_shape(test_cases: &[TestCase]) -> Result<(), GenerationError> {
    if test_cases.is_empty() {
        return Err(GenerationError::UnexpectedShape(
            "no test cases returned".to_string(),
        ));
    }
    let mut seen = HashSet::with_capacity(test_cases.len());
    for (index, test_case) in test_cases.iter().enumerate() {
        if test_case.id.trim().is_empty() {
            return Err(GenerationError::UnexpectedShape(format!(
                "test case #{} has no id",
                index + 1
            )));
        }
        if !seen.insert(test_case.id.as_str()) {
            return Err(GenerationError::UnexpectedShape(format!(
                "duplicate test case id {}",
                test_case.id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_shape() {
        let ok = vec![
            TestCase::new("TC_1", "a", "b", "c"),
            TestCase::new("TC_2", "a", "b", "c"),
        ];
        assert!(check_shape(&ok).is_ok());
        assert_eq!(
            check_shape(&[]),
            Err(GenerationError::UnexpectedShape(
                "no test cases returned".to_string()
            ))
        );

        let blank = vec![TestCase::new(" ", "a", "b", "c")];
        assert!(matches!(
            check_shape(&blank),
            Err(GenerationError::UnexpectedShape(_))
        ));

        let dup = vec![
            TestCase::new("TC_1", "a", "b", "c"),
            TestCase::new("TC_1", "d", "e", "f"),
        ];
        assert_eq!(
            check_shape(&dup),
            Err(GenerationError::UnexpectedShape(
                "duplicate test case id TC_1".to_string()
            ))
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            GenerationError::Upstream("Failed to generate test cases".to_string()).to_string(),
            "Failed to generate test cases"
        );
        assert_eq!(
            GenerationError::InvalidRequest("URL cannot be empty".to_string()).to_string(),
            "Invalid request: URL cannot be empty"
        );
    }
}
