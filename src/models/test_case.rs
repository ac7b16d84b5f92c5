//! Test case descriptors and generation requests
//!
//! Test cases are produced by an upstream generator and never mutated here.

#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a generated batch
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TestCaseType {
    #[default]
    #[serde(rename = "Functional Test Cases")]
    Functional,
    #[serde(rename = "Regression Test Cases")]
    Regression,
    #[serde(rename = "Security Test Cases")]
    Security,
    #[serde(rename = "Performance Test Cases")]
    Performance,
    #[serde(rename = "Usability Test Cases")]
    Usability,
}

impl TestCaseType {
    /// Wire label used by the generation service
    pub fn label(&self) -> &'static str {
        match self {
            TestCaseType::Functional => "Functional Test Cases",
            TestCaseType::Regression => "Regression Test Cases",
            TestCaseType::Security => "Security Test Cases",
            TestCaseType::Performance => "Performance Test Cases",
            TestCaseType::Usability => "Usability Test Cases",
        }
    }

    /// Short name accepted on the command line
    pub fn short_name(&self) -> &'static str {
        match self {
            TestCaseType::Functional => "functional",
            TestCaseType::Regression => "regression",
            TestCaseType::Security => "security",
            TestCaseType::Performance => "performance",
            TestCaseType::Usability => "usability",
        }
    }

    /// Suggested module names for this category
    pub fn modules(&self) -> &'static [&'static str] {
        match self {
            TestCaseType::Functional => &[
                "Broken link",
                "Wrong output",
                "Failed validation",
                "Missing data",
                "Incorrect logic",
                "Non-clickable",
                "Wrong navigation",
                "API failure",
            ],
            TestCaseType::Performance => &[
                "Slow load",
                "Timeout",
                "Lag",
                "Freeze",
                "Crash",
                "Bottleneck",
                "Memory leak",
                "High CPU",
                "Network delay",
            ],
            TestCaseType::Regression => &[
                "Feature: break",
                "Data loss",
                "UI mismatch",
                "Workflow failure",
                "Function rollback",
                "Integration error",
            ],
            TestCaseType::Security => &[
                "Data breach",
                "Injection",
                "Weak password",
                "No encryption",
                "Auth bypass",
                "Session hijack",
                "CSRF",
                "XSS",
            ],
            TestCaseType::Usability => &[
                "Poor layout",
                "Small font",
                "Bad contrast",
                "Misaligned",
                "Confusing nav",
                "Missing tooltip",
                "Overcrowded",
                "Hard clicks",
            ],
        }
    }

    /// Module selected by default when switching to this category
    pub fn default_module(&self) -> &'static str {
        self.modules()[0]
    }

    /// All categories in display order
    pub fn all() -> Vec<TestCaseType> {
        vec![
            TestCaseType::Functional,
            TestCaseType::Regression,
            TestCaseType::Security,
            TestCaseType::Performance,
            TestCaseType::Usability,
        ]
    }

    /// Parse from the wire label ("Security Test Cases")
    pub fn from_label(label: &str) -> Option<Self> {
        Self::all().into_iter().find(|t| t.label() == label)
    }

    /// Parse from a short name or a wire label, case-insensitive
    pub fn from_str(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        Self::all()
            .into_iter()
            .find(|t| t.short_name() == lower || t.label().to_lowercase() == lower)
    }
}

impl fmt::Display for TestCaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A generated test case descriptor
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    #[serde(rename = "test_case_id")]
    pub id: String,
    pub description: String,
    pub preconditions: String,
    pub steps: String,
}

impl TestCase {
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        preconditions: impl Into<String>,
        steps: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            preconditions: preconditions.into(),
            steps: steps.into(),
        }
    }
}

impl fmt::Display for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.description)
    }
}

/// Parameters of a test case generation request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub test_case_type: TestCaseType,
    pub module_name: String,
    pub num_test_cases: u32,
    pub url: String,
}

impl GenerationRequest {
    pub const MIN_TEST_CASES: u32 = 5;
    pub const MAX_TEST_CASES: u32 = 28;
    pub const DEFAULT_TEST_CASES: u32 = 8;
    const MAX_MODULE_LEN: usize = 100;
    const MAX_URL_LEN: usize = 500;

    pub fn new(test_case_type: TestCaseType, module_name: impl Into<String>) -> Self {
        Self {
            test_case_type,
            module_name: module_name.into(),
            num_test_cases: Self::DEFAULT_TEST_CASES,
            url: "https://example.com".to_string(),
        }
    }

    pub fn with_count(mut self, count: u32) -> Self {
        self.num_test_cases = count;
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Trim free-text fields and check bounds.
    ///
    /// Returns the normalized request or a human-readable reason.
    pub fn validated(mut self) -> Result<Self, String> {
        self.module_name = self.module_name.trim().to_string();
        if self.module_name.is_empty() {
            return Err("Module name cannot be empty".to_string());
        }
        if self.module_name.chars().count() > Self::MAX_MODULE_LEN {
            return Err(format!(
                "Module name cannot exceed {} characters",
                Self::MAX_MODULE_LEN
            ));
        }

        if !(Self::MIN_TEST_CASES..=Self::MAX_TEST_CASES).contains(&self.num_test_cases) {
            return Err(format!(
                "Number of test cases must be between {} and {}",
                Self::MIN_TEST_CASES,
                Self::MAX_TEST_CASES
            ));
        }

        self.url = self.url.trim().to_string();
        if self.url.is_empty() {
            return Err("URL cannot be empty".to_string());
        }
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err("URL must start with http:// or https://".to_string());
        }
        if self.url.len() > Self::MAX_URL_LEN {
            return Err(format!("URL cannot exceed {} characters", Self::MAX_URL_LEN));
        }

        Ok(self)
    }
}

impl Default for GenerationRequest {
    fn default() -> Self {
        let test_case_type = TestCaseType::default();
        Self::new(test_case_type, test_case_type.default_module())
    }
}

/// Ordered test cases plus the request that produced them
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    pub request: GenerationRequest,
    pub test_cases: Vec<TestCase>,
}

impl Batch {
    pub fn new(request: GenerationRequest, test_cases: Vec<TestCase>) -> Self {
        Self {
            request,
            test_cases,
        }
    }

    pub fn len(&self) -> usize {
        self.test_cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.test_cases.is_empty()
    }

    pub fn category(&self) -> TestCaseType {
        self.request.test_case_type
    }

    pub fn contains(&self, id: &str) -> bool {
        self.test_cases.iter().any(|tc| tc.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_labels_round_trip() {
        for t in TestCaseType::all() {
            assert_eq!(TestCaseType::from_label(t.label()), Some(t));
            assert_eq!(TestCaseType::from_str(t.short_name()), Some(t));
        }
        assert_eq!(TestCaseType::from_label("Smoke Test Cases"), None);
        assert_eq!(
            TestCaseType::from_str("SECURITY test cases"),
            Some(TestCaseType::Security)
        );
    }

    #[test]
    fn test_type_serializes_as_label() {
        let json = serde_json::to_string(&TestCaseType::Performance).unwrap();
        assert_eq!(json, "\"Performance Test Cases\"");
    }

    #[test]
    fn test_default_module() {
        assert_eq!(TestCaseType::Functional.default_module(), "Broken link");
        assert_eq!(TestCaseType::Regression.default_module(), "Feature: break");
        assert_eq!(TestCaseType::Performance.modules().len(), 9);
    }

    #[test]
    fn test_case_wire_shape() {
        let tc: TestCase = serde_json::from_str(
            r#"{"test_case_id":"TC_1","description":"d","preconditions":"p","steps":"s"}"#,
        )
        .unwrap();
        assert_eq!(tc.id, "TC_1");
        assert_eq!(tc.steps, "s");
    }

    #[test]
    fn test_request_validation_trims() {
        let req = GenerationRequest::new(TestCaseType::Security, "  Injection ")
            .with_url(" https://example.com/login ")
            .validated()
            .unwrap();
        assert_eq!(req.module_name, "Injection");
        assert_eq!(req.url, "https://example.com/login");
    }

    #[test]
    fn test_request_validation_rejects() {
        let base = GenerationRequest::default();
        assert!(base.clone().with_count(4).validated().is_err());
        assert!(base.clone().with_count(29).validated().is_err());
        assert!(base.clone().with_count(28).validated().is_ok());
        assert!(base.clone().with_url("ftp://example.com").validated().is_err());
        assert!(base.clone().with_url("   ").validated().is_err());

        let mut blank = base.clone();
        blank.module_name = "   ".to_string();
        assert!(blank.validated().is_err());

        let mut long = base;
        long.module_name = "x".repeat(101);
        assert!(long.validated().is_err());
    }

    #[test]
    fn test_batch_contains() {
        let batch = Batch::new(
            GenerationRequest::default(),
            vec![TestCase::new("TC_1", "d", "p", "s")],
        );
        assert_eq!(batch.len(), 1);
        assert!(batch.contains("TC_1"));
        assert!(!batch.contains("TC_2"));
        assert_eq!(batch.category(), TestCaseType::Functional);
    }
}
