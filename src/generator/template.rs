//! Offline test case generation from per-category templates

use async_trait::async_trait;

use super::{GenerationError, TestCaseSource};
use crate::models::{GenerationRequest, TestCase, TestCaseType};

/// Builds test cases locally without calling the generation service
#[derive(Clone, Debug, Default)]
pub struct TemplateSource;

impl TemplateSource {
    pub fn new() -> Self {
        Self
    }

    fn templates(test_case_type: TestCaseType) -> [&'static str; 4] {
        match test_case_type {
            TestCaseType::Functional => [
                "Verify {feature} functionality works correctly",
                "Test {feature} with valid inputs",
                "Validate {feature} error handling",
                "Check {feature} integration points",
            ],
            TestCaseType::Regression => [
                "Ensure {feature} still works after recent changes",
                "Verify {feature} backward compatibility",
                "Test {feature} with existing data",
                "Validate {feature} performance after updates",
            ],
            TestCaseType::Security => [
                "Test {feature} authentication requirements",
                "Verify {feature} authorization controls",
                "Validate {feature} input sanitization",
                "Check {feature} for potential vulnerabilities",
            ],
            TestCaseType::Performance => [
                "Test {feature} response time under normal load",
                "Verify {feature} performance with large datasets",
                "Validate {feature} memory usage",
                "Check {feature} scalability limits",
            ],
            TestCaseType::Usability => [
                "Test {feature} user interface navigation",
                "Verify {feature} accessibility features",
                "Validate {feature} user experience flow",
                "Check {feature} error message clarity",
            ],
        }
    }

    /// Generate `request.num_test_cases` descriptors
    pub fn build(&self, request: &GenerationRequest) -> Vec<TestCase> {
        let module = &request.module_name;
        let module_id = module.to_uppercase().replace(' ', "_");
        let templates = Self::templates(request.test_case_type);

        (0..request.num_test_cases as usize)
            .map(|i| {
                TestCase::new(
                    format!("TC_{module_id}_{:03}", i + 1),
                    templates[i % templates.len()].replace("{feature}", module),
                    format!("User is logged in and {module} module is accessible"),
                    format!(
                        "1. Navigate to {}\n2. Access {module} module\n3. Perform required actions\n\
                         4. Verify expected results\n5. Document any issues found",
                        request.url
                    ),
                )
            })
            .collect()
    }
}

#[async_trait]
impl TestCaseSource for TemplateSource {
    fn name(&self) -> &'static str {
        "templates"
    }

    async fn fetch(&self, request: &GenerationRequest) -> Result<Vec<TestCase>, GenerationError> {
        Ok(self.build(request))
    }
}
