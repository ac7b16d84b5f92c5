//! HTTP client for the test case generation service

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{GenerationError, TestCaseSource};
use crate::models::{GenerationRequest, TestCase};

const GENERATE_PATH: &str = "/generate-test-cases";
const GENERIC_FAILURE: &str = "Failed to generate test cases";

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    test_cases: Vec<TestCase>,
    #[serde(default)]
    total_count: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    detail: serde_json::Value,
}

/// Generation service reached over HTTP
#[derive(Clone)]
pub struct ApiSource {
    client: Client,
    base_url: String,
    timeout_secs: u64,
}

impl ApiSource {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, 30)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            timeout_secs,
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), GENERATE_PATH)
    }
}

#[async_trait]
impl TestCaseSource for ApiSource {
    fn name(&self) -> &'static str {
        "generation service"
    }

    async fn fetch(&self, request: &GenerationRequest) -> Result<Vec<TestCase>, GenerationError> {
        let url = self.endpoint();
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationError::Upstream(format!(
                        "{GENERIC_FAILURE}: timed out after {} seconds",
                        self.timeout_secs
                    ))
                } else if e.is_connect() {
                    GenerationError::Upstream(format!("{GENERIC_FAILURE}: cannot reach {url}"))
                } else {
                    GenerationError::Upstream(format!("{GENERIC_FAILURE}: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GenerationError::Upstream(format!("{GENERIC_FAILURE}: {e}")))?;

        debug!("Response: {} ({} bytes)", status.as_u16(), body.len());

        if !status.is_success() {
            return Err(GenerationError::Upstream(error_detail(&body)));
        }

        parse_response(&body)
    }
}

/// Decode a successful response body
fn parse_response(body: &str) -> Result<Vec<TestCase>, GenerationError> {
    let response: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| GenerationError::UnexpectedShape(e.to_string()))?;

    if let Some(total) = response.total_count {
        if total != response.test_cases.len() {
            debug!(
                "total_count {} differs from {} returned test cases",
                total,
                response.test_cases.len()
            );
        }
    }

    Ok(response.test_cases)
}

/// The service's `detail` message, or a generic reason
fn error_detail(body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(ErrorResponse {
            detail: serde_json::Value::String(detail),
        }) if !detail.is_empty() => detail,
        _ => GENERIC_FAILURE.to_string(),
    }
}
