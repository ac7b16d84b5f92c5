//! Configuration module
//!
//! Handles loading, locating and validating configuration.

#![allow(dead_code)]

mod env;

pub use env::EnvConfig;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::executor::ExecutionTiming;
use crate::models::{GenerationRequest, TestCaseType};
use crate::outcome::OutcomePolicy;

/// Configuration file locations (in order of precedence)
const CONFIG_LOCATIONS: &[&str] = &[
    "./test-orchestrator.yaml",
    "./test-orchestrator.yml",
    "./.test-orchestrator.yaml",
    "~/.config/test-orchestrator/config.yaml",
];

/// Application configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the test case generation service
    pub api_url: String,

    /// HTTP timeout in seconds
    pub timeout_secs: u64,

    /// Directory reports are written to
    pub output_dir: PathBuf,

    /// Seed for reproducible simulated runs
    pub seed: Option<u64>,

    /// Default generation request parameters
    pub defaults: RequestDefaults,

    /// Simulated execution timing
    pub execution: ExecutionTiming,

    /// Verdict bands per test case type
    pub outcome: OutcomePolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:3000".to_string(),
            timeout_secs: 30,
            output_dir: PathBuf::from("."),
            seed: None,
            defaults: RequestDefaults::default(),
            execution: ExecutionTiming::default(),
            outcome: OutcomePolicy::default(),
        }
    }
}

impl AppConfig {
    /// Find configuration file in standard locations
    pub fn find() -> Option<PathBuf> {
        CONFIG_LOCATIONS
            .iter()
            .map(|location| expand_path(location))
            .find(|path| path.exists())
    }

    /// Load configuration from default location, falling back to defaults
    pub fn load_default() -> Result<Self> {
        match Self::find() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = if is_yaml_file(path) {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?
        };

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = if is_yaml_file(path) {
            serde_yaml::to_string(self).context("Failed to serialize config")?
        } else {
            serde_json::to_string_pretty(self).context("Failed to serialize config")?
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            anyhow::bail!("api_url must start with http:// or https://: {}", self.api_url);
        }
        if self.timeout_secs == 0 {
            anyhow::bail!("timeout_secs must be greater than zero");
        }
        self.execution
            .validate()
            .context("Invalid execution timing")?;
        self.outcome.validate().context("Invalid outcome policy")?;
        self.defaults
            .request()
            .validated()
            .map_err(|reason| anyhow::anyhow!("Invalid request defaults: {reason}"))?;
        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env(&mut self, env: &EnvConfig) {
        if let Some(api_url) = &env.api_url {
            self.api_url = api_url.clone();
        }
        if let Some(timeout) = env.timeout {
            self.timeout_secs = timeout;
        }
        if let Some(output_dir) = &env.output_dir {
            self.output_dir = PathBuf::from(output_dir);
        }
        if env.seed.is_some() {
            self.seed = env.seed;
        }
    }
}

/// Defaults used when the command line leaves request fields out
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestDefaults {
    pub test_case_type: TestCaseType,
    pub module_name: String,
    pub num_test_cases: u32,
    pub url: String,
}

impl Default for RequestDefaults {
    fn default() -> Self {
        let request = GenerationRequest::default();
        Self {
            test_case_type: request.test_case_type,
            module_name: request.module_name,
            num_test_cases: request.num_test_cases,
            url: request.url,
        }
    }
}

impl RequestDefaults {
    pub fn request(&self) -> GenerationRequest {
        GenerationRequest::new(self.test_case_type, self.module_name.clone())
            .with_count(self.num_test_cases)
            .with_url(self.url.clone())
    }
}

/// Expand ~ to home directory
fn expand_path(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

/// Check if file is YAML based on extension
fn is_yaml_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e == "yaml" || e == "yml")
        .unwrap_or(false)
}
