//! Environment variable configuration
//!
//! Provides environment variable overrides for configuration.

use std::env;

/// Environment variable prefix
const ENV_PREFIX: &str = "TEST_ORCHESTRATOR";

/// Configuration read from environment variables
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EnvConfig {
    /// Generation service URL from TEST_ORCHESTRATOR_API_URL
    pub api_url: Option<String>,
    /// HTTP timeout from TEST_ORCHESTRATOR_TIMEOUT
    pub timeout: Option<u64>,
    /// Report directory from TEST_ORCHESTRATOR_OUTPUT_DIR
    pub output_dir: Option<String>,
    /// Draw seed from TEST_ORCHESTRATOR_SEED
    pub seed: Option<u64>,
    /// Config file from TEST_ORCHESTRATOR_CONFIG
    pub config_file: Option<String>,
    /// Log level from TEST_ORCHESTRATOR_LOG
    pub log_level: Option<String>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load using an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(&format!("{ENV_PREFIX}_{name}"));
        Self {
            api_url: get("API_URL"),
            timeout: get("TIMEOUT").and_then(|v| v.parse().ok()),
            output_dir: get("OUTPUT_DIR"),
            seed: get("SEED").and_then(|v| v.parse().ok()),
            config_file: get("CONFIG"),
            log_level: get("LOG"),
        }
    }

    /// Check if any environment variables are set
    pub fn has_any(&self) -> bool {
        *self != Self::default()
    }

    /// Print current environment configuration
    pub fn print_summary(&self) {
        println!("Environment Configuration:");
        println!("  {}_API_URL:     {:?}", ENV_PREFIX, self.api_url);
        println!("  {}_TIMEOUT:     {:?}", ENV_PREFIX, self.timeout);
        println!("  {}_OUTPUT_DIR:  {:?}", ENV_PREFIX, self.output_dir);
        println!("  {}_SEED:        {:?}", ENV_PREFIX, self.seed);
        println!("  {}_CONFIG:      {:?}", ENV_PREFIX, self.config_file);
        println!("  {}_LOG:         {:?}", ENV_PREFIX, self.log_level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_empty_environment() {
        let env = EnvConfig::from_lookup(lookup(&[]));
        assert!(!env.has_any());
    }

    #[test]
    fn test_prefixed_variables() {
        let env = EnvConfig::from_lookup(lookup(&[
            ("TEST_ORCHESTRATOR_API_URL", "https://api.example.com"),
            ("TEST_ORCHESTRATOR_TIMEOUT", "10"),
            ("TEST_ORCHESTRATOR_SEED", "not-a-number"),
            ("API_URL", "ignored"),
        ]));

        assert!(env.has_any());
        assert_eq!(env.api_url.as_deref(), Some("https://api.example.com"));
        assert_eq!(env.timeout, Some(10));
        assert_eq!(env.seed, None);
    }
}
