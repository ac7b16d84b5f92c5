//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Generate test cases and simulate their execution
#[derive(Parser, Debug)]
#[command(name = "test-orchestrator")]
#[command(version = "0.1.0")]
#[command(about = "Generate test cases, simulate their execution and export a CSV report")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file (defaults to the standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a batch and execute it
    Run(RunArgs),

    /// Generate a batch and print it without executing
    Generate(GenerateArgs),

    /// List test case types and their suggested modules
    Modules(ModulesArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

/// Request parameters shared by `run` and `generate`
#[derive(Parser, Debug, Clone)]
pub struct RequestArgs {
    /// Test case type (functional, regression, security, performance, usability)
    #[arg(short = 't', long = "type")]
    pub test_case_type: Option<String>,

    /// Module name
    #[arg(short, long)]
    pub module: Option<String>,

    /// Number of test cases (5-28)
    #[arg(short, long)]
    pub num: Option<u32>,

    /// Target URL
    #[arg(short, long)]
    pub url: Option<String>,

    /// Build test cases from local templates instead of the generation service
    #[arg(long)]
    pub offline: bool,

    /// Reload test cases from an exported report
    #[arg(long, conflicts_with = "offline")]
    pub from: Option<PathBuf>,

    /// Generation service URL
    #[arg(long)]
    pub api_url: Option<String>,
}

/// Arguments for run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub request: RequestArgs,

    /// Seed for reproducible durations and verdicts
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output format (table, json, json-pretty, summary)
    #[arg(short, long, default_value = "table")]
    pub format: String,

    /// Directory for the CSV report
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Do not write a CSV report
    #[arg(long)]
    pub no_report: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

/// Arguments for generate command
#[derive(Parser, Debug)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub request: RequestArgs,

    /// Output format (table, json, json-pretty, summary)
    #[arg(short, long, default_value = "table")]
    pub format: String,
}

/// Arguments for modules command
#[derive(Parser, Debug)]
pub struct ModulesArgs {
    /// Only list modules of this type
    #[arg(short = 't', long = "type")]
    pub test_case_type: Option<String>,
}

/// Arguments for config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write a configuration file with default values
    Init {
        /// Destination (.yaml, .yml or .json)
        #[arg(default_value = "test-orchestrator.yaml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show the effective configuration
    Show,

    /// Validate a configuration file
    Validate {
        /// File to validate
        path: PathBuf,
    },
}
