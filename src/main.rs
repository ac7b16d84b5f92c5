//! Test Orchestrator - Generate, Execute and Report Test Cases
//!
//! A CLI tool that requests a batch of test case descriptors from a
//! generation service, simulates executing them one at a time and exports
//! the results as a CSV report.
//!
//! ## Features
//!
//! - Five test case types with per-type verdict probabilities
//! - Sequential execution with live progress and safe cancellation
//! - Offline generation from templates, or reloading an exported report
//! - Multiple output formats (Table, JSON, Summary)
//! - CSV report with a trailing summary row
//!
//! ## Usage
//!
//! ```bash
//! # Generate and execute 8 functional test cases
//! test-orchestrator run --type functional --module "Broken link"
//!
//! # Without the generation service, reproducibly
//! test-orchestrator run --offline --type security --module XSS --seed 42
//!
//! # Re-execute the test cases of an earlier report
//! test-orchestrator run --from test_cases_XSS_with_results.csv
//!
//! # List suggested modules
//! test-orchestrator modules --type performance
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{info, warn};

mod cli;
mod config;
mod executor;
mod generator;
mod models;
mod outcome;
mod output;
mod results;
mod utils;

use cli::Args;
use config::{AppConfig, EnvConfig};
use executor::{ExecutionEvent, RunOutcome, Session, SessionSnapshot};
use generator::{check_shape, ApiSource, CsvSource, TemplateSource, TestCaseSource};
use models::{GenerationRequest, TestCaseType};
use outcome::RandomDraws;
use output::{OutputFormat, ResultFormatter};
use results::ResultLedger;
use utils::{init_logger, LogLevel};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let env = EnvConfig::load();

    let level = if args.verbose {
        LogLevel::Debug
    } else {
        env.log_level
            .as_deref()
            .and_then(LogLevel::from_str)
            .unwrap_or(LogLevel::Info)
    };
    init_logger(level);

    match args.command {
        cli::Command::Run(run_args) => {
            let config = load_config(args.config.as_deref(), &env)?;
            run_batch(run_args, config).await?;
        }
        cli::Command::Generate(generate_args) => {
            let config = load_config(args.config.as_deref(), &env)?;
            generate_batch(generate_args, config).await?;
        }
        cli::Command::Modules(modules_args) => {
            list_modules(modules_args)?;
        }
        cli::Command::Config(config_args) => {
            manage_config(config_args, args.config.as_deref(), &env)?;
        }
    }

    Ok(())
}

/// Explicit file, else `TEST_ORCHESTRATOR_CONFIG`, else the standard locations
fn load_config(path: Option<&Path>, env: &EnvConfig) -> Result<AppConfig> {
    let explicit = path
        .map(Path::to_path_buf)
        .or_else(|| env.config_file.as_ref().map(PathBuf::from));

    let mut config = match explicit {
        Some(path) => AppConfig::load(&path)?,
        None => AppConfig::load_default()?,
    };
    config.apply_env(env);
    config.validate()?;
    Ok(config)
}

fn parse_format(format: &str) -> Result<OutputFormat> {
    OutputFormat::from_str(format).ok_or_else(|| anyhow::anyhow!("Unknown output format: {format}"))
}

/// Merge command line request arguments over the configured defaults
fn build_request(args: &cli::RequestArgs, config: &AppConfig) -> Result<GenerationRequest> {
    let mut request = config.defaults.request();

    if let Some(name) = &args.test_case_type {
        let test_case_type = TestCaseType::from_str(name)
            .ok_or_else(|| anyhow::anyhow!("Unknown test case type: {name}"))?;
        if test_case_type != request.test_case_type && args.module.is_none() {
            request.module_name = test_case_type.default_module().to_string();
        }
        request.test_case_type = test_case_type;
    }
    if let Some(module) = &args.module {
        request.module_name = module.clone();
    }
    if let Some(num) = args.num {
        request.num_test_cases = num;
    }
    if let Some(url) = &args.url {
        request.url = url.clone();
    }

    Ok(request)
}

fn build_source(args: &cli::RequestArgs, config: &AppConfig) -> Result<Box<dyn TestCaseSource>> {
    if let Some(path) = &args.from {
        return Ok(Box::new(CsvSource::new(path)));
    }
    if args.offline {
        return Ok(Box::new(TemplateSource::new()));
    }

    let api_url = args.api_url.as_deref().unwrap_or(&config.api_url);
    Ok(Box::new(ApiSource::with_timeout(api_url, config.timeout_secs)?))
}

async fn run_batch(args: cli::RunArgs, config: AppConfig) -> Result<()> {
    let format = parse_format(&args.format)?;
    let mut formatter = ResultFormatter::new(format);
    if args.no_color {
        formatter = formatter.no_color();
    }

    let request = build_request(&args.request, &config)?;
    let source = build_source(&args.request, &config)?;
    let seed = args.seed.or(config.seed);

    let session = Session::new(
        config.execution.clone(),
        config.outcome.clone(),
        RandomDraws::from_seed(seed),
    );
    let mut events = session.subscribe();

    let epoch = session
        .generate(&*source, request)
        .await
        .context("Test case generation failed")?;

    // An empty batch never starts a run, so no final event would arrive
    let has_run = session.batch().is_some_and(|batch| !batch.is_empty());
    if has_run {
        follow_run(&mut events, epoch, &formatter).await;
    }

    match session.wait_for_run().await {
        Some(RunOutcome::Completed { summary, .. }) => {
            info!("Run {} completed: {}", epoch, summary);
        }
        Some(outcome) => warn!("Run {} ended early: {:?}", epoch, outcome),
        None => warn!("Run {} produced no outcome", epoch),
    }

    if format != OutputFormat::Summary {
        println!("{}", formatter.format_snapshot(&session.snapshot()));
    }

    if !args.no_report {
        if let Some(report) = session.export_report() {
            let dir = args.output.as_deref().unwrap_or(&config.output_dir);
            let path = report.write_to(dir)?;
            if format == OutputFormat::Table {
                println!("Report written to {}", path.display());
            }
        }
    }

    Ok(())
}

/// Print progress for the run of `epoch` until its final event
async fn follow_run(
    events: &mut broadcast::Receiver<ExecutionEvent>,
    epoch: u64,
    formatter: &ResultFormatter,
) {
    loop {
        match events.recv().await {
            Ok(event) if event.epoch() == epoch => {
                if let Some(line) = formatter.format_event(&event) {
                    println!("{line}");
                }
                if event.is_final() {
                    break;
                }
            }
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => warn!("Missed {} progress events", skipped),
            Err(RecvError::Closed) => break,
        }
    }
}

async fn generate_batch(args: cli::GenerateArgs, config: AppConfig) -> Result<()> {
    let formatter = ResultFormatter::new(parse_format(&args.format)?);

    let request = build_request(&args.request, &config)?
        .validated()
        .map_err(|reason| anyhow::anyhow!("Invalid request: {reason}"))?;
    let source = build_source(&args.request, &config)?;

    let test_cases = source.fetch(&request).await?;
    check_shape(&test_cases)?;

    let ledger = ResultLedger::new();
    let summary = results::summarize(&test_cases, &ledger);
    let snapshot = SessionSnapshot {
        epoch: 0,
        request: Some(request),
        test_cases,
        ledger,
        summary,
        running: false,
    };

    println!("{}", formatter.format_snapshot(&snapshot));
    Ok(())
}

fn list_modules(args: cli::ModulesArgs) -> Result<()> {
    let types = match &args.test_case_type {
        Some(name) => vec![TestCaseType::from_str(name)
            .ok_or_else(|| anyhow::anyhow!("Unknown test case type: {name}"))?],
        None => TestCaseType::all(),
    };

    println!("\nTest Case Types and Modules\n");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    for test_case_type in types {
        println!("\n{} ({}):", test_case_type.label(), test_case_type.short_name());
        println!("──────────────────────────────────────────────────────────────────────");
        for module in test_case_type.modules() {
            println!("  - {module}");
        }
    }

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    Ok(())
}

fn manage_config(args: cli::ConfigArgs, path: Option<&Path>, env: &EnvConfig) -> Result<()> {
    match args.action {
        cli::ConfigAction::Init { path, force } => {
            if path.exists() && !force {
                anyhow::bail!(
                    "Configuration file already exists: {}. Use --force to overwrite.",
                    path.display()
                );
            }

            AppConfig::default().save(&path)?;
            println!("✓ Configuration file created: {}", path.display());
            println!("\nEdit the file to customize your settings.");
        }

        cli::ConfigAction::Show => {
            let config = load_config(path, env)?;
            if env.has_any() {
                env.print_summary();
                println!();
            }
            println!("{}", serde_yaml::to_string(&config)?);
        }

        cli::ConfigAction::Validate { path } => match AppConfig::load(&path) {
            Ok(_) => {
                println!("✓ Configuration file is valid: {}", path.display());
            }
            Err(e) => {
                println!("✗ Configuration file is invalid: {}", path.display());
                println!("  Error: {e:#}");
                return Err(e);
            }
        },
    }

    Ok(())
}
