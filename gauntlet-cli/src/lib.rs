#![warn(missing_docs)]
//! Gauntlet CLI Library
//!
//! This module provides the CLI infrastructure for benchmark binaries.
//! Build a [`Suite`] of tests and hand it to `gauntlet::run()` (or
//! `gauntlet_cli::run()`) in your main function to get the full gauntlet
//! CLI experience.
//!
//! # Example
//!
//! ```ignore
//! use gauntlet::prelude::*;
//!
//! fn main() -> anyhow::Result<()> {
//!     let suite = Suite::new("hashing")
//!         .test(FnSpec::new("fnv", |n| Ok(vec![hash_fnv(n as usize)])))
//!         .params([1_000.0, 10_000.0]);
//!     gauntlet_cli::run(suite)
//! }
//! ```

mod config;
mod executor;
mod planner;
mod suite;

pub use config::*;
pub use executor::{Executor, build_report, format_human_output};
pub use planner::{ExecutionPlan, build_plan};
pub use suite::Suite;

use clap::{Parser, Subcommand};
use gauntlet_core::{SchedulerConfig, default_parallelism};
use gauntlet_report::{OutputFormat, generate_json_report};
use gauntlet_stats::DEFAULT_SIGNIFICANCE_LEVEL;
use regex::Regex;
use std::io::Write;
use std::path::PathBuf;

/// Gauntlet CLI arguments
#[derive(Parser, Debug)]
#[command(name = "gauntlet")]
#[command(author, version, about = "Gauntlet - concurrent benchmark harness")]
pub struct Cli {
    /// Optional subcommand (List, Run); defaults to Run
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Filter tests by regex pattern on their names
    #[arg(long, default_value = ".*")]
    pub filter: String,

    /// Number of iterations
    #[arg(long, short = 'n')]
    pub iterations: Option<usize>,

    /// Comma-separated parameter values, e.g. `--params 10,100,1000`
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    pub params: Option<Vec<f64>>,

    /// Number of worker threads
    #[arg(long, short = 'j')]
    pub jobs: Option<usize>,

    /// Output format: human, json
    #[arg(long)]
    pub format: Option<String>,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Do not draw the progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the tests selected by the filter
    List,
    /// Run the tests (default)
    Run,
}

/// Run the Gauntlet CLI on a suite, parsing arguments from the command line.
/// This is the main entry point for benchmark binaries.
pub fn run(suite: Suite) -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli, suite)
}

/// Run the Gauntlet CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli, suite: Suite) -> anyhow::Result<()> {
    // Initialize logging; a subscriber may already be installed by the host
    let filter = if cli.verbose {
        "gauntlet=debug"
    } else {
        "gauntlet=info"
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    // Discover gauntlet.toml configuration (CLI flags override)
    let config = GauntletConfig::discover().unwrap_or_default();

    match cli.command {
        Some(Commands::List) => list_tests(&cli, &suite),
        Some(Commands::Run) | None => run_tests(&cli, &config, &suite),
    }
}

fn select_tests(cli: &Cli, suite: &Suite) -> anyhow::Result<ExecutionPlan> {
    let filter_re = Regex::new(&cli.filter)
        .map_err(|e| anyhow::anyhow!("Invalid filter pattern '{}': {}", cli.filter, e))?;
    Ok(build_plan(suite.tests(), Some(&filter_re)))
}

fn list_tests(cli: &Cli, suite: &Suite) -> anyhow::Result<()> {
    println!("Gauntlet Plan: {}", suite.title());

    let plan = select_tests(cli, suite)?;
    for name in plan.names() {
        println!("├── {}", name);
    }
    println!("{} tests found.", plan.tests.len());

    Ok(())
}

/// Build a SchedulerConfig by layering: suite defaults → gauntlet.toml → CLI overrides.
pub fn build_scheduler_config(cli: &Cli, config: &GauntletConfig, suite: &Suite) -> SchedulerConfig {
    let defaults = SchedulerConfig::default();

    let iterations = cli
        .iterations
        .or(config.runner.iterations)
        .or(suite.suggested_iterations())
        .unwrap_or(defaults.iterations);

    let param_values = cli
        .params
        .clone()
        .or_else(|| config.runner.params.clone())
        .or_else(|| suite.suggested_params().map(<[f64]>::to_vec))
        .unwrap_or(defaults.param_values);

    let parallelism = cli
        .jobs
        .or(config.runner.jobs)
        .unwrap_or_else(default_parallelism);

    SchedulerConfig {
        iterations,
        param_values,
        parallelism,
        show_progress: config.runner.progress && !cli.no_progress,
    }
}

fn run_tests(cli: &Cli, config: &GauntletConfig, suite: &Suite) -> anyhow::Result<()> {
    let plan = select_tests(cli, suite)?;
    if plan.is_empty() {
        println!("No tests found.");
        return Ok(());
    }

    let format_str = cli.format.as_deref().unwrap_or(&config.output.format);
    let format: OutputFormat = format_str.parse().unwrap_or_else(|e| {
        eprintln!("Warning: {}; falling back to human output", e);
        OutputFormat::Human
    });

    let scheduler_config = build_scheduler_config(cli, config, suite);
    eprintln!(
        "Running {} tests × {} params, {} iterations, {} worker(s)...\n",
        plan.tests.len(),
        scheduler_config.effective_params().len(),
        scheduler_config.iterations,
        scheduler_config.parallelism
    );

    let executor = Executor::new(scheduler_config);
    let outcome = executor.execute(&plan)?;
    let report = build_report(&outcome, suite.title(), DEFAULT_SIGNIFICANCE_LEVEL);

    // Generate output
    let output = match format {
        OutputFormat::Json => generate_json_report(&report)?,
        OutputFormat::Human => format_human_output(&report),
    };

    // Write output
    if let Some(ref path) = cli.output {
        let mut file = std::fs::File::create(path)?;
        file.write_all(output.as_bytes())?;
        println!("Report written to: {}", path.display());
    } else {
        print!("{}", output);
    }

    save_json_if_needed(config, &report)?;

    if report.summary.failed_runs > 0 {
        eprintln!(
            "\n{} run(s) failed and were left out of the statistics",
            report.summary.failed_runs
        );
    }

    Ok(())
}

/// Save the report as JSON into the configured output directory.
fn save_json_if_needed(
    config: &GauntletConfig,
    report: &gauntlet_report::Report,
) -> anyhow::Result<()> {
    if !config.output.save_json {
        return Ok(());
    }

    let path = config.output.report_path(&report.meta.id);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = generate_json_report(report)?;
    std::fs::write(&path, json)?;
    eprintln!("Report saved to: {}", path.display());

    Ok(())
}
