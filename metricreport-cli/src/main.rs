//! Metricreport CLI - aggregate code metrics results into one HTML report

#![deny(warnings)]

// Global invariants enforced:
// - Usage and input errors exit non-zero without writing a report
// - Identical input yields byte-for-byte identical output

use anyhow::Context;
use clap::Parser;
use metricreport_core::args::{self, Invocation};
use metricreport_core::{collect_reports, config, write_report};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "metricreport")]
#[command(about = "Aggregate code metrics XML results into one HTML report")]
#[command(version = env!("METRICREPORT_VERSION"))]
struct Cli {
    /// Debug logging on stderr (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,

    /// Report arguments in /key:value form; pass /? alone for details
    #[arg(value_name = "/KEY:VALUE", allow_hyphen_values = true)]
    tokens: Vec<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    tracing::debug!(?cli, "parsed CLI arguments");

    match execute(&cli.tokens) {
        Ok(code) => code,
        Err(e) => {
            println!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn execute(tokens: &[String]) -> anyhow::Result<ExitCode> {
    let arg_map = match args::parse_args(tokens) {
        Ok(Invocation::Help) => {
            println!("{}", args::HELP_TEXT);
            return Ok(ExitCode::SUCCESS);
        }
        Ok(Invocation::Run(map)) => map,
        Err(e) => return Ok(usage_failure(&e)),
    };

    let cwd = std::env::current_dir().context("failed to determine working directory")?;
    let config = match config::resolve(&arg_map, &cwd) {
        Ok(config) => config,
        Err(e) => return Ok(usage_failure(&e)),
    };

    if let Some(config_path) = &config.config_path {
        println!("Using config: {}", config_path.display());
    }

    let Some(extraction) = collect_reports(&config)? else {
        println!(
            "No code metric result file under {} with the pattern {}.",
            config.result_dir.display(),
            config.result_pattern
        );
        return Ok(ExitCode::SUCCESS);
    };

    // Skipped files are listed before the write is attempted
    for failure in &extraction.failures {
        println!(
            "Failed to parse file: {}. Reason: {}",
            failure.path.display(),
            failure.reason
        );
    }
    if !extraction.failures.is_empty() {
        println!(
            "Skipped {} of {} file(s) due to parse errors",
            extraction.failures.len(),
            extraction.processed()
        );
    }

    write_report(&config, &extraction)?;
    println!(
        "HTML report with {} project(s) written to: {}",
        extraction.records.len(),
        config.html_report.display()
    );

    Ok(ExitCode::SUCCESS)
}

/// Print the problem and the usage line, then fail
fn usage_failure(error: &anyhow::Error) -> ExitCode {
    println!("{:#}", error);
    println!("{}", args::usage_message());
    ExitCode::FAILURE
}
