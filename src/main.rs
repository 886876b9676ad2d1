//! depbot - dependency update orchestrator CLI
//!
//! Opens one pull request (or patch) per outdated dependency across the
//! requested package ecosystems of a repository.

use clap::Parser;
use depbot::cli::CliArgs;
use depbot::config::RunConfig;
use depbot::logging;
use depbot::orchestrator::Orchestrator;
use depbot::output::{create_formatter, OutputConfig, Verbosity};
use depbot::progress::Progress;
use std::io::{self, Write};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    if let Err(e) = logging::init(args.verbose, args.quiet) {
        eprintln!("Warning: failed to initialize logging: {}", e);
    }

    match run(args).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    let config = RunConfig::from_args(&args)?;
    let output_config = OutputConfig::from_cli(args.json, args.verbose, args.quiet, config.dry_run);

    if output_config.verbosity == Verbosity::Verbose {
        eprintln!("depbot v{}", env!("CARGO_PKG_VERSION"));
        eprintln!(
            "Target: {} ({}, {})",
            config.source.repository, config.source.provider, config.source.directory
        );
        if config.dry_run {
            eprintln!("Mode: dry-run");
        }
    }

    let show_progress = !args.json && output_config.verbosity != Verbosity::Quiet;
    let orchestrator = Orchestrator::standard(config, args.json)
        .await?
        .with_progress(show_progress);
    let report = orchestrator.run().await;

    let formatter = create_formatter(output_config);
    let mut stdout = io::stdout().lock();
    formatter.format(&report, &mut stdout)?;
    stdout.flush()?;
    drop(stdout);

    Progress::new(show_progress).done();

    // Per-dependency and per-ecosystem failures are reported, not fatal
    Ok(ExitCode::SUCCESS)
}
