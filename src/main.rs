//! # Lossless Codec Benchmark - Main Entry Point
//!
//! Two pipelines share one binary:
//!
//! - `evaluate`: runs every configured codec over the corpus and writes the
//!   compression-ratio, encode-time-ratio and decode-time-ratio reports
//! - `statistics`: writes duration and RMS level of every input file; needs
//!   no codec installed
//!
//! ## Error Handling
//!
//! Configuration errors (unknown tool, unreadable tools file) fail before any
//! file is touched. Without `--strict`, a bad input file is skipped and a
//! failed codec invocation shows up as `FAILED` in the reports; with
//! `--strict` the first such error aborts the run and no report is written.

use anyhow::{Context, Result};
use clap::Parser;
use lossless_bench::{
    benchmark::{self, BenchmarkConfig},
    cli::{Args, Command, EvaluateArgs, StatisticsArgs},
    corpus, logging,
    results::{self, ResultsManager},
    statistics,
    utils::ScratchDir,
};
use tracing::{debug, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Held until exit so buffered file logs are flushed.
    let _log_guard = logging::init(args.verbose, args.quiet, args.log_file.as_deref())?;

    info!("Starting lossless codec benchmark v{}", lossless_bench::VERSION);

    match args.command {
        Command::Evaluate(ref eval) => run_evaluate(&args, eval).await,
        Command::Statistics(ref stats) => run_statistics(&args, stats),
    }
}

async fn run_evaluate(args: &Args, eval: &EvaluateArgs) -> Result<()> {
    let scratch = ScratchDir::create(eval.scratch_dir.as_deref())?;
    // Codec chatter is only interesting when debugging.
    let show_output = args.verbose > 0;
    let config = BenchmarkConfig::from_args(eval, args.strict, show_output, scratch.path())?;

    let mut results_manager = ResultsManager::new(&eval.output_dir);
    if let Some(ref path) = eval.json {
        info!("Enabling JSON run summary: {:?}", path);
        results_manager.enable_json(path);
    }

    let table = benchmark::evaluate(config, &eval.inputs, &results_manager).await?;

    let failures = table.failure_count();
    if failures > 0 {
        warn!(
            "Benchmark completed with {} failed measurement(s), marked FAILED in the reports",
            failures
        );
    } else {
        info!("Benchmark completed successfully");
    }
    Ok(())
}

fn run_statistics(args: &Args, stats: &StatisticsArgs) -> Result<()> {
    let paths = corpus::discover(&stats.inputs).context("Failed to discover input files")?;
    if paths.is_empty() {
        warn!("No WAV files found in {:?}", stats.inputs);
    }

    match std::fs::remove_file(&stats.output) {
        Ok(()) => debug!("Removed stale report {:?}", stats.output),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to remove {:?}", stats.output));
        }
    }

    let entries = statistics::collect(&paths, args.strict)?;
    if let Some(parent) = stats.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory {:?}", parent))?;
    }
    results::statistics_report(&entries)
        .write_csv(&stats.output)
        .with_context(|| format!("Failed to write {:?}", stats.output))?;

    info!(
        "Statistics for {} file(s) written to: {:?}",
        entries.len(),
        stats.output
    );
    Ok(())
}
