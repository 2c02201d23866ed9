//! # Benchmark Engine Module
//!
//! Drives every configured codec over the corpus and collects one
//! [`Measurement`] per (file, tool) pair.
//!
//! ## Execution Lifecycle
//!
//! 1. **Corpus preparation**: each discovered file is parsed once to record its
//!    size and duration. Files that cannot be interpreted are dropped (or abort
//!    the run in strict mode) before any tool runs, so the row set is fixed.
//! 2. **Measurement**: tools are the outer loop and files the inner loop. Each
//!    iteration encodes the file to a scratch path, decodes it back, and records
//!    the child CPU time of both steps plus the compressed size.
//! 3. **Cleanup**: scratch artifacts are removed at the end of every iteration,
//!    on success and on failure alike.
//!
//! ## Scheduling
//!
//! Invocations are strictly sequential. Only one external process is alive at
//! any time, so the `RUSAGE_CHILDREN` delta around it belongs to that process
//! alone.

use crate::{
    catalog::{FsStep, Invocation, InvocationRecipe, ToolConfig, ToolEnv},
    cli::EvaluateArgs,
    corpus,
    error::{BenchError, BenchResult},
    process::{require_output, run_timed, ExecOptions, ScratchFiles},
    results::{CorpusFile, Measurement, MeasurementTable, Outcome, ResultsManager},
    statistics,
    utils::{format_bytes, format_duration},
    wav,
};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Configuration for benchmark execution
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    /// Tools in report column order.
    pub tools: Vec<ToolConfig>,

    /// Where tools live and where recipe copies go.
    pub env: ToolEnv,

    /// Timeout and output handling for every invocation.
    pub exec: ExecOptions,

    /// Abort on the first file-scoped error instead of skipping or recording it.
    pub strict: bool,

    /// Require the decoded PCM to match the source.
    pub verify: bool,
}

impl BenchmarkConfig {
    /// Build the configuration for an `evaluate` run.
    ///
    /// Tool identifiers are validated while the arguments are parsed, so by the
    /// time this runs every configured tool has a recipe.
    pub fn from_args(
        args: &EvaluateArgs,
        strict: bool,
        show_output: bool,
        scratch_dir: &Path,
    ) -> Result<Self> {
        Ok(Self {
            tools: args.tool_configs()?,
            env: ToolEnv {
                tool_dir: args.tool_dir.clone(),
                scratch_dir: scratch_dir.to_path_buf(),
            },
            exec: ExecOptions {
                timeout: args.timeout,
                show_output,
            },
            strict,
            verify: args.verify,
        })
    }
}

/// Consistent rendering of the run configuration for the start-of-run banner.
struct BenchmarkConfigDisplay<'a> {
    config: &'a BenchmarkConfig,
}

impl<'a> std::fmt::Display for BenchmarkConfigDisplay<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let config = self.config;
        writeln!(
            f,
            "-----------------------------------------------------------------"
        )?;
        writeln!(f, "Lossless codec benchmark")?;
        for tool in &config.tools {
            writeln!(f, "  Tool:               {}", tool.label())?;
        }
        writeln!(f, "  Tool Directory:     {}", config.env.tool_dir.display())?;
        writeln!(f, "  Scratch Directory:  {}", config.env.scratch_dir.display())?;
        let timeout = config
            .exec
            .timeout
            .map_or("None".to_string(), format_duration);
        writeln!(f, "  Timeout:            {}", timeout)?;
        writeln!(
            f,
            "  Failure Policy:     {}",
            if config.strict {
                "Abort on first error"
            } else {
                "Record and continue"
            }
        )?;
        writeln!(f, "  Verify Round Trip:  {}", config.verify)?;
        write!(
            f,
            "-----------------------------------------------------------------"
        )
    }
}

/// Runs the encode/decode measurement loop.
pub struct BenchmarkRunner {
    config: BenchmarkConfig,
}

impl BenchmarkRunner {
    pub fn new(config: BenchmarkConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }

    fn compressed_path(&self) -> PathBuf {
        self.config
            .env
            .scratch_dir
            .join(crate::defaults::COMPRESSED_SCRATCH_FILE)
    }

    fn decompressed_path(&self) -> PathBuf {
        self.config
            .env
            .scratch_dir
            .join(crate::defaults::DECOMPRESSED_SCRATCH_FILE)
    }

    /// Apply the recipe's side steps around one timed command.
    ///
    /// Recipe-owned scratch files are released when this returns, whichever
    /// way it returns.
    async fn invoke(
        &self,
        label: &str,
        invocation: Invocation,
        output: &Path,
    ) -> BenchResult<(Duration, u64)> {
        let mut scratch = ScratchFiles::new();
        for path in invocation.scratch {
            scratch.adopt(path);
        }

        apply_steps(label, &invocation.prepare)?;
        let cpu = run_timed(label, &invocation.command, &self.config.exec).await?;
        apply_steps(label, &invocation.finish)?;

        let size = require_output(label, output)?;
        Ok((cpu, size))
    }

    /// Encode `input` to `output`, returning CPU milliseconds and the size of
    /// the encoded file.
    pub async fn compress(
        &self,
        recipe: &InvocationRecipe,
        input: &Path,
        output: &Path,
        options: &[String],
    ) -> BenchResult<(f64, u64)> {
        let invocation = recipe.encode(&self.config.env, input, output, options);
        let (cpu, size) = self
            .invoke(recipe.tool.display_name(), invocation, output)
            .await?;
        Ok((as_millis(cpu), size))
    }

    /// Decode `input` to `output`, returning CPU milliseconds.
    pub async fn decompress(
        &self,
        recipe: &InvocationRecipe,
        input: &Path,
        output: &Path,
    ) -> BenchResult<f64> {
        let invocation = recipe.decode(&self.config.env, input, output);
        let (cpu, _) = self
            .invoke(recipe.tool.display_name(), invocation, output)
            .await?;
        Ok(as_millis(cpu))
    }

    /// One benchmark iteration: encode, decode, and optionally verify.
    pub async fn measure(&self, file: &CorpusFile, tool: &ToolConfig) -> BenchResult<Measurement> {
        let recipe = crate::catalog::recipe_for(tool.tool);
        let compressed = self.compressed_path();
        let decompressed = self.decompressed_path();

        let mut scratch = ScratchFiles::new();
        scratch.track(&compressed)?;
        scratch.track(&decompressed)?;

        let (compress_time_ms, compressed_size_bytes) = self
            .compress(recipe, &file.path, &compressed, &tool.option_args())
            .await?;
        let decompress_time_ms = self
            .decompress(recipe, &compressed, &decompressed)
            .await?;

        if self.config.verify {
            verify_round_trip(&tool.label(), &file.path, &decompressed)?;
        }

        Ok(Measurement {
            compress_time_ms,
            decompress_time_ms,
            compressed_size_bytes,
        })
    }

    /// Record size and duration of every input, fixing the row set and order.
    pub fn prepare_corpus(&self, paths: &[PathBuf]) -> Result<Vec<CorpusFile>> {
        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            match corpus_file(path) {
                Ok(file) => {
                    debug!(
                        "{}: {}, {:.1} ms",
                        path.display(),
                        format_bytes(file.size_bytes),
                        file.duration_ms
                    );
                    files.push(file);
                }
                Err(e) if !self.config.strict && e.is_file_scoped() => {
                    warn!("Skipping {}", e);
                }
                Err(e) => {
                    return Err(e)
                        .with_context(|| format!("Failed to prepare {}", path.display()));
                }
            }
        }
        info!(
            "Corpus: {} of {} files usable",
            files.len(),
            paths.len()
        );
        Ok(files)
    }

    /// Measure every tool on every file.
    ///
    /// Outside strict mode a failed invocation is recorded as a failure cell
    /// and the loop moves on; in strict mode it aborts the run.
    pub async fn run(&self, files: Vec<CorpusFile>) -> Result<MeasurementTable> {
        info!("{}", BenchmarkConfigDisplay { config: &self.config });

        let mut table = MeasurementTable::new(files.clone(), self.config.tools.clone());
        let total = files.len();

        for (t, tool) in self.config.tools.iter().enumerate() {
            let label = tool.label();
            for (f, file) in files.iter().enumerate() {
                info!("[{}] ({}/{}) {}", label, f + 1, total, file.path.display());

                let outcome = match self.measure(file, tool).await {
                    Ok(m) => {
                        debug!(
                            "[{}] encode {}, decode {}, {}",
                            label,
                            format_duration(Duration::from_secs_f64(m.compress_time_ms / 1000.0)),
                            format_duration(Duration::from_secs_f64(
                                m.decompress_time_ms / 1000.0
                            )),
                            format_bytes(m.compressed_size_bytes)
                        );
                        Outcome::Measured(m)
                    }
                    Err(e) if !self.config.strict && e.is_file_scoped() => {
                        warn!("[{}] {}", label, e);
                        Outcome::Failed {
                            reason: e.to_string(),
                        }
                    }
                    Err(e) => {
                        return Err(e).with_context(|| {
                            format!("[{}] failed on {}", label, file.path.display())
                        });
                    }
                };
                table.record(f, t, outcome);
            }
        }

        let failures = table.failure_count();
        if failures > 0 {
            warn!("{} measurement(s) failed", failures);
        }
        Ok(table)
    }
}

fn as_millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

fn apply_steps(label: &str, steps: &[FsStep]) -> BenchResult<()> {
    for step in steps {
        step.apply()
            .map_err(|e| BenchError::external(label, format!("{:?}: {}", step, e)))?;
    }
    Ok(())
}

fn corpus_file(path: &Path) -> BenchResult<CorpusFile> {
    let size_bytes = std::fs::metadata(path)?.len();
    let wav = wav::read(path)?;
    if wav.frame_count() == 0 {
        return Err(BenchError::EmptySignal(path.to_path_buf()));
    }
    Ok(CorpusFile {
        path: path.to_path_buf(),
        size_bytes,
        duration_ms: statistics::duration_ms(&wav.format, wav.frame_count()),
    })
}

fn verify_round_trip(label: &str, original: &Path, decoded: &Path) -> BenchResult<()> {
    let mismatch = |reason: String| BenchError::RoundTripMismatch {
        tool: label.to_string(),
        path: original.to_path_buf(),
        reason,
    };

    let source = wav::read(original)?;
    let output = wav::read(decoded).map_err(|e| mismatch(e.to_string()))?;

    if source.format != output.format {
        return Err(mismatch(format!(
            "format {:?} became {:?}",
            source.format, output.format
        )));
    }
    if source.samples.len() != output.samples.len() {
        return Err(mismatch(format!(
            "{} samples became {}",
            source.samples.len(),
            output.samples.len()
        )));
    }
    if let Some(i) = source
        .samples
        .iter()
        .zip(&output.samples)
        .position(|(a, b)| a != b)
    {
        return Err(mismatch(format!("first differing sample at index {}", i)));
    }
    Ok(())
}

/// Full `evaluate` pipeline: discover, prepare, measure, and write reports.
///
/// Reports are only written once every (file, tool) cell holds an outcome.
pub async fn evaluate(
    config: BenchmarkConfig,
    inputs: &[PathBuf],
    results: &ResultsManager,
) -> Result<MeasurementTable> {
    let paths = corpus::discover(inputs).context("Failed to discover input files")?;
    if paths.is_empty() {
        warn!("No WAV files found in {:?}", inputs);
    }

    let runner = BenchmarkRunner::new(config);
    let files = runner.prepare_corpus(&paths)?;
    results.remove_stale()?;

    let table = runner.run(files).await?;
    results.finalize(&table)?;
    Ok(table)
}
