//! # Result Aggregation and Output
//!
//! Raw per-(file, tool) measurements are collected into a [`MeasurementTable`]
//! while the benchmark runs. Once every cell is filled, a [`ResultAggregator`]
//! turns the table into relative reports: compressed size as a percentage of
//! the original file size, and encode/decode CPU time as a percentage of the
//! audio duration. All reports share the table's file order (rows) and tool
//! order (columns), so any two of them compare cell by cell.
//!
//! [`ResultsManager`] owns the output locations and writes the finished
//! reports plus an optional JSON run summary.

use crate::catalog::ToolConfig;
use crate::error::{BenchError, BenchResult};
use crate::report::{Cell, Report};
use crate::statistics::FileStatistics;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// First header cell of every benchmark report.
pub const BENCHMARK_CORNER: &str = "Wave File Name \\ Compress Method";

/// First header cell of the statistics report.
pub const STATISTICS_CORNER: &str = "Wave File Name \\ Statistics";

/// Raw measurement for one (file, tool) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Measurement {
    pub compress_time_ms: f64,
    pub decompress_time_ms: f64,
    pub compressed_size_bytes: u64,
}

/// What happened when a tool was run on a file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Measured(Measurement),
    Failed { reason: String },
}

/// Ground truth about one corpus file, taken before any tool runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorpusFile {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub duration_ms: f64,
}

impl CorpusFile {
    /// Base name used as the row label.
    pub fn label(&self) -> String {
        base_name(&self.path)
    }
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Outcomes indexed by (file, tool), in the fixed corpus and tool order.
#[derive(Debug, Clone)]
pub struct MeasurementTable {
    files: Vec<CorpusFile>,
    tools: Vec<ToolConfig>,
    cells: Vec<Option<Outcome>>,
}

impl MeasurementTable {
    pub fn new(files: Vec<CorpusFile>, tools: Vec<ToolConfig>) -> Self {
        let cells = vec![None; files.len() * tools.len()];
        Self {
            files,
            tools,
            cells,
        }
    }

    pub fn files(&self) -> &[CorpusFile] {
        &self.files
    }

    pub fn tools(&self) -> &[ToolConfig] {
        &self.tools
    }

    /// Record the outcome for file `file` and tool `tool` (indices).
    pub fn record(&mut self, file: usize, tool: usize, outcome: Outcome) {
        let index = file * self.tools.len() + tool;
        self.cells[index] = Some(outcome);
    }

    pub fn get(&self, file: usize, tool: usize) -> Option<&Outcome> {
        self.cells
            .get(file * self.tools.len() + tool)
            .and_then(Option::as_ref)
    }

    /// Number of recorded failures.
    pub fn failure_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|cell| matches!(cell, Some(Outcome::Failed { .. })))
            .count()
    }
}

/// Derives the relative reports from a complete [`MeasurementTable`].
#[derive(Debug)]
pub struct ResultAggregator<'a> {
    table: &'a MeasurementTable,
}

impl<'a> ResultAggregator<'a> {
    /// Fails with [`BenchError::MissingMeasurement`] if any cell is empty.
    pub fn new(table: &'a MeasurementTable) -> BenchResult<Self> {
        for (f, file) in table.files.iter().enumerate() {
            for (t, tool) in table.tools.iter().enumerate() {
                if table.get(f, t).is_none() {
                    return Err(BenchError::MissingMeasurement {
                        file: file.path.clone(),
                        tool: tool.label(),
                    });
                }
            }
        }
        Ok(Self { table })
    }

    fn header(&self, baseline: &str) -> Vec<String> {
        let mut header = vec![BENCHMARK_CORNER.to_string(), baseline.to_string()];
        header.extend(self.table.tools.iter().map(ToolConfig::label));
        header
    }

    fn build<B, V>(&self, baseline_name: &str, baseline: B, value: V) -> Report
    where
        B: Fn(&CorpusFile) -> Cell,
        V: Fn(&CorpusFile, &Measurement) -> f64,
    {
        let mut report = Report::new(self.header(baseline_name));
        for (f, file) in self.table.files.iter().enumerate() {
            let mut cells = vec![baseline(file)];
            for t in 0..self.table.tools.len() {
                cells.push(match self.table.get(f, t) {
                    Some(Outcome::Measured(m)) => Cell::Float(value(file, m)),
                    _ => Cell::Failed,
                });
            }
            report.push(file.label(), cells);
        }
        report
    }

    /// Compressed size as a percentage of the original file size.
    pub fn compression_ratio_report(&self) -> Report {
        self.build(
            "Original Size",
            |file| Cell::Integer(file.size_bytes),
            |file, m| 100.0 * m.compressed_size_bytes as f64 / file.size_bytes as f64,
        )
    }

    /// Decode CPU time as a percentage of the audio duration.
    pub fn decode_time_ratio_report(&self) -> Report {
        self.build(
            "Wave Length[ms]",
            |file| Cell::Float(file.duration_ms),
            |file, m| 100.0 * m.decompress_time_ms / file.duration_ms,
        )
    }

    /// Encode CPU time as a percentage of the audio duration.
    pub fn encode_time_ratio_report(&self) -> Report {
        self.build(
            "Wave Length[ms]",
            |file| Cell::Float(file.duration_ms),
            |file, m| 100.0 * m.compress_time_ms / file.duration_ms,
        )
    }
}

/// Build the standalone statistics report.
pub fn statistics_report(stats: &[FileStatistics]) -> Report {
    let mut report = Report::new([STATISTICS_CORNER, "Length[sec]", "RMS[dB]"]);
    for entry in stats {
        report.push(
            base_name(&entry.path),
            vec![Cell::Float(entry.length_sec), Cell::Float(entry.rms_db)],
        );
    }
    report
}

/// System information for reproducibility
#[derive(Debug, Clone, Serialize)]
pub struct SystemInfo {
    pub os: String,
    pub architecture: String,
    pub cpu_cores: usize,
    pub rust_version: String,
    pub benchmark_version: String,
}

impl SystemInfo {
    pub fn collect() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            architecture: std::env::consts::ARCH.to_string(),
            cpu_cores: num_cpus::get(),
            rust_version: env!("CARGO_PKG_RUST_VERSION").to_string(),
            benchmark_version: crate::VERSION.to_string(),
        }
    }
}

/// Run metadata
#[derive(Debug, Serialize)]
pub struct RunMetadata {
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub system_info: SystemInfo,
}

/// One tool's outcome on one file, in the JSON summary.
#[derive(Debug, Serialize)]
pub struct ToolOutcome<'a> {
    pub tool: String,
    #[serde(flatten)]
    pub outcome: &'a Outcome,
}

#[derive(Debug, Serialize)]
pub struct FileSummary<'a> {
    #[serde(flatten)]
    pub file: &'a CorpusFile,
    pub results: Vec<ToolOutcome<'a>>,
}

/// JSON run summary
#[derive(Debug, Serialize)]
pub struct RunSummary<'a> {
    pub metadata: RunMetadata,
    pub tools: Vec<String>,
    pub total_failures: usize,
    pub files: Vec<FileSummary<'a>>,
}

impl<'a> RunSummary<'a> {
    pub fn from_table(table: &'a MeasurementTable) -> Self {
        let files = table
            .files
            .iter()
            .enumerate()
            .map(|(f, file)| FileSummary {
                file,
                results: table
                    .tools
                    .iter()
                    .enumerate()
                    .filter_map(|(t, tool)| {
                        table.get(f, t).map(|outcome| ToolOutcome {
                            tool: tool.label(),
                            outcome,
                        })
                    })
                    .collect(),
            })
            .collect();

        Self {
            metadata: RunMetadata {
                version: crate::VERSION.to_string(),
                timestamp: chrono::Utc::now(),
                system_info: SystemInfo::collect(),
            },
            tools: table.tools.iter().map(ToolConfig::label).collect(),
            total_failures: table.failure_count(),
            files,
        }
    }
}

/// Results manager for report output
pub struct ResultsManager {
    output_dir: PathBuf,
    json_output: Option<PathBuf>,
}

impl ResultsManager {
    pub fn new(output_dir: &Path) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
            json_output: None,
        }
    }

    /// Also write a JSON run summary to `path`.
    pub fn enable_json(&mut self, path: &Path) {
        self.json_output = Some(path.to_path_buf());
    }

    fn report_path(&self, name: &str) -> PathBuf {
        self.output_dir.join(name)
    }

    fn report_paths(&self) -> Vec<PathBuf> {
        [
            crate::defaults::COMPRESS_SIZE_RESULT_FILE,
            crate::defaults::COMPRESS_TIME_RESULT_FILE,
            crate::defaults::DECOMPRESS_TIME_RESULT_FILE,
        ]
        .iter()
        .map(|name| self.report_path(name))
        .chain(self.json_output.clone())
        .collect()
    }

    /// Remove report files left over from a previous run.
    pub fn remove_stale(&self) -> Result<()> {
        std::fs::create_dir_all(&self.output_dir)
            .with_context(|| format!("Failed to create output directory {:?}", self.output_dir))?;
        for path in self.report_paths() {
            match std::fs::remove_file(&path) {
                Ok(()) => debug!("Removed stale report {:?}", path),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(e).with_context(|| format!("Failed to remove {:?}", path));
                }
            }
        }
        Ok(())
    }

    /// Aggregate the complete table and write every report.
    pub fn finalize(&self, table: &MeasurementTable) -> Result<()> {
        info!("Finalizing benchmark results");
        let aggregator = ResultAggregator::new(table)?;

        let reports = [
            (
                crate::defaults::COMPRESS_SIZE_RESULT_FILE,
                aggregator.compression_ratio_report(),
            ),
            (
                crate::defaults::COMPRESS_TIME_RESULT_FILE,
                aggregator.encode_time_ratio_report(),
            ),
            (
                crate::defaults::DECOMPRESS_TIME_RESULT_FILE,
                aggregator.decode_time_ratio_report(),
            ),
        ];
        for (name, report) in &reports {
            let path = self.report_path(name);
            report
                .write_csv(&path)
                .with_context(|| format!("Failed to write {:?}", path))?;
            info!("Results written to: {:?}", path);
        }

        if let Some(ref path) = self.json_output {
            let json = serde_json::to_string_pretty(&RunSummary::from_table(table))?;
            std::fs::write(path, json).with_context(|| format!("Failed to write {:?}", path))?;
            info!("Run summary written to: {:?}", path);
        }
        Ok(())
    }
}
