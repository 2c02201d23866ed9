//! # Lossless Codec Benchmark Library
//!
//! A measurement harness for lossless audio codecs. It drives each codec's
//! reference command-line encoder and decoder over a corpus of 16-bit WAV
//! files and records compression ratio, encode time, and decode time, plus
//! the raw signal statistics (duration, RMS level) of every input.
//!
//! The harness owns no encoding logic. Codecs are opaque external processes
//! whose invocation recipes live in the [`catalog`].
//!
//! ## Architecture Overview
//!
//! - `wav`: minimal RIFF/WAVE parsing of 16-bit PCM
//! - `statistics`: duration and RMS level of decoded PCM
//! - `catalog`: per-codec command templates and filesystem side steps
//! - `process`: scoped subprocess execution with child CPU-time accounting
//! - `benchmark`: the encode/decode measurement loop over corpus × tools
//! - `results`: aggregation into relative report tables and output management
//! - `report`: tabular report model and CSV writer
//! - `corpus`: input discovery
//! - `cli`, `logging`, `utils`: command line, tracing setup, helpers
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use lossless_bench::{BenchmarkConfig, BenchmarkRunner, ToolConfig, ToolKind};
//! use lossless_bench::catalog::ToolEnv;
//! use std::path::PathBuf;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = BenchmarkConfig {
//!         tools: vec![ToolConfig::new(ToolKind::Flac, "-8")],
//!         env: ToolEnv {
//!             tool_dir: PathBuf::from("."),
//!             scratch_dir: std::env::temp_dir(),
//!         },
//!         exec: Default::default(),
//!         strict: false,
//!         verify: false,
//!     };
//!     let runner = BenchmarkRunner::new(config);
//!     let files = runner.prepare_corpus(&[PathBuf::from("data/a.wav")])?;
//!     let table = runner.run(files).await?;
//!     println!("{} failures", table.failure_count());
//!     Ok(())
//! }
//! ```

/// Core benchmarking functionality
///
/// Contains `BenchmarkRunner` and `BenchmarkConfig`, which measure every
/// configured tool on every corpus file, one invocation at a time.
pub mod benchmark;

pub mod catalog;

/// Command-line interface and configuration
pub mod cli;

pub mod corpus;
pub mod error;
pub mod logging;
pub mod process;
pub mod report;

/// Result collection, aggregation, and output formatting
///
/// Turns raw measurements into the compression-ratio, encode-time-ratio and
/// decode-time-ratio reports, and writes them together with an optional JSON
/// run summary.
pub mod results;

pub mod statistics;
pub mod utils;
pub mod wav;

pub use benchmark::{BenchmarkConfig, BenchmarkRunner};
pub use catalog::{ToolConfig, ToolKind};
pub use error::{BenchError, BenchResult};
pub use results::{Measurement, MeasurementTable, ResultAggregator, ResultsManager};

/// The current version of the benchmark harness
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration values
pub mod defaults {
    use crate::catalog::{ToolConfig, ToolKind};

    /// Directory searched for input WAV files when none are given.
    pub const INPUT_DIR: &str = "./data";

    /// Directory reports are written to.
    pub const OUTPUT_DIR: &str = ".";

    /// Directory holding locally built codecs and Windows executables.
    pub const TOOL_DIR: &str = ".";

    pub const STATISTICS_RESULT_FILE: &str = "statistics.csv";
    pub const COMPRESS_SIZE_RESULT_FILE: &str = "compress_size_result.csv";
    pub const COMPRESS_TIME_RESULT_FILE: &str = "compress_time_result.csv";
    pub const DECOMPRESS_TIME_RESULT_FILE: &str = "decompress_time_result.csv";

    /// Scratch file names, reused by every iteration.
    pub const COMPRESSED_SCRATCH_FILE: &str = "compressed.tmp";
    pub const DECOMPRESSED_SCRATCH_FILE: &str = "decompressed.tmp";

    pub const SCRATCH_DIR_PREFIX: &str = "lossless-bench-";

    /// Tools benchmarked when none are configured.
    pub fn tools() -> Vec<ToolConfig> {
        vec![
            ToolConfig::new(ToolKind::Flac, "-8"),
            ToolConfig::new(ToolKind::WavPack, "-hh"),
            ToolConfig::new(ToolKind::Tta, ""),
            ToolConfig::new(ToolKind::MonkeysAudio, "-c4000"),
            ToolConfig::new(ToolKind::Naru, "-m 4"),
        ]
    }
}
