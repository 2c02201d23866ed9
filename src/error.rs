//! Error taxonomy for the benchmark harness.
//!
//! File-scoped errors (a bad WAV, a codec that crashed on one input) can be
//! skipped in non-strict mode; configuration and output errors always abort.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for harness operations.
pub type BenchResult<T> = Result<T, BenchError>;

/// Errors raised while reading inputs, driving codecs, or aggregating results.
#[derive(Debug, Error)]
pub enum BenchError {
    /// The RIFF/WAVE container is malformed or lacks a required chunk.
    #[error("{path}: invalid WAV container: {reason}")]
    Format {
        /// File being parsed.
        path: PathBuf,
        /// What was wrong with it.
        reason: String,
    },

    /// The WAV file is well formed but not 16-bit PCM.
    #[error("{path}: unsupported sample format: {bits_per_sample} bits per sample (must be 16-bit wav)")]
    UnsupportedFormat {
        /// File being parsed.
        path: PathBuf,
        /// Bit depth found in the `fmt ` chunk.
        bits_per_sample: u16,
    },

    /// The tool identifier is not part of the catalog.
    #[error("unsupported tool name: '{0}'")]
    UnsupportedTool(String),

    /// An encoder or decoder exited unsuccessfully or left no output.
    #[error("{tool} failed: {reason}")]
    ExternalProcess {
        /// Display name of the tool.
        tool: String,
        /// Exit status, missing output, timeout, or spawn failure.
        reason: String,
    },

    /// The PCM data chunk holds no samples, so RMS is undefined.
    #[error("{0}: signal has no samples")]
    EmptySignal(PathBuf),

    /// The result table has no entry for a (file, tool) pair.
    #[error("no measurement for '{file}' with '{tool}'")]
    MissingMeasurement {
        /// Input file.
        file: PathBuf,
        /// Tool label.
        tool: String,
    },

    /// Decoded PCM differs from the source PCM.
    #[error("{tool}: decoded output of {path} differs from the original ({reason})")]
    RoundTripMismatch {
        /// Tool label.
        tool: String,
        /// Input file.
        path: PathBuf,
        /// First difference found.
        reason: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BenchError {
    /// Creates a format error.
    pub fn format(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Format {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates an external process error.
    pub fn external(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ExternalProcess {
            tool: tool.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error concerns a single input file (or a single
    /// file/tool pair) and may be skipped outside strict mode.
    pub fn is_file_scoped(&self) -> bool {
        matches!(
            self,
            BenchError::Format { .. }
                | BenchError::UnsupportedFormat { .. }
                | BenchError::EmptySignal(_)
                | BenchError::ExternalProcess { .. }
                | BenchError::RoundTripMismatch { .. }
        )
    }
}
