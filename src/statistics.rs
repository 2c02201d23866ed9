//! Signal statistics: duration and RMS level of decoded PCM.

use crate::error::{BenchError, BenchResult};
use crate::wav::{self, AudioFormat, WavFile};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// RMS level reported for an all-zero signal, where `log10(0)` is undefined.
pub const SILENCE_RMS_DB: f64 = f64::NEG_INFINITY;

/// Duration in seconds of `frame_count` frames.
pub fn duration_secs(format: &AudioFormat, frame_count: usize) -> f64 {
    frame_count as f64 / format.sample_rate_hz as f64
}

/// Duration in milliseconds of `frame_count` frames.
pub fn duration_ms(format: &AudioFormat, frame_count: usize) -> f64 {
    1000.0 * frame_count as f64 / format.sample_rate_hz as f64
}

/// RMS level in dBFS, samples normalized by `2^(bits_per_sample - 1)`.
///
/// Returns `None` for an empty signal and [`SILENCE_RMS_DB`] for silence.
pub fn rms_db(samples: &[i16], bits_per_sample: u16) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    let scale = 2f64.powi(bits_per_sample as i32 - 1);
    let sum_sq: f64 = samples
        .iter()
        .map(|&s| {
            let x = s as f64 / scale;
            x * x
        })
        .sum();
    let rms = (sum_sq / samples.len() as f64).sqrt();
    if rms == 0.0 {
        Some(SILENCE_RMS_DB)
    } else {
        Some(20.0 * rms.log10())
    }
}

/// Per-file entry of the standalone statistics report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileStatistics {
    pub path: PathBuf,
    pub length_sec: f64,
    pub rms_db: f64,
}

impl FileStatistics {
    /// Compute statistics for an already parsed file.
    pub fn from_wav(path: &Path, wav: &WavFile) -> BenchResult<Self> {
        let rms_db = rms_db(&wav.samples, wav.format.bits_per_sample)
            .ok_or_else(|| BenchError::EmptySignal(path.to_path_buf()))?;
        Ok(Self {
            path: path.to_path_buf(),
            length_sec: duration_secs(&wav.format, wav.frame_count()),
            rms_db,
        })
    }

    /// Read `path` and compute its statistics.
    pub fn compute(path: &Path) -> BenchResult<Self> {
        let wav = wav::read(path)?;
        Self::from_wav(path, &wav)
    }
}

/// Compute statistics for every file in `paths`, in order.
///
/// Outside strict mode a file that cannot be interpreted is logged and left
/// out of the result; in strict mode the first such file aborts collection.
pub fn collect(paths: &[PathBuf], strict: bool) -> BenchResult<Vec<FileStatistics>> {
    let total = paths.len();
    let mut stats = Vec::with_capacity(total);
    for (i, path) in paths.iter().enumerate() {
        info!("({}/{}) {}", i + 1, total, path.display());
        match FileStatistics::compute(path) {
            Ok(entry) => stats.push(entry),
            Err(e) if !strict && e.is_file_scoped() => warn!("Skipping {}", e),
            Err(e) => return Err(e),
        }
    }
    Ok(stats)
}
