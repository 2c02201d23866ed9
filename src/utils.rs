//! # Utility Functions
//!
//! Human-readable formatting for progress output, run identifiers, and the
//! per-run scratch directory.
//!
//! ```rust
//! use lossless_bench::utils::*;
//! use std::time::Duration;
//!
//! assert_eq!(format_duration(Duration::from_micros(1500)), "1.50ms");
//! assert_eq!(format_bytes(1536), "1.50 KB");
//! ```

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

/// Generate a unique identifier for a benchmark run
///
/// Used to name the default scratch directory so that concurrent runs on one
/// host never share temporary files.
pub fn generate_run_id() -> String {
    Uuid::new_v4().to_string()
}

/// Format a duration in a human-readable way
///
/// - **Microseconds**: < 1 ms (e.g., "750.00μs")
/// - **Milliseconds**: < 1 s (e.g., "25.75ms")
/// - **Seconds**: < 60 s (e.g., "5.25s")
/// - **Minutes and Hours**: for longer durations (e.g., "5m 30s")
///
/// ```rust
/// # use lossless_bench::utils::format_duration;
/// # use std::time::Duration;
/// assert_eq!(format_duration(Duration::from_micros(2500)), "2.50ms");
/// assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total_ns = duration.as_nanos();

    if total_ns < 1_000_000 {
        format!("{:.2}μs", total_ns as f64 / 1_000.0)
    } else if total_ns < 1_000_000_000 {
        format!("{:.2}ms", total_ns as f64 / 1_000_000.0)
    } else if total_ns < 60_000_000_000 {
        format!("{:.2}s", total_ns as f64 / 1_000_000_000.0)
    } else {
        let seconds = duration.as_secs();
        let minutes = seconds / 60;
        let remaining_seconds = seconds % 60;

        if minutes < 60 {
            format!("{}m {}s", minutes, remaining_seconds)
        } else {
            let hours = minutes / 60;
            let remaining_minutes = minutes % 60;
            format!("{}h {}m {}s", hours, remaining_minutes, remaining_seconds)
        }
    }
}

/// Format a byte count with binary (1024-based) units.
pub fn format_bytes(bytes: u64) -> String {
    let bytes = bytes as f64;
    if bytes < 1024.0 {
        format!("{:.0} B", bytes)
    } else if bytes < 1024.0 * 1024.0 {
        format!("{:.2} KB", bytes / 1024.0)
    } else if bytes < 1024.0 * 1024.0 * 1024.0 {
        format!("{:.2} MB", bytes / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes / (1024.0 * 1024.0 * 1024.0))
    }
}

/// Directory holding a run's temporary artifacts.
///
/// A directory created by [`ScratchDir::create`] is removed with everything
/// in it when dropped; a caller-supplied directory is left in place.
#[derive(Debug)]
pub struct ScratchDir {
    path: PathBuf,
    owned: bool,
}

impl ScratchDir {
    /// Use `requested` if given, otherwise create a fresh directory under the
    /// system temp dir.
    pub fn create(requested: Option<&Path>) -> Result<Self> {
        let (path, owned) = match requested {
            Some(path) => (path.to_path_buf(), false),
            None => (
                std::env::temp_dir().join(format!(
                    "{}{}",
                    crate::defaults::SCRATCH_DIR_PREFIX,
                    generate_run_id()
                )),
                true,
            ),
        };
        std::fs::create_dir_all(&path)
            .with_context(|| format!("Failed to create scratch directory {:?}", path))?;
        debug!("Using scratch directory {:?}", path);
        Ok(Self { path, owned })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if self.owned {
            if let Err(e) = std::fs::remove_dir_all(&self.path) {
                warn!("Failed to remove scratch directory {:?}: {}", self.path, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_nanos(500)), "0.50μs");
        assert_eq!(format_duration(Duration::from_micros(1500)), "1.50ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
        assert_eq!(format_duration(Duration::from_secs(3725)), "1h 2m 5s");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(500), "500 B");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(1572864), "1.50 MB");
        assert_eq!(format_bytes(1610612736), "1.50 GB");
    }

    #[test]
    fn test_run_ids_are_unique() {
        assert_ne!(generate_run_id(), generate_run_id());
    }

    #[test]
    fn test_owned_scratch_dir_is_removed() {
        let path = {
            let scratch = ScratchDir::create(None).unwrap();
            std::fs::write(scratch.path().join("compressed.tmp"), b"x").unwrap();
            scratch.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn test_requested_scratch_dir_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let requested = dir.path().join("scratch");
        {
            let scratch = ScratchDir::create(Some(&requested)).unwrap();
            assert_eq!(scratch.path(), requested.as_path());
        }
        assert!(requested.exists());
    }
}
