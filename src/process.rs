//! # Scoped Subprocess Execution
//!
//! Runs one external codec command to completion and reports the CPU time the
//! child consumed (user + system), read from the `RUSAGE_CHILDREN` accounting
//! before and after the child is reaped. CPU time rather than wall-clock time
//! keeps host scheduling noise out of the measurement.
//!
//! [`ScratchFiles`] owns the temporary artifacts of one benchmark iteration
//! and removes them when dropped, whichever way the iteration ends.

use crate::catalog::CommandLine;
use crate::error::{BenchError, BenchResult};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::{debug, warn};

/// How external commands are run.
#[derive(Debug, Clone, Default)]
pub struct ExecOptions {
    /// Kill the child and fail when it runs longer than this.
    pub timeout: Option<Duration>,
    /// Pass the child's stdout/stderr through instead of discarding them.
    pub show_output: bool,
}

/// Cumulative CPU time of all reaped children of this process.
#[cfg(unix)]
fn children_cpu_time() -> Option<Duration> {
    use nix::sys::resource::{getrusage, UsageWho};

    let usage = getrusage(UsageWho::RUSAGE_CHILDREN).ok()?;
    let to_duration = |secs: i64, micros: i64| {
        Duration::from_secs(secs.max(0) as u64) + Duration::from_micros(micros.max(0) as u64)
    };
    let user = usage.user_time();
    let system = usage.system_time();
    Some(
        to_duration(user.tv_sec() as i64, user.tv_usec() as i64)
            + to_duration(system.tv_sec() as i64, system.tv_usec() as i64),
    )
}

#[cfg(not(unix))]
fn children_cpu_time() -> Option<Duration> {
    None
}

/// Run `command` to completion and return the CPU time it used.
///
/// Fails with [`BenchError::ExternalProcess`] if the program cannot be
/// spawned, exits unsuccessfully, or exceeds the configured timeout.
pub async fn run_timed(tool: &str, command: &CommandLine, options: &ExecOptions) -> BenchResult<Duration> {
    debug!("Executing: {}", command);

    let mut cmd = Command::new(&command.program);
    cmd.args(&command.args)
        .stdin(Stdio::null())
        .kill_on_drop(true);
    if options.show_output {
        cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
    } else {
        cmd.stdout(Stdio::null()).stderr(Stdio::null());
    }

    let cpu_before = children_cpu_time();
    let started = Instant::now();

    let mut child = cmd.spawn().map_err(|e| {
        BenchError::external(
            tool,
            format!("failed to start '{}': {}", command.program.to_string_lossy(), e),
        )
    })?;

    let waited = match options.timeout {
        Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
            Ok(waited) => waited,
            Err(_) => {
                if let Err(e) = child.kill().await {
                    warn!("Failed to kill timed out child: {}", e);
                }
                return Err(BenchError::external(
                    tool,
                    format!("`{}` timed out after {:?}", command, limit),
                ));
            }
        },
        None => child.wait().await,
    };
    let status = waited.map_err(|e| BenchError::external(tool, format!("wait failed: {}", e)))?;

    let wall = started.elapsed();
    let cpu = match (cpu_before, children_cpu_time()) {
        (Some(before), Some(after)) => after.saturating_sub(before),
        _ => {
            warn!("Child CPU accounting unavailable, reporting wall-clock time");
            wall
        }
    };

    if !status.success() {
        return Err(BenchError::external(
            tool,
            format!("`{}` exited with {}", command, status),
        ));
    }

    debug!("Finished in {:?} CPU ({:?} wall)", cpu, wall);
    Ok(cpu)
}

/// Size of `path` in bytes, failing unless it exists and is non-empty.
pub fn require_output(tool: &str, path: &Path) -> BenchResult<u64> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.len() > 0 => Ok(meta.len()),
        Ok(_) => Err(BenchError::external(
            tool,
            format!("output {} is empty", path.display()),
        )),
        Err(_) => Err(BenchError::external(
            tool,
            format!("no output file at {}", path.display()),
        )),
    }
}

/// Temporary files removed on drop.
#[derive(Debug, Default)]
pub struct ScratchFiles {
    paths: Vec<PathBuf>,
}

impl ScratchFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `path`, removing any stale file already there.
    pub fn track(&mut self, path: impl Into<PathBuf>) -> BenchResult<()> {
        let path = path.into();
        remove_if_exists(&path)?;
        if !self.paths.contains(&path) {
            self.paths.push(path);
        }
        Ok(())
    }

    /// Take ownership of a path some later step will create.
    pub fn adopt(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        if !self.paths.contains(&path) {
            self.paths.push(path);
        }
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

impl Drop for ScratchFiles {
    fn drop(&mut self) {
        for path in &self.paths {
            if let Err(e) = remove_if_exists(path) {
                warn!("Failed to remove scratch file {:?}: {}", path, e);
            }
        }
    }
}

fn remove_if_exists(path: &Path) -> std::io::Result<()> {
    match std::fs::remove_file(path) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}
