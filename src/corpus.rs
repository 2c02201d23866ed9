//! Input corpus discovery.

use crate::error::{BenchError, BenchResult};
use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

fn is_wav(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("wav"))
}

/// Collect WAV files from `inputs`, deduplicated and sorted by path.
///
/// Directories are searched recursively for `*.wav`; files are taken as given.
pub fn discover<P: AsRef<Path>>(inputs: &[P]) -> BenchResult<Vec<PathBuf>> {
    let mut files = BTreeSet::new();

    for input in inputs {
        let input = input.as_ref();
        if input.is_dir() {
            for entry in WalkDir::new(input).follow_links(true) {
                let entry = entry.map_err(io::Error::from)?;
                if entry.file_type().is_file() && is_wav(entry.path()) {
                    files.insert(entry.into_path());
                }
            }
        } else if input.is_file() {
            files.insert(input.to_path_buf());
        } else {
            return Err(BenchError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("input {} does not exist", input.display()),
            )));
        }
    }

    debug!("Discovered {} wav files", files.len());
    Ok(files.into_iter().collect())
}
