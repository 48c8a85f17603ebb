//! Output directory preparation.

use std::path::{Path, PathBuf};

use crate::SizingError;

const PROBE_NAME: &str = ".fillgen-write-probe";

/// Ensures `dir` exists and accepts new files.
///
/// Creates missing directories, then writes and removes a probe file.
/// Free space is not checked; running out of space surfaces as a write
/// error during generation.
pub fn prepare_output_dir(dir: &Path) -> Result<PathBuf, SizingError> {
    let not_writable = |source| SizingError::DirectoryNotWritable {
        path: dir.to_path_buf(),
        source,
    };

    std::fs::create_dir_all(dir).map_err(not_writable)?;

    let probe = dir.join(PROBE_NAME);
    std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&probe)
        .map_err(not_writable)?;
    if let Err(e) = std::fs::remove_file(&probe) {
        tracing::warn!(path = %probe.display(), error = %e, "failed to remove write probe");
    }

    let dir = std::fs::canonicalize(dir).map_err(not_writable)?;
    tracing::debug!(path = %dir.display(), "output directory ready");
    Ok(dir)
}

/// Expands a `~` prefix to the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        home_dir().join(rest)
    } else if path == "~" {
        home_dir()
    } else {
        PathBuf::from(path)
    }
}

fn home_dir() -> PathBuf {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}
