//! Resolves user-facing generation options into an engine request.
//!
//! Parses human sizes, enforces the 1 MiB to 1 TiB size range, picks file
//! type presets, sanitizes file names, and prepares the output directory.

mod name;
mod output;
mod preset;
mod size;

use std::path::{Path, PathBuf};

use fillgen_engine::{DEFAULT_CHUNK_SIZE, GenerateError, GenerationRequest};

pub use name::{default_file_name, ensure_extension, sanitize_file_name};
pub use output::{expand_home, prepare_output_dir};
pub use preset::{FilePreset, PRESETS};
pub use size::{
    GIB, KIB, MAX_SIZE, MIB, MIN_SIZE, TIB, format_size, parse_size, size_label, validate_size,
};

/// Errors produced while resolving generation options.
#[derive(Debug, thiserror::Error)]
pub enum SizingError {
    #[error("invalid size: {0:?}")]
    InvalidSize(String),

    #[error("size {bytes} bytes is outside the allowed range {min}..={max}")]
    OutOfBounds { bytes: u64, min: u64, max: u64 },

    #[error("invalid file name: {0}")]
    InvalidName(String),

    #[error("unknown file type: {0}")]
    UnknownPreset(String),

    #[error("directory {} is not writable: {source}", path.display())]
    DirectoryNotWritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Engine(#[from] GenerateError),
}

/// Unresolved options as collected from the command line and config.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    pub size: String,
    pub output_dir: PathBuf,
    pub name: Option<String>,
    pub preset: FilePreset,
    pub chunk_size: Option<String>,
}

impl ResolveOptions {
    pub fn new(size: impl Into<String>, output_dir: impl AsRef<Path>) -> Self {
        Self {
            size: size.into(),
            output_dir: output_dir.as_ref().to_path_buf(),
            name: None,
            preset: FilePreset::default(),
            chunk_size: None,
        }
    }
}

/// Validates options, prepares the directory and builds the request.
///
/// The chunk size is capped at the total size so a small file is written
/// in a single pass.
pub fn resolve(options: &ResolveOptions) -> Result<GenerationRequest, SizingError> {
    let total = validate_size(parse_size(&options.size)?)?;

    let chunk_size = match options.chunk_size.as_deref() {
        Some(text) => parse_size(text)?,
        None => DEFAULT_CHUNK_SIZE as u64,
    };
    if chunk_size == 0 {
        return Err(SizingError::InvalidSize("chunk size must be positive".into()));
    }
    let chunk_size = usize::try_from(chunk_size.min(total))
        .map_err(|_| SizingError::InvalidSize(format!("chunk size too large: {chunk_size}")))?;

    let file_name = match options.name.as_deref() {
        Some(name) => ensure_extension(&sanitize_file_name(name)?, &options.preset),
        None => default_file_name(total, &options.preset),
    };

    let dir = prepare_output_dir(&options.output_dir)?;
    let destination = dir.join(file_name);
    tracing::debug!(
        path = %destination.display(),
        total_bytes = total,
        chunk_size,
        "generation options resolved"
    );

    Ok(GenerationRequest::new(destination, total, chunk_size)?)
}
