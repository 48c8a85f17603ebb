use std::path::{Path, PathBuf};

use crate::GenerateError;

/// Resolved parameters of a single generation run.
///
/// Immutable once built; the constructor is the only way to get one, so an
/// existing request always has positive sizes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    destination: PathBuf,
    total_bytes: u64,
    chunk_size: usize,
}

impl GenerationRequest {
    /// Validates and builds a request.
    pub fn new(
        destination: impl Into<PathBuf>,
        total_bytes: u64,
        chunk_size: usize,
    ) -> Result<Self, GenerateError> {
        if total_bytes == 0 {
            return Err(GenerateError::InvalidConfiguration(
                "total size must be positive".into(),
            ));
        }
        if chunk_size == 0 {
            return Err(GenerateError::InvalidConfiguration(
                "chunk size must be positive".into(),
            ));
        }
        let destination = destination.into();
        if destination.as_os_str().is_empty() {
            return Err(GenerateError::InvalidConfiguration(
                "destination path is empty".into(),
            ));
        }
        Ok(Self {
            destination,
            total_bytes,
            chunk_size,
        })
    }

    /// Target file path.
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Exact number of bytes to produce.
    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// Size of each full write.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Number of writes a run performs, counting the final partial one.
    pub fn chunk_count(&self) -> u64 {
        self.total_bytes.div_ceil(self.chunk_size as u64)
    }
}
