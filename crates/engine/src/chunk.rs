use bytes::Bytes;

use crate::GenerateError;

/// Reusable buffer of deterministic filler bytes.
///
/// Byte `i` holds `i mod 256`. The buffer is frozen at construction and
/// handed out as reference-counted views, so every full-size write shares
/// the same allocation.
#[derive(Debug, Clone)]
pub struct FillerChunk {
    data: Bytes,
}

impl FillerChunk {
    /// Builds a chunk of exactly `size` bytes.
    pub fn build(size: usize) -> Result<Self, GenerateError> {
        if size == 0 {
            return Err(GenerateError::InvalidConfiguration(
                "chunk size must be positive".into(),
            ));
        }
        let data: Vec<u8> = (0..size).map(|i| (i % 256) as u8).collect();
        Ok(Self {
            data: Bytes::from(data),
        })
    }

    /// Chunk length in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always `false`; a chunk cannot be built empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The whole chunk.
    pub fn full(&self) -> Bytes {
        self.data.clone()
    }

    /// The first `len` bytes, without copying.
    ///
    /// `len` is clamped to the chunk length.
    pub fn prefix(&self, len: usize) -> Bytes {
        self.data.slice(..len.min(self.data.len()))
    }

    /// Read-only view of the buffer.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }
}
