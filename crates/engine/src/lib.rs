//! Bounded-memory streaming generation of deterministic filler files.
//!
//! A run writes the repeating `0..=255` ramp to a destination file in
//! fixed-size chunks, pacing itself on the sink's readiness signal,
//! reporting whole-percent progress, and removing the partial file when
//! the run is cancelled or fails.

mod cancel;
mod chunk;
mod outcome;
mod progress;
mod request;
mod session;
mod sink;
mod writer;

use std::io;
use std::path::PathBuf;

pub use cancel::CancelHandle;
pub use chunk::FillerChunk;
pub use outcome::{CleanupReport, Outcome, Warning};
pub use progress::{ProgressCallback, ProgressEvent};
pub use request::GenerationRequest;
pub use session::{RunStatus, WriteSession};
pub use sink::{FileSink, Sink, SinkFuture, WriteAck};
pub use writer::StreamingWriter;

/// Default chunk size: 1 MiB.
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// Number of chunks the file sink accepts ahead of the disk.
pub const SINK_QUEUE_DEPTH: usize = 1;

/// Errors produced by the generation engine.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("cannot create {}: {source}", path.display())]
    CreateFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("write failed ({cause}): {source}")]
    WriteFailed {
        cause: WriteFailure,
        #[source]
        source: io::Error,
    },

    #[error("cancelled")]
    Cancelled,
}

impl GenerateError {
    /// Wraps a mid-stream I/O error, classifying its cause.
    pub fn write_failed(source: io::Error) -> Self {
        Self::WriteFailed {
            cause: WriteFailure::classify(&source),
            source,
        }
    }

    /// Returns the write failure cause, if this is a write error.
    pub fn write_failure(&self) -> Option<WriteFailure> {
        match self {
            Self::WriteFailed { cause, .. } => Some(*cause),
            _ => None,
        }
    }
}

/// Cause of a mid-stream write failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteFailure {
    OutOfSpace,
    PermissionDenied,
    DestinationGone,
    Unknown,
}

#[cfg(unix)]
const ENOSPC: i32 = 28;
#[cfg(target_os = "linux")]
const EDQUOT: i32 = 122;

impl WriteFailure {
    /// Maps an I/O error reported by the sink to a failure cause.
    pub fn classify(err: &io::Error) -> Self {
        #[cfg(unix)]
        if err.raw_os_error() == Some(ENOSPC) {
            return Self::OutOfSpace;
        }
        #[cfg(target_os = "linux")]
        if err.raw_os_error() == Some(EDQUOT) {
            return Self::OutOfSpace;
        }

        match err.kind() {
            io::ErrorKind::StorageFull | io::ErrorKind::FileTooLarge => Self::OutOfSpace,
            io::ErrorKind::PermissionDenied | io::ErrorKind::ReadOnlyFilesystem => {
                Self::PermissionDenied
            }
            io::ErrorKind::NotFound
            | io::ErrorKind::StaleNetworkFileHandle
            | io::ErrorKind::BrokenPipe => Self::DestinationGone,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for WriteFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::OutOfSpace => "out of space",
            Self::PermissionDenied => "permission denied",
            Self::DestinationGone => "destination gone",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Builds the filler chunk for `request` and runs a generation to completion.
pub async fn generate(request: GenerationRequest) -> Outcome {
    match FillerChunk::build(request.chunk_size()) {
        Ok(chunk) => match StreamingWriter::new(request, chunk) {
            Ok(writer) => writer.run().await,
            Err(e) => Outcome::rejected(e),
        },
        Err(e) => Outcome::rejected(e),
    }
}
