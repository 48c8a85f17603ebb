use std::time::Duration;

use crate::GenerateError;
use crate::session::{RunStatus, WriteSession};

/// Non-fatal observation attached to a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// The file on disk is not the size that was written.
    SizeMismatch { expected: u64, actual: u64 },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SizeMismatch { expected, actual } => {
                write!(f, "size mismatch: expected {expected} bytes, found {actual}")
            }
        }
    }
}

/// Result of the partial-file removal step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// The destination was removed (or was already absent).
    pub removed: bool,
    /// Removal error, kept apart from the run's primary error.
    pub error: Option<String>,
}

/// Terminal result of a run.
#[derive(Debug)]
pub struct Outcome {
    pub status: RunStatus,
    pub bytes_written: u64,
    pub final_size_on_disk: Option<u64>,
    pub error: Option<GenerateError>,
    pub warnings: Vec<Warning>,
    pub cleanup: Option<CleanupReport>,
    pub elapsed: Duration,
}

impl Outcome {
    /// Outcome for a run that never started.
    pub(crate) fn rejected(error: GenerateError) -> Self {
        Self {
            status: RunStatus::Failed,
            bytes_written: 0,
            final_size_on_disk: None,
            error: Some(error),
            warnings: Vec::new(),
            cleanup: None,
            elapsed: Duration::ZERO,
        }
    }

    pub(crate) fn from_session(session: &WriteSession) -> Self {
        Self {
            status: session.status(),
            bytes_written: session.bytes_written(),
            final_size_on_disk: None,
            error: None,
            warnings: Vec::new(),
            cleanup: None,
            elapsed: session.elapsed(),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == RunStatus::Completed
    }

    /// Average throughput in bytes per second, 0.0 for instant runs.
    pub fn bytes_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs <= 0.0 {
            return 0.0;
        }
        self.bytes_written as f64 / secs
    }
}
