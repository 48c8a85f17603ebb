use std::time::{Duration, Instant};

use serde::Serialize;

use crate::progress::ProgressEvent;

/// Lifecycle status of a generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl RunStatus {
    /// Returns `true` for Completed, Cancelled and Failed.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Running)
    }
}

/// Mutable state of one run.
///
/// Owned by the write loop and passed by `&mut`; never shared between runs.
#[derive(Debug)]
pub struct WriteSession {
    total_bytes: u64,
    bytes_written: u64,
    last_reported_percent: u8,
    status: RunStatus,
    started_at: Instant,
}

impl WriteSession {
    /// Starts a running session for `total_bytes`.
    pub fn new(total_bytes: u64) -> Self {
        Self {
            total_bytes,
            bytes_written: 0,
            last_reported_percent: 0,
            status: RunStatus::Running,
            started_at: Instant::now(),
        }
    }

    /// Bytes still to write.
    pub fn remaining(&self) -> u64 {
        self.total_bytes - self.bytes_written
    }

    /// Returns `true` while running with bytes left to write.
    pub fn has_work(&self) -> bool {
        self.status == RunStatus::Running && self.bytes_written < self.total_bytes
    }

    /// Records an accepted write.
    ///
    /// Returns a progress event only when the whole-percent value moved past
    /// the last reported one.
    pub fn record(&mut self, bytes: u64) -> Option<ProgressEvent> {
        self.bytes_written += bytes;
        let percent = self.percent();
        if percent > self.last_reported_percent {
            self.last_reported_percent = percent;
            Some(ProgressEvent {
                percent,
                bytes_written: self.bytes_written,
                total_bytes: self.total_bytes,
            })
        } else {
            None
        }
    }

    /// `floor(bytes_written * 100 / total_bytes)`.
    pub fn percent(&self) -> u8 {
        let p = u128::from(self.bytes_written) * 100 / u128::from(self.total_bytes);
        p.min(100) as u8
    }

    /// Marks the session completed.
    pub fn complete(&mut self) {
        self.finish(RunStatus::Completed);
    }

    /// Marks the session cancelled.
    pub fn cancel(&mut self) {
        self.finish(RunStatus::Cancelled);
    }

    /// Marks the session failed.
    pub fn fail(&mut self) {
        self.finish(RunStatus::Failed);
    }

    fn finish(&mut self, status: RunStatus) {
        if !self.status.is_terminal() {
            self.status = status;
        }
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Time since the session started.
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_is_running() {
        let s = WriteSession::new(100);
        assert_eq!(s.status(), RunStatus::Running);
        assert!(s.has_work());
        assert_eq!(s.bytes_written(), 0);
        assert_eq!(s.remaining(), 100);
    }

    #[test]
    fn record_emits_on_whole_percent() {
        let mut s = WriteSession::new(1000);
        // 0.5% rounds down to 0: nothing to report.
        assert!(s.record(5).is_none());
        let ev = s.record(5).unwrap();
        assert_eq!(ev.percent, 1);
        assert_eq!(ev.bytes_written, 10);
        assert_eq!(ev.total_bytes, 1000);
        // Still 1%.
        assert!(s.record(9).is_none());
        assert_eq!(s.last_reported_percent, 1);
    }

    #[test]
    fn record_skips_percentages_on_large_writes() {
        let mut s = WriteSession::new(10);
        let ev = s.record(3).unwrap();
        assert_eq!(ev.percent, 30);
        let ev = s.record(7).unwrap();
        assert_eq!(ev.percent, 100);
        assert!(!s.has_work());
    }

    #[test]
    fn percent_handles_huge_totals() {
        let tib = 1u64 << 40;
        let mut s = WriteSession::new(tib);
        s.record(tib / 2);
        assert_eq!(s.percent(), 50);
    }

    #[test]
    fn terminal_status_is_sticky() {
        let mut s = WriteSession::new(10);
        s.cancel();
        s.fail();
        s.complete();
        assert_eq!(s.status(), RunStatus::Cancelled);
        assert!(s.status().is_terminal());
        assert!(!s.has_work());
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&RunStatus::Completed).unwrap();
        assert_eq!(json, "\"completed\"");
    }
}
