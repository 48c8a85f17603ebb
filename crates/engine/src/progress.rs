use serde::Serialize;

/// Progress notification emitted once per whole-percent increase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    /// Whole percent complete, 1..=100.
    pub percent: u8,
    pub bytes_written: u64,
    pub total_bytes: u64,
}

/// Callback invoked with run progress.
///
/// Called synchronously from the write loop; it must not block.
pub type ProgressCallback = Box<dyn Fn(ProgressEvent) + Send + Sync>;

/// Fan-out over registered progress callbacks.
#[derive(Default)]
pub(crate) struct ProgressNotifier {
    callbacks: Vec<ProgressCallback>,
}

impl ProgressNotifier {
    pub(crate) fn register(&mut self, callback: ProgressCallback) {
        self.callbacks.push(callback);
    }

    pub(crate) fn notify(&self, event: ProgressEvent) {
        for cb in &self.callbacks {
            cb(event);
        }
    }
}
