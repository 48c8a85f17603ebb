//! The streaming write loop.

use std::io;

use tracing::{debug, info, trace, warn};

use crate::cancel::CancelHandle;
use crate::chunk::FillerChunk;
use crate::outcome::{CleanupReport, Outcome, Warning};
use crate::progress::{ProgressCallback, ProgressEvent, ProgressNotifier};
use crate::request::GenerationRequest;
use crate::session::WriteSession;
use crate::sink::{FileSink, Sink, WriteAck};
use crate::{GenerateError, SINK_QUEUE_DEPTH};

/// Drives one generation run against a sink.
///
/// Memory use is one filler chunk plus whatever the sink buffers, never a
/// function of the total size. The writer is consumed by a run, so each
/// run gets exactly one terminal path and at most one cleanup pass.
pub struct StreamingWriter {
    request: GenerationRequest,
    chunk: FillerChunk,
    notifier: ProgressNotifier,
    cancel: CancelHandle,
}

impl StreamingWriter {
    /// Pairs a request with its filler chunk.
    ///
    /// The chunk must be exactly `request.chunk_size()` bytes long.
    pub fn new(request: GenerationRequest, chunk: FillerChunk) -> Result<Self, GenerateError> {
        if chunk.len() != request.chunk_size() {
            return Err(GenerateError::InvalidConfiguration(format!(
                "filler chunk is {} bytes, request expects {}",
                chunk.len(),
                request.chunk_size()
            )));
        }
        Ok(Self {
            request,
            chunk,
            notifier: ProgressNotifier::default(),
            cancel: CancelHandle::new(),
        })
    }

    /// Uses an externally created cancellation handle.
    pub fn with_cancel_handle(mut self, cancel: CancelHandle) -> Self {
        self.cancel = cancel;
        self
    }

    /// Registers a progress callback.
    pub fn on_progress(&mut self, callback: ProgressCallback) {
        self.notifier.register(callback);
    }

    /// Returns a handle that cancels this run.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Opens the destination file and runs to a terminal status.
    pub async fn run(self) -> Outcome {
        let path = self.request.destination();
        if self.cancel.is_cancelled() {
            info!(path = %path.display(), "cancelled before start");
            let mut session = WriteSession::new(self.request.total_bytes());
            session.cancel();
            return Outcome::from_session(&session);
        }

        let sink = match FileSink::create(path, SINK_QUEUE_DEPTH).await {
            Ok(sink) => sink,
            Err(source) => {
                warn!(path = %path.display(), error = %source, "failed to create destination");
                return Outcome::rejected(GenerateError::CreateFailed {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        self.run_with_sink(sink).await
    }

    /// Runs the write loop against an already opened sink.
    ///
    /// Verification and cleanup still act on `request.destination()`.
    pub async fn run_with_sink<S: Sink>(self, mut sink: S) -> Outcome {
        let mut session = WriteSession::new(self.request.total_bytes());
        info!(
            path = %self.request.destination().display(),
            total_bytes = self.request.total_bytes(),
            chunk_size = self.request.chunk_size(),
            chunks = self.request.chunk_count(),
            "generation started"
        );

        match self.drive(&mut sink, &mut session).await {
            Ok(last_event) => {
                session.complete();
                if let Some(event) = last_event {
                    self.notifier.notify(event);
                }
                self.finalize(&session).await
            }
            Err(GenerateError::Cancelled) => {
                session.cancel();
                info!(bytes_written = session.bytes_written(), "generation cancelled");
                let mut outcome = Outcome::from_session(&session);
                outcome.cleanup = Some(self.cleanup(&mut sink).await);
                outcome
            }
            Err(err) => {
                session.fail();
                warn!(
                    bytes_written = session.bytes_written(),
                    error = %err,
                    "generation failed"
                );
                let mut outcome = Outcome::from_session(&session);
                outcome.cleanup = Some(self.cleanup(&mut sink).await);
                outcome.error = Some(err);
                outcome
            }
        }
    }

    /// Writes every chunk and waits for the sink to flush.
    ///
    /// Cancellation is honoured until `finish` resolves. The 100% event is handed back instead of emitted so it only fires
    /// once the run is known to have completed.
    async fn drive<S: Sink>(
        &self,
        sink: &mut S,
        session: &mut WriteSession,
    ) -> Result<Option<ProgressEvent>, GenerateError> {
        let token = self.cancel.token();
        let chunk_len = self.chunk.len() as u64;
        let mut last_event = None;

        while session.has_work() {
            if token.is_cancelled() {
                return Err(GenerateError::Cancelled);
            }

            let to_write = chunk_len.min(session.remaining());
            let data = if to_write == chunk_len {
                self.chunk.full()
            } else {
                self.chunk.prefix(to_write as usize)
            };

            let ack = sink.submit(data).await.map_err(GenerateError::write_failed)?;

            if let Some(event) = session.record(to_write) {
                trace!(percent = event.percent, bytes_written = event.bytes_written, "progress");
                if event.percent == 100 {
                    last_event = Some(event);
                } else {
                    self.notifier.notify(event);
                }
            }

            if ack == WriteAck::Saturated && session.has_work() {
                trace!("sink saturated, waiting for readiness");
                tokio::select! {
                    biased;
                    _ = token.cancelled() => return Err(GenerateError::Cancelled),
                    ready = sink.ready() => ready.map_err(GenerateError::write_failed)?,
                }
            }
        }

        // Still cancellable while the sink flushes.
        tokio::select! {
            biased;
            _ = token.cancelled() => return Err(GenerateError::Cancelled),
            finished = sink.finish() => finished.map_err(GenerateError::write_failed)?,
        }
        Ok(last_event)
    }

    /// Checks the on-disk size of a completed run.
    async fn finalize(&self, session: &WriteSession) -> Outcome {
        let path = self.request.destination();
        let expected = self.request.total_bytes();
        let mut outcome = Outcome::from_session(session);

        match tokio::fs::metadata(path).await {
            Ok(meta) => {
                let actual = meta.len();
                outcome.final_size_on_disk = Some(actual);
                if actual != expected {
                    warn!(path = %path.display(), expected, actual, "final size mismatch");
                    outcome.warnings.push(Warning::SizeMismatch { expected, actual });
                }
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot stat completed file");
            }
        }

        info!(
            path = %path.display(),
            bytes_written = session.bytes_written(),
            elapsed_ms = outcome.elapsed.as_millis() as u64,
            "generation completed"
        );
        outcome
    }

    /// Closes the sink, then removes the partial destination.
    async fn cleanup<S: Sink>(&self, sink: &mut S) -> CleanupReport {
        let path = self.request.destination();
        if let Err(e) = sink.close().await {
            warn!(error = %e, "failed to close sink before cleanup");
        }

        match tokio::fs::remove_file(path).await {
            Ok(()) => {
                debug!(path = %path.display(), "partial file removed");
                CleanupReport {
                    removed: true,
                    error: None,
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => CleanupReport {
                removed: true,
                error: None,
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to remove partial file");
                CleanupReport {
                    removed: false,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}
