//! Destination sinks with an explicit readiness signal.
//!
//! A [`Sink`] accepts one chunk at a time. After each submission it says
//! whether it can take more right away ([`WriteAck::Ready`]) or wants the
//! producer to wait for [`Sink::ready`] ([`WriteAck::Saturated`]).

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use bytes::Bytes;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Boxed future returned by [`Sink`] methods.
pub type SinkFuture<'a, T> = Pin<Box<dyn Future<Output = io::Result<T>> + Send + 'a>>;

/// Readiness reported after a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteAck {
    /// The sink can take another chunk immediately.
    Ready,
    /// The chunk was accepted but the sink's buffer is full; wait for
    /// [`Sink::ready`] before submitting again.
    Saturated,
}

/// Write side of a generation destination.
pub trait Sink: Send {
    /// Submits one chunk. An error means the destination failed.
    fn submit(&mut self, data: Bytes) -> SinkFuture<'_, WriteAck>;

    /// Resolves once the sink can accept another chunk.
    fn ready(&mut self) -> SinkFuture<'_, ()>;

    /// Signals end of input and resolves once data is flushed to storage.
    fn finish(&mut self) -> SinkFuture<'_, ()>;

    /// Stops accepting input and releases the destination handle.
    ///
    /// Writes already accepted may complete; nothing new is started.
    fn close(&mut self) -> SinkFuture<'_, ()>;
}

/// File-backed sink.
///
/// Chunks travel over a bounded channel to a writer task that owns the
/// file, so at most `queue_depth` chunks wait behind the write in flight.
pub struct FileSink {
    path: PathBuf,
    tx: Option<mpsc::Sender<Bytes>>,
    task: Option<JoinHandle<io::Result<File>>>,
}

impl FileSink {
    /// Creates (or truncates) `path` and starts the writer task.
    pub async fn create(path: &Path, queue_depth: usize) -> io::Result<Self> {
        let file = tokio::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .await?;

        let (tx, rx) = mpsc::channel(queue_depth.max(1));
        let task = tokio::spawn(write_loop(file, rx));
        debug!(path = %path.display(), queue_depth, "file sink opened");

        Ok(Self {
            path: path.to_path_buf(),
            tx: Some(tx),
            task: Some(task),
        })
    }

    /// Waits for the writer task and returns the error that stopped it.
    async fn writer_error(&mut self) -> io::Error {
        self.tx = None;
        match self.task.take() {
            Some(task) => match task.await {
                Ok(Err(e)) => e,
                Ok(Ok(_)) => {
                    io::Error::new(io::ErrorKind::BrokenPipe, "file writer stopped early")
                }
                Err(e) => io::Error::other(e),
            },
            None => closed_error(),
        }
    }
}

impl Sink for FileSink {
    fn submit(&mut self, data: Bytes) -> SinkFuture<'_, WriteAck> {
        Box::pin(async move {
            let sent = match self.tx.as_ref() {
                Some(tx) => match tx.try_send(data) {
                    Ok(()) => true,
                    // Submitted without waiting for readiness; block instead.
                    Err(TrySendError::Full(data)) => tx.send(data).await.is_ok(),
                    Err(TrySendError::Closed(_)) => false,
                },
                None => return Err(closed_error()),
            };
            if !sent {
                return Err(self.writer_error().await);
            }

            let saturated = self.tx.as_ref().is_some_and(|tx| tx.capacity() == 0);
            Ok(if saturated {
                WriteAck::Saturated
            } else {
                WriteAck::Ready
            })
        })
    }

    fn ready(&mut self) -> SinkFuture<'_, ()> {
        Box::pin(async move {
            let open = match self.tx.as_ref() {
                Some(tx) => tx.reserve().await.is_ok(),
                None => return Err(closed_error()),
            };
            if open {
                Ok(())
            } else {
                Err(self.writer_error().await)
            }
        })
    }

    fn finish(&mut self) -> SinkFuture<'_, ()> {
        Box::pin(async move {
            self.tx = None;
            // Left in place until the task ends; `close` joins it if this
            // future is dropped.
            let task = self.task.as_mut().ok_or_else(closed_error)?;
            let joined = task.await;
            self.task = None;
            let file = joined.map_err(io::Error::other)??;
            file.sync_all().await?;
            debug!(path = %self.path.display(), "file sink finished");
            Ok(())
        })
    }

    fn close(&mut self) -> SinkFuture<'_, ()> {
        Box::pin(async move {
            self.tx = None;
            if let Some(task) = self.task.take() {
                match task.await {
                    Ok(Ok(file)) => drop(file),
                    Ok(Err(e)) => debug!(error = %e, "file writer ended with error during close"),
                    Err(e) => warn!(error = %e, "file writer task failed"),
                }
            }
            Ok(())
        })
    }
}

async fn write_loop(mut file: File, mut rx: mpsc::Receiver<Bytes>) -> io::Result<File> {
    while let Some(buf) = rx.recv().await {
        file.write_all(&buf).await?;
    }
    file.flush().await?;
    Ok(file)
}

fn closed_error() -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, "file sink closed")
}
