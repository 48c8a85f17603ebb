use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio_util::sync::CancellationToken;

/// Thread-safe cancellation control for a run.
///
/// Cloneable and callable from any thread or task, including a signal
/// handler task. Requesting cancellation only flips state; the write loop
/// observes it at its next check point.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    token: CancellationToken,
    requested: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    ///
    /// Returns `true` for the first request and `false` for any repeat.
    pub fn request_cancel(&self) -> bool {
        if self.requested.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.token.cancel();
        tracing::debug!("cancellation requested");
        true
    }

    /// Returns `true` once cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves when cancellation is requested.
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }

    pub(crate) fn token(&self) -> &CancellationToken {
        &self.token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_request_wins() {
        let handle = CancelHandle::new();
        assert!(!handle.is_cancelled());
        assert!(handle.request_cancel());
        assert!(!handle.request_cancel());
        assert!(handle.is_cancelled());
    }

    #[test]
    fn clones_share_state() {
        let a = CancelHandle::new();
        let b = a.clone();
        assert!(b.request_cancel());
        assert!(a.is_cancelled());
        assert!(!a.request_cancel());
    }

    #[test]
    fn concurrent_requests_yield_one_winner() {
        use std::thread;

        let handle = CancelHandle::new();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let h = handle.clone();
                thread::spawn(move || h.request_cancel())
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn cancelled_resolves_after_request() {
        let handle = CancelHandle::new();
        let waiter = {
            let h = handle.clone();
            tokio::spawn(async move { h.cancelled().await })
        };
        handle.request_cancel();
        waiter.await.unwrap();
    }
}
