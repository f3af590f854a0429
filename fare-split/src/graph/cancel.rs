//! Cooperative cancellation for graph builds.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;

#[derive(Debug, Default)]
struct Inner {
    cancelled: AtomicBool,
    notify: Notify,
}

/// A cloneable cancellation signal.
///
/// Any clone may call `cancel`; every clone observes it. Once cancelled a
/// token stays cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

impl CancelToken {
    /// Create a token that has not been cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation to every clone of this token.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    /// Returns true once `cancel` has been called.
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once the token is cancelled.
    pub async fn cancelled(&self) {
        loop {
            let notified = self.inner.notify.notified();
            tokio::pin!(notified);
            // Register before checking the flag so a concurrent cancel is not missed
            notified.as_mut().enable();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }

    /// Cancel this token after `timeout` unless the returned guard is
    /// dropped first.
    pub fn cancel_after(&self, timeout: Duration) -> DeadlineGuard {
        let token = self.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            token.cancel();
        });
        DeadlineGuard { handle }
    }
}

/// Aborts a pending `cancel_after` deadline when dropped.
#[derive(Debug)]
pub struct DeadlineGuard {
    handle: JoinHandle<()>,
}

impl Drop for DeadlineGuard {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
