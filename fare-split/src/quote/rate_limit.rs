//! Minimum-interval rate limiter shared by all in-flight quotes.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Spaces request starts at least `min_interval` apart.
///
/// One limiter is owned by a quoter instance and shared by every
/// concurrent quote it serves, so the interval holds across all workers
/// combined. Callers reserve the next free slot under a short lock and
/// then sleep outside it.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Create a limiter allowing one request start per `min_interval`.
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            next_slot: Mutex::new(None),
        }
    }

    /// A limiter that never waits.
    pub fn unlimited() -> Self {
        Self::new(Duration::ZERO)
    }

    /// The configured interval.
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait until this caller may start a request.
    pub async fn acquire(&self) {
        if self.min_interval.is_zero() {
            return;
        }

        let slot = {
            let mut next = self.next_slot.lock().await;
            let now = Instant::now();
            let slot = match *next {
                Some(t) if t > now => t,
                _ => now,
            };
            *next = Some(slot + self.min_interval);
            slot
        };

        tokio::time::sleep_until(slot).await;
    }
}
