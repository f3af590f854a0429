//! Retry policy with exponential backoff.

use std::time::Duration;

use rand::Rng;

use super::QuoteError;

/// Default number of attempts per cell, including the first.
const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default delay before the first retry.
const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(200);

/// Default cap on any single wait.
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(60);

/// Default jitter, as a fraction of the computed delay.
const DEFAULT_JITTER_FACTOR: f64 = 0.1;

/// How often, and how patiently, to retry a failed quote.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts per cell, including the first (at least 1)
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on each further retry
    pub base_delay: Duration,
    /// Upper bound on any single wait, including `Retry-After` hints
    pub max_delay: Duration,
    /// Random jitter as a fraction of the delay (0.0 disables it)
    pub jitter_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            jitter_factor: DEFAULT_JITTER_FACTOR,
        }
    }
}

impl RetryPolicy {
    /// Create a policy with the given attempts and delays and default jitter.
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            max_delay,
            jitter_factor: DEFAULT_JITTER_FACTOR,
        }
    }

    /// A policy that never retries.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Disable jitter (deterministic delays, for tests).
    pub fn without_jitter(mut self) -> Self {
        self.jitter_factor = 0.0;
        self
    }

    /// Returns true if another attempt is allowed after `attempts_made`
    /// failed attempts ended in `error`.
    pub fn should_retry(&self, error: &QuoteError, attempts_made: u32) -> bool {
        error.is_retryable() && attempts_made < self.max_attempts.max(1)
    }

    /// How long to wait after failed attempt number `attempt` (0-based).
    ///
    /// A rate-limit response carrying a `Retry-After` hint waits for the
    /// hint; everything else backs off exponentially.
    pub fn delay_for(&self, error: &QuoteError, attempt: u32) -> Duration {
        match error {
            QuoteError::RateLimited {
                retry_after: Some(hint),
            } => (*hint).min(self.max_delay),
            _ => self.backoff(attempt),
        }
    }

    /// Exponential backoff for failed attempt number `attempt` (0-based):
    /// `base_delay * 2^attempt`, capped at `max_delay`, with jitter.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let capped = self
            .base_delay
            .saturating_mul(1u32 << attempt.min(20))
            .min(self.max_delay);

        if self.jitter_factor > 0.0 && !capped.is_zero() {
            let jitter = rand::rng().random_range(-self.jitter_factor..=self.jitter_factor);
            capped.mul_f64((1.0 + jitter).max(0.0))
        } else {
            capped
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transient() -> QuoteError {
        QuoteError::Transient("503".into())
    }

    #[test]
    fn default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.base_delay, Duration::from_millis(200));
        assert_eq!(policy.max_delay, Duration::from_secs(60));
        assert!((policy.jitter_factor - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let policy =
            RetryPolicy::new(5, Duration::from_millis(100), Duration::from_millis(350)).without_jitter();
        assert_eq!(policy.backoff(0), Duration::from_millis(100));
        assert_eq!(policy.backoff(1), Duration::from_millis(200));
        assert_eq!(policy.backoff(2), Duration::from_millis(350));
        assert_eq!(policy.backoff(10), Duration::from_millis(350));
    }

    #[test]
    fn jitter_stays_in_range() {
        let policy = RetryPolicy::new(3, Duration::from_millis(1000), Duration::from_secs(60));
        for _ in 0..100 {
            let d = policy.backoff(0);
            assert!(d >= Duration::from_millis(899), "{d:?} too short");
            assert!(d <= Duration::from_millis(1101), "{d:?} too long");
        }
    }

    #[test]
    fn retry_after_hint_is_honoured_and_capped() {
        let policy = RetryPolicy::new(3, Duration::from_millis(100), Duration::from_secs(10))
            .without_jitter();
        let hinted = QuoteError::RateLimited {
            retry_after: Some(Duration::from_secs(4)),
        };
        assert_eq!(policy.delay_for(&hinted, 0), Duration::from_secs(4));

        let excessive = QuoteError::RateLimited {
            retry_after: Some(Duration::from_secs(600)),
        };
        assert_eq!(policy.delay_for(&excessive, 0), Duration::from_secs(10));
    }

    #[test]
    fn rate_limit_without_hint_backs_off() {
        let policy = RetryPolicy::new(3, Duration::from_millis(100), Duration::from_secs(10))
            .without_jitter();
        let bare = QuoteError::RateLimited { retry_after: None };
        assert_eq!(policy.delay_for(&bare, 1), Duration::from_millis(200));
    }

    #[test]
    fn should_retry_respects_budget_and_class() {
        let policy = RetryPolicy::default();
        assert!(policy.should_retry(&transient(), 1));
        assert!(policy.should_retry(&transient(), 2));
        assert!(!policy.should_retry(&transient(), 3));
        assert!(!policy.should_retry(&QuoteError::Permanent("404".into()), 1));
        assert!(!policy.should_retry(&QuoteError::Malformed("eof".into()), 1));
    }

    #[test]
    fn no_retry_policy() {
        assert!(!RetryPolicy::no_retry().should_retry(&transient(), 1));
    }
}
