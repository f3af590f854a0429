//! Build configuration for the price graph.

use crate::quote::RetryPolicy;

/// Service attribute the provider attaches to trains covered by the
/// flat-rate pass.
pub const DEFAULT_FLAT_RATE_ATTRIBUTE: &str = "9G";

/// Configuration parameters for price graph construction.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildConfig {
    /// Maximum number of quotes in flight at once.
    /// 1 quotes the pairs strictly one after another.
    pub concurrency: usize,

    /// Retry policy for transient and rate-limited quote failures.
    pub retry: RetryPolicy,

    /// Service attribute marking a segment as covered by the flat-rate pass.
    pub flat_rate_attribute: String,
}

impl BuildConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(concurrency: usize, retry: RetryPolicy, flat_rate_attribute: impl Into<String>) -> Self {
        Self {
            concurrency,
            retry,
            flat_rate_attribute: flat_rate_attribute.into(),
        }
    }

    /// Set the number of concurrent quotes.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Set the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set the flat-rate marker attribute.
    pub fn with_flat_rate_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.flat_rate_attribute = attribute.into();
        self
    }

    /// Effective concurrency (never zero).
    pub fn effective_concurrency(&self) -> usize {
        self.concurrency.max(1)
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            retry: RetryPolicy::default(),
            flat_rate_attribute: DEFAULT_FLAT_RATE_ATTRIBUTE.to_string(),
        }
    }
}
