//! Price quoting capability.
//!
//! The engine never talks to a fare provider directly. It is handed a
//! `PriceQuoter`, owned by the caller, which answers one question: what
//! does the cheapest offer from A to B departing at T cost for this
//! traveller? Provider failures come back classified so the graph builder
//! can decide between retrying and recording a missing edge.

mod rate_limit;
mod retry;

use std::collections::BTreeSet;
use std::future::Future;
use std::time::Duration;

use chrono::NaiveDateTime;

use crate::domain::{Price, StationId, TravellerConfig};

pub use rate_limit::RateLimiter;
pub use retry::RetryPolicy;

/// A single matched offer from the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteResult {
    /// Offer price as quoted (before any pass is applied)
    pub price: Price,
    /// ISO currency code of `price`
    pub currency: String,
    /// Departure of the train the offer is for
    pub matched_departure: NaiveDateTime,
    /// Provider service attribute codes across all sections of the offer
    pub service_attributes: BTreeSet<String>,
}

impl QuoteResult {
    /// Create a quote with no service attributes.
    pub fn new(price: Price, matched_departure: NaiveDateTime) -> Self {
        Self {
            price,
            currency: "EUR".to_string(),
            matched_departure,
            service_attributes: BTreeSet::new(),
        }
    }

    /// Add a service attribute code.
    pub fn with_attribute(mut self, code: impl Into<String>) -> Self {
        self.service_attributes.insert(code.into());
        self
    }

    /// Returns true if the offer carries the given attribute code.
    pub fn has_attribute(&self, code: &str) -> bool {
        self.service_attributes.contains(code)
    }
}

/// Classified quote failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuoteError {
    /// Network error, timeout or server-side failure; worth retrying
    #[error("transient quote failure: {0}")]
    Transient(String),

    /// Provider asked us to slow down
    #[error("rate limited by provider")]
    RateLimited {
        /// Provider's `Retry-After` hint, if it sent one
        retry_after: Option<Duration>,
    },

    /// Request rejected or no offer exists; retrying will not help
    #[error("no quote available: {0}")]
    Permanent(String),

    /// Response could not be decoded
    #[error("malformed quote response: {0}")]
    Malformed(String),
}

impl QuoteError {
    /// Returns true if a later attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            QuoteError::Transient(_) | QuoteError::RateLimited { .. }
        )
    }
}

/// Capability for pricing one origin/destination/departure triple.
///
/// Implementations own whatever session and rate-limiter state they need;
/// the graph builder invokes `quote` concurrently through a shared
/// reference, so that state must be safe for concurrent use.
pub trait PriceQuoter {
    /// Quote the cheapest offer from `origin` to `destination` departing at
    /// or after `departure`.
    fn quote(
        &self,
        origin: &StationId,
        destination: &StationId,
        departure: NaiveDateTime,
        traveller: &TravellerConfig,
    ) -> impl Future<Output = Result<QuoteResult, QuoteError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn t() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    #[test]
    fn retryable_classification() {
        assert!(QuoteError::Transient("timeout".into()).is_retryable());
        assert!(QuoteError::RateLimited { retry_after: None }.is_retryable());
        assert!(
            QuoteError::RateLimited {
                retry_after: Some(Duration::from_secs(2))
            }
            .is_retryable()
        );
        assert!(!QuoteError::Permanent("400".into()).is_retryable());
        assert!(!QuoteError::Malformed("eof".into()).is_retryable());
    }

    #[test]
    fn error_display() {
        assert_eq!(
            QuoteError::Permanent("no connection".into()).to_string(),
            "no quote available: no connection"
        );
        assert_eq!(
            QuoteError::RateLimited { retry_after: None }.to_string(),
            "rate limited by provider"
        );
    }

    #[test]
    fn quote_attributes() {
        let quote = QuoteResult::new(Price::from_cents(1500), t()).with_attribute("9G");
        assert!(quote.has_attribute("9G"));
        assert!(!quote.has_attribute("FR"));
        assert_eq!(quote.currency, "EUR");
    }
}
