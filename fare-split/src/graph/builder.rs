//! Concurrent price graph construction.
//!
//! Every stop pair `(i, j)` with `i < j` whose origin has a departure time
//! is quoted once (plus retries). Quotes run on a bounded pool of in-flight
//! futures; the single loop consuming their results is the only writer to
//! the graph, so each cell is written exactly once.

use chrono::NaiveDateTime;
use futures::stream::{self, StreamExt};
use tracing::{debug, trace, warn};

use crate::domain::{Itinerary, Price, Segment, Stop, TravellerConfig};
use crate::quote::{PriceQuoter, QuoteResult};

use super::PriceGraph;
use super::cancel::CancelToken;
use super::config::BuildConfig;

/// Error from price graph construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// The direct first-to-last segment could not be priced
    #[error("no price found for the direct journey")]
    NoBaselinePrice,

    /// The build was cancelled before it completed
    #[error("price graph build was cancelled")]
    Cancelled,
}

/// Build progress, reported after each cell resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Cells resolved so far (present or absent)
    pub processed: usize,
    /// Cells that will be quoted in total
    pub total: usize,
}

/// Receives build progress.
pub trait ProgressObserver {
    /// Called once per resolved cell, with `processed` strictly increasing.
    fn on_progress(&self, progress: Progress);
}

impl<F: Fn(Progress)> ProgressObserver for F {
    fn on_progress(&self, progress: Progress) {
        self(progress)
    }
}

/// Observer that discards progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct IgnoreProgress;

impl ProgressObserver for IgnoreProgress {
    fn on_progress(&self, _progress: Progress) {}
}

/// Builds a `PriceGraph` by quoting every feasible stop pair.
pub struct PriceGraphBuilder<'a, Q: PriceQuoter> {
    quoter: &'a Q,
    config: &'a BuildConfig,
}

impl<'a, Q: PriceQuoter> PriceGraphBuilder<'a, Q> {
    /// Create a new builder.
    pub fn new(quoter: &'a Q, config: &'a BuildConfig) -> Self {
        Self { quoter, config }
    }

    /// Quote every pair of the itinerary and assemble the graph.
    ///
    /// Per-cell failures become absent cells. Only a missing direct price
    /// or cancellation fail the build.
    pub async fn build<O: ProgressObserver + ?Sized>(
        &self,
        itinerary: &Itinerary,
        traveller: &TravellerConfig,
        observer: &O,
        cancel: &CancelToken,
    ) -> Result<PriceGraph, BuildError> {
        let pairs = feasible_pairs(itinerary);
        let total = pairs.len();
        debug!(
            stops = itinerary.len(),
            pairs = total,
            concurrency = self.config.effective_concurrency(),
            "Building price graph"
        );

        let stops = itinerary.stops();
        let mut quotes = stream::iter(pairs)
            .map(|(i, j, departure)| async move {
                let quote = self
                    .quote_cell(&stops[i], &stops[j], departure, traveller)
                    .await;
                (i, j, quote)
            })
            .buffer_unordered(self.config.effective_concurrency());

        let mut graph = PriceGraph::new(itinerary);
        let mut processed = 0;

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(processed, total, "Price graph build cancelled");
                    return Err(BuildError::Cancelled);
                }
                next = quotes.next() => next,
            };
            let Some((i, j, quote)) = next else {
                break;
            };
            let (from, to) = (&stops[i], &stops[j]);

            graph.record_attempt();
            if let Some(quote) = quote {
                let segment = self.to_segment(from, to, quote, traveller);
                if let Err(e) = segment.and_then(|s| graph.insert(s)) {
                    warn!(from = %from.index, to = %to.index, error = %e, "Discarding invalid segment");
                }
            }

            processed += 1;
            observer.on_progress(Progress { processed, total });
        }

        if graph.direct().is_none() {
            debug!(
                origin = %itinerary.origin().id,
                destination = %itinerary.destination().id,
                "Direct segment could not be priced"
            );
            return Err(BuildError::NoBaselinePrice);
        }

        debug!(
            edges = graph.edge_count(),
            attempted = graph.attempted(),
            "Price graph built"
        );
        Ok(graph)
    }

    /// Quote one cell, retrying transient failures. `None` means absent.
    async fn quote_cell(
        &self,
        from: &Stop,
        to: &Stop,
        departure: NaiveDateTime,
        traveller: &TravellerConfig,
    ) -> Option<QuoteResult> {
        let policy = &self.config.retry;
        let mut attempts: u32 = 0;

        loop {
            let result = self
                .quoter
                .quote(&from.id, &to.id, departure, traveller)
                .await;
            attempts += 1;

            let err = match result {
                Ok(quote) => {
                    trace!(from = %from.id, to = %to.id, price = %quote.price, "Quoted");
                    return Some(quote);
                }
                Err(e) => e,
            };

            if !policy.should_retry(&err, attempts) {
                if err.is_retryable() {
                    warn!(from = %from.id, to = %to.id, attempts, error = %err, "Giving up on segment");
                } else {
                    debug!(from = %from.id, to = %to.id, error = %err, "No price for segment");
                }
                return None;
            }

            let delay = policy.delay_for(&err, attempts - 1);
            debug!(
                from = %from.id,
                to = %to.id,
                attempt = attempts,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "Retrying quote"
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// Turn a quote into a segment, applying the flat-rate pass.
    fn to_segment(
        &self,
        from: &Stop,
        to: &Stop,
        quote: QuoteResult,
        traveller: &TravellerConfig,
    ) -> Result<Segment, crate::domain::DomainError> {
        let subsidized =
            traveller.flat_rate_pass && quote.has_attribute(&self.config.flat_rate_attribute);
        let price = if subsidized { Price::ZERO } else { quote.price };
        if subsidized {
            trace!(from = %from.id, to = %to.id, raw = %quote.price, "Covered by flat-rate pass");
        }
        Segment::between(from, to, price, subsidized, quote.matched_departure)
    }
}

/// All `(from, to, departure)` position triples worth quoting, in
/// row-major order.
fn feasible_pairs(itinerary: &Itinerary) -> Vec<(usize, usize, NaiveDateTime)> {
    let n = itinerary.len();
    itinerary
        .stops()
        .iter()
        .enumerate()
        .filter_map(|(i, from)| from.departure.map(|dep| (i, dep)))
        .flat_map(|(i, dep)| (i + 1..n).map(move |j| (i, j, dep)))
        .collect()
}
