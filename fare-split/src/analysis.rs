//! End-to-end split-ticket analysis.
//!
//! Resolves a journey reference into an itinerary, prices every stop pair
//! and runs the optimizer over the result. Resolution and quoting are
//! capabilities handed in by the caller, so the analysis itself holds no
//! provider state.

use std::future::Future;

use tracing::info;

use crate::domain::{DomainError, Itinerary, Price, TravellerConfig};
use crate::graph::{BuildConfig, BuildError, CancelToken, PriceGraphBuilder, ProgressObserver};
use crate::link::JourneyRef;
use crate::optimizer::{OptimizeError, Optimization, optimize_against};
use crate::quote::PriceQuoter;

/// A journey as resolved by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedJourney {
    /// The stops of the journey
    pub itinerary: Itinerary,
    /// Price the provider showed for the whole journey, if any
    pub through_price: Option<Price>,
}

/// Error resolving a journey reference.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// Provider unreachable, overloaded or failing
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    /// Provider does not know the journey
    #[error("journey not found: {0}")]
    NotFound(String),

    /// Provider answered with something we could not read
    #[error("malformed provider response: {0}")]
    Malformed(String),

    /// The journey's stops do not form a valid itinerary
    #[error("invalid itinerary: {0}")]
    InvalidItinerary(#[from] DomainError),
}

/// Capability for turning a journey reference into an itinerary.
pub trait ItineraryResolver {
    /// Resolve `journey` for `traveller`.
    fn resolve(
        &self,
        journey: &JourneyRef,
        traveller: &TravellerConfig,
    ) -> impl Future<Output = Result<ResolvedJourney, ResolveError>> + Send;
}

/// Error from a split analysis.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SplitError {
    /// The journey could not be resolved
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// The direct journey could not be priced
    #[error("no price found for the direct journey")]
    NoBaselinePrice,

    /// The analysis was cancelled
    #[error("analysis was cancelled")]
    Cancelled,

    /// The optimizer produced an inconsistent plan
    #[error("invalid ticket plan: {0}")]
    InvalidPlan(DomainError),
}

impl From<BuildError> for SplitError {
    fn from(err: BuildError) -> Self {
        match err {
            BuildError::NoBaselinePrice => SplitError::NoBaselinePrice,
            BuildError::Cancelled => SplitError::Cancelled,
        }
    }
}

impl From<OptimizeError> for SplitError {
    fn from(err: OptimizeError) -> Self {
        match err {
            OptimizeError::NoBaselinePrice => SplitError::NoBaselinePrice,
            OptimizeError::InvalidPlan(e) => SplitError::InvalidPlan(e),
        }
    }
}

/// Result of a split analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitAnalysis {
    /// The analysed journey
    pub itinerary: Itinerary,
    /// Through price shown by the provider when resolving the journey
    pub through_price: Option<Price>,
    /// Cheapest ticket combination, measured against the cheaper of the
    /// direct quote and the through price
    pub optimization: Optimization,
    /// Number of stop pairs quoted
    pub pairs_quoted: usize,
    /// Number of stop pairs with a price
    pub pairs_priced: usize,
}

/// Runs split analyses against a resolver and a quoter.
pub struct SplitAnalyzer<'a, R: ItineraryResolver, Q: PriceQuoter> {
    resolver: &'a R,
    quoter: &'a Q,
    config: &'a BuildConfig,
}

impl<'a, R: ItineraryResolver, Q: PriceQuoter> SplitAnalyzer<'a, R, Q> {
    /// Create a new analyzer.
    pub fn new(resolver: &'a R, quoter: &'a Q, config: &'a BuildConfig) -> Self {
        Self {
            resolver,
            quoter,
            config,
        }
    }

    /// Resolve, price and optimize one journey.
    ///
    /// A split is only reported if it beats both the re-quoted direct
    /// segment and the through price shown for the resolved journey.
    pub async fn analyse<O: ProgressObserver + ?Sized>(
        &self,
        journey: &JourneyRef,
        traveller: &TravellerConfig,
        observer: &O,
        cancel: &CancelToken,
    ) -> Result<SplitAnalysis, SplitError> {
        let resolved = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(SplitError::Cancelled),
            resolved = self.resolver.resolve(journey, traveller) => resolved?,
        };

        let graph = PriceGraphBuilder::new(self.quoter, self.config)
            .build(&resolved.itinerary, traveller, observer, cancel)
            .await?;
        let optimization = optimize_against(&graph, resolved.through_price)?;

        info!(
            stops = resolved.itinerary.len(),
            current = %optimization.current_price(),
            optimal = %optimization.optimal_price(),
            split = optimization.is_split(),
            "Analysis complete"
        );

        Ok(SplitAnalysis {
            through_price: resolved.through_price,
            itinerary: resolved.itinerary,
            optimization,
            pairs_quoted: graph.attempted(),
            pairs_priced: graph.edge_count(),
        })
    }
}
