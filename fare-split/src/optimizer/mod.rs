//! Cheapest ticket combination over a price graph.
//!
//! The price graph is a DAG whose topological order is the stop order, so
//! the cheapest way from the first stop to the last is a single forward
//! pass: for each stop `k`, try every quoted segment `(j, k)` on top of the
//! cheapest way to reach `j`. Parent pointers are a plain index array.

mod plan;


use tracing::debug;

use crate::domain::{DomainError, Price, StopIndex};
use crate::graph::PriceGraph;

pub use plan::{Optimization, TicketLeg, TicketPlan};

/// Error from fare optimization.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OptimizeError {
    /// The graph has no direct first-to-last segment to compare against
    #[error("no price for the direct journey")]
    NoBaselinePrice,

    /// The cheapest path could not be turned into a ticket plan
    #[error("invalid ticket plan: {0}")]
    InvalidPlan(#[from] DomainError),
}

/// Find the cheapest ticket combination.
///
/// Returns `Optimization::Split` only if the cheapest combination is
/// strictly cheaper than the direct ticket. Among equally cheap
/// combinations, the one whose final legs start at the lowest stop
/// positions wins.
pub fn optimize(graph: &PriceGraph) -> Result<Optimization, OptimizeError> {
    optimize_against(graph, None)
}

/// Find the cheapest ticket combination, measured against the cheaper of
/// the direct segment and `listed_price`.
///
/// `listed_price` is the through price the provider showed for the journey
/// itself, which may be lower than the re-quoted direct segment when the
/// quote matched a different train.
pub fn optimize_against(
    graph: &PriceGraph,
    listed_price: Option<Price>,
) -> Result<Optimization, OptimizeError> {
    let direct = graph
        .direct()
        .ok_or(OptimizeError::NoBaselinePrice)?
        .price;
    let baseline = listed_price.map_or(direct, |listed| listed.min(direct));

    let n = graph.len();
    if n <= 2 {
        return Ok(Optimization::NoImprovement { baseline });
    }

    let mut best: Vec<Option<Price>> = vec![None; n];
    let mut predecessor: Vec<Option<usize>> = vec![None; n];
    best[0] = Some(Price::ZERO);

    for k in 1..n {
        for j in 0..k {
            let Some(reach) = best[j] else {
                continue;
            };
            let Some(segment) = graph.get(StopIndex(j), StopIndex(k)) else {
                continue;
            };
            let cost = reach + segment.price;
            // Strict comparison keeps the first minimum found
            if best[k].is_none_or(|current| cost < current) {
                best[k] = Some(cost);
                predecessor[k] = Some(j);
            }
        }
    }

    let optimal = best[n - 1].unwrap_or(baseline);
    if optimal >= baseline {
        debug!(%baseline, "Through ticket is already cheapest");
        return Ok(Optimization::NoImprovement { baseline });
    }

    let mut path: Vec<usize> =
        std::iter::successors(Some(n - 1), |&k| predecessor[k]).collect();
    path.reverse();

    let legs = path
        .windows(2)
        .filter_map(|hop| {
            let (from, to) = (StopIndex(hop[0]), StopIndex(hop[1]));
            let segment = graph.get(from, to)?;
            Some(TicketLeg::new(segment, graph.stop(from)?, graph.stop(to)?))
        })
        .collect();

    let plan = TicketPlan::new(legs, baseline)?;
    debug!(
        tickets = plan.len(),
        total = %plan.total_price(),
        %baseline,
        "Found cheaper split"
    );
    Ok(Optimization::Split(plan))
}
