//! Price graph over all stop pairs of an itinerary.
//!
//! The graph is an upper-triangular table: cell `(i, j)` with `i < j`
//! holds the `Segment` quoted for travelling from stop `i` to stop `j`, or
//! nothing when no offer was found. It is built once per itinerary by the
//! `PriceGraphBuilder` and then only read.

mod builder;
mod cancel;
mod config;


use std::collections::BTreeMap;

use crate::domain::{DomainError, Itinerary, Segment, Stop, StopIndex};

pub use builder::{BuildError, IgnoreProgress, PriceGraphBuilder, Progress, ProgressObserver};
pub use cancel::{CancelToken, DeadlineGuard};
pub use config::{BuildConfig, DEFAULT_FLAT_RATE_ATTRIBUTE};

/// Quoted segments for one itinerary, keyed by `(origin, destination)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceGraph {
    stops: Vec<Stop>,
    cells: BTreeMap<(StopIndex, StopIndex), Segment>,
    attempted: usize,
}

impl PriceGraph {
    /// Create an empty graph over the itinerary's stops.
    pub fn new(itinerary: &Itinerary) -> Self {
        Self {
            stops: itinerary.stops().to_vec(),
            cells: BTreeMap::new(),
            attempted: 0,
        }
    }

    /// Create a graph from already-priced segments.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a segment runs backwards or refers to a stop past
    /// the end of the itinerary.
    pub fn from_segments(
        itinerary: &Itinerary,
        segments: impl IntoIterator<Item = Segment>,
    ) -> Result<Self, DomainError> {
        let mut graph = Self::new(itinerary);
        for segment in segments {
            graph.insert(segment)?;
            graph.attempted += 1;
        }
        Ok(graph)
    }

    /// Store a segment in its cell, replacing any earlier one.
    pub(crate) fn insert(&mut self, segment: Segment) -> Result<(), DomainError> {
        if segment.origin >= segment.destination {
            return Err(DomainError::InvalidSegment {
                from: segment.origin,
                to: segment.destination,
            });
        }
        if segment.destination.0 >= self.stops.len() {
            return Err(DomainError::SegmentOutOfBounds(segment.destination));
        }
        self.cells
            .insert((segment.origin, segment.destination), segment);
        Ok(())
    }

    pub(crate) fn record_attempt(&mut self) {
        self.attempted += 1;
    }

    /// The segment from `from` to `to`, if one was quoted.
    pub fn get(&self, from: StopIndex, to: StopIndex) -> Option<&Segment> {
        self.cells.get(&(from, to))
    }

    /// The direct segment from the first to the last stop, if quoted.
    pub fn direct(&self) -> Option<&Segment> {
        self.get(StopIndex(0), self.last_index())
    }

    /// All quoted segments ending at `to`, in ascending origin order.
    pub fn incoming(&self, to: StopIndex) -> impl Iterator<Item = &Segment> {
        (0..to.0).filter_map(move |from| self.get(StopIndex(from), to))
    }

    /// The itinerary's stops.
    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    /// The stop at `index`, if any.
    pub fn stop(&self, index: StopIndex) -> Option<&Stop> {
        self.stops.get(index.0)
    }

    /// Number of stops.
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    /// Returns true if the graph has no stops.
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Index of the final stop.
    pub fn last_index(&self) -> StopIndex {
        StopIndex(self.stops.len().saturating_sub(1))
    }

    /// Number of quoted segments.
    pub fn edge_count(&self) -> usize {
        self.cells.len()
    }

    /// Number of cells a quote was attempted for.
    pub fn attempted(&self) -> usize {
        self.attempted
    }

    /// All quoted segments, ordered by origin then destination.
    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.cells.values()
    }
}
