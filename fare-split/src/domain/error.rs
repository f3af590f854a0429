//! Domain error types.
//!
//! These errors represent validation failures in the domain layer. They are
//! distinct from provider/IO errors.

use super::StopIndex;

/// Domain-level errors for validation and data consistency.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Itinerary has fewer than two stops
    #[error("itinerary needs at least 2 stops, got {0}")]
    TooFewStops(usize),

    /// Stop index does not match its position
    #[error("stop at position {position} has index {index}")]
    MisplacedStop { position: usize, index: StopIndex },

    /// The first stop has no departure time
    #[error("first stop has no departure time")]
    MissingOriginDeparture,

    /// A stop's own times are reversed
    #[error("stop {0} departs before it arrives")]
    DepartsBeforeArrival(StopIndex),

    /// Times go backwards between consecutive stops
    #[error("stop {0} is earlier than the stop before it")]
    NonMonotonicTimes(StopIndex),

    /// Segment does not go forward along the itinerary
    #[error("invalid segment {from} -> {to}")]
    InvalidSegment { from: StopIndex, to: StopIndex },

    /// Segment refers to a stop beyond the end of the itinerary
    #[error("segment stop {0} is out of bounds")]
    SegmentOutOfBounds(StopIndex),

    /// Ticket plan has no legs
    #[error("ticket plan has no legs")]
    EmptyPlan,

    /// Consecutive ticket legs do not meet at the same stop
    #[error("leg ending at stop {end} is followed by a leg starting at stop {start}")]
    DisconnectedLegs { end: StopIndex, start: StopIndex },
}
