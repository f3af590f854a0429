//! Priced segment types.

use chrono::NaiveDateTime;

use super::{DomainError, Price, StationId, Stop, StopIndex};

/// A priced candidate sub-journey between two stops of an itinerary.
///
/// Produced once per resolved price graph cell and never mutated. A cell
/// for which no offer was found has no `Segment` at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Origin stop position
    pub origin: StopIndex,
    /// Destination stop position
    pub destination: StopIndex,
    /// Origin station identifier
    pub origin_id: StationId,
    /// Destination station identifier
    pub destination_id: StationId,
    /// Effective price (zero when covered by a flat-rate pass)
    pub price: Price,
    /// Whether a flat-rate pass covers this segment
    pub is_subsidized: bool,
    /// Departure of the train the provider matched for this segment
    pub departure: NaiveDateTime,
}

impl Segment {
    /// Creates a segment between two stops.
    ///
    /// # Errors
    ///
    /// Returns `Err` unless `from` comes strictly before `to`.
    pub fn between(
        from: &Stop,
        to: &Stop,
        price: Price,
        is_subsidized: bool,
        departure: NaiveDateTime,
    ) -> Result<Self, DomainError> {
        if from.index >= to.index {
            return Err(DomainError::InvalidSegment {
                from: from.index,
                to: to.index,
            });
        }

        Ok(Self {
            origin: from.index,
            destination: to.index,
            origin_id: from.id.clone(),
            destination_id: to.id.clone(),
            price,
            is_subsidized,
            departure,
        })
    }

    /// Number of itinerary hops this segment covers.
    pub fn span(&self) -> usize {
        self.destination.0 - self.origin.0
    }
}
