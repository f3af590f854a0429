//! Stop types.
//!
//! A `Stop` is one station occurrence within an itinerary, with its
//! scheduled arrival and departure. A `StopIndex` is its position in the
//! itinerary and is what the price graph is indexed by.

use chrono::NaiveDateTime;

use super::StationId;

/// Position of a stop within an itinerary (0-based).
///
/// # Examples
///
/// ```
/// use fare_split::domain::StopIndex;
///
/// let idx = StopIndex(2);
/// assert_eq!(idx.next(), StopIndex(3));
/// assert_eq!(StopIndex(0).prev(), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StopIndex(pub usize);

impl StopIndex {
    /// Returns the next index.
    pub fn next(self) -> Self {
        StopIndex(self.0 + 1)
    }

    /// Returns the previous index, if any.
    pub fn prev(self) -> Option<Self> {
        self.0.checked_sub(1).map(StopIndex)
    }
}

impl std::fmt::Display for StopIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for StopIndex {
    fn from(value: usize) -> Self {
        StopIndex(value)
    }
}

impl From<StopIndex> for usize {
    fn from(value: StopIndex) -> Self {
        value.0
    }
}

/// A station stop within one itinerary.
///
/// # Time Semantics
///
/// - The first stop has a departure and no arrival
/// - The final stop has an arrival and no departure
/// - Intermediate stops normally have both
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stop {
    /// Position in the itinerary
    pub index: StopIndex,
    /// Provider station identifier
    pub id: StationId,
    /// Station display name
    pub name: String,
    /// Scheduled arrival
    pub arrival: Option<NaiveDateTime>,
    /// Scheduled departure
    pub departure: Option<NaiveDateTime>,
}

impl Stop {
    /// Creates a stop without times.
    pub fn new(index: StopIndex, id: StationId, name: impl Into<String>) -> Self {
        Self {
            index,
            id,
            name: name.into(),
            arrival: None,
            departure: None,
        }
    }

    /// Sets the arrival time.
    pub fn with_arrival(mut self, arrival: NaiveDateTime) -> Self {
        self.arrival = Some(arrival);
        self
    }

    /// Sets the departure time.
    pub fn with_departure(mut self, departure: NaiveDateTime) -> Self {
        self.departure = Some(departure);
        self
    }

    /// Earliest known time at this stop (arrival, else departure).
    pub fn earliest_time(&self) -> Option<NaiveDateTime> {
        self.arrival.or(self.departure)
    }

    /// Latest known time at this stop (departure, else arrival).
    pub fn latest_time(&self) -> Option<NaiveDateTime> {
        self.departure.or(self.arrival)
    }
}
