//! Itinerary types.
//!
//! An `Itinerary` is the ordered sequence of stops of one resolved through
//! journey. It is the input to price graph construction.

use chrono::NaiveDateTime;

use super::{DomainError, StationId, Stop, StopIndex};

/// A station call as reported by the provider, before indices are assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopCall {
    /// Provider station identifier
    pub id: StationId,
    /// Station display name
    pub name: String,
    /// Scheduled arrival
    pub arrival: Option<NaiveDateTime>,
    /// Scheduled departure
    pub departure: Option<NaiveDateTime>,
}

impl StopCall {
    /// Creates a call.
    pub fn new(
        id: StationId,
        name: impl Into<String>,
        arrival: Option<NaiveDateTime>,
        departure: Option<NaiveDateTime>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            arrival,
            departure,
        }
    }
}

/// An ordered, validated sequence of stops.
///
/// # Invariants
///
/// - At least two stops
/// - `stops[k].index == StopIndex(k)`
/// - The first stop has a departure time
/// - Times never go backwards, within a stop or between consecutive stops
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Itinerary {
    stops: Vec<Stop>,
}

impl Itinerary {
    /// Constructs an itinerary from stops, checking the invariants.
    pub fn new(stops: Vec<Stop>) -> Result<Self, DomainError> {
        if stops.len() < 2 {
            return Err(DomainError::TooFewStops(stops.len()));
        }

        for (position, stop) in stops.iter().enumerate() {
            if stop.index != StopIndex(position) {
                return Err(DomainError::MisplacedStop {
                    position,
                    index: stop.index,
                });
            }
            if let (Some(arr), Some(dep)) = (stop.arrival, stop.departure) {
                if dep < arr {
                    return Err(DomainError::DepartsBeforeArrival(stop.index));
                }
            }
        }

        if stops[0].departure.is_none() {
            return Err(DomainError::MissingOriginDeparture);
        }

        // Stops without any time are skipped over rather than breaking the chain
        let mut last_known: Option<NaiveDateTime> = None;
        for stop in &stops {
            if let (Some(prev), Some(earliest)) = (last_known, stop.earliest_time()) {
                if earliest < prev {
                    return Err(DomainError::NonMonotonicTimes(stop.index));
                }
            }
            if let Some(latest) = stop.latest_time() {
                last_known = Some(latest);
            }
        }

        Ok(Itinerary { stops })
    }

    /// Builds an itinerary from the provider's ordered calls.
    ///
    /// A station reported twice in a row (the end of one train section and
    /// the start of the next) becomes a single stop that keeps the first
    /// arrival and the later departure. The final stop never has a
    /// departure, since nothing can be booked from it.
    ///
    /// # Examples
    ///
    /// ```
    /// use fare_split::domain::{Itinerary, StationId, StopCall, parse_timestamp};
    ///
    /// let t = |s| Some(parse_timestamp(s).unwrap());
    /// let id = |s| StationId::parse(s).unwrap();
    ///
    /// let itinerary = Itinerary::from_calls(vec![
    ///     StopCall::new(id("A"), "Alpha", None, t("2024-05-01T08:00")),
    ///     StopCall::new(id("B"), "Beta", t("2024-05-01T09:00"), None),
    ///     StopCall::new(id("B"), "Beta", None, t("2024-05-01T09:10")),
    ///     StopCall::new(id("C"), "Gamma", t("2024-05-01T10:00"), None),
    /// ])
    /// .unwrap();
    ///
    /// assert_eq!(itinerary.len(), 3);
    /// assert_eq!(itinerary.stops()[1].departure, t("2024-05-01T09:10"));
    /// ```
    pub fn from_calls(calls: impl IntoIterator<Item = StopCall>) -> Result<Self, DomainError> {
        let mut stops: Vec<Stop> = Vec::new();

        for call in calls {
            if let Some(last) = stops.last_mut() {
                if last.id == call.id {
                    if last.arrival.is_none() {
                        last.arrival = call.arrival;
                    }
                    if call.departure.is_some() {
                        last.departure = call.departure;
                    }
                    continue;
                }
            }

            stops.push(Stop {
                index: StopIndex(stops.len()),
                id: call.id,
                name: call.name,
                arrival: call.arrival,
                departure: call.departure,
            });
        }

        if let Some(last) = stops.last_mut() {
            last.departure = None;
        }

        Self::new(stops)
    }

    /// Returns the stops in order.
    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    /// Returns the stop at `index`, if any.
    pub fn stop(&self, index: StopIndex) -> Option<&Stop> {
        self.stops.get(index.0)
    }

    /// Number of stops (always at least 2).
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// The first stop.
    pub fn origin(&self) -> &Stop {
        &self.stops[0]
    }

    /// The final stop.
    pub fn destination(&self) -> &Stop {
        &self.stops[self.stops.len() - 1]
    }

    /// Index of the final stop.
    pub fn last_index(&self) -> StopIndex {
        StopIndex(self.stops.len() - 1)
    }

    /// Number of candidate segments (`N * (N - 1) / 2`).
    pub fn pair_count(&self) -> usize {
        let n = self.stops.len();
        n * (n - 1) / 2
    }

    /// Consumes the itinerary, returning its stops.
    pub fn into_stops(self) -> Vec<Stop> {
        self.stops
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn t(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn id(s: &str) -> StationId {
        StationId::parse(s).unwrap()
    }

    fn stop(index: usize, name: &str) -> Stop {
        Stop::new(StopIndex(index), id(name), name)
    }

    #[test]
    fn valid_itinerary() {
        let itinerary = Itinerary::new(vec![
            stop(0, "A").with_departure(t(8, 0)),
            stop(1, "B").with_arrival(t(9, 0)).with_departure(t(9, 2)),
            stop(2, "C").with_arrival(t(10, 0)),
        ])
        .unwrap();

        assert_eq!(itinerary.len(), 3);
        assert_eq!(itinerary.origin().name, "A");
        assert_eq!(itinerary.destination().name, "C");
        assert_eq!(itinerary.last_index(), StopIndex(2));
        assert_eq!(itinerary.pair_count(), 3);
        assert_eq!(itinerary.stop(StopIndex(1)).unwrap().name, "B");
        assert!(itinerary.stop(StopIndex(3)).is_none());
    }

    #[test]
    fn reject_too_few_stops() {
        assert_eq!(
            Itinerary::new(vec![]).unwrap_err(),
            DomainError::TooFewStops(0)
        );
        assert_eq!(
            Itinerary::new(vec![stop(0, "A").with_departure(t(8, 0))]).unwrap_err(),
            DomainError::TooFewStops(1)
        );
    }

    #[test]
    fn reject_misplaced_index() {
        let err = Itinerary::new(vec![
            stop(0, "A").with_departure(t(8, 0)),
            stop(2, "B").with_arrival(t(9, 0)),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            DomainError::MisplacedStop {
                position: 1,
                index: StopIndex(2)
            }
        );
    }

    #[test]
    fn reject_missing_origin_departure() {
        let err = Itinerary::new(vec![stop(0, "A"), stop(1, "B").with_arrival(t(9, 0))])
            .unwrap_err();
        assert_eq!(err, DomainError::MissingOriginDeparture);
    }

    #[test]
    fn reject_reversed_stop_times() {
        let err = Itinerary::new(vec![
            stop(0, "A").with_departure(t(8, 0)),
            stop(1, "B").with_arrival(t(9, 5)).with_departure(t(9, 0)),
            stop(2, "C").with_arrival(t(10, 0)),
        ])
        .unwrap_err();
        assert_eq!(err, DomainError::DepartsBeforeArrival(StopIndex(1)));
    }

    #[test]
    fn reject_backwards_between_stops() {
        let err = Itinerary::new(vec![
            stop(0, "A").with_departure(t(8, 0)),
            stop(1, "B").with_arrival(t(7, 0)),
        ])
        .unwrap_err();
        assert_eq!(err, DomainError::NonMonotonicTimes(StopIndex(1)));
    }

    #[test]
    fn untimed_intermediate_stop_is_allowed() {
        let itinerary = Itinerary::new(vec![
            stop(0, "A").with_departure(t(8, 0)),
            stop(1, "B"),
            stop(2, "C").with_arrival(t(10, 0)),
        ])
        .unwrap();
        assert_eq!(itinerary.len(), 3);
    }

    #[test]
    fn untimed_stop_does_not_hide_backwards_times() {
        let err = Itinerary::new(vec![
            stop(0, "A").with_departure(t(8, 0)),
            stop(1, "B"),
            stop(2, "C").with_arrival(t(7, 30)),
        ])
        .unwrap_err();
        assert_eq!(err, DomainError::NonMonotonicTimes(StopIndex(2)));
    }

    #[test]
    fn from_calls_merges_change_station() {
        let itinerary = Itinerary::from_calls(vec![
            StopCall::new(id("A"), "A", None, Some(t(8, 0))),
            StopCall::new(id("B"), "B", Some(t(9, 0)), Some(t(9, 1))),
            StopCall::new(id("C"), "C", Some(t(9, 30)), None),
            StopCall::new(id("C"), "C", None, Some(t(9, 45))),
            StopCall::new(id("D"), "D", Some(t(10, 30)), None),
        ])
        .unwrap();

        let stops = itinerary.stops();
        assert_eq!(stops.len(), 4);
        assert_eq!(stops[2].id, id("C"));
        assert_eq!(stops[2].arrival, Some(t(9, 30)));
        assert_eq!(stops[2].departure, Some(t(9, 45)));
        for (k, s) in stops.iter().enumerate() {
            assert_eq!(s.index, StopIndex(k));
        }
    }

    #[test]
    fn from_calls_clears_final_departure() {
        let itinerary = Itinerary::from_calls(vec![
            StopCall::new(id("A"), "A", None, Some(t(8, 0))),
            StopCall::new(id("B"), "B", Some(t(9, 0)), Some(t(9, 0))),
        ])
        .unwrap();
        assert_eq!(itinerary.destination().departure, None);
        assert_eq!(itinerary.destination().arrival, Some(t(9, 0)));
    }

    #[test]
    fn from_calls_keeps_non_adjacent_repeats() {
        let itinerary = Itinerary::from_calls(vec![
            StopCall::new(id("A"), "A", None, Some(t(8, 0))),
            StopCall::new(id("B"), "B", Some(t(8, 30)), Some(t(8, 31))),
            StopCall::new(id("A"), "A", Some(t(9, 0)), None),
        ])
        .unwrap();
        assert_eq!(itinerary.len(), 3);
    }

    #[test]
    fn from_calls_single_station_is_too_short() {
        let err = Itinerary::from_calls(vec![
            StopCall::new(id("A"), "A", None, Some(t(8, 0))),
            StopCall::new(id("A"), "A", Some(t(8, 5)), None),
        ])
        .unwrap_err();
        assert_eq!(err, DomainError::TooFewStops(1));
    }
}
