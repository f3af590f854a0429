//! Domain types for the fare-combination engine.
//!
//! This module contains the value types the engine computes over. All
//! types enforce their invariants at construction time, so code that
//! receives these types can trust their validity.

mod error;
mod itinerary;
mod price;
mod segment;
mod station;
mod stop;
mod time;
mod traveller;

pub use error::DomainError;
pub use itinerary::{Itinerary, StopCall};
pub use price::{InvalidPrice, Price};
pub use segment::Segment;
pub use station::{InvalidStationId, StationId};
pub use stop::{Stop, StopIndex};
pub use time::{TIMESTAMP_FORMAT, TimeError, format_timestamp, parse_timestamp};
pub use traveller::{BahnCard, InvalidBahnCard, TravelClass, TravellerConfig};
