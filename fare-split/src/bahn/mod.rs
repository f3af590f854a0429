//! bahn.de fare provider.
//!
//! This module provides an HTTP client for the web API behind bahn.de,
//! which serves both timetable searches with offer prices and stored
//! connections referenced by shared links.
//!
//! Key characteristics of the API:
//! - Times are local ISO date-times without an offset
//! - Station identifiers are long opaque strings (`A=1@O=...@L=8011160@`)
//! - Short links carry a `vbid` that must be exchanged for a recon context
//!   before the connection can be fetched
//! - Trains covered by the Deutschland-Ticket carry the `9G` attribute

mod client;
mod convert;
mod error;
mod types;

pub use client::{BahnClient, BahnConfig, DEFAULT_BASE_URL};
pub use convert::{ConversionError, convert_journey, convert_quote};
pub use error::BahnError;
pub use types::{
    Connection, Halt, OfferPrice, Section, StoredConnection, TimetableResponse, TrainAttribute,
    Traveller, Vehicle,
};
