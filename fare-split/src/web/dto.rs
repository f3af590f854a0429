//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::analysis::SplitAnalysis;
use crate::booking::{BookableTicket, TicketPlanFormatter};
use crate::domain::{Stop, TravellerConfig, format_timestamp};

/// Request to analyse a journey for a cheaper ticket split.
#[derive(Debug, Deserialize)]
pub struct SplitRequest {
    /// bahn.de share link, short (`vbid`) or long form
    pub link: String,

    /// BahnCard token such as `BC25_2`
    pub bahncard: Option<String>,

    /// Whether the traveller holds the Deutschland-Ticket
    #[serde(default)]
    pub flat_rate_pass: bool,
}

/// Whether splitting the ticket saves money.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// A cheaper combination of tickets exists
    Split,
    /// The through ticket is already the cheapest
    NoImprovement,
}

/// Result of a split analysis.
#[derive(Debug, Serialize)]
pub struct SplitResponse {
    /// Split or not
    pub outcome: Outcome,

    /// Price the split is measured against in euros: the cheaper of the
    /// re-quoted direct ticket and the listed price
    pub through_price: f64,

    /// Through price bahn.de listed for the shared journey, in euros
    pub listed_price: Option<f64>,

    /// Price of the cheapest combination in euros
    pub split_price: f64,

    /// Difference between the two in euros
    pub savings: f64,

    /// Number of stop pairs that were quoted
    pub pairs_quoted: usize,

    /// Number of stop pairs that had a price
    pub pairs_priced: usize,

    /// Stops of the journey
    pub stops: Vec<StopResult>,

    /// Tickets to buy; empty when there is no improvement
    pub tickets: Vec<TicketResult>,
}

/// A stop of the analysed journey.
#[derive(Debug, Serialize)]
pub struct StopResult {
    /// Position on the journey
    pub index: usize,

    /// Provider station identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// Arrival time
    pub arrival: Option<String>,

    /// Departure time
    pub departure: Option<String>,
}

/// A ticket of a split plan.
#[derive(Debug, Serialize)]
pub struct TicketResult {
    /// Origin stop position
    pub origin: usize,

    /// Destination stop position
    pub destination: usize,

    /// Origin station identifier
    pub origin_id: String,

    /// Destination station identifier
    pub destination_id: String,

    /// Origin name
    pub origin_name: String,

    /// Destination name
    pub destination_name: String,

    /// Departure of the train this ticket was priced for
    pub departure: String,

    /// Ticket price in euros
    pub price: f64,

    /// Whether the leg is covered by the flat-rate pass
    pub is_subsidized: bool,

    /// bahn.de booking link, absent for covered legs
    pub booking_link: Option<String>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

// Conversion implementations

impl SplitResponse {
    /// Create from an analysis, with booking links for every ticket.
    pub fn from_analysis(
        analysis: &SplitAnalysis,
        formatter: &TicketPlanFormatter,
        traveller: &TravellerConfig,
    ) -> Self {
        let optimization = &analysis.optimization;
        let (outcome, tickets) = match optimization.plan() {
            Some(plan) => (
                Outcome::Split,
                formatter
                    .format(plan, traveller)
                    .iter()
                    .map(TicketResult::from_ticket)
                    .collect(),
            ),
            None => (Outcome::NoImprovement, Vec::new()),
        };

        Self {
            outcome,
            through_price: optimization.current_price().as_euros(),
            listed_price: analysis.through_price.map(|p| p.as_euros()),
            split_price: optimization.optimal_price().as_euros(),
            savings: optimization.savings().as_euros(),
            pairs_quoted: analysis.pairs_quoted,
            pairs_priced: analysis.pairs_priced,
            stops: analysis
                .itinerary
                .stops()
                .iter()
                .map(StopResult::from_stop)
                .collect(),
            tickets,
        }
    }
}

impl StopResult {
    /// Create from a domain Stop.
    pub fn from_stop(stop: &Stop) -> Self {
        Self {
            index: stop.index.0,
            id: stop.id.as_str().to_string(),
            name: stop.name.clone(),
            arrival: stop.arrival.as_ref().map(format_timestamp),
            departure: stop.departure.as_ref().map(format_timestamp),
        }
    }
}

impl TicketResult {
    /// Create from a ticket with its booking link.
    pub fn from_ticket(ticket: &BookableTicket) -> Self {
        let leg = &ticket.leg;
        Self {
            origin: leg.origin.0,
            destination: leg.destination.0,
            origin_id: leg.origin_id.as_str().to_string(),
            destination_id: leg.destination_id.as_str().to_string(),
            origin_name: leg.origin_name.clone(),
            destination_name: leg.destination_name.clone(),
            departure: format_timestamp(&leg.matched_departure),
            price: leg.price.as_euros(),
            is_subsidized: leg.is_subsidized,
            booking_link: ticket.link.clone(),
        }
    }
}
