//! Booking links for ticket plans.
//!
//! Each leg of a plan that needs a ticket gets a bahn.de search deep link
//! which opens the booking flow on exactly the train the leg was priced
//! for, with the traveller's discount preselected.

use url::form_urlencoded::byte_serialize;

use crate::domain::{TravellerConfig, format_timestamp};
use crate::optimizer::{TicketLeg, TicketPlan};

/// Default booking search page.
pub const DEFAULT_BOOKING_URL: &str = "https://www.bahn.de/buchung/fahrplan/suche";

/// Passenger-type code for an adult in the `r` booking parameter.
const ADULT_PASSENGER_CODE: u8 = 13;

/// Query parameters of a booking deep link, in the order bahn.de emits them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingParams {
    /// Origin display name
    pub so: String,
    /// Destination display name
    pub zo: String,
    /// Origin station identifier
    pub soid: String,
    /// Destination station identifier
    pub zoid: String,
    /// Departure, `%Y-%m-%dT%H:%M:%S`
    pub hd: String,
    /// Whether the traveller holds the flat-rate pass
    pub dltv: bool,
    /// Discount code, `13:{25|50}:KLASSE_{1|2}:1`, when a BahnCard is set
    pub r: Option<String>,
}

impl BookingParams {
    /// Parameters for booking `leg` as `traveller`.
    pub fn for_leg(leg: &TicketLeg, traveller: &TravellerConfig) -> Self {
        let r = traveller.bahncard.map(|card| {
            format!(
                "{ADULT_PASSENGER_CODE}:{}:{}:1",
                card.discount(),
                card.class().code()
            )
        });
        Self {
            so: leg.origin_name.clone(),
            zo: leg.destination_name.clone(),
            soid: leg.origin_id.as_str().to_string(),
            zoid: leg.destination_id.as_str().to_string(),
            hd: format_timestamp(&leg.matched_departure),
            dltv: traveller.flat_rate_pass,
            r,
        }
    }

    /// The link fragment, percent-encoded.
    pub fn to_fragment(&self) -> String {
        let dltv = self.dltv.to_string();
        let mut pairs: Vec<(&str, &str)> = vec![
            ("sts", "true"),
            ("so", self.so.as_str()),
            ("zo", self.zo.as_str()),
            ("soid", self.soid.as_str()),
            ("zoid", self.zoid.as_str()),
            ("hd", self.hd.as_str()),
            ("dltv", dltv.as_str()),
        ];
        if let Some(r) = &self.r {
            pairs.push(("r", r.as_str()));
        }

        pairs
            .into_iter()
            .map(|(key, value)| format!("{key}={}", encode(value)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Percent-encode a fragment value, with spaces as `%20`.
fn encode(value: &str) -> String {
    // byte_serialize writes a literal '+' as %2B, so any '+' left is a space
    byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// A leg of a plan together with its booking link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookableTicket {
    /// The leg to book
    pub leg: TicketLeg,
    /// Deep link, absent for legs covered by the flat-rate pass
    pub link: Option<String>,
}

/// Turns ticket plans into booking links.
#[derive(Debug, Clone)]
pub struct TicketPlanFormatter {
    base_url: String,
}

impl TicketPlanFormatter {
    /// Create a formatter linking to the given search page.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Booking link for one leg, or `None` if no ticket is needed.
    pub fn link(&self, leg: &TicketLeg, traveller: &TravellerConfig) -> Option<String> {
        if !leg.needs_ticket() {
            return None;
        }
        let params = BookingParams::for_leg(leg, traveller);
        Some(format!("{}#{}", self.base_url, params.to_fragment()))
    }

    /// Every leg of the plan with its booking link.
    pub fn format(&self, plan: &TicketPlan, traveller: &TravellerConfig) -> Vec<BookableTicket> {
        plan.legs()
            .iter()
            .map(|leg| BookableTicket {
                leg: leg.clone(),
                link: self.link(leg, traveller),
            })
            .collect()
    }
}

impl Default for TicketPlanFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_BOOKING_URL)
    }
}
