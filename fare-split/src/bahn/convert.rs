//! Conversion from bahn.de DTOs to domain types.
//!
//! Only the first connection of a response is used; the API returns the
//! best match for the requested departure first. Conversion fails fast on
//! anything the engine cannot work with instead of passing gaps along.

use std::collections::BTreeSet;

use crate::analysis::ResolvedJourney;
use crate::domain::{
    DomainError, InvalidPrice, Itinerary, Price, StationId, StopCall, TimeError, parse_timestamp,
};
use crate::quote::QuoteResult;

use super::types::{Connection, Halt, TimetableResponse};

/// Error during DTO to domain conversion.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConversionError {
    /// The response contains no connection
    #[error("no connection found")]
    NoConnection,

    /// The connection has no bookable offer
    #[error("connection has no price")]
    NoPrice,

    /// The offer price is not a valid amount
    #[error("invalid price: {0}")]
    InvalidPrice(#[from] InvalidPrice),

    /// No call in the connection has a departure time
    #[error("connection has no departure time")]
    MissingDeparture,

    /// A timestamp could not be parsed
    #[error("invalid time: {0}")]
    InvalidTime(#[from] TimeError),

    /// A call has an empty station identifier
    #[error("call at {0:?} has an empty station id")]
    InvalidStation(String),

    /// The calls do not form a valid itinerary
    #[error("invalid itinerary: {0}")]
    Itinerary(#[from] DomainError),
}

impl ConversionError {
    /// Returns true if the provider simply had no offer, as opposed to
    /// returning data we could not understand.
    pub fn is_missing_offer(&self) -> bool {
        matches!(self, ConversionError::NoConnection | ConversionError::NoPrice)
    }
}

fn first_connection(response: &TimetableResponse) -> Result<&Connection, ConversionError> {
    response
        .verbindungen
        .first()
        .ok_or(ConversionError::NoConnection)
}

/// Convert a timetable response into a price quote.
///
/// The matched departure is the first departure time found in section
/// order; the service attributes are collected from every section.
pub fn convert_quote(response: &TimetableResponse) -> Result<QuoteResult, ConversionError> {
    let connection = first_connection(response)?;
    let offer = connection
        .angebots_preis
        .as_ref()
        .ok_or(ConversionError::NoPrice)?;
    let price = Price::from_euros(offer.betrag)?;

    let departure = connection
        .verbindungs_abschnitte
        .iter()
        .flat_map(|section| section.halte.iter())
        .find_map(|halt| halt.abfahrts_zeitpunkt.as_deref())
        .ok_or(ConversionError::MissingDeparture)?;
    let matched_departure = parse_timestamp(departure)?;

    let service_attributes: BTreeSet<String> = connection
        .verbindungs_abschnitte
        .iter()
        .filter_map(|section| section.verkehrsmittel.as_ref())
        .flat_map(|vehicle| vehicle.zugattribute.iter())
        .map(|attribute| attribute.key.clone())
        .collect();

    Ok(QuoteResult {
        price,
        currency: offer.waehrung.clone().unwrap_or_else(|| "EUR".to_string()),
        matched_departure,
        service_attributes,
    })
}

/// Convert a timetable response into the itinerary of its first connection.
///
/// Walking sections are skipped. The through price is reported when the
/// connection carries one.
pub fn convert_journey(response: &TimetableResponse) -> Result<ResolvedJourney, ConversionError> {
    let connection = first_connection(response)?;

    let calls = connection
        .verbindungs_abschnitte
        .iter()
        .filter(|section| !section.is_walk())
        .flat_map(|section| section.halte.iter())
        .map(convert_halt)
        .collect::<Result<Vec<_>, _>>()?;

    let itinerary = Itinerary::from_calls(calls)?;
    let through_price = connection
        .angebots_preis
        .as_ref()
        .map(|offer| Price::from_euros(offer.betrag))
        .transpose()?;

    Ok(ResolvedJourney {
        itinerary,
        through_price,
    })
}

fn convert_halt(halt: &Halt) -> Result<StopCall, ConversionError> {
    let id =
        StationId::parse(&halt.id).map_err(|_| ConversionError::InvalidStation(halt.id.clone()))?;
    let name = halt
        .name
        .clone()
        .unwrap_or_else(|| halt.id.clone());
    let arrival = halt
        .ankunfts_zeitpunkt
        .as_deref()
        .map(parse_timestamp)
        .transpose()?;
    let departure = halt
        .abfahrts_zeitpunkt
        .as_deref()
        .map(parse_timestamp)
        .transpose()?;

    Ok(StopCall::new(id, name, arrival, departure))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StopIndex;

    fn response(json: &str) -> TimetableResponse {
        serde_json::from_str(json).unwrap()
    }

    const TWO_TRAINS: &str = r#"{
        "verbindungen": [{
            "angebotsPreis": {"betrag": 59.99, "waehrung": "EUR"},
            "verbindungsAbschnitte": [
                {
                    "verkehrsmittel": {"typ": "PUBLICTRANSPORT", "zugattribute": [{"key": "BR"}]},
                    "halte": [
                        {"id": "A", "name": "Alpha", "abfahrtsZeitpunkt": "2024-05-01T08:00:00"},
                        {"id": "B", "name": "Beta", "ankunftsZeitpunkt": "2024-05-01T08:40:00", "abfahrtsZeitpunkt": "2024-05-01T08:42:00"},
                        {"id": "C", "name": "Gamma", "ankunftsZeitpunkt": "2024-05-01T09:10:00"}
                    ]
                },
                {"verkehrsmittel": {"typ": "WALK"}, "halte": [
                    {"id": "C", "name": "Gamma"},
                    {"id": "C2", "name": "Gamma Bus"}
                ]},
                {
                    "verkehrsmittel": {"typ": "PUBLICTRANSPORT", "zugattribute": [{"key": "9G"}]},
                    "halte": [
                        {"id": "C", "name": "Gamma", "abfahrtsZeitpunkt": "2024-05-01T09:25:00"},
                        {"id": "D", "name": "Delta", "ankunftsZeitpunkt": "2024-05-01T10:00:00"}
                    ]
                }
            ]
        }]
    }"#;

    #[test]
    fn quote_from_first_connection() {
        let quote = convert_quote(&response(TWO_TRAINS)).unwrap();

        assert_eq!(quote.price, Price::from_cents(5999));
        assert_eq!(quote.currency, "EUR");
        assert_eq!(
            quote.matched_departure,
            parse_timestamp("2024-05-01T08:00:00").unwrap()
        );
        assert!(quote.has_attribute("9G"));
        assert!(quote.has_attribute("BR"));
    }

    #[test]
    fn quote_without_connection_or_price() {
        assert_eq!(
            convert_quote(&response(r#"{"verbindungen": []}"#)).unwrap_err(),
            ConversionError::NoConnection
        );
        let err = convert_quote(&response(
            r#"{"verbindungen": [{"verbindungsAbschnitte": []}]}"#,
        ))
        .unwrap_err();
        assert_eq!(err, ConversionError::NoPrice);
        assert!(err.is_missing_offer());
    }

    #[test]
    fn quote_with_bad_data_is_not_a_missing_offer() {
        let err = convert_quote(&response(
            r#"{"verbindungen": [{"angebotsPreis": {"betrag": 10.0}, "verbindungsAbschnitte": [
                {"halte": [{"id": "A", "abfahrtsZeitpunkt": "soon"}]}
            ]}]}"#,
        ))
        .unwrap_err();
        assert!(matches!(err, ConversionError::InvalidTime(_)));
        assert!(!err.is_missing_offer());

        let err = convert_quote(&response(
            r#"{"verbindungen": [{"angebotsPreis": {"betrag": -1.0}, "verbindungsAbschnitte": []}]}"#,
        ))
        .unwrap_err();
        assert!(matches!(err, ConversionError::InvalidPrice(_)));
    }

    #[test]
    fn currency_defaults_to_euro() {
        let quote = convert_quote(&response(
            r#"{"verbindungen": [{"angebotsPreis": {"betrag": 10.0}, "verbindungsAbschnitte": [
                {"halte": [{"id": "A", "abfahrtsZeitpunkt": "2024-05-01T08:00:00"}]}
            ]}]}"#,
        ))
        .unwrap();
        assert_eq!(quote.currency, "EUR");
        assert!(quote.service_attributes.is_empty());
    }

    #[test]
    fn journey_merges_transfer_and_skips_walks() {
        let journey = convert_journey(&response(TWO_TRAINS)).unwrap();
        let stops = journey.itinerary.stops();

        let ids: Vec<_> = stops.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B", "C", "D"]);
        assert_eq!(stops[2].index, StopIndex(2));
        assert_eq!(
            stops[2].arrival,
            Some(parse_timestamp("2024-05-01T09:10:00").unwrap())
        );
        assert_eq!(
            stops[2].departure,
            Some(parse_timestamp("2024-05-01T09:25:00").unwrap())
        );
        assert_eq!(stops[3].departure, None);
        assert_eq!(journey.through_price, Some(Price::from_cents(5999)));
    }

    #[test]
    fn journey_without_price_has_no_through_price() {
        let journey = convert_journey(&response(
            r#"{"verbindungen": [{"verbindungsAbschnitte": [{"halte": [
                {"id": "A", "name": "Alpha", "abfahrtsZeitpunkt": "2024-05-01T08:00:00"},
                {"id": "B", "name": "Beta", "ankunftsZeitpunkt": "2024-05-01T09:00:00"}
            ]}]}]}"#,
        ))
        .unwrap();
        assert_eq!(journey.through_price, None);
        assert_eq!(journey.itinerary.len(), 2);
    }

    #[test]
    fn journey_with_single_stop_is_invalid() {
        let err = convert_journey(&response(
            r#"{"verbindungen": [{"verbindungsAbschnitte": [{"halte": [
                {"id": "A", "name": "Alpha", "abfahrtsZeitpunkt": "2024-05-01T08:00:00"}
            ]}]}]}"#,
        ))
        .unwrap_err();
        assert_eq!(err, ConversionError::Itinerary(DomainError::TooFewStops(1)));
    }

    #[test]
    fn missing_name_falls_back_to_id() {
        let call = convert_halt(&Halt {
            id: "8000105".into(),
            name: None,
            abfahrts_zeitpunkt: None,
            ankunfts_zeitpunkt: None,
        })
        .unwrap();
        assert_eq!(call.name, "8000105");
    }
}
