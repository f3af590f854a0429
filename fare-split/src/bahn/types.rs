//! bahn.de API request and response DTOs.
//!
//! These types map directly to the JSON of the bahn.de web API. Response
//! types use `Option` and `#[serde(default)]` liberally because the API
//! omits fields rather than sending nulls; conversion to domain types
//! decides what is actually required.

use serde::{Deserialize, Serialize};

use crate::domain::{BahnCard, TravellerConfig};

/// Product classes included in every timetable search.
pub const PRODUCT_CLASSES: [&str; 10] = [
    "ICE",
    "EC_IC",
    "IR",
    "REGIONAL",
    "SBAHN",
    "BUS",
    "SCHIFF",
    "UBAHN",
    "TRAM",
    "ANRUFPFLICHTIG",
];

/// Travel class searched for.
pub const SEARCH_CLASS: &str = "KLASSE_2";

/// Body of `POST /angebote/fahrplan`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableRequest<'a> {
    pub abfahrts_halt: &'a str,
    pub anfrage_zeitpunkt: String,
    pub ankunfts_halt: &'a str,
    pub ankunft_suche: &'static str,
    pub klasse: &'static str,
    pub produktgattungen: &'static [&'static str],
    pub reisende: Vec<Traveller>,
    pub schnelle_verbindungen: bool,
    pub deutschland_ticket_vorhanden: bool,
}

/// Body of `POST /angebote/recon`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconRequest<'a> {
    pub klasse: &'static str,
    pub reisende: Vec<Traveller>,
    pub ctx_recon: &'a str,
    pub deutschland_ticket_vorhanden: bool,
}

/// One traveller entry in `reisende`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Traveller {
    pub typ: &'static str,
    pub ermaessigungen: Vec<Discount>,
    pub anzahl: u32,
    pub alter: Vec<u32>,
}

/// A discount held by a traveller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Discount {
    pub art: String,
    pub klasse: String,
}

impl Traveller {
    /// The single adult described by `config`.
    pub fn adult(config: &TravellerConfig) -> Self {
        let discount = match config.bahncard {
            Some(card) => Discount::bahncard(card),
            None => Discount {
                art: "KEINE_ERMAESSIGUNG".to_string(),
                klasse: "KLASSENLOS".to_string(),
            },
        };
        Self {
            typ: "ERWACHSENER",
            ermaessigungen: vec![discount],
            anzahl: 1,
            alter: Vec::new(),
        }
    }
}

impl Discount {
    fn bahncard(card: BahnCard) -> Self {
        Self {
            art: card.provider_code(),
            klasse: card.class().code().to_string(),
        }
    }
}

/// Response of the timetable and recon endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableResponse {
    /// Matching connections, best match first.
    #[serde(default)]
    pub verbindungen: Vec<Connection>,
}

/// One connection offer.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    /// Cheapest offer price, absent when the connection cannot be booked.
    pub angebots_preis: Option<OfferPrice>,

    /// Sections of the connection (trains and walks).
    #[serde(default)]
    pub verbindungs_abschnitte: Vec<Section>,
}

/// Price of an offer.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferPrice {
    /// Amount in euros.
    pub betrag: f64,

    /// ISO currency code.
    pub waehrung: Option<String>,
}

/// One section of a connection.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    /// Calls made during this section.
    #[serde(default)]
    pub halte: Vec<Halt>,

    /// Vehicle used for this section.
    pub verkehrsmittel: Option<Vehicle>,
}

impl Section {
    /// Returns true for a walking transfer.
    pub fn is_walk(&self) -> bool {
        self.verkehrsmittel
            .as_ref()
            .is_some_and(|v| v.typ.as_deref() == Some("WALK"))
    }
}

/// A call at a station.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Halt {
    /// Provider station identifier.
    pub id: String,

    /// Station display name.
    pub name: Option<String>,

    /// Scheduled departure (local ISO date-time).
    pub abfahrts_zeitpunkt: Option<String>,

    /// Scheduled arrival (local ISO date-time).
    pub ankunfts_zeitpunkt: Option<String>,
}

/// Vehicle of a section.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    /// Vehicle type, e.g. `"WALK"` for a walking transfer.
    pub typ: Option<String>,

    /// Display name, e.g. `"ICE 1601"`.
    pub name: Option<String>,

    /// Service attributes (such as `9G` for the flat-rate pass).
    #[serde(default)]
    pub zugattribute: Vec<TrainAttribute>,
}

/// A service attribute of a vehicle.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainAttribute {
    /// Attribute code.
    pub key: String,

    /// Human-readable description.
    pub value: Option<String>,
}

/// Response of `GET /angebote/verbindung/{vbid}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredConnection {
    /// Reconstruction context for the outward journey.
    pub hinfahrt_recon: Option<String>,
}
