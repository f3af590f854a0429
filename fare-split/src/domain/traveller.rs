//! Traveller discount configuration.
//!
//! Passed unchanged to every quote request and to the booking-link
//! formatter, so that prices and links agree on the discounts applied.

use std::fmt;
use std::str::FromStr;

/// Error returned when parsing an invalid BahnCard token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid BahnCard {token:?}: expected one of BC25_1, BC25_2, BC50_1, BC50_2")]
pub struct InvalidBahnCard {
    token: String,
}

/// Travel class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TravelClass {
    First,
    Second,
}

impl TravelClass {
    /// Class number (1 or 2).
    pub fn number(self) -> u8 {
        match self {
            TravelClass::First => 1,
            TravelClass::Second => 2,
        }
    }

    /// Provider class code, e.g. `KLASSE_2`.
    pub fn code(self) -> &'static str {
        match self {
            TravelClass::First => "KLASSE_1",
            TravelClass::Second => "KLASSE_2",
        }
    }
}

/// A BahnCard discount card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BahnCard {
    /// Discount percentage: 25 or 50
    discount: u8,
    /// Class the card is valid in
    class: TravelClass,
}

impl BahnCard {
    /// BahnCard 25.
    pub fn bc25(class: TravelClass) -> Self {
        Self { discount: 25, class }
    }

    /// BahnCard 50.
    pub fn bc50(class: TravelClass) -> Self {
        Self { discount: 50, class }
    }

    /// Discount percentage.
    pub fn discount(&self) -> u8 {
        self.discount
    }

    /// Class the card is valid in.
    pub fn class(&self) -> TravelClass {
        self.class
    }

    /// Provider discount code, e.g. `BAHNCARD25`.
    pub fn provider_code(&self) -> String {
        format!("BAHNCARD{}", self.discount)
    }
}

impl FromStr for BahnCard {
    type Err = InvalidBahnCard;

    /// Parse a token of the form `BC25_2`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || InvalidBahnCard {
            token: s.to_string(),
        };
        let (card, class) = s.trim().split_once('_').ok_or_else(err)?;
        let class = match class {
            "1" => TravelClass::First,
            "2" => TravelClass::Second,
            _ => return Err(err()),
        };
        match card.to_ascii_uppercase().as_str() {
            "BC25" => Ok(BahnCard::bc25(class)),
            "BC50" => Ok(BahnCard::bc50(class)),
            _ => Err(err()),
        }
    }
}

impl fmt::Display for BahnCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BC{}_{}", self.discount, self.class.number())
    }
}

/// Discounts held by the (single, adult) traveller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TravellerConfig {
    /// BahnCard, if any
    pub bahncard: Option<BahnCard>,
    /// Whether the traveller holds the flat-rate Deutschland-Ticket
    pub flat_rate_pass: bool,
}

impl TravellerConfig {
    /// Create a config without discounts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a BahnCard.
    pub fn with_bahncard(mut self, card: BahnCard) -> Self {
        self.bahncard = Some(card);
        self
    }

    /// Set whether the traveller holds the flat-rate pass.
    pub fn with_flat_rate_pass(mut self, has_pass: bool) -> Self {
        self.flat_rate_pass = has_pass;
        self
    }
}
