//! Ticket plan types.

use chrono::NaiveDateTime;

use crate::domain::{DomainError, Price, Segment, StationId, Stop, StopIndex};

/// One ticket to buy: a segment plus the names needed to book it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketLeg {
    /// Origin stop position
    pub origin: StopIndex,
    /// Destination stop position
    pub destination: StopIndex,
    /// Origin station identifier
    pub origin_id: StationId,
    /// Destination station identifier
    pub destination_id: StationId,
    /// Origin station display name
    pub origin_name: String,
    /// Destination station display name
    pub destination_name: String,
    /// Departure of the train the ticket was priced for
    pub matched_departure: NaiveDateTime,
    /// Ticket price (zero when covered by the flat-rate pass)
    pub price: Price,
    /// Whether the flat-rate pass covers this leg
    pub is_subsidized: bool,
}

impl TicketLeg {
    /// Creates a leg from a segment and its end stops.
    pub fn new(segment: &Segment, origin: &Stop, destination: &Stop) -> Self {
        Self {
            origin: segment.origin,
            destination: segment.destination,
            origin_id: segment.origin_id.clone(),
            destination_id: segment.destination_id.clone(),
            origin_name: origin.name.clone(),
            destination_name: destination.name.clone(),
            matched_departure: segment.departure,
            price: segment.price,
            is_subsidized: segment.is_subsidized,
        }
    }

    /// Returns true if this leg needs a ticket to be bought.
    pub fn needs_ticket(&self) -> bool {
        !self.is_subsidized
    }
}

/// A chain of tickets covering the whole itinerary.
///
/// # Invariants
///
/// - At least one leg
/// - Consecutive legs meet: each leg starts where the previous one ended
/// - `total_price` is the sum of the leg prices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketPlan {
    legs: Vec<TicketLeg>,
    total_price: Price,
    comparison_price: Price,
}

impl TicketPlan {
    /// Constructs a plan, checking that the legs chain.
    ///
    /// `comparison_price` is the direct through-ticket price the plan is
    /// measured against.
    pub fn new(legs: Vec<TicketLeg>, comparison_price: Price) -> Result<Self, DomainError> {
        if legs.is_empty() {
            return Err(DomainError::EmptyPlan);
        }

        for pair in legs.windows(2) {
            if pair[0].destination != pair[1].origin {
                return Err(DomainError::DisconnectedLegs {
                    end: pair[0].destination,
                    start: pair[1].origin,
                });
            }
        }

        let total_price = legs.iter().map(|leg| leg.price).sum();
        Ok(Self {
            legs,
            total_price,
            comparison_price,
        })
    }

    /// The legs, in travel order.
    pub fn legs(&self) -> &[TicketLeg] {
        &self.legs
    }

    /// Sum of all leg prices.
    pub fn total_price(&self) -> Price {
        self.total_price
    }

    /// Price of the direct through ticket.
    pub fn comparison_price(&self) -> Price {
        self.comparison_price
    }

    /// How much the plan saves over the through ticket (zero if none).
    pub fn savings(&self) -> Price {
        self.comparison_price
            .saving_over(self.total_price)
            .unwrap_or(Price::ZERO)
    }

    /// Number of tickets.
    pub fn len(&self) -> usize {
        self.legs.len()
    }

    /// Always false; a plan has at least one leg.
    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }
}

/// Outcome of fare optimization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Optimization {
    /// Splitting is strictly cheaper than the through ticket
    Split(TicketPlan),
    /// The through ticket is already the cheapest option
    NoImprovement {
        /// Price of the through ticket
        baseline: Price,
    },
}

impl Optimization {
    /// Price of the through ticket.
    pub fn current_price(&self) -> Price {
        match self {
            Optimization::Split(plan) => plan.comparison_price(),
            Optimization::NoImprovement { baseline } => *baseline,
        }
    }

    /// Cheapest total price found.
    pub fn optimal_price(&self) -> Price {
        match self {
            Optimization::Split(plan) => plan.total_price(),
            Optimization::NoImprovement { baseline } => *baseline,
        }
    }

    /// Savings over the through ticket.
    pub fn savings(&self) -> Price {
        match self {
            Optimization::Split(plan) => plan.savings(),
            Optimization::NoImprovement { .. } => Price::ZERO,
        }
    }

    /// The plan, if splitting helps.
    pub fn plan(&self) -> Option<&TicketPlan> {
        match self {
            Optimization::Split(plan) => Some(plan),
            Optimization::NoImprovement { .. } => None,
        }
    }

    /// Returns true if splitting is cheaper.
    pub fn is_split(&self) -> bool {
        matches!(self, Optimization::Split(_))
    }
}
