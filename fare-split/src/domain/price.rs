//! Currency amounts.

use std::fmt;
use std::iter::Sum;
use std::ops::Add;

/// Error returned when a provider amount cannot be represented as a price.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid price {amount}: {reason}")]
pub struct InvalidPrice {
    amount: f64,
    reason: &'static str,
}

/// A non-negative currency amount in cents.
///
/// Fares are compared and summed exactly, so they are held as integer
/// cents rather than floating-point euros.
///
/// # Examples
///
/// ```
/// use fare_split::domain::Price;
///
/// let p = Price::from_euros(59.9).unwrap();
/// assert_eq!(p.cents(), 5990);
/// assert_eq!(p.to_string(), "59.90");
///
/// assert!(Price::from_euros(-1.0).is_err());
/// assert!(Price::from_euros(f64::NAN).is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(u64);

impl Price {
    /// The zero price, used for legs covered by a flat-rate pass.
    pub const ZERO: Price = Price(0);

    /// Create a price from whole cents.
    pub const fn from_cents(cents: u64) -> Self {
        Price(cents)
    }

    /// Create a price from a decimal euro amount, rounding to the nearest cent.
    pub fn from_euros(amount: f64) -> Result<Self, InvalidPrice> {
        if !amount.is_finite() {
            return Err(InvalidPrice {
                amount,
                reason: "must be finite",
            });
        }
        if amount < 0.0 {
            return Err(InvalidPrice {
                amount,
                reason: "must not be negative",
            });
        }
        let cents = (amount * 100.0).round();
        if cents > u64::MAX as f64 {
            return Err(InvalidPrice {
                amount,
                reason: "too large",
            });
        }
        Ok(Price(cents as u64))
    }

    /// Returns the amount in cents.
    pub fn cents(&self) -> u64 {
        self.0
    }

    /// Returns the amount in euros.
    pub fn as_euros(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns true for the zero price.
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Difference to a cheaper price, or `None` if `cheaper` is not cheaper.
    pub fn saving_over(&self, cheaper: Price) -> Option<Price> {
        self.0
            .checked_sub(cheaper.0)
            .filter(|&d| d > 0)
            .map(Price)
    }
}

impl Add for Price {
    type Output = Price;

    fn add(self, rhs: Price) -> Price {
        Price(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Price>>(iter: I) -> Price {
        iter.fold(Price::ZERO, Add::add)
    }
}

impl fmt::Debug for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Price({self})")
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}
