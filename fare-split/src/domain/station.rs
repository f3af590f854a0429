//! Station identifier types.

use std::fmt;

/// Error returned when parsing an invalid station identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid station id: {reason}")]
pub struct InvalidStationId {
    reason: &'static str,
}

/// An opaque, stable station identifier as issued by the fare provider.
///
/// bahn.de identifiers look like `A=1@O=Berlin Hbf@X=13369549@L=8011160@`,
/// but nothing in the engine relies on that shape. The only guarantee is
/// that the identifier is non-empty and free of surrounding whitespace.
///
/// # Examples
///
/// ```
/// use fare_split::domain::StationId;
///
/// let id = StationId::parse("8011160").unwrap();
/// assert_eq!(id.as_str(), "8011160");
///
/// assert!(StationId::parse("").is_err());
/// assert!(StationId::parse("   ").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StationId(String);

impl StationId {
    /// Parse a station identifier, trimming surrounding whitespace.
    pub fn parse(s: &str) -> Result<Self, InvalidStationId> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(InvalidStationId {
                reason: "must not be empty",
            });
        }
        Ok(StationId(trimmed.to_string()))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StationId({})", self.0)
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
