//! Timestamp handling for provider data.
//!
//! bahn.de reports times as local ISO-8601 date-times without an offset
//! (`2024-05-01T08:15:00`), occasionally with fractional seconds or an
//! explicit offset. All of them are normalised to a `NaiveDateTime` in the
//! provider's local time, which is also the form booking links expect.

use chrono::{DateTime, NaiveDateTime};

/// Wire format used for requests and booking links.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Error returned when parsing an invalid timestamp string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid timestamp {input:?}: {reason}")]
pub struct TimeError {
    input: String,
    reason: &'static str,
}

impl TimeError {
    fn new(input: &str, reason: &'static str) -> Self {
        Self {
            input: input.to_string(),
            reason,
        }
    }
}

/// Parse a provider timestamp.
///
/// Accepts `YYYY-MM-DDTHH:MM:SS`, the same with fractional seconds,
/// `YYYY-MM-DDTHH:MM`, and RFC 3339 with an offset (the offset is dropped,
/// keeping the wall-clock time).
///
/// # Examples
///
/// ```
/// use fare_split::domain::parse_timestamp;
///
/// let t = parse_timestamp("2024-05-01T08:15:00").unwrap();
/// assert_eq!(t.to_string(), "2024-05-01 08:15:00");
///
/// assert!(parse_timestamp("2024-05-01T08:15:00.000").is_ok());
/// assert!(parse_timestamp("2024-05-01T08:15").is_ok());
/// assert!(parse_timestamp("2024-05-01T08:15:00+02:00").is_ok());
///
/// assert!(parse_timestamp("08:15").is_err());
/// assert!(parse_timestamp("2024-13-01T08:15:00").is_err());
/// ```
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime, TimeError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(TimeError::new(s, "empty"));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_local());
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(dt);
        }
    }

    Err(TimeError::new(s, "expected YYYY-MM-DDTHH:MM[:SS]"))
}

/// Format a timestamp in the provider's wire format (second precision).
pub fn format_timestamp(t: &NaiveDateTime) -> String {
    t.format(TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn parse_plain() {
        assert_eq!(parse_timestamp("2024-05-01T08:15:00").unwrap(), at(8, 15, 0));
    }

    #[test]
    fn parse_fractional_seconds() {
        let t = parse_timestamp("2024-05-01T08:15:30.250").unwrap();
        assert_eq!(t.with_nanosecond(0).unwrap(), at(8, 15, 30));
    }

    #[test]
    fn parse_minute_precision() {
        assert_eq!(parse_timestamp("2024-05-01T08:15").unwrap(), at(8, 15, 0));
    }

    #[test]
    fn parse_with_offset_keeps_wall_clock() {
        assert_eq!(
            parse_timestamp("2024-05-01T08:15:00+02:00").unwrap(),
            at(8, 15, 0)
        );
    }

    #[test]
    fn parse_trims_whitespace() {
        assert_eq!(parse_timestamp(" 2024-05-01T08:15:00\n").unwrap(), at(8, 15, 0));
    }

    #[test]
    fn reject_invalid() {
        assert!(parse_timestamp("").is_err());
        assert!(parse_timestamp("08:15:00").is_err());
        assert!(parse_timestamp("2024-05-01").is_err());
        assert!(parse_timestamp("2024-05-01T25:00:00").is_err());
        assert!(parse_timestamp("not a time").is_err());
    }

    #[test]
    fn error_mentions_input() {
        let err = parse_timestamp("yesterday").unwrap_err();
        assert!(err.to_string().contains("yesterday"));
    }

    #[test]
    fn format_drops_fraction() {
        let t = parse_timestamp("2024-05-01T08:15:30.999").unwrap();
        assert_eq!(format_timestamp(&t), "2024-05-01T08:15:30");
    }
}
