//! Parsing of bahn.de journey links.
//!
//! Users paste one of two link shapes:
//!
//! - the long search link, which carries the journey in its fragment:
//!   `https://www.bahn.de/buchung/fahrplan/suche#sts=true&soid=...&zoid=...&hd=2024-05-01T08:00:00`
//! - the short shared link, which carries an opaque connection id in a
//!   `vbid` query parameter, sometimes behind `/buchung/start`.

use std::str::FromStr;

use chrono::NaiveDateTime;
use url::{Url, form_urlencoded};

use crate::domain::{StationId, TimeError, parse_timestamp};

/// What a link identifies: a stored connection or a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JourneyRef {
    /// A connection stored by the provider under a short id
    Vbid(String),
    /// A timetable search from one station to another
    Search {
        origin: StationId,
        destination: StationId,
        departure: NaiveDateTime,
    },
}

/// Error returned when a link cannot be understood.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkError {
    /// Not a URL at all
    #[error("not a valid URL: {0}")]
    InvalidUrl(String),

    /// A long link without one of its journey parameters
    #[error("link is missing the {0} parameter")]
    MissingParameter(&'static str),

    /// A station parameter is present but empty
    #[error("link has an empty {0} parameter")]
    EmptyStation(&'static str),

    /// The departure parameter is not a timestamp
    #[error("link has an invalid departure: {0}")]
    InvalidDeparture(#[from] TimeError),
}

impl JourneyRef {
    /// Parse a bahn.de link.
    ///
    /// # Examples
    ///
    /// ```
    /// use fare_split::link::JourneyRef;
    ///
    /// let short = JourneyRef::parse("https://www.bahn.de/buchung/start?vbid=abc-123").unwrap();
    /// assert_eq!(short, JourneyRef::Vbid("abc-123".into()));
    ///
    /// let long = JourneyRef::parse(
    ///     "https://www.bahn.de/buchung/fahrplan/suche#sts=true&soid=8011160&zoid=8000261&hd=2024-05-01T08:00:00",
    /// )
    /// .unwrap();
    /// assert!(matches!(long, JourneyRef::Search { .. }));
    /// ```
    pub fn parse(link: &str) -> Result<Self, LinkError> {
        let url = Url::parse(link.trim()).map_err(|e| LinkError::InvalidUrl(e.to_string()))?;

        if let Some(vbid) = url
            .query_pairs()
            .find(|(key, value)| key == "vbid" && !value.trim().is_empty())
            .map(|(_, value)| value.trim().to_string())
        {
            return Ok(JourneyRef::Vbid(vbid));
        }

        let fragment = url.fragment().unwrap_or_default();
        let mut origin = None;
        let mut destination = None;
        let mut departure = None;
        for (key, value) in form_urlencoded::parse(fragment.as_bytes()) {
            match key.as_ref() {
                "soid" => origin = Some(value.into_owned()),
                "zoid" => destination = Some(value.into_owned()),
                "hd" => departure = Some(value.into_owned()),
                _ => {}
            }
        }

        let origin = origin.ok_or(LinkError::MissingParameter("soid"))?;
        let destination = destination.ok_or(LinkError::MissingParameter("zoid"))?;
        let departure = departure.ok_or(LinkError::MissingParameter("hd"))?;

        Ok(JourneyRef::Search {
            origin: StationId::parse(&origin).map_err(|_| LinkError::EmptyStation("soid"))?,
            destination: StationId::parse(&destination)
                .map_err(|_| LinkError::EmptyStation("zoid"))?,
            departure: parse_timestamp(&departure)?,
        })
    }
}

impl FromStr for JourneyRef {
    type Err = LinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn short_link() {
        let parsed = JourneyRef::parse("https://www.bahn.de/?vbid=9dd9db26-4ffc-411c").unwrap();
        assert_eq!(parsed, JourneyRef::Vbid("9dd9db26-4ffc-411c".into()));
    }

    #[test]
    fn short_link_behind_start_page() {
        let parsed =
            JourneyRef::parse("https://www.bahn.de/buchung/start?lang=de&vbid=xyz").unwrap();
        assert_eq!(parsed, JourneyRef::Vbid("xyz".into()));
    }

    #[test]
    fn long_link() {
        let link = "https://www.bahn.de/buchung/fahrplan/suche#sts=true\
                    &so=Berlin%20Hbf&zo=M%C3%BCnchen%20Hbf\
                    &soid=A%3D1%40O%3DBerlin%20Hbf%40L%3D8011160%40\
                    &zoid=A%3D1%40O%3DM%C3%BCnchen%20Hbf%40L%3D8000261%40\
                    &hd=2024-05-01T08:29:00&dltv=false";

        let parsed = JourneyRef::parse(link).unwrap();

        let expected_departure = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(8, 29, 0)
            .unwrap();
        assert_eq!(
            parsed,
            JourneyRef::Search {
                origin: StationId::parse("A=1@O=Berlin Hbf@L=8011160@").unwrap(),
                destination: StationId::parse("A=1@O=München Hbf@L=8000261@").unwrap(),
                departure: expected_departure,
            }
        );
    }

    #[test]
    fn long_link_with_plus_encoded_spaces() {
        let link = "https://www.bahn.de/buchung/fahrplan/suche#soid=Berlin+Hbf&zoid=Hamburg&hd=2024-05-01T08:00";
        let JourneyRef::Search { origin, .. } = JourneyRef::parse(link).unwrap() else {
            panic!("expected a search");
        };
        assert_eq!(origin.as_str(), "Berlin Hbf");
    }

    #[test]
    fn missing_parameters() {
        assert_eq!(
            JourneyRef::parse("https://www.bahn.de/buchung/fahrplan/suche#zoid=B&hd=2024-05-01T08:00")
                .unwrap_err(),
            LinkError::MissingParameter("soid")
        );
        assert_eq!(
            JourneyRef::parse("https://www.bahn.de/buchung/fahrplan/suche#soid=A&hd=2024-05-01T08:00")
                .unwrap_err(),
            LinkError::MissingParameter("zoid")
        );
        assert_eq!(
            JourneyRef::parse("https://www.bahn.de/buchung/fahrplan/suche#soid=A&zoid=B").unwrap_err(),
            LinkError::MissingParameter("hd")
        );
    }

    #[test]
    fn empty_vbid_falls_back_to_fragment() {
        let err = JourneyRef::parse("https://www.bahn.de/?vbid=").unwrap_err();
        assert_eq!(err, LinkError::MissingParameter("soid"));
    }

    #[test]
    fn invalid_inputs() {
        assert!(matches!(
            JourneyRef::parse("not a link"),
            Err(LinkError::InvalidUrl(_))
        ));
        assert!(matches!(
            JourneyRef::parse("https://www.bahn.de/#soid=A&zoid=B&hd=tomorrow"),
            Err(LinkError::InvalidDeparture(_))
        ));
        assert_eq!(
            JourneyRef::parse("https://www.bahn.de/#soid=%20&zoid=B&hd=2024-05-01T08:00").unwrap_err(),
            LinkError::EmptyStation("soid")
        );
    }

    #[test]
    fn from_str() {
        let parsed: JourneyRef = "https://www.bahn.de/?vbid=abc".parse().unwrap();
        assert_eq!(parsed, JourneyRef::Vbid("abc".into()));
    }
}
