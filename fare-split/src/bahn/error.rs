//! bahn.de client error types.

use std::fmt;
use std::time::Duration;

use crate::analysis::ResolveError;
use crate::quote::QuoteError;

use super::convert::ConversionError;

/// Errors from the bahn.de HTTP client.
#[derive(Debug)]
pub enum BahnError {
    /// HTTP request failed (network error, timeout, etc.)
    Http(reqwest::Error),

    /// JSON deserialization failed
    Json {
        message: String,
        body: Option<String>,
    },

    /// API returned an error status code
    ApiError { status: u16, message: String },

    /// Rate limited by the API
    RateLimited { retry_after: Option<Duration> },

    /// Stored connection has no reconstruction context
    MissingRecon,

    /// Response could not be turned into domain types
    Conversion(ConversionError),

    /// Client configuration is unusable
    InvalidConfig(String),
}

impl fmt::Display for BahnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BahnError::Http(e) => write!(f, "HTTP error: {e}"),
            BahnError::Json { message, body } => {
                write!(f, "JSON parse error: {message}")?;
                if let Some(body) = body {
                    write!(f, " (body: {body})")?;
                }
                Ok(())
            }
            BahnError::ApiError { status, message } => {
                write!(f, "API error {status}: {message}")
            }
            BahnError::RateLimited {
                retry_after: Some(after),
            } => write!(f, "rate limited by bahn.de (retry after {}s)", after.as_secs()),
            BahnError::RateLimited { retry_after: None } => write!(f, "rate limited by bahn.de"),
            BahnError::MissingRecon => write!(f, "stored connection has no recon context"),
            BahnError::Conversion(e) => write!(f, "conversion error: {e}"),
            BahnError::InvalidConfig(message) => write!(f, "invalid client config: {message}"),
        }
    }
}

impl std::error::Error for BahnError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BahnError::Http(e) => Some(e),
            BahnError::Conversion(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for BahnError {
    fn from(err: reqwest::Error) -> Self {
        BahnError::Http(err)
    }
}

impl From<ConversionError> for BahnError {
    fn from(err: ConversionError) -> Self {
        BahnError::Conversion(err)
    }
}

impl From<BahnError> for QuoteError {
    fn from(err: BahnError) -> Self {
        match err {
            BahnError::Http(ref e) if e.is_decode() => QuoteError::Malformed(err.to_string()),
            BahnError::Http(_) => QuoteError::Transient(err.to_string()),
            BahnError::Json { .. } => QuoteError::Malformed(err.to_string()),
            BahnError::ApiError { status, .. } if status >= 500 => {
                QuoteError::Transient(err.to_string())
            }
            BahnError::ApiError { .. } | BahnError::MissingRecon | BahnError::InvalidConfig(_) => {
                QuoteError::Permanent(err.to_string())
            }
            BahnError::RateLimited { retry_after } => QuoteError::RateLimited { retry_after },
            BahnError::Conversion(ref e) if e.is_missing_offer() => {
                QuoteError::Permanent(err.to_string())
            }
            BahnError::Conversion(_) => QuoteError::Malformed(err.to_string()),
        }
    }
}

impl From<BahnError> for ResolveError {
    fn from(err: BahnError) -> Self {
        match err {
            BahnError::Http(ref e) if e.is_decode() => ResolveError::Malformed(err.to_string()),
            BahnError::Http(_) | BahnError::RateLimited { .. } | BahnError::InvalidConfig(_) => {
                ResolveError::Unavailable(err.to_string())
            }
            BahnError::ApiError { status, .. } if status >= 500 => {
                ResolveError::Unavailable(err.to_string())
            }
            BahnError::ApiError { .. } | BahnError::MissingRecon => {
                ResolveError::NotFound(err.to_string())
            }
            BahnError::Json { .. } => ResolveError::Malformed(err.to_string()),
            BahnError::Conversion(ConversionError::Itinerary(e)) => {
                ResolveError::InvalidItinerary(e)
            }
            BahnError::Conversion(ref e) if e.is_missing_offer() => {
                ResolveError::NotFound(err.to_string())
            }
            BahnError::Conversion(_) => ResolveError::Malformed(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = BahnError::ApiError {
            status: 500,
            message: "Internal Server Error".into(),
        };
        assert_eq!(err.to_string(), "API error 500: Internal Server Error");

        let err = BahnError::Json {
            message: "expected value".into(),
            body: Some("<html>".into()),
        };
        assert!(err.to_string().contains("JSON parse error"));
        assert!(err.to_string().contains("<html>"));

        let err = BahnError::RateLimited {
            retry_after: Some(Duration::from_secs(30)),
        };
        assert_eq!(err.to_string(), "rate limited by bahn.de (retry after 30s)");

        let err = BahnError::InvalidConfig("bad user agent".into());
        assert_eq!(err.to_string(), "invalid client config: bad user agent");
    }

    #[test]
    fn quote_classification() {
        let server = BahnError::ApiError {
            status: 503,
            message: String::new(),
        };
        assert!(matches!(QuoteError::from(server), QuoteError::Transient(_)));

        let rejected = BahnError::ApiError {
            status: 400,
            message: String::new(),
        };
        assert!(matches!(QuoteError::from(rejected), QuoteError::Permanent(_)));

        let limited = BahnError::RateLimited {
            retry_after: Some(Duration::from_secs(5)),
        };
        assert_eq!(
            QuoteError::from(limited),
            QuoteError::RateLimited {
                retry_after: Some(Duration::from_secs(5))
            }
        );

        let garbled = BahnError::Json {
            message: "eof".into(),
            body: None,
        };
        assert!(matches!(QuoteError::from(garbled), QuoteError::Malformed(_)));

        let none = BahnError::Conversion(ConversionError::NoConnection);
        assert!(matches!(QuoteError::from(none), QuoteError::Permanent(_)));

        let bad_time = BahnError::Conversion(ConversionError::MissingDeparture);
        assert!(matches!(QuoteError::from(bad_time), QuoteError::Malformed(_)));
    }

    #[test]
    fn resolve_classification() {
        let limited = BahnError::RateLimited { retry_after: None };
        assert!(matches!(
            ResolveError::from(limited),
            ResolveError::Unavailable(_)
        ));

        let gone = BahnError::ApiError {
            status: 404,
            message: String::new(),
        };
        assert!(matches!(ResolveError::from(gone), ResolveError::NotFound(_)));

        assert!(matches!(
            ResolveError::from(BahnError::MissingRecon),
            ResolveError::NotFound(_)
        ));
    }
}
