//! bahn.de web API HTTP client.
//!
//! Provides async methods for the timetable search, stored-connection and
//! recon endpoints, and implements both the quoting and the itinerary
//! resolving capabilities on top of them. Every request passes through the
//! client's own rate limiter.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, RETRY_AFTER, USER_AGENT};
use serde::de::DeserializeOwned;
use tracing::{debug, info, trace};

use crate::analysis::{ItineraryResolver, ResolveError, ResolvedJourney};
use crate::domain::{StationId, TravellerConfig, format_timestamp};
use crate::link::JourneyRef;
use crate::quote::{PriceQuoter, QuoteError, QuoteResult, RateLimiter};

use super::convert::{convert_journey, convert_quote};
use super::error::BahnError;
use super::types::{
    PRODUCT_CLASSES, ReconRequest, SEARCH_CLASS, StoredConnection, TimetableRequest,
    TimetableResponse, Traveller,
};

/// Default base URL for the bahn.de web API.
pub const DEFAULT_BASE_URL: &str = "https://www.bahn.de/web/api";

/// Default minimum interval between request starts.
const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(500);

/// Default user agent; the API rejects requests without a browser-like one.
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";

/// Configuration for the bahn.de client.
#[derive(Debug, Clone)]
pub struct BahnConfig {
    /// Base URL for the API (defaults to production bahn.de)
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// User-Agent header sent with every request
    pub user_agent: String,
    /// Minimum interval between request starts
    pub min_interval: Duration,
}

impl BahnConfig {
    /// Create a config with production defaults.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            min_interval: DEFAULT_MIN_INTERVAL,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the User-Agent header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the minimum interval between request starts.
    pub fn with_min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = interval;
        self
    }
}

impl Default for BahnConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// bahn.de web API client.
///
/// Cloning is cheap; clones share the HTTP connection pool and the rate
/// limiter.
#[derive(Debug, Clone)]
pub struct BahnClient {
    http: reqwest::Client,
    base_url: String,
    limiter: Arc<RateLimiter>,
}

impl BahnClient {
    /// Create a new client with the given configuration.
    pub fn new(config: BahnConfig) -> Result<Self, BahnError> {
        let mut headers = HeaderMap::new();
        let user_agent = HeaderValue::from_str(&config.user_agent).map_err(|e| {
            BahnError::InvalidConfig(format!("user agent {:?}: {e}", config.user_agent))
        })?;
        headers.insert(USER_AGENT, user_agent);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            limiter: Arc::new(RateLimiter::new(config.min_interval)),
        })
    }

    /// Search the timetable for connections departing at or after `departure`.
    pub async fn search(
        &self,
        origin: &StationId,
        destination: &StationId,
        departure: NaiveDateTime,
        traveller: &TravellerConfig,
    ) -> Result<TimetableResponse, BahnError> {
        let url = format!("{}/angebote/fahrplan", self.base_url);
        let body = TimetableRequest {
            abfahrts_halt: origin.as_str(),
            anfrage_zeitpunkt: format_timestamp(&departure),
            ankunfts_halt: destination.as_str(),
            ankunft_suche: "ABFAHRT",
            klasse: SEARCH_CLASS,
            produktgattungen: &PRODUCT_CLASSES,
            reisende: vec![Traveller::adult(traveller)],
            schnelle_verbindungen: true,
            deutschland_ticket_vorhanden: traveller.flat_rate_pass,
        };

        trace!(%origin, %destination, %departure, "Searching timetable");
        self.send(self.http.post(&url).json(&body)).await
    }

    /// Look up a stored connection by its short id.
    pub async fn stored_connection(&self, vbid: &str) -> Result<StoredConnection, BahnError> {
        let url = format!("{}/angebote/verbindung/{}", self.base_url, vbid);
        self.send(self.http.get(&url)).await
    }

    /// Reconstruct a connection from its recon context.
    pub async fn recon(
        &self,
        ctx_recon: &str,
        traveller: &TravellerConfig,
    ) -> Result<TimetableResponse, BahnError> {
        let url = format!("{}/angebote/recon", self.base_url);
        let body = ReconRequest {
            klasse: SEARCH_CLASS,
            reisende: vec![Traveller::adult(traveller)],
            ctx_recon,
            deutschland_ticket_vorhanden: traveller.flat_rate_pass,
        };
        self.send(self.http.post(&url).json(&body)).await
    }

    /// Fetch the connection a link refers to.
    pub async fn fetch_journey(
        &self,
        journey: &JourneyRef,
        traveller: &TravellerConfig,
    ) -> Result<TimetableResponse, BahnError> {
        match journey {
            JourneyRef::Vbid(vbid) => {
                debug!(vbid, "Resolving stored connection");
                let stored = self.stored_connection(vbid).await?;
                let ctx = stored.hinfahrt_recon.ok_or(BahnError::MissingRecon)?;
                self.recon(&ctx, traveller).await
            }
            JourneyRef::Search {
                origin,
                destination,
                departure,
            } => {
                debug!(%origin, %destination, %departure, "Resolving searched connection");
                self.search(origin, destination, *departure, traveller).await
            }
        }
    }

    /// Send a request after waiting for the rate limiter, classifying the
    /// response status and decoding the body.
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, BahnError> {
        self.limiter.acquire().await;

        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_secs);
            return Err(BahnError::RateLimited { retry_after });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BahnError::ApiError {
                status: status.as_u16(),
                message: body.chars().take(500).collect(),
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| BahnError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(500).collect()),
        })
    }
}

impl PriceQuoter for BahnClient {
    async fn quote(
        &self,
        origin: &StationId,
        destination: &StationId,
        departure: NaiveDateTime,
        traveller: &TravellerConfig,
    ) -> Result<QuoteResult, QuoteError> {
        let response = self
            .search(origin, destination, departure, traveller)
            .await?;
        let quote = convert_quote(&response).map_err(BahnError::from)?;
        Ok(quote)
    }
}

impl ItineraryResolver for BahnClient {
    async fn resolve(
        &self,
        journey: &JourneyRef,
        traveller: &TravellerConfig,
    ) -> Result<ResolvedJourney, ResolveError> {
        let response = self.fetch_journey(journey, traveller).await?;
        let resolved = convert_journey(&response).map_err(BahnError::from)?;
        info!(
            stops = resolved.itinerary.len(),
            origin = %resolved.itinerary.origin().name,
            destination = %resolved.itinerary.destination().name,
            "Resolved journey"
        );
        Ok(resolved)
    }
}
