//! Application state for the web layer.

use std::sync::Arc;
use std::time::Duration;

use crate::bahn::BahnClient;
use crate::booking::TicketPlanFormatter;
use crate::graph::BuildConfig;

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// bahn.de API client, shared by every analysis so they share one
    /// rate limiter
    pub bahn: Arc<BahnClient>,

    /// Price graph construction settings
    pub build: Arc<BuildConfig>,

    /// Booking link formatter
    pub formatter: Arc<TicketPlanFormatter>,

    /// Upper bound on one analysis
    pub analysis_timeout: Duration,
}

impl AppState {
    /// Create a new app state.
    pub fn new(
        bahn: BahnClient,
        build: BuildConfig,
        formatter: TicketPlanFormatter,
        analysis_timeout: Duration,
    ) -> Self {
        Self {
            bahn: Arc::new(bahn),
            build: Arc::new(build),
            formatter: Arc::new(formatter),
            analysis_timeout,
        }
    }
}
