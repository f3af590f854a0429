//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use tracing::{debug, info, warn};

use crate::analysis::{SplitAnalyzer, SplitError};
use crate::domain::{BahnCard, TravellerConfig};
use crate::graph::{CancelToken, Progress};
use crate::link::JourneyRef;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/split", post(split_journey))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Analyse a shared journey for a cheaper combination of tickets.
async fn split_journey(
    State(state): State<AppState>,
    Json(req): Json<SplitRequest>,
) -> Result<Json<SplitResponse>, AppError> {
    let journey = JourneyRef::parse(&req.link).map_err(|e| AppError::BadRequest {
        message: format!("Invalid link: {e}"),
    })?;

    let bahncard = req
        .bahncard
        .as_deref()
        .filter(|token| !token.trim().is_empty())
        .map(str::parse::<BahnCard>)
        .transpose()
        .map_err(|e| AppError::BadRequest {
            message: e.to_string(),
        })?;

    let traveller = TravellerConfig {
        bahncard,
        flat_rate_pass: req.flat_rate_pass,
    };

    let cancel = CancelToken::new();
    let _deadline = cancel.cancel_after(state.analysis_timeout);
    let log_progress = |p: Progress| debug!(processed = p.processed, total = p.total, "Quoted pair");

    let analysis = SplitAnalyzer::new(state.bahn.as_ref(), state.bahn.as_ref(), &state.build)
        .analyse(&journey, &traveller, &log_progress, &cancel)
        .await?;

    info!(
        split = analysis.optimization.is_split(),
        savings = %analysis.optimization.savings(),
        "Split request answered"
    );

    Ok(Json(SplitResponse::from_analysis(
        &analysis,
        &state.formatter,
        &traveller,
    )))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    Upstream { message: String },
    Unprocessable { message: String },
    Timeout { message: String },
    Internal { message: String },
}

impl From<SplitError> for AppError {
    fn from(e: SplitError) -> Self {
        let message = e.to_string();
        match e {
            SplitError::Resolve(_) => AppError::Upstream { message },
            SplitError::NoBaselinePrice => AppError::Unprocessable { message },
            SplitError::Cancelled => AppError::Timeout { message },
            SplitError::InvalidPlan(_) => AppError::Internal { message },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::Upstream { message } => (StatusCode::BAD_GATEWAY, message),
            AppError::Unprocessable { message } => (StatusCode::UNPROCESSABLE_ENTITY, message),
            AppError::Timeout { message } => (StatusCode::GATEWAY_TIMEOUT, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        warn!(%status, %message, "Request failed");

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ResolveError;
    use crate::bahn::{BahnClient, BahnConfig};
    use crate::booking::TicketPlanFormatter;
    use crate::domain::DomainError;
    use crate::graph::BuildConfig;
    use std::time::Duration;

    fn state() -> AppState {
        // Unroutable base URL; these tests never reach the network
        let bahn = BahnClient::new(BahnConfig::new().with_base_url("http://127.0.0.1:9")).unwrap();
        AppState::new(
            bahn,
            BuildConfig::default(),
            TicketPlanFormatter::default(),
            Duration::from_secs(5),
        )
    }

    fn request(link: &str, bahncard: Option<&str>) -> Json<SplitRequest> {
        Json(SplitRequest {
            link: link.to_string(),
            bahncard: bahncard.map(str::to_string),
            flat_rate_pass: false,
        })
    }

    #[tokio::test]
    async fn router_accepts_split_handler() {
        let _router: Router = create_router(state());
    }

    #[tokio::test]
    async fn health_is_ok() {
        assert_eq!(health().await, "ok");
    }

    #[tokio::test]
    async fn invalid_link_is_bad_request() {
        let err = split_journey(State(state()), request("not a link", None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest { .. }));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn invalid_bahncard_is_bad_request() {
        let err = split_journey(
            State(state()),
            request("https://www.bahn.de/buchung/start?vbid=abc", Some("BC75_2")),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest { .. }));
    }

    #[test]
    fn split_errors_map_to_status_codes() {
        let status = |e: SplitError| AppError::from(e).into_response().status();

        assert_eq!(
            status(SplitError::Resolve(ResolveError::NotFound("x".into()))),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status(SplitError::NoBaselinePrice),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(status(SplitError::Cancelled), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(
            status(SplitError::InvalidPlan(DomainError::EmptyPlan)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
