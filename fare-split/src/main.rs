use std::error::Error;

use tracing::info;
use tracing_subscriber::EnvFilter;

use fare_split::bahn::BahnClient;
use fare_split::booking::TicketPlanFormatter;
use fare_split::config::AppConfig;
use fare_split::web::{AppState, create_router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;

    let bahn = BahnClient::new(config.bahn.clone())?;
    let state = AppState::new(
        bahn,
        config.build.clone(),
        TicketPlanFormatter::default(),
        config.analysis_timeout,
    );
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!(
        addr = %config.listen_addr,
        base_url = %config.bahn.base_url,
        concurrency = config.build.effective_concurrency(),
        "Fare split server listening"
    );
    info!("  GET  /health - Health check");
    info!("  POST /split  - Analyse a journey link");

    axum::serve(listener, app).await?;
    Ok(())
}
