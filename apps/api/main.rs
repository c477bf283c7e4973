use anyhow::{Context, Result};
use dotenv::dotenv;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use utils::tracing::run_with_tracing;

use govhub_api::{
    config,
    routes::{AppState, router},
    store::{self, DbPostStore},
    subsquid::SubsquidClient,
    summary::HttpSummaryService,
};

#[tokio::main]
async fn main() {
    dotenv().ok();
    run_with_tracing(run).await;
}

async fn run() -> Result<()> {
    config::load()?;
    let config = config::get_config();

    info!("Governance API service starting up");

    let database_url =
        std::env::var("DATABASE_URL").context(utils::errors::DATABASE_URL_NOT_SET)?;
    let conn = store::connect(&database_url).await?;
    info!("Database connection established");

    let state = AppState {
        subsquid: Arc::new(SubsquidClient::new(config.subsquid.endpoints.clone())),
        posts: Arc::new(DbPostStore::new(conn)),
        summaries: Arc::new(HttpSummaryService::new(config.summary.endpoint.clone())),
    };

    let app = router(state);
    let listener = TcpListener::bind(&config.server.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.listen_addr))?;
    info!(address = %listener.local_addr()?, "Listening for requests");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Application shutting down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
}
