mod executor;
mod extractor;
mod handlers;
mod llm;
mod metrics;
mod pipeline;
mod prompt;
mod routes;
mod store;
mod validator;


use anyhow::Context;
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use taas_common::config::Config;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

use crate::executor::TestExecutor;
use crate::llm::GeminiGenerator;
use crate::pipeline::Pipeline;
use crate::store::TestFileStore;

pub struct AppState {
    pub pipeline: Pipeline,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    info!("TaaS API booting...");

    let config = Config::from_env().map_err(|e| {
        error!("Configuration error: {}", e);
        anyhow::anyhow!(e)
    })?;

    let generator = GeminiGenerator::new(
        config.gemini_api_key.clone(),
        config.gemini_model.clone(),
    )
    .context("Failed to build Gemini client")?;

    let store = TestFileStore::new(config.tests_dir.clone());
    let pipeline = Pipeline::new(Arc::new(generator), store.clone(), TestExecutor::new());

    info!("Tests directory: {}", config.tests_dir.display());
    info!("Generator model: {}", config.gemini_model);

    spawn_cleanup_task(store, &config);

    let state = Arc::new(AppState { pipeline });

    // Build router
    let app = Router::new()
        .merge(routes::routes())
        .layer(CorsLayer::permissive())
        .with_state(state);

    // Start server
    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    info!("HTTP server listening on {}", addr);
    info!("Ready to accept generation requests");

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

/// Hourly age-based sweep of the tests directory.
///
/// Best-effort by contract: a failed sweep is logged and the next tick tries
/// again, without ever touching in-flight generation requests.
fn spawn_cleanup_task(store: TestFileStore, config: &Config) {
    let max_age_ms = config.cleanup_max_age_ms();
    if max_age_ms == 0 {
        warn!("Cleanup disabled (CLEANUP_MAX_AGE_HOURS=0)");
        return;
    }

    info!(
        max_age_hours = config.cleanup_max_age_hours,
        "Cleanup sweeper enabled"
    );

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60 * 60));
        // First tick fires immediately and clears leftovers from before a restart.
        loop {
            interval.tick().await;
            let deleted = store.cleanup(max_age_ms).await;
            if deleted > 0 {
                metrics::CLEANUP_DELETIONS.inc_by(deleted as u64);
                info!(deleted, "Cleanup sweep removed stale test files");
            }
        }
    });
}
