mod config;
mod errors;
mod insight;
mod models;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::insight::benchmark::{BenchmarkTracker, InMemoryBenchmarkStore};
use crate::insight::calibration::CalibrationRules;
use crate::insight::enrichment::EnrichmentEngine;
use crate::insight::impact::ImpactModel;
use crate::insight::pass_probability::PlatformCatalog;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Scorecard API v{}", env!("CARGO_PKG_VERSION"));

    // Static configuration tables, loaded once and shared
    let model = Arc::new(ImpactModel::standard());
    let calibration = Arc::new(CalibrationRules::standard());
    let platforms = Arc::new(PlatformCatalog::standard());

    // Benchmark history (process-local; history resets on restart)
    let benchmarks = Arc::new(BenchmarkTracker::new(Arc::new(
        InMemoryBenchmarkStore::new(),
    )));
    info!("Benchmark tracker initialized (in-memory store)");

    let engine = Arc::new(EnrichmentEngine::new(
        model,
        calibration,
        Arc::clone(&platforms),
        Arc::clone(&benchmarks),
        config.default_top_n,
    ));

    // Build app state
    let state = AppState {
        config: config.clone(),
        engine,
        benchmarks,
        platforms,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
