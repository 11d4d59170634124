pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::insight::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Score enrichment
        .route("/api/v1/score/enrich", post(handlers::handle_score_enrich))
        // Benchmark history
        .route("/api/v1/benchmarks", post(handlers::handle_benchmark_record))
        .route(
            "/api/v1/benchmarks/compare",
            get(handlers::handle_benchmark_compare),
        )
        // Platform catalog
        .route("/api/v1/platforms", get(handlers::handle_platforms))
        .with_state(state)
}
