use std::sync::Arc;

use crate::config::Config;
use crate::insight::benchmark::BenchmarkTracker;
use crate::insight::enrichment::EnrichmentEngine;
use crate::insight::pass_probability::PlatformCatalog;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Startup configuration, kept for handlers that need runtime settings.
    #[allow(dead_code)]
    pub config: Config,
    /// Runs the full enrichment flow; holds the static weight tables.
    pub engine: Arc<EnrichmentEngine>,
    /// Benchmark history, shared with the engine so direct recording and
    /// enrichment-time recording land in the same store.
    pub benchmarks: Arc<BenchmarkTracker>,
    pub platforms: Arc<PlatformCatalog>,
}
