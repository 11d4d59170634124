use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::insight::benchmark::BenchmarkComparison;
use crate::insight::enrichment::{ScoreEnrichRequest, ScoreEnrichment};
use crate::models::score::ExperienceLevel;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct BenchmarkRecordRequest {
    pub role: String,
    #[serde(default)]
    pub level: ExperienceLevel,
    pub score: f64,
}

#[derive(Serialize)]
pub struct BenchmarkRecordResponse {
    pub id: Uuid,
    pub role: String,
    pub level: ExperienceLevel,
    pub score: f64,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct BenchmarkCompareParams {
    pub role: String,
    #[serde(default)]
    pub level: ExperienceLevel,
    pub score: f64,
}

#[derive(Serialize)]
pub struct PlatformInfo {
    pub id: String,
    pub name: String,
    pub difficulty: f64,
    pub format_weight: f64,
    pub market_share: f64,
}

#[derive(Serialize)]
pub struct PlatformListResponse {
    pub platforms: Vec<PlatformInfo>,
}

/// POST /api/v1/score/enrich
pub async fn handle_score_enrich(
    State(state): State<AppState>,
    Json(req): Json<ScoreEnrichRequest>,
) -> Result<Json<ScoreEnrichment>, AppError> {
    let enrichment = state.engine.enrich(&req)?;
    Ok(Json(enrichment))
}

/// POST /api/v1/benchmarks
pub async fn handle_benchmark_record(
    State(state): State<AppState>,
    Json(req): Json<BenchmarkRecordRequest>,
) -> Result<Json<BenchmarkRecordResponse>, AppError> {
    let record = state.benchmarks.record(&req.role, req.level, req.score)?;
    Ok(Json(BenchmarkRecordResponse {
        id: record.id,
        role: req.role,
        level: req.level,
        score: record.score,
        recorded_at: record.recorded_at,
    }))
}

/// GET /api/v1/benchmarks/compare?role=...&level=...&score=...
pub async fn handle_benchmark_compare(
    State(state): State<AppState>,
    Query(params): Query<BenchmarkCompareParams>,
) -> Result<Json<BenchmarkComparison>, AppError> {
    let comparison = state
        .benchmarks
        .compare(&params.role, params.level, params.score)?;
    Ok(Json(comparison))
}

/// GET /api/v1/platforms
pub async fn handle_platforms(State(state): State<AppState>) -> Json<PlatformListResponse> {
    let platforms = state
        .platforms
        .all()
        .iter()
        .map(|platform| PlatformInfo {
            id: platform.id.to_string(),
            name: platform.display_name.to_string(),
            difficulty: platform.difficulty,
            format_weight: platform.format_weight,
            market_share: platform.market_share,
        })
        .collect();
    Json(PlatformListResponse { platforms })
}
