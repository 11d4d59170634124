//! Runs the calculators over one scored resume and packs their outputs
//! into the additive response fields.
//!
//! Failures are isolated per field: if one calculator cannot produce its
//! field, the field is omitted with a warning and the rest of the response
//! still goes out. Only malformed input fails the whole request.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::AppError;
use crate::insight::benchmark::{BenchmarkComparison, BenchmarkTracker};
use crate::insight::calibration::CalibrationRules;
use crate::insight::feedback::{self, FeedbackReport};
use crate::insight::impact::ImpactModel;
use crate::insight::pass_probability::{self, PassProbabilityResult, PlatformCatalog};
use crate::insight::prioritizer::{self, PrioritizationResult};
use crate::models::score::{
    ExperienceLevel, Issue, KeywordDetails, ScoreBreakdown, ScoringMode, Severity,
};

// ────────────────────────────────────────────────────────────────────────────
// Wire contracts
// ────────────────────────────────────────────────────────────────────────────

/// One scored resume as produced by the upstream scorers, plus the context
/// the calculators need.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoreEnrichRequest {
    pub mode: ScoringMode,
    pub overall_score: f64,
    pub breakdown: ScoreBreakdown,
    #[serde(default)]
    pub issues: Vec<Issue>,
    #[serde(default)]
    pub auto_reject: bool,
    #[serde(default)]
    pub experience_level: ExperienceLevel,
    #[serde(default)]
    pub target_role: Option<String>,
    #[serde(default)]
    pub job_description: Option<String>,
    #[serde(default)]
    pub keyword_details: Option<KeywordDetails>,
    #[serde(default)]
    pub top_n: Option<usize>,
}

/// Additive fields attached to an existing score response. Every field is
/// optional so older consumers keep working; field names match what the
/// downstream clients already read.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreEnrichment {
    #[serde(
        rename = "prioritizedSuggestions",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub prioritized_suggestions: Option<PrioritizationResult>,
    #[serde(
        rename = "passProbability",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub pass_probability: Option<PassProbabilityResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enhanced_feedback: Option<FeedbackReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub benchmark_data: Option<BenchmarkComparison>,
}

// ────────────────────────────────────────────────────────────────────────────
// Engine
// ────────────────────────────────────────────────────────────────────────────

/// Owns the static configuration and the benchmark tracker, and runs the
/// full enrichment flow. One engine is built at startup and shared.
pub struct EnrichmentEngine {
    model: Arc<ImpactModel>,
    calibration: Arc<CalibrationRules>,
    platforms: Arc<PlatformCatalog>,
    benchmarks: Arc<BenchmarkTracker>,
    default_top_n: usize,
}

impl EnrichmentEngine {
    pub fn new(
        model: Arc<ImpactModel>,
        calibration: Arc<CalibrationRules>,
        platforms: Arc<PlatformCatalog>,
        benchmarks: Arc<BenchmarkTracker>,
        default_top_n: usize,
    ) -> Self {
        EnrichmentEngine {
            model,
            calibration,
            platforms,
            benchmarks,
            default_top_n,
        }
    }

    /// Runs calibration, prioritization, pass probability, benchmark
    /// comparison, and feedback over one request.
    ///
    /// Ordering matters in two places: the benchmark comparison reads the
    /// history before this score is recorded into it, and feedback consumes
    /// whatever the earlier stages produced.
    pub fn enrich(&self, request: &ScoreEnrichRequest) -> Result<ScoreEnrichment, AppError> {
        validate_request(request)?;
        let level = request.experience_level;

        let calibrated = self
            .calibration
            .calibrate_breakdown(&request.breakdown, level)?;

        let prioritization: Option<PrioritizationResult> = match prioritizer::prioritize(
            &self.model,
            &request.issues,
            request.top_n.unwrap_or(self.default_top_n),
        ) {
            Ok(result) => Some(result),
            Err(err) => {
                warn!("omitting prioritized suggestions: {err}");
                None
            }
        };

        let pass_probability = if request.mode.is_ats() {
            let critical_issues: Vec<Issue> = request
                .issues
                .iter()
                .filter(|issue| issue.severity == Severity::Critical)
                .cloned()
                .collect();
            match pass_probability::calculate(
                &self.platforms,
                request.overall_score,
                &calibrated,
                request.auto_reject,
                &critical_issues,
                request.keyword_details.as_ref(),
                request.job_description.as_deref(),
            ) {
                Ok(result) => Some(result),
                Err(err) => {
                    warn!("omitting pass probability: {err}");
                    None
                }
            }
        } else {
            None
        };

        let benchmark_data = self.benchmark_field(request, level);

        let enhanced_feedback = prioritization.as_ref().map(|prioritization| {
            feedback::generate(
                &self.model,
                prioritization,
                &calibrated,
                benchmark_data.as_ref(),
                level,
            )
        });

        Ok(ScoreEnrichment {
            prioritized_suggestions: prioritization,
            pass_probability,
            enhanced_feedback,
            benchmark_data,
        })
    }

    /// Compare against history first, then record this score, so a resume
    /// never shifts its own percentile. A failed record keeps the already
    /// computed comparison.
    fn benchmark_field(
        &self,
        request: &ScoreEnrichRequest,
        level: ExperienceLevel,
    ) -> Option<BenchmarkComparison> {
        let role = request
            .target_role
            .as_deref()
            .map(str::trim)
            .filter(|role| !role.is_empty())?;

        let comparison = match self.benchmarks.compare(role, level, request.overall_score) {
            Ok(comparison) => comparison,
            Err(err) => {
                warn!("omitting benchmark data: {err}");
                return None;
            }
        };
        if let Err(err) = self.benchmarks.record(role, level, request.overall_score) {
            warn!("benchmark history not updated: {err}");
        }
        Some(comparison)
    }
}

fn validate_request(request: &ScoreEnrichRequest) -> Result<(), AppError> {
    if !(0.0..=100.0).contains(&request.overall_score) {
        return Err(AppError::Validation(format!(
            "overall_score {} is outside [0, 100]",
            request.overall_score
        )));
    }
    for (section, entry) in &request.breakdown {
        if entry.max_score <= 0.0 {
            return Err(AppError::Validation(format!(
                "Section '{section}' has non-positive max score {}",
                entry.max_score
            )));
        }
        if entry.score < 0.0 || entry.score > entry.max_score {
            return Err(AppError::Validation(format!(
                "Section '{section}' score {} is outside [0, {}]",
                entry.score, entry.max_score
            )));
        }
    }
    Ok(())
}
