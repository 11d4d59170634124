//! Static configuration mapping issue categories and severities to
//! numeric weights.
//!
//! All numbers live in the tables built by `ImpactModel::standard()`, loaded
//! once at startup and shared through `AppState`. Changing a weight, adding a
//! category alias, or re-tuning a multiplier is a data change here, never a
//! structural change in the calculators.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::score::Severity;

/// Broad impact category an issue falls into. Each carries a fixed base
/// weight in the model's table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactCategory {
    AtsRejection,
    KeywordMatch,
    Formatting,
    ContentQuality,
    Minor,
}

/// Multiplier applied when an issue's severity is outside the documented set.
/// The category tag is strict (`ConfigurationError`), severity is not: an
/// unknown severity keeps the issue in the ranking at face value.
const DEFAULT_SEVERITY_MULTIPLIER: f64 = 1.0;

/// Immutable weight configuration for the Suggestion Prioritizer.
#[derive(Debug, Clone)]
pub struct ImpactModel {
    base_weights: Vec<(ImpactCategory, f64)>,
    severity_multipliers: Vec<(Severity, f64)>,
    category_aliases: Vec<(&'static str, ImpactCategory)>,
}

impl ImpactModel {
    /// The standard production model.
    ///
    /// Base weights are sized so the priority thresholds in the prioritizer
    /// (≥150 critical, ≥80 important) split naturally: a critical keyword
    /// issue lands at 100 × 3.0 = 300, a formatting warning at 60 × 1.5 = 90.
    pub fn standard() -> Self {
        ImpactModel {
            base_weights: vec![
                (ImpactCategory::AtsRejection, 200.0),
                (ImpactCategory::KeywordMatch, 100.0),
                (ImpactCategory::Formatting, 60.0),
                (ImpactCategory::ContentQuality, 40.0),
                (ImpactCategory::Minor, 15.0),
            ],
            severity_multipliers: vec![
                (Severity::Critical, 3.0),
                (Severity::High, 2.0),
                (Severity::Warning, 1.5),
                (Severity::Medium, 1.2),
                (Severity::Suggestion, 1.0),
                (Severity::Low, 0.8),
                (Severity::Info, 0.5),
            ],
            category_aliases: vec![
                ("ats", ImpactCategory::AtsRejection),
                ("ats_rejection", ImpactCategory::AtsRejection),
                ("keyword", ImpactCategory::KeywordMatch),
                ("keywords", ImpactCategory::KeywordMatch),
                ("formatting", ImpactCategory::Formatting),
                ("format", ImpactCategory::Formatting),
                ("layout", ImpactCategory::Formatting),
                ("content", ImpactCategory::ContentQuality),
                ("content_quality", ImpactCategory::ContentQuality),
                ("minor", ImpactCategory::Minor),
                ("style", ImpactCategory::Minor),
            ],
        }
    }

    /// Resolves an upstream category tag to its impact category.
    ///
    /// Tags are matched case-insensitively after trimming. An unrecognized
    /// tag is a `ConfigurationError`; there is no default category.
    pub fn category_for(&self, tag: &str) -> Result<ImpactCategory, AppError> {
        let normalized = tag.trim().to_lowercase();
        self.category_aliases
            .iter()
            .find(|(alias, _)| *alias == normalized)
            .map(|(_, category)| *category)
            .ok_or_else(|| {
                AppError::Configuration(format!(
                    "Unrecognized issue category tag '{tag}': no impact weight configured"
                ))
            })
    }

    /// Base impact weight for a category. `standard()` covers every variant;
    /// a model built with a gap surfaces it as a `ConfigurationError`.
    pub fn base_weight(&self, category: ImpactCategory) -> Result<f64, AppError> {
        self.base_weights
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, w)| *w)
            .ok_or_else(|| {
                AppError::Configuration(format!(
                    "No base impact weight configured for category {category:?}"
                ))
            })
    }

    /// Severity multiplier, falling back to ×1.0 for severities the table
    /// does not carry (including `Severity::Unknown`).
    pub fn severity_multiplier(&self, severity: Severity) -> f64 {
        self.severity_multipliers
            .iter()
            .find(|(s, _)| *s == severity)
            .map(|(_, m)| *m)
            .unwrap_or(DEFAULT_SEVERITY_MULTIPLIER)
    }

    /// Categories in descending base-weight order. Drives the category order
    /// of grouped suggestion lists in feedback.
    pub fn categories_by_weight(&self) -> Vec<ImpactCategory> {
        let mut weighted = self.base_weights.clone();
        weighted.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        weighted.into_iter().map(|(c, _)| c).collect()
    }
}

/// Short imperative call-to-action shown next to a prioritized issue.
pub fn action_cta(category: ImpactCategory) -> &'static str {
    match category {
        ImpactCategory::AtsRejection => "Resolve the automatic-rejection trigger before submitting",
        ImpactCategory::KeywordMatch => "Work the missing keywords into your experience bullets",
        ImpactCategory::Formatting => "Simplify the formatting so parsers read every line",
        ImpactCategory::ContentQuality => "Rewrite weak bullets with quantified outcomes",
        ImpactCategory::Minor => "Tidy this up once the bigger fixes are done",
    }
}
