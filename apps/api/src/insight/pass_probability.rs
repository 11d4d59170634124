//! Estimates the chance a resume clears automated screening, overall and
//! per ATS platform.
//!
//! Pure calculation over the caller's arguments and the static platform
//! catalog. Nothing here is cached; every call recomputes from scratch.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::score::{Issue, KeywordDetails, ScoreBreakdown};

// ────────────────────────────────────────────────────────────────────────────
// Platform catalog
// ────────────────────────────────────────────────────────────────────────────

/// Static screening profile for one applicant tracking system.
///
/// `difficulty` scales every estimate down toward the platform's observed
/// strictness. `format_weight` is how much of the platform's decision rides
/// on parseable formatting rather than the overall score.
#[derive(Debug, Clone, Serialize)]
pub struct AtsPlatform {
    pub id: &'static str,
    pub display_name: &'static str,
    pub difficulty: f64,
    pub format_weight: f64,
    pub market_share: f64,
}

/// The set of platforms estimates are produced for. Adding a platform is a
/// table edit here, nothing else changes.
#[derive(Debug, Clone)]
pub struct PlatformCatalog {
    platforms: Vec<AtsPlatform>,
}

impl PlatformCatalog {
    pub fn standard() -> Self {
        PlatformCatalog {
            platforms: vec![
                AtsPlatform {
                    id: "workday",
                    display_name: "Workday",
                    difficulty: 0.85,
                    format_weight: 0.4,
                    market_share: 0.30,
                },
                AtsPlatform {
                    id: "taleo",
                    display_name: "Oracle Taleo",
                    difficulty: 0.75,
                    format_weight: 0.5,
                    market_share: 0.20,
                },
                AtsPlatform {
                    id: "greenhouse",
                    display_name: "Greenhouse",
                    difficulty: 0.95,
                    format_weight: 0.25,
                    market_share: 0.15,
                },
                AtsPlatform {
                    id: "lever",
                    display_name: "Lever",
                    difficulty: 0.95,
                    format_weight: 0.2,
                    market_share: 0.10,
                },
                AtsPlatform {
                    id: "icims",
                    display_name: "iCIMS",
                    difficulty: 0.85,
                    format_weight: 0.35,
                    market_share: 0.15,
                },
            ],
        }
    }

    pub fn all(&self) -> &[AtsPlatform] {
        &self.platforms
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Result types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassStatus {
    Good,
    Fair,
    Poor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorCode {
    Green,
    Yellow,
    Red,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    High,
    Moderate,
    Low,
}

/// One platform's independent estimate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformEstimate {
    pub probability: f64,
    pub status: PassStatus,
}

/// Full pass-probability estimate. `overall_probability` is the adjusted
/// base, not an average of the platform figures: platforms weight format
/// differently and are reported as independent estimates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassProbabilityResult {
    pub overall_probability: f64,
    pub platform_breakdown: BTreeMap<String, PlatformEstimate>,
    pub confidence_level: ConfidenceLevel,
    pub interpretation: String,
    pub color_code: ColorCode,
    pub based_on_score: f64,
}

// ────────────────────────────────────────────────────────────────────────────
// Calculation
// ────────────────────────────────────────────────────────────────────────────

/// Status and color share these cutoffs so the two never disagree.
const GOOD_THRESHOLD: f64 = 80.0;
const FAIR_THRESHOLD: f64 = 60.0;

fn base_probability(score: f64) -> f64 {
    if score >= 90.0 {
        95.0
    } else if score >= 80.0 {
        85.0
    } else if score >= 70.0 {
        70.0
    } else if score >= 60.0 {
        55.0
    } else if score >= 50.0 {
        35.0
    } else {
        15.0
    }
}

fn status_for(probability: f64) -> PassStatus {
    if probability >= GOOD_THRESHOLD {
        PassStatus::Good
    } else if probability >= FAIR_THRESHOLD {
        PassStatus::Fair
    } else {
        PassStatus::Poor
    }
}

fn color_for(probability: f64) -> ColorCode {
    if probability >= GOOD_THRESHOLD {
        ColorCode::Green
    } else if probability >= FAIR_THRESHOLD {
        ColorCode::Yellow
    } else {
        ColorCode::Red
    }
}

fn interpretation_for(probability: f64, confidence: ConfidenceLevel) -> String {
    let outlook = if probability >= GOOD_THRESHOLD {
        "Most applicant tracking systems should pass this resume through to a recruiter"
    } else if probability >= FAIR_THRESHOLD {
        "This resume will clear some tracking systems but may stall in stricter ones"
    } else {
        "Most tracking systems are likely to filter this resume out before a person sees it"
    };
    let qualifier = match confidence {
        ConfidenceLevel::High => "high confidence, scored against the provided job description",
        ConfidenceLevel::Moderate => "moderate confidence",
        ConfidenceLevel::Low => "low confidence, estimated from the resume score alone",
    };
    format!("{outlook} ({qualifier}).")
}

/// Estimates pass probability from an overall score and its context.
///
/// The base probability comes from a fixed bucket table over the score.
/// Auto-reject multiplies it by 0.3; each critical issue multiplies by 0.95
/// (compounding). Platform figures blend the adjusted base with the
/// formatting sub-score by each platform's format weight, scaled by its
/// difficulty. When the breakdown has no usable formatting section the
/// adjusted base stands in for the format score.
pub fn calculate(
    catalog: &PlatformCatalog,
    overall_score: f64,
    breakdown: &ScoreBreakdown,
    auto_reject: bool,
    critical_issues: &[Issue],
    keyword_details: Option<&KeywordDetails>,
    job_description: Option<&str>,
) -> Result<PassProbabilityResult, AppError> {
    if !(0.0..=100.0).contains(&overall_score) {
        return Err(AppError::Validation(format!(
            "overall_score {overall_score} is outside [0, 100]"
        )));
    }

    let mut adjusted = base_probability(overall_score);
    if auto_reject {
        adjusted *= 0.3;
    }
    for _ in critical_issues {
        adjusted *= 0.95;
    }
    let adjusted = adjusted.clamp(0.0, 100.0);

    let format_score = breakdown
        .get("formatting")
        .filter(|section| section.max_score > 0.0)
        .map(|section| section.score / section.max_score * 100.0)
        .unwrap_or(adjusted);

    let mut platform_breakdown = BTreeMap::new();
    for platform in catalog.all() {
        let blended = adjusted * (1.0 - platform.format_weight) + format_score * platform.format_weight;
        let probability = round1((blended * platform.difficulty).clamp(0.0, 100.0));
        platform_breakdown.insert(
            platform.id.to_string(),
            PlatformEstimate {
                probability,
                status: status_for(probability),
            },
        );
    }

    let has_match_rate = keyword_details.and_then(|k| k.match_rate).is_some();
    let has_job_description = job_description.is_some_and(|jd| !jd.trim().is_empty());
    let confidence_level = if has_job_description && has_match_rate && format_score >= 80.0 {
        ConfidenceLevel::High
    } else if has_job_description || format_score >= 70.0 {
        ConfidenceLevel::Moderate
    } else {
        ConfidenceLevel::Low
    };

    let overall_probability = round1(adjusted);
    Ok(PassProbabilityResult {
        overall_probability,
        interpretation: interpretation_for(overall_probability, confidence_level),
        color_code: color_for(overall_probability),
        confidence_level,
        platform_breakdown,
        based_on_score: overall_score,
    })
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
