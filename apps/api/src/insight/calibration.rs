//! Recalibrates raw section scores for the candidate's experience level.
//!
//! Raw scorers grade every resume against the same bar. These rules bend
//! that bar: entry-level candidates lose less for missing achievements,
//! executives are expected to show far more of them. The calculation is
//! pure; the tables in `CalibrationRules::standard()` are the whole policy.

use crate::errors::AppError;
use crate::models::score::{ExperienceLevel, ScoreBreakdown};

// ────────────────────────────────────────────────────────────────────────────
// Rule tables
// ────────────────────────────────────────────────────────────────────────────

/// How one experience level shifts scoring.
///
/// `penalty_multiplier` scales deductions (below 1.0 softens them, above 1.0
/// sharpens them). `achievement_expectation` divides achievement-driven
/// section scores, so a senior profile must over-deliver to hold the same
/// number an entry profile gets for baseline content.
#[derive(Debug, Clone, Copy)]
pub struct LevelProfile {
    pub penalty_multiplier: f64,
    pub achievement_expectation: f64,
}

/// Per-section calibration behavior.
#[derive(Debug, Clone, Copy)]
pub struct SectionRule {
    /// How much of the level's penalty shift applies to this section.
    pub penalty_weight: f64,
    /// Whether the section's score reflects achievements rather than
    /// mechanical completeness.
    pub achievement_driven: bool,
}

/// Immutable calibration policy, loaded once and shared through `AppState`.
#[derive(Debug, Clone)]
pub struct CalibrationRules {
    profiles: Vec<(ExperienceLevel, LevelProfile)>,
    section_rules: Vec<(&'static str, SectionRule)>,
    default_rule: SectionRule,
}

impl CalibrationRules {
    /// The standard production policy.
    pub fn standard() -> Self {
        CalibrationRules {
            profiles: vec![
                (
                    ExperienceLevel::Entry,
                    LevelProfile {
                        penalty_multiplier: 0.80,
                        achievement_expectation: 0.70,
                    },
                ),
                (
                    ExperienceLevel::Mid,
                    LevelProfile {
                        penalty_multiplier: 1.00,
                        achievement_expectation: 1.00,
                    },
                ),
                (
                    ExperienceLevel::Senior,
                    LevelProfile {
                        penalty_multiplier: 1.15,
                        achievement_expectation: 1.25,
                    },
                ),
                (
                    ExperienceLevel::Lead,
                    LevelProfile {
                        penalty_multiplier: 1.25,
                        achievement_expectation: 1.50,
                    },
                ),
                (
                    ExperienceLevel::Executive,
                    LevelProfile {
                        penalty_multiplier: 1.40,
                        achievement_expectation: 1.75,
                    },
                ),
            ],
            section_rules: vec![
                (
                    "summary",
                    SectionRule {
                        penalty_weight: 0.5,
                        achievement_driven: false,
                    },
                ),
                (
                    "experience",
                    SectionRule {
                        penalty_weight: 1.0,
                        achievement_driven: true,
                    },
                ),
                (
                    "education",
                    SectionRule {
                        penalty_weight: 0.4,
                        achievement_driven: false,
                    },
                ),
                (
                    "skills",
                    SectionRule {
                        penalty_weight: 0.6,
                        achievement_driven: false,
                    },
                ),
                (
                    "projects",
                    SectionRule {
                        penalty_weight: 0.8,
                        achievement_driven: true,
                    },
                ),
                (
                    "formatting",
                    SectionRule {
                        penalty_weight: 0.2,
                        achievement_driven: false,
                    },
                ),
                (
                    "keywords",
                    SectionRule {
                        penalty_weight: 0.5,
                        achievement_driven: false,
                    },
                ),
            ],
            // Sections the table does not know calibrate mildly. Unlike issue
            // category tags, an unlisted section name is expected input.
            default_rule: SectionRule {
                penalty_weight: 0.5,
                achievement_driven: false,
            },
        }
    }

    fn profile(&self, level: ExperienceLevel) -> Result<LevelProfile, AppError> {
        self.profiles
            .iter()
            .find(|(l, _)| *l == level)
            .map(|(_, p)| *p)
            .ok_or_else(|| {
                AppError::Configuration(format!(
                    "No calibration profile configured for experience level {level:?}"
                ))
            })
    }

    fn rule_for(&self, section: &str) -> SectionRule {
        let normalized = section.trim().to_lowercase();
        self.section_rules
            .iter()
            .find(|(name, _)| *name == normalized)
            .map(|(_, rule)| *rule)
            .unwrap_or(self.default_rule)
    }

    /// Recalibrates one section score for the given experience level.
    ///
    /// Steps: scale the deduction (`max − raw`) by the level's penalty
    /// multiplier, weighted per section; divide achievement-driven sections
    /// by the level's achievement expectation; clamp into `[0, max]`; round
    /// to one decimal. `max` must be positive and `raw` within `[0, max]`.
    pub fn calibrate_section_score(
        &self,
        section: &str,
        raw: f64,
        max: f64,
        level: ExperienceLevel,
    ) -> Result<f64, AppError> {
        if max <= 0.0 {
            return Err(AppError::Validation(format!(
                "Section '{section}' has non-positive max score {max}"
            )));
        }
        if raw < 0.0 || raw > max {
            return Err(AppError::Validation(format!(
                "Section '{section}' score {raw} is outside [0, {max}]"
            )));
        }

        let profile = self.profile(level)?;
        let rule = self.rule_for(section);

        let deduction = max - raw;
        let effective_multiplier = 1.0 + (profile.penalty_multiplier - 1.0) * rule.penalty_weight;
        let mut calibrated = max - deduction * effective_multiplier;
        if rule.achievement_driven {
            calibrated /= profile.achievement_expectation;
        }

        Ok(round1(calibrated.clamp(0.0, max)))
    }

    /// Calibrates every section in a breakdown, preserving max scores and
    /// attached issue ids.
    pub fn calibrate_breakdown(
        &self,
        breakdown: &ScoreBreakdown,
        level: ExperienceLevel,
    ) -> Result<ScoreBreakdown, AppError> {
        let mut calibrated = ScoreBreakdown::new();
        for (section, entry) in breakdown {
            let mut adjusted = entry.clone();
            adjusted.score =
                self.calibrate_section_score(section, entry.score, entry.max_score, level)?;
            calibrated.insert(section.clone(), adjusted);
        }
        Ok(calibrated)
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
