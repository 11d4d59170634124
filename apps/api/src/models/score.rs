//! Types the upstream resume scorer sends us.
//!
//! Everything here is read-only input: the parser and section scorers live in
//! another service and this API only enriches what they produced. Wire names
//! follow the existing score response (`maxScore` stays camelCase).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Severity attached to an issue by the upstream scorers.
///
/// `Unknown` captures any wire value outside the documented set; it carries a
/// neutral ×1.0 impact multiplier rather than failing the request (the
/// category tag, by contrast, is strict; see `insight::impact`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    High,
    Warning,
    Medium,
    Suggestion,
    Low,
    Info,
    #[serde(other)]
    Unknown,
}

/// A single issue detected by the upstream scorers. Immutable input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub id: String,
    /// Category tag, e.g. "keyword" / "formatting" / "content" / "minor".
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: Severity,
    pub title: String,
    pub description: String,
}

/// One section of the upstream score breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionScore {
    pub score: f64,
    #[serde(rename = "maxScore")]
    pub max_score: f64,
    #[serde(default)]
    pub issues: Vec<String>,
}

/// Section name → section score, as produced upstream. BTreeMap keeps the
/// serialized order deterministic for the idempotence guarantee.
pub type ScoreBreakdown = BTreeMap<String, SectionScore>;

/// Operating mode requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMode {
    AtsSimulation,
    QualityCoach,
}

impl ScoringMode {
    /// Pass probability is only computed for ATS modes.
    pub fn is_ats(self) -> bool {
        matches!(self, ScoringMode::AtsSimulation)
    }
}

/// Candidate experience level. Drives calibration multipliers and the
/// benchmark population key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    Entry,
    #[default]
    Mid,
    Senior,
    Lead,
    Executive,
}

impl ExperienceLevel {
    /// Human-readable label used in templated messages.
    pub fn label(self) -> &'static str {
        match self {
            ExperienceLevel::Entry => "entry",
            ExperienceLevel::Mid => "mid",
            ExperienceLevel::Senior => "senior",
            ExperienceLevel::Lead => "lead",
            ExperienceLevel::Executive => "executive",
        }
    }
}

/// Optional keyword-match statistics from the upstream keyword scorer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeywordDetails {
    pub match_rate: Option<f64>,
}
