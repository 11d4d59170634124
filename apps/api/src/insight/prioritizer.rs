//! Ranks raw scoring issues by modeled impact.
//!
//! Pure calculation: `(category weight × severity multiplier)` per issue,
//! descending sort with input order preserved on ties, then a split into a
//! capped "fix these first" list and the remainder grouped by priority band.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::insight::impact::{action_cta, ImpactCategory, ImpactModel};
use crate::models::score::{Issue, Severity};

// ────────────────────────────────────────────────────────────────────────────
// Priority bands
// ────────────────────────────────────────────────────────────────────────────

/// Impact at or above which an issue is banded `critical`.
const CRITICAL_THRESHOLD: f64 = 150.0;
/// Impact at or above which an issue is banded `important`.
const IMPORTANT_THRESHOLD: f64 = 80.0;

/// Priority band derived from computed impact. Declaration order is the
/// display order, so grouped maps iterate critical → important → optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Critical,
    Important,
    Optional,
}

impl Priority {
    fn for_impact(impact: f64) -> Priority {
        if impact >= CRITICAL_THRESHOLD {
            Priority::Critical
        } else if impact >= IMPORTANT_THRESHOLD {
            Priority::Important
        } else {
            Priority::Optional
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Output types
// ────────────────────────────────────────────────────────────────────────────

/// One issue annotated with its computed impact, band, and call-to-action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrioritizedIssue {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    pub category: ImpactCategory,
    pub impact_score: f64,
    pub priority: Priority,
    pub action_cta: String,
}

/// Full prioritization of an issue list.
///
/// `remaining_by_priority` always carries all three band keys, empty or not,
/// so consumers never branch on key presence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrioritizationResult {
    pub top_issues: Vec<PrioritizedIssue>,
    pub remaining_by_priority: BTreeMap<Priority, Vec<PrioritizedIssue>>,
    pub total_count: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Calculation
// ────────────────────────────────────────────────────────────────────────────

/// Ranks `issues` by impact and splits off the `top_n` highest.
///
/// An issue whose category tag has no configured weight fails the whole
/// ranking with a `ConfigurationError`; there is no partial ranking. Ties
/// keep their input order, so reprioritizing the same payload is stable.
pub fn prioritize(
    model: &ImpactModel,
    issues: &[Issue],
    top_n: usize,
) -> Result<PrioritizationResult, AppError> {
    let mut ranked: Vec<(usize, PrioritizedIssue)> = Vec::with_capacity(issues.len());
    for (position, issue) in issues.iter().enumerate() {
        let category = model.category_for(&issue.kind)?;
        let impact_score = model.base_weight(category)? * model.severity_multiplier(issue.severity);
        ranked.push((
            position,
            PrioritizedIssue {
                id: issue.id.clone(),
                kind: issue.kind.clone(),
                severity: issue.severity,
                title: issue.title.clone(),
                description: issue.description.clone(),
                category,
                impact_score,
                priority: Priority::for_impact(impact_score),
                action_cta: action_cta(category).to_string(),
            },
        ));
    }

    // Descending impact, input order on equal impact.
    ranked.sort_by(|(pos_a, a), (pos_b, b)| {
        b.impact_score
            .partial_cmp(&a.impact_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(pos_a.cmp(pos_b))
    });

    let total_count = ranked.len();
    let mut remaining_by_priority: BTreeMap<Priority, Vec<PrioritizedIssue>> = BTreeMap::new();
    for band in [Priority::Critical, Priority::Important, Priority::Optional] {
        remaining_by_priority.insert(band, Vec::new());
    }

    let mut top_issues = Vec::with_capacity(top_n.min(total_count));
    for (index, (_, issue)) in ranked.into_iter().enumerate() {
        if index < top_n {
            top_issues.push(issue);
        } else if let Some(bucket) = remaining_by_priority.get_mut(&issue.priority) {
            bucket.push(issue);
        }
    }

    Ok(PrioritizationResult {
        top_issues,
        remaining_by_priority,
        total_count,
    })
}
