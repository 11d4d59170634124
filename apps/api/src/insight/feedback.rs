//! Assembles the human-readable feedback report from the other
//! calculators' outputs.
//!
//! Purely derived: prioritization + breakdown (+ optional benchmark) in,
//! report out. The report never invents findings; every action traces back
//! to a prioritized issue and every strength to a section score.

use serde::{Deserialize, Serialize};

use crate::insight::benchmark::{BenchmarkComparison, BenchmarkTier};
use crate::insight::impact::{ImpactCategory, ImpactModel};
use crate::insight::prioritizer::{PrioritizationResult, PrioritizedIssue, Priority};
use crate::models::score::{ExperienceLevel, ScoreBreakdown};

// ────────────────────────────────────────────────────────────────────────────
// Report types
// ────────────────────────────────────────────────────────────────────────────

/// Overall rating buckets. Feedback-specific wording, deliberately distinct
/// from the pass-probability status values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackRating {
    Exceptional,
    Strong,
    Competent,
    Developing,
    NeedsOverhaul,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interpretation {
    pub rating: FeedbackRating,
    pub message: String,
    pub improvements: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeforeAfterExample {
    pub before: String,
    pub after: String,
}

/// One high-priority fix with a concrete rewrite example and an estimated
/// score payoff.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriorityAction {
    pub category: ImpactCategory,
    pub priority: Priority,
    pub suggestion: String,
    pub example: BeforeAfterExample,
    pub impact: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySuggestions {
    pub category: ImpactCategory,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackReport {
    pub interpretation: Interpretation,
    pub priority_actions: Vec<PriorityAction>,
    pub all_suggestions: Vec<CategorySuggestions>,
    pub identified_strengths: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Thresholds
// ────────────────────────────────────────────────────────────────────────────

/// Fraction of a section's max at or above which it counts as a strength.
const STRENGTH_WATERMARK: f64 = 0.85;
/// Fraction of a section's max below which it is called out for improvement.
const IMPROVEMENT_FLOOR: f64 = 0.60;

fn rating_for(overall_pct: f64) -> FeedbackRating {
    if overall_pct >= 90.0 {
        FeedbackRating::Exceptional
    } else if overall_pct >= 80.0 {
        FeedbackRating::Strong
    } else if overall_pct >= 70.0 {
        FeedbackRating::Competent
    } else if overall_pct >= 60.0 {
        FeedbackRating::Developing
    } else {
        FeedbackRating::NeedsOverhaul
    }
}

fn rating_message(rating: FeedbackRating, level: ExperienceLevel) -> String {
    let level = level.label();
    match rating {
        FeedbackRating::Exceptional => {
            format!("Exceptional resume for a {level} candidate, ready to submit")
        }
        FeedbackRating::Strong => {
            format!("Strong resume for a {level} candidate, a few refinements from top shape")
        }
        FeedbackRating::Competent => {
            format!("Solid foundation for a {level} candidate with clear room to sharpen")
        }
        FeedbackRating::Developing => {
            format!("Developing resume for a {level} candidate, the fixes below will move it fast")
        }
        FeedbackRating::NeedsOverhaul => format!(
            "This resume needs a structural overhaul before it represents a {level} candidate well"
        ),
    }
}

fn example_for(category: ImpactCategory) -> BeforeAfterExample {
    let (before, after) = match category {
        ImpactCategory::AtsRejection => (
            "Two-column PDF with skills in an embedded table",
            "Single-column layout with standard section headings that parse cleanly",
        ),
        ImpactCategory::KeywordMatch => (
            "Responsible for backend work",
            "Built and operated Kubernetes-deployed Go microservices, mirroring the posting's terms",
        ),
        ImpactCategory::Formatting => (
            "Three font families, decorative icons, text boxes",
            "One font family, plain bullets, consistent spacing",
        ),
        ImpactCategory::ContentQuality => (
            "Worked on performance improvements",
            "Cut p95 checkout latency 38% by profiling and batching database queries",
        ),
        ImpactCategory::Minor => (
            "Dates written as 3/21, March 2021, and 2021-03 in one document",
            "Every date in the same Mon YYYY form",
        ),
    };
    BeforeAfterExample {
        before: before.to_string(),
        after: after.to_string(),
    }
}

/// Estimated score payoff range for fixing an issue. Higher impact always
/// yields an equal-or-wider, higher-positioned range.
fn impact_estimate(impact_score: f64) -> String {
    let lower = (impact_score / 60.0).ceil() as i64;
    let mut upper = (impact_score / 30.0).ceil() as i64;
    if upper <= lower {
        upper = lower + 1;
    }
    format!("+{lower} to +{upper} points")
}

// ────────────────────────────────────────────────────────────────────────────
// Assembly
// ────────────────────────────────────────────────────────────────────────────

/// Builds the feedback report.
///
/// `benchmark` is optional: feedback still renders when no comparison was
/// produced, it just says nothing about standing against other resumes.
pub fn generate(
    model: &ImpactModel,
    prioritization: &PrioritizationResult,
    breakdown: &ScoreBreakdown,
    benchmark: Option<&BenchmarkComparison>,
    level: ExperienceLevel,
) -> FeedbackReport {
    let all_ranked: Vec<&PrioritizedIssue> = prioritization
        .top_issues
        .iter()
        .chain(prioritization.remaining_by_priority.values().flatten())
        .collect();

    let overall_pct = overall_percentage(breakdown);
    let rating = rating_for(overall_pct);

    let mut actionable: Vec<&PrioritizedIssue> = all_ranked
        .iter()
        .copied()
        .filter(|issue| issue.priority != Priority::Optional)
        .collect();
    actionable.sort_by(|a, b| {
        b.impact_score
            .partial_cmp(&a.impact_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let priority_actions: Vec<PriorityAction> = actionable
        .into_iter()
        .map(|issue| PriorityAction {
            category: issue.category,
            priority: issue.priority,
            suggestion: issue.title.clone(),
            example: example_for(issue.category),
            impact: impact_estimate(issue.impact_score),
        })
        .collect();

    // Grouped by category, heaviest category first, ranking order within.
    let mut all_suggestions = Vec::new();
    for category in model.categories_by_weight() {
        let items: Vec<String> = all_ranked
            .iter()
            .filter(|issue| issue.category == category)
            .map(|issue| issue.title.clone())
            .collect();
        if !items.is_empty() {
            all_suggestions.push(CategorySuggestions { category, items });
        }
    }

    let mut identified_strengths = Vec::new();
    let mut improvements = Vec::new();
    for (section, entry) in breakdown {
        if entry.max_score <= 0.0 {
            continue;
        }
        let fraction = entry.score / entry.max_score;
        if fraction >= STRENGTH_WATERMARK {
            identified_strengths.push(format!(
                "Strong {section} section ({}/{})",
                entry.score, entry.max_score
            ));
        } else if fraction < IMPROVEMENT_FLOOR {
            improvements.push(format!(
                "Lift the {section} section ({}/{})",
                entry.score, entry.max_score
            ));
        }
    }
    if let Some(comparison) = benchmark {
        match comparison.tier {
            BenchmarkTier::Top | BenchmarkTier::Competitive => {
                identified_strengths.push(comparison.message.clone());
            }
            BenchmarkTier::BelowAverage | BenchmarkTier::NeedsImprovement => {
                improvements.push(comparison.message.clone());
            }
            BenchmarkTier::AboveAverage => {}
        }
    }

    FeedbackReport {
        interpretation: Interpretation {
            rating,
            message: rating_message(rating, level),
            improvements,
        },
        priority_actions,
        all_suggestions,
        identified_strengths,
    }
}

fn overall_percentage(breakdown: &ScoreBreakdown) -> f64 {
    let total_max: f64 = breakdown.values().map(|s| s.max_score).sum();
    if total_max <= 0.0 {
        return 0.0;
    }
    let total: f64 = breakdown.values().map(|s| s.score).sum();
    total / total_max * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insight::prioritizer::prioritize;
    use crate::models::score::{Issue, SectionScore, Severity};

    fn make_issue(id: &str, kind: &str, severity: Severity) -> Issue {
        Issue {
            id: id.to_string(),
            kind: kind.to_string(),
            severity,
            title: format!("Fix {id}"),
            description: String::new(),
        }
    }

    fn make_breakdown(sections: &[(&str, f64, f64)]) -> ScoreBreakdown {
        sections
            .iter()
            .map(|(name, score, max)| {
                (
                    name.to_string(),
                    SectionScore {
                        score: *score,
                        max_score: *max,
                        issues: vec![],
                    },
                )
            })
            .collect()
    }

    fn make_report(
        issues: &[Issue],
        breakdown: &ScoreBreakdown,
        benchmark: Option<&BenchmarkComparison>,
    ) -> FeedbackReport {
        let model = ImpactModel::standard();
        let prioritization = prioritize(&model, issues, 3).unwrap();
        generate(
            &model,
            &prioritization,
            breakdown,
            benchmark,
            ExperienceLevel::Mid,
        )
    }

    #[test]
    fn test_rating_buckets() {
        assert_eq!(rating_for(92.0), FeedbackRating::Exceptional);
        assert_eq!(rating_for(85.0), FeedbackRating::Strong);
        assert_eq!(rating_for(70.0), FeedbackRating::Competent);
        assert_eq!(rating_for(60.0), FeedbackRating::Developing);
        assert_eq!(rating_for(59.9), FeedbackRating::NeedsOverhaul);
    }

    #[test]
    fn test_priority_actions_exclude_optional() {
        let issues = vec![
            make_issue("kw", "keyword", Severity::Critical),
            make_issue("fmt", "formatting", Severity::Warning),
            make_issue("nit", "minor", Severity::Info),
        ];
        let report = make_report(&issues, &make_breakdown(&[("skills", 8.0, 10.0)]), None);

        assert_eq!(report.priority_actions.len(), 2);
        assert_eq!(report.priority_actions[0].priority, Priority::Critical);
        assert_eq!(report.priority_actions[0].suggestion, "Fix kw");
        assert_eq!(report.priority_actions[1].priority, Priority::Important);
    }

    #[test]
    fn test_priority_actions_cover_issues_beyond_top_n() {
        // Four critical keyword issues with top_n = 3: the fourth still
        // belongs in priority_actions even though it fell out of top_issues.
        let issues: Vec<Issue> = (0..4)
            .map(|i| make_issue(&format!("kw-{i}"), "keyword", Severity::Critical))
            .collect();
        let report = make_report(&issues, &make_breakdown(&[("skills", 8.0, 10.0)]), None);
        assert_eq!(report.priority_actions.len(), 4);
    }

    #[test]
    fn test_impact_estimate_monotonic_and_positive() {
        assert_eq!(impact_estimate(300.0), "+5 to +10 points");
        assert_eq!(impact_estimate(90.0), "+2 to +3 points");
        assert_eq!(impact_estimate(48.0), "+1 to +2 points");
        assert_eq!(impact_estimate(7.5), "+1 to +2 points", "upper forced above lower");
    }

    #[test]
    fn test_examples_are_category_specific() {
        let keyword = example_for(ImpactCategory::KeywordMatch);
        let content = example_for(ImpactCategory::ContentQuality);
        assert_ne!(keyword.before, content.before);
        assert!(!keyword.after.is_empty());
    }

    #[test]
    fn test_suggestions_grouped_heaviest_category_first() {
        let issues = vec![
            make_issue("nit", "minor", Severity::Info),
            make_issue("kw", "keyword", Severity::High),
            make_issue("fmt", "formatting", Severity::Warning),
        ];
        let report = make_report(&issues, &make_breakdown(&[("skills", 8.0, 10.0)]), None);

        let categories: Vec<ImpactCategory> =
            report.all_suggestions.iter().map(|g| g.category).collect();
        assert_eq!(
            categories,
            vec![
                ImpactCategory::KeywordMatch,
                ImpactCategory::Formatting,
                ImpactCategory::Minor
            ]
        );
        assert!(report
            .all_suggestions
            .iter()
            .all(|group| !group.items.is_empty()));
    }

    #[test]
    fn test_strengths_and_improvements_from_watermarks() {
        let breakdown = make_breakdown(&[
            ("experience", 23.0, 25.0),
            ("skills", 5.0, 10.0),
            ("education", 7.0, 10.0),
        ]);
        let report = make_report(&[], &breakdown, None);

        assert_eq!(report.identified_strengths.len(), 1);
        assert!(report.identified_strengths[0].contains("experience"));
        assert_eq!(report.interpretation.improvements.len(), 1);
        assert!(report.interpretation.improvements[0].contains("skills"));
    }

    #[test]
    fn test_benchmark_tier_feeds_strengths_or_improvements() {
        let breakdown = make_breakdown(&[("skills", 8.0, 10.0)]);
        let mut comparison = BenchmarkComparison {
            percentile: 92.0,
            vs_average: 12.0,
            tier: BenchmarkTier::Top,
            message: "Ahead of 92% of mid-level backend engineer resumes we have scored"
                .to_string(),
            statistics: crate::insight::benchmark::BenchmarkStatistics {
                mean: 70.0,
                median: 71.0,
                std_dev: 8.0,
                quartiles: crate::insight::benchmark::Quartiles { q1: 65.0, q3: 78.0 },
            },
            sample_size: 40,
            outlier: false,
        };

        let with_top = make_report(&[], &breakdown, Some(&comparison));
        assert!(with_top
            .identified_strengths
            .iter()
            .any(|s| s.contains("Ahead of 92%")));

        comparison.tier = BenchmarkTier::NeedsImprovement;
        comparison.message = "Well behind comparable resumes".to_string();
        let with_poor = make_report(&[], &breakdown, Some(&comparison));
        assert!(with_poor
            .interpretation
            .improvements
            .iter()
            .any(|s| s.contains("Well behind")));
    }

    #[test]
    fn test_empty_inputs_produce_empty_report_not_panic() {
        let report = make_report(&[], &ScoreBreakdown::new(), None);
        assert_eq!(report.interpretation.rating, FeedbackRating::NeedsOverhaul);
        assert!(report.priority_actions.is_empty());
        assert!(report.all_suggestions.is_empty());
        assert!(report.identified_strengths.is_empty());
    }

    #[test]
    fn test_message_mentions_level() {
        let model = ImpactModel::standard();
        let prioritization = prioritize(&model, &[], 3).unwrap();
        let report = generate(
            &model,
            &prioritization,
            &make_breakdown(&[("skills", 9.0, 10.0)]),
            None,
            ExperienceLevel::Executive,
        );
        assert!(report.interpretation.message.contains("executive"));
    }
}
