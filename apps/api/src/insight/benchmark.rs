//! Benchmark history: accumulates (role, level, score) observations and
//! answers "how does this score compare" queries over them. The only
//! stateful component in the enrichment core.
//!
//! Storage sits behind the `BenchmarkStore` trait so the tracker's math is
//! independent of where records live. The in-memory store serializes writes
//! with an `RwLock`; statistics are recomputed over the full record set on
//! every query, which is fine at the volumes involved.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::score::ExperienceLevel;

// ────────────────────────────────────────────────────────────────────────────
// Records and storage
// ────────────────────────────────────────────────────────────────────────────

/// One historical observation. Immutable once recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkRecord {
    pub id: Uuid,
    pub score: f64,
    pub recorded_at: DateTime<Utc>,
}

/// Storage seam for benchmark history. Implementations must be safe to share
/// across request handlers.
pub trait BenchmarkStore: Send + Sync {
    /// Appends a record under a canonical (role, level) key.
    fn append(
        &self,
        role: &str,
        level: ExperienceLevel,
        record: BenchmarkRecord,
    ) -> Result<(), AppError>;

    /// Snapshot of all scores recorded under the key, in insertion order.
    fn scores_for(&self, role: &str, level: ExperienceLevel) -> Result<Vec<f64>, AppError>;
}

/// Process-local store. History lives for the lifetime of the process.
#[derive(Default)]
pub struct InMemoryBenchmarkStore {
    records: RwLock<HashMap<(String, ExperienceLevel), Vec<BenchmarkRecord>>>,
}

impl InMemoryBenchmarkStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BenchmarkStore for InMemoryBenchmarkStore {
    fn append(
        &self,
        role: &str,
        level: ExperienceLevel,
        record: BenchmarkRecord,
    ) -> Result<(), AppError> {
        let mut records = self
            .records
            .write()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("benchmark store lock poisoned")))?;
        records
            .entry((role.to_string(), level))
            .or_default()
            .push(record);
        Ok(())
    }

    fn scores_for(&self, role: &str, level: ExperienceLevel) -> Result<Vec<f64>, AppError> {
        let records = self
            .records
            .read()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("benchmark store lock poisoned")))?;
        Ok(records
            .get(&(role.to_string(), level))
            .map(|entries| entries.iter().map(|r| r.score).collect())
            .unwrap_or_default())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Comparison types
// ────────────────────────────────────────────────────────────────────────────

/// Percentile bands for tier assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BenchmarkTier {
    Top,
    Competitive,
    AboveAverage,
    BelowAverage,
    NeedsImprovement,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quartiles {
    pub q1: f64,
    pub q3: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkStatistics {
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub quartiles: Quartiles,
}

/// How one score sits against the recorded history for its (role, level).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkComparison {
    pub percentile: f64,
    pub vs_average: f64,
    pub tier: BenchmarkTier,
    pub message: String,
    pub statistics: BenchmarkStatistics,
    pub sample_size: usize,
    pub outlier: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Tracker
// ────────────────────────────────────────────────────────────────────────────

/// Percentile reported when there is no history to compare against.
const EMPTY_HISTORY_PERCENTILE: f64 = 50.0;

pub struct BenchmarkTracker {
    store: Arc<dyn BenchmarkStore>,
}

impl BenchmarkTracker {
    pub fn new(store: Arc<dyn BenchmarkStore>) -> Self {
        BenchmarkTracker { store }
    }

    /// Records one observation. Role keys are trimmed and lowercased, so
    /// "Backend Engineer" and "backend engineer " share a history.
    pub fn record(
        &self,
        role: &str,
        level: ExperienceLevel,
        score: f64,
    ) -> Result<BenchmarkRecord, AppError> {
        let role = normalize_role(role)?;
        validate_score(score)?;
        let record = BenchmarkRecord {
            id: Uuid::new_v4(),
            score,
            recorded_at: Utc::now(),
        };
        self.store.append(&role, level, record.clone())?;
        Ok(record)
    }

    /// Compares a score against the current history for its key. Pure read;
    /// does not add the score to the history.
    ///
    /// Percentile counts scores strictly below plus half of the ties, so a
    /// score equal to the minimum of ten records reads 5.0 and the maximum
    /// reads 95.0. With no history the percentile defaults to 50.0 with
    /// zeroed statistics.
    pub fn compare(
        &self,
        role: &str,
        level: ExperienceLevel,
        score: f64,
    ) -> Result<BenchmarkComparison, AppError> {
        let role = normalize_role(role)?;
        validate_score(score)?;
        let scores = self.store.scores_for(&role, level)?;
        Ok(build_comparison(&role, level, score, &scores))
    }
}

fn normalize_role(role: &str) -> Result<String, AppError> {
    let normalized = role.trim().to_lowercase();
    if normalized.is_empty() {
        return Err(AppError::Validation(
            "Benchmark role must not be empty".to_string(),
        ));
    }
    Ok(normalized)
}

fn validate_score(score: f64) -> Result<(), AppError> {
    if !(0.0..=100.0).contains(&score) {
        return Err(AppError::Validation(format!(
            "Benchmark score {score} is outside [0, 100]"
        )));
    }
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Statistics
// ────────────────────────────────────────────────────────────────────────────

fn build_comparison(
    role: &str,
    level: ExperienceLevel,
    score: f64,
    scores: &[f64],
) -> BenchmarkComparison {
    let sample_size = scores.len();
    if sample_size == 0 {
        return BenchmarkComparison {
            percentile: EMPTY_HISTORY_PERCENTILE,
            vs_average: 0.0,
            tier: tier_for(EMPTY_HISTORY_PERCENTILE),
            message: format!(
                "No benchmark history yet for {role} at the {} level",
                level.label()
            ),
            statistics: BenchmarkStatistics {
                mean: 0.0,
                median: 0.0,
                std_dev: 0.0,
                quartiles: Quartiles { q1: 0.0, q3: 0.0 },
            },
            sample_size: 0,
            outlier: false,
        };
    }

    let mean = scores.iter().sum::<f64>() / sample_size as f64;
    let std_dev = sample_std_dev(scores, mean);

    let mut sorted = scores.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let statistics = BenchmarkStatistics {
        mean: round2(mean),
        median: round2(interpolated_quantile(&sorted, 0.5)),
        std_dev: round2(std_dev),
        quartiles: Quartiles {
            q1: round2(interpolated_quantile(&sorted, 0.25)),
            q3: round2(interpolated_quantile(&sorted, 0.75)),
        },
    };

    let percentile = round1(percentile_of(scores, score));
    let tier = tier_for(percentile);
    // A spread of zero gives no scale to measure deviation against, so the
    // degenerate single-record and all-identical histories never flag.
    let outlier = sample_size >= 2 && std_dev > 0.0 && (score - mean).abs() > 3.0 * std_dev;

    BenchmarkComparison {
        percentile,
        vs_average: round1(score - mean),
        tier,
        message: message_for(tier, percentile, role, level),
        statistics,
        sample_size,
        outlier,
    }
}

/// Fraction of history strictly below the score, ties counted half-weight.
fn percentile_of(scores: &[f64], score: f64) -> f64 {
    let below = scores.iter().filter(|&&s| s < score).count() as f64;
    let ties = scores.iter().filter(|&&s| s == score).count() as f64;
    (below + 0.5 * ties) / scores.len() as f64 * 100.0
}

/// Sample standard deviation (n − 1 denominator); 0.0 below two records.
fn sample_std_dev(scores: &[f64], mean: f64) -> f64 {
    if scores.len() < 2 {
        return 0.0;
    }
    let variance = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>()
        / (scores.len() - 1) as f64;
    variance.sqrt()
}

/// Linear-interpolation quantile over an already-sorted slice.
fn interpolated_quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }
    let position = (sorted.len() - 1) as f64 * q;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        sorted[lower] + (sorted[upper] - sorted[lower]) * (position - lower as f64)
    }
}

fn tier_for(percentile: f64) -> BenchmarkTier {
    if percentile >= 90.0 {
        BenchmarkTier::Top
    } else if percentile >= 75.0 {
        BenchmarkTier::Competitive
    } else if percentile >= 50.0 {
        BenchmarkTier::AboveAverage
    } else if percentile >= 25.0 {
        BenchmarkTier::BelowAverage
    } else {
        BenchmarkTier::NeedsImprovement
    }
}

fn message_for(tier: BenchmarkTier, percentile: f64, role: &str, level: ExperienceLevel) -> String {
    let level = level.label();
    match tier {
        BenchmarkTier::Top => format!(
            "Ahead of {percentile:.0}% of {level}-level {role} resumes we have scored"
        ),
        BenchmarkTier::Competitive => format!(
            "Competitive for {level}-level {role} roles, ahead of {percentile:.0}% of comparable resumes"
        ),
        BenchmarkTier::AboveAverage => format!(
            "Slightly ahead of the typical {level}-level {role} resume"
        ),
        BenchmarkTier::BelowAverage => format!(
            "Behind the typical {level}-level {role} resume, with clear room to move up"
        ),
        BenchmarkTier::NeedsImprovement => format!(
            "Well behind comparable {level}-level {role} resumes, prioritize the fixes below"
        ),
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_tracker() -> BenchmarkTracker {
        BenchmarkTracker::new(Arc::new(InMemoryBenchmarkStore::new()))
    }

    fn seed_ten(tracker: &BenchmarkTracker) {
        for score in [50.0, 55.0, 60.0, 65.0, 70.0, 75.0, 80.0, 85.0, 90.0, 95.0] {
            tracker
                .record("backend engineer", ExperienceLevel::Mid, score)
                .unwrap();
        }
    }

    #[test]
    fn test_percentile_at_extremes_of_ten_records() {
        let tracker = make_tracker();
        seed_ten(&tracker);

        let at_min = tracker
            .compare("backend engineer", ExperienceLevel::Mid, 50.0)
            .unwrap();
        assert_eq!(at_min.percentile, 5.0, "0 below + half of 1 tie, over 10");

        let at_max = tracker
            .compare("backend engineer", ExperienceLevel::Mid, 95.0)
            .unwrap();
        assert_eq!(at_max.percentile, 95.0, "9 below + half of 1 tie, over 10");
    }

    #[test]
    fn test_ties_count_half_weight() {
        let tracker = make_tracker();
        for score in [70.0, 70.0, 70.0, 80.0] {
            tracker.record("analyst", ExperienceLevel::Entry, score).unwrap();
        }
        let comparison = tracker
            .compare("analyst", ExperienceLevel::Entry, 70.0)
            .unwrap();
        assert_eq!(comparison.percentile, 37.5, "(0 + 3 × 0.5) / 4");
    }

    #[test]
    fn test_empty_history_defaults() {
        let tracker = make_tracker();
        let comparison = tracker
            .compare("data scientist", ExperienceLevel::Senior, 82.0)
            .unwrap();
        assert_eq!(comparison.percentile, 50.0);
        assert_eq!(comparison.sample_size, 0);
        assert_eq!(comparison.vs_average, 0.0);
        assert_eq!(comparison.statistics.std_dev, 0.0);
        assert!(!comparison.outlier);
        assert!(comparison.message.contains("No benchmark history"));
    }

    #[test]
    fn test_single_record_degenerates_cleanly() {
        let tracker = make_tracker();
        tracker.record("pm", ExperienceLevel::Lead, 75.0).unwrap();
        let comparison = tracker.compare("pm", ExperienceLevel::Lead, 90.0).unwrap();
        assert_eq!(comparison.sample_size, 1);
        assert_eq!(comparison.statistics.std_dev, 0.0);
        assert_eq!(comparison.statistics.mean, 75.0);
        assert_eq!(comparison.statistics.median, 75.0);
        assert_eq!(comparison.percentile, 100.0, "1 below, no ties");
        assert!(!comparison.outlier, "no spread to measure against");
    }

    #[test]
    fn test_statistics_over_known_set() {
        let tracker = make_tracker();
        for score in [10.0, 20.0, 30.0, 40.0] {
            tracker.record("qa", ExperienceLevel::Mid, score).unwrap();
        }
        let stats = tracker
            .compare("qa", ExperienceLevel::Mid, 25.0)
            .unwrap()
            .statistics;
        assert_eq!(stats.mean, 25.0);
        assert_eq!(stats.median, 25.0);
        assert_eq!(stats.std_dev, 12.91, "sample std-dev, n − 1 denominator");
        assert_eq!(stats.quartiles.q1, 17.5, "linear interpolation at 0.75");
        assert_eq!(stats.quartiles.q3, 32.5, "linear interpolation at 2.25");
    }

    #[test]
    fn test_outlier_flagged_but_history_intact() {
        let tracker = make_tracker();
        for _ in 0..20 {
            tracker.record("devops", ExperienceLevel::Mid, 70.0).unwrap();
        }
        for score in [68.0, 72.0] {
            tracker.record("devops", ExperienceLevel::Mid, score).unwrap();
        }

        let comparison = tracker.compare("devops", ExperienceLevel::Mid, 5.0).unwrap();
        assert!(comparison.outlier, "5 sits far outside a tight cluster at 70");

        // Record the outlier; it must still land in the statistics.
        tracker.record("devops", ExperienceLevel::Mid, 5.0).unwrap();
        let after = tracker.compare("devops", ExperienceLevel::Mid, 70.0).unwrap();
        assert_eq!(after.sample_size, 23);
        assert!(after.statistics.mean < 70.0, "outlier pulls the mean down");
    }

    #[test]
    fn test_tier_bands() {
        assert_eq!(tier_for(95.0), BenchmarkTier::Top);
        assert_eq!(tier_for(90.0), BenchmarkTier::Top);
        assert_eq!(tier_for(80.0), BenchmarkTier::Competitive);
        assert_eq!(tier_for(55.0), BenchmarkTier::AboveAverage);
        assert_eq!(tier_for(30.0), BenchmarkTier::BelowAverage);
        assert_eq!(tier_for(10.0), BenchmarkTier::NeedsImprovement);
    }

    #[test]
    fn test_role_keys_normalized() {
        let tracker = make_tracker();
        tracker
            .record("Backend Engineer", ExperienceLevel::Mid, 80.0)
            .unwrap();
        let comparison = tracker
            .compare("  backend engineer ", ExperienceLevel::Mid, 85.0)
            .unwrap();
        assert_eq!(comparison.sample_size, 1, "casing and whitespace share a key");
    }

    #[test]
    fn test_levels_keep_separate_histories() {
        let tracker = make_tracker();
        tracker
            .record("backend engineer", ExperienceLevel::Mid, 80.0)
            .unwrap();
        let senior = tracker
            .compare("backend engineer", ExperienceLevel::Senior, 80.0)
            .unwrap();
        assert_eq!(senior.sample_size, 0);
    }

    #[test]
    fn test_compare_does_not_record() {
        let tracker = make_tracker();
        seed_ten(&tracker);
        tracker
            .compare("backend engineer", ExperienceLevel::Mid, 99.0)
            .unwrap();
        let again = tracker
            .compare("backend engineer", ExperienceLevel::Mid, 99.0)
            .unwrap();
        assert_eq!(again.sample_size, 10, "compare is a pure read");
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        let tracker = make_tracker();
        assert!(matches!(
            tracker.record("  ", ExperienceLevel::Mid, 70.0),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            tracker.record("engineer", ExperienceLevel::Mid, 101.0),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            tracker.compare("engineer", ExperienceLevel::Mid, -3.0),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_concurrent_record_and_compare() {
        let tracker = Arc::new(make_tracker());
        let mut handles = Vec::new();
        for worker in 0..4 {
            let tracker = Arc::clone(&tracker);
            handles.push(std::thread::spawn(move || {
                for i in 0..25 {
                    let score = 50.0 + ((worker * 25 + i) % 50) as f64;
                    tracker.record("swe", ExperienceLevel::Mid, score).unwrap();
                    tracker.compare("swe", ExperienceLevel::Mid, score).unwrap();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        let comparison = tracker.compare("swe", ExperienceLevel::Mid, 75.0).unwrap();
        assert_eq!(comparison.sample_size, 100);
    }
}
