//! Benchmark report aggregation.
//!
//! Folds per-case outcomes into pass/fail totals, duration statistics and a tally
//! of failure reasons. Pure: the caller decides where the report is written.

use crate::MatchOutcome;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Outcome of one scored benchmark case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseResult {
    /// Case name.
    pub name: String,
    /// Matcher verdict.
    pub outcome: MatchOutcome,
    /// Duration attributed to the case, in seconds.
    pub duration_seconds: f64,
}

impl CaseResult {
    /// Create a case result.
    pub fn new(name: impl Into<String>, outcome: MatchOutcome, duration_seconds: f64) -> Self {
        Self {
            name: name.into(),
            outcome,
            duration_seconds,
        }
    }
}

/// Duration statistics across all cases, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DurationStats {
    /// Arithmetic mean.
    pub mean: f64,
    /// Shortest case.
    pub min: f64,
    /// Longest case.
    pub max: f64,
    /// Sample standard deviation (0 for a single case).
    pub std_dev: f64,
    /// Sum of all durations.
    pub total: f64,
}

impl DurationStats {
    /// Compute statistics, or `None` for an empty slice.
    #[must_use]
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        #[allow(clippy::cast_precision_loss)] // case counts are far below 2^52
        let n = samples.len() as f64;
        let total: f64 = samples.iter().sum();
        let mean = total / n;
        let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
        let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let std_dev = if samples.len() > 1 {
            let variance = samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / (n - 1.0);
            variance.sqrt()
        } else {
            0.0
        };
        Some(Self {
            mean,
            min,
            max,
            std_dev,
            total,
        })
    }
}

/// Aggregated results of a benchmark run.
///
/// # Example
///
/// ```
/// use callmatch::{BenchmarkReport, CaseResult, MatchOutcome};
///
/// let report = BenchmarkReport::compile(vec![
///     CaseResult::new("a", MatchOutcome::pass("ok"), 1.0),
///     CaseResult::new("b", MatchOutcome::fail("no match"), 3.0),
/// ]);
/// assert_eq!(report.passed, 1);
/// assert_eq!(report.pass_rate, 50.0);
/// assert_eq!(report.failure_reasons["no match"], 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkReport {
    /// Number of cases.
    pub total: usize,
    /// Cases whose outcome succeeded.
    pub passed: usize,
    /// Cases whose outcome failed.
    pub failed: usize,
    /// `passed / total` as a percentage; 0 when there are no cases.
    pub pass_rate: f64,
    /// Duration statistics; absent when there are no cases.
    pub durations: Option<DurationStats>,
    /// Failure reason to number of cases that failed with it.
    pub failure_reasons: BTreeMap<String, usize>,
    /// Per-case results in input order.
    pub results: Vec<CaseResult>,
}

impl BenchmarkReport {
    /// Aggregate case results.
    #[must_use]
    pub fn compile(results: Vec<CaseResult>) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|r| r.outcome.success).count();

        let mut failure_reasons: BTreeMap<String, usize> = BTreeMap::new();
        for result in results.iter().filter(|r| !r.outcome.success) {
            *failure_reasons
                .entry(result.outcome.reason.clone())
                .or_insert(0) += 1;
        }

        let durations: Vec<f64> = results.iter().map(|r| r.duration_seconds).collect();

        #[allow(clippy::cast_precision_loss)]
        let pass_rate = if total == 0 {
            0.0
        } else {
            passed as f64 / total as f64 * 100.0
        };

        Self {
            total,
            passed,
            failed: total - passed,
            pass_rate,
            durations: DurationStats::from_samples(&durations),
            failure_reasons,
            results,
        }
    }

    /// Returns `true` when every case passed (vacuously true for no cases).
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_report() {
        let report = BenchmarkReport::compile(vec![]);
        assert_eq!(report.total, 0);
        assert_eq!(report.pass_rate, 0.0);
        assert!(report.durations.is_none());
        assert!(report.all_passed());
    }

    #[test]
    fn tallies_failure_reasons() {
        let report = BenchmarkReport::compile(vec![
            CaseResult::new("a", MatchOutcome::fail("count mismatch"), 1.0),
            CaseResult::new("b", MatchOutcome::fail("count mismatch"), 1.0),
            CaseResult::new("c", MatchOutcome::fail("no match"), 1.0),
            CaseResult::new("d", MatchOutcome::pass("ok"), 1.0),
        ]);
        assert_eq!(report.failed, 3);
        assert_eq!(report.failure_reasons["count mismatch"], 2);
        assert_eq!(report.failure_reasons["no match"], 1);
        assert!(!report.failure_reasons.contains_key("ok"));
        assert_eq!(report.pass_rate, 25.0);
    }

    #[test]
    fn duration_statistics() {
        let stats = DurationStats::from_samples(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(stats.total, 40.0);
        assert_eq!(stats.mean, 5.0);
        assert_eq!(stats.min, 2.0);
        assert_eq!(stats.max, 9.0);
        // sample variance = 32 / 7
        assert!((stats.std_dev - (32.0_f64 / 7.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn single_sample_has_zero_deviation() {
        let stats = DurationStats::from_samples(&[3.5]).unwrap();
        assert_eq!(stats.std_dev, 0.0);
        assert_eq!(stats.min, stats.max);
    }

    #[test]
    fn report_serializes_to_json() {
        let report =
            BenchmarkReport::compile(vec![CaseResult::new("a", MatchOutcome::pass("ok"), 0.5)]);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["passed"], 1);
        assert_eq!(json["results"][0]["outcome"]["success"], true);
    }
}
