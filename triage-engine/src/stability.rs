// Copyright (c) The junit-triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stability classification of tests from their pass/fail history.

use crate::{errors::ConfigError, stability_list::StabilityList};
use indexmap::IndexMap;
use junit_extract::TestObservation;
use std::fmt;

/// Configuration for the stability classifier.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StabilityConfig {
    min_test_runs: usize,
    last_stable_runs: usize,
    stability_rate_threshold: f64,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            min_test_runs: 1,
            last_stable_runs: 1,
            stability_rate_threshold: 50.0,
        }
    }
}

impl StabilityConfig {
    /// Creates a validated configuration.
    ///
    /// `min_test_runs` is the minimum run count for a test to be eligible
    /// for STABLE, `last_stable_runs` the size of the most-recent-runs
    /// window checked first, and `stability_rate_threshold` the pass-rate
    /// percentage a test with mixed recent results must exceed.
    pub fn new(
        min_test_runs: usize,
        last_stable_runs: usize,
        stability_rate_threshold: f64,
    ) -> Result<Self, ConfigError> {
        if min_test_runs == 0 {
            return Err(ConfigError::MinTestRunsZero);
        }
        if last_stable_runs == 0 {
            return Err(ConfigError::LastStableRunsZero);
        }
        if !(0.0..=100.0).contains(&stability_rate_threshold) {
            return Err(ConfigError::StabilityRateOutOfRange(
                stability_rate_threshold,
            ));
        }
        Ok(Self {
            min_test_runs,
            last_stable_runs,
            stability_rate_threshold,
        })
    }
}

/// The classification of one test.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TestVerdict {
    /// The test passes consistently.
    Stable,
    /// The test fails intermittently or currently, or has too little
    /// history to judge.
    Unstable,
}

impl fmt::Display for TestVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestVerdict::Stable => f.write_str("STABLE"),
            TestVerdict::Unstable => f.write_str("UNSTABLE"),
        }
    }
}

/// The classifier's output for one test.
///
/// Displays as `<rate, 2 decimals>:<total runs>`, the form persisted in the
/// stability list file.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StabilityAssessment {
    /// STABLE or UNSTABLE.
    pub verdict: TestVerdict,

    /// Pass percentage over all observed runs; 0 when there were none.
    pub stability_rate: f64,

    /// Number of observed runs.
    pub total_runs: usize,
}

impl fmt::Display for StabilityAssessment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}:{}", self.stability_rate, self.total_runs)
    }
}

/// One pass/fail outcome of a test in one build.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BuildOutcome {
    /// The build the test ran in.
    pub build_number: u32,
    /// Whether the test failed in that build.
    pub failed: bool,
}

/// Classifies one test from its (unordered) per-build outcomes.
///
/// The most recent `last_stable_runs` observations are checked first: a
/// fully failed window is UNSTABLE regardless of older history, a fully
/// passed window is STABLE provided the test ran at least `min_test_runs`
/// times. With mixed recent results the verdict falls through to the overall
/// pass rate, which must exceed `stability_rate_threshold`.
pub fn classify(outcomes: &[BuildOutcome], config: &StabilityConfig) -> StabilityAssessment {
    let total_runs = outcomes.len();
    if total_runs == 0 {
        return StabilityAssessment {
            verdict: TestVerdict::Unstable,
            stability_rate: 0.0,
            total_runs: 0,
        };
    }

    let mut ordered: Vec<&BuildOutcome> = outcomes.iter().collect();
    ordered.sort_by(|a, b| b.build_number.cmp(&a.build_number));

    let window = config.last_stable_runs.min(total_runs);
    let recent_failures = ordered[..window].iter().filter(|o| o.failed).count();
    let total_failures =
        recent_failures + ordered[window..].iter().filter(|o| o.failed).count();
    let stability_rate = ((total_runs - total_failures) as f64 / total_runs as f64) * 100.0;
    let enough_runs = total_runs >= config.min_test_runs;

    let verdict = if recent_failures == window {
        TestVerdict::Unstable
    } else if recent_failures == 0 {
        if enough_runs {
            TestVerdict::Stable
        } else {
            TestVerdict::Unstable
        }
    } else if enough_runs && stability_rate > config.stability_rate_threshold {
        TestVerdict::Stable
    } else {
        TestVerdict::Unstable
    };

    StabilityAssessment {
        verdict,
        stability_rate,
        total_runs,
    }
}

/// Accumulated pass/fail history per test identity across many builds.
///
/// Built incrementally while reports are merged, then consumed exactly once
/// by [`StabilityHistory::classify`].
#[derive(Clone, Debug, Default)]
pub struct StabilityHistory {
    runs: IndexMap<String, Vec<BuildOutcome>>,
}

impl StabilityHistory {
    /// Records one outcome for the test identified by `test_key`
    /// (`classname&name`).
    pub fn record(&mut self, test_key: impl Into<String>, build_number: u32, failed: bool) {
        self.runs.entry(test_key.into()).or_default().push(BuildOutcome {
            build_number,
            failed,
        });
    }

    /// Records an observation extracted from a JUnit report.
    pub fn record_observation(&mut self, observation: TestObservation) {
        self.record(
            observation.test_key,
            observation.build_number,
            observation.failed,
        );
    }

    /// True if no outcomes have been recorded.
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Number of distinct tests with recorded outcomes.
    pub fn test_count(&self) -> usize {
        self.runs.len()
    }

    /// Classifies every recorded test and splits the results into stable
    /// and unstable lists.
    pub fn classify(&self, config: &StabilityConfig) -> StabilityList {
        let mut list = StabilityList::default();
        for (test_key, outcomes) in &self.runs {
            list.insert(test_key.clone(), classify(outcomes, config));
        }
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn outcomes(failed_builds: &[u32], passed_builds: &[u32]) -> Vec<BuildOutcome> {
        let mut all: Vec<BuildOutcome> = failed_builds
            .iter()
            .map(|&build_number| BuildOutcome {
                build_number,
                failed: true,
            })
            .collect();
        all.extend(passed_builds.iter().map(|&build_number| BuildOutcome {
            build_number,
            failed: false,
        }));
        all
    }

    #[test]
    fn config_validation() {
        assert_eq!(
            StabilityConfig::new(0, 1, 50.0),
            Err(ConfigError::MinTestRunsZero)
        );
        assert_eq!(
            StabilityConfig::new(1, 0, 50.0),
            Err(ConfigError::LastStableRunsZero)
        );
        assert_eq!(
            StabilityConfig::new(1, 1, 101.0),
            Err(ConfigError::StabilityRateOutOfRange(101.0))
        );
        assert_eq!(
            StabilityConfig::new(1, 1, -3.0),
            Err(ConfigError::StabilityRateOutOfRange(-3.0))
        );
        assert!(StabilityConfig::new(5, 10, 85.0).is_ok());
    }

    #[test]
    fn all_recent_passes_with_enough_runs_is_stable() {
        let config = StabilityConfig::new(5, 10, 50.0).unwrap();
        let all = outcomes(&[], &(1..=10).collect::<Vec<_>>());
        let assessment = classify(&all, &config);
        assert_eq!(assessment.verdict, TestVerdict::Stable);
        assert_eq!(assessment.stability_rate, 100.0);
        assert_eq!(assessment.total_runs, 10);
        assert_eq!(assessment.to_string(), "100.00:10");
    }

    #[test]
    fn fully_failed_recent_window_is_unstable_regardless_of_history() {
        let config = StabilityConfig::new(1, 3, 50.0).unwrap();
        // 20 old passes, then the three most recent runs all failed.
        let all = outcomes(&[21, 22, 23], &(1..=20).collect::<Vec<_>>());
        let assessment = classify(&all, &config);
        assert_eq!(assessment.verdict, TestVerdict::Unstable);
        // 20 passes out of 23 runs.
        assert_eq!(assessment.to_string(), "86.96:23");
    }

    #[test]
    fn clean_recent_window_without_enough_runs_is_unstable() {
        let config = StabilityConfig::new(5, 2, 50.0).unwrap();
        let all = outcomes(&[], &[1, 2, 3]);
        let assessment = classify(&all, &config);
        assert_eq!(assessment.verdict, TestVerdict::Unstable);
        assert_eq!(assessment.stability_rate, 100.0);
    }

    // Mixed recent window: rate decides. 1 failure in window of 5 plus 1
    // older failure over 20 runs = 90% pass rate.
    #[test_case(85.0, TestVerdict::Stable; "rate above threshold")]
    #[test_case(90.0, TestVerdict::Unstable; "rate not strictly above threshold")]
    #[test_case(95.0, TestVerdict::Unstable; "rate below threshold")]
    fn mixed_recent_window_uses_rate(threshold: f64, expected: TestVerdict) {
        let config = StabilityConfig::new(1, 5, threshold).unwrap();
        let all = outcomes(&[20, 3], &(4..=19).chain(1..=2).collect::<Vec<_>>());
        let assessment = classify(&all, &config);
        assert_eq!(assessment.total_runs, 20);
        assert_eq!(assessment.stability_rate, 90.0);
        assert_eq!(assessment.verdict, expected);
    }

    #[test]
    fn no_observations_is_unstable_with_zero_rate() {
        let config = StabilityConfig::default();
        let assessment = classify(&[], &config);
        assert_eq!(assessment.verdict, TestVerdict::Unstable);
        assert_eq!(assessment.to_string(), "0.00:0");
    }

    #[test]
    fn window_larger_than_history_shrinks_to_history() {
        let config = StabilityConfig::new(1, 10, 50.0).unwrap();
        let all = outcomes(&[1, 2], &[]);
        // Both runs failed; the shrunk window is fully failed.
        let assessment = classify(&all, &config);
        assert_eq!(assessment.verdict, TestVerdict::Unstable);
        assert_eq!(assessment.stability_rate, 0.0);
    }

    #[test]
    fn history_classifies_per_test() {
        let config = StabilityConfig::new(2, 2, 50.0).unwrap();
        let mut history = StabilityHistory::default();
        for build in 1..=4 {
            history.record("pkg.Foo&good", build, false);
            history.record("pkg.Foo&bad", build, true);
        }
        assert_eq!(history.test_count(), 2);
        let list = history.classify(&config);
        assert!(list.stable.contains_key("pkg.Foo&good"));
        assert!(list.unstable.contains_key("pkg.Foo&bad"));
    }
}
