// Copyright (c) The junit-triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Build-over-build comparison of failing tests.

use crate::matcher::signatures_match;
use indexmap::IndexMap;
use itertools::Itertools;
use junit_extract::TestFailure;
use std::collections::HashSet;

/// A failing test whose failure no longer matches any failure of the same
/// test in the reference build.
#[derive(Clone, Debug)]
pub struct ChangedFailure {
    /// The failure in the target build.
    pub current: TestFailure,

    /// One representative failure of the same test in the reference build,
    /// for display.
    pub reference: TestFailure,
}

/// The result of comparing a target build's failures against a reference.
///
/// Tests whose failure has an approximate match in the reference set are
/// regression-free and not reported.
#[derive(Clone, Debug, Default)]
pub struct BuildDiff {
    /// Failing tests with no same-identity failure in the reference set.
    pub new_failures: Vec<TestFailure>,

    /// Failing tests whose failure changed relative to the reference set.
    pub changed_failures: Vec<ChangedFailure>,

    /// Number of distinct failing tests in the target build(s).
    pub target_failing_tests: usize,

    /// Number of distinct failing tests in the reference build(s).
    pub reference_failing_tests: usize,
}

impl BuildDiff {
    /// Total number of reported differences.
    pub fn difference_count(&self) -> usize {
        self.new_failures.len() + self.changed_failures.len()
    }
}

/// Compares target failures against reference failures.
///
/// For each target failure, same-identity reference failures are scanned in
/// order and the first approximate match wins; there is no best-match search.
/// A missing identity is a normal outcome (a new failure), not an error.
/// Output is ordered by `test_id` ascending.
pub fn diff_failures(
    target: &[TestFailure],
    reference: &[TestFailure],
    threshold_percent: f64,
) -> BuildDiff {
    let mut reference_by_id: IndexMap<&str, Vec<&TestFailure>> = IndexMap::new();
    for failure in reference {
        reference_by_id
            .entry(failure.test_id.as_str())
            .or_default()
            .push(failure);
    }

    let target_failing_tests = target
        .iter()
        .map(|failure| failure.test_id.as_str())
        .collect::<HashSet<_>>()
        .len();

    let mut diff = BuildDiff {
        target_failing_tests,
        reference_failing_tests: reference_by_id.len(),
        ..Default::default()
    };

    for failure in target
        .iter()
        .sorted_by(|a, b| a.test_id.cmp(&b.test_id))
    {
        match reference_by_id.get(failure.test_id.as_str()) {
            None => diff.new_failures.push(failure.clone()),
            Some(candidates) => {
                let found = candidates.iter().any(|candidate| {
                    signatures_match(
                        &failure.signature.compare,
                        &candidate.signature.compare,
                        threshold_percent,
                    )
                });
                if !found {
                    diff.changed_failures.push(ChangedFailure {
                        current: failure.clone(),
                        reference: candidates[0].clone(),
                    });
                }
            }
        }
    }

    diff
}
