// Copyright (c) The junit-triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Grouping of near-identical failures into clusters.

use crate::matcher::signatures_match;
use junit_extract::TestFailure;
use std::cmp::Reverse;

/// A group of failures judged equivalent by the approximate matcher.
#[derive(Clone, Debug)]
pub struct FailureCluster {
    /// The representative signature: the comparison signature of the first
    /// failure added to the cluster.
    pub signature: String,

    /// Member failures, in insertion order (or sorted by `test_id` after
    /// ranking).
    pub members: Vec<TestFailure>,
}

impl FailureCluster {
    /// Number of failures in this cluster.
    pub fn count(&self) -> usize {
        self.members.len()
    }
}

/// Groups failures into clusters with a single greedy pass.
///
/// Each failure joins the first existing cluster (in creation order) whose
/// representative signature matches it, or starts a new cluster otherwise.
/// Membership is decided once at insertion time and never re-evaluated, so
/// the result depends on input order: two failures that would match each
/// other directly can land in different clusters when an intervening failure
/// matched one but not the other. That makes cluster composition vary from
/// run to run when reports are merged in nondeterministic completion order.
pub fn cluster_failures(
    failures: impl IntoIterator<Item = TestFailure>,
    threshold_percent: f64,
) -> Vec<FailureCluster> {
    let mut clusters: Vec<FailureCluster> = Vec::new();
    for failure in failures {
        let matched = clusters.iter_mut().find(|cluster| {
            signatures_match(
                &cluster.signature,
                &failure.signature.compare,
                threshold_percent,
            )
        });
        match matched {
            Some(cluster) => cluster.members.push(failure),
            None => clusters.push(FailureCluster {
                signature: failure.signature.compare.clone(),
                members: vec![failure],
            }),
        }
    }
    clusters
}

/// Ranks clusters by member count, descending, for display.
///
/// Ties keep cluster creation order. Members within each cluster are sorted
/// by `test_id` so output is deterministic for a given clustering.
pub fn rank_clusters(mut clusters: Vec<FailureCluster>) -> Vec<FailureCluster> {
    for cluster in &mut clusters {
        cluster.members.sort_by(|a, b| a.test_id.cmp(&b.test_id));
    }
    clusters.sort_by_key(|cluster| Reverse(cluster.count()));
    clusters
}

/// Zero-pads a cluster's member count to the decimal width of the total
/// cluster count, so that labels sort lexicographically by frequency.
pub fn frequency_prefix(count: usize, total_clusters: usize) -> String {
    let width = total_clusters.to_string().len();
    format!("{count:0width$}")
}
