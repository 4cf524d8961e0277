// Copyright (c) The junit-triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Analysis mode selection and dispatch.
//!
//! The requested view over a batch of merged reports is a single tagged
//! variant rather than a set of independent boolean flags, so exactly one
//! analysis runs per request.

use crate::{
    batch::MergedReports,
    cluster::{FailureCluster, cluster_failures, rank_clusters},
    diff::{BuildDiff, diff_failures},
    errors::ConfigError,
    matcher::DEFAULT_DIFF_THRESHOLD,
    stability::StabilityConfig,
    stability_list::StabilityList,
};
use junit_extract::TestFailure;

/// The aggregated view requested over one batch of reports.
#[derive(Clone, Debug)]
pub enum AnalysisRequest<'a> {
    /// Group near-identical failures into frequency-ranked clusters.
    ClusterFailures {
        /// Match threshold, percent of the longer signature.
        threshold_percent: f64,
    },

    /// Compare the batch's failures against a reference build's failures.
    DiffAgainstReference {
        /// Failures of the reference build(s).
        reference: &'a [TestFailure],
        /// Match threshold, percent of the longer signature.
        threshold_percent: f64,
    },

    /// Classify every test's stability from the accumulated history.
    ComputeStabilityList {
        /// Classifier configuration.
        config: StabilityConfig,
    },
}

impl<'a> AnalysisRequest<'a> {
    /// A clustering request at the default threshold
    /// ([`DEFAULT_DIFF_THRESHOLD`]).
    pub fn cluster() -> Self {
        Self::ClusterFailures {
            threshold_percent: DEFAULT_DIFF_THRESHOLD,
        }
    }

    /// A diff request against `reference` at the default threshold.
    pub fn diff(reference: &'a [TestFailure]) -> Self {
        Self::DiffAgainstReference {
            reference,
            threshold_percent: DEFAULT_DIFF_THRESHOLD,
        }
    }
}

/// The output of [`run_analysis`], one variant per request kind.
#[derive(Clone, Debug)]
pub enum AnalysisOutput {
    /// Ranked failure clusters.
    Clusters(Vec<FailureCluster>),

    /// Build-over-build differences.
    Diff(BuildDiff),

    /// Stability verdicts.
    Stability(StabilityList),
}

/// Runs the requested analysis over merged report results.
///
/// Thresholds are validated up front; classifier configuration is validated
/// at construction. An empty batch produces an empty output of the matching
/// kind rather than an error.
pub fn run_analysis(
    merged: MergedReports,
    request: AnalysisRequest<'_>,
) -> Result<AnalysisOutput, ConfigError> {
    match request {
        AnalysisRequest::ClusterFailures { threshold_percent } => {
            validate_threshold(threshold_percent)?;
            let clusters = rank_clusters(cluster_failures(merged.failures, threshold_percent));
            Ok(AnalysisOutput::Clusters(clusters))
        }
        AnalysisRequest::DiffAgainstReference {
            reference,
            threshold_percent,
        } => {
            validate_threshold(threshold_percent)?;
            Ok(AnalysisOutput::Diff(diff_failures(
                &merged.failures,
                reference,
                threshold_percent,
            )))
        }
        AnalysisRequest::ComputeStabilityList { config } => {
            Ok(AnalysisOutput::Stability(merged.history.classify(&config)))
        }
    }
}

fn validate_threshold(threshold_percent: f64) -> Result<(), ConfigError> {
    if threshold_percent.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::ThresholdNotFinite(threshold_percent))
    }
}
