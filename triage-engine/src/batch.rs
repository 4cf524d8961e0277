// Copyright (c) The junit-triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Merging of per-report extraction results.

use crate::stability::StabilityHistory;
use junit_extract::{ExtractOptions, ReportSource, TestFailure, extract_report};
use tracing::{debug, warn};

/// The merged output of a batch of reports.
#[derive(Clone, Debug, Default)]
pub struct MergedReports {
    /// All extracted failures, in report completion order.
    pub failures: Vec<TestFailure>,

    /// Accumulated pass/fail history across all reports.
    pub history: StabilityHistory,

    /// Number of reports dropped because they failed to parse.
    pub skipped_reports: usize,
}

/// Accumulates extraction results across many JUnit reports.
///
/// Reports are typically fetched concurrently (one task per build and node)
/// by the caller; the batch itself is fed sequentially after each fetch
/// completes, so completion order determines merge order. A report that
/// fails to parse is logged and skipped as a unit, never aborting the batch
/// and never contributing partial results. A batch where every report failed
/// still yields a valid, empty [`MergedReports`].
#[derive(Clone, Debug)]
pub struct ReportBatch {
    options: ExtractOptions,
    merged: MergedReports,
}

impl ReportBatch {
    /// Creates an empty batch with the given extraction options.
    pub fn new(options: ExtractOptions) -> Self {
        Self {
            options,
            merged: MergedReports::default(),
        }
    }

    /// Extracts one report and merges its results.
    ///
    /// Returns false if the report was skipped because it failed to parse.
    pub fn ingest(&mut self, report_source: &ReportSource, xml: &str) -> bool {
        match extract_report(xml, report_source, &self.options) {
            Ok(report) => {
                debug!(
                    build = report_source.build_number,
                    node = %report_source.node_url,
                    failures = report.failures.len(),
                    observations = report.observations.len(),
                    "merged report"
                );
                self.merged.failures.extend(report.failures);
                for observation in report.observations {
                    self.merged.history.record_observation(observation);
                }
                true
            }
            Err(error) => {
                warn!(
                    build = report_source.build_number,
                    node = %report_source.node_url,
                    %error,
                    "skipping unparseable report"
                );
                self.merged.skipped_reports += 1;
                false
            }
        }
    }

    /// Finishes the batch and returns the merged results.
    pub fn finish(self) -> MergedReports {
        self.merged
    }
}
