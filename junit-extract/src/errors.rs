// Copyright (c) The junit-triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::report::ReportSource;
use thiserror::Error;

/// An error that occurs while parsing a single JUnit report.
///
/// Carries the build/node the report came from, so that callers can log the
/// failure and continue with the rest of the batch. No partial results are
/// ever emitted for a report that failed to parse.
#[derive(Debug, Error)]
#[error("failed to parse JUnit report for {report_source}")]
pub struct ReportParseError {
    report_source: ReportSource,
    #[source]
    source: quick_xml::Error,
}

impl ReportParseError {
    pub(crate) fn new(report_source: &ReportSource, source: quick_xml::Error) -> Self {
        Self {
            report_source: report_source.clone(),
            source,
        }
    }

    /// Returns the build/node combination whose report failed to parse.
    pub fn report_source(&self) -> &ReportSource {
        &self.report_source
    }
}
