// Copyright (c) The junit-triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests: raw JUnit XML in, triage views out.

use camino_tempfile::tempdir;
use indoc::{formatdoc, indoc};
use junit_extract::{ExtractOptions, ReportSource, StabilityKind, extract_report};
use pretty_assertions::assert_eq;
use triage_engine::{
    batch::ReportBatch,
    mode::{AnalysisOutput, AnalysisRequest, run_analysis},
    stability::StabilityConfig,
    stability_list::StabilitySets,
};

/// A login failure whose stack trace varies by line number between builds.
fn login_report(java_line: u32) -> String {
    formatdoc! {r#"
        <testsuite>
          <testcase classname="auth.LoginTest" name="submit">
            <failure message="Connection refused">StackTrace:
        java.net.ConnectException: Connection refused
            at auth.LoginTest.submit(LoginTest.java:{java_line})
            at org.junit.Runner.run(Runner.java:10)</failure>
          </testcase>
          <testcase classname="search.QueryTest" name="empty_query"/>
        </testsuite>
    "#}
}

const QUERY_FAILURE_REPORT: &str = indoc! {r#"
    <testsuite>
      <testcase classname="auth.LoginTest" name="submit"/>
      <testcase classname="search.QueryTest" name="empty_query">
        <failure message="expected 0 results">StackTrace:
    java.lang.AssertionError: expected 0 results
        at search.QueryTest.empty_query(QueryTest.java:17)</failure>
      </testcase>
    </testsuite>
"#};

#[test]
fn clusters_recurring_failures_across_builds() {
    let mut batch = ReportBatch::new(ExtractOptions::default());
    assert!(batch.ingest(&ReportSource::new(1, "node-a"), &login_report(42)));
    assert!(batch.ingest(&ReportSource::new(2, "node-a"), &login_report(43)));
    assert!(batch.ingest(&ReportSource::new(2, "node-b"), QUERY_FAILURE_REPORT));

    let output = run_analysis(batch.finish(), AnalysisRequest::cluster()).unwrap();
    let AnalysisOutput::Clusters(clusters) = output else {
        panic!("expected clusters");
    };

    // The two login failures differ only in a line number and cluster
    // together; the assertion failure stands alone.
    assert_eq!(clusters.len(), 2);
    assert_eq!(clusters[0].count(), 2);
    assert!(clusters[0].signature.starts_with("java.net.ConnectException"));
    assert_eq!(
        clusters[0]
            .members
            .iter()
            .map(|m| (m.test_id.as_str(), m.build_number))
            .collect::<Vec<_>>(),
        vec![("auth/LoginTest/submit", 1), ("auth/LoginTest/submit", 2)]
    );
    assert_eq!(clusters[1].count(), 1);
    assert_eq!(clusters[1].members[0].test_id, "search/QueryTest/empty_query");
}

#[test]
fn diffs_a_build_against_a_reference_build() {
    let options = ExtractOptions::default();
    let reference = extract_report(&login_report(42), &ReportSource::new(1, "node-a"), &options)
        .unwrap()
        .failures;

    let mut batch = ReportBatch::new(options);
    assert!(batch.ingest(&ReportSource::new(2, "node-a"), &login_report(43)));
    assert!(batch.ingest(&ReportSource::new(2, "node-b"), QUERY_FAILURE_REPORT));

    let output = run_analysis(batch.finish(), AnalysisRequest::diff(&reference)).unwrap();
    let AnalysisOutput::Diff(diff) = output else {
        panic!("expected a diff");
    };

    // The login failure approximately matches the reference build and is not
    // a regression; the query failure has no reference counterpart.
    assert_eq!(diff.changed_failures.len(), 0);
    assert_eq!(diff.new_failures.len(), 1);
    assert_eq!(diff.new_failures[0].test_id, "search/QueryTest/empty_query");
    assert_eq!(diff.target_failing_tests, 2);
    assert_eq!(diff.reference_failing_tests, 1);
}

#[test]
fn stability_list_round_trips_into_an_extraction_filter() {
    let options = ExtractOptions {
        track_observations: true,
        ..Default::default()
    };
    let mut batch = ReportBatch::new(options);
    // The login test passes in every build; the query test fails in the two
    // most recent ones.
    assert!(batch.ingest(&ReportSource::new(1, "node-a"), &login_report(42)));
    assert!(batch.ingest(&ReportSource::new(2, "node-a"), QUERY_FAILURE_REPORT));
    assert!(batch.ingest(&ReportSource::new(3, "node-a"), QUERY_FAILURE_REPORT));

    let config = StabilityConfig::new(2, 2, 50.0).unwrap();
    let output = run_analysis(
        batch.finish(),
        AnalysisRequest::ComputeStabilityList { config },
    )
    .unwrap();
    let AnalysisOutput::Stability(list) = output else {
        panic!("expected a stability list");
    };

    // The login test failed in build 1 but passed its two most recent runs
    // with a pass rate above threshold.
    assert_eq!(list.stable["auth.LoginTest&submit"].to_string(), "66.67:3");
    assert_eq!(
        list.unstable["search.QueryTest&empty_query"].to_string(),
        "33.33:3"
    );

    let dir = tempdir().unwrap();
    let path = dir.path().join("stability.list");
    list.write_to(&path).unwrap();

    // Requesting a stable-tests report skips failures of known-unstable
    // tests during the next extraction pass.
    let filter = StabilitySets::load(&path)
        .unwrap()
        .into_filter(StabilityKind::Stable);
    assert!(filter.skips("search.QueryTest.empty_query"));
    assert!(!filter.skips("auth.LoginTest.submit"));

    let filtered = extract_report(
        QUERY_FAILURE_REPORT,
        &ReportSource::new(4, "node-a"),
        &ExtractOptions {
            track_observations: true,
            stability_filter: filter,
        },
    )
    .unwrap();
    assert!(filtered.failures.is_empty());
    // Observations still cover every test case.
    assert_eq!(filtered.observations.len(), 2);
}
