// Copyright (c) The junit-triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JUnit XML report extraction.

use crate::{
    errors::ReportParseError,
    identity::test_path_id,
    report::{
        ExtractedReport, FailureSignature, IDENTITY_SEPARATOR, ReportSource, TestFailure,
        TestObservation,
    },
};
use quick_xml::{
    Reader,
    events::{BytesStart, Event},
};
use std::collections::{HashMap, HashSet};

/// Maximum number of newlines rewritten per failure/error block.
///
/// Caps the cost of very large stack traces; only the head of the trace
/// participates in signature comparison anyway.
const MAX_REWRITTEN_LINES: usize = 10;

/// The XML numeric entity for a newline.
const NEWLINE_ENTITY: &str = "&#10;";

/// Which stability category a report is being produced for.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StabilityKind {
    /// Keep failures of tests known to be stable.
    Stable,
    /// Keep failures of tests known to be unstable.
    Unstable,
}

/// An allow/deny filter driven by a previously computed stability list.
///
/// Test names are in `classname.name` form.
#[derive(Clone, Debug, Default)]
pub struct StabilityFilter {
    /// The requested report category.
    pub kind: Option<StabilityKind>,
    /// Tests previously classified stable.
    pub stable: HashSet<String>,
    /// Tests previously classified unstable.
    pub unstable: HashSet<String>,
}

impl StabilityFilter {
    /// Returns true if failures of `test_name` should be skipped entirely.
    ///
    /// A failure is skipped only when the test is known to be in exactly the
    /// opposite category and not also in the requested one.
    pub fn skips(&self, test_name: &str) -> bool {
        match self.kind {
            Some(StabilityKind::Stable) => {
                !self.stable.contains(test_name) && self.unstable.contains(test_name)
            }
            Some(StabilityKind::Unstable) => {
                !self.unstable.contains(test_name) && self.stable.contains(test_name)
            }
            None => false,
        }
    }
}

/// Options controlling a report extraction pass.
#[derive(Clone, Debug, Default)]
pub struct ExtractOptions {
    /// Record one pass/fail observation per test case.
    pub track_observations: bool,

    /// Filter failures by a prior stability classification.
    pub stability_filter: StabilityFilter,
}

/// Parses one JUnit XML report and extracts failures and observations.
///
/// An empty input string is a valid no-failures report. Malformed XML fails
/// as a unit: nothing extracted before the error is returned.
pub fn extract_report(
    xml: &str,
    report_source: &ReportSource,
    options: &ExtractOptions,
) -> Result<ExtractedReport, ReportParseError> {
    if xml.is_empty() {
        return Ok(ExtractedReport::default());
    }

    let rewritten = encode_newlines_in_failures(xml);
    let mut reader = Reader::from_str(&rewritten);
    let parse_err = |source| ReportParseError::new(report_source, source);

    let mut out = ExtractedReport::default();
    let mut id_counts: HashMap<String, usize> = HashMap::new();
    let mut case: Option<CaseState> = None;
    let mut child: Option<ChildState> = None;

    loop {
        match reader.read_event().map_err(parse_err)? {
            Event::Start(start) => match start.local_name().as_ref() {
                b"testcase" => {
                    case = Some(
                        CaseState::open(&start, &mut id_counts, report_source).map_err(parse_err)?,
                    );
                }
                b"failure" | b"error" | b"skipped" if case.is_some() => {
                    child = Some(ChildState::open(&start).map_err(parse_err)?);
                }
                _ => {}
            },
            Event::Empty(start) => match start.local_name().as_ref() {
                b"testcase" => {
                    // A self-closing test case has no children: a plain pass.
                    CaseState::open(&start, &mut id_counts, report_source)
                        .map_err(parse_err)?
                        .close(options, &mut out);
                }
                b"failure" | b"error" | b"skipped" => {
                    if let Some(case) = case.as_mut() {
                        ChildState::open(&start)
                            .map_err(parse_err)?
                            .close(case, options, &mut out);
                    }
                }
                _ => {}
            },
            Event::Text(text) => {
                if let Some(child) = child.as_mut() {
                    child
                        .description
                        .push_str(&text.unescape().map_err(parse_err)?);
                }
            }
            Event::CData(data) => {
                if let Some(child) = child.as_mut() {
                    // The newline rewrite pre-pass cannot see CDATA
                    // boundaries, and CDATA content is never unescaped by the
                    // parser, so the entities it inserted are undone here.
                    let raw = String::from_utf8_lossy(&data.into_inner())
                        .replace(NEWLINE_ENTITY, "\n");
                    child.description.push_str(&raw);
                }
            }
            Event::End(end) => match end.local_name().as_ref() {
                b"testcase" => {
                    if let Some(case) = case.take() {
                        case.close(options, &mut out);
                    }
                }
                b"failure" | b"error" | b"skipped" => {
                    if let (Some(finished), Some(case)) = (child.take(), case.as_mut()) {
                        finished.close(case, options, &mut out);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(out)
}

/// In-flight state for one `<testcase>` element.
struct CaseState<'a> {
    report_source: &'a ReportSource,
    test_id: String,
    test_name: String,
    short_name: String,
    identity_key: String,
    failed: bool,
}

impl<'a> CaseState<'a> {
    fn open(
        start: &BytesStart<'_>,
        id_counts: &mut HashMap<String, usize>,
        report_source: &'a ReportSource,
    ) -> Result<Self, quick_xml::Error> {
        let classname = attr_string(start, "classname")?;
        let short_name = attr_string(start, "name")?;

        let base_id = test_path_id(&classname, &short_name);
        let count = id_counts.entry(base_id.clone()).or_insert(0);
        *count += 1;
        let test_id = if *count < 2 {
            base_id
        } else {
            format!("{base_id}_{count}")
        };

        Ok(Self {
            report_source,
            test_id,
            test_name: format!("{classname}.{short_name}"),
            identity_key: format!("{classname}{IDENTITY_SEPARATOR}{short_name}"),
            short_name,
            failed: false,
        })
    }

    fn close(self, options: &ExtractOptions, out: &mut ExtractedReport) {
        if options.track_observations {
            out.observations.push(TestObservation {
                test_key: self.identity_key,
                build_number: self.report_source.build_number,
                failed: self.failed,
            });
        }
    }
}

/// The kind of non-success child element within a test case.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum ChildKind {
    Failure,
    Error,
    Skipped,
}

impl ChildKind {
    /// Skipped tests produce failure records for grouping but do not count
    /// as failed runs for stability tracking.
    fn counts_as_failed(self) -> bool {
        matches!(self, ChildKind::Failure | ChildKind::Error)
    }
}

/// In-flight state for one `failure`/`error`/`skipped` element.
struct ChildState {
    kind: ChildKind,
    message: String,
    description: String,
}

impl ChildState {
    fn open(start: &BytesStart<'_>) -> Result<Self, quick_xml::Error> {
        let kind = match start.local_name().as_ref() {
            b"failure" => ChildKind::Failure,
            b"error" => ChildKind::Error,
            _ => ChildKind::Skipped,
        };
        Ok(Self {
            kind,
            message: attr_string(start, "message")?,
            description: String::new(),
        })
    }

    fn close(self, case: &mut CaseState<'_>, options: &ExtractOptions, out: &mut ExtractedReport) {
        if self.kind.counts_as_failed() {
            case.failed = true;
        }
        if options.stability_filter.skips(&case.test_name) {
            return;
        }
        out.failures.push(TestFailure {
            build_number: case.report_source.build_number,
            node_url: case.report_source.node_url.clone(),
            test_id: case.test_id.clone(),
            test_name: case.test_name.clone(),
            short_name: case.short_name.clone(),
            signature: FailureSignature::derive(&self.message, &self.description),
        });
    }
}

fn attr_string(start: &BytesStart<'_>, name: &str) -> Result<String, quick_xml::Error> {
    Ok(match start.try_get_attribute(name)? {
        Some(attr) => attr.unescape_value()?.into_owned(),
        None => String::new(),
    })
}

/// Rewrites raw newlines inside `<failure message=` and `<error message=`
/// blocks to the XML numeric newline entity.
///
/// XML parsers collapse raw newlines in attribute values to spaces, which
/// destroys the stack trace structure needed for signature comparison. Only
/// the first [`MAX_REWRITTEN_LINES`] newlines of each block are rewritten.
fn encode_newlines_in_failures(xml: &str) -> String {
    let rewritten = encode_newlines(xml, "<failure message=", "</failure>");
    encode_newlines(&rewritten, "<error message=", "</error>")
}

fn encode_newlines(xml: &str, open_tag: &str, close_tag: &str) -> String {
    let mut out = String::with_capacity(xml.len());
    let mut rest = xml;
    loop {
        let Some(open_at) = rest.find(open_tag) else {
            out.push_str(rest);
            return out;
        };
        out.push_str(&rest[..open_at]);
        rest = &rest[open_at..];

        let mut replacing = false;
        let mut rewritten = 0usize;
        loop {
            let Some(newline_at) = rest.find('\n') else {
                out.push_str(rest);
                return out;
            };
            let line = &rest[..newline_at];
            rest = &rest[newline_at + 1..];
            out.push_str(line);
            if line.contains(close_tag) || rewritten >= MAX_REWRITTEN_LINES {
                // Back to normal copying until the next opening tag.
                out.push('\n');
                break;
            }
            if line.contains(open_tag) {
                out.push_str(NEWLINE_ENTITY);
                replacing = true;
                rewritten = 1;
            } else if replacing {
                out.push_str(NEWLINE_ENTITY);
                rewritten += 1;
            } else {
                out.push('\n');
            }
        }
    }
}
