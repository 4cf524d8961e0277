// Copyright (c) The junit-triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt;

/// The separator between class name and method name in a test identity key.
///
/// This is the key format used by the stability list file, where `.` cannot be
/// used because class names themselves contain dots.
pub const IDENTITY_SEPARATOR: char = '&';

/// Maximum length, in characters, of the display form of a failure signature.
const DISPLAY_LIMIT: usize = 250;

/// Appended to a display signature that was cut off at [`DISPLAY_LIMIT`].
const ELLIPSIS: &str = " ...";

/// Markers that precede the interesting part of a failure description.
///
/// Test runners prepend framing text before the actual stack trace; only the
/// text after the last marker is compared.
const STACK_TRACE_MARKERS: [&str; 2] = ["StackTrace:\n", "Stack Trace:\n"];

/// Identifies where a JUnit report came from: one build and one execution
/// node (e.g. a matrix axis) within that build.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReportSource {
    /// The CI build number.
    pub build_number: u32,

    /// The URL (or other identifier) of the node that produced the report.
    pub node_url: String,
}

impl ReportSource {
    /// Creates a new `ReportSource`.
    pub fn new(build_number: u32, node_url: impl Into<String>) -> Self {
        Self {
            build_number,
            node_url: node_url.into(),
        }
    }
}

impl fmt::Display for ReportSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "build {} at {}", self.build_number, self.node_url)
    }
}

/// The canonicalized text of one test failure, in two forms.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FailureSignature {
    /// The compact comparison form: the first two stack trace lines followed
    /// by the first line of the failure message.
    pub compare: String,

    /// The comparison form truncated for display.
    pub display: String,
}

impl FailureSignature {
    /// Derives a signature from a failure element's `message` attribute and
    /// its text content.
    ///
    /// Stack traces and messages carry run-specific noise (timestamps, object
    /// addresses) beyond their first couple of lines, so only the head of
    /// each is kept. Truncating early makes two occurrences of the same
    /// underlying defect far more likely to produce near-identical
    /// signatures.
    pub fn derive(message: &str, description: &str) -> Self {
        let mut stack = description.trim();
        for marker in STACK_TRACE_MARKERS {
            if let Some(at) = stack.rfind(marker) {
                stack = stack[at + marker.len()..].trim();
                break;
            }
        }
        let stack_head = first_lines(stack, 2);
        let message_head = first_lines(message, 1);
        let compare = if stack_head.trim().is_empty() {
            message_head
        } else {
            format!("{stack_head}: {message_head}")
        };
        let display = truncate_for_display(&compare);
        Self { compare, display }
    }
}

fn first_lines(text: &str, count: usize) -> String {
    text.lines().take(count).collect::<Vec<_>>().join("\n")
}

fn truncate_for_display(compare: &str) -> String {
    let mut indices = compare.char_indices();
    match indices.nth(DISPLAY_LIMIT) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", &compare[..cut]),
        None => compare.to_owned(),
    }
}

/// One failing (or skipped) execution of one test, in one build, on one node.
///
/// Created once per XML parse pass and immutable thereafter.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TestFailure {
    /// The build this failure was observed in.
    pub build_number: u32,

    /// The node the test ran on.
    pub node_url: String,

    /// Path-safe identifier derived from class and method name, unique
    /// within a single report. Retries of the same test get a `_2`, `_3`...
    /// suffix in discovery order.
    pub test_id: String,

    /// Human display name, `classname.name`.
    pub test_name: String,

    /// The bare method name.
    pub short_name: String,

    /// The canonical failure signature.
    pub signature: FailureSignature,
}

/// One pass/fail observation of one test in one build, used to accumulate
/// stability history across builds.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TestObservation {
    /// Test identity key, `classname&name` (see [`IDENTITY_SEPARATOR`]).
    pub test_key: String,

    /// The build the test ran in.
    pub build_number: u32,

    /// True if the test case had at least one `failure` or `error` child.
    /// A skipped test does not count as failed.
    pub failed: bool,
}

/// Everything extracted from a single JUnit report.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ExtractedReport {
    /// One entry per `failure`/`error`/`skipped` element that survived
    /// filtering.
    pub failures: Vec<TestFailure>,

    /// One entry per test case, in document order. Empty unless observation
    /// tracking was requested.
    pub observations: Vec<TestObservation>,
}
