// Copyright (c) The junit-triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read JUnit reports and extract comparable failure signatures.
//!
//! This crate parses JUnit/XUnit XML documents produced by one CI build node
//! and turns every `<failure>`, `<error>` and `<skipped>` element into a
//! [`TestFailure`] carrying a canonical, comparable signature. It also records
//! one pass/fail [`TestObservation`] per test case so that long-horizon
//! stability can be computed downstream.

mod errors;
mod extract;
mod identity;
mod report;

pub use errors::*;
pub use extract::*;
pub use report::*;
