// Copyright (c) The junit-triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Failure triage over JUnit reports from CI builds.
//!
//! This crate consumes the failures and observations extracted by
//! [`junit-extract`](junit_extract) and produces three aggregated views:
//!
//! - [`cluster`]: groups of near-identical failures across builds and nodes,
//!   ranked by frequency;
//! - [`diff`]: the new and changed failures of a target build compared to a
//!   reference build;
//! - [`stability`]: a STABLE/UNSTABLE verdict per test from its historical
//!   pass/fail sequence, persisted via [`stability_list`].
//!
//! The engine is single-threaded and CPU-bound over already-fetched report
//! text. Fetching reports, caching them, and rendering the resulting data are
//! all the caller's concern.

pub mod batch;
pub mod cluster;
pub mod diff;
pub mod errors;
pub mod matcher;
pub mod mode;
pub mod stability;
pub mod stability_list;
