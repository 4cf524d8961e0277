// Copyright (c) The junit-triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by the triage engine.

use camino::Utf8PathBuf;
use std::io;
use thiserror::Error;

/// An error in analysis configuration, caught before any processing begins.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConfigError {
    /// `min_test_runs` must be at least 1.
    #[error("minimum test runs must be at least 1")]
    MinTestRunsZero,

    /// `last_stable_runs` must be at least 1.
    #[error("last stable runs window must be at least 1")]
    LastStableRunsZero,

    /// The stability rate threshold is a percentage.
    #[error("stability rate threshold must be within 0..=100 (got {0})")]
    StabilityRateOutOfRange(f64),

    /// Match thresholds may be negative (exact-match mode) but not NaN or
    /// infinite.
    #[error("match threshold must be a finite percentage (got {0})")]
    ThresholdNotFinite(f64),
}

/// An error reading or writing a stability list file.
#[derive(Debug, Error)]
pub enum StabilityListError {
    /// The stability list could not be read.
    #[error("failed to read stability list at `{path}`")]
    Read {
        /// The file that could not be read.
        path: Utf8PathBuf,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// The stability list could not be written.
    #[error("failed to write stability list to `{path}`")]
    Write {
        /// The file that could not be written.
        path: Utf8PathBuf,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },
}
