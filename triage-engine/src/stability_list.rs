// Copyright (c) The junit-triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The stability list file: persistence for stability verdicts.
//!
//! The format is two lines:
//!
//! ```text
//! STABLE=pkg.Suite&test1:98.00:50;pkg.Suite&test2:100.00:12;
//! UNSTABLE=pkg.Suite&test3:40.00:10;
//! ```
//!
//! Each entry is `classname&name:<rate>:<runs>`, semicolon-terminated. A
//! missing trailing separator on the last entry is tolerated when reading.

use crate::{
    errors::StabilityListError,
    stability::{StabilityAssessment, TestVerdict},
};
use camino::Utf8Path;
use indexmap::IndexMap;
use itertools::Itertools;
use junit_extract::{StabilityFilter, StabilityKind};
use std::{collections::HashSet, fmt, io::Write};
use tracing::debug;

const STABLE_PREFIX: &str = "STABLE=";
const UNSTABLE_PREFIX: &str = "UNSTABLE=";

/// Stability verdicts for all classified tests, split by verdict.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StabilityList {
    /// Tests classified STABLE, keyed by `classname&name`.
    pub stable: IndexMap<String, StabilityAssessment>,

    /// Tests classified UNSTABLE, keyed by `classname&name`.
    pub unstable: IndexMap<String, StabilityAssessment>,
}

impl StabilityList {
    /// Files an assessment under its verdict.
    pub fn insert(&mut self, test_key: String, assessment: StabilityAssessment) {
        match assessment.verdict {
            TestVerdict::Stable => self.stable.insert(test_key, assessment),
            TestVerdict::Unstable => self.unstable.insert(test_key, assessment),
        };
    }

    /// Writes the list to `path`, atomically replacing any existing file.
    pub fn write_to(&self, path: &Utf8Path) -> Result<(), StabilityListError> {
        debug!(%path, stable = self.stable.len(), unstable = self.unstable.len(),
               "writing stability list");
        atomicwrites::AtomicFile::new(path, atomicwrites::AllowOverwrite)
            .write(|file| file.write_all(self.to_string().as_bytes()))
            .map_err(|error| {
                let source = match error {
                    atomicwrites::Error::Internal(source) => source,
                    atomicwrites::Error::User(source) => source,
                };
                StabilityListError::Write {
                    path: path.to_owned(),
                    source,
                }
            })
    }
}

impl fmt::Display for StabilityList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = |map: &IndexMap<String, StabilityAssessment>| {
            map.iter()
                .map(|(test_key, assessment)| format!("{test_key}:{assessment};"))
                .join("")
        };
        write!(
            f,
            "{STABLE_PREFIX}{}\n{UNSTABLE_PREFIX}{}",
            entries(&self.stable),
            entries(&self.unstable)
        )
    }
}

/// The test identities read back from a previously written stability list.
///
/// Identities are converted from the persisted `classname&name` form to the
/// `classname.name` form used when matching tests during extraction.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct StabilitySets {
    /// Names of tests previously classified STABLE.
    pub stable: HashSet<String>,

    /// Names of tests previously classified UNSTABLE.
    pub unstable: HashSet<String>,
}

impl StabilitySets {
    /// Reads and parses a stability list file.
    pub fn load(path: &Utf8Path) -> Result<Self, StabilityListError> {
        let content =
            std::fs::read_to_string(path).map_err(|source| StabilityListError::Read {
                path: path.to_owned(),
                source,
            })?;
        Ok(Self::parse(&content))
    }

    /// Parses stability list content.
    ///
    /// Lines without a recognized prefix are ignored, as are empty entries,
    /// so both `...;entry;` and `...;entry` parse identically.
    pub fn parse(content: &str) -> Self {
        let mut sets = Self::default();
        for line in content.lines() {
            if let Some(rest) = line.strip_prefix(STABLE_PREFIX) {
                sets.stable = parse_entries(rest);
            } else if let Some(rest) = line.strip_prefix(UNSTABLE_PREFIX) {
                sets.unstable = parse_entries(rest);
            }
        }
        sets
    }

    /// Converts the sets into an extraction filter for the given report
    /// category.
    pub fn into_filter(self, kind: StabilityKind) -> StabilityFilter {
        StabilityFilter {
            kind: Some(kind),
            stable: self.stable,
            unstable: self.unstable,
        }
    }
}

fn parse_entries(line: &str) -> HashSet<String> {
    line.split(';')
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| entry.split(':').next())
        .map(|test_key| test_key.replace('&', "."))
        .collect()
}
