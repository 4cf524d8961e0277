// Copyright (c) The junit-triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Path-safe test identifier derivation.
//!
//! A test identifier mirrors the `package/Class/method` layout used by CI
//! test-report URLs: the class name is broken at its last dot into a package
//! part and a class part, and characters that are unsafe in a path segment
//! are replaced with underscores.

/// Placeholder package for class names without any dot.
const ROOT_PACKAGE: &str = "(root)";

/// Characters replaced with `_` in the method segment.
const METHOD_UNSAFE: &[char] = &[
    '{', '}', '.', ':', '+', '\r', '\n', ' ', '\\', '(', ')', '[', ']', '/', ',', '"', '\'', '&',
    '%', '*', '^', '<', '>', '@', '#', '=', '-',
];

/// Derives the path-safe identifier for one test case.
///
/// A class name ending in a trailing dot treats the final segment as part of
/// the package rather than the class, leaving the class segment empty.
/// Duplicate handling (the `_2` suffix for retries) is the caller's job: the
/// same inputs always produce the same identifier.
pub(crate) fn test_path_id(classname: &str, method_name: &str) -> String {
    let trailing_dot = classname.ends_with('.');
    let mut tokens: Vec<&str> = classname.split('.').collect();
    while tokens.last().is_some_and(|token| token.is_empty()) {
        tokens.pop();
    }

    let package = if tokens.len() < 2 {
        ROOT_PACKAGE.to_owned()
    } else if trailing_dot {
        tokens.join(".")
    } else {
        tokens[..tokens.len() - 1].join(".")
    };
    let class = if trailing_dot {
        ""
    } else {
        tokens.last().copied().unwrap_or("")
    };

    format!(
        "{}/{}/{}",
        package.replace([':', '#'], "_"),
        class.replace([':', '/', '<', '>'], "_"),
        method_name.replace(METHOD_UNSAFE, "_"),
    )
}
