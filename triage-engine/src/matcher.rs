// Copyright (c) The junit-triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Approximate failure-signature matching.

/// Default match threshold, as a percentage of the longer signature.
pub const DEFAULT_DIFF_THRESHOLD: f64 = 10.0;

/// Decides whether two failure signatures represent the same failure.
///
/// Computes the Levenshtein edit distance between `a` and `b`, capped at
/// `ceil(max_len * threshold_percent / 100)`, and accepts the pair if the
/// distance normalized to the longer length stays within the threshold. Two
/// empty signatures always match. A negative threshold caps the distance at
/// zero and then rejects even identical non-empty signatures, which callers
/// use as an "exact match only, and only for empty signatures" degenerate
/// mode.
///
/// The cap matters: this comparison runs O(n²) times during clustering, and
/// the banded computation bails out as soon as the pair cannot possibly
/// match.
pub fn signatures_match(a: &str, b: &str, threshold_percent: f64) -> bool {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let max_len = a.len().max(b.len());
    if max_len == 0 {
        return true;
    }
    let cap = if threshold_percent < 0.0 {
        0
    } else {
        ((max_len as f64 * threshold_percent) / 100.0).ceil() as usize
    };
    // A distance that exceeds the cap counts as maximally different.
    let distance = bounded_levenshtein(&a, &b, cap).unwrap_or(max_len);
    (distance as f64) * 100.0 / (max_len as f64) <= threshold_percent
}

/// Banded Levenshtein distance.
///
/// Returns `None` as soon as it is known the distance exceeds `cap`. Only
/// cells within `cap` of the diagonal are evaluated, so the cost is
/// O(cap · min(n, m)) rather than O(n · m).
fn bounded_levenshtein(left: &[char], right: &[char], cap: usize) -> Option<usize> {
    // Effectively infinite while still safe to add 1 to.
    const INF: usize = usize::MAX / 2;

    let (s, t) = if left.len() <= right.len() {
        (left, right)
    } else {
        (right, left)
    };
    let n = s.len();
    let m = t.len();

    if n == 0 {
        return (m <= cap).then_some(m);
    }
    if m - n > cap {
        return None;
    }

    let mut prev: Vec<usize> = vec![INF; n + 1];
    let mut cur: Vec<usize> = vec![INF; n + 1];
    for (i, cell) in prev.iter_mut().enumerate().take(n.min(cap) + 1) {
        *cell = i;
    }

    for j in 1..=m {
        let t_ch = t[j - 1];
        cur[0] = j;

        let lo = 1.max(j.saturating_sub(cap));
        let hi = n.min(j + cap);
        if lo > hi {
            return None;
        }
        if lo > 1 {
            cur[lo - 1] = INF;
        }
        for i in lo..=hi {
            cur[i] = if s[i - 1] == t_ch {
                prev[i - 1]
            } else {
                1 + prev[i - 1].min(cur[i - 1]).min(prev[i])
            };
        }
        std::mem::swap(&mut prev, &mut cur);
    }

    (prev[n] <= cap).then_some(prev[n])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;

    #[test_case("", "", 0.0, true; "both empty match at zero threshold")]
    #[test_case("", "", -5.0, true; "both empty match even at negative threshold")]
    #[test_case("abc", "abc", 0.0, true; "identical at zero threshold")]
    #[test_case("abc", "abd", 0.0, false; "one edit rejected at zero threshold")]
    #[test_case("abc", "abd", 34.0, true; "one edit in three accepted at 34 percent")]
    #[test_case("abc", "abd", 33.0, false; "one edit in three rejected at 33 percent")]
    #[test_case("abc", "abc", -1.0, false; "negative threshold rejects identical non-empty")]
    #[test_case("aaaaaaaaaa", "bbbbbbbbbb", 50.0, false; "completely different rejected")]
    #[test_case("NPE at Foo.java:10: msg", "NPE at Foo.java:12: msg", 10.0, true; "near-identical stack heads match")]
    fn matches(a: &str, b: &str, threshold: f64, expected: bool) {
        assert_eq!(signatures_match(a, b, threshold), expected);
    }

    #[test]
    fn distance_exceeding_cap_is_reported_as_none() {
        let a: Vec<char> = "kitten".chars().collect();
        let b: Vec<char> = "sitting".chars().collect();
        assert_eq!(bounded_levenshtein(&a, &b, 3), Some(3));
        assert_eq!(bounded_levenshtein(&a, &b, 2), None);
        assert_eq!(bounded_levenshtein(&a, &b, 10), Some(3));
    }

    #[test]
    fn length_difference_beyond_cap_short_circuits() {
        let a: Vec<char> = "ab".chars().collect();
        let b: Vec<char> = "abcdefgh".chars().collect();
        assert_eq!(bounded_levenshtein(&a, &b, 3), None);
        assert_eq!(bounded_levenshtein(&b, &a, 3), None);
    }

    proptest! {
        #[test]
        fn reflexive_for_non_negative_thresholds(s in ".{0,40}", t in 0.0f64..100.0) {
            prop_assert!(signatures_match(&s, &s, t));
        }

        #[test]
        fn zero_threshold_is_exact_match(a in ".{0,20}", b in ".{0,20}") {
            prop_assert_eq!(signatures_match(&a, &b, 0.0), a == b);
        }

        #[test]
        fn symmetric(a in ".{0,20}", b in ".{0,20}", t in 0.0f64..100.0) {
            prop_assert_eq!(signatures_match(&a, &b, t), signatures_match(&b, &a, t));
        }

        #[test]
        fn monotonic_in_threshold(a in ".{0,20}", b in ".{0,20}", t in 0.0f64..90.0, bump in 0.0f64..10.0) {
            if signatures_match(&a, &b, t) {
                prop_assert!(signatures_match(&a, &b, t + bump));
            }
        }
    }
}
