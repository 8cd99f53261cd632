// SPDX-FileCopyrightText: 2026 Formfact Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Label normalization: lookup keys and clean semantic-search queries.
//!
//! Form labels arrive polluted with instructional suffixes ("- please
//! select from the list", trailing asterisks) that would poison both key
//! matching and embedding queries. [`clean_query`] strips known noise via
//! an ordered rule list applied greedily until the label stops changing.

pub use formfact_core::entry::normalize_label_key as normalize_key;

/// Instructional suffixes stripped from labels, checked in order.
///
/// Longer variants come first so a greedy pass removes the most specific
/// form before its prefix would match.
const NOISE_SUFFIXES: &[&str] = &[
    "- please select from the list below",
    "- please select from the list",
    "- please select one",
    "- please select",
    "- please specify",
    "- select from the list",
    "- select one",
    "- select all that apply",
    "(please specify)",
    "(required)",
    "(optional)",
    "(if applicable)",
];

/// Instructional prefixes stripped from labels, checked in order.
const NOISE_PREFIXES: &[&str] = &[
    "please enter your",
    "please enter",
    "please provide your",
    "please provide",
    "enter your",
];

/// Produce a clean natural-language query for semantic search.
///
/// Applies the noise rules greedily: each pass strips at most one prefix,
/// one suffix, and any trailing punctuation; passes repeat until the label
/// is stable. Interior whitespace is collapsed.
pub fn clean_query(label: &str) -> String {
    let mut current = collapse_whitespace(label);

    loop {
        let before = current.len();

        for prefix in NOISE_PREFIXES {
            if let Some(head) = current.get(..prefix.len())
                && head.eq_ignore_ascii_case(prefix)
            {
                current = current[prefix.len()..].trim_start().to_string();
                break;
            }
        }

        for suffix in NOISE_SUFFIXES {
            if current.len() >= suffix.len()
                && let Some(tail) = current.get(current.len() - suffix.len()..)
                && tail.eq_ignore_ascii_case(suffix)
            {
                current.truncate(current.len() - suffix.len());
                break;
            }
        }

        while current.ends_with(['*', ':', '-', '.', ' ', '\t']) {
            current.pop();
        }

        if current.len() == before {
            break;
        }
    }

    current.trim().to_string()
}

/// Collapse runs of whitespace into single spaces and trim the ends.
fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
