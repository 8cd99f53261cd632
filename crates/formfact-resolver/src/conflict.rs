// SPDX-FileCopyrightText: 2026 Formfact Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conflict detection over candidate values for one semantic field.
//!
//! A wrong auto-filled answer is worse than asking the user to
//! disambiguate, so any disagreement among candidates blocks automatic
//! resolution. Distinctness is exact string equality after trim; no
//! semantic equivalence is assumed ("CS" and "Computer Science" are
//! distinct values). Case-insensitive or synonym-aware equality is a known
//! extension point, deliberately not implemented.

/// One candidate value for a field.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// The answer text (already parsed out of the payload convention).
    pub value: String,
    /// Whether the backing entry is user-verified.
    pub verified: bool,
    /// The backing entry's confidence.
    pub confidence: f64,
}

impl Candidate {
    pub fn new(value: impl Into<String>, verified: bool, confidence: f64) -> Self {
        Self {
            value: value.into(),
            verified,
            confidence,
        }
    }
}

/// Outcome of conflict detection over a candidate set.
#[derive(Debug, Clone, PartialEq)]
pub enum ConflictOutcome {
    /// No candidates at all; the stage yields nothing.
    NoCandidates,
    /// Exactly one distinct value; the best-ranked candidate carrying it.
    Unique(Candidate),
    /// More than one distinct value; resolution must defer to the user.
    Conflict,
}

/// Detect whether a candidate set agrees on a single value.
///
/// The unique winner is chosen by preferring verified candidates, then
/// higher confidence.
pub fn detect(candidates: &[Candidate]) -> ConflictOutcome {
    let mut distinct: Vec<&str> = Vec::new();
    for candidate in candidates {
        let value = candidate.value.trim();
        if !distinct.contains(&value) {
            distinct.push(value);
        }
    }

    match distinct.len() {
        0 => ConflictOutcome::NoCandidates,
        1 => {
            let best = candidates
                .iter()
                .max_by(|a, b| {
                    (a.verified, a.confidence)
                        .partial_cmp(&(b.verified, b.confidence))
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .expect("non-empty candidate set");
            ConflictOutcome::Unique(best.clone())
        }
        _ => ConflictOutcome::Conflict,
    }
}
