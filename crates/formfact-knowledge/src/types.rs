// SPDX-FileCopyrightText: 2026 Formfact Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Similarity scoring helpers for the fact store.

use formfact_core::KnowledgeEntry;

/// An entry with its cosine similarity from a nearest-neighbor search.
#[derive(Debug, Clone)]
pub struct ScoredEntry {
    pub entry: KnowledgeEntry,
    pub similarity: f32,
}

/// Compute cosine similarity between two vectors.
///
/// Stored vectors are L2-normalized at write time, so this is the dot
/// product. Mismatched lengths yield 0.0 (never comparable).
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Produce the current timestamp in the store's ISO 8601 format.
pub fn now_iso() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}
