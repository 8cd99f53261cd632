// SPDX-FileCopyrightText: 2026 Formfact Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-side capability of the fact store, as seen by the resolution cascade.

use async_trait::async_trait;

use crate::entry::{EntryKind, KnowledgeEntry};
use crate::error::FormfactError;

/// The fact-store capability consumed by the resolution cascade.
///
/// Every method except [`FactStore::mark_used`] is read-only; the cascade
/// never mutates the store while resolving. Keeping the cascade behind this
/// trait lets each stage be tested against a mocked store.
#[async_trait]
pub trait FactStore: Send + Sync {
    /// Entries whose label equals `label` exactly, scoped to the owner.
    async fn exact_label_matches(
        &self,
        owner_id: &str,
        label: &str,
    ) -> Result<Vec<KnowledgeEntry>, FormfactError>;

    /// Entries whose normalized label key is a substring or superset of
    /// `label_key`, scoped to the owner.
    async fn key_overlap_matches(
        &self,
        owner_id: &str,
        label_key: &str,
    ) -> Result<Vec<KnowledgeEntry>, FormfactError>;

    /// Distinct trimmed payload values among *unverified* entries whose
    /// label key overlaps `label_key`.
    async fn distinct_unverified_values(
        &self,
        owner_id: &str,
        label_key: &str,
    ) -> Result<Vec<String>, FormfactError>;

    /// Nearest stored entries to `vector` by cosine similarity, most
    /// similar first, optionally restricted to one entry kind.
    async fn nearest_neighbors(
        &self,
        owner_id: &str,
        vector: &[f32],
        limit: usize,
        kind_filter: Option<EntryKind>,
    ) -> Result<Vec<(KnowledgeEntry, f32)>, FormfactError>;

    /// Record that an entry's value was actually consumed by the integrator.
    ///
    /// Increments `usage_count` and stamps `last_used_at`. Fire-and-forget
    /// telemetry; last write wins under concurrency.
    async fn mark_used(&self, owner_id: &str, entry_id: &str) -> Result<(), FormfactError>;
}
