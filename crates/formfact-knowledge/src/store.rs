// SPDX-FileCopyrightText: 2026 Formfact Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The persistent fact store: owner-scoped knowledge entries over SQLite.
//!
//! Implements the `FactStore` capability consumed by the resolution
//! cascade, plus the write paths (extraction ingest, verified upsert,
//! embedding updates, purge) used by the confirmation writer and worker.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, warn};
use uuid::Uuid;

use formfact_core::entry::{EntryKind, KnowledgeEntry, normalize_label_key};
use formfact_core::types::{AdapterType, HealthStatus};
use formfact_core::{FactStore, FormfactError, PluginAdapter};
use formfact_storage::{Database, queries};

use crate::staleness::{StalenessDecision, StalenessPolicy};
use crate::types::{cosine_similarity, now_iso};

/// Outcome of recording a freshly extracted fact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Stored as a new unverified candidate.
    Stored { entry_id: String },
    /// A recently verified value stands; the candidate was dropped.
    SkippedFresh,
}

/// SQLite-backed fact store.
///
/// All reads and writes go through the single-writer [`Database`]. The
/// staleness policy guards extraction ingest only; resolution never
/// consults it.
pub struct KnowledgeStore {
    db: Arc<Database>,
    staleness: StalenessPolicy,
}

impl KnowledgeStore {
    /// Create a store over an opened database.
    pub fn new(db: Arc<Database>, staleness: StalenessPolicy) -> Self {
        Self { db, staleness }
    }

    /// The underlying database handle (shared with the embed worker).
    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }

    /// Fetch one entry by ID.
    pub async fn get_entry(
        &self,
        owner_id: &str,
        id: &str,
    ) -> Result<Option<KnowledgeEntry>, FormfactError> {
        queries::entries::get_entry(&self.db, owner_id, id).await
    }

    /// The canonical verified entry for a group, if any.
    pub async fn verified_in_group(
        &self,
        owner_id: &str,
        group_key: &str,
    ) -> Result<Option<KnowledgeEntry>, FormfactError> {
        queries::entries::verified_in_group(&self.db, owner_id, group_key).await
    }

    /// Atomically upsert the canonical verified entry for a group.
    ///
    /// Returns the canonical row's ID (the pre-existing row's on conflict).
    pub async fn upsert_verified(&self, entry: &KnowledgeEntry) -> Result<String, FormfactError> {
        queries::entries::upsert_verified(&self.db, entry).await
    }

    /// Record a freshly extracted fact, guarded by the staleness policy.
    ///
    /// A verified entry in the same group younger than the staleness window
    /// suppresses the candidate entirely; otherwise the fact is appended as
    /// an unverified entry (disagreeing candidates are kept, never merged)
    /// and an embedding task is queued for it.
    #[allow(clippy::too_many_arguments)]
    pub async fn ingest_extracted(
        &self,
        owner_id: &str,
        label: &str,
        group_key: &str,
        kind: EntryKind,
        payload: &str,
        provenance: &str,
        confidence: f64,
    ) -> Result<IngestOutcome, FormfactError> {
        let existing = self.verified_in_group(owner_id, group_key).await?;
        if let Some(verified) = &existing {
            let decision = self
                .staleness
                .assess(verified.last_verified_at.as_deref(), Utc::now());
            if decision == StalenessDecision::Skip {
                debug!(owner_id, group_key, "verified value is fresh, dropping extraction");
                metrics::counter!("formfact_ingest_skipped_total").increment(1);
                return Ok(IngestOutcome::SkippedFresh);
            }
        }

        let now = now_iso();
        let entry = KnowledgeEntry {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            kind,
            group_key: group_key.to_string(),
            label: label.to_string(),
            label_key: normalize_label_key(label),
            payload: payload.to_string(),
            // 1.0 is reserved for user-confirmed entries.
            confidence: confidence.clamp(0.0, 0.99),
            verified: false,
            last_verified_at: None,
            provenance: provenance.to_string(),
            embedding: None,
            usage_count: 0,
            last_used_at: None,
            created_at: now.clone(),
            updated_at: now,
        };
        queries::entries::insert_entry(&self.db, &entry).await?;
        metrics::counter!("formfact_ingest_stored_total").increment(1);

        // Embedding is fire-and-forget; a queue failure leaves the entry
        // findable by the exact and partial stages.
        let embed_text = format!("{label}: {}", entry.parsed_value().unwrap_or(payload));
        if let Err(e) = self.enqueue_embed(&entry.id, &embed_text).await {
            warn!(entry_id = %entry.id, error = %e, "failed to queue embedding for extracted fact");
        }

        Ok(IngestOutcome::Stored { entry_id: entry.id })
    }

    /// Queue an embedding task for an entry.
    pub async fn enqueue_embed(&self, entry_id: &str, text: &str) -> Result<i64, FormfactError> {
        queries::queue::enqueue(&self.db, entry_id, text).await
    }

    /// Store a freshly generated embedding, replacing any previous vector whole.
    pub async fn set_embedding(&self, entry_id: &str, vector: &[f32]) -> Result<(), FormfactError> {
        queries::entries::set_embedding(&self.db, entry_id, vector).await
    }

    /// Delete all entries of one kind for an owner. Returns the number removed.
    pub async fn purge_kind(&self, owner_id: &str, kind: EntryKind) -> Result<usize, FormfactError> {
        let removed = queries::entries::purge_kind(&self.db, owner_id, kind).await?;
        debug!(owner_id, kind = kind.as_str(), removed, "purged entries");
        Ok(removed)
    }

    /// Entry counts per kind for an owner.
    pub async fn kind_counts(&self, owner_id: &str) -> Result<Vec<(String, i64)>, FormfactError> {
        queries::entries::kind_counts(&self.db, owner_id).await
    }

    /// Embedding tasks still awaiting delivery.
    pub async fn pending_embeds(&self) -> Result<i64, FormfactError> {
        queries::queue::pending_count(&self.db).await
    }
}

#[async_trait]
impl PluginAdapter for KnowledgeStore {
    fn name(&self) -> &str {
        "sqlite-knowledge"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, FormfactError> {
        self.db
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(formfact_storage::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), FormfactError> {
        self.db.close().await
    }
}

#[async_trait]
impl FactStore for KnowledgeStore {
    async fn exact_label_matches(
        &self,
        owner_id: &str,
        label: &str,
    ) -> Result<Vec<KnowledgeEntry>, FormfactError> {
        queries::entries::exact_label_matches(&self.db, owner_id, label).await
    }

    async fn key_overlap_matches(
        &self,
        owner_id: &str,
        label_key: &str,
    ) -> Result<Vec<KnowledgeEntry>, FormfactError> {
        queries::entries::key_overlap_matches(&self.db, owner_id, label_key).await
    }

    async fn distinct_unverified_values(
        &self,
        owner_id: &str,
        label_key: &str,
    ) -> Result<Vec<String>, FormfactError> {
        queries::entries::distinct_unverified_values(&self.db, owner_id, label_key).await
    }

    async fn nearest_neighbors(
        &self,
        owner_id: &str,
        vector: &[f32],
        limit: usize,
        kind_filter: Option<EntryKind>,
    ) -> Result<Vec<(KnowledgeEntry, f32)>, FormfactError> {
        let stored = queries::entries::owner_embeddings(&self.db, owner_id, kind_filter).await?;

        let mut scored: Vec<(String, f32)> = stored
            .into_iter()
            .filter(|(_, embedding)| embedding.len() == vector.len())
            .map(|(id, embedding)| (id, cosine_similarity(vector, &embedding)))
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);

        if scored.is_empty() {
            return Ok(vec![]);
        }

        let ids: Vec<String> = scored.iter().map(|(id, _)| id.clone()).collect();
        let entries = queries::entries::entries_by_ids(&self.db, owner_id, &ids).await?;

        // Re-attach similarities in ranked order.
        let mut ranked = Vec::with_capacity(scored.len());
        for (id, similarity) in &scored {
            if let Some(entry) = entries.iter().find(|e| &e.id == id) {
                ranked.push((entry.clone(), *similarity));
            }
        }
        Ok(ranked)
    }

    async fn mark_used(&self, owner_id: &str, entry_id: &str) -> Result<(), FormfactError> {
        queries::entries::increment_usage(&self.db, owner_id, entry_id).await
    }
}
