// SPDX-FileCopyrightText: 2026 Formfact Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The confirmation writer: the only path that marks an entry verified.

use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use formfact_core::entry::{EntryKind, KnowledgeEntry, format_value_payload, normalize_label_key};
use formfact_core::FormfactError;

use crate::store::KnowledgeStore;
use crate::types::now_iso;

/// Provenance recorded on every confirmed entry.
const USER_CONFIRMED: &str = "user_confirmed";

/// Records user-accepted values as canonical verified entries.
///
/// Confirmation is the only way an entry reaches `verified = true` and
/// confidence 1.0. The upsert is a single atomic statement keyed on the
/// verified partition's unique index, so two racing confirmations for the
/// same group collapse into one row with the later write winning.
pub struct ConfirmationWriter {
    store: Arc<KnowledgeStore>,
}

impl ConfirmationWriter {
    /// Create a writer over the fact store.
    pub fn new(store: Arc<KnowledgeStore>) -> Self {
        Self { store }
    }

    /// Idempotently record `value` as the canonical verified answer for
    /// `field_key`.
    ///
    /// Updates the existing verified entry for (owner, field_key) in place,
    /// or creates one with confidence 1.0. After the commit, an embedding
    /// task for `"{raw_label}: {value}"` is queued; a queue failure only
    /// degrades semantic search for this entry, never the canonical value.
    ///
    /// Returns the canonical entry's ID.
    pub async fn confirm_field(
        &self,
        owner_id: &str,
        field_key: &str,
        raw_label: &str,
        value: &str,
    ) -> Result<String, FormfactError> {
        let now = now_iso();
        let entry = KnowledgeEntry {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            kind: EntryKind::DerivedFieldValue,
            group_key: field_key.to_string(),
            label: raw_label.to_string(),
            label_key: normalize_label_key(raw_label),
            payload: format_value_payload(value),
            confidence: 1.0,
            verified: true,
            last_verified_at: Some(now.clone()),
            provenance: USER_CONFIRMED.to_string(),
            embedding: None,
            usage_count: 0,
            last_used_at: None,
            created_at: now.clone(),
            updated_at: now,
        };

        let canonical_id = self.store.upsert_verified(&entry).await?;
        debug!(owner_id, field_key, entry_id = %canonical_id, "confirmed field value");
        metrics::counter!("formfact_confirmations_total").increment(1);

        let embed_text = format!("{raw_label}: {}", value.trim());
        if let Err(e) = self.store.enqueue_embed(&canonical_id, &embed_text).await {
            warn!(entry_id = %canonical_id, error = %e, "failed to queue embedding after confirmation");
        }

        Ok(canonical_id)
    }
}
