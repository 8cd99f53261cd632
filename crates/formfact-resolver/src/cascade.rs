// SPDX-FileCopyrightText: 2026 Formfact Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The resolution cascade: ordered lookup strategies over the fact store.
//!
//! Stages run strictly in order, short-circuiting at the first usable
//! result, and consult the conflict detector before accepting any stage's
//! candidate set. The cascade prefers `Deferred`/`NoMatch` over any guess:
//! a wrong auto-filled answer costs more than asking the user.
//!
//! Read stages never mutate the store. Usage telemetry is recorded only
//! when the integrator reports a value as actually consumed, via
//! [`Resolver::mark_consumed`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use formfact_config::model::ResolverConfig;
use formfact_core::entry::{EntryKind, KnowledgeEntry};
use formfact_core::types::EmbeddingInput;
use formfact_core::{EmbeddingAdapter, FactStore, FormfactError};

use crate::conflict::{self, Candidate, ConflictOutcome};
use crate::extract;
use crate::normalize::{clean_query, normalize_key};
use crate::obvious::{self, FieldClass};

/// The integrator-reported control type of the form field.
///
/// Only biases which structured-extraction pattern the broad fallback
/// tries; obviousness and stakes always derive from the label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    Text,
    Email,
    Phone,
    Number,
    Date,
    Select,
    Textarea,
}

/// Outcome of resolving one field.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// A single confident value, with the entry that supplied it.
    Value { value: String, entry_id: String },
    /// Conflicting candidates exist; the caller must ask the user.
    Deferred,
    /// Nothing known; the caller falls back to generative assistance.
    NoMatch,
}

/// Resolves form fields against the fact store.
///
/// The embedder is optional: without one (or when it fails), the semantic
/// stages are skipped and only exact/partial matching runs.
pub struct Resolver {
    store: Arc<dyn FactStore>,
    embedder: Option<Arc<dyn EmbeddingAdapter>>,
    config: ResolverConfig,
}

impl Resolver {
    /// Create a resolver over a fact store and an optional embedding capability.
    pub fn new(
        store: Arc<dyn FactStore>,
        embedder: Option<Arc<dyn EmbeddingAdapter>>,
        config: ResolverConfig,
    ) -> Self {
        Self {
            store,
            embedder,
            config,
        }
    }

    /// Resolve a labeled field to the best already-known value.
    pub async fn resolve_field(
        &self,
        owner_id: &str,
        raw_label: &str,
        field_kind: FieldKind,
    ) -> Result<Resolution, FormfactError> {
        let resolution = self.run_cascade(owner_id, raw_label, field_kind).await?;
        let status = match &resolution {
            Resolution::Value { .. } => "value",
            Resolution::Deferred => "deferred",
            Resolution::NoMatch => "no_match",
        };
        metrics::counter!("formfact_resolutions_total", "status" => status).increment(1);
        debug!(owner_id, raw_label, status, "field resolved");
        Ok(resolution)
    }

    async fn run_cascade(
        &self,
        owner_id: &str,
        raw_label: &str,
        field_kind: FieldKind,
    ) -> Result<Resolution, FormfactError> {
        let label_key = normalize_key(raw_label);

        // Stage 1: obviousness gate. Non-obvious fields never reach the
        // store or the embedding service.
        let Some(class) = obvious::match_obvious(&label_key) else {
            return Ok(Resolution::NoMatch);
        };

        // Stage 2: exact label match.
        let exact = self.store.exact_label_matches(owner_id, raw_label).await?;
        if let Some(resolution) = self.judge_entries(owner_id, &label_key, &exact).await? {
            return Ok(resolution);
        }

        // Stage 3: normalized partial match.
        let overlap = self.store.key_overlap_matches(owner_id, &label_key).await?;
        if let Some(resolution) = self.judge_entries(owner_id, &label_key, &overlap).await? {
            return Ok(resolution);
        }

        // Stage 4: the unverified-candidate guard also runs when stages
        // 2-3 produced nothing usable at all.
        if self.unverified_disagreement(owner_id, &label_key).await? {
            return Ok(Resolution::Deferred);
        }

        // Stages 5-6 need the embedding capability; its absence or failure
        // falls through to NoMatch without surfacing an error.
        let Some(embedder) = &self.embedder else {
            return Ok(Resolution::NoMatch);
        };

        let query = clean_query(raw_label);
        match self.semantic_stages(owner_id, &query, class, field_kind, embedder).await {
            Ok(resolution) => Ok(resolution),
            Err(e) if e.is_capability_unavailable() => {
                warn!(owner_id, raw_label, error = %e, "embedding capability unavailable, skipping semantic stages");
                Ok(Resolution::NoMatch)
            }
            Err(e) => Err(e),
        }
    }

    /// Judge one stage's entry set: conflict-check, then return the unique
    /// value unless disagreeing unverified candidates veto it.
    ///
    /// Returns `None` when the stage yields no usable candidates and the
    /// cascade should continue.
    async fn judge_entries(
        &self,
        owner_id: &str,
        label_key: &str,
        entries: &[KnowledgeEntry],
    ) -> Result<Option<Resolution>, FormfactError> {
        let candidates = value_candidates(entries);
        match conflict::detect(&candidates) {
            ConflictOutcome::Conflict => Ok(Some(Resolution::Deferred)),
            ConflictOutcome::NoCandidates => Ok(None),
            ConflictOutcome::Unique(winner) => {
                // The guard runs regardless of this stage's outcome: two
                // disagreeing extractions elsewhere in the overlap set
                // still veto an otherwise-unique answer.
                if self.unverified_disagreement(owner_id, label_key).await? {
                    return Ok(Some(Resolution::Deferred));
                }
                let entry = entries
                    .iter()
                    .find(|e| {
                        e.parsed_value().is_some_and(|v| v == winner.value)
                            && e.verified == winner.verified
                    })
                    .or_else(|| entries.first());
                Ok(entry.map(|e| Resolution::Value {
                    value: winner.value.clone(),
                    entry_id: e.id.clone(),
                }))
            }
        }
    }

    /// True when more than one distinct unverified value exists for the
    /// label's key neighborhood.
    async fn unverified_disagreement(
        &self,
        owner_id: &str,
        label_key: &str,
    ) -> Result<bool, FormfactError> {
        let payloads = self
            .store
            .distinct_unverified_values(owner_id, label_key)
            .await?;
        let mut distinct: Vec<String> = Vec::new();
        for payload in &payloads {
            let value = formfact_core::parse_value_payload(payload)
                .unwrap_or(payload.trim())
                .to_string();
            if !distinct.contains(&value) {
                distinct.push(value);
            }
        }
        Ok(distinct.len() > 1)
    }

    /// Stages 5 and 6: semantic similarity, then the broad fallback.
    async fn semantic_stages(
        &self,
        owner_id: &str,
        query: &str,
        class: FieldClass,
        field_kind: FieldKind,
        embedder: &Arc<dyn EmbeddingAdapter>,
    ) -> Result<Resolution, FormfactError> {
        // Stage 5: high-confidence similarity over derived field values.
        let output = embedder
            .embed(EmbeddingInput {
                texts: vec![query.to_string()],
            })
            .await?;
        let query_vector = output
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| FormfactError::Internal("embedding returned no vectors".to_string()))?;

        let hits = self
            .store
            .nearest_neighbors(
                owner_id,
                &query_vector,
                self.config.neighbor_limit,
                Some(EntryKind::DerivedFieldValue),
            )
            .await?;

        let confident: Vec<&(KnowledgeEntry, f32)> = hits
            .iter()
            .filter(|(_, sim)| *sim as f64 >= self.config.semantic_threshold)
            .collect();
        let candidates: Vec<Candidate> = confident
            .iter()
            .filter_map(|(entry, _)| {
                entry
                    .parsed_value()
                    .map(|v| Candidate::new(v, entry.verified, entry.confidence))
            })
            .collect();
        match conflict::detect(&candidates) {
            ConflictOutcome::Conflict => return Ok(Resolution::Deferred),
            ConflictOutcome::Unique(winner) => {
                if let Some((entry, _)) = confident
                    .iter()
                    .find(|(e, _)| e.parsed_value().is_some_and(|v| v == winner.value))
                {
                    return Ok(Resolution::Value {
                        value: winner.value,
                        entry_id: entry.id.clone(),
                    });
                }
            }
            ConflictOutcome::NoCandidates => {}
        }

        // Stage 6: broad fallback over all knowledge, with query variants.
        self.broad_fallback(owner_id, query, query_vector, class, field_kind, embedder)
            .await
    }

    async fn broad_fallback(
        &self,
        owner_id: &str,
        query: &str,
        base_vector: Vec<f32>,
        class: FieldClass,
        field_kind: FieldKind,
        embedder: &Arc<dyn EmbeddingAdapter>,
    ) -> Result<Resolution, FormfactError> {
        let variants = vec![format!("{query} degree"), format!("{query} education")];
        let output = embedder
            .embed(EmbeddingInput { texts: variants })
            .await?;

        let mut best: Option<(KnowledgeEntry, f32)> = None;
        for vector in std::iter::once(base_vector).chain(output.embeddings) {
            let hits = self
                .store
                .nearest_neighbors(owner_id, &vector, self.config.neighbor_limit, None)
                .await?;
            for (entry, sim) in hits {
                if (sim as f64) < self.config.broad_threshold {
                    continue;
                }
                if best.as_ref().is_none_or(|(_, best_sim)| sim > *best_sim) {
                    best = Some((entry, sim));
                }
            }
        }

        let Some((entry, similarity)) = best else {
            return Ok(Resolution::NoMatch);
        };
        debug!(entry_id = %entry.id, similarity, "broad fallback hit");

        let content = entry.parsed_value().unwrap_or(entry.payload.trim());
        if let Some(pattern) = extract::pattern_for(class, field_kind)
            && let Some(value) = extract::extract(pattern, content)
        {
            return Ok(Resolution::Value {
                value,
                entry_id: entry.id.clone(),
            });
        }

        // Extraction failed (or no pattern applies). High-stakes fields
        // refuse raw prose; everything else gets the trimmed content.
        if class.high_stakes() {
            return Ok(Resolution::NoMatch);
        }
        Ok(Resolution::Value {
            value: content.to_string(),
            entry_id: entry.id.clone(),
        })
    }

    /// Report that a resolved value was actually consumed by the integrator.
    ///
    /// Fire-and-forget telemetry; errors are logged, never surfaced.
    pub async fn mark_consumed(&self, owner_id: &str, entry_id: &str) {
        if let Err(e) = self.store.mark_used(owner_id, entry_id).await {
            warn!(owner_id, entry_id, error = %e, "failed to record entry usage");
        }
    }
}

/// Build conflict candidates from a stage's entries.
///
/// Only derived field values with a well-formed `Value:` payload
/// participate; freeform prose and malformed payloads are skipped, never
/// substituted directly.
fn value_candidates(entries: &[KnowledgeEntry]) -> Vec<Candidate> {
    entries
        .iter()
        .filter(|entry| entry.kind == EntryKind::DerivedFieldValue)
        .filter_map(|entry| {
            entry
                .parsed_value()
                .map(|value| Candidate::new(value, entry.verified, entry.confidence))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use formfact_core::entry::normalize_label_key;
    use formfact_core::types::{AdapterType, EmbeddingOutput, HealthStatus};
    use formfact_core::PluginAdapter;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory fact store recording which methods were called.
    #[derive(Default)]
    struct MockStore {
        entries: Vec<KnowledgeEntry>,
        calls: Mutex<Vec<&'static str>>,
    }

    impl MockStore {
        fn with_entries(entries: Vec<KnowledgeEntry>) -> Self {
            Self {
                entries,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn record(&self, name: &'static str) {
            self.calls.lock().unwrap().push(name);
        }

        fn called(&self, name: &str) -> bool {
            self.calls.lock().unwrap().iter().any(|c| *c == name)
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        fn keys_overlap(a: &str, b: &str) -> bool {
            !a.is_empty() && !b.is_empty() && (a.contains(b) || b.contains(a))
        }
    }

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() || a.is_empty() {
            return 0.0;
        }
        a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
    }

    #[async_trait]
    impl FactStore for MockStore {
        async fn exact_label_matches(
            &self,
            owner_id: &str,
            label: &str,
        ) -> Result<Vec<KnowledgeEntry>, FormfactError> {
            self.record("exact_label_matches");
            let mut matches: Vec<KnowledgeEntry> = self
                .entries
                .iter()
                .filter(|e| e.owner_id == owner_id && e.label == label)
                .cloned()
                .collect();
            matches.sort_by(|a, b| {
                (b.verified, b.confidence)
                    .partial_cmp(&(a.verified, a.confidence))
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            Ok(matches)
        }

        async fn key_overlap_matches(
            &self,
            owner_id: &str,
            label_key: &str,
        ) -> Result<Vec<KnowledgeEntry>, FormfactError> {
            self.record("key_overlap_matches");
            let mut matches: Vec<KnowledgeEntry> = self
                .entries
                .iter()
                .filter(|e| e.owner_id == owner_id && Self::keys_overlap(&e.label_key, label_key))
                .cloned()
                .collect();
            matches.sort_by(|a, b| {
                (b.verified, b.confidence)
                    .partial_cmp(&(a.verified, a.confidence))
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            Ok(matches)
        }

        async fn distinct_unverified_values(
            &self,
            owner_id: &str,
            label_key: &str,
        ) -> Result<Vec<String>, FormfactError> {
            self.record("distinct_unverified_values");
            let mut values: Vec<String> = Vec::new();
            for entry in self.entries.iter().filter(|e| {
                e.owner_id == owner_id
                    && !e.verified
                    && Self::keys_overlap(&e.label_key, label_key)
            }) {
                let trimmed = entry.payload.trim().to_string();
                if !values.contains(&trimmed) {
                    values.push(trimmed);
                }
            }
            Ok(values)
        }

        async fn nearest_neighbors(
            &self,
            owner_id: &str,
            vector: &[f32],
            limit: usize,
            kind_filter: Option<EntryKind>,
        ) -> Result<Vec<(KnowledgeEntry, f32)>, FormfactError> {
            self.record("nearest_neighbors");
            let mut hits: Vec<(KnowledgeEntry, f32)> = self
                .entries
                .iter()
                .filter(|e| e.owner_id == owner_id)
                .filter(|e| kind_filter.is_none_or(|k| e.kind == k))
                .filter_map(|e| {
                    e.embedding
                        .as_ref()
                        .map(|emb| (e.clone(), cosine(vector, emb)))
                })
                .collect();
            hits.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
            hits.truncate(limit);
            Ok(hits)
        }

        async fn mark_used(&self, _owner_id: &str, _entry_id: &str) -> Result<(), FormfactError> {
            self.record("mark_used");
            Ok(())
        }
    }

    /// Embedder returning registered vectors, or a zero vector by default.
    struct MockEmbedder {
        vectors: HashMap<String, Vec<f32>>,
        fail: bool,
        dimensions: usize,
    }

    impl MockEmbedder {
        fn new(dimensions: usize) -> Self {
            Self {
                vectors: HashMap::new(),
                fail: false,
                dimensions,
            }
        }

        fn register(mut self, text: &str, vector: Vec<f32>) -> Self {
            self.vectors.insert(text.to_string(), vector);
            self
        }

        fn failing() -> Self {
            Self {
                vectors: HashMap::new(),
                fail: true,
                dimensions: 2,
            }
        }
    }

    #[async_trait]
    impl PluginAdapter for MockEmbedder {
        fn name(&self) -> &str {
            "mock-embedder"
        }
        fn version(&self) -> semver::Version {
            semver::Version::new(0, 1, 0)
        }
        fn adapter_type(&self) -> AdapterType {
            AdapterType::Embedding
        }
        async fn health_check(&self) -> Result<HealthStatus, FormfactError> {
            Ok(HealthStatus::Healthy)
        }
        async fn shutdown(&self) -> Result<(), FormfactError> {
            Ok(())
        }
    }

    #[async_trait]
    impl EmbeddingAdapter for MockEmbedder {
        async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, FormfactError> {
            if self.fail {
                return Err(FormfactError::Embedding {
                    message: "service unreachable".to_string(),
                    source: None,
                });
            }
            let embeddings = input
                .texts
                .iter()
                .map(|text| {
                    self.vectors
                        .get(text)
                        .cloned()
                        .unwrap_or_else(|| vec![0.0; self.dimensions])
                })
                .collect();
            Ok(EmbeddingOutput {
                embeddings,
                dimensions: self.dimensions,
            })
        }
    }

    fn entry(label: &str, payload: &str, verified: bool) -> KnowledgeEntry {
        KnowledgeEntry {
            id: format!("e-{label}-{payload}-{verified}"),
            owner_id: "owner-1".to_string(),
            kind: EntryKind::DerivedFieldValue,
            group_key: normalize_label_key(label),
            label: label.to_string(),
            label_key: normalize_label_key(label),
            payload: payload.to_string(),
            confidence: if verified { 1.0 } else { 0.7 },
            verified,
            last_verified_at: verified.then(|| "2026-06-01T00:00:00.000Z".to_string()),
            provenance: "test".to_string(),
            embedding: None,
            usage_count: 0,
            last_used_at: None,
            created_at: "2026-06-01T00:00:00.000Z".to_string(),
            updated_at: "2026-06-01T00:00:00.000Z".to_string(),
        }
    }

    fn resolver(store: MockStore, embedder: Option<MockEmbedder>) -> (Resolver, Arc<MockStore>) {
        let store = Arc::new(store);
        let resolver = Resolver::new(
            store.clone(),
            embedder.map(|e| Arc::new(e) as Arc<dyn EmbeddingAdapter>),
            ResolverConfig::default(),
        );
        (resolver, store)
    }

    #[tokio::test]
    async fn non_obvious_label_is_no_match_without_touching_store() {
        let (resolver, store) = resolver(MockStore::default(), None);
        let result = resolver
            .resolve_field("owner-1", "Hometown", FieldKind::Text)
            .await
            .unwrap();
        assert_eq!(result, Resolution::NoMatch);
        assert_eq!(store.call_count(), 0, "gate must short-circuit before any lookup");
    }

    #[tokio::test]
    async fn verified_entry_resolves_via_exact_match() {
        let store = MockStore::with_entries(vec![entry("GPA", "Value: 3.8", true)]);
        let (resolver, store) = resolver(store, None);

        let result = resolver
            .resolve_field("owner-1", "GPA", FieldKind::Text)
            .await
            .unwrap();
        let Resolution::Value { value, .. } = result else {
            panic!("expected Value, got {result:?}");
        };
        assert_eq!(value, "3.8");
        assert!(!store.called("nearest_neighbors"), "no semantic work for exact hits");
    }

    #[tokio::test]
    async fn resolution_is_deterministic_across_calls() {
        let store = MockStore::with_entries(vec![entry("GPA", "Value: 3.8", true)]);
        let (resolver, _store) = resolver(store, None);

        for _ in 0..3 {
            let result = resolver
                .resolve_field("owner-1", "GPA", FieldKind::Text)
                .await
                .unwrap();
            assert!(matches!(result, Resolution::Value { ref value, .. } if value == "3.8"));
        }
    }

    #[tokio::test]
    async fn two_distinct_unverified_candidates_defer() {
        let store = MockStore::with_entries(vec![
            entry("Major", "Value: CS", false),
            entry("Major", "Value: Computer Science", false),
        ]);
        let (resolver, _store) = resolver(store, None);

        let result = resolver
            .resolve_field("owner-1", "Major - please select", FieldKind::Select)
            .await
            .unwrap();
        assert_eq!(result, Resolution::Deferred, "never pick one of two disagreeing extractions");
    }

    #[tokio::test]
    async fn agreeing_unverified_candidates_resolve() {
        let store = MockStore::with_entries(vec![
            entry("Major", "Value: CS", false),
            entry("Major", "Value: CS", false),
        ]);
        let (resolver, _store) = resolver(store, None);

        let result = resolver
            .resolve_field("owner-1", "Major", FieldKind::Select)
            .await
            .unwrap();
        assert!(matches!(result, Resolution::Value { ref value, .. } if value == "CS"));
    }

    #[tokio::test]
    async fn unverified_guard_vetoes_verified_exact_hit() {
        // One verified email plus two disagreeing unverified extractions
        // under an overlapping key: the guard runs regardless of stage 2's
        // unique outcome.
        let store = MockStore::with_entries(vec![
            entry("Email", "Value: jane@x.com", true),
            entry("Email Address", "Value: old@x.com", false),
            entry("Email Address", "Value: older@x.com", false),
        ]);
        let (resolver, _store) = resolver(store, None);

        let result = resolver
            .resolve_field("owner-1", "Email", FieldKind::Email)
            .await
            .unwrap();
        assert_eq!(result, Resolution::Deferred);
    }

    #[tokio::test]
    async fn partial_match_resolves_suffixed_label() {
        let store = MockStore::with_entries(vec![entry("Email Address", "Value: jane@x.com", true)]);
        let (resolver, store) = resolver(store, None);

        // "Email Address *" matches nothing exactly; its key is a superset
        // of the stored key.
        let result = resolver
            .resolve_field("owner-1", "Email Address *", FieldKind::Email)
            .await
            .unwrap();
        assert!(matches!(result, Resolution::Value { ref value, .. } if value == "jane@x.com"));
        assert!(store.called("key_overlap_matches"));
    }

    #[tokio::test]
    async fn malformed_payload_is_skipped_not_fatal() {
        // Derived entry missing the Value: convention must not satisfy
        // the exact stage.
        let store = MockStore::with_entries(vec![entry("GPA", "3.8", true)]);
        let (resolver, _store) = resolver(store, None);

        let result = resolver
            .resolve_field("owner-1", "GPA", FieldKind::Text)
            .await
            .unwrap();
        assert_eq!(result, Resolution::NoMatch);
    }

    #[tokio::test]
    async fn no_embedder_means_no_semantic_stages() {
        let store = MockStore::with_entries(vec![]);
        let (resolver, store) = resolver(store, None);

        let result = resolver
            .resolve_field("owner-1", "GPA", FieldKind::Text)
            .await
            .unwrap();
        assert_eq!(result, Resolution::NoMatch);
        assert!(!store.called("nearest_neighbors"));
    }

    #[tokio::test]
    async fn semantic_stage_accepts_confident_hit() {
        let mut stored = entry("Undergraduate GPA", "Value: 3.8", false);
        stored.embedding = Some(vec![1.0, 0.0]);
        let store = MockStore::with_entries(vec![stored]);
        let embedder = MockEmbedder::new(2).register("GPA Score", vec![1.0, 0.0]);
        let (resolver, _store) = resolver(store, Some(embedder));

        let result = resolver
            .resolve_field("owner-1", "GPA Score", FieldKind::Number)
            .await
            .unwrap();
        assert!(matches!(result, Resolution::Value { ref value, .. } if value == "3.8"));
    }

    #[tokio::test]
    async fn semantic_conflict_defers() {
        let mut a = entry("Undergraduate GPA", "Value: 3.8", false);
        a.embedding = Some(vec![1.0, 0.0]);
        a.label_key = "undergraduategradepoint".to_string();
        let mut b = entry("Cumulative GPA", "Value: 3.9", false);
        b.embedding = Some(vec![0.99, 0.1]);
        b.label_key = "cumulativegradepoint".to_string();
        let store = MockStore::with_entries(vec![a, b]);
        let embedder = MockEmbedder::new(2).register("GPA Score", vec![1.0, 0.0]);
        let (resolver, _store) = resolver(store, Some(embedder));

        let result = resolver
            .resolve_field("owner-1", "GPA Score", FieldKind::Number)
            .await
            .unwrap();
        assert_eq!(result, Resolution::Deferred);
    }

    #[tokio::test]
    async fn broad_fallback_extracts_structured_value_from_prose() {
        let mut essay = entry("about me", "I graduated with a 3.85 GPA from Roswell High.", false);
        essay.kind = EntryKind::Freeform;
        essay.label_key = "aboutme".to_string();
        essay.embedding = Some(vec![0.6, 0.8]);
        let store = MockStore::with_entries(vec![essay]);
        // Similarity 0.6: below the 0.85 semantic bar, above the 0.5 broad bar.
        let embedder = MockEmbedder::new(2).register("GPA Score", vec![1.0, 0.0]);
        let (resolver, _store) = resolver(store, Some(embedder));

        let result = resolver
            .resolve_field("owner-1", "GPA Score", FieldKind::Number)
            .await
            .unwrap();
        assert!(matches!(result, Resolution::Value { ref value, .. } if value == "3.85"));
    }

    #[tokio::test]
    async fn broad_fallback_refuses_prose_for_high_stakes_fields() {
        let mut essay = entry("about me", "I love my hometown and hiking.", false);
        essay.kind = EntryKind::Freeform;
        essay.label_key = "aboutme".to_string();
        essay.embedding = Some(vec![0.6, 0.8]);
        let store = MockStore::with_entries(vec![essay]);
        let embedder = MockEmbedder::new(2).register("GPA Score", vec![1.0, 0.0]);
        let (resolver, _store) = resolver(store, Some(embedder));

        let result = resolver
            .resolve_field("owner-1", "GPA Score", FieldKind::Number)
            .await
            .unwrap();
        assert_eq!(result, Resolution::NoMatch, "no raw prose for a GPA field");
    }

    #[tokio::test]
    async fn broad_fallback_returns_prose_for_low_stakes_fields() {
        let mut note = entry("study plans", "Computer Science with a math minor", false);
        note.kind = EntryKind::Freeform;
        note.label_key = "studyplans".to_string();
        note.embedding = Some(vec![0.6, 0.8]);
        let store = MockStore::with_entries(vec![note]);
        let embedder = MockEmbedder::new(2).register("Intended Major", vec![1.0, 0.0]);
        let (resolver, _store) = resolver(store, Some(embedder));

        let result = resolver
            .resolve_field("owner-1", "Intended Major", FieldKind::Select)
            .await
            .unwrap();
        assert!(
            matches!(result, Resolution::Value { ref value, .. } if value == "Computer Science with a math minor")
        );
    }

    #[tokio::test]
    async fn below_broad_threshold_is_no_match() {
        let mut note = entry("study plans", "Computer Science", false);
        note.kind = EntryKind::Freeform;
        note.label_key = "studyplans".to_string();
        note.embedding = Some(vec![0.3, 0.9539]);
        let store = MockStore::with_entries(vec![note]);
        let embedder = MockEmbedder::new(2).register("Intended Major", vec![1.0, 0.0]);
        let (resolver, _store) = resolver(store, Some(embedder));

        let result = resolver
            .resolve_field("owner-1", "Intended Major", FieldKind::Select)
            .await
            .unwrap();
        assert_eq!(result, Resolution::NoMatch);
    }

    #[tokio::test]
    async fn embedder_failure_degrades_to_no_match() {
        let store = MockStore::with_entries(vec![]);
        let (resolver, _store) = resolver(store, Some(MockEmbedder::failing()));

        let result = resolver
            .resolve_field("owner-1", "GPA", FieldKind::Text)
            .await
            .unwrap();
        assert_eq!(result, Resolution::NoMatch, "capability failure is never surfaced");
    }

    #[tokio::test]
    async fn embedder_failure_does_not_block_exact_match() {
        let store = MockStore::with_entries(vec![entry("GPA", "Value: 3.8", true)]);
        let (resolver, _store) = resolver(store, Some(MockEmbedder::failing()));

        let result = resolver
            .resolve_field("owner-1", "GPA", FieldKind::Text)
            .await
            .unwrap();
        assert!(matches!(result, Resolution::Value { ref value, .. } if value == "3.8"));
    }

    #[tokio::test]
    async fn resolution_is_owner_scoped() {
        let store = MockStore::with_entries(vec![entry("GPA", "Value: 3.8", true)]);
        let (resolver, _store) = resolver(store, None);

        let result = resolver
            .resolve_field("someone-else", "GPA", FieldKind::Text)
            .await
            .unwrap();
        assert_eq!(result, Resolution::NoMatch);
    }

    #[tokio::test]
    async fn mark_consumed_records_usage() {
        let store = MockStore::with_entries(vec![entry("GPA", "Value: 3.8", true)]);
        let (resolver, store) = resolver(store, None);

        resolver.mark_consumed("owner-1", "e-1").await;
        assert!(store.called("mark_used"));
    }
}
