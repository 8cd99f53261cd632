// SPDX-FileCopyrightText: 2026 Formfact Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock embedding adapter with registered vectors and failure injection.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use formfact_core::types::{AdapterType, EmbeddingInput, EmbeddingOutput, HealthStatus};
use formfact_core::{EmbeddingAdapter, FormfactError, PluginAdapter};

/// Deterministic in-memory embedder for tests.
///
/// Texts registered via [`MockEmbedder::register`] return their canned
/// vector; everything else gets a deterministic pseudo-vector derived from
/// the text bytes, so distinct unknown texts still embed differently.
/// Failures can be injected to exercise capability-unavailable paths.
pub struct MockEmbedder {
    vectors: Mutex<HashMap<String, Vec<f32>>>,
    dimensions: usize,
    fail: AtomicBool,
    calls: AtomicUsize,
}

impl MockEmbedder {
    /// Create a mock producing vectors of the given dimensionality.
    pub fn new(dimensions: usize) -> Self {
        Self {
            vectors: Mutex::new(HashMap::new()),
            dimensions,
            fail: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    /// Register a canned vector for a text.
    pub fn register(&self, text: &str, vector: Vec<f32>) {
        assert_eq!(vector.len(), self.dimensions, "registered vector has wrong length");
        self.vectors.lock().unwrap().insert(text.to_string(), vector);
    }

    /// Make subsequent embed calls fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    /// How many embed calls have been made.
    pub fn embed_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn pseudo_vector(&self, text: &str) -> Vec<f32> {
        // Stable hash spread over the vector, then L2-normalized.
        let mut vector = vec![0.0_f32; self.dimensions];
        for (i, byte) in text.bytes().enumerate() {
            vector[i % self.dimensions] += f32::from(byte) / 255.0;
        }
        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for x in &mut vector {
                *x /= norm;
            }
        }
        vector
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
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(FormfactError::Embedding {
                message: "mock embedder set to fail".to_string(),
                source: None,
            });
        }

        let vectors = self.vectors.lock().unwrap();
        let embeddings = input
            .texts
            .iter()
            .map(|text| {
                vectors
                    .get(text)
                    .cloned()
                    .unwrap_or_else(|| self.pseudo_vector(text))
            })
            .collect();
        Ok(EmbeddingOutput {
            embeddings,
            dimensions: self.dimensions,
        })
    }
}
