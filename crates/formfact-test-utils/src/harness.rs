// SPDX-FileCopyrightText: 2026 Formfact Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness assembling the full resolution stack.
//!
//! `TestHarness` wires a temp SQLite database, the real `KnowledgeStore`,
//! the `ConfirmationWriter`, the `EmbeddingWorker`, and a `Resolver` backed
//! by the [`MockEmbedder`] — fast, deterministic, and CI-runnable without
//! external services.

use std::sync::Arc;

use formfact_config::model::ResolverConfig;
use formfact_core::{EmbeddingAdapter, FactStore, FormfactError};
use formfact_knowledge::{ConfirmationWriter, EmbeddingWorker, KnowledgeStore, StalenessPolicy};
use formfact_resolver::Resolver;
use formfact_storage::Database;

use crate::mock_embedder::MockEmbedder;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    resolver_config: ResolverConfig,
    staleness_window_days: i64,
    dimensions: usize,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            resolver_config: ResolverConfig::default(),
            staleness_window_days: 30,
            dimensions: 8,
        }
    }

    /// Override the resolver configuration.
    pub fn with_resolver_config(mut self, config: ResolverConfig) -> Self {
        self.resolver_config = config;
        self
    }

    /// Override the staleness window.
    pub fn with_staleness_window_days(mut self, days: i64) -> Self {
        self.staleness_window_days = days;
        self
    }

    /// Override the mock embedding dimensionality.
    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = dimensions;
        self
    }

    /// Build the harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, FormfactError> {
        let temp_dir = tempfile::TempDir::new().map_err(|e| FormfactError::Storage {
            source: e.into(),
        })?;
        let db_path = temp_dir.path().join("test.db");
        let db = Arc::new(Database::open(&db_path.to_string_lossy()).await?);

        let store = Arc::new(KnowledgeStore::new(
            db,
            StalenessPolicy::new(self.staleness_window_days),
        ));
        let embedder = Arc::new(MockEmbedder::new(self.dimensions));
        let writer = ConfirmationWriter::new(store.clone());
        let worker = EmbeddingWorker::new(
            store.clone(),
            embedder.clone() as Arc<dyn EmbeddingAdapter>,
        );
        let resolver = Resolver::new(
            store.clone() as Arc<dyn FactStore>,
            Some(embedder.clone() as Arc<dyn EmbeddingAdapter>),
            self.resolver_config,
        );

        Ok(TestHarness {
            _temp_dir: temp_dir,
            store,
            embedder,
            writer,
            worker,
            resolver,
        })
    }
}

/// A fully wired resolution stack over a temp database.
pub struct TestHarness {
    _temp_dir: tempfile::TempDir,
    /// The real fact store.
    pub store: Arc<KnowledgeStore>,
    /// The mock embedding service.
    pub embedder: Arc<MockEmbedder>,
    /// The confirmation writer.
    pub writer: ConfirmationWriter,
    /// The embedding queue worker (drained manually by tests).
    pub worker: EmbeddingWorker,
    /// The resolution cascade under test.
    pub resolver: Resolver,
}

impl TestHarness {
    /// Start building a harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }
}
