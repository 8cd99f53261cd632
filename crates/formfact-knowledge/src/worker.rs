// SPDX-FileCopyrightText: 2026 Formfact Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! At-least-once embedding worker draining the embed queue.
//!
//! Confirmation and ingest never wait on the embedding service; they queue
//! a task and move on. The worker drains out of band: dequeue, embed, write
//! the vector, ack. Failures increment the task's attempts and requeue it
//! until `max_attempts`, after which the task is parked as failed.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use formfact_core::types::EmbeddingInput;
use formfact_core::{EmbeddingAdapter, FormfactError};
use formfact_storage::queries;

use crate::store::KnowledgeStore;

/// Drains the embed queue against the external embedding service.
pub struct EmbeddingWorker {
    store: Arc<KnowledgeStore>,
    embedder: Arc<dyn EmbeddingAdapter>,
}

impl EmbeddingWorker {
    /// Create a worker over the store and an embedding adapter.
    pub fn new(store: Arc<KnowledgeStore>, embedder: Arc<dyn EmbeddingAdapter>) -> Self {
        Self { store, embedder }
    }

    /// Process queued tasks until the queue is empty.
    ///
    /// Returns the number of tasks successfully embedded. Individual task
    /// failures are logged and requeued by the store; they never abort the
    /// drain.
    pub async fn drain(&self) -> Result<usize, FormfactError> {
        let db = self.store.database();
        let mut embedded = 0;

        while let Some(task) = queries::queue::dequeue(db).await? {
            match self.process(&task.entry_id, &task.text).await {
                Ok(()) => {
                    queries::queue::ack(db, task.id).await?;
                    embedded += 1;
                    metrics::counter!("formfact_embeds_completed_total").increment(1);
                }
                Err(e) => {
                    warn!(
                        task_id = task.id,
                        entry_id = %task.entry_id,
                        attempts = task.attempts,
                        error = %e,
                        "embedding task failed, will retry"
                    );
                    queries::queue::fail(db, task.id).await?;
                    metrics::counter!("formfact_embeds_failed_total").increment(1);
                    if task.attempts + 1 >= task.max_attempts {
                        continue;
                    }
                    // The service is likely down; stop hammering it and let
                    // the next drain pick the queue back up.
                    break;
                }
            }
        }

        debug!(embedded, "embed queue drain complete");
        Ok(embedded)
    }

    async fn process(&self, entry_id: &str, text: &str) -> Result<(), FormfactError> {
        let output = self
            .embedder
            .embed(EmbeddingInput {
                texts: vec![text.to_string()],
            })
            .await?;
        let vector = output
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| FormfactError::Internal("embedding returned no vectors".to_string()))?;
        self.store.set_embedding(entry_id, &vector).await
    }

    /// Spawn a background loop draining the queue on an interval.
    pub fn spawn(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if let Err(e) = self.drain().await {
                    warn!(error = %e, "embed queue drain errored");
                }
            }
        })
    }
}
