// SPDX-FileCopyrightText: 2026 Formfact Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fact store and entry lifecycle for the Formfact knowledge engine.
//!
//! This crate owns every write path into the store: staleness-guarded
//! extraction ingest, the confirmation writer's atomic verified upsert,
//! usage telemetry, and the at-least-once embedding work queue. Reads flow
//! out through the `FactStore` capability consumed by the resolver.

pub mod confirm;
pub mod staleness;
pub mod store;
pub mod types;
pub mod worker;

pub use confirm::ConfirmationWriter;
pub use staleness::{StalenessDecision, StalenessPolicy};
pub use store::{IngestOutcome, KnowledgeStore};
pub use types::{ScoredEntry, cosine_similarity};
pub use worker::EmbeddingWorker;
