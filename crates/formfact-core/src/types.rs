// SPDX-FileCopyrightText: 2026 Formfact Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the Formfact workspace.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the type of adapter in the plugin registry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Storage,
    Embedding,
}

/// Input for an embedding adapter.
#[derive(Debug, Clone)]
pub struct EmbeddingInput {
    /// Texts to embed, one vector returned per text.
    pub texts: Vec<String>,
}

/// Output from an embedding adapter.
#[derive(Debug, Clone)]
pub struct EmbeddingOutput {
    /// One vector per input text, in order.
    pub embeddings: Vec<Vec<f32>>,
    /// Dimensionality of each vector.
    pub dimensions: usize,
}

/// A row in the embed work queue.
///
/// Embedding generation after a confirmation is fire-and-forget: the task
/// is enqueued atomically with the write path's commit and drained by the
/// worker out of band, at least once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedTask {
    /// Auto-generated queue entry ID (SQLite rowid).
    pub id: i64,
    /// Knowledge entry whose embedding this task regenerates.
    pub entry_id: String,
    /// Text to embed.
    pub text: String,
    /// pending | processing | completed | failed.
    pub status: String,
    /// Delivery attempts so far.
    pub attempts: i32,
    /// Attempts after which the task is parked as failed.
    pub max_attempts: i32,
    /// ISO 8601 creation timestamp.
    pub created_at: String,
    /// ISO 8601 last-update timestamp.
    pub updated_at: String,
    /// Processing lock expiry, if locked.
    pub locked_until: Option<String>,
}
