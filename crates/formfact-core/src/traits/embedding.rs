// SPDX-FileCopyrightText: 2026 Formfact Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding adapter trait for vector embedding generation.

use async_trait::async_trait;

use crate::error::FormfactError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{EmbeddingInput, EmbeddingOutput};

/// Adapter for the external embedding-generation service.
///
/// Embedding adapters power the semantic stages of the resolution cascade.
/// Calls are network-bound and must observe a bounded timeout; a failure
/// here is never allowed to block a value the cascade already determined.
#[async_trait]
pub trait EmbeddingAdapter: PluginAdapter {
    /// Generates embeddings for the given input, one vector per text.
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, FormfactError>;
}
