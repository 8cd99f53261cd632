// SPDX-FileCopyrightText: 2026 Formfact Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the OpenAI-compatible embeddings endpoint.

use serde::{Deserialize, Serialize};

/// Request body for `POST /v1/embeddings`.
#[derive(Debug, Clone, Serialize)]
pub struct EmbeddingsRequest {
    /// Model identifier.
    pub model: String,
    /// Texts to embed, one vector returned per text.
    pub input: Vec<String>,
}

/// Response body for `POST /v1/embeddings`.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingsResponse {
    /// One object per input text.
    pub data: Vec<EmbeddingObject>,
}

/// A single embedding in the response.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingObject {
    /// Position of the corresponding input text.
    pub index: usize,
    /// The embedding vector.
    pub embedding: Vec<f32>,
}

/// Error body returned by the service on failure.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

/// Error detail within an [`ApiErrorResponse`].
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub r#type: String,
    pub message: String,
}
