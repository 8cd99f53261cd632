// SPDX-FileCopyrightText: 2026 Formfact Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP embedding adapter for the Formfact knowledge engine.
//!
//! The embedding service is an external collaborator; this crate provides
//! the [`HttpEmbedder`] client implementing the `EmbeddingAdapter`
//! capability against an OpenAI-compatible `/v1/embeddings` endpoint.

pub mod client;
pub mod types;

pub use client::{HttpEmbedder, l2_normalize};
