// SPDX-FileCopyrightText: 2026 Formfact Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Formfact knowledge engine.

use thiserror::Error;

/// The primary error type used across all Formfact adapter traits and core operations.
#[derive(Debug, Error)]
pub enum FormfactError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Embedding service errors (API failure, malformed response, wrong dimensions).
    #[error("embedding error: {message}")]
    Embedding {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl FormfactError {
    /// True when the error means the embedding capability is unreachable.
    ///
    /// The resolution cascade treats these as "skip the semantic stages",
    /// never as a caller-visible failure.
    pub fn is_capability_unavailable(&self) -> bool {
        matches!(
            self,
            FormfactError::Embedding { .. } | FormfactError::Timeout { .. }
        )
    }
}
