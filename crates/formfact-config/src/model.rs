// SPDX-FileCopyrightText: 2026 Formfact Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Formfact knowledge engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Formfact configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FormfactConfig {
    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Embedding service settings.
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Resolution cascade settings.
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("formfact").join("formfact.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("formfact.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Embedding service configuration.
///
/// The embedding service is an external collaborator reached over HTTP.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EmbeddingConfig {
    /// Base URL of the embeddings endpoint (OpenAI-compatible shape).
    #[serde(default = "default_embedding_endpoint")]
    pub endpoint: String,

    /// Bearer token for the embedding service. `None` sends no auth header.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model identifier sent with each request.
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Expected dimensionality of returned vectors.
    #[serde(default = "default_embedding_dimensions")]
    pub dimensions: usize,

    /// Per-request timeout in seconds.
    #[serde(default = "default_embedding_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            endpoint: default_embedding_endpoint(),
            api_key: None,
            model: default_embedding_model(),
            dimensions: default_embedding_dimensions(),
            timeout_secs: default_embedding_timeout_secs(),
        }
    }
}

fn default_embedding_endpoint() -> String {
    "http://localhost:11434/v1/embeddings".to_string()
}

fn default_embedding_model() -> String {
    "nomic-embed-text".to_string()
}

fn default_embedding_dimensions() -> usize {
    768
}

fn default_embedding_timeout_secs() -> u64 {
    10
}

/// Resolution cascade configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ResolverConfig {
    /// Minimum cosine similarity for the semantic stage to accept a hit.
    #[serde(default = "default_semantic_threshold")]
    pub semantic_threshold: f64,

    /// Minimum cosine similarity for the broad fallback stage.
    #[serde(default = "default_broad_threshold")]
    pub broad_threshold: f64,

    /// Maximum neighbors fetched per semantic search.
    #[serde(default = "default_neighbor_limit")]
    pub neighbor_limit: usize,

    /// Days a verified entry suppresses overwrite by fresh extraction.
    #[serde(default = "default_staleness_window_days")]
    pub staleness_window_days: i64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            semantic_threshold: default_semantic_threshold(),
            broad_threshold: default_broad_threshold(),
            neighbor_limit: default_neighbor_limit(),
            staleness_window_days: default_staleness_window_days(),
        }
    }
}

fn default_semantic_threshold() -> f64 {
    0.85
}

fn default_broad_threshold() -> f64 {
    0.5
}

fn default_neighbor_limit() -> usize {
    5
}

fn default_staleness_window_days() -> i64 {
    30
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
