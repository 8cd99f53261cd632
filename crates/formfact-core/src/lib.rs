// SPDX-FileCopyrightText: 2026 Formfact Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Formfact knowledge engine.
//!
//! This crate provides the foundational trait definitions, error types, and
//! the knowledge-entry domain model used throughout the Formfact workspace.

pub mod entry;
pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use entry::{
    EntryKind, KnowledgeEntry, format_value_payload, normalize_label_key, parse_value_payload,
};
pub use error::FormfactError;
pub use types::{AdapterType, HealthStatus};

// Re-export all capability traits at crate root.
pub use traits::{EmbeddingAdapter, FactStore, PluginAdapter, StorageAdapter};
