// SPDX-FileCopyrightText: 2026 Formfact Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The knowledge entry, the atomic unit of the fact store.

use serde::{Deserialize, Serialize};

/// Prefix of the mechanical payload convention for derived field values.
///
/// A `DerivedFieldValue` entry's payload is always `Value: <value>` so the
/// stored answer can be parsed back out exactly. Entries lacking the prefix
/// are freeform prose and are never substituted into a form field directly.
pub const VALUE_PREFIX: &str = "Value:";

/// A single fact stored by the knowledge engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    /// Unique identifier (UUID v4).
    pub id: String,
    /// Owner this fact belongs to. All queries are scoped per owner.
    pub owner_id: String,
    /// What kind of fact this is.
    pub kind: EntryKind,
    /// Coarse bucket used for in-place verified upserts (e.g. "email").
    pub group_key: String,
    /// The human field name this fact answers, verbatim.
    pub label: String,
    /// Normalized lookup key derived from the label (lowercase alphanumeric).
    pub label_key: String,
    /// Text content. `DerivedFieldValue` entries use the `Value: <x>` convention.
    pub payload: String,
    /// Confidence in [0, 1]. 1.0 is reserved for user-confirmed entries.
    pub confidence: f64,
    /// True only after explicit human confirmation.
    pub verified: bool,
    /// ISO 8601 timestamp of the most recent verification, if any.
    pub last_verified_at: Option<String>,
    /// Opaque reference to the originating artifact.
    pub provenance: String,
    /// Embedding vector for semantic search, if one has been generated.
    #[serde(skip)]
    pub embedding: Option<Vec<f32>>,
    /// How many times this entry has satisfied a resolved field.
    pub usage_count: i64,
    /// ISO 8601 timestamp of the most recent use, if any.
    pub last_used_at: Option<String>,
    /// ISO 8601 creation timestamp.
    pub created_at: String,
    /// ISO 8601 last-update timestamp.
    pub updated_at: String,
}

impl KnowledgeEntry {
    /// Parse the stored answer out of a `Value: <x>` payload.
    ///
    /// Returns `None` for freeform prose, which callers must treat as a
    /// malformed payload where the convention is required.
    pub fn parsed_value(&self) -> Option<&str> {
        parse_value_payload(&self.payload)
    }
}

/// What kind of fact a knowledge entry holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    /// A single form-field answer under the `Value: <x>` convention.
    DerivedFieldValue,
    /// A work, volunteer, or project experience.
    Experience,
    /// An award or accomplishment.
    Achievement,
    /// A personal value statement.
    Value,
    /// A stated goal.
    Goal,
    /// Unstructured prose (essay chunks, notes).
    Freeform,
}

impl EntryKind {
    /// Convert to string for SQLite storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::DerivedFieldValue => "derived_field_value",
            EntryKind::Experience => "experience",
            EntryKind::Achievement => "achievement",
            EntryKind::Value => "value",
            EntryKind::Goal => "goal",
            EntryKind::Freeform => "freeform",
        }
    }

    /// Parse from SQLite string. Unknown strings fall back to freeform.
    pub fn from_str_value(s: &str) -> Self {
        match s {
            "derived_field_value" => EntryKind::DerivedFieldValue,
            "experience" => EntryKind::Experience,
            "achievement" => EntryKind::Achievement,
            "value" => EntryKind::Value,
            "goal" => EntryKind::Goal,
            _ => EntryKind::Freeform,
        }
    }
}

/// Derive the normalized lookup key stored in `label_key`.
///
/// Lowercase, ASCII alphanumeric only. Two labels normalize to the same
/// key iff they are intended to address the same fact; over-matching from
/// aggressive normalization is an accepted limitation.
pub fn normalize_label_key(label: &str) -> String {
    label
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

/// Format an answer under the `Value: <x>` payload convention.
pub fn format_value_payload(value: &str) -> String {
    format!("{VALUE_PREFIX} {}", value.trim())
}

/// Parse the answer out of a `Value: <x>` payload, trimmed.
///
/// Returns `None` if the payload does not carry the convention.
pub fn parse_value_payload(payload: &str) -> Option<&str> {
    payload
        .trim_start()
        .strip_prefix(VALUE_PREFIX)
        .map(str::trim)
}
