// SPDX-FileCopyrightText: 2026 Formfact Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resolution cascade for the Formfact knowledge engine.
//!
//! Given a labeled form field, determine the best already-known value
//! without invoking a language model: normalize the label, gate on the
//! obvious-field dictionary, then try increasingly fuzzy lookups against
//! the fact store, deferring to the user whenever candidates disagree.
//!
//! The cascade consumes the store and the embedding service through the
//! `FactStore` and `EmbeddingAdapter` capabilities, so every stage is
//! testable against mocks.

pub mod cascade;
pub mod conflict;
pub mod extract;
pub mod normalize;
pub mod obvious;

pub use cascade::{FieldKind, Resolution, Resolver};
pub use conflict::{Candidate, ConflictOutcome};
pub use normalize::{clean_query, normalize_key};
pub use obvious::{FieldClass, match_obvious};
