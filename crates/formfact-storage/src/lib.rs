// SPDX-FileCopyrightText: 2026 Formfact Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Formfact knowledge engine.
//!
//! All writes are serialized through `tokio-rusqlite`'s single background
//! thread: [`Database`] wraps one connection, query modules accept
//! `&Database` and call through `connection().call()`. This eliminates
//! SQLITE_BUSY errors under concurrent access. Do NOT create additional
//! Connection instances for writes.

pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;

pub use database::Database;
pub use models::{blob_to_vec, vec_to_blob};
