// SPDX-FileCopyrightText: 2026 Formfact Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Formfact integration tests.
//!
//! Provides mock adapters and harness infrastructure for fast,
//! deterministic, CI-runnable tests without external services.
//!
//! # Components
//!
//! - [`MockEmbedder`] - Mock embedding service with canned vectors and
//!   failure injection
//! - [`TestHarness`] - Full resolution stack over a temp SQLite database

pub mod harness;
pub mod mock_embedder;

pub use harness::TestHarness;
pub use mock_embedder::MockEmbedder;
