// SPDX-FileCopyrightText: 2026 Formfact Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./formfact.toml` > `~/.config/formfact/formfact.toml`
//! > `/etc/formfact/formfact.toml` with environment variable overrides via the
//! `FORMFACT_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::FormfactConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/formfact/formfact.toml` (system-wide)
/// 3. `~/.config/formfact/formfact.toml` (user XDG config)
/// 4. `./formfact.toml` (local directory)
/// 5. `FORMFACT_*` environment variables
pub fn load_config() -> Result<FormfactConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FormfactConfig::default()))
        .merge(Toml::file("/etc/formfact/formfact.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("formfact/formfact.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("formfact.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<FormfactConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FormfactConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<FormfactConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FormfactConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// CRITICAL: Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names. For example, `FORMFACT_STORAGE_DATABASE_PATH`
/// must map to `storage.database_path`, not `storage.database.path`.
fn env_provider() -> Env {
    Env::prefixed("FORMFACT_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: FORMFACT_STORAGE_DATABASE_PATH -> "storage_database_path"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("storage_", "storage.", 1)
            .replacen("embedding_", "embedding.", 1)
            .replacen("resolver_", "resolver.", 1)
            .replacen("log_", "log.", 1);
        mapped.into()
    })
}
