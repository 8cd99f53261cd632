// SPDX-FileCopyrightText: 2026 Formfact Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as threshold ranges and non-empty paths.

use crate::diagnostic::ConfigError;
use crate::model::FormfactConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &FormfactConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.embedding.endpoint.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "embedding.endpoint must not be empty".to_string(),
        });
    }

    if config.embedding.dimensions == 0 {
        errors.push(ConfigError::Validation {
            message: "embedding.dimensions must be greater than zero".to_string(),
        });
    }

    if config.embedding.timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "embedding.timeout_secs must be greater than zero".to_string(),
        });
    }

    for (key, value) in [
        ("resolver.semantic_threshold", config.resolver.semantic_threshold),
        ("resolver.broad_threshold", config.resolver.broad_threshold),
    ] {
        if !(0.0..=1.0).contains(&value) {
            errors.push(ConfigError::Validation {
                message: format!("{key} must be within [0, 1], got {value}"),
            });
        }
    }

    if config.resolver.broad_threshold > config.resolver.semantic_threshold {
        errors.push(ConfigError::Validation {
            message: format!(
                "resolver.broad_threshold ({}) must not exceed resolver.semantic_threshold ({})",
                config.resolver.broad_threshold, config.resolver.semantic_threshold
            ),
        });
    }

    if config.resolver.neighbor_limit == 0 {
        errors.push(ConfigError::Validation {
            message: "resolver.neighbor_limit must be greater than zero".to_string(),
        });
    }

    if config.resolver.staleness_window_days < 0 {
        errors.push(ConfigError::Validation {
            message: format!(
                "resolver.staleness_window_days must be non-negative, got {}",
                config.resolver.staleness_window_days
            ),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
