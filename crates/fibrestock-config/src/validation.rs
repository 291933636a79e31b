// SPDX-FileCopyrightText: 2026 Fibrestock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes. Collects all errors instead of failing fast.

use crate::diagnostic::ConfigError;
use crate::model::FibrestockConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
pub fn validate_config(config: &FibrestockConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if !LOG_LEVELS.contains(&config.service.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "service.log_level must be one of {LOG_LEVELS:?}, got `{}`",
                config.service.log_level
            ),
        });
    }

    if config.inventory.default_minimum_quantity < 0 {
        errors.push(ConfigError::Validation {
            message: format!(
                "inventory.default_minimum_quantity must be non-negative, got {}",
                config.inventory.default_minimum_quantity
            ),
        });
    }

    if config.inventory.default_unit.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "inventory.default_unit must not be empty".to_string(),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
