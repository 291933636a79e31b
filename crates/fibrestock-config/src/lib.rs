// SPDX-FileCopyrightText: 2026 Fibrestock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Fibrestock inventory ledger.
//!
//! Provides TOML configuration parsing with strict validation
//! (`deny_unknown_fields`), XDG file hierarchy lookup, environment variable
//! overrides, and miette diagnostic rendering.
//!
//! # Usage
//!
//! ```no_run
//! use fibrestock_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("database: {}", config.storage.database_path);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{FibrestockConfig, InventoryConfig, ServiceConfig, StorageConfig};

/// Load configuration from the XDG hierarchy and validate it.
///
/// Returns either a valid [`FibrestockConfig`] or the full list of
/// diagnostic errors.
pub fn load_and_validate() -> Result<FibrestockConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(figment_error) => Err(vec![ConfigError::Parse(figment_error)]),
    }
}
