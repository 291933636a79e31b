// SPDX-FileCopyrightText: 2026 Fibrestock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports the XDG hierarchy: `./fibrestock.toml` >
//! `~/.config/fibrestock/fibrestock.toml` > `/etc/fibrestock/fibrestock.toml`
//! with environment variable overrides via the `FIBRESTOCK_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::FibrestockConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/fibrestock/fibrestock.toml` (system-wide)
/// 3. `~/.config/fibrestock/fibrestock.toml` (user XDG config)
/// 4. `./fibrestock.toml` (local directory)
/// 5. `FIBRESTOCK_*` environment variables
pub fn load_config() -> Result<FibrestockConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FibrestockConfig::default()))
        .merge(Toml::file("/etc/fibrestock/fibrestock.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("fibrestock/fibrestock.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("fibrestock.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<FibrestockConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FibrestockConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<FibrestockConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FibrestockConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `FIBRESTOCK_STORAGE_DATABASE_PATH` must
/// map to `storage.database_path`, not `storage.database.path`.
fn env_provider() -> Env {
    Env::prefixed("FIBRESTOCK_").map(|key| {
        // Env keys arrive uppercase; lowercase before matching the section
        // prefixes so FIBRESTOCK_STORAGE_DATABASE_PATH actually maps.
        let key_str = key.as_str().to_ascii_lowercase();
        let mapped = key_str
            .replacen("service_", "service.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("inventory_", "inventory.", 1);
        mapped.into()
    })
}
