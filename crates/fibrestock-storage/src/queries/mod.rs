// SPDX-FileCopyrightText: 2026 Fibrestock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for CRUD operations on storage entities.

pub mod activities;
pub mod materials;
pub mod notifications;
pub mod reporting;
pub mod stock;

use std::str::FromStr;

/// Serialize an evidence list for storage; empty lists become NULL.
pub(crate) fn evidence_to_json(evidence: &[String]) -> Option<String> {
    if evidence.is_empty() {
        None
    } else {
        serde_json::to_string(evidence).ok()
    }
}

pub(crate) fn evidence_from_json(raw: Option<String>) -> Vec<String> {
    raw.and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default()
}

/// Parse a stored enum column, mapping a bad value to a conversion error
/// so it surfaces through the usual rusqlite error path.
pub(crate) fn parse_column<T>(idx: usize, raw: &str) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    T::from_str(raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
