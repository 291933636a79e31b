// SPDX-FileCopyrightText: 2026 Fibrestock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Fibrestock stock ledger.

use thiserror::Error;

use crate::types::ActivityStatus;

/// The primary error type used across all Fibrestock crates.
///
/// Domain errors (`NotFound` through `Validation`) are detected before any
/// persistent mutation commits; `Storage` covers unexpected infrastructure
/// failures, which still roll back any partially applied transaction.
#[derive(Debug, Error)]
pub enum FibrestockError {
    /// A material, activity, movement, or notification id is unknown.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// A role or ownership check failed.
    #[error("permission denied: {reason}")]
    PermissionDenied { reason: String },

    /// The activity is not in the state the operation requires.
    #[error("activity is {status}, expected pending")]
    InvalidTransition { status: ActivityStatus },

    /// An exit movement would drive the material quantity negative.
    #[error("insufficient stock of {material}: {available} available, {requested} requested")]
    InsufficientStock {
        material: String,
        available: i64,
        requested: i64,
    },

    /// Advisory availability check at activity creation failed. Non-fatal by
    /// design: no stock is reserved, the caller decides whether to enforce it.
    #[error("advisory stock check failed for {material}: {available} available, {required} required")]
    InsufficientStockWarning {
        material: String,
        available: i64,
        required: i64,
    },

    /// Malformed input: non-positive magnitude, missing required field,
    /// unknown role, inactive material.
    #[error("validation error: {0}")]
    Validation(String),

    /// Configuration errors (invalid TOML, missing fields, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (connection, query, migration failure).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl FibrestockError {
    /// Shorthand for the not-found case, used all over the query layer.
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        FibrestockError::NotFound { entity, id }
    }

    pub fn permission(reason: impl Into<String>) -> Self {
        FibrestockError::PermissionDenied {
            reason: reason.into(),
        }
    }
}
