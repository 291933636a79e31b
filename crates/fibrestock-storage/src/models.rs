// SPDX-FileCopyrightText: 2026 Fibrestock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage-side row types and listing filters.
//!
//! The entity structs themselves live in `fibrestock-core`; this module adds
//! the filter types the query layer accepts and re-exports the entities so
//! callers can depend on `fibrestock-storage` alone.

use fibrestock_core::StockStatus;

pub use fibrestock_core::{
    Activity, ActivityPatch, ActivityStatus, Completion, Material, MaterialPatch, MaterialUsage,
    MovementKind, MovementRecord, MovementRequest, NewActivity, NewMaterial, Notification,
    NotificationEvent, NotificationKind,
};

/// Filter for material listings. All fields are conjunctive.
#[derive(Debug, Clone, Default)]
pub struct MaterialFilter {
    /// Exact category match.
    pub category: Option<String>,
    /// Exact subcategory match.
    pub subcategory: Option<String>,
    /// Derived stock level, expressed as a predicate over quantity columns.
    pub status: Option<StockStatus>,
    /// Case-insensitive substring match on name and codes.
    pub search: Option<String>,
    /// Deactivated materials are hidden unless this is set.
    pub include_inactive: bool,
}
