// SPDX-FileCopyrightText: 2026 Fibrestock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types for materials, the movement ledger, and work orders.
//!
//! Timestamps are ISO-8601 strings produced by the storage layer
//! (`strftime('%Y-%m-%dT%H:%M:%fZ', 'now')`), so they sort lexicographically.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Direction of a stock movement.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    Entry,
    Exit,
}

/// Work order lifecycle state. Transitions are one-directional:
/// `pending -> concluded` or `pending -> cancelled`, both terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ActivityStatus {
    Pending,
    Concluded,
    Cancelled,
}

/// Stock level relative to the reorder threshold. Always derived from
/// `quantity` and `minimum_quantity`, never stored.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    Ok,
    Low,
    Out,
}

impl StockStatus {
    pub fn derive(quantity: i64, minimum_quantity: i64) -> Self {
        if quantity <= 0 {
            StockStatus::Out
        } else if quantity <= minimum_quantity {
            StockStatus::Low
        } else {
            StockStatus::Ok
        }
    }
}

/// A stocked item.
///
/// `quantity` is a cached projection of the movement ledger: it is written
/// exclusively by the stock engine, inside the same transaction as the
/// ledger insert, and is never negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub subcategory: Option<String>,
    pub quantity: i64,
    pub minimum_quantity: i64,
    pub unit: String,
    pub location: Option<String>,
    pub supplier: Option<String>,
    pub unit_price: Option<f64>,
    pub internal_code: Option<String>,
    pub supplier_code: Option<String>,
    pub description: Option<String>,
    /// Owning principal; `None` means unowned/shared.
    pub owner_id: Option<i64>,
    /// Soft-delete flag. Materials are deactivated, never hard-deleted.
    pub active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl Material {
    pub fn stock_status(&self) -> StockStatus {
        StockStatus::derive(self.quantity, self.minimum_quantity)
    }
}

/// Fields for registering a new material.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewMaterial {
    pub name: String,
    pub category: String,
    pub subcategory: Option<String>,
    /// Initial on-hand count. Nonzero values produce an `entry` movement in
    /// the same transaction as the insert.
    pub quantity: i64,
    pub minimum_quantity: i64,
    pub unit: String,
    pub location: Option<String>,
    pub supplier: Option<String>,
    pub unit_price: Option<f64>,
    pub internal_code: Option<String>,
    pub supplier_code: Option<String>,
    pub description: Option<String>,
    pub owner_id: Option<i64>,
}

/// Partial update of a material's descriptive fields.
///
/// Deliberately has no `quantity` field: quantity corrections go through
/// `StockEngine::set_quantity_absolute` so the ledger stays consistent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaterialPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub minimum_quantity: Option<i64>,
    pub unit: Option<String>,
    pub location: Option<String>,
    pub supplier: Option<String>,
    pub unit_price: Option<f64>,
    pub internal_code: Option<String>,
    pub supplier_code: Option<String>,
    pub description: Option<String>,
}

/// One append-only ledger entry. Immutable once created; corrections are
/// compensating records, never edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementRecord {
    pub id: i64,
    pub material_id: i64,
    pub kind: MovementKind,
    pub magnitude: i64,
    pub quantity_before: i64,
    pub quantity_after: i64,
    pub reason: Option<String>,
    /// Display name of the responsible principal at the time of the
    /// movement. An intentional immutable snapshot, part of the audit
    /// record; principals live in an external system.
    pub responsible: Option<String>,
    pub responsible_id: Option<i64>,
    /// Opaque evidence image identifiers, stored uninterpreted.
    pub evidence: Vec<String>,
    pub created_at: String,
}

/// Request for a single stock movement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementRequest {
    pub material_id: i64,
    pub kind: MovementKind,
    pub magnitude: i64,
    pub reason: Option<String>,
    /// Free-text responsible name; defaults to the acting principal's name.
    pub responsible: Option<String>,
    pub responsible_id: Option<i64>,
    pub evidence: Vec<String>,
}

impl MovementRequest {
    pub fn new(material_id: i64, kind: MovementKind, magnitude: i64) -> Self {
        Self {
            material_id,
            kind,
            magnitude,
            reason: None,
            responsible: None,
            responsible_id: None,
            evidence: Vec::new(),
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// A work order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub worker_id: i64,
    /// Name snapshot of the assigned worker; see [`MovementRecord::responsible`].
    pub worker_name: String,
    pub supervisor_id: i64,
    pub supervisor_name: String,
    /// Optional target material. A reservation hint, not a hold.
    pub material_id: Option<i64>,
    pub required_quantity: Option<i64>,
    pub status: ActivityStatus,
    pub deadline: Option<String>,
    pub concluded_at: Option<String>,
    pub notes: Option<String>,
    pub completion_notes: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub evidence: Vec<String>,
    pub created_at: String,
}

/// Fields for creating a work order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewActivity {
    pub title: String,
    pub description: Option<String>,
    pub material_id: Option<i64>,
    pub required_quantity: Option<i64>,
    pub deadline: Option<String>,
    pub notes: Option<String>,
}

/// Partial update of a pending activity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub required_quantity: Option<i64>,
    pub deadline: Option<String>,
    pub notes: Option<String>,
}

/// Input for concluding an activity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Completion {
    pub completion_notes: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub evidence: Vec<String>,
    /// `(material_id, quantity)` pairs to withdraw. Pairs with quantity <= 0
    /// are silently skipped.
    pub materials_consumed: Vec<(i64, i64)>,
}

/// Join record between a concluded activity and a consumed material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialUsage {
    pub id: i64,
    pub activity_id: i64,
    pub material_id: i64,
    pub quantity: i64,
    pub used_at: String,
}

/// Category of a notification event.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    ActivityAssigned,
    ActivityCompleted,
}

/// A fire-and-forget event description handed to a [`crate::NotificationSink`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub recipient_id: i64,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub activity_id: Option<i64>,
}

/// A stored notification, as read back from the inbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub recipient_id: i64,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub activity_id: Option<i64>,
    pub read: bool,
    pub created_at: String,
}
