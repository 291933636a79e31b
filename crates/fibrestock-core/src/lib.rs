// SPDX-FileCopyrightText: 2026 Fibrestock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Fibrestock inventory ledger.
//!
//! This crate provides the error type, the domain model (materials, the
//! append-only movement ledger, work orders), and the role/visibility rules
//! used throughout the Fibrestock workspace. It performs no I/O.

pub mod access;
pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use access::{
    ActivityScope, MaterialScope, Principal, Role, can_complete_activity, can_manage_activity,
    can_view_activity, can_view_material, require_role,
};
pub use error::FibrestockError;
pub use traits::{NotificationSink, NullSink};
pub use types::{
    Activity, ActivityPatch, ActivityStatus, Completion, Material, MaterialPatch, MaterialUsage,
    MovementKind, MovementRecord, MovementRequest, NewActivity, NewMaterial, Notification,
    NotificationEvent, NotificationKind, StockStatus,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stock_status_thresholds() {
        assert_eq!(StockStatus::derive(0, 10), StockStatus::Out);
        assert_eq!(StockStatus::derive(-1, 10), StockStatus::Out);
        assert_eq!(StockStatus::derive(5, 10), StockStatus::Low);
        assert_eq!(StockStatus::derive(10, 10), StockStatus::Low);
        assert_eq!(StockStatus::derive(11, 10), StockStatus::Ok);
    }

    #[test]
    fn movement_kind_round_trips() {
        use std::str::FromStr;
        assert_eq!(MovementKind::Entry.to_string(), "entry");
        assert_eq!(MovementKind::Exit.to_string(), "exit");
        assert_eq!(MovementKind::from_str("exit").unwrap(), MovementKind::Exit);
        assert!(MovementKind::from_str("adjust").is_err());
    }

    #[test]
    fn activity_status_round_trips() {
        use std::str::FromStr;
        for status in [
            ActivityStatus::Pending,
            ActivityStatus::Concluded,
            ActivityStatus::Cancelled,
        ] {
            let s = status.to_string();
            assert_eq!(ActivityStatus::from_str(&s).unwrap(), status);
        }
    }

    #[test]
    fn error_kinds_are_distinguishable() {
        let insufficient = FibrestockError::InsufficientStock {
            material: "Connector".into(),
            available: 5,
            requested: 10,
        };
        assert!(insufficient.to_string().contains("insufficient stock"));
        assert!(insufficient.to_string().contains("Connector"));

        let not_found = FibrestockError::not_found("material", 42);
        assert_eq!(not_found.to_string(), "material 42 not found");

        let transition = FibrestockError::InvalidTransition {
            status: ActivityStatus::Concluded,
        };
        assert!(transition.to_string().contains("concluded"));
    }

    #[test]
    fn events_serialize_with_snake_case_kinds() {
        let event = NotificationEvent {
            recipient_id: 3,
            title: "New activity assigned".into(),
            message: "Splice closure install".into(),
            kind: NotificationKind::ActivityAssigned,
            activity_id: Some(1),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("activity_assigned"));
        let back: NotificationEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
