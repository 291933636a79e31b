// SPDX-FileCopyrightText: 2026 Fibrestock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Work order lifecycle: create, complete, edit, cancel.
//!
//! Creation checks availability of the required material and rejects the
//! order on a shortage without reserving anything. The check is advisory in
//! the sense that stock can still drain before completion; the hard guarantee
//! lives in the completion transaction. Callers that want to create the order
//! anyway can match on `InsufficientStockWarning` and retry without a
//! required quantity. Notifications are fire and forget: a failing sink is
//! logged and never blocks the operation.

use std::sync::Arc;

use fibrestock_core::{
    can_complete_activity, can_manage_activity, can_view_activity, require_role, Activity,
    ActivityPatch, ActivityScope, ActivityStatus, Completion, FibrestockError, MaterialUsage,
    MovementRecord, NewActivity, NotificationEvent, NotificationKind, NotificationSink, Principal,
    Role,
};
use fibrestock_storage::queries::{activities, materials};
use fibrestock_storage::Database;

#[derive(Clone)]
pub struct ActivityWorkflow {
    db: Database,
    sink: Arc<dyn NotificationSink>,
}

impl ActivityWorkflow {
    pub fn new(db: Database, sink: Arc<dyn NotificationSink>) -> Self {
        Self { db, sink }
    }

    /// Create a pending work order assigned to a worker. Supervisors and up.
    pub async fn create(
        &self,
        principal: &Principal,
        assignee: &Principal,
        new: NewActivity,
    ) -> Result<Activity, FibrestockError> {
        require_role(principal, Role::Supervisor)?;
        if assignee.role != Role::Worker {
            return Err(FibrestockError::Validation(format!(
                "activities are assigned to workers, '{}' is a {}",
                assignee.name, assignee.role
            )));
        }
        if new.title.trim().is_empty() {
            return Err(FibrestockError::Validation("activity title is required".into()));
        }
        if let Some(required) = new.required_quantity {
            if required <= 0 {
                return Err(FibrestockError::Validation(
                    "required quantity must be positive".into(),
                ));
            }
        }

        if let (Some(material_id), Some(required)) = (new.material_id, new.required_quantity) {
            let material = materials::get(&self.db, material_id)
                .await?
                .ok_or_else(|| FibrestockError::not_found("material", material_id))?;
            if !material.active {
                return Err(FibrestockError::Validation(format!(
                    "material '{}' is deactivated",
                    material.name
                )));
            }
            if material.quantity < required {
                tracing::warn!(material_id, required, available = material.quantity, "shortage");
                return Err(FibrestockError::InsufficientStockWarning {
                    material: material.name,
                    available: material.quantity,
                    required,
                });
            }
        }

        let activity = activities::create(
            &self.db,
            new,
            assignee.id,
            assignee.name.clone(),
            principal.id,
            principal.name.clone(),
        )
        .await?;
        tracing::info!(
            activity_id = activity.id,
            worker_id = activity.worker_id,
            "activity created"
        );
        self.dispatch(NotificationEvent {
            recipient_id: activity.worker_id,
            title: "New activity assigned".to_string(),
            message: format!("{} assigned you: {}", activity.supervisor_name, activity.title),
            kind: NotificationKind::ActivityAssigned,
            activity_id: Some(activity.id),
        })
        .await;
        Ok(activity)
    }

    /// Conclude a pending order, withdrawing consumed materials atomically.
    /// Allowed for the assigned worker or an administrator.
    pub async fn complete(
        &self,
        principal: &Principal,
        id: i64,
        completion: Completion,
    ) -> Result<(Activity, Vec<MovementRecord>), FibrestockError> {
        let existing = self.fetch(id).await?;
        if !can_complete_activity(principal, existing.worker_id) {
            return Err(FibrestockError::permission(
                "only the assigned worker can conclude this activity",
            ));
        }
        let (activity, movements) = activities::complete(
            &self.db,
            id,
            completion,
            principal.id,
            principal.name.clone(),
        )
        .await?;
        tracing::info!(
            activity_id = id,
            movements = movements.len(),
            "activity concluded"
        );
        self.dispatch(NotificationEvent {
            recipient_id: activity.supervisor_id,
            title: "Activity concluded".to_string(),
            message: format!("{} concluded: {}", activity.worker_name, activity.title),
            kind: NotificationKind::ActivityCompleted,
            activity_id: Some(activity.id),
        })
        .await;
        Ok((activity, movements))
    }

    /// Patch a pending order. The creating supervisor or an administrator.
    pub async fn edit(
        &self,
        principal: &Principal,
        id: i64,
        patch: ActivityPatch,
    ) -> Result<Activity, FibrestockError> {
        let existing = self.fetch(id).await?;
        if !can_manage_activity(principal, existing.supervisor_id) {
            return Err(FibrestockError::permission(
                "only the creating supervisor can edit this activity",
            ));
        }
        if let Some(required) = patch.required_quantity {
            if required <= 0 {
                return Err(FibrestockError::Validation(
                    "required quantity must be positive".into(),
                ));
            }
        }
        activities::update(&self.db, id, patch).await
    }

    /// Cancel a pending order. Terminal; stock is untouched.
    pub async fn cancel(&self, principal: &Principal, id: i64) -> Result<Activity, FibrestockError> {
        let existing = self.fetch(id).await?;
        if !can_manage_activity(principal, existing.supervisor_id) {
            return Err(FibrestockError::permission(
                "only the creating supervisor can cancel this activity",
            ));
        }
        let activity = activities::cancel(&self.db, id).await?;
        tracing::info!(activity_id = id, "activity cancelled");
        Ok(activity)
    }

    pub async fn get(&self, principal: &Principal, id: i64) -> Result<Activity, FibrestockError> {
        let activity = self.fetch(id).await?;
        if !can_view_activity(principal, activity.worker_id, activity.supervisor_id) {
            return Err(FibrestockError::permission("activity is not visible to you"));
        }
        Ok(activity)
    }

    pub async fn list(
        &self,
        principal: &Principal,
        status: Option<ActivityStatus>,
    ) -> Result<Vec<Activity>, FibrestockError> {
        activities::list(&self.db, ActivityScope::for_principal(principal), status).await
    }

    /// Materials consumed when the order was concluded.
    pub async fn usage(
        &self,
        principal: &Principal,
        id: i64,
    ) -> Result<Vec<MaterialUsage>, FibrestockError> {
        self.get(principal, id).await?;
        activities::usage_for(&self.db, id).await
    }

    async fn fetch(&self, id: i64) -> Result<Activity, FibrestockError> {
        activities::get(&self.db, id)
            .await?
            .ok_or_else(|| FibrestockError::not_found("activity", id))
    }

    async fn dispatch(&self, event: NotificationEvent) {
        if let Err(e) = self.sink.notify(event).await {
            tracing::warn!(error = %e, "notification sink failed, continuing");
        }
    }
}
