// SPDX-FileCopyrightText: 2026 Fibrestock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Role hierarchy and visibility rules.
//!
//! Every permission check in the workspace routes through
//! [`Role::satisfies`] or one of the `can_*` functions here, so the rules
//! cannot drift between call sites. Principals are resolved by an external
//! authentication collaborator and passed explicitly into every operation;
//! there is no ambient "current user".

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::FibrestockError;

/// Authority levels, ordered from least to most privileged.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Worker,
    Supervisor,
    Administrator,
}

impl Role {
    fn rank(self) -> u8 {
        match self {
            Role::Worker => 1,
            Role::Supervisor => 2,
            Role::Administrator => 3,
        }
    }

    /// Strict hierarchy check: a principal satisfies a requirement iff its
    /// rank is at least the required rank.
    pub fn satisfies(self, required: Role) -> bool {
        self.rank() >= required.rank()
    }
}

/// An authenticated principal. Identity and role come from the external
/// authentication collaborator; this core never manages credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Principal {
    pub id: i64,
    pub name: String,
    pub role: Role,
}

impl Principal {
    pub fn new(id: i64, name: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            name: name.into(),
            role,
        }
    }
}

/// Fail with `PermissionDenied` unless the principal holds at least `required`.
pub fn require_role(principal: &Principal, required: Role) -> Result<(), FibrestockError> {
    if principal.role.satisfies(required) {
        Ok(())
    } else {
        Err(FibrestockError::permission(format!(
            "{required} role required"
        )))
    }
}

/// Which materials (and, by inheritance, movements) a principal may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialScope {
    All,
    OwnedBy(i64),
}

impl MaterialScope {
    pub fn for_principal(principal: &Principal) -> Self {
        if principal.role.satisfies(Role::Supervisor) {
            MaterialScope::All
        } else {
            MaterialScope::OwnedBy(principal.id)
        }
    }
}

/// Which activities a principal may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityScope {
    All,
    CreatedBy(i64),
    AssignedTo(i64),
}

impl ActivityScope {
    pub fn for_principal(principal: &Principal) -> Self {
        match principal.role {
            Role::Administrator => ActivityScope::All,
            Role::Supervisor => ActivityScope::CreatedBy(principal.id),
            Role::Worker => ActivityScope::AssignedTo(principal.id),
        }
    }
}

/// Material visibility: workers see only materials they own.
pub fn can_view_material(principal: &Principal, owner_id: Option<i64>) -> bool {
    match MaterialScope::for_principal(principal) {
        MaterialScope::All => true,
        MaterialScope::OwnedBy(id) => owner_id == Some(id),
    }
}

/// Completion is reserved to the assigned worker, or an administrator
/// acting on their behalf.
pub fn can_complete_activity(principal: &Principal, worker_id: i64) -> bool {
    principal.role == Role::Administrator || principal.id == worker_id
}

/// Edit/cancel is reserved to the creating supervisor, or an administrator.
pub fn can_manage_activity(principal: &Principal, supervisor_id: i64) -> bool {
    principal.role == Role::Administrator
        || (principal.role == Role::Supervisor && principal.id == supervisor_id)
}

/// Read access to a single activity, matching the listing scope.
pub fn can_view_activity(principal: &Principal, worker_id: i64, supervisor_id: i64) -> bool {
    match ActivityScope::for_principal(principal) {
        ActivityScope::All => true,
        ActivityScope::CreatedBy(id) => supervisor_id == id,
        ActivityScope::AssignedTo(id) => worker_id == id,
    }
}
