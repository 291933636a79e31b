// SPDX-FileCopyrightText: 2026 Fibrestock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stock engine: the permissioned surface over the material catalog and the
//! movement ledger.
//!
//! Every operation takes the acting [`Principal`] explicitly and checks role
//! and visibility before delegating to the query layer. Quantity integrity
//! itself is enforced lower down, inside the storage transactions.

use fibrestock_core::{
    can_view_material, require_role, FibrestockError, Material, MaterialPatch, MaterialScope,
    MovementRecord, MovementRequest, NewMaterial, Principal, Role,
};
use fibrestock_storage::queries::{materials, stock};
use fibrestock_storage::{Database, MaterialFilter};

#[derive(Clone)]
pub struct StockEngine {
    db: Database,
}

impl StockEngine {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Register a new material. Administrators only. A nonzero initial
    /// quantity shows up as the opening `entry` in the ledger, attributed
    /// to the registrar.
    pub async fn register_material(
        &self,
        principal: &Principal,
        new: NewMaterial,
    ) -> Result<Material, FibrestockError> {
        require_role(principal, Role::Administrator)?;
        if new.name.trim().is_empty() {
            return Err(FibrestockError::Validation("material name is required".into()));
        }
        if new.category.trim().is_empty() {
            return Err(FibrestockError::Validation(
                "material category is required".into(),
            ));
        }
        if new.unit.trim().is_empty() {
            return Err(FibrestockError::Validation("material unit is required".into()));
        }
        let material = materials::create(
            &self.db,
            new,
            Some(principal.name.clone()),
            Some(principal.id),
        )
        .await?;
        tracing::info!(
            material_id = material.id,
            name = %material.name,
            quantity = material.quantity,
            "material registered"
        );
        Ok(material)
    }

    /// Patch descriptive fields. Supervisors and up. Quantity is absent from
    /// the patch type on purpose; use [`StockEngine::set_quantity`].
    pub async fn update_material(
        &self,
        principal: &Principal,
        id: i64,
        patch: MaterialPatch,
    ) -> Result<Material, FibrestockError> {
        require_role(principal, Role::Supervisor)?;
        if let Some(minimum) = patch.minimum_quantity {
            if minimum < 0 {
                return Err(FibrestockError::Validation(
                    "minimum quantity cannot be negative".into(),
                ));
            }
        }
        materials::update(&self.db, id, patch).await
    }

    /// Soft-delete. The ledger stays; the material stops accepting movements.
    pub async fn deactivate_material(
        &self,
        principal: &Principal,
        id: i64,
    ) -> Result<Material, FibrestockError> {
        require_role(principal, Role::Supervisor)?;
        let material = materials::deactivate(&self.db, id).await?;
        tracing::info!(material_id = id, name = %material.name, "material deactivated");
        Ok(material)
    }

    /// Fetch one material. Workers get `PermissionDenied` for materials
    /// outside their scope, indistinguishable from ones they merely cannot
    /// see.
    pub async fn get_material(
        &self,
        principal: &Principal,
        id: i64,
    ) -> Result<Material, FibrestockError> {
        let material = materials::get(&self.db, id)
            .await?
            .ok_or_else(|| FibrestockError::not_found("material", id))?;
        if !can_view_material(principal, material.owner_id) {
            return Err(FibrestockError::permission("material is not visible to you"));
        }
        Ok(material)
    }

    pub async fn list_materials(
        &self,
        principal: &Principal,
        filter: MaterialFilter,
    ) -> Result<Vec<Material>, FibrestockError> {
        materials::list(&self.db, MaterialScope::for_principal(principal), filter).await
    }

    pub async fn categories(&self, principal: &Principal) -> Result<Vec<String>, FibrestockError> {
        materials::categories(&self.db, MaterialScope::for_principal(principal)).await
    }

    pub async fn subcategories(
        &self,
        principal: &Principal,
        category: Option<String>,
    ) -> Result<Vec<String>, FibrestockError> {
        materials::subcategories(
            &self.db,
            MaterialScope::for_principal(principal),
            category,
        )
        .await
    }

    /// Record one stock movement. Supervisors and up. The responsible
    /// fields default to the acting principal when the request leaves them
    /// unset.
    pub async fn apply_movement(
        &self,
        principal: &Principal,
        mut request: MovementRequest,
    ) -> Result<MovementRecord, FibrestockError> {
        require_role(principal, Role::Supervisor)?;
        if request.responsible.is_none() {
            request.responsible = Some(principal.name.clone());
        }
        if request.responsible_id.is_none() {
            request.responsible_id = Some(principal.id);
        }
        let record = stock::apply_movement(&self.db, request).await?;
        tracing::info!(
            movement_id = record.id,
            material_id = record.material_id,
            kind = %record.kind,
            magnitude = record.magnitude,
            quantity_after = record.quantity_after,
            "movement recorded"
        );
        Ok(record)
    }

    /// Correct a material's quantity to an absolute value. The delta is
    /// written to the ledger as a compensating movement; setting the current
    /// value writes nothing.
    pub async fn set_quantity(
        &self,
        principal: &Principal,
        material_id: i64,
        new_quantity: i64,
        reason: Option<String>,
    ) -> Result<Option<MovementRecord>, FibrestockError> {
        require_role(principal, Role::Supervisor)?;
        let reason = reason.or_else(|| Some("stock correction".to_string()));
        stock::set_quantity_absolute(
            &self.db,
            material_id,
            new_quantity,
            reason,
            Some(principal.name.clone()),
            Some(principal.id),
        )
        .await
    }

    /// One ledger record by id. Visibility follows the parent material.
    pub async fn movement(
        &self,
        principal: &Principal,
        id: i64,
    ) -> Result<MovementRecord, FibrestockError> {
        let record = stock::get(&self.db, id)
            .await?
            .ok_or_else(|| FibrestockError::not_found("movement", id))?;
        self.get_material(principal, record.material_id).await?;
        Ok(record)
    }

    /// Ledger history for a material the principal can see, newest first.
    pub async fn movement_history(
        &self,
        principal: &Principal,
        material_id: i64,
        limit: Option<i64>,
    ) -> Result<Vec<MovementRecord>, FibrestockError> {
        self.get_material(principal, material_id).await?;
        stock::list_for_material(&self.db, material_id, limit).await
    }
}
