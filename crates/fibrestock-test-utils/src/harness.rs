// SPDX-FileCopyrightText: 2026 Fibrestock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles the full stack: a temp SQLite database, the
//! stock engine, the activity workflow wired to a [`RecordingSink`], and
//! fixture principals for each role.

use std::sync::Arc;

use fibrestock_core::{FibrestockError, NewMaterial, Principal, Role};
use fibrestock_engine::{ActivityWorkflow, StockEngine};
use fibrestock_storage::Database;

use crate::recording_sink::RecordingSink;

pub struct TestHarness {
    pub db: Database,
    pub stock: StockEngine,
    pub workflow: ActivityWorkflow,
    pub sink: RecordingSink,
    pub admin: Principal,
    pub supervisor: Principal,
    pub worker: Principal,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Build the harness on a fresh temp database.
    pub async fn new() -> Result<Self, FibrestockError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| FibrestockError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("test.db");
        let db = Database::open(&db_path.to_string_lossy()).await?;

        let sink = RecordingSink::new();
        let stock = StockEngine::new(db.clone());
        let workflow = ActivityWorkflow::new(db.clone(), Arc::new(sink.clone()));

        Ok(Self {
            db,
            stock,
            workflow,
            sink,
            admin: Principal::new(1, "ana", Role::Administrator),
            supervisor: Principal::new(2, "sue", Role::Supervisor),
            worker: Principal::new(3, "wes", Role::Worker),
            _temp_dir: temp_dir,
        })
    }

    /// Register a material as the admin fixture and return it.
    pub async fn seed_material(
        &self,
        name: &str,
        category: &str,
        quantity: i64,
    ) -> Result<fibrestock_core::Material, FibrestockError> {
        self.stock
            .register_material(
                &self.admin,
                NewMaterial {
                    name: name.to_string(),
                    category: category.to_string(),
                    quantity,
                    minimum_quantity: 10,
                    unit: "unit".to_string(),
                    ..Default::default()
                },
            )
            .await
    }
}
