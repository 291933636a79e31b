// SPDX-FileCopyrightText: 2026 Fibrestock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `fibrestock seed` command implementation.
//!
//! Loads a small demo catalog for trying out the status and summary
//! commands. Refuses to touch a database that already has materials.

use fibrestock_config::FibrestockConfig;
use fibrestock_core::{FibrestockError, NewMaterial};
use fibrestock_engine::StockEngine;
use fibrestock_storage::{Database, MaterialFilter};

pub async fn run_seed(config: &FibrestockConfig) -> Result<(), FibrestockError> {
    let db = Database::open_with(&config.storage).await?;
    let engine = StockEngine::new(db);
    let operator = crate::operator();

    let existing = engine
        .list_materials(&operator, MaterialFilter::default())
        .await?;
    if !existing.is_empty() {
        println!(
            "fibrestock: database already has {} materials, not seeding",
            existing.len()
        );
        return Ok(());
    }

    let catalog = [
        ("SC/APC Connector", "connectors", None, 500, 100),
        ("Drop Cable 1km", "cables", Some("drop"), 20, 5),
        ("CTO Box 16 ports", "enclosures", None, 30, 8),
        ("Optical Splitter 1x8", "passive", Some("splitters"), 45, 10),
        ("Splice Protector", "consumables", None, 0, 200),
    ];
    for (name, category, subcategory, quantity, minimum) in catalog {
        let material = engine
            .register_material(
                &operator,
                NewMaterial {
                    name: name.to_string(),
                    category: category.to_string(),
                    subcategory: subcategory.map(str::to_string),
                    quantity,
                    minimum_quantity: minimum,
                    unit: config.inventory.default_unit.clone(),
                    ..Default::default()
                },
            )
            .await?;
        println!(
            "  seeded {} ({} {})",
            material.name, material.quantity, material.unit
        );
    }
    println!("fibrestock: seeded {} materials", catalog.len());
    Ok(())
}
