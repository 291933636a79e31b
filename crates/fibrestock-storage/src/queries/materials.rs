// SPDX-FileCopyrightText: 2026 Fibrestock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Material catalog operations.
//!
//! Registration with a nonzero initial quantity writes the opening `entry`
//! ledger record in the same transaction as the insert, so a material's
//! quantity is always fully explained by its movement history.

use fibrestock_core::{FibrestockError, Material, MaterialPatch, MovementKind, NewMaterial};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter};

use crate::database::Database;
use crate::models::MaterialFilter;
use crate::queries::stock::apply_movement_tx;
use fibrestock_core::MaterialScope;

pub(crate) const MATERIAL_COLS: &str = "id, name, category, subcategory, quantity, \
     minimum_quantity, unit, location, supplier, unit_price, internal_code, supplier_code, \
     description, owner_id, active, created_at, updated_at";

pub(crate) fn material_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Material> {
    Ok(Material {
        id: row.get(0)?,
        name: row.get(1)?,
        category: row.get(2)?,
        subcategory: row.get(3)?,
        quantity: row.get(4)?,
        minimum_quantity: row.get(5)?,
        unit: row.get(6)?,
        location: row.get(7)?,
        supplier: row.get(8)?,
        unit_price: row.get(9)?,
        internal_code: row.get(10)?,
        supplier_code: row.get(11)?,
        description: row.get(12)?,
        owner_id: row.get(13)?,
        active: row.get(14)?,
        created_at: row.get(15)?,
        updated_at: row.get(16)?,
    })
}

/// Register a new material. A nonzero initial quantity produces the opening
/// `entry` movement in the same transaction.
pub async fn create(
    db: &Database,
    new: NewMaterial,
    creator_name: Option<String>,
    creator_id: Option<i64>,
) -> Result<Material, FibrestockError> {
    if new.quantity < 0 {
        return Err(FibrestockError::Validation(format!(
            "initial quantity cannot be negative, got {}",
            new.quantity
        )));
    }
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO materials (name, category, subcategory, quantity,
                 minimum_quantity, unit, location, supplier, unit_price,
                 internal_code, supplier_code, description, owner_id)
                 VALUES (?1, ?2, ?3, 0, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    new.name,
                    new.category,
                    new.subcategory,
                    new.minimum_quantity,
                    new.unit,
                    new.location,
                    new.supplier,
                    new.unit_price,
                    new.internal_code,
                    new.supplier_code,
                    new.description,
                    new.owner_id,
                ],
            )?;
            let id = tx.last_insert_rowid();
            if new.quantity > 0 {
                let result = apply_movement_tx(
                    &tx,
                    id,
                    MovementKind::Entry,
                    new.quantity,
                    Some("initial stock registration".to_string()),
                    creator_name,
                    creator_id,
                    &[],
                )?;
                if let Err(e) = result {
                    return Ok(Err(e));
                }
            }
            let material = tx.query_row(
                &format!("SELECT {MATERIAL_COLS} FROM materials WHERE id = ?1"),
                params![id],
                material_from_row,
            )?;
            tx.commit()?;
            Ok(Ok(material))
        })
        .await
        .map_err(crate::database::map_tr_err)?
}

/// Fetch a single material by id, active or not.
pub async fn get(db: &Database, id: i64) -> Result<Option<Material>, FibrestockError> {
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                &format!("SELECT {MATERIAL_COLS} FROM materials WHERE id = ?1"),
                params![id],
                material_from_row,
            );
            match result {
                Ok(material) => Ok(Some(material)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List materials visible in the given scope, with conjunctive filters.
pub async fn list(
    db: &Database,
    scope: MaterialScope,
    filter: MaterialFilter,
) -> Result<Vec<Material>, FibrestockError> {
    db.connection()
        .call(move |conn| {
            let mut sql = format!("SELECT {MATERIAL_COLS} FROM materials WHERE 1 = 1");
            let mut values: Vec<Value> = Vec::new();

            if let MaterialScope::OwnedBy(owner_id) = scope {
                sql.push_str(&format!(" AND owner_id = ?{}", values.len() + 1));
                values.push(Value::Integer(owner_id));
            }
            if !filter.include_inactive {
                sql.push_str(" AND active = 1");
            }
            if let Some(category) = filter.category {
                sql.push_str(&format!(" AND category = ?{}", values.len() + 1));
                values.push(Value::Text(category));
            }
            if let Some(subcategory) = filter.subcategory {
                sql.push_str(&format!(" AND subcategory = ?{}", values.len() + 1));
                values.push(Value::Text(subcategory));
            }
            if let Some(search) = filter.search {
                let n = values.len() + 1;
                sql.push_str(&format!(
                    " AND (name LIKE ?{n} OR internal_code LIKE ?{n} OR supplier_code LIKE ?{n})"
                ));
                values.push(Value::Text(format!("%{search}%")));
            }
            if let Some(status) = filter.status {
                use fibrestock_core::StockStatus;
                sql.push_str(match status {
                    StockStatus::Out => " AND quantity <= 0",
                    StockStatus::Low => " AND quantity > 0 AND quantity <= minimum_quantity",
                    StockStatus::Ok => " AND quantity > minimum_quantity",
                });
            }
            sql.push_str(" ORDER BY name COLLATE NOCASE ASC");

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(values), material_from_row)?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Update descriptive fields. Quantity is not updatable here; corrections go
/// through the stock module so the ledger stays consistent.
pub async fn update(
    db: &Database,
    id: i64,
    patch: MaterialPatch,
) -> Result<Material, FibrestockError> {
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let mut sets: Vec<String> = Vec::new();
            let mut values: Vec<Value> = Vec::new();

            let mut set = |column: &str, value: Value, sets: &mut Vec<String>, values: &mut Vec<Value>| {
                values.push(value);
                sets.push(format!("{column} = ?{}", values.len()));
            };
            if let Some(name) = patch.name {
                set("name", Value::Text(name), &mut sets, &mut values);
            }
            if let Some(category) = patch.category {
                set("category", Value::Text(category), &mut sets, &mut values);
            }
            if let Some(subcategory) = patch.subcategory {
                set("subcategory", Value::Text(subcategory), &mut sets, &mut values);
            }
            if let Some(minimum) = patch.minimum_quantity {
                set("minimum_quantity", Value::Integer(minimum), &mut sets, &mut values);
            }
            if let Some(unit) = patch.unit {
                set("unit", Value::Text(unit), &mut sets, &mut values);
            }
            if let Some(location) = patch.location {
                set("location", Value::Text(location), &mut sets, &mut values);
            }
            if let Some(supplier) = patch.supplier {
                set("supplier", Value::Text(supplier), &mut sets, &mut values);
            }
            if let Some(price) = patch.unit_price {
                set("unit_price", Value::Real(price), &mut sets, &mut values);
            }
            if let Some(code) = patch.internal_code {
                set("internal_code", Value::Text(code), &mut sets, &mut values);
            }
            if let Some(code) = patch.supplier_code {
                set("supplier_code", Value::Text(code), &mut sets, &mut values);
            }
            if let Some(description) = patch.description {
                set("description", Value::Text(description), &mut sets, &mut values);
            }

            if !sets.is_empty() {
                values.push(Value::Integer(id));
                let sql = format!(
                    "UPDATE materials SET {},
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                     WHERE id = ?{}",
                    sets.join(", "),
                    values.len()
                );
                let changed = tx.execute(&sql, params_from_iter(values))?;
                if changed == 0 {
                    return Ok(Err(FibrestockError::not_found("material", id)));
                }
            }
            let result = tx.query_row(
                &format!("SELECT {MATERIAL_COLS} FROM materials WHERE id = ?1"),
                params![id],
                material_from_row,
            );
            match result {
                Ok(material) => {
                    tx.commit()?;
                    Ok(Ok(material))
                }
                Err(rusqlite::Error::QueryReturnedNoRows) => {
                    Ok(Err(FibrestockError::not_found("material", id)))
                }
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)?
}

/// Soft-delete a material. The row and its ledger stay in place; the
/// material disappears from default listings and rejects new movements.
pub async fn deactivate(db: &Database, id: i64) -> Result<Material, FibrestockError> {
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE materials SET active = 0,
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1",
                params![id],
            )?;
            if changed == 0 {
                return Ok(Err(FibrestockError::not_found("material", id)));
            }
            let material = conn.query_row(
                &format!("SELECT {MATERIAL_COLS} FROM materials WHERE id = ?1"),
                params![id],
                material_from_row,
            )?;
            Ok(Ok(material))
        })
        .await
        .map_err(crate::database::map_tr_err)?
}

/// Distinct categories of active materials in scope, sorted.
pub async fn categories(
    db: &Database,
    scope: MaterialScope,
) -> Result<Vec<String>, FibrestockError> {
    db.connection()
        .call(move |conn| {
            let (sql, values): (String, Vec<Value>) = match scope {
                MaterialScope::All => (
                    "SELECT DISTINCT category FROM materials WHERE active = 1
                     ORDER BY category"
                        .to_string(),
                    Vec::new(),
                ),
                MaterialScope::OwnedBy(owner_id) => (
                    "SELECT DISTINCT category FROM materials
                     WHERE active = 1 AND owner_id = ?1
                     ORDER BY category"
                        .to_string(),
                    vec![Value::Integer(owner_id)],
                ),
            };
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(values), |row| row.get(0))?;
            Ok(rows.collect::<rusqlite::Result<Vec<String>>>()?)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Distinct subcategories, optionally restricted to one category.
pub async fn subcategories(
    db: &Database,
    scope: MaterialScope,
    category: Option<String>,
) -> Result<Vec<String>, FibrestockError> {
    db.connection()
        .call(move |conn| {
            let mut sql = "SELECT DISTINCT subcategory FROM materials
                 WHERE active = 1 AND subcategory IS NOT NULL"
                .to_string();
            let mut values: Vec<Value> = Vec::new();
            if let MaterialScope::OwnedBy(owner_id) = scope {
                sql.push_str(&format!(" AND owner_id = ?{}", values.len() + 1));
                values.push(Value::Integer(owner_id));
            }
            if let Some(category) = category {
                sql.push_str(&format!(" AND category = ?{}", values.len() + 1));
                values.push(Value::Text(category));
            }
            sql.push_str(" ORDER BY subcategory");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(values), |row| row.get(0))?;
            Ok(rows.collect::<rusqlite::Result<Vec<String>>>()?)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fibrestock_core::StockStatus;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    fn fixture(name: &str, category: &str, quantity: i64) -> NewMaterial {
        NewMaterial {
            name: name.to_string(),
            category: category.to_string(),
            quantity,
            minimum_quantity: 10,
            unit: "unit".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_with_stock_writes_the_opening_entry() {
        let (db, _dir) = setup_db().await;
        let material = create(
            &db,
            fixture("SC/APC Connector", "connectors", 200),
            Some("alice".to_string()),
            Some(1),
        )
        .await
        .unwrap();
        assert_eq!(material.quantity, 200);
        assert!(material.active);

        let history = crate::queries::stock::list_for_material(&db, material.id, None)
            .await
            .unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].kind, MovementKind::Entry);
        assert_eq!(history[0].magnitude, 200);
        assert_eq!(history[0].quantity_before, 0);
        assert_eq!(history[0].responsible.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn create_with_zero_stock_writes_no_movement() {
        let (db, _dir) = setup_db().await;
        let material = create(&db, fixture("Splitter", "passive", 0), None, None)
            .await
            .unwrap();
        assert_eq!(material.quantity, 0);
        let history = crate::queries::stock::list_for_material(&db, material.id, None)
            .await
            .unwrap();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn listing_filters_compose() {
        let (db, _dir) = setup_db().await;
        create(&db, fixture("Connector A", "connectors", 50), None, None)
            .await
            .unwrap();
        create(&db, fixture("Connector B", "connectors", 5), None, None)
            .await
            .unwrap();
        create(&db, fixture("Cable", "cables", 0), None, None)
            .await
            .unwrap();

        let all = list(&db, MaterialScope::All, MaterialFilter::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 3);

        let connectors = list(
            &db,
            MaterialScope::All,
            MaterialFilter {
                category: Some("connectors".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(connectors.len(), 2);

        let low = list(
            &db,
            MaterialScope::All,
            MaterialFilter {
                status: Some(StockStatus::Low),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].name, "Connector B");

        let out = list(
            &db,
            MaterialScope::All,
            MaterialFilter {
                status: Some(StockStatus::Out),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "Cable");
    }

    #[tokio::test]
    async fn owner_scope_restricts_listing() {
        let (db, _dir) = setup_db().await;
        let mut mine = fixture("Mine", "tools", 1);
        mine.owner_id = Some(7);
        let mut theirs = fixture("Theirs", "tools", 1);
        theirs.owner_id = Some(8);
        create(&db, mine, None, None).await.unwrap();
        create(&db, theirs, None, None).await.unwrap();
        create(&db, fixture("Unowned", "tools", 1), None, None)
            .await
            .unwrap();

        let visible = list(&db, MaterialScope::OwnedBy(7), MaterialFilter::default())
            .await
            .unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].name, "Mine");
    }

    #[tokio::test]
    async fn search_matches_name_and_codes() {
        let (db, _dir) = setup_db().await;
        let mut coded = fixture("Ceramic Ferrule", "connectors", 3);
        coded.internal_code = Some("INT-0042".to_string());
        create(&db, coded, None, None).await.unwrap();
        create(&db, fixture("Drop Cable", "cables", 3), None, None)
            .await
            .unwrap();

        for term in ["ferrule", "0042"] {
            let found = list(
                &db,
                MaterialScope::All,
                MaterialFilter {
                    search: Some(term.to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
            assert_eq!(found.len(), 1, "search {term:?}");
            assert_eq!(found[0].name, "Ceramic Ferrule");
        }
    }

    #[tokio::test]
    async fn update_patches_only_given_fields() {
        let (db, _dir) = setup_db().await;
        let material = create(&db, fixture("Old Name", "connectors", 30), None, None)
            .await
            .unwrap();

        let updated = update(
            &db,
            material.id,
            MaterialPatch {
                name: Some("New Name".to_string()),
                minimum_quantity: Some(25),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.name, "New Name");
        assert_eq!(updated.minimum_quantity, 25);
        assert_eq!(updated.category, "connectors");
        assert_eq!(updated.quantity, 30);

        let err = update(&db, 999, MaterialPatch::default()).await.unwrap_err();
        assert!(matches!(err, FibrestockError::NotFound { .. }));
    }

    #[tokio::test]
    async fn deactivated_materials_are_hidden_and_frozen() {
        let (db, _dir) = setup_db().await;
        let material = create(&db, fixture("Retired", "tools", 4), None, None)
            .await
            .unwrap();
        let gone = deactivate(&db, material.id).await.unwrap();
        assert!(!gone.active);

        let visible = list(&db, MaterialScope::All, MaterialFilter::default())
            .await
            .unwrap();
        assert!(visible.is_empty());
        let with_inactive = list(
            &db,
            MaterialScope::All,
            MaterialFilter {
                include_inactive: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(with_inactive.len(), 1);

        let err = crate::queries::stock::apply_movement(
            &db,
            fibrestock_core::MovementRequest::new(material.id, MovementKind::Entry, 1),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, FibrestockError::Validation(_)));
    }

    #[tokio::test]
    async fn category_listings_are_distinct_and_sorted() {
        let (db, _dir) = setup_db().await;
        for (name, category, sub) in [
            ("A", "cables", Some("drop")),
            ("B", "cables", Some("backbone")),
            ("C", "connectors", None),
        ] {
            let mut m = fixture(name, category, 1);
            m.subcategory = sub.map(str::to_string);
            create(&db, m, None, None).await.unwrap();
        }

        let cats = categories(&db, MaterialScope::All).await.unwrap();
        assert_eq!(cats, vec!["cables".to_string(), "connectors".to_string()]);

        let subs = subcategories(&db, MaterialScope::All, Some("cables".to_string()))
            .await
            .unwrap();
        assert_eq!(subs, vec!["backbone".to_string(), "drop".to_string()]);
    }
}
