// SPDX-FileCopyrightText: 2026 Fibrestock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only aggregation queries backing the report builders.
//!
//! Time windows are half-open `[since, until)` ISO-8601 strings; the stored
//! timestamps sort lexicographically so plain string comparison is correct.

use fibrestock_core::FibrestockError;
use rusqlite::params;
use rusqlite::types::Value;
use serde::{Deserialize, Serialize};

use crate::database::Database;
use fibrestock_core::MaterialScope;

/// Headline stock counters over active materials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockCounts {
    pub total: i64,
    pub out_of_stock: i64,
    pub low_stock: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: i64,
}

/// Ledger totals for a time window, split by direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementTotals {
    pub entries: i64,
    pub entry_units: i64,
    pub exits: i64,
    pub exit_units: i64,
}

/// One material's total consumption inside a time window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialConsumption {
    pub material_id: i64,
    pub name: String,
    pub units: i64,
}

fn scope_clause(scope: MaterialScope, values: &mut Vec<Value>) -> String {
    match scope {
        MaterialScope::All => String::new(),
        MaterialScope::OwnedBy(owner_id) => {
            values.push(Value::Integer(owner_id));
            format!(" AND owner_id = ?{}", values.len())
        }
    }
}

pub async fn stock_counts(
    db: &Database,
    scope: MaterialScope,
) -> Result<StockCounts, FibrestockError> {
    db.connection()
        .call(move |conn| {
            let mut values: Vec<Value> = Vec::new();
            let clause = scope_clause(scope, &mut values);
            let sql = format!(
                "SELECT COUNT(*),
                        COALESCE(SUM(quantity <= 0), 0),
                        COALESCE(SUM(quantity > 0 AND quantity <= minimum_quantity), 0)
                 FROM materials WHERE active = 1{clause}"
            );
            let counts = conn.query_row(&sql, rusqlite::params_from_iter(values), |row| {
                Ok(StockCounts {
                    total: row.get(0)?,
                    out_of_stock: row.get(1)?,
                    low_stock: row.get(2)?,
                })
            })?;
            Ok(counts)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn category_counts(
    db: &Database,
    scope: MaterialScope,
) -> Result<Vec<CategoryCount>, FibrestockError> {
    db.connection()
        .call(move |conn| {
            let mut values: Vec<Value> = Vec::new();
            let clause = scope_clause(scope, &mut values);
            let sql = format!(
                "SELECT category, COUNT(*) FROM materials
                 WHERE active = 1{clause}
                 GROUP BY category ORDER BY category"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(rusqlite::params_from_iter(values), |row| {
                Ok(CategoryCount {
                    category: row.get(0)?,
                    count: row.get(1)?,
                })
            })?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn movement_totals_between(
    db: &Database,
    since: String,
    until: String,
) -> Result<MovementTotals, FibrestockError> {
    db.connection()
        .call(move |conn| {
            let totals = conn.query_row(
                "SELECT COALESCE(SUM(kind = 'entry'), 0),
                        COALESCE(SUM(CASE WHEN kind = 'entry' THEN magnitude ELSE 0 END), 0),
                        COALESCE(SUM(kind = 'exit'), 0),
                        COALESCE(SUM(CASE WHEN kind = 'exit' THEN magnitude ELSE 0 END), 0)
                 FROM movements
                 WHERE created_at >= ?1 AND created_at < ?2",
                params![since, until],
                |row| {
                    Ok(MovementTotals {
                        entries: row.get(0)?,
                        entry_units: row.get(1)?,
                        exits: row.get(2)?,
                        exit_units: row.get(3)?,
                    })
                },
            )?;
            Ok(totals)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn top_consumed_between(
    db: &Database,
    since: String,
    until: String,
    limit: i64,
) -> Result<Vec<MaterialConsumption>, FibrestockError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT m.id, m.name, SUM(v.magnitude) AS units
                 FROM movements v JOIN materials m ON m.id = v.material_id
                 WHERE v.kind = 'exit' AND v.created_at >= ?1 AND v.created_at < ?2
                 GROUP BY m.id, m.name
                 ORDER BY units DESC, m.name ASC
                 LIMIT ?3",
            )?;
            let rows = stmt.query_map(params![since, until, limit], |row| {
                Ok(MaterialConsumption {
                    material_id: row.get(0)?,
                    name: row.get(1)?,
                    units: row.get(2)?,
                })
            })?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// One worker's concluded orders and consumed units inside a time window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerTotals {
    pub worker_id: i64,
    pub worker_name: String,
    pub activities_concluded: i64,
    pub units_consumed: i64,
}

pub async fn worker_totals_between(
    db: &Database,
    since: String,
    until: String,
) -> Result<Vec<WorkerTotals>, FibrestockError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT a.worker_id, a.worker_name,
                        COUNT(DISTINCT a.id),
                        COALESCE(SUM(u.quantity), 0)
                 FROM activities a
                 LEFT JOIN material_usage u ON u.activity_id = a.id
                 WHERE a.status = 'concluded'
                 AND a.concluded_at >= ?1 AND a.concluded_at < ?2
                 GROUP BY a.worker_id, a.worker_name
                 ORDER BY 3 DESC, a.worker_name ASC",
            )?;
            let rows = stmt.query_map(params![since, until], |row| {
                Ok(WorkerTotals {
                    worker_id: row.get(0)?,
                    worker_name: row.get(1)?,
                    activities_concluded: row.get(2)?,
                    units_consumed: row.get(3)?,
                })
            })?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn activities_created_between(
    db: &Database,
    since: String,
    until: String,
) -> Result<i64, FibrestockError> {
    db.connection()
        .call(move |conn| {
            Ok(conn.query_row(
                "SELECT COUNT(*) FROM activities
                 WHERE created_at >= ?1 AND created_at < ?2",
                params![since, until],
                |row| row.get(0),
            )?)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn activities_concluded_between(
    db: &Database,
    since: String,
    until: String,
) -> Result<i64, FibrestockError> {
    db.connection()
        .call(move |conn| {
            Ok(conn.query_row(
                "SELECT COUNT(*) FROM activities
                 WHERE status = 'concluded'
                 AND concluded_at >= ?1 AND concluded_at < ?2",
                params![since, until],
                |row| row.get(0),
            )?)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::{materials, stock};
    use fibrestock_core::{MovementKind, MovementRequest, NewMaterial};
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    async fn seed(db: &Database, name: &str, category: &str, quantity: i64, minimum: i64) -> i64 {
        materials::create(
            db,
            NewMaterial {
                name: name.to_string(),
                category: category.to_string(),
                quantity,
                minimum_quantity: minimum,
                unit: "unit".to_string(),
                ..Default::default()
            },
            None,
            None,
        )
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn stock_counts_split_by_threshold() {
        let (db, _dir) = setup_db().await;
        seed(&db, "Healthy", "a", 100, 10).await;
        seed(&db, "Low", "a", 5, 10).await;
        seed(&db, "Empty", "b", 0, 10).await;

        let counts = stock_counts(&db, MaterialScope::All).await.unwrap();
        assert_eq!(counts.total, 3);
        assert_eq!(counts.out_of_stock, 1);
        assert_eq!(counts.low_stock, 1);

        let by_category = category_counts(&db, MaterialScope::All).await.unwrap();
        assert_eq!(by_category.len(), 2);
        assert_eq!(by_category[0].category, "a");
        assert_eq!(by_category[0].count, 2);
    }

    #[tokio::test]
    async fn movement_totals_respect_the_window() {
        let (db, _dir) = setup_db().await;
        let id = seed(&db, "Cable", "cables", 100, 10).await;
        stock::apply_movement(&db, MovementRequest::new(id, MovementKind::Exit, 30))
            .await
            .unwrap();

        // Window covering everything: the seed entry plus the exit.
        let totals =
            movement_totals_between(&db, "0000".to_string(), "9999".to_string())
                .await
                .unwrap();
        assert_eq!(totals.entries, 1);
        assert_eq!(totals.entry_units, 100);
        assert_eq!(totals.exits, 1);
        assert_eq!(totals.exit_units, 30);

        // Empty window.
        let none = movement_totals_between(&db, "9998".to_string(), "9999".to_string())
            .await
            .unwrap();
        assert_eq!(none.entries, 0);
        assert_eq!(none.exit_units, 0);
    }

    #[tokio::test]
    async fn worker_totals_aggregate_concluded_orders() {
        use crate::queries::activities;
        use fibrestock_core::{Completion, NewActivity};

        let (db, _dir) = setup_db().await;
        let material = seed(&db, "Cable", "cables", 100, 10).await;
        for consumed in [vec![(material, 7)], Vec::new()] {
            let activity = activities::create(
                &db,
                NewActivity {
                    title: "job".to_string(),
                    ..Default::default()
                },
                10,
                "wes".to_string(),
                20,
                "sue".to_string(),
            )
            .await
            .unwrap();
            activities::complete(
                &db,
                activity.id,
                Completion {
                    materials_consumed: consumed,
                    ..Default::default()
                },
                10,
                "wes".to_string(),
            )
            .await
            .unwrap();
        }

        let totals = worker_totals_between(&db, "0000".to_string(), "9999".to_string())
            .await
            .unwrap();
        assert_eq!(totals.len(), 1);
        assert_eq!(totals[0].worker_name, "wes");
        assert_eq!(totals[0].activities_concluded, 2);
        assert_eq!(totals[0].units_consumed, 7);

        assert_eq!(
            activities_created_between(&db, "0000".to_string(), "9999".to_string())
                .await
                .unwrap(),
            2
        );
    }

    #[tokio::test]
    async fn top_consumed_orders_by_units() {
        let (db, _dir) = setup_db().await;
        let a = seed(&db, "A", "x", 100, 10).await;
        let b = seed(&db, "B", "x", 100, 10).await;
        stock::apply_movement(&db, MovementRequest::new(a, MovementKind::Exit, 10))
            .await
            .unwrap();
        stock::apply_movement(&db, MovementRequest::new(b, MovementKind::Exit, 25))
            .await
            .unwrap();

        let top = top_consumed_between(&db, "0000".to_string(), "9999".to_string(), 10)
            .await
            .unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].name, "B");
        assert_eq!(top[0].units, 25);
    }
}
