// SPDX-FileCopyrightText: 2026 Fibrestock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Work order operations.
//!
//! Completion is the one multi-table transaction in the workspace: exit
//! movements, usage records, and the status flip either all commit or all
//! roll back. A shortage on the last material of a batch leaves no trace of
//! the earlier withdrawals.

use fibrestock_core::{
    Activity, ActivityPatch, ActivityStatus, Completion, FibrestockError, MaterialUsage,
    MovementKind, MovementRecord, NewActivity,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter};

use crate::database::Database;
use crate::queries::stock::apply_movement_tx;
use fibrestock_core::ActivityScope;

pub(crate) const ACTIVITY_COLS: &str = "id, title, description, worker_id, worker_name, \
     supervisor_id, supervisor_name, material_id, required_quantity, status, deadline, \
     concluded_at, notes, completion_notes, latitude, longitude, address, evidence, created_at";

pub(crate) fn activity_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Activity> {
    let status: String = row.get(9)?;
    Ok(Activity {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        worker_id: row.get(3)?,
        worker_name: row.get(4)?,
        supervisor_id: row.get(5)?,
        supervisor_name: row.get(6)?,
        material_id: row.get(7)?,
        required_quantity: row.get(8)?,
        status: super::parse_column(9, &status)?,
        deadline: row.get(10)?,
        concluded_at: row.get(11)?,
        notes: row.get(12)?,
        completion_notes: row.get(13)?,
        latitude: row.get(14)?,
        longitude: row.get(15)?,
        address: row.get(16)?,
        evidence: super::evidence_from_json(row.get(17)?),
        created_at: row.get(18)?,
    })
}

fn select_activity(
    conn: &rusqlite::Connection,
    id: i64,
) -> rusqlite::Result<Option<Activity>> {
    let result = conn.query_row(
        &format!("SELECT {ACTIVITY_COLS} FROM activities WHERE id = ?1"),
        params![id],
        activity_from_row,
    );
    match result {
        Ok(activity) => Ok(Some(activity)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Insert a pending work order. Worker and supervisor names are stored as
/// snapshots; principals live in an external system.
pub async fn create(
    db: &Database,
    new: NewActivity,
    worker_id: i64,
    worker_name: String,
    supervisor_id: i64,
    supervisor_name: String,
) -> Result<Activity, FibrestockError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO activities (title, description, worker_id, worker_name,
                 supervisor_id, supervisor_name, material_id, required_quantity,
                 deadline, notes)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    new.title,
                    new.description,
                    worker_id,
                    worker_name,
                    supervisor_id,
                    supervisor_name,
                    new.material_id,
                    new.required_quantity,
                    new.deadline,
                    new.notes,
                ],
            )?;
            let activity = conn.query_row(
                &format!("SELECT {ACTIVITY_COLS} FROM activities WHERE id = last_insert_rowid()"),
                [],
                activity_from_row,
            )?;
            Ok(activity)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Fetch a single work order by id.
pub async fn get(db: &Database, id: i64) -> Result<Option<Activity>, FibrestockError> {
    db.connection()
        .call(move |conn| Ok(select_activity(conn, id)?))
        .await
        .map_err(crate::database::map_tr_err)
}

/// List work orders visible in the given scope, newest first.
pub async fn list(
    db: &Database,
    scope: ActivityScope,
    status: Option<ActivityStatus>,
) -> Result<Vec<Activity>, FibrestockError> {
    db.connection()
        .call(move |conn| {
            let mut sql = format!("SELECT {ACTIVITY_COLS} FROM activities WHERE 1 = 1");
            let mut values: Vec<Value> = Vec::new();
            match scope {
                ActivityScope::All => {}
                ActivityScope::CreatedBy(id) => {
                    sql.push_str(&format!(" AND supervisor_id = ?{}", values.len() + 1));
                    values.push(Value::Integer(id));
                }
                ActivityScope::AssignedTo(id) => {
                    sql.push_str(&format!(" AND worker_id = ?{}", values.len() + 1));
                    values.push(Value::Integer(id));
                }
            }
            if let Some(status) = status {
                sql.push_str(&format!(" AND status = ?{}", values.len() + 1));
                values.push(Value::Text(status.to_string()));
            }
            sql.push_str(" ORDER BY created_at DESC, id DESC");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(values), activity_from_row)?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Patch a pending work order. Concluded and cancelled orders are immutable.
pub async fn update(
    db: &Database,
    id: i64,
    patch: ActivityPatch,
) -> Result<Activity, FibrestockError> {
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            match pending_guard(&tx, id)? {
                Ok(_) => {}
                Err(e) => return Ok(Err(e)),
            }

            let mut sets: Vec<String> = Vec::new();
            let mut values: Vec<Value> = Vec::new();
            let mut set = |column: &str, value: Value, sets: &mut Vec<String>, values: &mut Vec<Value>| {
                values.push(value);
                sets.push(format!("{column} = ?{}", values.len()));
            };
            if let Some(title) = patch.title {
                set("title", Value::Text(title), &mut sets, &mut values);
            }
            if let Some(description) = patch.description {
                set("description", Value::Text(description), &mut sets, &mut values);
            }
            if let Some(required) = patch.required_quantity {
                set("required_quantity", Value::Integer(required), &mut sets, &mut values);
            }
            if let Some(deadline) = patch.deadline {
                set("deadline", Value::Text(deadline), &mut sets, &mut values);
            }
            if let Some(notes) = patch.notes {
                set("notes", Value::Text(notes), &mut sets, &mut values);
            }
            if !sets.is_empty() {
                values.push(Value::Integer(id));
                let sql = format!(
                    "UPDATE activities SET {} WHERE id = ?{}",
                    sets.join(", "),
                    values.len()
                );
                tx.execute(&sql, params_from_iter(values))?;
            }
            let activity = tx.query_row(
                &format!("SELECT {ACTIVITY_COLS} FROM activities WHERE id = ?1"),
                params![id],
                activity_from_row,
            )?;
            tx.commit()?;
            Ok(Ok(activity))
        })
        .await
        .map_err(crate::database::map_tr_err)?
}

/// Cancel a pending work order. Terminal; no stock is touched.
pub async fn cancel(db: &Database, id: i64) -> Result<Activity, FibrestockError> {
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            match pending_guard(&tx, id)? {
                Ok(_) => {}
                Err(e) => return Ok(Err(e)),
            }
            tx.execute(
                "UPDATE activities SET status = 'cancelled' WHERE id = ?1",
                params![id],
            )?;
            let activity = tx.query_row(
                &format!("SELECT {ACTIVITY_COLS} FROM activities WHERE id = ?1"),
                params![id],
                activity_from_row,
            )?;
            tx.commit()?;
            Ok(Ok(activity))
        })
        .await
        .map_err(crate::database::map_tr_err)?
}

/// Conclude a pending work order, withdrawing the consumed materials.
///
/// Runs as one transaction: every exit movement, every usage record, and
/// the status flip commit together or not at all.
pub async fn complete(
    db: &Database,
    id: i64,
    completion: Completion,
    responsible_id: i64,
    responsible_name: String,
) -> Result<(Activity, Vec<MovementRecord>), FibrestockError> {
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let title = match pending_guard(&tx, id)? {
                Ok(title) => title,
                Err(e) => return Ok(Err(e)),
            };

            let mut movements = Vec::new();
            for (material_id, quantity) in &completion.materials_consumed {
                if *quantity <= 0 {
                    continue;
                }
                let result = apply_movement_tx(
                    &tx,
                    *material_id,
                    MovementKind::Exit,
                    *quantity,
                    Some(format!("activity concluded: {title}")),
                    Some(responsible_name.clone()),
                    Some(responsible_id),
                    &[],
                )?;
                match result {
                    Ok(record) => movements.push(record),
                    Err(e) => return Ok(Err(e)),
                }
                tx.execute(
                    "INSERT INTO material_usage (activity_id, material_id, quantity)
                     VALUES (?1, ?2, ?3)",
                    params![id, material_id, quantity],
                )?;
            }

            tx.execute(
                "UPDATE activities SET status = 'concluded',
                 concluded_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now'),
                 completion_notes = ?1, latitude = ?2, longitude = ?3,
                 address = ?4, evidence = ?5
                 WHERE id = ?6",
                params![
                    completion.completion_notes,
                    completion.latitude,
                    completion.longitude,
                    completion.address,
                    super::evidence_to_json(&completion.evidence),
                    id,
                ],
            )?;
            let activity = tx.query_row(
                &format!("SELECT {ACTIVITY_COLS} FROM activities WHERE id = ?1"),
                params![id],
                activity_from_row,
            )?;
            tx.commit()?;
            Ok(Ok((activity, movements)))
        })
        .await
        .map_err(crate::database::map_tr_err)?
}

/// Usage records written when the activity was concluded.
pub async fn usage_for(
    db: &Database,
    activity_id: i64,
) -> Result<Vec<MaterialUsage>, FibrestockError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, activity_id, material_id, quantity, used_at
                 FROM material_usage WHERE activity_id = ?1 ORDER BY id",
            )?;
            let rows = stmt.query_map(params![activity_id], |row| {
                Ok(MaterialUsage {
                    id: row.get(0)?,
                    activity_id: row.get(1)?,
                    material_id: row.get(2)?,
                    quantity: row.get(3)?,
                    used_at: row.get(4)?,
                })
            })?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Fetch title after checking the order exists and is still pending.
fn pending_guard(
    tx: &rusqlite::Transaction<'_>,
    id: i64,
) -> rusqlite::Result<Result<String, FibrestockError>> {
    let row = tx.query_row(
        "SELECT status, title FROM activities WHERE id = ?1",
        params![id],
        |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
    );
    let (status, title) = match row {
        Ok(row) => row,
        Err(rusqlite::Error::QueryReturnedNoRows) => {
            return Ok(Err(FibrestockError::not_found("activity", id)));
        }
        Err(e) => return Err(e),
    };
    let status: ActivityStatus = super::parse_column(0, &status)?;
    if status != ActivityStatus::Pending {
        return Ok(Err(FibrestockError::InvalidTransition { status }));
    }
    Ok(Ok(title))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::materials;
    use fibrestock_core::NewMaterial;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    async fn seed_material(db: &Database, name: &str, quantity: i64) -> i64 {
        materials::create(
            db,
            NewMaterial {
                name: name.to_string(),
                category: "connectors".to_string(),
                quantity,
                minimum_quantity: 10,
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

    async fn seed_activity(db: &Database, title: &str) -> Activity {
        create(
            db,
            NewActivity {
                title: title.to_string(),
                ..Default::default()
            },
            10,
            "worker".to_string(),
            20,
            "supervisor".to_string(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn create_starts_pending_with_name_snapshots() {
        let (db, _dir) = setup_db().await;
        let activity = seed_activity(&db, "Install drop at 12 Main St").await;
        assert_eq!(activity.status, ActivityStatus::Pending);
        assert_eq!(activity.worker_name, "worker");
        assert_eq!(activity.supervisor_name, "supervisor");
        assert!(activity.concluded_at.is_none());
    }

    #[tokio::test]
    async fn completion_withdraws_stock_and_records_usage() {
        let (db, _dir) = setup_db().await;
        let material_id = seed_material(&db, "SC/APC Connector", 200).await;
        let activity = seed_activity(&db, "Splice closure").await;

        let (concluded, movements) = complete(
            &db,
            activity.id,
            Completion {
                completion_notes: Some("done".to_string()),
                materials_consumed: vec![(material_id, 10)],
                ..Default::default()
            },
            10,
            "worker".to_string(),
        )
        .await
        .unwrap();

        assert_eq!(concluded.status, ActivityStatus::Concluded);
        assert!(concluded.concluded_at.is_some());
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].kind, MovementKind::Exit);
        assert_eq!(movements[0].quantity_before, 200);
        assert_eq!(movements[0].quantity_after, 190);
        assert_eq!(
            movements[0].reason.as_deref(),
            Some("activity concluded: Splice closure")
        );

        let usage = usage_for(&db, activity.id).await.unwrap();
        assert_eq!(usage.len(), 1);
        assert_eq!(usage[0].material_id, material_id);
        assert_eq!(usage[0].quantity, 10);

        let material = materials::get(&db, material_id).await.unwrap().unwrap();
        assert_eq!(material.quantity, 190);
    }

    #[tokio::test]
    async fn completion_shortage_rolls_back_everything() {
        let (db, _dir) = setup_db().await;
        let plenty = seed_material(&db, "Plenty", 100).await;
        let scarce = seed_material(&db, "Scarce", 3).await;
        let activity = seed_activity(&db, "Big install").await;

        let err = complete(
            &db,
            activity.id,
            Completion {
                materials_consumed: vec![(plenty, 5), (scarce, 1_000_000)],
                ..Default::default()
            },
            10,
            "worker".to_string(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, FibrestockError::InsufficientStock { .. }));

        // First withdrawal rolled back with the rest.
        assert_eq!(
            materials::get(&db, plenty).await.unwrap().unwrap().quantity,
            100
        );
        assert_eq!(
            materials::get(&db, scarce).await.unwrap().unwrap().quantity,
            3
        );
        assert!(usage_for(&db, activity.id).await.unwrap().is_empty());
        let unchanged = get(&db, activity.id).await.unwrap().unwrap();
        assert_eq!(unchanged.status, ActivityStatus::Pending);
    }

    #[tokio::test]
    async fn completion_skips_non_positive_pairs() {
        let (db, _dir) = setup_db().await;
        let material_id = seed_material(&db, "Cable", 50).await;
        let activity = seed_activity(&db, "Trim run").await;

        let (_, movements) = complete(
            &db,
            activity.id,
            Completion {
                materials_consumed: vec![(material_id, 0), (material_id, -5), (material_id, 2)],
                ..Default::default()
            },
            10,
            "worker".to_string(),
        )
        .await
        .unwrap();
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].magnitude, 2);
    }

    #[tokio::test]
    async fn terminal_states_reject_every_mutation() {
        let (db, _dir) = setup_db().await;
        let activity = seed_activity(&db, "One shot").await;
        complete(&db, activity.id, Completion::default(), 10, "w".to_string())
            .await
            .unwrap();

        let err = complete(&db, activity.id, Completion::default(), 10, "w".to_string())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            FibrestockError::InvalidTransition {
                status: ActivityStatus::Concluded
            }
        ));
        let err = cancel(&db, activity.id).await.unwrap_err();
        assert!(matches!(err, FibrestockError::InvalidTransition { .. }));
        let err = update(
            &db,
            activity.id,
            ActivityPatch {
                title: Some("renamed".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, FibrestockError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn cancel_leaves_stock_untouched() {
        let (db, _dir) = setup_db().await;
        let material_id = seed_material(&db, "Reserved-ish", 30).await;
        let activity = create(
            &db,
            NewActivity {
                title: "Planned".to_string(),
                material_id: Some(material_id),
                required_quantity: Some(10),
                ..Default::default()
            },
            10,
            "worker".to_string(),
            20,
            "supervisor".to_string(),
        )
        .await
        .unwrap();

        let cancelled = cancel(&db, activity.id).await.unwrap();
        assert_eq!(cancelled.status, ActivityStatus::Cancelled);
        assert_eq!(
            materials::get(&db, material_id)
                .await
                .unwrap()
                .unwrap()
                .quantity,
            30
        );
    }

    #[tokio::test]
    async fn listing_scopes_filter_by_principal() {
        let (db, _dir) = setup_db().await;
        seed_activity(&db, "For worker 10").await;
        create(
            &db,
            NewActivity {
                title: "Other team".to_string(),
                ..Default::default()
            },
            11,
            "other".to_string(),
            21,
            "boss".to_string(),
        )
        .await
        .unwrap();

        assert_eq!(list(&db, ActivityScope::All, None).await.unwrap().len(), 2);
        let mine = list(&db, ActivityScope::AssignedTo(10), None).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].title, "For worker 10");
        let created = list(&db, ActivityScope::CreatedBy(21), None).await.unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].title, "Other team");
    }

    #[tokio::test]
    async fn status_filter_narrows_listing() {
        let (db, _dir) = setup_db().await;
        let a = seed_activity(&db, "Done").await;
        seed_activity(&db, "Open").await;
        complete(&db, a.id, Completion::default(), 10, "w".to_string())
            .await
            .unwrap();

        let pending = list(&db, ActivityScope::All, Some(ActivityStatus::Pending))
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].title, "Open");
        let concluded = list(&db, ActivityScope::All, Some(ActivityStatus::Concluded))
            .await
            .unwrap();
        assert_eq!(concluded.len(), 1);
        assert_eq!(concluded[0].title, "Done");
    }
}
