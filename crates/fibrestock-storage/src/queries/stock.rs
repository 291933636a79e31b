// SPDX-FileCopyrightText: 2026 Fibrestock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Movement ledger operations.
//!
//! Every quantity mutation in the workspace funnels through
//! [`apply_movement_tx`], which runs inside the caller's transaction. It
//! validates against the current row, writes the ledger record with before
//! and after snapshots, and updates the cached `materials.quantity` in the
//! same transaction. Domain failures are returned as the inner `Err` so the
//! transaction rolls back on drop without committing anything.

use fibrestock_core::{FibrestockError, MovementKind, MovementRecord, MovementRequest};
use rusqlite::params;

use crate::database::Database;

pub(crate) const MOVEMENT_COLS: &str = "id, material_id, kind, magnitude, quantity_before, \
     quantity_after, reason, responsible, responsible_id, evidence, created_at";

pub(crate) fn movement_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<MovementRecord> {
    let kind: String = row.get(2)?;
    Ok(MovementRecord {
        id: row.get(0)?,
        material_id: row.get(1)?,
        kind: super::parse_column(2, &kind)?,
        magnitude: row.get(3)?,
        quantity_before: row.get(4)?,
        quantity_after: row.get(5)?,
        reason: row.get(6)?,
        responsible: row.get(7)?,
        responsible_id: row.get(8)?,
        evidence: super::evidence_from_json(row.get(9)?),
        created_at: row.get(10)?,
    })
}

/// Apply one movement inside an open transaction.
///
/// The single write path for stock quantities: validates the material
/// exists and is active, rejects exits that would drive the quantity
/// negative, then inserts the ledger row and updates the cached quantity.
pub(crate) fn apply_movement_tx(
    tx: &rusqlite::Transaction<'_>,
    material_id: i64,
    kind: MovementKind,
    magnitude: i64,
    reason: Option<String>,
    responsible: Option<String>,
    responsible_id: Option<i64>,
    evidence: &[String],
) -> rusqlite::Result<Result<MovementRecord, FibrestockError>> {
    if magnitude <= 0 {
        return Ok(Err(FibrestockError::Validation(format!(
            "movement magnitude must be positive, got {magnitude}"
        ))));
    }

    let current = tx.query_row(
        "SELECT name, quantity, active FROM materials WHERE id = ?1",
        params![material_id],
        |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, bool>(2)?,
            ))
        },
    );
    let (name, before, active) = match current {
        Ok(row) => row,
        Err(rusqlite::Error::QueryReturnedNoRows) => {
            return Ok(Err(FibrestockError::not_found("material", material_id)));
        }
        Err(e) => return Err(e),
    };
    if !active {
        return Ok(Err(FibrestockError::Validation(format!(
            "material '{name}' is deactivated"
        ))));
    }

    let after = match kind {
        MovementKind::Entry => before + magnitude,
        MovementKind::Exit => {
            if magnitude > before {
                return Ok(Err(FibrestockError::InsufficientStock {
                    material: name,
                    available: before,
                    requested: magnitude,
                }));
            }
            before - magnitude
        }
    };

    tx.execute(
        "UPDATE materials SET quantity = ?1,
         updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
         WHERE id = ?2",
        params![after, material_id],
    )?;
    tx.execute(
        "INSERT INTO movements (material_id, kind, magnitude, quantity_before,
         quantity_after, reason, responsible, responsible_id, evidence)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            material_id,
            kind.to_string(),
            magnitude,
            before,
            after,
            reason,
            responsible,
            responsible_id,
            super::evidence_to_json(evidence),
        ],
    )?;
    let record = tx.query_row(
        &format!("SELECT {MOVEMENT_COLS} FROM movements WHERE id = last_insert_rowid()"),
        [],
        movement_from_row,
    )?;
    Ok(Ok(record))
}

/// Apply a single stock movement as its own transaction.
pub async fn apply_movement(
    db: &Database,
    request: MovementRequest,
) -> Result<MovementRecord, FibrestockError> {
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let result = apply_movement_tx(
                &tx,
                request.material_id,
                request.kind,
                request.magnitude,
                request.reason,
                request.responsible,
                request.responsible_id,
                &request.evidence,
            )?;
            if result.is_ok() {
                tx.commit()?;
            }
            Ok(result)
        })
        .await
        .map_err(crate::database::map_tr_err)?
}

/// Set a material's quantity to an absolute value by recording the
/// compensating movement. Returns `None` when the value is already current
/// (no ledger row is written).
pub async fn set_quantity_absolute(
    db: &Database,
    material_id: i64,
    new_quantity: i64,
    reason: Option<String>,
    responsible: Option<String>,
    responsible_id: Option<i64>,
) -> Result<Option<MovementRecord>, FibrestockError> {
    if new_quantity < 0 {
        return Err(FibrestockError::Validation(format!(
            "quantity cannot be negative, got {new_quantity}"
        )));
    }
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let current = tx.query_row(
                "SELECT quantity FROM materials WHERE id = ?1",
                params![material_id],
                |row| row.get::<_, i64>(0),
            );
            let before = match current {
                Ok(value) => value,
                Err(rusqlite::Error::QueryReturnedNoRows) => {
                    return Ok(Err(FibrestockError::not_found("material", material_id)));
                }
                Err(e) => return Err(e.into()),
            };
            if before == new_quantity {
                tx.commit()?;
                return Ok(Ok(None));
            }
            let (kind, magnitude) = if new_quantity > before {
                (MovementKind::Entry, new_quantity - before)
            } else {
                (MovementKind::Exit, before - new_quantity)
            };
            let result = apply_movement_tx(
                &tx,
                material_id,
                kind,
                magnitude,
                reason,
                responsible,
                responsible_id,
                &[],
            )?;
            match result {
                Ok(record) => {
                    tx.commit()?;
                    Ok(Ok(Some(record)))
                }
                Err(e) => Ok(Err(e)),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)?
}

/// Ledger history for one material, newest first.
pub async fn list_for_material(
    db: &Database,
    material_id: i64,
    limit: Option<i64>,
) -> Result<Vec<MovementRecord>, FibrestockError> {
    db.connection()
        .call(move |conn| {
            let limit = limit.unwrap_or(i64::MAX);
            let mut stmt = conn.prepare(&format!(
                "SELECT {MOVEMENT_COLS} FROM movements
                 WHERE material_id = ?1
                 ORDER BY created_at DESC, id DESC
                 LIMIT ?2"
            ))?;
            let rows = stmt.query_map(params![material_id, limit], movement_from_row)?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Most recent movements across all materials, newest first.
pub async fn recent(db: &Database, limit: i64) -> Result<Vec<MovementRecord>, FibrestockError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MOVEMENT_COLS} FROM movements
                 ORDER BY created_at DESC, id DESC
                 LIMIT ?1"
            ))?;
            let rows = stmt.query_map(params![limit], movement_from_row)?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Fetch a single ledger record.
pub async fn get(db: &Database, id: i64) -> Result<Option<MovementRecord>, FibrestockError> {
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                &format!("SELECT {MOVEMENT_COLS} FROM movements WHERE id = ?1"),
                params![id],
                movement_from_row,
            );
            match result {
                Ok(record) => Ok(Some(record)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
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

    async fn seed(db: &Database, name: &str, quantity: i64) -> i64 {
        let material = materials::create(
            db,
            NewMaterial {
                name: name.to_string(),
                category: "connectors".to_string(),
                quantity,
                minimum_quantity: 10,
                unit: "unit".to_string(),
                ..Default::default()
            },
            Some("seeder".to_string()),
            Some(1),
        )
        .await
        .unwrap();
        material.id
    }

    #[tokio::test]
    async fn entry_and_exit_update_the_cached_quantity() {
        let (db, _dir) = setup_db().await;
        let id = seed(&db, "SC/APC Connector", 100).await;

        let entry = apply_movement(
            &db,
            MovementRequest::new(id, MovementKind::Entry, 50).with_reason("restock"),
        )
        .await
        .unwrap();
        assert_eq!(entry.quantity_before, 100);
        assert_eq!(entry.quantity_after, 150);

        let exit = apply_movement(&db, MovementRequest::new(id, MovementKind::Exit, 30))
            .await
            .unwrap();
        assert_eq!(exit.quantity_before, 150);
        assert_eq!(exit.quantity_after, 120);

        let material = materials::get(&db, id).await.unwrap().unwrap();
        assert_eq!(material.quantity, 120);
    }

    #[tokio::test]
    async fn exit_beyond_stock_is_rejected_and_leaves_no_trace() {
        let (db, _dir) = setup_db().await;
        let id = seed(&db, "Drop Cable 1km", 10).await;

        let err = apply_movement(&db, MovementRequest::new(id, MovementKind::Exit, 11))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            FibrestockError::InsufficientStock {
                available: 10,
                requested: 11,
                ..
            }
        ));

        let material = materials::get(&db, id).await.unwrap().unwrap();
        assert_eq!(material.quantity, 10);
        // Only the seeding entry is in the ledger.
        let history = list_for_material(&db, id, None).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].kind, MovementKind::Entry);
    }

    #[tokio::test]
    async fn exit_to_exactly_zero_is_allowed() {
        let (db, _dir) = setup_db().await;
        let id = seed(&db, "Splice Tray", 10).await;

        let exit = apply_movement(&db, MovementRequest::new(id, MovementKind::Exit, 10))
            .await
            .unwrap();
        assert_eq!(exit.quantity_after, 0);
    }

    #[tokio::test]
    async fn zero_or_negative_magnitude_is_rejected() {
        let (db, _dir) = setup_db().await;
        let id = seed(&db, "Patch Cord", 5).await;

        for magnitude in [0, -3] {
            let err = apply_movement(&db, MovementRequest::new(id, MovementKind::Entry, magnitude))
                .await
                .unwrap_err();
            assert!(matches!(err, FibrestockError::Validation(_)));
        }
    }

    #[tokio::test]
    async fn unknown_material_is_not_found() {
        let (db, _dir) = setup_db().await;
        let err = apply_movement(&db, MovementRequest::new(999, MovementKind::Entry, 1))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            FibrestockError::NotFound {
                entity: "material",
                id: 999
            }
        ));
    }

    #[tokio::test]
    async fn set_absolute_records_the_delta() {
        let (db, _dir) = setup_db().await;
        let id = seed(&db, "CTO Box", 40).await;

        let record = set_quantity_absolute(&db, id, 25, Some("audit".to_string()), None, None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.kind, MovementKind::Exit);
        assert_eq!(record.magnitude, 15);
        assert_eq!(record.quantity_after, 25);

        let record = set_quantity_absolute(&db, id, 60, None, None, None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.kind, MovementKind::Entry);
        assert_eq!(record.magnitude, 35);
        assert_eq!(record.quantity_after, 60);
    }

    #[tokio::test]
    async fn set_absolute_to_current_value_is_a_no_op() {
        let (db, _dir) = setup_db().await;
        let id = seed(&db, "Fiber Cleaner", 12).await;

        let result = set_quantity_absolute(&db, id, 12, None, None, None)
            .await
            .unwrap();
        assert!(result.is_none());
        // Seeding entry only; no adjustment row was written.
        assert_eq!(list_for_material(&db, id, None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn concurrent_exits_never_oversell() {
        let (db, _dir) = setup_db().await;
        let id = seed(&db, "Optical Splitter", 10).await;

        let a = apply_movement(&db, MovementRequest::new(id, MovementKind::Exit, 6));
        let b = apply_movement(&db, MovementRequest::new(id, MovementKind::Exit, 6));
        let (ra, rb) = tokio::join!(a, b);

        // Exactly one of the two can succeed on a stock of 10.
        assert!(ra.is_ok() != rb.is_ok());
        let material = materials::get(&db, id).await.unwrap().unwrap();
        assert_eq!(material.quantity, 4);
    }

    #[tokio::test]
    async fn history_is_newest_first() {
        let (db, _dir) = setup_db().await;
        let id = seed(&db, "ONU", 0).await;

        for magnitude in [5, 7, 9] {
            apply_movement(&db, MovementRequest::new(id, MovementKind::Entry, magnitude))
                .await
                .unwrap();
        }
        let history = list_for_material(&db, id, None).await.unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].magnitude, 9);
        assert_eq!(history[2].magnitude, 5);

        let limited = list_for_material(&db, id, Some(2)).await.unwrap();
        assert_eq!(limited.len(), 2);
    }
}
