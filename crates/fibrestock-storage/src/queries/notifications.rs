// SPDX-FileCopyrightText: 2026 Fibrestock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stored notification inbox.

use fibrestock_core::{FibrestockError, Notification, NotificationEvent};
use rusqlite::params;

use crate::database::Database;

const NOTIFICATION_COLS: &str =
    "id, recipient_id, title, message, kind, activity_id, read, created_at";

fn notification_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Notification> {
    let kind: String = row.get(4)?;
    Ok(Notification {
        id: row.get(0)?,
        recipient_id: row.get(1)?,
        title: row.get(2)?,
        message: row.get(3)?,
        kind: super::parse_column(4, &kind)?,
        activity_id: row.get(5)?,
        read: row.get(6)?,
        created_at: row.get(7)?,
    })
}

/// Persist an event into the recipient's inbox.
pub async fn insert(
    db: &Database,
    event: NotificationEvent,
) -> Result<Notification, FibrestockError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO notifications (recipient_id, title, message, kind, activity_id)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    event.recipient_id,
                    event.title,
                    event.message,
                    event.kind.to_string(),
                    event.activity_id,
                ],
            )?;
            let notification = conn.query_row(
                &format!(
                    "SELECT {NOTIFICATION_COLS} FROM notifications WHERE id = last_insert_rowid()"
                ),
                [],
                notification_from_row,
            )?;
            Ok(notification)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Inbox for one recipient: unread first, then newest first.
pub async fn list_for_recipient(
    db: &Database,
    recipient_id: i64,
    limit: i64,
) -> Result<Vec<Notification>, FibrestockError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {NOTIFICATION_COLS} FROM notifications
                 WHERE recipient_id = ?1
                 ORDER BY read ASC, created_at DESC, id DESC
                 LIMIT ?2"
            ))?;
            let rows = stmt.query_map(params![recipient_id, limit], notification_from_row)?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn unread_count(db: &Database, recipient_id: i64) -> Result<i64, FibrestockError> {
    db.connection()
        .call(move |conn| {
            Ok(conn.query_row(
                "SELECT COUNT(*) FROM notifications WHERE recipient_id = ?1 AND read = 0",
                params![recipient_id],
                |row| row.get(0),
            )?)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Mark one notification as read. Recipients can only touch their own inbox.
pub async fn mark_read(
    db: &Database,
    id: i64,
    recipient_id: i64,
) -> Result<(), FibrestockError> {
    db.connection()
        .call(move |conn| {
            let owner = conn.query_row(
                "SELECT recipient_id FROM notifications WHERE id = ?1",
                params![id],
                |row| row.get::<_, i64>(0),
            );
            match owner {
                Ok(owner) if owner == recipient_id => {
                    conn.execute(
                        "UPDATE notifications SET read = 1 WHERE id = ?1",
                        params![id],
                    )?;
                    Ok(Ok(()))
                }
                Ok(_) => Ok(Err(FibrestockError::permission(
                    "notification belongs to another recipient",
                ))),
                Err(rusqlite::Error::QueryReturnedNoRows) => {
                    Ok(Err(FibrestockError::not_found("notification", id)))
                }
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)?
}

/// Mark the whole inbox read. Returns the number of rows flipped.
pub async fn mark_all_read(db: &Database, recipient_id: i64) -> Result<usize, FibrestockError> {
    db.connection()
        .call(move |conn| {
            Ok(conn.execute(
                "UPDATE notifications SET read = 1 WHERE recipient_id = ?1 AND read = 0",
                params![recipient_id],
            )?)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fibrestock_core::NotificationKind;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    fn event(recipient_id: i64, title: &str) -> NotificationEvent {
        NotificationEvent {
            recipient_id,
            title: title.to_string(),
            message: format!("{title} message"),
            kind: NotificationKind::ActivityAssigned,
            activity_id: Some(1),
        }
    }

    #[tokio::test]
    async fn inbox_is_per_recipient_unread_first() {
        let (db, _dir) = setup_db().await;
        insert(&db, event(1, "first")).await.unwrap();
        let second = insert(&db, event(1, "second")).await.unwrap();
        insert(&db, event(2, "other")).await.unwrap();

        let inbox = list_for_recipient(&db, 1, 50).await.unwrap();
        assert_eq!(inbox.len(), 2);
        assert_eq!(inbox[0].title, "second");
        assert!(!inbox[0].read);
        assert_eq!(unread_count(&db, 1).await.unwrap(), 2);
        assert_eq!(unread_count(&db, 2).await.unwrap(), 1);

        // Read notifications sink below unread ones regardless of age.
        mark_read(&db, second.id, 1).await.unwrap();
        let inbox = list_for_recipient(&db, 1, 50).await.unwrap();
        assert_eq!(inbox[0].title, "first");
        assert_eq!(inbox[1].title, "second");
    }

    #[tokio::test]
    async fn mark_read_is_scoped_to_the_recipient() {
        let (db, _dir) = setup_db().await;
        let mine = insert(&db, event(1, "mine")).await.unwrap();

        let err = mark_read(&db, mine.id, 2).await.unwrap_err();
        assert!(matches!(err, FibrestockError::PermissionDenied { .. }));
        assert_eq!(unread_count(&db, 1).await.unwrap(), 1);

        mark_read(&db, mine.id, 1).await.unwrap();
        assert_eq!(unread_count(&db, 1).await.unwrap(), 0);

        let err = mark_read(&db, 999, 1).await.unwrap_err();
        assert!(matches!(err, FibrestockError::NotFound { .. }));
    }

    #[tokio::test]
    async fn mark_all_read_flips_only_unread_rows() {
        let (db, _dir) = setup_db().await;
        let a = insert(&db, event(1, "a")).await.unwrap();
        insert(&db, event(1, "b")).await.unwrap();
        mark_read(&db, a.id, 1).await.unwrap();

        assert_eq!(mark_all_read(&db, 1).await.unwrap(), 1);
        assert_eq!(unread_count(&db, 1).await.unwrap(), 0);
    }
}
