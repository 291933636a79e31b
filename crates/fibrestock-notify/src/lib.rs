// SPDX-FileCopyrightText: 2026 Fibrestock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stored notification sink.
//!
//! [`StoredNotifications`] persists events into the database inbox and also
//! serves as the read side: listing, unread counts, and read marks. Sinks
//! are fire and forget from the caller's side; a failure here is logged by
//! the dispatching engine and never aborts the triggering operation.

use async_trait::async_trait;
use fibrestock_core::{FibrestockError, Notification, NotificationEvent, NotificationSink, Principal};
use fibrestock_storage::queries::notifications;
use fibrestock_storage::Database;

const DEFAULT_INBOX_LIMIT: i64 = 50;

#[derive(Clone)]
pub struct StoredNotifications {
    db: Database,
}

impl StoredNotifications {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// The principal's inbox, newest first, capped at 50 entries.
    pub async fn inbox(
        &self,
        principal: &Principal,
    ) -> Result<Vec<Notification>, FibrestockError> {
        notifications::list_for_recipient(&self.db, principal.id, DEFAULT_INBOX_LIMIT).await
    }

    pub async fn unread_count(&self, principal: &Principal) -> Result<i64, FibrestockError> {
        notifications::unread_count(&self.db, principal.id).await
    }

    /// Mark one notification read. Fails with `PermissionDenied` for
    /// notifications addressed to someone else.
    pub async fn mark_read(&self, principal: &Principal, id: i64) -> Result<(), FibrestockError> {
        notifications::mark_read(&self.db, id, principal.id).await
    }

    pub async fn mark_all_read(&self, principal: &Principal) -> Result<usize, FibrestockError> {
        notifications::mark_all_read(&self.db, principal.id).await
    }
}

#[async_trait]
impl NotificationSink for StoredNotifications {
    async fn notify(&self, event: NotificationEvent) -> Result<(), FibrestockError> {
        let stored = notifications::insert(&self.db, event).await?;
        tracing::debug!(
            notification_id = stored.id,
            recipient_id = stored.recipient_id,
            kind = %stored.kind,
            "notification stored"
        );
        Ok(())
    }
}
