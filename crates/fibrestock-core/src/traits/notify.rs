// SPDX-FileCopyrightText: 2026 Fibrestock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification collaborator trait.
//!
//! Delivery is fire-and-forget: a sink failure must never block or fail the
//! stock or activity operation that triggered the event. Callers log the
//! error and move on.

use async_trait::async_trait;

use crate::error::FibrestockError;
use crate::types::NotificationEvent;

/// Accepts event descriptions and fans them out to recipients.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, event: NotificationEvent) -> Result<(), FibrestockError>;
}

/// A sink that drops every event. Useful when no delivery channel is wired.
pub struct NullSink;

#[async_trait]
impl NotificationSink for NullSink {
    async fn notify(&self, _event: NotificationEvent) -> Result<(), FibrestockError> {
        Ok(())
    }
}
