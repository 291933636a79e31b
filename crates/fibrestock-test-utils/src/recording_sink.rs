// SPDX-FileCopyrightText: 2026 Fibrestock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recording notification sink for deterministic testing.
//!
//! `RecordingSink` implements `NotificationSink`, capturing every event for
//! assertion in tests. It can also be switched into a failing mode to
//! verify that engines treat sink failures as non-fatal.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use fibrestock_core::{FibrestockError, NotificationEvent, NotificationSink};

/// A notification sink that records instead of delivering.
#[derive(Clone)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<NotificationEvent>>>,
    fail: Arc<Mutex<bool>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            fail: Arc::new(Mutex::new(false)),
        }
    }

    /// All events captured so far, in dispatch order.
    pub async fn events(&self) -> Vec<NotificationEvent> {
        self.events.lock().await.clone()
    }

    pub async fn event_count(&self) -> usize {
        self.events.lock().await.len()
    }

    pub async fn clear(&self) {
        self.events.lock().await.clear();
    }

    /// Make subsequent `notify` calls fail. Events are still recorded.
    pub async fn set_failing(&self, failing: bool) {
        *self.fail.lock().await = failing;
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn notify(&self, event: NotificationEvent) -> Result<(), FibrestockError> {
        self.events.lock().await.push(event);
        if *self.fail.lock().await {
            return Err(FibrestockError::Internal("sink failure injected".into()));
        }
        Ok(())
    }
}
