// SPDX-FileCopyrightText: 2026 Fibrestock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Fibrestock integration tests.
//!
//! Provides a full-stack harness and a recording notification sink for
//! fast, deterministic, CI-runnable tests without external services.
//!
//! # Components
//!
//! - [`TestHarness`] - temp database plus engines and fixture principals
//! - [`RecordingSink`] - `NotificationSink` with event capture and failure injection

pub mod harness;
pub mod recording_sink;

pub use harness::TestHarness;
pub use recording_sink::RecordingSink;
