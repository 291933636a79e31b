// SPDX-FileCopyrightText: 2026 Fibrestock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator trait definitions.

pub mod notify;

pub use notify::{NotificationSink, NullSink};
