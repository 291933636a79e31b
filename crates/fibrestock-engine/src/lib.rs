// SPDX-FileCopyrightText: 2026 Fibrestock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stock ledger and work order engine.
//!
//! [`StockEngine`] covers the material catalog and the movement ledger;
//! [`ActivityWorkflow`] covers the work order lifecycle and its coupling to
//! stock at completion time. Both take the acting principal on every call.

pub mod stock;
pub mod workflow;

pub use stock::StockEngine;
pub use workflow::ActivityWorkflow;
