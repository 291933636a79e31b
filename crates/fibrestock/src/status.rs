// SPDX-FileCopyrightText: 2026 Fibrestock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `fibrestock status` command implementation.
//!
//! Renders the dashboard report: headline counters, category breakdown,
//! and the latest ledger records.

use fibrestock_config::FibrestockConfig;
use fibrestock_core::FibrestockError;
use fibrestock_reports::Dashboard;
use fibrestock_storage::Database;

/// Run the `fibrestock status` command.
///
/// If `--json` is passed, outputs the structured report for scripting.
pub async fn run_status(config: &FibrestockConfig, json: bool) -> Result<(), FibrestockError> {
    let db = Database::open_with(&config.storage).await?;
    let dashboard = fibrestock_reports::dashboard(&db, &crate::operator()).await?;
    if json {
        let rendered = serde_json::to_string_pretty(&dashboard)
            .map_err(|e| FibrestockError::Internal(e.to_string()))?;
        println!("{rendered}");
    } else {
        print_dashboard(&dashboard);
    }
    Ok(())
}

fn print_dashboard(dashboard: &Dashboard) {
    println!(
        "Materials: {} active ({} out of stock, {} low)",
        dashboard.counts.total, dashboard.counts.out_of_stock, dashboard.counts.low_stock
    );
    if !dashboard.by_category.is_empty() {
        println!("By category:");
        for entry in &dashboard.by_category {
            println!("  {:<24} {}", entry.category, entry.count);
        }
    }
    if !dashboard.recent_movements.is_empty() {
        println!("Recent movements:");
        for movement in &dashboard.recent_movements {
            println!(
                "  {} {:<5} {:>6}  material {}  ({} -> {})",
                movement.created_at,
                movement.kind,
                movement.magnitude,
                movement.material_id,
                movement.quantity_before,
                movement.quantity_after
            );
        }
    }
}
