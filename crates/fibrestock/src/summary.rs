// SPDX-FileCopyrightText: 2026 Fibrestock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `fibrestock summary` command implementation.

use chrono::{Datelike, Utc};
use fibrestock_config::FibrestockConfig;
use fibrestock_core::FibrestockError;
use fibrestock_reports::MonthlySummary;
use fibrestock_storage::Database;

/// Run the `fibrestock summary` command. Year and month default to the
/// current calendar month.
pub async fn run_summary(
    config: &FibrestockConfig,
    year: Option<i32>,
    month: Option<u32>,
    json: bool,
) -> Result<(), FibrestockError> {
    let now = Utc::now();
    let year = year.unwrap_or_else(|| now.year());
    let month = month.unwrap_or_else(|| now.month());

    let db = Database::open_with(&config.storage).await?;
    let summary = fibrestock_reports::monthly_summary(&db, &crate::operator(), year, month).await?;
    if json {
        let rendered = serde_json::to_string_pretty(&summary)
            .map_err(|e| FibrestockError::Internal(e.to_string()))?;
        println!("{rendered}");
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn print_summary(summary: &MonthlySummary) {
    println!("Summary for {}-{:02}", summary.year, summary.month);
    println!(
        "  Entries: {} movements, {} units",
        summary.totals.entries, summary.totals.entry_units
    );
    println!(
        "  Exits:   {} movements, {} units",
        summary.totals.exits, summary.totals.exit_units
    );
    println!(
        "  Activities: {} created, {} concluded",
        summary.activities_created, summary.activities_concluded
    );
    if !summary.worker_totals.is_empty() {
        println!("  Per worker:");
        for entry in &summary.worker_totals {
            println!(
                "    {:<24} {} concluded, {} units",
                entry.worker_name, entry.activities_concluded, entry.units_consumed
            );
        }
    }
    if !summary.top_consumed.is_empty() {
        println!("  Top consumed:");
        for entry in &summary.top_consumed {
            println!("    {:<24} {} units", entry.name, entry.units);
        }
    }
}
