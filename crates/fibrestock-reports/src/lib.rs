// SPDX-FileCopyrightText: 2026 Fibrestock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only report builders over the storage aggregation queries.
//!
//! Reports never mutate anything; they compose the aggregate queries and
//! apply the same visibility rules as the engines.

use chrono::NaiveDate;
use fibrestock_core::{require_role, FibrestockError, MaterialScope, MovementRecord, Principal, Role};
use fibrestock_storage::queries::reporting::{
    self, CategoryCount, MaterialConsumption, MovementTotals, StockCounts, WorkerTotals,
};
use fibrestock_storage::queries::stock;
use fibrestock_storage::Database;
use serde::{Deserialize, Serialize};

/// At-a-glance stock overview, scoped to the caller's visibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
    pub counts: StockCounts,
    pub by_category: Vec<CategoryCount>,
    /// Latest ledger records, newest first. Empty for workers, whose
    /// material visibility does not extend to the shared ledger.
    pub recent_movements: Vec<MovementRecord>,
}

/// Ledger and work order totals for one calendar month.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub year: i32,
    pub month: u32,
    pub totals: MovementTotals,
    pub top_consumed: Vec<MaterialConsumption>,
    pub activities_created: i64,
    pub activities_concluded: i64,
    pub worker_totals: Vec<WorkerTotals>,
}

const RECENT_MOVEMENT_LIMIT: i64 = 10;
const TOP_CONSUMED_LIMIT: i64 = 5;

/// Build the dashboard for the calling principal.
pub async fn dashboard(db: &Database, principal: &Principal) -> Result<Dashboard, FibrestockError> {
    let scope = MaterialScope::for_principal(principal);
    let counts = reporting::stock_counts(db, scope).await?;
    let by_category = reporting::category_counts(db, scope).await?;
    let recent_movements = if principal.role.satisfies(Role::Supervisor) {
        stock::recent(db, RECENT_MOVEMENT_LIMIT).await?
    } else {
        Vec::new()
    };
    Ok(Dashboard {
        counts,
        by_category,
        recent_movements,
    })
}

/// Build the summary for one calendar month. Administrators only.
pub async fn monthly_summary(
    db: &Database,
    principal: &Principal,
    year: i32,
    month: u32,
) -> Result<MonthlySummary, FibrestockError> {
    require_role(principal, Role::Administrator)?;
    let (since, until) = month_bounds(year, month)?;
    let totals = reporting::movement_totals_between(db, since.clone(), until.clone()).await?;
    let top_consumed =
        reporting::top_consumed_between(db, since.clone(), until.clone(), TOP_CONSUMED_LIMIT)
            .await?;
    let activities_created =
        reporting::activities_created_between(db, since.clone(), until.clone()).await?;
    let activities_concluded =
        reporting::activities_concluded_between(db, since.clone(), until.clone()).await?;
    let worker_totals = reporting::worker_totals_between(db, since, until).await?;
    Ok(MonthlySummary {
        year,
        month,
        totals,
        top_consumed,
        activities_created,
        activities_concluded,
        worker_totals,
    })
}

/// Half-open `[first of month, first of next month)` as ISO date strings.
/// Stored timestamps extend these with a `T...` suffix, which compares
/// greater, so plain string comparison gives the right window.
fn month_bounds(year: i32, month: u32) -> Result<(String, String), FibrestockError> {
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
        FibrestockError::Validation(format!("invalid month {year}-{month:02}"))
    })?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| FibrestockError::Validation(format!("invalid month {year}-{month:02}")))?;
    Ok((
        first.format("%Y-%m-%d").to_string(),
        next.format("%Y-%m-%d").to_string(),
    ))
}
