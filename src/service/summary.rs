use std::collections::{BTreeMap, HashSet};

use chrono::Utc;
use tracing::{info, instrument, warn};

use crate::error::{AppError, AppResult};
use crate::model::EmpId;
use crate::model::lock::{LockKind, MonthlyLock};
use crate::model::settings::Settings;
use crate::model::summary::{ExportFormat, MonthlyRun, MonthlySummary};
use crate::payroll::calendar::MonthKey;
use crate::payroll::summary::{SummaryParams, summarize_month};
use crate::store::{Batch, Mutation, Store, StoreError};
use crate::utils::export;

/// A rendered export ready to send.
#[derive(Debug)]
pub struct ExportFile {
    pub content_type: &'static str,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// One summary row per faculty member, in roster order.
#[instrument(skip(store, settings))]
pub async fn monthly(
    store: &dyn Store,
    settings: &Settings,
    month: MonthKey,
    monthly_working_days: u32,
) -> AppResult<Vec<MonthlySummary>> {
    let roster = store.list_faculty().await?;
    let attendance = store.attendance_between(month.range()).await?;
    let holidays = store.list_holidays().await?;

    let params = SummaryParams {
        month,
        monthly_working_days,
        permission_limit: settings.permission_limit,
        holidays: &holidays,
    };
    Ok(summarize_month(&roster, &attendance, &params))
}

/// Applies payable-day overrides. Nothing is persisted.
pub fn adjust(rows: Vec<MonthlySummary>, overrides: &BTreeMap<EmpId, f64>) -> AppResult<Vec<MonthlySummary>> {
    let known: HashSet<EmpId> = rows.iter().map(|r| r.emp_id).collect();
    let errors: Vec<String> = overrides
        .iter()
        .filter_map(|(emp_id, days)| {
            if !known.contains(emp_id) {
                Some(format!("no summary row for employee {emp_id}"))
            } else if !days.is_finite() || *days < 0.0 {
                Some(format!("payableDays for employee {emp_id} must be a non-negative number"))
            } else {
                None
            }
        })
        .collect();
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    Ok(rows
        .into_iter()
        .map(|row| match overrides.get(&row.emp_id) {
            Some(days) => row.with_payable_days(*days),
            None => row,
        })
        .collect())
}

pub fn export(month: MonthKey, rows: &[MonthlySummary], format: ExportFormat) -> AppResult<ExportFile> {
    let file = match format {
        ExportFormat::Csv => ExportFile {
            content_type: "text/csv; charset=utf-8",
            file_name: format!("summary-{month}.csv"),
            bytes: export::summary_csv(rows)?,
        },
        ExportFormat::Xlsx => ExportFile {
            content_type: "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            file_name: format!("summary-{month}.xlsx"),
            bytes: export::summary_xlsx(&month.to_string(), rows)?,
        },
    };
    Ok(file)
}

/// Deducts each member's `casualLeavesUsed` from the stored balance, once per month.
#[instrument(skip(store, settings))]
pub async fn finalize(
    store: &dyn Store,
    settings: &Settings,
    month: MonthKey,
    monthly_working_days: u32,
) -> AppResult<MonthlyRun> {
    if let Some(lock) = store.get_lock(LockKind::Finalize, month).await? {
        info!(%month, "Month already finalized");
        return Ok(MonthlyRun::AlreadyCompleted { lock });
    }

    let rows = monthly(store, settings, month, monthly_working_days).await?;
    let mut batch: Batch = rows
        .iter()
        .filter(|r| r.casual_leaves_used > 0)
        .map(|r| Mutation::AdjustCasualLeaves {
            emp_id: r.emp_id,
            delta: -(r.casual_leaves_used as i32),
        })
        .collect();

    let lock = MonthlyLock {
        kind: LockKind::Finalize,
        month,
        completed: true,
        timestamp: Utc::now(),
        updated_count: batch.len() as u32,
    };
    batch.push(Mutation::AcquireLock(lock.clone()));

    match store.apply(batch).await {
        Ok(()) => {
            info!(%month, updated = lock.updated_count, "Month finalized");
            Ok(MonthlyRun::Completed { lock })
        }
        Err(StoreError::Conflict(_)) => {
            warn!(%month, "Finalize lost a race with another run");
            already_completed(store, LockKind::Finalize, month).await
        }
        Err(e) => Err(e.into()),
    }
}

/// Re-reads a lock after a conflicting acquire.
pub(crate) async fn already_completed(store: &dyn Store, kind: LockKind, month: MonthKey) -> AppResult<MonthlyRun> {
    let lock = store
        .get_lock(kind, month)
        .await?
        .ok_or_else(|| AppError::Conflict(format!("{kind} for {month} is in progress")))?;
    Ok(MonthlyRun::AlreadyCompleted { lock })
}
