use chrono::Utc;
use tracing::{info, instrument, warn};

use crate::error::AppResult;
use crate::model::lock::{LockKind, MonthlyLock};
use crate::model::summary::MonthlyRun;
use crate::payroll::allocation::eligible_for_credit;
use crate::payroll::calendar::MonthKey;
use crate::store::{Batch, Mutation, Store, StoreError};

use super::summary::already_completed;

/// Grants one casual leave to every member with no absence in `month`, then
/// locks the month. A second run reports the existing lock and changes nothing.
#[instrument(skip(store))]
pub async fn allocate(store: &dyn Store, month: MonthKey) -> AppResult<MonthlyRun> {
    if let Some(lock) = store.get_lock(LockKind::Allocation, month).await? {
        info!(%month, "Allocation already completed");
        return Ok(MonthlyRun::AlreadyCompleted { lock });
    }

    let roster = store.list_faculty().await?;
    let attendance = store.attendance_between(month.range()).await?;
    let eligible = eligible_for_credit(&roster, &attendance, month);

    let lock = MonthlyLock {
        kind: LockKind::Allocation,
        month,
        completed: true,
        timestamp: Utc::now(),
        updated_count: eligible.len() as u32,
    };

    let mut batch: Batch = eligible
        .into_iter()
        .map(|emp_id| Mutation::AdjustCasualLeaves { emp_id, delta: 1 })
        .collect();
    batch.push(Mutation::AcquireLock(lock.clone()));

    match store.apply(batch).await {
        Ok(()) => {
            info!(%month, updated = lock.updated_count, "Casual leaves allocated");
            Ok(MonthlyRun::Completed { lock })
        }
        Err(StoreError::Conflict(_)) => {
            warn!(%month, "Allocation lost a race with another run");
            already_completed(store, LockKind::Allocation, month).await
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn status(store: &dyn Store, month: MonthKey) -> AppResult<Option<MonthlyLock>> {
    Ok(store.get_lock(LockKind::Allocation, month).await?)
}
