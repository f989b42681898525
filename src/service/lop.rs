use tracing::info;

use crate::error::{AppError, AppResult};
use crate::model::attendance::AttendanceRecord;
use crate::model::summary::{LopCandidate, LopReversal};
use crate::payroll::calendar::MonthKey;
use crate::payroll::lop::{find_candidates, reversal_record};
use crate::store::{Batch, Mutation, Store};

pub async fn candidates(store: &dyn Store, month: MonthKey, monthly_working_days: u32) -> AppResult<Vec<LopCandidate>> {
    let roster = store.list_faculty().await?;
    let attendance = store.attendance_between(month.range()).await?;
    Ok(find_candidates(&roster, &attendance, month, monthly_working_days))
}

/// Overwrites the day as an 08:00 on-time arrival. The date is not checked
/// against the candidate list.
pub async fn reverse(store: &dyn Store, reversal: LopReversal) -> AppResult<AttendanceRecord> {
    if store.get_faculty(reversal.emp_id).await?.is_none() {
        return Err(AppError::NotFound(format!("Faculty {} not found", reversal.emp_id)));
    }

    let record = reversal_record(reversal.emp_id, reversal.date);
    store.apply(Batch::single(Mutation::PutAttendance(record.clone()))).await?;
    info!(emp_id = reversal.emp_id, date = %reversal.date, "Loss of pay reversed");
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendance::AttendanceStatus;
    use crate::payroll::lop::reversal_in_time;
    use crate::service::fixtures::{absent, date, faculty, present, store_with};

    #[actix_web::test]
    async fn reversal_clears_the_candidate() {
        let march: MonthKey = "2024-03".parse().unwrap();
        let store = store_with(
            vec![faculty(1, 30000.0, 0), faculty(2, 30000.0, 5)],
            vec![
                present(1, date(2024, 3, 1)),
                absent(1, date(2024, 3, 4)),
                absent(1, date(2024, 3, 2)),
                present(2, date(2024, 3, 1)),
                absent(2, date(2024, 3, 2)),
            ],
        )
        .await;

        let found = candidates(store.as_ref(), march, 3).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].emp_id, 1);
        assert_eq!(found[0].absent_dates, vec![date(2024, 3, 2), date(2024, 3, 4)]);

        for day in [2, 4] {
            let record = reverse(
                store.as_ref(),
                LopReversal {
                    emp_id: 1,
                    date: date(2024, 3, day),
                },
            )
            .await
            .unwrap();
            assert_eq!(record.status, AttendanceStatus::OnTime);
            assert_eq!(record.in_time, reversal_in_time());
        }

        assert!(candidates(store.as_ref(), march, 3).await.unwrap().is_empty());
    }
}
