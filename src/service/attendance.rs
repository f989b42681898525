use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::{info, instrument, warn};

use crate::error::{AppError, AppResult};
use crate::model::EmpId;
use crate::model::attendance::{
    AttendanceRecord, AttendanceStatus, AttendanceUpload, DailyOverview, MarkAttendance, midnight,
};
use crate::model::settings::Settings;
use crate::payroll::calendar::DateRange;
use crate::payroll::normalizer::{SheetRow, normalize_attendance};
use crate::store::{Batch, Mutation, Store};

use super::{rejection_messages, rejection_warning};

/// Normalizes a day's sheet and writes the valid rows, overwriting whatever
/// was stored for those employees on `date`.
///
/// Fails without writing when the sheet is empty or no row is usable; otherwise
/// the skipped rows come back as a warning next to the applied ones.
#[instrument(skip(store, settings, rows), fields(rows = rows.len()))]
pub async fn upload(
    store: &dyn Store,
    settings: &Settings,
    date: NaiveDate,
    rows: &[SheetRow],
) -> AppResult<AttendanceUpload> {
    if rows.is_empty() {
        return Err(AppError::Validation(vec!["spreadsheet has no data rows".into()]));
    }

    let known: HashSet<EmpId> = store.list_faculty().await?.into_iter().map(|f| f.emp_id).collect();
    let normalized = normalize_attendance(rows, date, settings.on_time_threshold, &known);

    if normalized.accepted.is_empty() {
        warn!(%date, rejected = normalized.rejected.len(), "No usable attendance rows");
        return Err(AppError::Validation(rejection_messages(&normalized.rejected)));
    }

    let accepted = normalized.accepted.len();
    let batch: Batch = normalized.accepted.into_iter().map(Mutation::PutAttendance).collect();
    store.apply(batch).await?;

    let warning = rejection_warning(&normalized.rejected);
    if let Some(warning) = &warning {
        warn!(%date, accepted, warning = %warning, "Attendance upload partially applied");
    }
    info!(%date, accepted, "Attendance uploaded");

    Ok(AttendanceUpload {
        date,
        accepted,
        rejected: normalized.rejected,
        warning,
    })
}

/// Sets a day's status directly. The status is taken as given, not derived.
pub async fn mark(
    store: &dyn Store,
    emp_id: EmpId,
    date: NaiveDate,
    payload: MarkAttendance,
) -> AppResult<AttendanceRecord> {
    if store.get_faculty(emp_id).await?.is_none() {
        return Err(AppError::NotFound(format!("Faculty {emp_id} not found")));
    }

    let in_time = match (payload.status, payload.in_time) {
        (AttendanceStatus::Absent | AttendanceStatus::OnDuty, in_time) => in_time.unwrap_or_else(midnight),
        (_, Some(in_time)) if in_time != midnight() => in_time,
        (status, _) => {
            return Err(AppError::Validation(vec![format!(
                "inTime is required when marking {status}"
            )]));
        }
    };

    let record = AttendanceRecord {
        emp_id,
        date,
        in_time,
        status: payload.status,
        leave_application_id: None,
    };
    store.apply(Batch::single(Mutation::PutAttendance(record.clone()))).await?;
    info!(emp_id, %date, status = %record.status, "Attendance marked");
    Ok(record)
}

pub async fn daily_overview(store: &dyn Store, date: NaiveDate) -> AppResult<DailyOverview> {
    let roster = store.list_faculty().await?;
    let day = DateRange::new(date, date).ok_or_else(|| AppError::BadRequest("invalid date".into()))?;
    let records = store.attendance_between(day).await?;

    let count = |status: AttendanceStatus| records.iter().filter(|r| r.status == status).count();
    let (on_time, late, absent, on_duty) = (
        count(AttendanceStatus::OnTime),
        count(AttendanceStatus::Late),
        count(AttendanceStatus::Absent),
        count(AttendanceStatus::OnDuty),
    );
    let marked: HashSet<EmpId> = records.iter().map(|r| r.emp_id).collect();

    Ok(DailyOverview {
        date,
        total_faculty: roster.len(),
        on_time,
        late,
        absent,
        on_duty,
        not_marked: roster.iter().filter(|f| !marked.contains(&f.emp_id)).count(),
        records,
    })
}
