use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::model::attendance::{AttendanceRecord, midnight};
use crate::model::leave_application::{LeaveApplication, LeaveFilter, LeaveStatus, LeaveSubmission};
use crate::payroll::calendar::DateRange;
use crate::store::{Batch, Mutation, Store};
use crate::utils::export;

fn required<T>(value: Option<T>, field: &str, errors: &mut Vec<String>) -> Option<T> {
    if value.is_none() {
        errors.push(format!("{field} is required"));
    }
    value
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Records the application and mirrors every day of its range into attendance,
/// all in one batch. Existing attendance on those days is overwritten.
#[instrument(skip(store, submission), fields(emp_id = ?submission.emp_id))]
pub async fn submit(store: &dyn Store, submission: LeaveSubmission) -> AppResult<LeaveApplication> {
    let mut errors = Vec::new();
    let emp_id = required(submission.emp_id, "empId", &mut errors);
    let start_date = required(submission.start_date, "startDate", &mut errors);
    let end_date = required(submission.end_date, "endDate", &mut errors);
    let reason = required(non_blank(submission.reason), "reason", &mut errors);
    let leave_type = required(non_blank(submission.leave_type), "leaveType", &mut errors);

    let (Some(emp_id), Some(start_date), Some(end_date), Some(reason), Some(leave_type)) =
        (emp_id, start_date, end_date, reason, leave_type)
    else {
        return Err(AppError::Validation(errors));
    };

    let range = DateRange::new(start_date, end_date).ok_or_else(|| {
        AppError::Validation(vec![format!("startDate {start_date} is after endDate {end_date}")])
    })?;

    let faculty = store
        .get_faculty(emp_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Faculty {emp_id} not found")))?;

    let leave = LeaveApplication {
        id: Uuid::new_v4().to_string(),
        emp_id,
        name: faculty.name,
        dept: faculty.dept,
        start_date,
        end_date,
        reason,
        leave_type,
        status: LeaveStatus::Pending,
        submission_timestamp: Utc::now(),
    };

    let mirrored = leave.mirrored_status();
    let mut batch = Batch::single(Mutation::PutLeave(leave.clone()));
    batch.extend(range.days().map(|date| {
        Mutation::PutAttendance(AttendanceRecord {
            emp_id,
            date,
            in_time: midnight(),
            status: mirrored,
            leave_application_id: Some(leave.id.clone()),
        })
    }));
    store.apply(batch).await?;

    info!(leave_id = %leave.id, days = range.len(), status = %mirrored, "Leave submitted");
    Ok(leave)
}

/// Removes the application and every attendance row in its stored range.
/// Approved applications stay.
#[instrument(skip(store))]
pub async fn delete(store: &dyn Store, id: &str) -> AppResult<()> {
    let leave = get(store, id).await?;
    if leave.status == LeaveStatus::Approved {
        return Err(AppError::Conflict("Approved leave applications cannot be deleted".into()));
    }

    let range = DateRange::new(leave.start_date, leave.end_date)
        .ok_or_else(|| AppError::Storage(format!("leave application {id} has an inverted date range")))?;

    let mut batch = Batch::single(Mutation::DeleteLeave(leave.id.clone()));
    batch.extend(range.days().map(|date| Mutation::DeleteAttendance {
        emp_id: leave.emp_id,
        date,
    }));
    store.apply(batch).await?;

    info!(leave_id = %id, emp_id = leave.emp_id, days = range.len(), "Leave deleted");
    Ok(())
}

async fn decide(store: &dyn Store, id: &str, to: LeaveStatus) -> AppResult<LeaveApplication> {
    let mut leave = get(store, id).await?;
    if leave.status != LeaveStatus::Pending {
        return Err(AppError::Conflict(format!(
            "Leave application is already {}",
            leave.status
        )));
    }

    store
        .apply(Batch::single(Mutation::TransitionLeave {
            id: leave.id.clone(),
            from: LeaveStatus::Pending,
            to,
        }))
        .await?;

    leave.status = to;
    info!(leave_id = %id, status = %to, "Leave decided");
    Ok(leave)
}

/// Pending to Approved. Mirrored attendance is left as it is.
pub async fn approve(store: &dyn Store, id: &str) -> AppResult<LeaveApplication> {
    decide(store, id, LeaveStatus::Approved).await
}

/// Pending to Rejected. Mirrored attendance is left as it is.
pub async fn reject(store: &dyn Store, id: &str) -> AppResult<LeaveApplication> {
    decide(store, id, LeaveStatus::Rejected).await
}

pub async fn list(store: &dyn Store, filter: &LeaveFilter) -> AppResult<Vec<LeaveApplication>> {
    Ok(store.list_leaves(filter).await?)
}

pub async fn get(store: &dyn Store, id: &str) -> AppResult<LeaveApplication> {
    store
        .get_leave(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Leave application {id} not found")))
}

pub async fn letter(store: &dyn Store, id: &str) -> AppResult<String> {
    let leave = get(store, id).await?;
    let designation = store.get_faculty(leave.emp_id).await?.map(|f| f.designation);
    Ok(export::leave_letter(&leave, designation.as_deref()))
}
