//! Loss-of-pay finder: who has unpaid leave this month, and on which absent days.
//!
//! Uses the plain working-day figure (no holiday adjustment) and ignores late
//! arrivals, so its unpaid counts can differ from the monthly summary.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveTime};

use crate::model::EmpId;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::faculty::Faculty;
use crate::model::summary::LopCandidate;

use super::calendar::MonthKey;
use super::summary::{LeaveAccount, available_casual_leaves, present_days};

/// In-time written when an absence is reversed.
pub fn reversal_in_time() -> NaiveTime {
    NaiveTime::from_hms_opt(8, 0, 0).unwrap_or(NaiveTime::MIN)
}

pub fn find_candidates(
    roster: &[Faculty],
    attendance: &[AttendanceRecord],
    month: MonthKey,
    monthly_working_days: u32,
) -> Vec<LopCandidate> {
    let mut by_emp: HashMap<EmpId, Vec<&AttendanceRecord>> = HashMap::new();
    for record in attendance.iter().filter(|r| month.contains(r.date)) {
        by_emp.entry(record.emp_id).or_default().push(record);
    }

    roster
        .iter()
        .filter_map(|faculty| {
            let records = by_emp.get(&faculty.emp_id).map(Vec::as_slice).unwrap_or_default();
            let account = LeaveAccount::settle(
                present_days(records.iter().copied()),
                monthly_working_days,
                available_casual_leaves(faculty),
            );
            if account.unpaid_leave == 0 {
                return None;
            }

            let mut absent_dates: Vec<NaiveDate> = records
                .iter()
                .filter(|r| r.status == AttendanceStatus::Absent)
                .map(|r| r.date)
                .collect();
            absent_dates.sort_unstable();

            Some(LopCandidate {
                emp_id: faculty.emp_id,
                name: faculty.name.clone(),
                dept: faculty.dept.clone(),
                present_days: account.present_days,
                absent_days: account.absent_days,
                casual_leaves_used: account.casual_leaves_used,
                unpaid_leave: account.unpaid_leave,
                absent_dates,
            })
        })
        .collect()
}

/// The record that overwrites `(emp_id, date)` on reversal.
pub fn reversal_record(emp_id: EmpId, date: NaiveDate) -> AttendanceRecord {
    AttendanceRecord {
        emp_id,
        date,
        in_time: reversal_in_time(),
        status: AttendanceStatus::OnTime,
        leave_application_id: None,
    }
}
