//! Monthly payroll arithmetic: presence, leave offsets and the prorated salary.

use std::collections::HashMap;

use crate::model::EmpId;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::faculty::Faculty;
use crate::model::holiday::Holiday;
use crate::model::summary::MonthlySummary;

use super::calendar::MonthKey;

/// Inputs shared by every row of one month's summary.
#[derive(Debug, Clone, Copy)]
pub struct SummaryParams<'a> {
    pub month: MonthKey,
    /// Working days before holidays are removed.
    pub monthly_working_days: u32,
    pub permission_limit: u32,
    pub holidays: &'a [Holiday],
}

impl SummaryParams<'_> {
    pub fn actual_working_days(&self) -> u32 {
        actual_working_days(self.monthly_working_days, self.holidays, self.month)
    }
}

/// Rounds half away from zero to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Working days minus the holidays falling in `month`, never below zero.
pub fn actual_working_days(monthly_working_days: u32, holidays: &[Holiday], month: MonthKey) -> u32 {
    let in_month = holidays.iter().filter(|h| month.contains(h.date)).count() as u32;
    monthly_working_days.saturating_sub(in_month)
}

/// `payable / actual * salary`, or zero when either salary or working days is zero.
pub fn prorated_salary(salary: f64, payable_days: f64, actual_working_days: u32) -> f64 {
    if salary > 0.0 && actual_working_days > 0 {
        round2(payable_days / f64::from(actual_working_days) * salary)
    } else {
        0.0
    }
}

/// Counts shared with the LOP finder: presence, absences and the casual-leave offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaveAccount {
    pub present_days: u32,
    pub absent_days: u32,
    pub casual_leaves_used: u32,
    pub unpaid_leave: u32,
}

impl LeaveAccount {
    pub fn settle(present_days: u32, working_days: u32, casual_leaves_available: u32) -> Self {
        let absent_days = working_days.saturating_sub(present_days);
        let casual_leaves_used = absent_days.min(casual_leaves_available);
        LeaveAccount {
            present_days,
            absent_days,
            casual_leaves_used,
            unpaid_leave: absent_days - casual_leaves_used,
        }
    }
}

pub fn present_days<'a>(records: impl IntoIterator<Item = &'a AttendanceRecord>) -> u32 {
    records.into_iter().filter(|r| r.status.is_present()).count() as u32
}

/// Balance usable this month; negative stored balances count as none.
pub fn available_casual_leaves(faculty: &Faculty) -> u32 {
    u32::try_from(faculty.casual_leaves).unwrap_or(0)
}

/// One employee's summary. `records` may hold other months; they are ignored.
pub fn summarize(faculty: &Faculty, records: &[&AttendanceRecord], params: &SummaryParams<'_>) -> MonthlySummary {
    let in_month: Vec<&AttendanceRecord> = records
        .iter()
        .copied()
        .filter(|r| r.emp_id == faculty.emp_id && params.month.contains(r.date))
        .collect();

    let actual_working_days = params.actual_working_days();
    let casual_leaves_available = available_casual_leaves(faculty);
    let account = LeaveAccount::settle(present_days(in_month.iter().copied()), actual_working_days, casual_leaves_available);

    let late_records = in_month.iter().filter(|r| r.status == AttendanceStatus::Late).count() as u32;
    let permissions = late_records.min(params.permission_limit);
    let half_day_leaves = late_records.saturating_sub(params.permission_limit);

    let total_leaves = f64::from(account.unpaid_leave) + 0.5 * f64::from(half_day_leaves);
    let payable_days = (f64::from(actual_working_days) - total_leaves).max(0.0);

    MonthlySummary {
        emp_id: faculty.emp_id,
        name: faculty.name.clone(),
        dept: faculty.dept.clone(),
        designation: faculty.designation.clone(),
        salary: faculty.salary,
        month: params.month,
        actual_working_days,
        present_days: account.present_days,
        absent_days: account.absent_days,
        late_records,
        permissions,
        half_day_leaves,
        casual_leaves_available,
        casual_leaves_used: account.casual_leaves_used,
        unpaid_leave: account.unpaid_leave,
        total_leaves,
        payable_days,
        calculated_salary: prorated_salary(faculty.salary, payable_days, actual_working_days),
    }
}

/// Summaries for the whole roster, in roster order.
pub fn summarize_month(
    roster: &[Faculty],
    attendance: &[AttendanceRecord],
    params: &SummaryParams<'_>,
) -> Vec<MonthlySummary> {
    let mut by_emp: HashMap<EmpId, Vec<&AttendanceRecord>> = HashMap::new();
    for record in attendance.iter().filter(|r| params.month.contains(r.date)) {
        by_emp.entry(record.emp_id).or_default().push(record);
    }

    roster
        .iter()
        .map(|faculty| {
            let records = by_emp.get(&faculty.emp_id).map(Vec::as_slice).unwrap_or_default();
            summarize(faculty, records, params)
        })
        .collect()
}

impl MonthlySummary {
    /// Replaces payable days and recomputes the salary; every other field stays.
    pub fn with_payable_days(mut self, payable_days: f64) -> Self {
        let payable_days = payable_days.max(0.0);
        self.payable_days = payable_days;
        self.calculated_salary = prorated_salary(self.salary, payable_days, self.actual_working_days);
        self
    }
}
