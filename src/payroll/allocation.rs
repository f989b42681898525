//! Monthly casual-leave credit eligibility.

use std::collections::HashSet;

use crate::model::EmpId;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::faculty::Faculty;

use super::calendar::MonthKey;

/// Faculty with no Absent record in `month`. Any absence disqualifies, whether
/// or not it was covered by leave.
pub fn eligible_for_credit(roster: &[Faculty], attendance: &[AttendanceRecord], month: MonthKey) -> Vec<EmpId> {
    let absent: HashSet<EmpId> = attendance
        .iter()
        .filter(|r| month.contains(r.date) && r.status == AttendanceStatus::Absent)
        .map(|r| r.emp_id)
        .collect();

    roster
        .iter()
        .map(|f| f.emp_id)
        .filter(|emp_id| !absent.contains(emp_id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendance::midnight;
    use chrono::NaiveDate;

    fn faculty(emp_id: EmpId) -> Faculty {
        Faculty {
            emp_id,
            name: String::new(),
            dept: String::new(),
            designation: String::new(),
            salary: 0.0,
            casual_leaves: 0,
            username: None,
            registered: false,
        }
    }

    fn row(emp_id: EmpId, month: u32, status: AttendanceStatus, leave: Option<&str>) -> AttendanceRecord {
        AttendanceRecord {
            emp_id,
            date: NaiveDate::from_ymd_opt(2024, month, 5).unwrap(),
            in_time: midnight(),
            status,
            leave_application_id: leave.map(str::to_string),
        }
    }

    #[test]
    fn a_single_absence_disqualifies_even_on_leave() {
        let roster = vec![faculty(1), faculty(2), faculty(3), faculty(4)];
        let attendance = vec![
            row(1, 3, AttendanceStatus::OnTime, None),
            row(2, 3, AttendanceStatus::Absent, Some("leave-1")),
            row(3, 3, AttendanceStatus::OnDuty, Some("leave-2")),
            // Absent, but in another month.
            row(4, 2, AttendanceStatus::Absent, None),
        ];

        let eligible = eligible_for_credit(&roster, &attendance, "2024-03".parse().unwrap());

        assert_eq!(eligible, vec![1, 3, 4]);
    }
}
