//! Flows that read from the store, run the payroll computations and write
//! the result back as one batch. Handlers stay thin on top of these.

pub mod accounts;
pub mod allocation;
pub mod attendance;
pub mod faculty;
pub mod holiday;
pub mod leave;
pub mod lop;
pub mod summary;

use crate::payroll::normalizer::RejectedRow;

/// Warning shown next to a partially applied upload, naming what was skipped.
pub(crate) fn rejection_warning(rejected: &[RejectedRow]) -> Option<String> {
    if rejected.is_empty() {
        return None;
    }
    let details: Vec<String> = rejected
        .iter()
        .map(|r| match &r.emp_id {
            Some(emp_id) => format!("row {} ({emp_id}): {}", r.row, r.reason),
            None => format!("row {}: {}", r.row, r.reason),
        })
        .collect();
    Some(format!("Skipped {} row(s): {}", rejected.len(), details.join("; ")))
}

/// Every reason as a validation message, for uploads where nothing was usable.
pub(crate) fn rejection_messages(rejected: &[RejectedRow]) -> Vec<String> {
    rejected.iter().map(|r| format!("row {}: {}", r.row, r.reason)).collect()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::sync::Arc;

    use chrono::{NaiveDate, NaiveTime};

    use crate::model::EmpId;
    use crate::model::attendance::{AttendanceRecord, AttendanceStatus, midnight};
    use crate::model::faculty::Faculty;
    use crate::store::{Batch, MemoryStore, Mutation, Store};

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub fn faculty(emp_id: EmpId, salary: f64, casual_leaves: i32) -> Faculty {
        Faculty {
            emp_id,
            name: format!("Faculty {emp_id}"),
            dept: "Physics".into(),
            designation: "Lecturer".into(),
            salary,
            casual_leaves,
            username: None,
            registered: false,
        }
    }

    pub fn present(emp_id: EmpId, date: NaiveDate) -> AttendanceRecord {
        AttendanceRecord {
            emp_id,
            date,
            in_time: NaiveTime::from_hms_opt(8, 45, 0).unwrap(),
            status: AttendanceStatus::OnTime,
            leave_application_id: None,
        }
    }

    pub fn absent(emp_id: EmpId, date: NaiveDate) -> AttendanceRecord {
        AttendanceRecord {
            emp_id,
            date,
            in_time: midnight(),
            status: AttendanceStatus::Absent,
            leave_application_id: None,
        }
    }

    pub async fn store_with(faculty: Vec<Faculty>, attendance: Vec<AttendanceRecord>) -> Arc<dyn Store> {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let batch: Batch = faculty
            .into_iter()
            .map(Mutation::PutFaculty)
            .chain(attendance.into_iter().map(Mutation::PutAttendance))
            .collect();
        store.apply(batch).await.unwrap();
        store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warning_names_each_skipped_row() {
        let rejected = vec![RejectedRow {
            row: 2,
            emp_id: Some("999".into()),
            reason: "employee 999 does not exist".into(),
        }];
        let warning = rejection_warning(&rejected).unwrap();
        assert_eq!(warning, "Skipped 1 row(s): row 2 (999): employee 999 does not exist");
        assert!(rejection_warning(&[]).is_none());
    }
}
