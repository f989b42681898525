use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use super::EmpId;
use crate::payroll::normalizer::RejectedRow;

/// Status of one attendance day.
///
/// The string forms are the ones stored and exchanged (`On-time`, `Late`,
/// `Absent`, `On-Duty`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
pub enum AttendanceStatus {
    #[serde(rename = "On-time")]
    #[strum(serialize = "On-time")]
    OnTime,
    #[serde(rename = "Late")]
    #[strum(serialize = "Late")]
    Late,
    #[serde(rename = "Absent")]
    #[strum(serialize = "Absent")]
    Absent,
    #[serde(rename = "On-Duty")]
    #[strum(serialize = "On-Duty")]
    OnDuty,
}

impl AttendanceStatus {
    /// On-time, Late and On-Duty all count as present for payroll.
    pub fn is_present(self) -> bool {
        !matches!(self, AttendanceStatus::Absent)
    }
}

/// One attendance row, keyed by `(emp_id, date)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    #[schema(example = 5)]
    pub emp_id: EmpId,
    #[schema(example = "2024-03-10", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "08:55:00", value_type = String)]
    pub in_time: NaiveTime,
    pub status: AttendanceStatus,
    /// Set when the row was written by a leave application.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leave_application_id: Option<String>,
}

impl AttendanceRecord {
    pub fn key(&self) -> (EmpId, NaiveDate) {
        (self.emp_id, self.date)
    }
}

/// `00:00:00`, the in-time recorded for absences and leave placeholders.
pub fn midnight() -> NaiveTime {
    NaiveTime::MIN
}

/// Manual marking payload; the status is taken as given.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkAttendance {
    pub status: AttendanceStatus,
    #[schema(example = "08:40:00", value_type = Option<String>)]
    pub in_time: Option<NaiveTime>,
}

/// Per-day dashboard figures.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyOverview {
    #[schema(example = "2024-03-10", format = "date", value_type = String)]
    pub date: NaiveDate,
    pub total_faculty: usize,
    pub on_time: usize,
    pub late: usize,
    pub absent: usize,
    pub on_duty: usize,
    pub not_marked: usize,
    pub records: Vec<AttendanceRecord>,
}

/// Result of an attendance sheet upload. Accepted rows are written, rejected
/// rows are reported and skipped.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceUpload {
    #[schema(example = "2024-03-10", format = "date", value_type = String)]
    pub date: NaiveDate,
    pub accepted: usize,
    pub rejected: Vec<RejectedRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// JSON alternative to a workbook upload: one object per sheet row.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRows {
    #[schema(example = "2024-03-10", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(value_type = Vec<Object>, example = json!([{"Emp.Id": 5, "In.Time": "08:45"}]))]
    pub rows: Vec<serde_json::Map<String, serde_json::Value>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn status_strings_match_stored_form() {
        assert_eq!(AttendanceStatus::OnTime.to_string(), "On-time");
        assert_eq!(AttendanceStatus::OnDuty.as_ref(), "On-Duty");
        assert_eq!(AttendanceStatus::from_str("Late").unwrap(), AttendanceStatus::Late);
        assert!(AttendanceStatus::from_str("late-ish").is_err());
    }

    #[test]
    fn record_serializes_camel_case() {
        let record = AttendanceRecord {
            emp_id: 5,
            date: NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
            in_time: midnight(),
            status: AttendanceStatus::OnDuty,
            leave_application_id: Some("abc".into()),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["empId"], 5);
        assert_eq!(json["inTime"], "00:00:00");
        assert_eq!(json["status"], "On-Duty");
        assert_eq!(json["leaveApplicationId"], "abc");
    }
}
