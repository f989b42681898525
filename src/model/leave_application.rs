use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::{IntoParams, ToSchema};

use super::EmpId;
use super::attendance::AttendanceStatus;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

/// Leave type that mirrors into attendance as On-Duty; every other type is Absent.
pub const ON_DUTY_LEAVE: &str = "On-Duty";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaveApplication {
    #[schema(example = "5f0c8a0e-8d4b-4c55-9a0c-2f1f8a8a3b11")]
    pub id: String,
    #[schema(example = 1)]
    pub emp_id: EmpId,
    /// Copied from the faculty record at submission time.
    pub name: String,
    pub dept: String,
    #[schema(example = "2024-03-10", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2024-03-12", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    pub reason: String,
    /// Free-form: Casual, Sick, On-Duty, Other...
    #[schema(example = "Casual")]
    pub leave_type: String,
    pub status: LeaveStatus,
    #[schema(example = "2024-03-01T10:00:00Z", format = "date-time", value_type = String)]
    pub submission_timestamp: DateTime<Utc>,
}

impl LeaveApplication {
    /// Status written into every attendance day the application covers.
    pub fn mirrored_status(&self) -> AttendanceStatus {
        mirrored_status(&self.leave_type)
    }
}

pub fn mirrored_status(leave_type: &str) -> AttendanceStatus {
    if leave_type.trim().eq_ignore_ascii_case(ON_DUTY_LEAVE) {
        AttendanceStatus::OnDuty
    } else {
        AttendanceStatus::Absent
    }
}

/// Submission payload. Every field is optional on the wire so that missing
/// fields come back as one validation error listing all of them.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaveSubmission {
    #[schema(example = 1)]
    pub emp_id: Option<EmpId>,
    #[schema(example = "2024-03-10", format = "date", value_type = Option<String>)]
    pub start_date: Option<NaiveDate>,
    #[schema(example = "2024-03-12", format = "date", value_type = Option<String>)]
    pub end_date: Option<NaiveDate>,
    #[schema(example = "Conference travel")]
    pub reason: Option<String>,
    #[schema(example = "On-Duty")]
    pub leave_type: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct LeaveFilter {
    /// Filter by employee ID
    pub emp_id: Option<EmpId>,
    /// Filter by status (Pending, Approved, Rejected)
    pub status: Option<LeaveStatus>,
}

impl LeaveFilter {
    pub fn matches(&self, leave: &LeaveApplication) -> bool {
        self.emp_id.is_none_or(|id| id == leave.emp_id)
            && self.status.is_none_or(|status| status == leave.status)
    }
}
