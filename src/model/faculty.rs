use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::EmpId;
use super::attendance::AttendanceRecord;
use super::summary::MonthlySummary;
use crate::payroll::normalizer::RejectedRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(
    example = json!({
        "empId": 1,
        "name": "Asha Raman",
        "dept": "Physics",
        "designation": "Assistant Professor",
        "salary": 30000.0,
        "casualLeaves": 2,
        "username": null,
        "registered": false
    })
)]
pub struct Faculty {
    #[schema(example = 1)]
    pub emp_id: EmpId,
    pub name: String,
    pub dept: String,
    pub designation: String,
    /// Monthly salary.
    #[schema(example = 30000.0)]
    pub salary: f64,
    /// Casual-leave balance in days.
    #[schema(example = 2)]
    pub casual_leaves: i32,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub registered: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateFaculty {
    #[schema(example = 1)]
    pub emp_id: EmpId,
    pub name: String,
    #[serde(default)]
    pub dept: String,
    #[serde(default)]
    pub designation: String,
    #[schema(example = 30000.0)]
    pub salary: f64,
    #[serde(default)]
    pub casual_leaves: i32,
}

impl From<CreateFaculty> for Faculty {
    fn from(payload: CreateFaculty) -> Self {
        Faculty {
            emp_id: payload.emp_id,
            name: payload.name,
            dept: payload.dept,
            designation: payload.designation,
            salary: payload.salary,
            casual_leaves: payload.casual_leaves,
            username: None,
            registered: false,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFaculty {
    pub name: Option<String>,
    pub dept: Option<String>,
    pub designation: Option<String>,
    pub salary: Option<f64>,
    pub casual_leaves: Option<i32>,
}

impl UpdateFaculty {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.dept.is_none()
            && self.designation.is_none()
            && self.salary.is_none()
            && self.casual_leaves.is_none()
    }

    pub fn apply_to(self, faculty: &mut Faculty) {
        if let Some(name) = self.name {
            faculty.name = name;
        }
        if let Some(dept) = self.dept {
            faculty.dept = dept;
        }
        if let Some(designation) = self.designation {
            faculty.designation = designation;
        }
        if let Some(salary) = self.salary {
            faculty.salary = salary;
        }
        if let Some(casual_leaves) = self.casual_leaves {
            faculty.casual_leaves = casual_leaves;
        }
    }
}

/// Result of a roster upload.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FacultyUpload {
    pub accepted: usize,
    pub rejected: Vec<RejectedRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// One employee's month: record, attendance rows by date, and the summary.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeDetail {
    pub faculty: Faculty,
    pub attendance: Vec<AttendanceRecord>,
    pub summary: MonthlySummary,
}
