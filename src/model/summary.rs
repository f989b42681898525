use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};

use super::EmpId;
use super::lock::MonthlyLock;
use crate::payroll::calendar::MonthKey;

/// Derived per employee per month, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    pub emp_id: EmpId,
    pub name: String,
    pub dept: String,
    pub designation: String,
    pub salary: f64,
    #[schema(example = "2024-03", value_type = String)]
    pub month: MonthKey,
    /// Working days after holidays are taken out.
    pub actual_working_days: u32,
    pub present_days: u32,
    pub absent_days: u32,
    pub late_records: u32,
    pub permissions: u32,
    pub half_day_leaves: u32,
    pub casual_leaves_available: u32,
    pub casual_leaves_used: u32,
    pub unpaid_leave: u32,
    pub total_leaves: f64,
    pub payable_days: f64,
    pub calculated_salary: f64,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct WorkingDaysQuery {
    /// Working days in the month before holidays; falls back to the configured default.
    pub working_days: Option<u32>,
}

/// Payable-day overrides keyed by employee, as edited on the summary page.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SummaryAdjustment {
    pub working_days: Option<u32>,
    #[serde(default)]
    pub overrides: BTreeMap<EmpId, f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Xlsx,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SummaryExport {
    #[serde(default)]
    pub format: ExportFormat,
    pub working_days: Option<u32>,
    #[serde(default)]
    pub overrides: BTreeMap<EmpId, f64>,
}

impl SummaryExport {
    pub fn into_parts(self) -> (ExportFormat, SummaryAdjustment) {
        let adjustment = SummaryAdjustment {
            working_days: self.working_days,
            overrides: self.overrides,
        };
        (self.format, adjustment)
    }
}

/// One employee with unpaid leave and the absent dates that could be reversed.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LopCandidate {
    pub emp_id: EmpId,
    pub name: String,
    pub dept: String,
    pub present_days: u32,
    pub absent_days: u32,
    pub casual_leaves_used: u32,
    pub unpaid_leave: u32,
    #[schema(value_type = Vec<String>)]
    pub absent_dates: Vec<NaiveDate>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LopReversal {
    pub emp_id: EmpId,
    #[schema(example = "2024-03-14", format = "date", value_type = String)]
    pub date: NaiveDate,
}

/// Result of a guarded monthly batch (CL allocation, finalize).
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum MonthlyRun {
    Completed { lock: MonthlyLock },
    AlreadyCompleted { lock: MonthlyLock },
}

impl MonthlyRun {
    pub fn lock(&self) -> &MonthlyLock {
        match self {
            MonthlyRun::Completed { lock } | MonthlyRun::AlreadyCompleted { lock } => lock,
        }
    }
}
