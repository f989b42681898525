use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use crate::payroll::calendar::MonthKey;

/// Which once-per-month batch job a lock guards.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumString,
    AsRefStr, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LockKind {
    /// Casual-leave credit for a month without absences.
    Allocation,
    /// Casual-leave deduction after the monthly summary review.
    Finalize,
}

/// Write-once record; once present for `(kind, month)` it is never removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyLock {
    pub kind: LockKind,
    #[schema(example = "2024-03", value_type = String)]
    pub month: MonthKey,
    pub completed: bool,
    #[schema(example = "2024-04-01T09:00:00Z", format = "date-time", value_type = String)]
    pub timestamp: DateTime<Utc>,
    pub updated_count: u32,
}
