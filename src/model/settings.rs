use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Process-wide settings. Loaded once, passed explicitly into every computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Arrivals at or before this time are On-time.
    #[schema(example = "09:00:00", value_type = String)]
    pub on_time_threshold: NaiveTime,
    /// Late arrivals tolerated per month before each further one costs half a day.
    #[schema(example = 3)]
    pub permission_limit: u32,
    pub account_creation_enabled: bool,
    pub user_account_request_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            on_time_threshold: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN),
            permission_limit: 3,
            account_creation_enabled: true,
            user_account_request_enabled: true,
        }
    }
}
