use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A declared holiday. The date doubles as its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Holiday {
    #[schema(example = "2024-03-25", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "Holi")]
    pub description: String,
}

impl Holiday {
    pub fn id(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}
