pub mod accounts;
pub mod attendance;
pub mod faculty;
pub mod holiday;
pub mod leave;
pub mod payroll;
pub mod settings;

use chrono::NaiveDate;

use crate::error::{AppError, AppResult};
use crate::payroll::calendar::MonthKey;
use crate::payroll::normalizer::SheetRow;
use crate::utils::spreadsheet::{self, SpreadsheetError};

pub(crate) fn parse_month(raw: &str) -> AppResult<MonthKey> {
    raw.parse::<MonthKey>().map_err(|e| AppError::BadRequest(e.to_string()))
}

pub(crate) fn parse_date(raw: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest(format!("invalid date `{raw}`, expected YYYY-MM-DD")))
}

/// Uploaded workbook body to sheet rows.
pub(crate) fn read_workbook(body: &[u8]) -> AppResult<Vec<SheetRow>> {
    if body.is_empty() {
        return Err(AppError::BadRequest("request body is empty, expected a workbook".into()));
    }
    spreadsheet::read_rows(body).map_err(|e| match e {
        SpreadsheetError::Unreadable(_) => AppError::BadRequest(e.to_string()),
        SpreadsheetError::NoSheets | SpreadsheetError::Empty => AppError::Validation(vec![e.to_string()]),
    })
}
