//! Turns loosely-typed spreadsheet rows into attendance and faculty records.
//!
//! Column names are matched after lower-casing and removing whitespace, so
//! `Emp.Id`, `EMP ID` and `empid` all land on the same field.

use std::collections::{BTreeMap, HashSet};

use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::Serialize;
use utoipa::ToSchema;

use crate::model::EmpId;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus, midnight};
use crate::model::faculty::Faculty;

/// One cell as read from a sheet or a JSON row.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Empty,
}

impl CellValue {
    fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(text) => text.trim().is_empty(),
            CellValue::Number(_) => false,
        }
    }

    fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Number(n) if n.fract() == 0.0 => Some(format!("{}", *n as i64)),
            CellValue::Number(n) => Some(n.to_string()),
            CellValue::Text(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
            _ => None,
        }
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(text) => text.trim().parse().ok(),
            CellValue::Empty => None,
        }
    }
}

impl From<&serde_json::Value> for CellValue {
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Number(n) => n.as_f64().map_or(CellValue::Empty, CellValue::Number),
            serde_json::Value::String(s) => CellValue::Text(s.clone()),
            serde_json::Value::Bool(b) => CellValue::Text(b.to_string()),
            _ => CellValue::Empty,
        }
    }
}

/// A data row with its 1-based position in the source (header excluded).
#[derive(Debug, Clone, Default)]
pub struct SheetRow {
    pub index: usize,
    pub cells: BTreeMap<String, CellValue>,
}

impl SheetRow {
    pub fn from_json(index: usize, row: &serde_json::Map<String, serde_json::Value>) -> Self {
        SheetRow {
            index,
            cells: row.iter().map(|(k, v)| (k.clone(), CellValue::from(v))).collect(),
        }
    }
}

/// Canonical fields and the column spellings accepted for each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    EmpId,
    InTime,
    Name,
    Dept,
    Designation,
    Salary,
    CasualLeaves,
}

impl Field {
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Field::EmpId => &["emp.id", "empid", "emp_id", "employeeid"],
            Field::InTime => &["in.time", "intime", "in_time"],
            Field::Name => &["name"],
            Field::Dept => &["dept", "department"],
            Field::Designation => &["designation"],
            Field::Salary => &["salary"],
            Field::CasualLeaves => &["casualleaves", "casual_leaves", "cl"],
        }
    }
}

/// Lower-cases and strips all whitespace from a column name.
pub fn canonical_key(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

struct ResolvedRow<'a> {
    cells: BTreeMap<String, &'a CellValue>,
}

impl<'a> ResolvedRow<'a> {
    fn new(row: &'a SheetRow) -> Self {
        ResolvedRow {
            cells: row.cells.iter().map(|(k, v)| (canonical_key(k), v)).collect(),
        }
    }

    fn get(&self, field: Field) -> Option<&'a CellValue> {
        field
            .aliases()
            .iter()
            .find_map(|alias| self.cells.get(*alias).copied())
            .filter(|cell| !cell.is_blank())
    }
}

/// A row that could not be turned into a record.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RejectedRow {
    pub row: usize,
    /// Raw employee id as it appeared, when there was one.
    pub emp_id: Option<String>,
    pub reason: String,
}

impl RejectedRow {
    fn new(row: usize, emp_id: Option<String>, reason: impl Into<String>) -> Self {
        RejectedRow {
            row,
            emp_id,
            reason: reason.into(),
        }
    }
}

#[derive(Debug)]
pub struct Normalized<T> {
    pub accepted: Vec<T>,
    pub rejected: Vec<RejectedRow>,
}

impl<T> Default for Normalized<T> {
    fn default() -> Self {
        Normalized {
            accepted: Vec::new(),
            rejected: Vec::new(),
        }
    }
}

/// One roster line. Optional fields are `None` when the cell was blank or the
/// column was missing.
#[derive(Debug, Clone, PartialEq)]
pub struct RosterRow {
    pub emp_id: EmpId,
    pub name: String,
    pub dept: Option<String>,
    pub designation: Option<String>,
    pub salary: Option<f64>,
    pub casual_leaves: Option<i32>,
}

impl RosterRow {
    /// Merges onto the stored record: blank cells keep what is stored, and a new
    /// employee starts from zero salary and balance.
    pub fn into_faculty(self, current: Option<&Faculty>) -> Faculty {
        match current {
            Some(current) => Faculty {
                emp_id: self.emp_id,
                name: self.name,
                dept: self.dept.unwrap_or_else(|| current.dept.clone()),
                designation: self.designation.unwrap_or_else(|| current.designation.clone()),
                salary: self.salary.unwrap_or(current.salary),
                casual_leaves: self.casual_leaves.unwrap_or(current.casual_leaves),
                username: current.username.clone(),
                registered: current.registered,
            },
            None => Faculty {
                emp_id: self.emp_id,
                name: self.name,
                dept: self.dept.unwrap_or_default(),
                designation: self.designation.unwrap_or_default(),
                salary: self.salary.unwrap_or_default(),
                casual_leaves: self.casual_leaves.unwrap_or_default(),
                username: None,
                registered: false,
            },
        }
    }
}

fn parse_emp_id(cell: &CellValue) -> Option<EmpId> {
    match cell {
        CellValue::Number(n) if *n >= 0.0 && n.fract() == 0.0 => Some(*n as EmpId),
        CellValue::Text(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// Spreadsheet day-fraction to a time of day; only the fractional part counts.
fn time_from_day_fraction(value: f64) -> Option<NaiveTime> {
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    let seconds = ((value.fract() * 86_400.0).round() as u32).min(86_399);
    NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0)
}

/// Reads an in-time cell. Missing means `00:00:00`; anything present that is
/// not a day fraction, `H:MM`, `H:MM:SS` or `H:MM AM` is an error.
pub fn parse_in_time(cell: Option<&CellValue>) -> Result<NaiveTime, String> {
    let Some(cell) = cell else {
        return Ok(midnight());
    };
    match cell {
        CellValue::Empty => Ok(midnight()),
        CellValue::Number(n) => {
            time_from_day_fraction(*n).ok_or_else(|| format!("in-time `{n}` is not a time of day"))
        }
        CellValue::Text(text) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(midnight());
            }
            ["%H:%M:%S", "%H:%M", "%I:%M %p", "%I:%M:%S %p"]
                .iter()
                .find_map(|format| NaiveTime::parse_from_str(text, format).ok())
                .map(|t| t.with_nanosecond(0).unwrap_or(t))
                .ok_or_else(|| format!("in-time `{text}` is not a time of day"))
        }
    }
}

/// `00:00:00` is an absence; otherwise on-time up to and including the threshold.
pub fn derive_status(in_time: NaiveTime, threshold: NaiveTime) -> AttendanceStatus {
    if in_time == midnight() {
        AttendanceStatus::Absent
    } else if in_time <= threshold {
        AttendanceStatus::OnTime
    } else {
        AttendanceStatus::Late
    }
}

/// Normalizes an attendance sheet for `date`.
///
/// Rows whose employee is not in `known` are rejected, as are rows without a
/// usable id or in-time. Accepted rows are deduplicated by employee, the last
/// row winning, matching how the writes would land.
pub fn normalize_attendance(
    rows: &[SheetRow],
    date: NaiveDate,
    threshold: NaiveTime,
    known: &HashSet<EmpId>,
) -> Normalized<AttendanceRecord> {
    let mut out = Normalized::default();
    let mut by_emp: BTreeMap<EmpId, usize> = BTreeMap::new();

    for row in rows {
        let resolved = ResolvedRow::new(row);
        let raw_id = resolved.get(Field::EmpId).and_then(CellValue::as_text);

        let Some(emp_id) = resolved.get(Field::EmpId).and_then(parse_emp_id) else {
            let reason = match &raw_id {
                Some(raw) => format!("employee id `{raw}` is not a number"),
                None => "missing employee id".to_string(),
            };
            out.rejected.push(RejectedRow::new(row.index, raw_id, reason));
            continue;
        };

        if !known.contains(&emp_id) {
            out.rejected.push(RejectedRow::new(
                row.index,
                Some(emp_id.to_string()),
                format!("employee {emp_id} does not exist"),
            ));
            continue;
        }

        let in_time = match parse_in_time(resolved.get(Field::InTime)) {
            Ok(t) => t,
            Err(reason) => {
                out.rejected.push(RejectedRow::new(row.index, Some(emp_id.to_string()), reason));
                continue;
            }
        };

        let record = AttendanceRecord {
            emp_id,
            date,
            in_time,
            status: derive_status(in_time, threshold),
            leave_application_id: None,
        };

        match by_emp.get(&emp_id) {
            Some(&slot) => out.accepted[slot] = record,
            None => {
                by_emp.insert(emp_id, out.accepted.len());
                out.accepted.push(record);
            }
        }
    }

    out
}

/// Normalizes a faculty roster sheet. `empid` and `name` are required; salary and
/// casual leaves may be blank but must be numeric when present.
pub fn normalize_faculty(rows: &[SheetRow]) -> Normalized<RosterRow> {
    let mut out = Normalized::default();

    for row in rows {
        let resolved = ResolvedRow::new(row);
        let raw_id = resolved.get(Field::EmpId).and_then(CellValue::as_text);

        let Some(emp_id) = resolved.get(Field::EmpId).and_then(parse_emp_id) else {
            out.rejected.push(RejectedRow::new(row.index, raw_id, "missing or non-numeric employee id"));
            continue;
        };
        let reject = |reason: &str| RejectedRow::new(row.index, Some(emp_id.to_string()), reason);

        let Some(name) = resolved.get(Field::Name).and_then(CellValue::as_text) else {
            out.rejected.push(reject("missing name"));
            continue;
        };

        let salary = match resolved.get(Field::Salary) {
            None => None,
            Some(cell) => match cell.as_number() {
                Some(s) if s >= 0.0 => Some(s),
                _ => {
                    out.rejected.push(reject("salary is not a non-negative number"));
                    continue;
                }
            },
        };

        let casual_leaves = match resolved.get(Field::CasualLeaves) {
            None => None,
            Some(cell) => match cell.as_number() {
                Some(cl) if cl >= 0.0 && cl.fract() == 0.0 => Some(cl as i32),
                _ => {
                    out.rejected.push(reject("casual leaves is not a whole number"));
                    continue;
                }
            },
        };

        out.accepted.push(RosterRow {
            emp_id,
            name,
            dept: resolved.get(Field::Dept).and_then(CellValue::as_text),
            designation: resolved.get(Field::Designation).and_then(CellValue::as_text),
            salary,
            casual_leaves,
        });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(index: usize, cells: &[(&str, CellValue)]) -> SheetRow {
        SheetRow {
            index,
            cells: cells.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
        }
    }

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn t(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    #[test]
    fn column_names_are_case_and_space_insensitive() {
        assert_eq!(canonical_key(" Emp.Id "), "emp.id");
        assert_eq!(canonical_key("IN TIME"), "intime");
        assert_eq!(canonical_key("In.Time"), "in.time");
    }

    #[test]
    fn day_fractions_become_clock_times() {
        assert_eq!(parse_in_time(Some(&CellValue::Number(0.375))).unwrap(), t(9, 0, 0));
        assert_eq!(parse_in_time(Some(&CellValue::Number(0.5))).unwrap(), t(12, 0, 0));
        // Date serial with a time part: only the fraction matters.
        assert_eq!(parse_in_time(Some(&CellValue::Number(45361.25))).unwrap(), t(6, 0, 0));
    }

    #[test]
    fn short_times_get_seconds_appended() {
        assert_eq!(parse_in_time(Some(&text("8:45"))).unwrap(), t(8, 45, 0));
        assert_eq!(parse_in_time(Some(&text("09:05:30"))).unwrap(), t(9, 5, 30));
        assert_eq!(parse_in_time(Some(&text("9:10 AM"))).unwrap(), t(9, 10, 0));
    }

    #[test]
    fn missing_in_time_is_midnight() {
        assert_eq!(parse_in_time(None).unwrap(), midnight());
        assert_eq!(parse_in_time(Some(&CellValue::Empty)).unwrap(), midnight());
        assert_eq!(parse_in_time(Some(&text("  "))).unwrap(), midnight());
    }

    #[test]
    fn arrivals_just_before_midnight_stay_present() {
        let late = parse_in_time(Some(&CellValue::Number(0.9999999))).unwrap();
        assert_eq!(late, t(23, 59, 59));
        assert_eq!(derive_status(late, t(9, 0, 0)), AttendanceStatus::Late);
        assert_eq!(parse_in_time(Some(&CellValue::Number(30_600.0 / 86_400.0))).unwrap(), t(8, 30, 0));
    }

    #[test]
    fn garbage_in_time_is_an_error() {
        assert!(parse_in_time(Some(&text("soon"))).is_err());
        assert!(parse_in_time(Some(&CellValue::Number(-1.0))).is_err());
    }

    #[test]
    fn status_follows_threshold() {
        let threshold = t(9, 0, 0);
        assert_eq!(derive_status(midnight(), threshold), AttendanceStatus::Absent);
        assert_eq!(derive_status(t(8, 59, 59), threshold), AttendanceStatus::OnTime);
        assert_eq!(derive_status(t(9, 0, 0), threshold), AttendanceStatus::OnTime);
        assert_eq!(derive_status(t(9, 0, 1), threshold), AttendanceStatus::Late);
    }

    #[test]
    fn status_agrees_with_zero_padded_string_order() {
        let threshold = t(9, 0, 0);
        for (raw, time) in [("08:30:00", t(8, 30, 0)), ("09:00:00", t(9, 0, 0)), ("10:15:00", t(10, 15, 0))] {
            let by_string = if raw <= "09:00:00" {
                AttendanceStatus::OnTime
            } else {
                AttendanceStatus::Late
            };
            assert_eq!(derive_status(time, threshold), by_string);
        }
    }

    #[test]
    fn unknown_employees_are_reported_separately() {
        let known: HashSet<EmpId> = [5].into_iter().collect();
        let rows = vec![
            row(1, &[("Emp.Id", CellValue::Number(5.0)), ("In.Time", text("8:45"))]),
            row(2, &[("EMP ID", CellValue::Number(999.0)), ("in time", text("8:50"))]),
        ];

        let out = normalize_attendance(&rows, date(), t(9, 0, 0), &known);

        assert_eq!(out.accepted.len(), 1);
        assert_eq!(out.accepted[0].emp_id, 5);
        assert_eq!(out.accepted[0].status, AttendanceStatus::OnTime);
        assert_eq!(out.rejected.len(), 1);
        assert_eq!(out.rejected[0].emp_id.as_deref(), Some("999"));
        assert_eq!(out.rejected[0].row, 2);
    }

    #[test]
    fn rows_without_usable_ids_are_rejected() {
        let known: HashSet<EmpId> = [1].into_iter().collect();
        let rows = vec![
            row(1, &[("name", text("nobody")), ("intime", text("8:00"))]),
            row(2, &[("empid", text("E-12")), ("intime", text("8:00"))]),
        ];

        let out = normalize_attendance(&rows, date(), t(9, 0, 0), &known);

        assert!(out.accepted.is_empty());
        assert_eq!(out.rejected[0].reason, "missing employee id");
        assert_eq!(out.rejected[1].emp_id.as_deref(), Some("E-12"));
    }

    #[test]
    fn absent_rows_have_midnight_in_time() {
        let known: HashSet<EmpId> = [1].into_iter().collect();
        let rows = vec![row(1, &[("empid", text("1"))])];

        let out = normalize_attendance(&rows, date(), t(9, 0, 0), &known);

        assert_eq!(out.accepted[0].in_time, midnight());
        assert_eq!(out.accepted[0].status, AttendanceStatus::Absent);
    }

    #[test]
    fn duplicate_rows_keep_the_last() {
        let known: HashSet<EmpId> = [1].into_iter().collect();
        let rows = vec![
            row(1, &[("empid", CellValue::Number(1.0)), ("intime", text("8:00"))]),
            row(2, &[("empid", CellValue::Number(1.0)), ("intime", text("9:30"))]),
        ];

        let out = normalize_attendance(&rows, date(), t(9, 0, 0), &known);

        assert_eq!(out.accepted.len(), 1);
        assert_eq!(out.accepted[0].status, AttendanceStatus::Late);
    }

    #[test]
    fn json_rows_resolve_like_sheet_rows() {
        let json = serde_json::json!({"Emp.Id": 7, "In.Time": "9:15"});
        let sheet_row = SheetRow::from_json(1, json.as_object().unwrap());
        let known: HashSet<EmpId> = [7].into_iter().collect();

        let out = normalize_attendance(&[sheet_row], date(), t(9, 0, 0), &known);

        assert_eq!(out.accepted[0].in_time, t(9, 15, 0));
        assert_eq!(out.accepted[0].status, AttendanceStatus::Late);
    }

    #[test]
    fn faculty_rows_need_id_and_name() {
        let rows = vec![
            row(
                1,
                &[
                    ("EmpId", CellValue::Number(3.0)),
                    ("Name", text("Asha")),
                    ("Dept", text("Physics")),
                    ("Salary", CellValue::Number(30000.0)),
                    ("Casual Leaves", CellValue::Number(2.0)),
                ],
            ),
            row(2, &[("EmpId", CellValue::Number(4.0))]),
            row(3, &[("EmpId", CellValue::Number(5.0)), ("Name", text("Ravi")), ("Salary", text("lots"))]),
        ];

        let out = normalize_faculty(&rows);

        assert_eq!(out.accepted.len(), 1);
        assert_eq!(out.accepted[0].casual_leaves, Some(2));
        assert_eq!(out.accepted[0].dept.as_deref(), Some("Physics"));
        assert_eq!(out.accepted[0].designation, None);
        assert_eq!(out.rejected.len(), 2);
        assert_eq!(out.rejected[0].reason, "missing name");
    }

    #[test]
    fn blank_roster_cells_keep_stored_values() {
        let stored = Faculty {
            emp_id: 1,
            name: "Asha".into(),
            dept: "Physics".into(),
            designation: "Lecturer".into(),
            salary: 30000.0,
            casual_leaves: 5,
            username: Some("asha".into()),
            registered: true,
        };
        let line = RosterRow {
            emp_id: 1,
            name: "Asha Raman".into(),
            dept: None,
            designation: Some("Professor".into()),
            salary: None,
            casual_leaves: None,
        };

        let merged = line.clone().into_faculty(Some(&stored));
        assert_eq!(merged.name, "Asha Raman");
        assert_eq!(merged.dept, "Physics");
        assert_eq!(merged.designation, "Professor");
        assert_eq!(merged.salary, 30000.0);
        assert_eq!(merged.casual_leaves, 5);
        assert_eq!(merged.username.as_deref(), Some("asha"));

        let fresh = line.into_faculty(None);
        assert_eq!(fresh.salary, 0.0);
        assert_eq!(fresh.casual_leaves, 0);
        assert!(!fresh.registered);
    }
}
