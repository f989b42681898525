//! One-way sinks: summary sheets and the printable leave letter.

use anyhow::{Result, anyhow};
use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::model::leave_application::LeaveApplication;
use crate::model::summary::MonthlySummary;

pub const SUMMARY_HEADERS: [&str; 17] = [
    "Emp ID",
    "Name",
    "Department",
    "Designation",
    "Salary",
    "Working Days",
    "Present Days",
    "Absent Days",
    "Late",
    "Permissions",
    "Half Days",
    "CL Available",
    "CL Used",
    "Unpaid Leave",
    "Total Leaves",
    "Payable Days",
    "Calculated Salary",
];

enum Cell {
    Text(String),
    Number(f64),
}

fn summary_cells(s: &MonthlySummary) -> [Cell; 17] {
    [
        Cell::Number(s.emp_id as f64),
        Cell::Text(s.name.clone()),
        Cell::Text(s.dept.clone()),
        Cell::Text(s.designation.clone()),
        Cell::Number(s.salary),
        Cell::Number(s.actual_working_days.into()),
        Cell::Number(s.present_days.into()),
        Cell::Number(s.absent_days.into()),
        Cell::Number(s.late_records.into()),
        Cell::Number(s.permissions.into()),
        Cell::Number(s.half_day_leaves.into()),
        Cell::Number(s.casual_leaves_available.into()),
        Cell::Number(s.casual_leaves_used.into()),
        Cell::Number(s.unpaid_leave.into()),
        Cell::Number(s.total_leaves),
        Cell::Number(s.payable_days),
        Cell::Number(s.calculated_salary),
    ]
}

/// Text that a spreadsheet would evaluate as a formula gets a leading quote.
fn guard_formula(text: &str) -> String {
    match text.chars().next() {
        Some('=' | '+' | '-' | '@' | '\t' | '\r') => format!("'{text}"),
        _ => text.to_string(),
    }
}

pub fn summary_csv(rows: &[MonthlySummary]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(SUMMARY_HEADERS)?;

    for row in rows {
        let record = summary_cells(row).map(|cell| match cell {
            Cell::Text(text) => guard_formula(&text),
            Cell::Number(n) => n.to_string(),
        });
        writer.write_record(&record)?;
    }

    writer
        .into_inner()
        .map_err(|e| anyhow!("Failed to flush CSV: {}", e.error()))
}

pub fn summary_xlsx(month: &str, rows: &[MonthlySummary]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let mut worksheet = Worksheet::new();
    worksheet.set_name(format!("Summary {month}"))?;

    let bold = Format::new().set_bold();
    for (col, header) in SUMMARY_HEADERS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, &bold)?;
    }

    for (r, row) in rows.iter().enumerate() {
        let r = (r + 1) as u32;
        for (col, cell) in summary_cells(row).into_iter().enumerate() {
            match cell {
                Cell::Text(text) => worksheet.write_string(r, col as u16, text.as_str())?,
                Cell::Number(n) => worksheet.write_number(r, col as u16, n)?,
            };
        }
    }

    workbook.push_worksheet(worksheet);
    Ok(workbook.save_to_buffer()?)
}

/// Plain-text letter for a stored application.
pub fn leave_letter(leave: &LeaveApplication, designation: Option<&str>) -> String {
    let days = (leave.end_date - leave.start_date).num_days() + 1;
    let from = leave.start_date.format("%d %B %Y");
    let to = leave.end_date.format("%d %B %Y");

    let mut letter = String::new();
    letter.push_str(&format!("Date: {}\n\n", leave.submission_timestamp.format("%d %B %Y")));
    letter.push_str("To\nThe Head of the Institution\n\n");
    letter.push_str(&format!("Subject: Application for {} leave\n\n", leave.leave_type));
    letter.push_str("Respected Sir/Madam,\n\n");
    letter.push_str(&format!(
        "I request leave for {days} day{} from {from} to {to}.\nReason: {}\n\n",
        if days == 1 { "" } else { "s" },
        leave.reason
    ));
    letter.push_str("Kindly grant me leave for the above period.\n\n");
    letter.push_str("Yours faithfully,\n");
    letter.push_str(&format!("{}\n", leave.name));
    if let Some(designation) = designation.filter(|d| !d.is_empty()) {
        letter.push_str(&format!("{designation}\n"));
    }
    letter.push_str(&format!("{} (Emp ID {})\n\n", leave.dept, leave.emp_id));
    letter.push_str(&format!("Status: {}\nReference: {}\n", leave.status, leave.id));
    letter
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::leave_application::LeaveStatus;
    use crate::payroll::calendar::MonthKey;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn summary(name: &str) -> MonthlySummary {
        MonthlySummary {
            emp_id: 7,
            name: name.to_string(),
            dept: "Physics".into(),
            designation: "Lecturer".into(),
            salary: 30000.0,
            month: MonthKey::new(2024, 3).unwrap(),
            actual_working_days: 26,
            present_days: 20,
            absent_days: 6,
            late_records: 0,
            permissions: 0,
            half_day_leaves: 0,
            casual_leaves_available: 2,
            casual_leaves_used: 2,
            unpaid_leave: 4,
            total_leaves: 4.0,
            payable_days: 22.0,
            calculated_salary: 25384.62,
        }
    }

    #[test]
    fn csv_has_fixed_header_and_guards_formulas() {
        let bytes = summary_csv(&[summary("=HYPERLINK(\"x\")")]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), SUMMARY_HEADERS.join(","));
        let row = lines.next().unwrap();
        assert!(row.starts_with("7,\"'=HYPERLINK(\"\"x\"\")\",Physics"));
        assert!(row.ends_with(",22,25384.62"));
    }

    #[test]
    fn xlsx_is_a_zip_container() {
        let bytes = summary_xlsx("2024-03", &[summary("Asha")]).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn letter_mentions_period_and_reference() {
        let leave = LeaveApplication {
            id: "abc".into(),
            emp_id: 7,
            name: "Asha".into(),
            dept: "Physics".into(),
            start_date: NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 3, 12).unwrap(),
            reason: "Conference".into(),
            leave_type: "On-Duty".into(),
            status: LeaveStatus::Pending,
            submission_timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap(),
        };
        let letter = leave_letter(&leave, Some("Lecturer"));
        assert!(letter.contains("Subject: Application for On-Duty leave"));
        assert!(letter.contains("3 days from 10 March 2024 to 12 March 2024"));
        assert!(letter.contains("Lecturer\n"));
        assert!(letter.contains("Reference: abc"));
    }
}
