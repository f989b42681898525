//! Workbook bytes to [`SheetRow`]s. The first worksheet is read and its first
//! row supplies the column names.

use std::collections::BTreeMap;
use std::io::Cursor;

use calamine::{Data, Reader, open_workbook_auto_from_rs};

use crate::payroll::normalizer::{CellValue, SheetRow};

#[derive(Debug, thiserror::Error)]
pub enum SpreadsheetError {
    #[error("could not read workbook: {0}")]
    Unreadable(#[from] calamine::Error),
    #[error("workbook has no worksheets")]
    NoSheets,
    #[error("worksheet is empty")]
    Empty,
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        Data::Error(_) | Data::Empty => CellValue::Empty,
    }
}

fn header_name(cell: &Data) -> String {
    match cell_value(cell) {
        CellValue::Text(text) => text,
        CellValue::Number(n) => n.to_string(),
        CellValue::Empty => String::new(),
    }
}

pub fn read_rows(bytes: &[u8]) -> Result<Vec<SheetRow>, SpreadsheetError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(SpreadsheetError::NoSheets)?;
    let range = workbook.worksheet_range(&sheet_name)?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .ok_or(SpreadsheetError::Empty)?
        .iter()
        .map(header_name)
        .collect();

    let data: Vec<SheetRow> = rows
        .enumerate()
        .map(|(i, row)| SheetRow {
            index: i + 1,
            cells: headers
                .iter()
                .zip(row.iter())
                .filter(|(header, _)| !header.trim().is_empty())
                .map(|(header, cell)| (header.clone(), cell_value(cell)))
                .collect::<BTreeMap<_, _>>(),
        })
        .filter(|row| row.cells.values().any(|cell| *cell != CellValue::Empty))
        .collect();

    if data.is_empty() {
        return Err(SpreadsheetError::Empty);
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    fn workbook_bytes(build: impl FnOnce(&mut rust_xlsxwriter::Worksheet)) -> Vec<u8> {
        let mut workbook = Workbook::new();
        build(workbook.add_worksheet());
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn reads_first_sheet_with_header_row() {
        let bytes = workbook_bytes(|sheet| {
            sheet.write_string(0, 0, "Emp.Id").unwrap();
            sheet.write_string(0, 1, "In Time").unwrap();
            sheet.write_number(1, 0, 5.0).unwrap();
            sheet.write_string(1, 1, "08:45").unwrap();
            sheet.write_number(2, 0, 6.0).unwrap();
            sheet.write_number(2, 1, 0.375).unwrap();
        });

        let rows = read_rows(&bytes).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].index, 1);
        assert_eq!(rows[0].cells["Emp.Id"], CellValue::Number(5.0));
        assert_eq!(rows[0].cells["In Time"], CellValue::Text("08:45".into()));
        assert_eq!(rows[1].cells["In Time"], CellValue::Number(0.375));
    }

    #[test]
    fn header_only_sheet_is_empty() {
        let bytes = workbook_bytes(|sheet| {
            sheet.write_string(0, 0, "empid").unwrap();
        });
        assert!(matches!(read_rows(&bytes), Err(SpreadsheetError::Empty)));
    }

    #[test]
    fn garbage_bytes_are_unreadable() {
        assert!(matches!(
            read_rows(b"definitely not a workbook"),
            Err(SpreadsheetError::Unreadable(_))
        ));
    }
}
