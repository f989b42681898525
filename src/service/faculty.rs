use std::collections::HashMap;

use tracing::{info, instrument};

use crate::error::{AppError, AppResult};
use crate::model::EmpId;
use crate::model::faculty::{CreateFaculty, EmployeeDetail, Faculty, FacultyUpload, UpdateFaculty};
use crate::model::settings::Settings;
use crate::payroll::calendar::MonthKey;
use crate::payroll::normalizer::{SheetRow, normalize_faculty};
use crate::payroll::summary::{SummaryParams, summarize};
use crate::store::{Batch, Mutation, Store};

use super::{rejection_messages, rejection_warning};

fn validate(faculty: &Faculty) -> AppResult<()> {
    let mut errors = Vec::new();
    if faculty.name.trim().is_empty() {
        errors.push("name must not be empty".to_string());
    }
    if !faculty.salary.is_finite() || faculty.salary < 0.0 {
        errors.push("salary must be a non-negative number".to_string());
    }
    if faculty.casual_leaves < 0 {
        errors.push("casualLeaves must not be negative".to_string());
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

pub async fn list(store: &dyn Store) -> AppResult<Vec<Faculty>> {
    Ok(store.list_faculty().await?)
}

pub async fn get(store: &dyn Store, emp_id: EmpId) -> AppResult<Faculty> {
    store
        .get_faculty(emp_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Faculty {emp_id} not found")))
}

pub async fn create(store: &dyn Store, payload: CreateFaculty) -> AppResult<Faculty> {
    let faculty = Faculty::from(payload);
    validate(&faculty)?;

    if store.get_faculty(faculty.emp_id).await?.is_some() {
        return Err(AppError::Conflict(format!("Faculty {} already exists", faculty.emp_id)));
    }

    store.apply(Batch::single(Mutation::PutFaculty(faculty.clone()))).await?;
    info!(emp_id = faculty.emp_id, "Faculty created");
    Ok(faculty)
}

pub async fn update(store: &dyn Store, emp_id: EmpId, changes: UpdateFaculty) -> AppResult<Faculty> {
    if changes.is_empty() {
        return Err(AppError::BadRequest("No fields to update".into()));
    }

    let mut faculty = get(store, emp_id).await?;
    changes.apply_to(&mut faculty);
    validate(&faculty)?;

    store.apply(Batch::single(Mutation::PutFaculty(faculty.clone()))).await?;
    info!(emp_id, "Faculty updated");
    Ok(faculty)
}

/// Removes the record and all of its attendance.
pub async fn delete(store: &dyn Store, emp_id: EmpId) -> AppResult<()> {
    get(store, emp_id).await?;
    store.apply(Batch::single(Mutation::DeleteFaculty(emp_id))).await?;
    info!(emp_id, "Faculty deleted");
    Ok(())
}

/// Upserts every valid roster row in one batch. Blank cells and account links
/// keep their stored values.
#[instrument(skip(store, rows), fields(rows = rows.len()))]
pub async fn bulk_upload(store: &dyn Store, rows: &[SheetRow]) -> AppResult<FacultyUpload> {
    if rows.is_empty() {
        return Err(AppError::Validation(vec!["spreadsheet has no data rows".into()]));
    }

    let normalized = normalize_faculty(rows);
    if normalized.accepted.is_empty() {
        return Err(AppError::Validation(rejection_messages(&normalized.rejected)));
    }

    let existing: HashMap<EmpId, Faculty> = store
        .list_faculty()
        .await?
        .into_iter()
        .map(|f| (f.emp_id, f))
        .collect();

    let batch: Batch = normalized
        .accepted
        .into_iter()
        .map(|line| {
            let current = existing.get(&line.emp_id);
            Mutation::PutFaculty(line.into_faculty(current))
        })
        .collect();
    let accepted = batch.len();

    store.apply(batch).await?;
    info!(accepted, rejected = normalized.rejected.len(), "Roster upload applied");

    Ok(FacultyUpload {
        accepted,
        warning: rejection_warning(&normalized.rejected),
        rejected: normalized.rejected,
    })
}

/// Record, that month's attendance sorted by date, and the summary row.
pub async fn employee_detail(
    store: &dyn Store,
    settings: &Settings,
    emp_id: EmpId,
    month: MonthKey,
    monthly_working_days: u32,
) -> AppResult<EmployeeDetail> {
    let faculty = get(store, emp_id).await?;
    let attendance = store.attendance_for(emp_id, month.range()).await?;
    let holidays = store.list_holidays().await?;

    let params = SummaryParams {
        month,
        monthly_working_days,
        permission_limit: settings.permission_limit,
        holidays: &holidays,
    };
    let records: Vec<_> = attendance.iter().collect();
    let summary = summarize(&faculty, &records, &params);

    Ok(EmployeeDetail {
        faculty,
        attendance,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payroll::normalizer::CellValue;
    use crate::service::fixtures::{absent, date, faculty, present, store_with};
    use std::collections::BTreeMap;

    fn row(index: usize, cells: &[(&str, CellValue)]) -> SheetRow {
        SheetRow {
            index,
            cells: cells
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    #[actix_web::test]
    async fn create_rejects_duplicates_and_bad_values() {
        let store = store_with(vec![faculty(1, 30000.0, 2)], vec![]).await;

        let duplicate = CreateFaculty {
            emp_id: 1,
            name: "Again".into(),
            dept: String::new(),
            designation: String::new(),
            salary: 1.0,
            casual_leaves: 0,
        };
        assert!(matches!(create(store.as_ref(), duplicate).await, Err(AppError::Conflict(_))));

        let invalid = CreateFaculty {
            emp_id: 2,
            name: " ".into(),
            dept: String::new(),
            designation: String::new(),
            salary: -5.0,
            casual_leaves: 0,
        };
        match create(store.as_ref(), invalid).await {
            Err(AppError::Validation(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[actix_web::test]
    async fn update_changes_only_given_fields() {
        let store = store_with(vec![faculty(1, 30000.0, 2)], vec![]).await;
        let updated = update(
            store.as_ref(),
            1,
            UpdateFaculty {
                salary: Some(32000.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.salary, 32000.0);
        assert_eq!(updated.casual_leaves, 2);
        assert_eq!(updated.name, "Faculty 1");
    }

    #[actix_web::test]
    async fn delete_cascades_to_attendance() {
        let store = store_with(vec![faculty(1, 30000.0, 2)], vec![present(1, date(2024, 3, 1))]).await;
        delete(store.as_ref(), 1).await.unwrap();
        assert!(store.get_attendance(1, date(2024, 3, 1)).await.unwrap().is_none());
        assert!(matches!(delete(store.as_ref(), 1).await, Err(AppError::NotFound(_))));
    }

    #[actix_web::test]
    async fn bulk_upload_keeps_account_links_and_reports_bad_rows() {
        let mut linked = faculty(1, 30000.0, 2);
        linked.username = Some("asha".into());
        linked.registered = true;
        let store = store_with(vec![linked], vec![]).await;

        let rows = vec![
            row(
                1,
                &[
                    ("Emp ID", CellValue::Number(1.0)),
                    ("Name", CellValue::Text("Asha Raman".into())),
                    ("Salary", CellValue::Number(31000.0)),
                ],
            ),
            row(2, &[("Emp ID", CellValue::Number(2.0)), ("Name", CellValue::Text("Ravi".into()))]),
            row(3, &[("Name", CellValue::Text("No Id".into()))]),
        ];

        let report = bulk_upload(store.as_ref(), &rows).await.unwrap();
        assert_eq!(report.accepted, 2);
        assert_eq!(report.rejected.len(), 1);
        assert!(report.warning.unwrap().contains("row 3"));

        let asha = store.get_faculty(1).await.unwrap().unwrap();
        assert_eq!(asha.salary, 31000.0);
        assert_eq!(asha.username.as_deref(), Some("asha"));
        assert!(asha.registered);
        assert!(store.get_faculty(2).await.unwrap().is_some());
    }

    #[actix_web::test]
    async fn reupload_without_balance_columns_keeps_salary_and_casual_leaves() {
        let store = store_with(vec![faculty(1, 30000.0, 5)], vec![]).await;

        let rows = vec![row(
            1,
            &[("EmpId", CellValue::Number(1.0)), ("Name", CellValue::Text("Renamed".into()))],
        )];
        bulk_upload(store.as_ref(), &rows).await.unwrap();

        let stored = store.get_faculty(1).await.unwrap().unwrap();
        assert_eq!(stored.name, "Renamed");
        assert_eq!(stored.casual_leaves, 5);
        assert_eq!(stored.salary, 30000.0);
        assert_eq!(stored.dept, "Physics");
    }

    #[actix_web::test]
    async fn detail_bundles_month_rows_and_summary() {
        let store = store_with(
            vec![faculty(1, 26000.0, 0)],
            vec![
                present(1, date(2024, 3, 2)),
                absent(1, date(2024, 3, 1)),
                present(1, date(2024, 4, 1)),
            ],
        )
        .await;

        let month: MonthKey = "2024-03".parse().unwrap();
        let detail = employee_detail(store.as_ref(), &Settings::default(), 1, month, 2)
            .await
            .unwrap();
        assert_eq!(detail.attendance.len(), 2);
        assert_eq!(detail.attendance[0].date, date(2024, 3, 1));
        assert_eq!(detail.summary.present_days, 1);
        assert_eq!(detail.summary.unpaid_leave, 1);
        assert_eq!(detail.summary.calculated_salary, 13000.0);
    }
}
