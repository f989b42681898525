use actix_web::{HttpResponse, Responder, web};

use super::{parse_date, read_workbook};
use crate::model::EmpId;
use crate::model::attendance::{AttendanceRows, MarkAttendance};
use crate::payroll::normalizer::SheetRow;
use crate::service::attendance as attendance_service;
use crate::state::AppState;

/// Daily sheet upload. Rows with an unknown employee or an unreadable time are
/// skipped and listed in the response.
#[utoipa::path(
    post,
    path = "/api/attendance/upload/{date}",
    params(("date" = String, Path, description = "Attendance date as YYYY-MM-DD", example = "2024-03-10")),
    request_body(content = Vec<u8>, description = "Workbook bytes (.xlsx / .xls)", content_type = "application/octet-stream"),
    responses(
        (status = 200, description = "Valid rows stored", body = crate::model::attendance::AttendanceUpload),
        (status = 400, description = "Bad date, unreadable workbook or no usable rows"),
        (status = 503, description = "Storage unavailable")
    ),
    tag = "Attendance"
)]
pub async fn upload_sheet(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Bytes,
) -> actix_web::Result<impl Responder> {
    // 1️⃣ Resolve the day and read the sheet
    let date = parse_date(&path)?;
    let rows = read_workbook(&body)?;

    // 2️⃣ Normalize against the current threshold and store
    let settings = state.settings().await?;
    let report = attendance_service::upload(state.store(), &settings, date, &rows).await?;

    Ok(HttpResponse::Ok().json(report))
}

/// Same as the sheet upload, with the rows already parsed on the client.
#[utoipa::path(
    post,
    path = "/api/attendance/rows",
    request_body = AttendanceRows,
    responses(
        (status = 200, description = "Valid rows stored", body = crate::model::attendance::AttendanceUpload),
        (status = 400, description = "No usable rows")
    ),
    tag = "Attendance"
)]
pub async fn upload_rows(
    state: web::Data<AppState>,
    payload: web::Json<AttendanceRows>,
) -> actix_web::Result<impl Responder> {
    let payload = payload.into_inner();
    let rows: Vec<SheetRow> = payload
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| SheetRow::from_json(i + 1, row))
        .collect();

    let settings = state.settings().await?;
    let report = attendance_service::upload(state.store(), &settings, payload.date, &rows).await?;
    Ok(HttpResponse::Ok().json(report))
}

#[utoipa::path(
    get,
    path = "/api/attendance/daily/{date}",
    params(("date" = String, Path, description = "Date as YYYY-MM-DD", example = "2024-03-10")),
    responses(
        (status = 200, description = "Counts by status and the day's rows", body = crate::model::attendance::DailyOverview),
        (status = 400, description = "Invalid date")
    ),
    tag = "Attendance"
)]
pub async fn daily_overview(state: web::Data<AppState>, path: web::Path<String>) -> actix_web::Result<impl Responder> {
    let date = parse_date(&path)?;
    let overview = attendance_service::daily_overview(state.store(), date).await?;
    Ok(HttpResponse::Ok().json(overview))
}

/* =========================
Manual marking
========================= */
#[utoipa::path(
    put,
    path = "/api/attendance/{emp_id}/{date}",
    params(
        ("emp_id" = u64, Path, description = "Employee id"),
        ("date" = String, Path, description = "Date as YYYY-MM-DD", example = "2024-03-10")
    ),
    request_body = MarkAttendance,
    responses(
        (status = 200, description = "Attendance stored", body = crate::model::attendance::AttendanceRecord),
        (status = 400, description = "Invalid date or missing inTime"),
        (status = 404, description = "Faculty not found")
    ),
    tag = "Attendance"
)]
pub async fn mark_attendance(
    state: web::Data<AppState>,
    path: web::Path<(EmpId, String)>,
    payload: web::Json<MarkAttendance>,
) -> actix_web::Result<impl Responder> {
    let (emp_id, date) = path.into_inner();
    let date = parse_date(&date)?;
    let record = attendance_service::mark(state.store(), emp_id, date, payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(record))
}
