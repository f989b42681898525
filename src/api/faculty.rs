use actix_web::{HttpResponse, Responder, web};
use serde_json::json;

use super::{parse_month, read_workbook};
use crate::model::EmpId;
use crate::model::faculty::{CreateFaculty, UpdateFaculty};
use crate::model::summary::WorkingDaysQuery;
use crate::service::faculty as faculty_service;
use crate::state::AppState;

/* =========================
List faculty
========================= */
#[utoipa::path(
    get,
    path = "/api/faculty",
    responses(
        (status = 200, description = "Roster ordered by employee id", body = [crate::model::faculty::Faculty]),
        (status = 503, description = "Storage unavailable")
    ),
    tag = "Faculty"
)]
pub async fn list_faculty(state: web::Data<AppState>) -> actix_web::Result<impl Responder> {
    let roster = faculty_service::list(state.store()).await?;
    Ok(HttpResponse::Ok().json(roster))
}

#[utoipa::path(
    get,
    path = "/api/faculty/{emp_id}",
    params(("emp_id" = u64, Path, description = "Employee id")),
    responses(
        (status = 200, description = "Faculty record", body = crate::model::faculty::Faculty),
        (status = 404, description = "Faculty not found")
    ),
    tag = "Faculty"
)]
pub async fn get_faculty(state: web::Data<AppState>, path: web::Path<EmpId>) -> actix_web::Result<impl Responder> {
    let faculty = faculty_service::get(state.store(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(faculty))
}

/* =========================
Create faculty
========================= */
#[utoipa::path(
    post,
    path = "/api/faculty",
    request_body = CreateFaculty,
    responses(
        (status = 201, description = "Faculty created", body = crate::model::faculty::Faculty),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Employee id already exists")
    ),
    tag = "Faculty"
)]
pub async fn create_faculty(
    state: web::Data<AppState>,
    payload: web::Json<CreateFaculty>,
) -> actix_web::Result<impl Responder> {
    let faculty = faculty_service::create(state.store(), payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(faculty))
}

#[utoipa::path(
    put,
    path = "/api/faculty/{emp_id}",
    params(("emp_id" = u64, Path, description = "Employee id")),
    request_body = UpdateFaculty,
    responses(
        (status = 200, description = "Faculty updated", body = crate::model::faculty::Faculty),
        (status = 400, description = "Nothing to update or invalid values"),
        (status = 404, description = "Faculty not found")
    ),
    tag = "Faculty"
)]
pub async fn update_faculty(
    state: web::Data<AppState>,
    path: web::Path<EmpId>,
    payload: web::Json<UpdateFaculty>,
) -> actix_web::Result<impl Responder> {
    let faculty = faculty_service::update(state.store(), path.into_inner(), payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(faculty))
}

/* =========================
Delete faculty (cascades attendance)
========================= */
#[utoipa::path(
    delete,
    path = "/api/faculty/{emp_id}",
    params(("emp_id" = u64, Path, description = "Employee id")),
    responses(
        (status = 200, description = "Faculty and attendance deleted", body = Object, example = json!({
            "message": "Faculty deleted"
        })),
        (status = 404, description = "Faculty not found")
    ),
    tag = "Faculty"
)]
pub async fn delete_faculty(state: web::Data<AppState>, path: web::Path<EmpId>) -> actix_web::Result<impl Responder> {
    faculty_service::delete(state.store(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Faculty deleted" })))
}

/* =========================
Bulk roster upload
========================= */
#[utoipa::path(
    post,
    path = "/api/faculty/upload",
    request_body(content = Vec<u8>, description = "Workbook bytes (.xlsx / .xls)", content_type = "application/octet-stream"),
    responses(
        (status = 200, description = "Valid rows upserted; invalid rows reported", body = crate::model::faculty::FacultyUpload),
        (status = 400, description = "Unreadable workbook or no valid rows")
    ),
    tag = "Faculty"
)]
pub async fn upload_faculty(state: web::Data<AppState>, body: web::Bytes) -> actix_web::Result<impl Responder> {
    let rows = read_workbook(&body)?;
    let report = faculty_service::bulk_upload(state.store(), &rows).await?;
    Ok(HttpResponse::Ok().json(report))
}

/* =========================
Per-employee month
========================= */
#[utoipa::path(
    get,
    path = "/api/faculty/{emp_id}/month/{month}",
    params(
        ("emp_id" = u64, Path, description = "Employee id"),
        ("month" = String, Path, description = "Month as YYYY-MM", example = "2024-03"),
        WorkingDaysQuery
    ),
    responses(
        (status = 200, description = "Record, month attendance and summary", body = crate::model::faculty::EmployeeDetail),
        (status = 400, description = "Invalid month"),
        (status = 404, description = "Faculty not found")
    ),
    tag = "Faculty"
)]
pub async fn employee_month(
    state: web::Data<AppState>,
    path: web::Path<(EmpId, String)>,
    query: web::Query<WorkingDaysQuery>,
) -> actix_web::Result<impl Responder> {
    let (emp_id, month) = path.into_inner();
    let month = parse_month(&month)?;
    let settings = state.settings().await?;

    let detail = faculty_service::employee_detail(
        state.store(),
        &settings,
        emp_id,
        month,
        state.working_days(query.working_days),
    )
    .await?;
    Ok(HttpResponse::Ok().json(detail))
}
