use actix_web::{HttpResponse, Responder, http::header, web};

use super::parse_month;
use crate::model::summary::{LopReversal, SummaryAdjustment, SummaryExport, WorkingDaysQuery};
use crate::service::{allocation, lop, summary};
use crate::state::AppState;

/* =========================
Monthly summary
========================= */
#[utoipa::path(
    get,
    path = "/api/summary/{month}",
    params(
        ("month" = String, Path, description = "Month as YYYY-MM", example = "2024-03"),
        WorkingDaysQuery
    ),
    responses(
        (status = 200, description = "One row per faculty member", body = [crate::model::summary::MonthlySummary]),
        (status = 400, description = "Invalid month")
    ),
    tag = "Payroll"
)]
pub async fn monthly_summary(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<WorkingDaysQuery>,
) -> actix_web::Result<impl Responder> {
    let month = parse_month(&path)?;
    let settings = state.settings().await?;
    let rows = summary::monthly(state.store(), &settings, month, state.working_days(query.working_days)).await?;
    Ok(HttpResponse::Ok().json(rows))
}

/// Recomputes the summary with edited payable days. Nothing is stored.
#[utoipa::path(
    post,
    path = "/api/summary/{month}/adjust",
    params(("month" = String, Path, description = "Month as YYYY-MM", example = "2024-03")),
    request_body = SummaryAdjustment,
    responses(
        (status = 200, description = "Adjusted rows", body = [crate::model::summary::MonthlySummary]),
        (status = 400, description = "Unknown employee or negative payable days")
    ),
    tag = "Payroll"
)]
pub async fn adjust_summary(
    state: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<SummaryAdjustment>,
) -> actix_web::Result<impl Responder> {
    let month = parse_month(&path)?;
    let payload = payload.into_inner();
    let settings = state.settings().await?;

    let rows = summary::monthly(state.store(), &settings, month, state.working_days(payload.working_days)).await?;
    let rows = summary::adjust(rows, &payload.overrides)?;
    Ok(HttpResponse::Ok().json(rows))
}

#[utoipa::path(
    post,
    path = "/api/summary/{month}/export",
    params(("month" = String, Path, description = "Month as YYYY-MM", example = "2024-03")),
    request_body = SummaryExport,
    responses(
        (status = 200, description = "CSV or XLSX attachment", body = Vec<u8>, content_type = "application/octet-stream"),
        (status = 400, description = "Invalid month or overrides")
    ),
    tag = "Payroll"
)]
pub async fn export_summary(
    state: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<SummaryExport>,
) -> actix_web::Result<impl Responder> {
    // 1️⃣ Same rows the adjust endpoint would return
    let month = parse_month(&path)?;
    let (format, adjustment) = payload.into_inner().into_parts();
    let settings = state.settings().await?;
    let rows = summary::monthly(state.store(), &settings, month, state.working_days(adjustment.working_days)).await?;
    let rows = summary::adjust(rows, &adjustment.overrides)?;

    // 2️⃣ Render and send as attachment
    let file = summary::export(month, &rows, format)?;
    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, file.content_type))
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file.file_name),
        ))
        .body(file.bytes))
}

#[utoipa::path(
    post,
    path = "/api/summary/{month}/finalize",
    params(
        ("month" = String, Path, description = "Month as YYYY-MM", example = "2024-03"),
        WorkingDaysQuery
    ),
    responses(
        (status = 200, description = "Casual leaves deducted, or the existing lock when already finalized", body = crate::model::summary::MonthlyRun),
        (status = 400, description = "Invalid month")
    ),
    tag = "Payroll"
)]
pub async fn finalize_month(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<WorkingDaysQuery>,
) -> actix_web::Result<impl Responder> {
    let month = parse_month(&path)?;
    let settings = state.settings().await?;
    let run = summary::finalize(state.store(), &settings, month, state.working_days(query.working_days)).await?;
    Ok(HttpResponse::Ok().json(run))
}

/* =========================
Loss of pay
========================= */
#[utoipa::path(
    get,
    path = "/api/lop/{month}",
    params(
        ("month" = String, Path, description = "Month as YYYY-MM", example = "2024-03"),
        WorkingDaysQuery
    ),
    responses(
        (status = 200, description = "Members with unpaid leave and their absent dates", body = [crate::model::summary::LopCandidate]),
        (status = 400, description = "Invalid month")
    ),
    tag = "Payroll"
)]
pub async fn lop_candidates(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<WorkingDaysQuery>,
) -> actix_web::Result<impl Responder> {
    let month = parse_month(&path)?;
    let candidates = lop::candidates(state.store(), month, state.working_days(query.working_days)).await?;
    Ok(HttpResponse::Ok().json(candidates))
}

#[utoipa::path(
    post,
    path = "/api/lop/reverse",
    request_body = LopReversal,
    responses(
        (status = 200, description = "Day rewritten as an on-time arrival", body = crate::model::attendance::AttendanceRecord),
        (status = 404, description = "Faculty not found")
    ),
    tag = "Payroll"
)]
pub async fn reverse_lop(state: web::Data<AppState>, payload: web::Json<LopReversal>) -> actix_web::Result<impl Responder> {
    let record = lop::reverse(state.store(), payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(record))
}

/* =========================
Monthly CL allocation
========================= */
#[utoipa::path(
    post,
    path = "/api/allocation/{month}",
    params(("month" = String, Path, description = "Month as YYYY-MM", example = "2024-03")),
    responses(
        (status = 200, description = "Credit granted, or the existing lock when already allocated", body = crate::model::summary::MonthlyRun),
        (status = 400, description = "Invalid month")
    ),
    tag = "Payroll"
)]
pub async fn allocate_month(state: web::Data<AppState>, path: web::Path<String>) -> actix_web::Result<impl Responder> {
    let month = parse_month(&path)?;
    let run = allocation::allocate(state.store(), month).await?;
    Ok(HttpResponse::Ok().json(run))
}

#[utoipa::path(
    get,
    path = "/api/allocation/{month}",
    params(("month" = String, Path, description = "Month as YYYY-MM", example = "2024-03")),
    responses(
        (status = 200, description = "Allocation lock for the month, or null", body = Option<crate::model::lock::MonthlyLock>),
        (status = 400, description = "Invalid month")
    ),
    tag = "Payroll"
)]
pub async fn allocation_status(state: web::Data<AppState>, path: web::Path<String>) -> actix_web::Result<impl Responder> {
    let month = parse_month(&path)?;
    let lock = allocation::status(state.store(), month).await?;
    Ok(HttpResponse::Ok().json(lock))
}
