use actix_web::{HttpResponse, Responder, http::header, web};
use serde_json::json;

use crate::model::leave_application::{LeaveFilter, LeaveSubmission};
use crate::service::leave as leave_service;
use crate::state::AppState;

/* =========================
Submit leave
========================= */
#[utoipa::path(
    post,
    path = "/api/leave",
    request_body = LeaveSubmission,
    responses(
        (status = 201, description = "Leave submitted as Pending and mirrored into attendance", body = crate::model::leave_application::LeaveApplication),
        (status = 400, description = "Missing fields or startDate after endDate", body = Object, example = json!({
            "error": "Validation failed",
            "code": "VALIDATION_ERROR",
            "details": { "errors": ["reason is required"] }
        })),
        (status = 404, description = "Faculty not found")
    ),
    tag = "Leave"
)]
pub async fn submit_leave(
    state: web::Data<AppState>,
    payload: web::Json<LeaveSubmission>,
) -> actix_web::Result<impl Responder> {
    let leave = leave_service::submit(state.store(), payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(leave))
}

#[utoipa::path(
    get,
    path = "/api/leave",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Applications, newest submission first", body = [crate::model::leave_application::LeaveApplication])
    ),
    tag = "Leave"
)]
pub async fn list_leaves(
    state: web::Data<AppState>,
    query: web::Query<LeaveFilter>,
) -> actix_web::Result<impl Responder> {
    let leaves = leave_service::list(state.store(), &query).await?;
    Ok(HttpResponse::Ok().json(leaves))
}

#[utoipa::path(
    get,
    path = "/api/leave/{id}",
    params(("id" = String, Path, description = "Leave application id")),
    responses(
        (status = 200, description = "Leave application", body = crate::model::leave_application::LeaveApplication),
        (status = 404, description = "Leave application not found")
    ),
    tag = "Leave"
)]
pub async fn get_leave(state: web::Data<AppState>, path: web::Path<String>) -> actix_web::Result<impl Responder> {
    let leave = leave_service::get(state.store(), &path).await?;
    Ok(HttpResponse::Ok().json(leave))
}

/* =========================
Approve / reject
========================= */
#[utoipa::path(
    put,
    path = "/api/leave/{id}/approve",
    params(("id" = String, Path, description = "Leave application id")),
    responses(
        (status = 200, description = "Leave approved", body = crate::model::leave_application::LeaveApplication),
        (status = 404, description = "Leave application not found"),
        (status = 409, description = "Leave is no longer pending")
    ),
    tag = "Leave"
)]
pub async fn approve_leave(state: web::Data<AppState>, path: web::Path<String>) -> actix_web::Result<impl Responder> {
    let leave = leave_service::approve(state.store(), &path).await?;
    Ok(HttpResponse::Ok().json(leave))
}

#[utoipa::path(
    put,
    path = "/api/leave/{id}/reject",
    params(("id" = String, Path, description = "Leave application id")),
    responses(
        (status = 200, description = "Leave rejected; mirrored attendance is left as is", body = crate::model::leave_application::LeaveApplication),
        (status = 404, description = "Leave application not found"),
        (status = 409, description = "Leave is no longer pending")
    ),
    tag = "Leave"
)]
pub async fn reject_leave(state: web::Data<AppState>, path: web::Path<String>) -> actix_web::Result<impl Responder> {
    let leave = leave_service::reject(state.store(), &path).await?;
    Ok(HttpResponse::Ok().json(leave))
}

#[utoipa::path(
    delete,
    path = "/api/leave/{id}",
    params(("id" = String, Path, description = "Leave application id")),
    responses(
        (status = 200, description = "Leave and its attendance days deleted", body = Object, example = json!({
            "message": "Leave application deleted"
        })),
        (status = 404, description = "Leave application not found"),
        (status = 409, description = "Approved leave cannot be deleted")
    ),
    tag = "Leave"
)]
pub async fn delete_leave(state: web::Data<AppState>, path: web::Path<String>) -> actix_web::Result<impl Responder> {
    leave_service::delete(state.store(), &path).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Leave application deleted" })))
}

/// Plain-text letter for printing.
#[utoipa::path(
    get,
    path = "/api/leave/{id}/letter",
    params(("id" = String, Path, description = "Leave application id")),
    responses(
        (status = 200, description = "Leave letter", body = String, content_type = "text/plain"),
        (status = 404, description = "Leave application not found")
    ),
    tag = "Leave"
)]
pub async fn leave_letter(state: web::Data<AppState>, path: web::Path<String>) -> actix_web::Result<impl Responder> {
    let letter = leave_service::letter(state.store(), &path).await?;
    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, "text/plain; charset=utf-8"))
        .body(letter))
}
