use actix_web::{HttpResponse, Responder, web};
use serde_json::json;

use super::parse_date;
use crate::model::holiday::Holiday;
use crate::service::holiday as holiday_service;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/holidays",
    responses((status = 200, description = "Holidays by date", body = [Holiday])),
    tag = "Holidays"
)]
pub async fn list_holidays(state: web::Data<AppState>) -> actix_web::Result<impl Responder> {
    let holidays = holiday_service::list(state.store()).await?;
    Ok(HttpResponse::Ok().json(holidays))
}

#[utoipa::path(
    post,
    path = "/api/holidays",
    request_body = Holiday,
    responses(
        (status = 200, description = "Holiday saved, replacing any on the same date", body = Holiday),
        (status = 400, description = "Empty description")
    ),
    tag = "Holidays"
)]
pub async fn put_holiday(state: web::Data<AppState>, payload: web::Json<Holiday>) -> actix_web::Result<impl Responder> {
    let holiday = holiday_service::put(state.store(), payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(holiday))
}

#[utoipa::path(
    delete,
    path = "/api/holidays/{date}",
    params(("date" = String, Path, description = "Holiday date as YYYY-MM-DD", example = "2024-03-25")),
    responses(
        (status = 200, description = "Holiday removed", body = Object, example = json!({
            "message": "Holiday deleted"
        })),
        (status = 404, description = "No holiday on that date")
    ),
    tag = "Holidays"
)]
pub async fn delete_holiday(state: web::Data<AppState>, path: web::Path<String>) -> actix_web::Result<impl Responder> {
    let date = parse_date(&path)?;
    holiday_service::delete(state.store(), date).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Holiday deleted" })))
}
