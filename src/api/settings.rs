use actix_web::{HttpResponse, Responder, web};

use crate::error::AppError;
use crate::model::settings::Settings;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/settings",
    responses((status = 200, description = "Current settings, defaults when none are stored", body = Settings)),
    tag = "Settings"
)]
pub async fn get_settings(state: web::Data<AppState>) -> actix_web::Result<impl Responder> {
    let settings = state.settings().await?;
    Ok(HttpResponse::Ok().json(settings))
}

/// Replaces the settings. Missing fields take their defaults.
#[utoipa::path(
    put,
    path = "/api/settings",
    request_body = Settings,
    responses(
        (status = 200, description = "Settings saved", body = Settings),
        (status = 503, description = "Storage unavailable")
    ),
    tag = "Settings"
)]
pub async fn put_settings(state: web::Data<AppState>, payload: web::Json<Settings>) -> actix_web::Result<impl Responder> {
    let saved = state
        .settings
        .save(&state.store, payload.into_inner())
        .await
        .map_err(AppError::from)?;
    Ok(HttpResponse::Ok().json(saved))
}
