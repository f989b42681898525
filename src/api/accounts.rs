use actix_web::{HttpResponse, Responder, web};
use serde_json::json;
use tracing::debug;

use crate::model::user::{LoginRequest, RegisterRequest};
use crate::service::accounts;
use crate::state::AppState;

/* =========================
Auth
========================= */
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created, or request filed for approval", body = crate::model::user::Registration),
        (status = 400, description = "Empty fields or passwords differ"),
        (status = 403, description = "Registration is switched off"),
        (status = 404, description = "Faculty not found"),
        (status = 409, description = "Username taken or faculty already registered", body = Object, example = json!({
            "error": "Username asha is already taken",
            "code": "CONFLICT"
        }))
    ),
    tag = "Auth"
)]
pub async fn register(state: web::Data<AppState>, payload: web::Json<RegisterRequest>) -> actix_web::Result<impl Responder> {
    let settings = state.settings().await?;
    let outcome = accounts::register(state.store(), &settings, payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(outcome))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credentials accepted", body = crate::model::user::UserProfile),
        (status = 401, description = "Invalid username or password"),
        (status = 403, description = "Account request still pending")
    ),
    tag = "Auth"
)]
pub async fn login(state: web::Data<AppState>, payload: web::Json<LoginRequest>) -> actix_web::Result<impl Responder> {
    let profile = accounts::login(state.store(), payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(profile))
}

#[utoipa::path(
    get,
    path = "/api/auth/username-available/{username}",
    params(("username" = String, Path, description = "Username to check")),
    responses(
        (status = 200, description = "Availability", body = Object, example = json!({
            "username": "asha",
            "available": true
        }))
    ),
    tag = "Auth"
)]
pub async fn username_available(state: web::Data<AppState>, path: web::Path<String>) -> actix_web::Result<impl Responder> {
    let available = accounts::is_username_available(state.store(), &path).await?;
    debug!(username = %path, available, "Username availability checked");
    Ok(HttpResponse::Ok().json(json!({ "username": path.into_inner(), "available": available })))
}

/* =========================
User administration
========================= */
#[utoipa::path(
    get,
    path = "/api/users",
    responses((status = 200, description = "Accounts without password hashes", body = [crate::model::user::UserProfile])),
    tag = "Users"
)]
pub async fn list_users(state: web::Data<AppState>) -> actix_web::Result<impl Responder> {
    let users = accounts::list_users(state.store()).await?;
    Ok(HttpResponse::Ok().json(users))
}

#[utoipa::path(
    get,
    path = "/api/users/pending",
    responses((status = 200, description = "Account requests awaiting approval", body = [crate::model::user::PendingUserView])),
    tag = "Users"
)]
pub async fn list_pending(state: web::Data<AppState>) -> actix_web::Result<impl Responder> {
    let pending = accounts::list_pending(state.store()).await?;
    Ok(HttpResponse::Ok().json(pending))
}

#[utoipa::path(
    post,
    path = "/api/users/pending/{username}/approve",
    params(("username" = String, Path, description = "Requested username")),
    responses(
        (status = 200, description = "Account created and linked", body = crate::model::user::UserProfile),
        (status = 404, description = "No such request or faculty"),
        (status = 409, description = "Faculty already registered")
    ),
    tag = "Users"
)]
pub async fn approve_pending(state: web::Data<AppState>, path: web::Path<String>) -> actix_web::Result<impl Responder> {
    let profile = accounts::approve_pending(state.store(), &path).await?;
    Ok(HttpResponse::Ok().json(profile))
}

#[utoipa::path(
    delete,
    path = "/api/users/pending/{username}",
    params(("username" = String, Path, description = "Requested username")),
    responses(
        (status = 200, description = "Request rejected", body = Object, example = json!({
            "message": "Account request rejected"
        })),
        (status = 404, description = "No such request")
    ),
    tag = "Users"
)]
pub async fn reject_pending(state: web::Data<AppState>, path: web::Path<String>) -> actix_web::Result<impl Responder> {
    accounts::reject_pending(state.store(), &path).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Account request rejected" })))
}

#[utoipa::path(
    delete,
    path = "/api/users/{username}",
    params(("username" = String, Path, description = "Account username")),
    responses(
        (status = 200, description = "Account deleted and faculty unlinked", body = Object, example = json!({
            "message": "User deleted"
        })),
        (status = 404, description = "User not found"),
        (status = 409, description = "Last administrator")
    ),
    tag = "Users"
)]
pub async fn delete_user(state: web::Data<AppState>, path: web::Path<String>) -> actix_web::Result<impl Responder> {
    accounts::delete_user(state.store(), &path).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "User deleted" })))
}
