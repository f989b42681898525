use crate::{
    api::{accounts, attendance, faculty, holiday, leave, payroll, settings},
    config::Config,
    error::AppError,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;

/// Largest accepted workbook body.
const UPLOAD_LIMIT: usize = 10 * 1024 * 1024;

// Per-IP limiter allowing `requests_per_min` with the same burst.
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .unwrap_or_default();
    Governor::new(&cfg)
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    // Extractor failures answer with the same JSON error body as the handlers
    let json_cfg = web::JsonConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into());
    let query_cfg = web::QueryConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into());

    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(build_limiter(config.rate_api_per_min))
            .app_data(json_cfg)
            .app_data(query_cfg)
            .app_data(web::PayloadConfig::new(UPLOAD_LIMIT))
            // /auth
            .service(
                web::scope("/auth")
                    .wrap(build_limiter(config.rate_auth_per_min))
                    .service(web::resource("/register").route(web::post().to(accounts::register)))
                    .service(web::resource("/login").route(web::post().to(accounts::login)))
                    .service(
                        web::resource("/username-available/{username}")
                            .route(web::get().to(accounts::username_available)),
                    ),
            )
            .service(
                web::scope("/faculty")
                    // /faculty
                    .service(
                        web::resource("")
                            .route(web::get().to(faculty::list_faculty))
                            .route(web::post().to(faculty::create_faculty)),
                    )
                    // /faculty/upload
                    .service(
                        web::resource("/upload")
                            .wrap(build_limiter(config.rate_upload_per_min))
                            .route(web::post().to(faculty::upload_faculty)),
                    )
                    // /faculty/{emp_id}
                    .service(
                        web::resource("/{emp_id}")
                            .route(web::get().to(faculty::get_faculty))
                            .route(web::put().to(faculty::update_faculty))
                            .route(web::delete().to(faculty::delete_faculty)),
                    )
                    // /faculty/{emp_id}/month/{month}
                    .service(
                        web::resource("/{emp_id}/month/{month}").route(web::get().to(faculty::employee_month)),
                    ),
            )
            .service(
                web::scope("/attendance")
                    .service(
                        web::resource("/upload/{date}")
                            .wrap(build_limiter(config.rate_upload_per_min))
                            .route(web::post().to(attendance::upload_sheet)),
                    )
                    .service(web::resource("/rows").route(web::post().to(attendance::upload_rows)))
                    .service(web::resource("/daily/{date}").route(web::get().to(attendance::daily_overview)))
                    .service(web::resource("/{emp_id}/{date}").route(web::put().to(attendance::mark_attendance))),
            )
            .service(
                web::scope("/leave")
                    // /leave
                    .service(
                        web::resource("")
                            .route(web::get().to(leave::list_leaves))
                            .route(web::post().to(leave::submit_leave)),
                    )
                    // /leave/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(leave::get_leave))
                            .route(web::delete().to(leave::delete_leave)),
                    )
                    .service(web::resource("/{id}/approve").route(web::put().to(leave::approve_leave)))
                    .service(web::resource("/{id}/reject").route(web::put().to(leave::reject_leave)))
                    .service(web::resource("/{id}/letter").route(web::get().to(leave::leave_letter))),
            )
            .service(
                web::scope("/holidays")
                    .service(
                        web::resource("")
                            .route(web::get().to(holiday::list_holidays))
                            .route(web::post().to(holiday::put_holiday)),
                    )
                    .service(web::resource("/{date}").route(web::delete().to(holiday::delete_holiday))),
            )
            .service(
                web::resource("/settings")
                    .route(web::get().to(settings::get_settings))
                    .route(web::put().to(settings::put_settings)),
            )
            .service(
                web::scope("/summary")
                    .service(web::resource("/{month}").route(web::get().to(payroll::monthly_summary)))
                    .service(web::resource("/{month}/adjust").route(web::post().to(payroll::adjust_summary)))
                    .service(web::resource("/{month}/export").route(web::post().to(payroll::export_summary)))
                    .service(web::resource("/{month}/finalize").route(web::post().to(payroll::finalize_month))),
            )
            .service(
                web::scope("/lop")
                    // /lop/reverse before /lop/{month}
                    .service(web::resource("/reverse").route(web::post().to(payroll::reverse_lop)))
                    .service(web::resource("/{month}").route(web::get().to(payroll::lop_candidates))),
            )
            .service(
                web::resource("/allocation/{month}")
                    .route(web::get().to(payroll::allocation_status))
                    .route(web::post().to(payroll::allocate_month)),
            )
            .service(
                web::scope("/users")
                    .service(web::resource("").route(web::get().to(accounts::list_users)))
                    .service(web::resource("/pending").route(web::get().to(accounts::list_pending)))
                    .service(
                        web::resource("/pending/{username}/approve").route(web::post().to(accounts::approve_pending)),
                    )
                    .service(web::resource("/pending/{username}").route(web::delete().to(accounts::reject_pending)))
                    .service(web::resource("/{username}").route(web::delete().to(accounts::delete_user))),
            ),
    );
}
