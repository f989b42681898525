use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};

use faculty_hr::config::Config;
use faculty_hr::db::open_store;
use faculty_hr::docs::ApiDoc;
use faculty_hr::routes;
use faculty_hr::service::accounts;
use faculty_hr::state::AppState;
use faculty_hr::utils::username_filter;

use tracing::{error, info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "Faculty HR is running"
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!(backend = %config.store_backend, "Server starting...");

    let store = open_store(&config).await?;

    match (&config.admin_username, &config.admin_password) {
        (Some(username), Some(password)) => match accounts::seed_admin(store.as_ref(), username, password).await {
            Ok(true) => info!(%username, "Administrator account created"),
            Ok(false) => {}
            Err(e) => error!(error = %e, "Failed to seed administrator"),
        },
        (Some(_), None) | (None, Some(_)) => warn!("ADMIN_USERNAME and ADMIN_PASSWORD must both be set to seed an admin"),
        (None, None) => {}
    }

    let store_for_filter_warmup = store.clone();
    actix_web::rt::spawn(async move {
        if let Err(e) = username_filter::warmup_username_filter(store_for_filter_warmup, 100).await {
            error!(error = %e, "Failed to warmup username filter");
        }
    });

    let server_addr = config.server_addr.clone();
    let state = Data::new(AppState::new(store, config.clone()));

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                // wildcard {_:.*} so the UI's JS/CSS files resolve
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(state.clone())
            .service(index)
            .configure(|cfg| routes::configure(cfg, &config))
    })
    .bind(server_addr)?
    .run()
    .await?;

    Ok(())
}
