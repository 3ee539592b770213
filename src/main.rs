use std::{env, sync::Arc};

use actix_web::{middleware::NormalizePath, web, App, HttpServer};
use spa_contact::{
    background_task::start_rate_limit_sweep,
    graceful_shutdown::shutdown_signal,
    mail::smtp::SmtpMailer,
    middlewares::cors::build_cors,
    routes::configure_routes,
    settings::AppConfig,
    telemetry::init_tracing,
    AppState,
};
use tracing_actix_web::TracingLogger;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let json_logs = env::var("APP_ENV").is_ok_and(|v| v.eq_ignore_ascii_case("production"));
    init_tracing(json_logs);

    let config = match AppConfig::new() {
        Ok(cfg) => {
            tracing::info!("Loaded configuration: {:?}", cfg);
            cfg
        },
        Err(e) => {
            tracing::error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let mailer = match SmtpMailer::new(&config) {
        Ok(mailer) => mailer,
        Err(e) => {
            tracing::error!("SMTP transport setup failed: {}", e);
            std::process::exit(1);
        }
    };

    let app_state = web::Data::new(AppState::new(&config, Arc::new(mailer)));

    let server_addr = format!("{}:{}", config.host, config.port);

    tracing::info!(
        "Starting {} v{} on {}",
        config.name,
        env!("CARGO_PKG_VERSION"),
        server_addr
    );

    tokio::spawn(start_rate_limit_sweep(
        app_state.contact_handler.rate_limiter.clone(),
        config.rate_limit_sweep_interval(),
    ));

    let server_config = config.clone();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(build_cors(&server_config))
            .wrap(NormalizePath::trim())
            .wrap(TracingLogger::default())
            .configure(configure_routes)
    })
    .workers(config.worker_count)
    .bind(server_addr)?
    .run();

    tokio::select! {
        res = server => res,
        _ = shutdown_signal() => Ok(()),
    }
}
