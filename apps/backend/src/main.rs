use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use cyclops::config::Config;
use cyclops::infra::state::build_state;
use cyclops::maintenance::{self, Scheduler};
use cyclops::middleware::cors::cors_middleware;
use cyclops::middleware::request_trace::RequestTrace;
use cyclops::middleware::structured_logger::StructuredLogger;
use cyclops::routes;
use cyclops::telemetry;
use tracing::{error, info};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    // Environment variables must be set by the runtime environment
    // (docker env_file, systemd EnvironmentFile, or a sourced .env).
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    // Fatal backend failures stop the process before the listener is bound.
    let app_state = match build_state(&config).build().await {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "failed to build application state");
            std::process::exit(1);
        }
    };

    // Dropping the scheduler cancels its jobs, so every early return below
    // also stops them.
    let mut scheduler = Scheduler::new();
    if let Err(e) = maintenance::schedule_purge(
        &mut scheduler,
        Arc::clone(&app_state.backends),
        config.maintenance.clone(),
    ) {
        error!(error = %e, "failed to schedule maintenance");
        std::process::exit(1);
    }
    scheduler.start();

    let host = config.host.clone();
    let port = config.port;
    let allowed_origins = config.allowed_origins.clone();
    let data = web::Data::new(app_state);

    info!(%host, port, "Starting Cyclops backend");

    let server = HttpServer::new(move || {
        App::new()
            .wrap(cors_middleware(&allowed_origins))
            .wrap(StructuredLogger)
            .wrap(RequestTrace)
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .bind((host.as_str(), port))?
    .run();

    let result = server.await;

    scheduler.stop().await;
    info!("Cyclops backend stopped");
    result
}
