use actix_web::web;

use crate::error::AppError;
use crate::middleware::JwtExtract;

pub mod files;
pub mod health;
pub mod root;
pub mod users;

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(64 * 1024)
        .error_handler(|err, _req| AppError::bad_request("INVALID_JSON", err.to_string()).into())
}

fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|err, _req| AppError::bad_request("INVALID_PATH", err.to_string()).into())
}

/// Register every route.
///
/// Protected scopes carry their own `JwtExtract`, so the same wiring serves
/// `main.rs` and the HTTP tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config()).app_data(path_config());

    cfg.route("/", web::get().to(root::welcome));

    // Health check routes: /health
    cfg.service(web::scope("/health").configure(health::configure_routes));

    // Public user creation: POST /api/users
    cfg.service(web::resource("/api/users").route(web::post().to(users::create_user)));

    // Everything else under /api requires a verified bearer token
    cfg.service(
        web::scope("/api")
            .wrap(JwtExtract)
            .route("/me", web::get().to(users::me))
            .route("/users/{id}", web::get().to(users::get_user))
            .route("/files/{name:.*}", web::delete().to(files::delete_file)),
    );
}
