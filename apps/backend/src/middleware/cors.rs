use actix_cors::Cors;
use actix_web::http::header;

/// Build CORS middleware for the configured origins:
/// - Only allow methods actually used by the API
/// - Credentials allowed, so origins are always explicit
/// - Fallback to localhost-only when nothing valid was configured
pub fn cors_middleware(allowed_origins: &[String]) -> Cors {
    let effective_origins: Vec<&str> = if allowed_origins.is_empty() {
        vec!["http://localhost:3000", "http://127.0.0.1:3000"]
    } else {
        allowed_origins.iter().map(String::as_str).collect()
    };

    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "DELETE", "OPTIONS"])
        .allowed_headers(vec![
            header::ORIGIN,
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
        ])
        .expose_headers(vec![header::HeaderName::from_static("x-trace-id")])
        .supports_credentials()
        .max_age(3600);

    for origin in effective_origins {
        cors = cors.allowed_origin(origin);
    }

    cors
}
