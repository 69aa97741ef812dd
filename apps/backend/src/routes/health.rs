use std::future::Future;

use actix_web::{web, HttpResponse};
use migration::get_latest_migration_version;
use sea_orm::{ConnectionTrait, DbErr, Statement};
use serde::Serialize;
use time::OffsetDateTime;

use crate::error::AppError;
use crate::infra::bounded;
use crate::infra::registry::Backend;
use crate::state::app_state::AppState;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    app_version: &'static str,
    db: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    migrations: Option<String>,
    cache: String,
    object_store: &'static str,
    time: String,
}

async fn database_status(app_state: &AppState) -> (String, Option<String>) {
    let db = match app_state.db() {
        Ok(db) => db,
        Err(_) => return ("unavailable".to_string(), None),
    };

    let probe = bounded("db health probe", async {
        db.query_one(Statement::from_string(
            db.get_database_backend(),
            "SELECT 1 AS health_check".to_string(),
        ))
        .await
        .map_err(AppError::from)
    })
    .await;

    match probe {
        Ok(_) => {
            let migrations = migration_status(get_latest_migration_version(db)).await;
            ("ok".to_string(), Some(migrations))
        }
        Err(e) => (format!("error: {e}"), None),
    }
}

async fn migration_status<F>(lookup: F) -> String
where
    F: Future<Output = Result<Option<String>, DbErr>>,
{
    match bounded("migration lookup", async { lookup.await.map_err(AppError::from) }).await {
        Ok(Some(version)) => version,
        Ok(None) => "no_migrations".to_string(),
        Err(_) => "unknown".to_string(),
    }
}

async fn cache_status(app_state: &AppState) -> String {
    match app_state.backends.cache() {
        Ok(cache) => match cache.ping().await {
            Ok(()) => "ok".to_string(),
            Err(e) => format!("error: {e}"),
        },
        Err(_) => "unavailable".to_string(),
    }
}

/// Liveness of every backend. Responds 503 while the database is not usable.
async fn health(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let ((db, migrations), cache) =
        futures::join!(database_status(&app_state), cache_status(&app_state));

    let object_store = if app_state.backends.is_ready(Backend::ObjectStore) {
        "ok"
    } else {
        "unavailable"
    };

    let time = OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string());

    let healthy = db == "ok";
    let response = HealthResponse {
        status: if healthy { "ok" } else { "degraded" },
        app_version: env!("CARGO_PKG_VERSION"),
        db,
        migrations,
        cache,
        object_store,
        time,
    };

    if healthy {
        Ok(HttpResponse::Ok().json(response))
    } else {
        Ok(HttpResponse::ServiceUnavailable().json(response))
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::get().to(health));
}
