use actix_web::{web, HttpResponse};
use tracing::debug;

use crate::auth::Claims;
use crate::error::AppError;
use crate::repos::users::{self, NewUser, User};
use crate::state::app_state::AppState;

const USER_CACHE_TTL_SECS: u64 = 60;

fn cache_key(user_id: i64) -> String {
    format!("user:{user_id}")
}

/// `POST /api/users`
pub async fn create_user(
    app_state: web::Data<AppState>,
    body: web::Json<NewUser>,
) -> Result<HttpResponse, AppError> {
    let new_user = body.into_inner();
    if !new_user.email.contains('@') {
        return Err(AppError::bad_request(
            "INVALID_EMAIL",
            "email must be an address",
        ));
    }

    let db = app_state.db()?;
    let user = users::create_user(db, new_user).await?;
    Ok(HttpResponse::Created().json(user))
}

/// `GET /api/users/{id}`, read through the cache when it is available.
pub async fn get_user(
    app_state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();

    if let Some(user) = cached_user(&app_state, user_id).await {
        return Ok(HttpResponse::Ok().json(user));
    }

    let db = app_state.db()?;
    let user = users::find_user_by_id(db, user_id)
        .await?
        .ok_or_else(|| AppError::not_found("USER_NOT_FOUND", format!("User {user_id} not found")))?;

    remember_user(&app_state, &user).await;
    Ok(HttpResponse::Ok().json(user))
}

/// `GET /api/me`: the verified token claims.
pub async fn me(claims: Claims) -> HttpResponse {
    HttpResponse::Ok().json(claims)
}

async fn cached_user(app_state: &AppState, user_id: i64) -> Option<User> {
    let cache = app_state.backends.cache().ok()?;
    match cache.get(&cache_key(user_id)).await {
        Ok(Some(raw)) => serde_json::from_str(&raw).ok(),
        Ok(None) => None,
        Err(e) => {
            debug!(user_id, error = %e, "user cache lookup skipped");
            None
        }
    }
}

async fn remember_user(app_state: &AppState, user: &User) {
    let Ok(cache) = app_state.backends.cache() else {
        return;
    };
    let Ok(raw) = serde_json::to_string(user) else {
        return;
    };
    if let Err(e) = cache
        .set_ex(&cache_key(user.id), &raw, USER_CACHE_TTL_SECS)
        .await
    {
        debug!(user_id = user.id, error = %e, "user cache write skipped");
    }
}
