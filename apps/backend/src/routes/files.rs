use actix_web::{web, HttpResponse};
use tracing::info;

use crate::auth::Claims;
use crate::error::AppError;
use crate::state::app_state::AppState;

/// `DELETE /api/files/{name}`; 503 when no object store is configured.
pub async fn delete_file(
    app_state: web::Data<AppState>,
    claims: Claims,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let name = path.into_inner();
    app_state.backends.delete_file(&name).await?;
    info!(user_id = %claims.subject_id, file = %name, "file deleted");
    Ok(HttpResponse::NoContent().finish())
}
