use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpMessage, HttpRequest};

use crate::auth::Claims;
use crate::error::AppError;

/// Verified claims placed in request extensions by
/// [`JwtExtract`](crate::middleware::JwtExtract). Handlers outside a
/// protected scope get `401 Unauthorized`.
impl FromRequest for Claims {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<Claims>()
                .cloned()
                .ok_or_else(AppError::unauthorized),
        )
    }
}
