#![allow(dead_code)]

use std::collections::BTreeMap;

use actix_http::Request;
use actix_web::body::BoxBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{test, web, App, Error};
use cyclops::middleware::{RequestTrace, StructuredLogger};
use cyclops::{routes, AppState, SecurityConfig};
use sea_orm::DatabaseConnection;

pub const TEST_SECRET: &[u8] = b"test_secret_key_for_testing_purposes_only";

pub fn security() -> SecurityConfig {
    SecurityConfig::new(TEST_SECRET)
}

/// State with no database, cache, object store or mail.
pub fn state_without_backends() -> AppState {
    AppState::for_tests(None, security()).expect("test state")
}

/// State around a (usually mocked) database connection.
pub fn state_with_db(db: DatabaseConnection) -> AppState {
    AppState::for_tests(Some(db), security()).expect("test state")
}

/// The production route table behind the production middleware stack.
pub async fn test_app(
    state: AppState,
) -> impl Service<Request, Response = ServiceResponse<BoxBody>, Error = Error> {
    test::init_service(
        App::new()
            .wrap(StructuredLogger)
            .wrap(RequestTrace)
            .app_data(web::Data::new(state))
            .configure(routes::configure),
    )
    .await
}

pub fn bearer(state: &AppState, subject_id: &str, email: &str) -> String {
    let mut extra = BTreeMap::new();
    extra.insert("first_name".to_string(), "Ada".to_string());
    let token = state
        .tokens
        .issue(subject_id, email, extra)
        .expect("token issued");
    format!("Bearer {token}")
}
