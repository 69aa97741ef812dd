use std::collections::BTreeMap;

use actix_web::test;
use sea_orm::{DatabaseBackend, MockDatabase, Value as DbValue};
use serde_json::Value;

use crate::support::{state_with_db, state_without_backends, test_app};

#[actix_web::test]
async fn health_without_database_is_degraded() {
    let app = test_app(state_without_backends()).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 503);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["db"], "unavailable");
    assert_eq!(body["cache"], "unavailable");
    assert_eq!(body["object_store"], "unavailable");
}

#[actix_web::test]
async fn health_with_database_is_ok() {
    let row = BTreeMap::from([("health_check", DbValue::Int(Some(1)))]);
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![row]])
        .into_connection();
    let app = test_app(state_with_db(db)).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["db"], "ok");
    assert!(body["migrations"].is_string());
    assert_eq!(body["app_version"], env!("CARGO_PKG_VERSION"));
}
