use actix_web::test;
use cyclops::entities::users;
use sea_orm::{DatabaseBackend, DbErr, MockDatabase};
use serde_json::{json, Value};
use time::macros::datetime;

use crate::common::assert_problem_details;
use crate::support::{bearer, state_with_db, state_without_backends, test_app};

fn ada(id: i64) -> users::Model {
    users::Model {
        id,
        name: "Ada".to_string(),
        email: "ada@example.com".to_string(),
        age: 36,
        created_at: datetime!(2024-06-01 12:00 UTC),
        updated_at: datetime!(2024-06-01 12:00 UTC),
        deleted_at: None,
    }
}

#[actix_web::test]
async fn create_user_returns_201() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![ada(7)]])
        .into_connection();
    let app = test_app(state_with_db(db)).await;

    let req = test::TestRequest::post()
        .uri("/api/users")
        .set_json(json!({ "name": "Ada", "email": "ada@example.com", "age": 36 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 201);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["id"], 7);
    assert_eq!(body["email"], "ada@example.com");
    assert_eq!(body["created_at"], "2024-06-01T12:00:00Z");
}

#[actix_web::test]
async fn create_user_with_bad_json_is_400() {
    let app = test_app(state_without_backends()).await;

    let req = test::TestRequest::post()
        .uri("/api/users")
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{ not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details(resp, 400, "INVALID_JSON").await;
}

#[actix_web::test]
async fn create_user_with_bad_email_is_400() {
    let app = test_app(state_without_backends()).await;

    let req = test::TestRequest::post()
        .uri("/api/users")
        .set_json(json!({ "name": "Ada", "email": "nobody" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details(resp, 400, "INVALID_EMAIL").await;
}

#[actix_web::test]
async fn create_user_failure_is_500() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_errors([DbErr::Custom("duplicate key value".to_string())])
        .into_connection();
    let app = test_app(state_with_db(db)).await;

    let req = test::TestRequest::post()
        .uri("/api/users")
        .set_json(json!({ "name": "Ada", "email": "ada@example.com" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details(resp, 500, "DB_ERROR").await;
}

#[actix_web::test]
async fn create_user_without_database_is_503() {
    let app = test_app(state_without_backends()).await;

    let req = test::TestRequest::post()
        .uri("/api/users")
        .set_json(json!({ "name": "Ada", "email": "ada@example.com" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details(resp, 503, "BACKEND_UNAVAILABLE").await;
}

#[actix_web::test]
async fn get_user_returns_record() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![ada(7)]])
        .into_connection();
    let state = state_with_db(db);
    let auth = bearer(&state, "7", "ada@example.com");
    let app = test_app(state).await;

    let req = test::TestRequest::get()
        .uri("/api/users/7")
        .insert_header(("Authorization", auth))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["id"], 7);
    assert_eq!(body["name"], "Ada");
}

#[actix_web::test]
async fn get_missing_user_is_404() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<users::Model>::new()])
        .into_connection();
    let state = state_with_db(db);
    let auth = bearer(&state, "7", "ada@example.com");
    let app = test_app(state).await;

    let req = test::TestRequest::get()
        .uri("/api/users/99")
        .insert_header(("Authorization", auth))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details(resp, 404, "USER_NOT_FOUND").await;
}

#[actix_web::test]
async fn get_user_with_non_numeric_id_is_400() {
    let state = state_without_backends();
    let auth = bearer(&state, "7", "ada@example.com");
    let app = test_app(state).await;

    let req = test::TestRequest::get()
        .uri("/api/users/abc")
        .insert_header(("Authorization", auth))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details(resp, 400, "INVALID_PATH").await;
}

#[actix_web::test]
async fn get_user_requires_token() {
    let app = test_app(state_without_backends()).await;

    let req = test::TestRequest::get().uri("/api/users/7").to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details(resp, 401, "UNAUTHORIZED_MISSING_BEARER").await;
}
