use actix_web::test;

use crate::common::assert_problem_details;
use crate::support::{bearer, state_without_backends, test_app};

#[actix_web::test]
async fn delete_without_object_store_is_unavailable() {
    let state = state_without_backends();
    let auth = bearer(&state, "42", "ada@example.com");
    let app = test_app(state).await;

    let req = test::TestRequest::delete()
        .uri("/api/files/tmp/report.csv")
        .insert_header(("Authorization", auth))
        .to_request();
    let resp = test::call_service(&app, req).await;

    let body = assert_problem_details(resp, 503, "BACKEND_UNAVAILABLE").await;
    let detail = body["detail"].as_str().unwrap_or_default();
    assert_eq!(detail, "object_store is unavailable");
    assert!(!detail.contains("S3_"), "{detail}");
}

#[actix_web::test]
async fn delete_requires_token() {
    let app = test_app(state_without_backends()).await;

    let req = test::TestRequest::delete()
        .uri("/api/files/tmp/report.csv")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details(resp, 401, "UNAUTHORIZED_MISSING_BEARER").await;
}
