use std::collections::BTreeMap;

use actix_web::test;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use cyclops::{SecurityConfig, TokenAuthority};
use serde_json::Value;
use time::{Duration, OffsetDateTime};

use crate::common::assert_problem_details;
use crate::support::{bearer, state_without_backends, test_app, TEST_SECRET};

#[actix_web::test]
async fn valid_token_reaches_handler_with_claims() {
    let state = state_without_backends();
    let auth = bearer(&state, "42", "ada@example.com");
    let app = test_app(state).await;

    let req = test::TestRequest::get()
        .uri("/api/me")
        .insert_header(("Authorization", auth))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["user_id"], "42");
    assert_eq!(body["email"], "ada@example.com");
    assert_eq!(body["first_name"], "Ada");
    assert!(body["exp"].is_i64());
}

#[actix_web::test]
async fn expired_token_is_rejected_as_expired() {
    let state = state_without_backends();
    let issued = OffsetDateTime::now_utc() - Duration::hours(73);
    let token = state
        .tokens
        .issue_at(issued, "42", "ada@example.com", BTreeMap::new())
        .unwrap();
    let app = test_app(state).await;

    let req = test::TestRequest::get()
        .uri("/api/me")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details(resp, 401, "UNAUTHORIZED_EXPIRED_JWT").await;
}

#[actix_web::test]
async fn token_from_other_secret_is_invalid() {
    let other = TokenAuthority::new(SecurityConfig::new(b"another-secret".to_vec())).unwrap();
    let token = other.issue("42", "ada@example.com", BTreeMap::new()).unwrap();
    let app = test_app(state_without_backends()).await;

    let req = test::TestRequest::get()
        .uri("/api/me")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details(resp, 401, "UNAUTHORIZED_INVALID_JWT").await;
}

#[actix_web::test]
async fn unsigned_token_is_invalid() {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let exp = (OffsetDateTime::now_utc() + Duration::hours(1)).unix_timestamp();
    let payload = URL_SAFE_NO_PAD
        .encode(format!(r#"{{"user_id":"42","email":"ada@example.com","exp":{exp}}}"#));
    let app = test_app(state_without_backends()).await;

    let req = test::TestRequest::get()
        .uri("/api/me")
        .insert_header(("Authorization", format!("Bearer {header}.{payload}.")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details(resp, 401, "UNAUTHORIZED_INVALID_JWT").await;
}

#[actix_web::test]
async fn tampered_payload_is_invalid() {
    let authority = TokenAuthority::new(SecurityConfig::new(TEST_SECRET)).unwrap();
    let token = authority.issue("42", "ada@example.com", BTreeMap::new()).unwrap();
    let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
    let forged = URL_SAFE_NO_PAD.encode(br#"{"user_id":"1","email":"root@example.com","exp":4102444800}"#);
    parts[1] = forged;
    let app = test_app(state_without_backends()).await;

    let req = test::TestRequest::get()
        .uri("/api/me")
        .insert_header(("Authorization", format!("Bearer {}", parts.join("."))))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details(resp, 401, "UNAUTHORIZED_INVALID_JWT").await;
}

#[actix_web::test]
async fn missing_bearer_is_rejected() {
    let app = test_app(state_without_backends()).await;

    let req = test::TestRequest::get().uri("/api/me").to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details(resp, 401, "UNAUTHORIZED_MISSING_BEARER").await;

    let req = test::TestRequest::get()
        .uri("/api/me")
        .insert_header(("Authorization", "Basic dXNlcjpwYXNz"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details(resp, 401, "UNAUTHORIZED_MISSING_BEARER").await;
}
