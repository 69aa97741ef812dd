use actix_web::test;

use crate::support::{state_without_backends, test_app};

#[actix_web::test]
async fn root_welcomes() {
    let app = test_app(state_without_backends()).await;

    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    assert!(resp.headers().contains_key("x-trace-id"));

    let body = test::read_body(resp).await;
    assert_eq!(body, "Welcome to Cyclops!");
}
