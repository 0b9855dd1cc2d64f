// Contract tests for the payment HTTP API
//
// Response shapes, status codes and the error body
// `{"success": false, "error": {code, kind, message, details?}}`.

#[path = "../helpers/mod.rs"]
mod helpers;

use actix_web::{http::StatusCode, test, App};
use helpers::*;
use serde_json::{json, Value};

#[actix_web::test]
async fn test_initiate_returns_created_with_checkout_details() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().configure(ctx.routes())).await;

    let req = authed_post(
        "/api/payments/initiate",
        "alice",
        &TestDataFactory::initiate_payload(),
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_status(&resp, StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], json!(true));
    assert!(body["reference"].as_str().unwrap().starts_with("PAY-"));
    assert_eq!(body["gateway_order_id"], json!("order-1"));
    assert!(body["checkout_url"]
        .as_str()
        .unwrap()
        .starts_with("https://checkout.test/pay/"));

    let raw = body.to_string();
    assert_no_secrets(&raw, &[SESSION_SECRET, WEBHOOK_SECRET, "stub-token"]);
}

#[actix_web::test]
async fn test_initiate_requires_session() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().configure(ctx.routes())).await;

    let missing = test::TestRequest::post()
        .uri("/api/payments/initiate")
        .set_json(TestDataFactory::initiate_payload())
        .to_request();
    let resp = test::call_service(&app, missing).await;
    assert_status(&resp, StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_error_kind(&body, "authentication_required");

    let expired = test::TestRequest::post()
        .uri("/api/payments/initiate")
        .insert_header((
            "Authorization",
            format!("Bearer {}", TestDataFactory::expired_session_token("alice")),
        ))
        .set_json(TestDataFactory::initiate_payload())
        .to_request();
    let resp = test::call_service(&app, expired).await;
    assert_status(&resp, StatusCode::UNAUTHORIZED);

    assert_eq!(ctx.gateway.orders_created(), 0);
}

#[actix_web::test]
async fn test_validation_error_lists_all_violations() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().configure(ctx.routes())).await;

    let req = authed_post(
        "/api/payments/initiate",
        "alice",
        &json!({ "amount": -1, "currency": "EUR", "email": "nope" }),
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_status(&resp, StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_error_kind(&body, "validation_error");
    assert_eq!(body["error"]["code"], json!(400));
    assert_eq!(body["error"]["details"].as_array().unwrap().len(), 4);
}

#[actix_web::test]
async fn test_malformed_json_is_a_validation_error() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().configure(ctx.routes())).await;

    let req = test::TestRequest::post()
        .uri("/api/payments/initiate")
        .insert_header((
            "Authorization",
            format!("Bearer {}", TestDataFactory::session_token("alice")),
        ))
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_status(&resp, StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_error_kind(&body, "validation_error");
}

#[actix_web::test]
async fn test_gateway_failure_maps_to_retryable_503() {
    let ctx = TestContext::new();
    ctx.gateway.fail_orders_with("connect error to 10.0.0.7:443");
    let app = test::init_service(App::new().configure(ctx.routes())).await;

    let req = authed_post(
        "/api/payments/initiate",
        "alice",
        &TestDataFactory::initiate_payload(),
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_status(&resp, StatusCode::SERVICE_UNAVAILABLE);

    let body: Value = test::read_body_json(resp).await;
    assert_error_kind(&body, "gateway_unreachable");
    assert!(!body.to_string().contains("10.0.0.7"), "internal detail leaked");
    assert!(ctx.ledger.is_empty().await);
}

#[actix_web::test]
async fn test_disabled_flag_blocks_every_entry_point() {
    let ctx = TestContext::disabled();
    let app = test::init_service(App::new().configure(ctx.routes())).await;

    let initiate = authed_post(
        "/api/payments/initiate",
        "alice",
        &TestDataFactory::initiate_payload(),
    )
    .to_request();
    let resp = test::call_service(&app, initiate).await;
    assert_status(&resp, StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = test::read_body_json(resp).await;
    assert_error_kind(&body, "service_disabled");

    let verify = authed_post(
        "/api/payments/verify",
        "alice",
        &json!({ "reference": "PAY-1700000000000-0A1B2C3D" }),
    )
    .to_request();
    let resp = test::call_service(&app, verify).await;
    assert_status(&resp, StatusCode::SERVICE_UNAVAILABLE);

    let resp = test::call_service(&app, authed_get("/api/payments", "alice").to_request()).await;
    assert_status(&resp, StatusCode::SERVICE_UNAVAILABLE);

    let (body, signature) =
        TestDataFactory::signed_webhook(&TestDataFactory::webhook_payload("order-1", "PAY-1"));
    let resp = test::call_service(&app, webhook_post(body, Some(signature.as_str())).to_request()).await;
    assert_status(&resp, StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "received": false, "status": "disabled" }));

    assert_eq!(ctx.gateway.orders_created(), 0);
    assert_eq!(ctx.gateway.status_queries(), 0);
}

#[actix_web::test]
async fn test_unknown_reference_is_not_found() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().configure(ctx.routes())).await;

    let verify = authed_post(
        "/api/payments/verify",
        "alice",
        &json!({ "reference": "PAY-1700000000000-0A1B2C3D" }),
    )
    .to_request();
    let resp = test::call_service(&app, verify).await;
    assert_status(&resp, StatusCode::NOT_FOUND);

    let get = authed_get("/api/payments/PAY-1700000000000-0A1B2C3D", "alice").to_request();
    let resp = test::call_service(&app, get).await;
    assert_status(&resp, StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_error_kind(&body, "not_found");
}

#[actix_web::test]
async fn test_list_defaults_and_clamps() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().configure(ctx.routes())).await;

    let resp = test::call_service(&app, authed_get("/api/payments", "alice").to_request()).await;
    assert_status(&resp, StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"], json!([]));
    assert_eq!(body["limit"], json!(20));

    let resp = test::call_service(
        &app,
        authed_get("/api/payments?limit=500&offset=3", "alice").to_request(),
    )
    .await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["limit"], json!(100));
    assert_eq!(body["offset"], json!(3));
}

#[actix_web::test]
async fn test_health_and_readiness_are_public() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().configure(ctx.routes())).await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_status(&resp, StatusCode::OK);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/ready").to_request()).await;
    assert_status(&resp, StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["ready"], json!(true));
}

#[actix_web::test]
async fn test_unmatched_payment_paths_are_not_found() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().configure(ctx.routes())).await;

    let resp = test::call_service(&app, authed_get("/api/payments/a/b", "alice").to_request()).await;
    assert_status(&resp, StatusCode::NOT_FOUND);

    let anonymous = test::TestRequest::get().uri("/api/payments/a/b").to_request();
    let resp = test::call_service(&app, anonymous).await;
    assert_status(&resp, StatusCode::NOT_FOUND);

    // Known resources still demand a session.
    let anonymous = test::TestRequest::get().uri("/api/payments").to_request();
    let resp = test::call_service(&app, anonymous).await;
    assert_status(&resp, StatusCode::UNAUTHORIZED);
}
