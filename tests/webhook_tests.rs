//! Integration tests for `POST /webhook`.
//!
//! Deliveries are signed with [`SignatureVerifier::sign`], the same scheme
//! Stripe uses, and pushed through the full router so the raw-body capture
//! is exercised together with verification.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use billing_relay::stripe::SignatureVerifier;
use billing_relay::BillingConfig;
use common::{body_bytes, send, test_app};
use pretty_assertions::assert_eq;

const SECRET: &str = "whsec_integration";

const CHECKOUT_COMPLETED: &str = r#"{"id":"evt_1","type":"checkout.session.completed","data":{"object":{"id":"cs_test_abc","client_reference_id":"blackjackptit"}}}"#;

fn signed_config() -> BillingConfig {
    BillingConfig::test_config().with_webhook_secret(Some(SECRET.to_string()))
}

fn webhook(body: &str, signature: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/webhook")
        .header("content-type", "application/json");
    if let Some(signature) = signature {
        builder = builder.header("stripe-signature", signature);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn sign_now(body: &str) -> String {
    SignatureVerifier::new(SECRET).sign(body.as_bytes(), chrono::Utc::now().timestamp())
}

#[tokio::test]
async fn test_signed_delivery_accepted() {
    let (app, provider) = test_app(signed_config());

    let signature = sign_now(CHECKOUT_COMPLETED);
    let response = send(&app, webhook(CHECKOUT_COMPLETED, Some(&signature))).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_bytes(response).await.is_empty());
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_tampered_body_rejected() {
    let (app, _provider) = test_app(signed_config());

    let signature = sign_now(CHECKOUT_COMPLETED);
    let tampered = CHECKOUT_COMPLETED.replace("cs_test_abc", "cs_test_xyz");
    let response = send(&app, webhook(&tampered, Some(&signature))).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn test_reformatted_body_rejected() {
    let (app, _provider) = test_app(signed_config());

    // Same JSON value, different bytes
    let signature = sign_now(CHECKOUT_COMPLETED);
    let pretty = serde_json::to_string_pretty(
        &serde_json::from_str::<serde_json::Value>(CHECKOUT_COMPLETED).unwrap(),
    )
    .unwrap();
    let response = send(&app, webhook(&pretty, Some(&signature))).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_wrong_secret_rejected() {
    let (app, _provider) = test_app(signed_config());

    let signature = SignatureVerifier::new("whsec_other")
        .sign(CHECKOUT_COMPLETED.as_bytes(), chrono::Utc::now().timestamp());
    let response = send(&app, webhook(CHECKOUT_COMPLETED, Some(&signature))).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_stale_signature_rejected() {
    let (app, _provider) = test_app(signed_config());

    let an_hour_ago = chrono::Utc::now().timestamp() - 3600;
    let signature = SignatureVerifier::new(SECRET).sign(CHECKOUT_COMPLETED.as_bytes(), an_hour_ago);
    let response = send(&app, webhook(CHECKOUT_COMPLETED, Some(&signature))).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_signature_rejected() {
    let (app, _provider) = test_app(signed_config());

    let response = send(&app, webhook(CHECKOUT_COMPLETED, None)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_garbage_signature_rejected() {
    let (app, _provider) = test_app(signed_config());

    let response = send(&app, webhook(CHECKOUT_COMPLETED, Some("not-a-signature"))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unsigned_mode_accepts_any_signature_state() {
    let (app, _provider) = test_app(BillingConfig::test_config());

    let response = send(&app, webhook(CHECKOUT_COMPLETED, None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, webhook(CHECKOUT_COMPLETED, Some("t=1,v1=00"))).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_event_type_acknowledged() {
    let (app, _provider) = test_app(signed_config());

    let body = r#"{"id":"evt_2","type":"invoice.paid","data":{"object":{}}}"#;
    let response = send(&app, webhook(body, Some(&sign_now(body)))).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_event_without_type_acknowledged() {
    let (app, _provider) = test_app(BillingConfig::test_config());

    let response = send(&app, webhook(r#"{"data":{"object":{}}}"#, None)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_non_json_body_rejected() {
    let (app, _provider) = test_app(BillingConfig::test_config());

    let response = send(&app, webhook("definitely not json", None)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_signed_non_json_body_rejected() {
    let (app, _provider) = test_app(signed_config());

    let body = "definitely not json";
    let response = send(&app, webhook(body, Some(&sign_now(body)))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unsigned_any_json_shape_acknowledged() {
    let (app, _provider) = test_app(BillingConfig::test_config());

    for body in [
        "[1,2,3]",
        r#"{"type":42}"#,
        r#"{"id":7,"type":"checkout.session.completed"}"#,
        "null",
    ] {
        let response = send(&app, webhook(body, None)).await;
        assert_eq!(response.status(), StatusCode::OK, "{body}");
    }
}

#[tokio::test]
async fn test_signed_any_json_shape_acknowledged() {
    let (app, _provider) = test_app(signed_config());

    for body in [
        r#"{"id":7,"type":"checkout.session.completed","data":{}}"#,
        "[1,2,3]",
        r#"{"type":42}"#,
    ] {
        let response = send(&app, webhook(body, Some(&sign_now(body)))).await;
        assert_eq!(response.status(), StatusCode::OK, "{body}");
        assert!(body_bytes(response).await.is_empty());
    }
}
