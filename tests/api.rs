//! Router-level tests driven in-process with `tower::ServiceExt::oneshot`.

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use paygate_mock::{router, MockConfig, MockService};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;
use tower::ServiceExt;

fn test_app() -> Router {
    let service = MockService::new(MockConfig::default()).unwrap();
    router(Arc::new(service))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let payload = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, payload)
}

fn invoice_body(site_id: &str) -> Value {
    json!({
        "site_id": site_id,
        "url": "http://x",
        "user_agent": "UA",
        "ip_address": "1.2.3.4"
    })
}

async fn create_invoice(app: &Router, site_id: &str) -> Value {
    let (status, invoice) = send(
        app,
        Method::POST,
        "/internal/generate_invoice",
        Some(invoice_body(site_id)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    invoice
}

async fn pay(app: &Router, payment_id: &str) -> Value {
    let (status, receipt) = send(
        app,
        Method::POST,
        "/api/public/payments/submit",
        Some(json!({ "payment_id": payment_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    receipt
}

async fn validate(app: &Router, token: &str, site_id: &str) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        "/internal/validate_jwt",
        Some(json!({ "token": token, "site_id": site_id })),
    )
    .await
}

#[tokio::test]
async fn health_endpoints_report_service_names() {
    let app = test_app();

    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "healthy", "service": "mock-backend"}));

    let (status, body) = send(&app, Method::GET, "/internal/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "healthy", "service": "internal-api"}));
}

#[tokio::test]
async fn enforcement_reports_seeded_values() {
    let app = test_app();

    for (site_id, expected) in [
        ("test-site.com", true),
        ("localhost", true),
        ("disabled-site.com", false),
        ("unknown.example", false),
    ] {
        let uri = format!("/internal/enforcement/{}", site_id);
        let (status, body) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "enforcement_enabled": expected,
                "site_details": {"site_id": site_id, "per_page_rate": 0.001}
            })
        );
    }
}

#[tokio::test]
async fn generated_invoice_has_full_shape() {
    let app = test_app();
    let invoice = create_invoice(&app, "test-site.com").await;

    assert_eq!(invoice["status"], "pending");
    assert_eq!(invoice["site_id"], "test-site.com");
    assert_eq!(invoice["url"], "http://x");
    assert_eq!(invoice["amount_xlm"], 0.001);
    assert_eq!(invoice["amount_stroops"], 1000);
    assert_eq!(invoice["user_agent"], "UA");
    assert_eq!(invoice["ip_address"], "1.2.3.4");
    assert_eq!(
        invoice["url_hash"].as_str().unwrap(),
        paygate_mock::digest::url_hash("http://x")
    );
    assert!(invoice["payment_id"].as_str().is_some());
    assert!(invoice["expires_at"].as_str().is_some());
}

#[tokio::test]
async fn invoice_ids_are_unique() {
    let app = test_app();
    let mut ids = HashSet::new();
    for _ in 0..20 {
        let invoice = create_invoice(&app, "localhost").await;
        assert!(ids.insert(invoice["payment_id"].as_str().unwrap().to_string()));
    }
}

#[tokio::test]
async fn missing_invoice_field_is_structured_400() {
    let app = test_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/internal/generate_invoice",
        Some(json!({"site_id": "test-site.com", "url": "http://x", "user_agent": "UA"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["type"], "bad_request");
    assert_eq!(body["error"]["status"], 400);
    assert_eq!(body["error"]["message"], "Missing required field: ip_address");

    let (_, dump) = send(&app, Method::GET, "/debug/payments", None).await;
    assert_eq!(dump["payments"], json!([]));
}

#[tokio::test]
async fn malformed_body_is_structured_400() {
    let app = test_app();
    let req = Request::builder()
        .method(Method::POST)
        .uri("/internal/generate_invoice")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"]["type"], "bad_request");
}

#[tokio::test]
async fn full_payment_flow() {
    let app = test_app();
    let invoice = create_invoice(&app, "test-site.com").await;
    let payment_id = invoice["payment_id"].as_str().unwrap();

    let receipt = pay(&app, payment_id).await;
    assert_eq!(receipt["verified"], true);
    assert_eq!(receipt["payment_id"], payment_id);
    assert!(receipt["tx_hash"].as_str().unwrap().starts_with("mock_tx_"));
    let token = receipt["access_token"].as_str().unwrap();
    assert!(token.starts_with("mock_jwt_"));

    let (status, ok) = validate(&app, token, "test-site.com").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ok["valid"], true);
    assert_eq!(ok["payment_id"], payment_id);
    assert_eq!(ok["site_id"], "test-site.com");
    assert_eq!(ok["expires_at"], receipt["expires_at"]);

    let (status, wrong_site) = validate(&app, token, "other.com").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        wrong_site,
        json!({"valid": false, "error": "Invalid or expired token"})
    );
}

#[tokio::test]
async fn submit_echoes_supplied_tx_hash() {
    let app = test_app();
    let invoice = create_invoice(&app, "localhost").await;

    let (status, receipt) = send(
        &app,
        Method::POST,
        "/api/public/payments/submit",
        Some(json!({"payment_id": invoice["payment_id"], "stellar_tx_hash": "deadbeef"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(receipt["tx_hash"], "deadbeef");
}

#[tokio::test]
async fn submit_unknown_payment_is_404() {
    let app = test_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/public/payments/submit",
        Some(json!({"payment_id": "does-not-exist"})),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"verified": false, "error": "Payment not found"}));
}

#[tokio::test]
async fn unknown_token_is_rejected_with_200() {
    let app = test_app();
    let (status, body) = validate(&app, "mock_jwt_forged", "test-site.com").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], false);

    let (status, body) = send(&app, Method::POST, "/internal/validate_jwt", Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], false);
}

#[tokio::test]
async fn non_string_token_is_rejected_with_200() {
    let app = test_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/internal/validate_jwt",
        Some(json!({"token": 123, "site_id": "test-site.com"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"valid": false, "error": "Invalid or expired token"})
    );
}

#[tokio::test]
async fn non_string_payment_id_is_404() {
    let app = test_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/public/payments/submit",
        Some(json!({"payment_id": 123})),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"verified": false, "error": "Payment not found"}));
}

#[tokio::test]
async fn non_string_tx_hash_is_generated() {
    let app = test_app();
    let invoice = create_invoice(&app, "localhost").await;

    let (status, receipt) = send(
        &app,
        Method::POST,
        "/api/public/payments/submit",
        Some(json!({"payment_id": invoice["payment_id"], "stellar_tx_hash": 7})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(receipt["tx_hash"].as_str().unwrap().starts_with("mock_tx_"));
}

#[tokio::test]
async fn unparsable_validate_body_is_structured_400() {
    let app = test_app();
    let req = Request::builder()
        .method(Method::POST)
        .uri("/internal/validate_jwt")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("[1, 2"))
        .unwrap();

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"]["type"], "bad_request");
}

#[tokio::test]
async fn payment_status_found_and_missing() {
    let app = test_app();
    let invoice = create_invoice(&app, "test-site.com").await;
    let uri = format!(
        "/api/public/payments/status/{}",
        invoice["payment_id"].as_str().unwrap()
    );

    pay(&app, invoice["payment_id"].as_str().unwrap()).await;

    let (status, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["found"], true);
    assert_eq!(body["payment"], invoice);
    assert_eq!(body["payment"]["status"], "pending");

    let (status, body) = send(&app, Method::GET, "/api/public/payments/status/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"found": false, "error": "Payment not found"}));
}

#[tokio::test]
async fn debug_dump_lists_payments_and_tokens() {
    let app = test_app();
    let first = create_invoice(&app, "test-site.com").await;
    let second = create_invoice(&app, "localhost").await;
    let receipt = pay(&app, first["payment_id"].as_str().unwrap()).await;
    let token = receipt["access_token"].as_str().unwrap();

    let (status, dump) = send(&app, Method::GET, "/debug/payments", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dump["payments"], json!([first, second]));
    assert_eq!(
        dump["jwts"][token],
        json!({
            "payment_id": first["payment_id"],
            "site_id": "test-site.com",
            "expires_at": receipt["expires_at"]
        })
    );
}

#[tokio::test]
async fn reset_clears_tables_and_invalidates_tokens() {
    let app = test_app();
    let invoice = create_invoice(&app, "test-site.com").await;
    let receipt = pay(&app, invoice["payment_id"].as_str().unwrap()).await;
    let token = receipt["access_token"].as_str().unwrap();

    let (status, body) = send(&app, Method::POST, "/debug/reset", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Mock data reset"}));

    let (_, dump) = send(&app, Method::GET, "/debug/payments", None).await;
    assert_eq!(dump, json!({"payments": [], "jwts": {}}));

    let (_, body) = validate(&app, token, "test-site.com").await;
    assert_eq!(body["valid"], false);
}

#[cfg(feature = "test-seams")]
mod expiry {
    use super::*;
    use paygate_mock::MockClock;

    #[tokio::test]
    async fn token_expires_after_one_hour() {
        let clock = Arc::new(MockClock::from_rfc3339("2025-01-15T12:00:00Z"));
        let service = MockService::new_with_clock(MockConfig::default(), clock.clone()).unwrap();
        let app = router(Arc::new(service));

        let invoice = create_invoice(&app, "test-site.com").await;
        assert_eq!(invoice["expires_at"], "2025-01-15T12:15:00Z");

        let receipt = pay(&app, invoice["payment_id"].as_str().unwrap()).await;
        assert_eq!(receipt["expires_at"], "2025-01-15T13:00:00Z");
        let token = receipt["access_token"].as_str().unwrap();

        clock.advance(chrono::Duration::minutes(59));
        let (_, body) = validate(&app, token, "test-site.com").await;
        assert_eq!(body["valid"], true);

        clock.advance(chrono::Duration::minutes(1));
        let (_, body) = validate(&app, token, "test-site.com").await;
        assert_eq!(body["valid"], false);
    }
}
