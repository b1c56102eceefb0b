//! Axum router exposing the mock service over HTTP.
//!
//! Handlers are thin: they extract the body, call into [`MockService`], and
//! pick the status code. Not-found and token-rejection bodies keep the
//! `found`/`verified`/`valid` flag shape the proxy parses; only unreadable
//! bodies and missing invoice fields use the structured error body.

use crate::protocol::models::{
    DebugSnapshot, EnforcementResponse, HealthResponse, Invoice, InvoiceRequest, ResetResponse,
    StatusResponse, SubmitRequest, SubmitResponse, ValidateRequest, ValidationResponse,
};
use crate::service::MockService;
use crate::MockError;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Method and path of every route, in the order they are registered.
pub const ENDPOINTS: &[(&str, &str)] = &[
    ("GET", "/health"),
    ("GET", "/internal/health"),
    ("GET", "/internal/enforcement/:site_id"),
    ("POST", "/internal/generate_invoice"),
    ("POST", "/internal/validate_jwt"),
    ("POST", "/api/public/payments/submit"),
    ("GET", "/api/public/payments/status/:payment_id"),
    ("GET", "/debug/payments"),
    ("POST", "/debug/reset"),
];

/// Build the router over a shared service instance.
pub fn router(service: Arc<MockService>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/internal/health", get(internal_health))
        .route("/internal/enforcement/:site_id", get(check_enforcement))
        .route("/internal/generate_invoice", post(generate_invoice))
        .route("/internal/validate_jwt", post(validate_jwt))
        .route("/api/public/payments/submit", post(submit_payment))
        .route("/api/public/payments/status/:payment_id", get(payment_status))
        .route("/debug/payments", get(debug_payments))
        .route("/debug/reset", post(debug_reset))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

/// Serve the router on an already-bound listener until `shutdown` resolves.
pub async fn serve<F>(
    listener: TcpListener,
    service: Arc<MockService>,
    shutdown: F,
) -> Result<(), MockError>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "paygate-mock listening");
    }

    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| MockError::Transport(e.to_string()))
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, MockError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| MockError::MalformedBody(rejection.body_text()))
}

async fn health(State(service): State<Arc<MockService>>) -> Json<HealthResponse> {
    Json(service.health())
}

async fn internal_health(State(service): State<Arc<MockService>>) -> Json<HealthResponse> {
    Json(service.internal_health())
}

async fn check_enforcement(
    State(service): State<Arc<MockService>>,
    Path(site_id): Path<String>,
) -> Json<EnforcementResponse> {
    Json(service.check_enforcement(&site_id))
}

async fn generate_invoice(
    State(service): State<Arc<MockService>>,
    payload: Result<Json<InvoiceRequest>, JsonRejection>,
) -> Result<Json<Invoice>, MockError> {
    let request = body(payload)?;
    Ok(Json(service.generate_invoice(request)?))
}

async fn validate_jwt(
    State(service): State<Arc<MockService>>,
    payload: Result<Json<ValidateRequest>, JsonRejection>,
) -> Result<Json<ValidationResponse>, MockError> {
    let request = body(payload)?;
    Ok(Json(service.validate_token(request)))
}

async fn submit_payment(
    State(service): State<Arc<MockService>>,
    payload: Result<Json<SubmitRequest>, JsonRejection>,
) -> Result<Response, MockError> {
    let request = body(payload)?;
    match service.submit_payment(request) {
        Ok(receipt) => Ok(Json(SubmitResponse::verified(receipt)).into_response()),
        Err(MockError::PaymentNotFound) => {
            Ok((StatusCode::NOT_FOUND, Json(SubmitResponse::not_found())).into_response())
        }
        Err(e) => Err(e),
    }
}

async fn payment_status(
    State(service): State<Arc<MockService>>,
    Path(payment_id): Path<String>,
) -> Response {
    match service.payment_status(&payment_id) {
        Ok(invoice) => Json(StatusResponse::found(invoice)).into_response(),
        Err(_) => (StatusCode::NOT_FOUND, Json(StatusResponse::not_found())).into_response(),
    }
}

async fn debug_payments(State(service): State<Arc<MockService>>) -> Json<DebugSnapshot> {
    Json(service.snapshot())
}

async fn debug_reset(State(service): State<Arc<MockService>>) -> Json<ResetResponse> {
    Json(service.reset())
}
