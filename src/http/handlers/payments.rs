use crate::domain::payment::{CancelPaymentRequest, PaymentRequest, PaymentStatusRequest};
use crate::error::PaymentError;
use crate::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::warn;

pub async fn create_payment(
    State(state): State<AppState>,
    payload: Result<Json<PaymentRequest>, JsonRejection>,
) -> impl IntoResponse {
    let req = match decode(payload) {
        Ok(req) => req,
        Err(e) => return error_response(e),
    };
    match state.payment_service.process(req).await {
        Ok(resp) => (axum::http::StatusCode::OK, Json(resp)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn cancel_payment(
    State(state): State<AppState>,
    payload: Result<Json<CancelPaymentRequest>, JsonRejection>,
) -> impl IntoResponse {
    let req = match decode(payload) {
        Ok(req) => req,
        Err(e) => return error_response(e),
    };
    match state.payment_service.cancel(req).await {
        Ok(()) => (
            axum::http::StatusCode::OK,
            Json(serde_json::json!({"cancelled": true})),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn payment_status(
    State(state): State<AppState>,
    payload: Result<Json<PaymentStatusRequest>, JsonRejection>,
) -> impl IntoResponse {
    let req = match decode(payload) {
        Ok(req) => req,
        Err(e) => return error_response(e),
    };
    match state.payment_service.payment_status(req).await {
        Ok(resp) => (axum::http::StatusCode::OK, Json(resp)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let providers: Vec<String> = state
        .payment_service
        .registry
        .providers()
        .into_iter()
        .map(|p| p.to_string())
        .collect();
    (
        axum::http::StatusCode::OK,
        Json(serde_json::json!({"status": "ok", "gateways": providers})),
    )
}

pub(crate) fn decode<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, PaymentError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        warn!(error = %rejection, "rejected request body");
        PaymentError::InvalidInput(rejection.body_text())
    })
}

pub(crate) fn error_response(e: PaymentError) -> Response {
    (e.status_code(), Json(e.envelope())).into_response()
}
