use crate::domain::callback::{CallbackAck, CallbackEnvelope, MockCallback, ZalopayCallback};
use crate::error::PaymentError;
use crate::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::warn;

/// ZaloPay expects HTTP 200 with a `return_code`; 0 asks it to retry the callback.
pub async fn zalopay_callback(
    State(state): State<AppState>,
    payload: Result<Json<ZalopayCallback>, JsonRejection>,
) -> Response {
    let Json(callback) = match payload {
        Ok(body) => body,
        Err(rejection) => {
            warn!(error = %rejection, "failed to decode zalopay callback");
            return (
                StatusCode::BAD_REQUEST,
                Json(CallbackAck::rejected("bad request")),
            )
                .into_response();
        }
    };

    let ack = match state
        .payment_service
        .handle_callback(CallbackEnvelope::Zalopay(callback))
        .await
    {
        Ok(_) => CallbackAck::success(),
        Err(PaymentError::InvalidSignature) => CallbackAck::rejected("mac not equal"),
        Err(e) if e.is_warn() => CallbackAck::rejected(e.to_string()),
        Err(_) => CallbackAck::retry("internal server error"),
    };
    (StatusCode::OK, Json(ack)).into_response()
}

pub async fn mock_callback(
    State(state): State<AppState>,
    payload: Result<Json<MockCallback>, JsonRejection>,
) -> Response {
    let callback = match super::payments::decode(payload) {
        Ok(callback) => callback,
        Err(e) => return super::payments::error_response(e),
    };
    match state
        .payment_service
        .handle_callback(CallbackEnvelope::Mock(callback))
        .await
    {
        Ok(handle) => (StatusCode::OK, Json(handle)).into_response(),
        Err(e) => super::payments::error_response(e),
    }
}
