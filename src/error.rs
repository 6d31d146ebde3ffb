use crate::domain::payment::{ErrorEnvelope, ErrorPayload};
use crate::gateways::{GatewayError, GatewayType};
use axum::http::StatusCode;
use thiserror::Error;

const INTERNAL_MESSAGE: &str = "internal server error";

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("required field is missing: {0}")]
    RequiredField(&'static str),
    #[error("order not found")]
    OrderNotFound,
    #[error("order is not pending")]
    OrderNotPending,
    #[error("invalid gateway: {0}")]
    InvalidGateway(String),
    #[error("gateway {0} already registered")]
    GatewayAlreadyRegistered(GatewayType),
    #[error("invalid callback signature")]
    InvalidSignature,
    #[error("malformed callback payload: {0}")]
    MalformedPayload(String),
    #[error("malformed transaction identifier: {0}")]
    MalformedIdentifier(String),
    #[error("internal error: {0:#}")]
    Internal(#[source] anyhow::Error),
}

impl PaymentError {
    pub fn internal(e: impl Into<anyhow::Error>) -> Self {
        PaymentError::Internal(e.into())
    }

    /// Expected outcomes, logged at warn and returned to the caller as-is.
    pub fn is_warn(&self) -> bool {
        !matches!(
            self,
            PaymentError::Internal(_) | PaymentError::GatewayAlreadyRegistered(_)
        )
    }

    pub fn code(&self) -> &'static str {
        match self {
            PaymentError::InvalidInput(_) => "INVALID_INPUT",
            PaymentError::RequiredField(_) => "REQUIRED_FIELD",
            PaymentError::OrderNotFound => "ORDER_NOT_FOUND",
            PaymentError::OrderNotPending => "ORDER_NOT_PENDING",
            PaymentError::InvalidGateway(_) => "INVALID_GATEWAY",
            PaymentError::GatewayAlreadyRegistered(_) => "GATEWAY_ALREADY_REGISTERED",
            PaymentError::InvalidSignature => "INVALID_SIGNATURE",
            PaymentError::MalformedPayload(_) => "MALFORMED_PAYLOAD",
            PaymentError::MalformedIdentifier(_) => "MALFORMED_IDENTIFIER",
            PaymentError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            PaymentError::InvalidInput(_)
            | PaymentError::RequiredField(_)
            | PaymentError::InvalidGateway(_)
            | PaymentError::MalformedPayload(_)
            | PaymentError::MalformedIdentifier(_) => StatusCode::BAD_REQUEST,
            PaymentError::OrderNotFound => StatusCode::NOT_FOUND,
            PaymentError::OrderNotPending => StatusCode::PRECONDITION_FAILED,
            PaymentError::InvalidSignature => StatusCode::UNAUTHORIZED,
            PaymentError::GatewayAlreadyRegistered(_) | PaymentError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Caller-facing body. Internal detail never leaves the process.
    pub fn envelope(&self) -> ErrorEnvelope {
        let message = if self.is_warn() {
            self.to_string()
        } else {
            INTERNAL_MESSAGE.to_string()
        };
        ErrorEnvelope {
            error: ErrorPayload {
                code: self.code().to_string(),
                message,
                details: None,
            },
        }
    }

    pub fn internal_envelope() -> ErrorEnvelope {
        ErrorEnvelope {
            error: ErrorPayload {
                code: "INTERNAL_ERROR".to_string(),
                message: INTERNAL_MESSAGE.to_string(),
                details: None,
            },
        }
    }
}

/// Callback verification failures keep their kind, everything else is internal.
impl From<GatewayError> for PaymentError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::InvalidSignature => PaymentError::InvalidSignature,
            GatewayError::MalformedPayload(source) => {
                PaymentError::MalformedPayload(source.to_string())
            }
            GatewayError::MalformedIdentifier(id) => PaymentError::MalformedIdentifier(id),
            other => PaymentError::Internal(other.into()),
        }
    }
}
