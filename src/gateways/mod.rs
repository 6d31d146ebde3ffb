use crate::domain::callback::CallbackEnvelope;
use crate::domain::payment::{
    CancelPaymentRequest, PaymentGatewayResponse, PaymentRequest, PaymentStatusResult,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub mod mock;
pub mod registry;
pub mod signature;
pub mod zalopay;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GatewayType {
    Zalopay,
    Mock,
}

impl GatewayType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GatewayType::Zalopay => "ZALOPAY",
            GatewayType::Mock => "MOCK",
        }
    }
}

impl fmt::Display for GatewayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unsupported gateway type: {0}")]
pub struct UnknownGatewayType(pub String);

impl FromStr for GatewayType {
    type Err = UnknownGatewayType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ZALOPAY" => Ok(GatewayType::Zalopay),
            "MOCK" => Ok(GatewayType::Mock),
            _ => Err(UnknownGatewayType(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("failed to send request: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{gateway} error: return_code={return_code}")]
    Provider {
        gateway: GatewayType,
        return_code: i64,
        message: Option<String>,
    },
    #[error("invalid mac")]
    InvalidSignature,
    #[error("failed to parse transaction data: {0}")]
    MalformedPayload(#[source] serde_json::Error),
    #[error("invalid app_trans_id format: {0}")]
    MalformedIdentifier(String),
    #[error("{0} callback cannot be handled by this gateway")]
    UnsupportedCallback(GatewayType),
    #[error("failed to encode request: {0}")]
    Encode(#[source] serde_json::Error),
}

#[async_trait::async_trait]
pub trait PaymentGateway: Send + Sync {
    fn gateway_type(&self) -> GatewayType;

    async fn process_payment(
        &self,
        request: &PaymentRequest,
    ) -> Result<PaymentGatewayResponse, GatewayError>;

    /// Verifies the callback and returns the order code it settles.
    async fn handle_callback(&self, envelope: &CallbackEnvelope) -> Result<String, GatewayError>;

    async fn cancel_payment(&self, request: &CancelPaymentRequest) -> Result<(), GatewayError>;

    async fn query_payment(&self, payment_id: &str) -> Result<PaymentStatusResult, GatewayError>;
}

pub(crate) fn validate_payment_request(request: &PaymentRequest) -> Result<(), GatewayError> {
    if request.order_code.trim().is_empty() {
        return Err(GatewayError::InvalidRequest(
            "order_code must not be empty".to_string(),
        ));
    }
    if request.amount <= 0 {
        return Err(GatewayError::InvalidRequest("amount must be > 0".to_string()));
    }
    Ok(())
}
