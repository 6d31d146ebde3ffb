use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const RETURN_URL_KEY: &str = "return_url";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    BankTransfer,
    CreditCard,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaymentRequest {
    pub order_code: String,
    pub amount: i64,
    pub user_id: String,
    pub provider: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl PaymentRequest {
    pub fn return_url(&self) -> Option<&str> {
        self.metadata
            .get(RETURN_URL_KEY)
            .map(|url| url.trim())
            .filter(|url| !url.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentData {
    pub id: String,
    pub order_code: String,
    pub amount: i64,
    pub status: PaymentStatus,
    pub method: PaymentMethod,
    pub gateway_name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentGatewayResponse {
    pub payment_url: String,
    pub payment: PaymentData,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CancelPaymentRequest {
    pub order_code: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaymentStatusRequest {
    pub payment_id: String,
    pub provider: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentStatusResult {
    pub payment_id: String,
    pub status: PaymentStatus,
    pub amount: Option<i64>,
    pub provider_transaction_id: Option<String>,
    pub provider_message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorPayload,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
}
