use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    PaymentPending,
    PaymentCompleted,
    Processing,
    Completed,
    Cancelled,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub code: String,
    pub status: OrderStatus,
    #[serde(default)]
    pub provider: Option<String>,
}

impl Order {
    pub fn is_payment_pending(&self) -> bool {
        self.status == OrderStatus::PaymentPending
    }
}
