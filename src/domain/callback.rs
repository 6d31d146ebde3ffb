use crate::gateways::GatewayType;
use serde::{Deserialize, Serialize};

pub const CALLBACK_ACK_SUCCESS: i64 = 1;
pub const CALLBACK_ACK_RETRY: i64 = 0;
pub const CALLBACK_ACK_REJECTED: i64 = -1;

/// Raw callback body as posted by ZaloPay. `data` is the signed JSON string, `mac` its hex HMAC.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZalopayCallback {
    pub data: String,
    pub mac: String,
}

/// `mac` is the hex HMAC-SHA256 of `order_code` under the mock gateway secret.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockCallback {
    pub order_code: String,
    #[serde(default)]
    pub mac: String,
}

/// Provider callbacks, typed at the transport boundary before reaching a gateway.
#[derive(Debug, Clone)]
pub enum CallbackEnvelope {
    Zalopay(ZalopayCallback),
    Mock(MockCallback),
}

impl CallbackEnvelope {
    pub fn gateway_type(&self) -> GatewayType {
        match self {
            CallbackEnvelope::Zalopay(_) => GatewayType::Zalopay,
            CallbackEnvelope::Mock(_) => GatewayType::Mock,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CallbackAck {
    pub return_code: i64,
    pub return_message: String,
}

impl CallbackAck {
    pub fn success() -> Self {
        Self {
            return_code: CALLBACK_ACK_SUCCESS,
            return_message: "success".to_string(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            return_code: CALLBACK_ACK_REJECTED,
            return_message: message.into(),
        }
    }

    pub fn retry(message: impl Into<String>) -> Self {
        Self {
            return_code: CALLBACK_ACK_RETRY,
            return_message: message.into(),
        }
    }
}
