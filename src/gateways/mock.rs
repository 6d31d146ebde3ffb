use crate::domain::callback::CallbackEnvelope;
use crate::domain::payment::{
    CancelPaymentRequest, PaymentData, PaymentGatewayResponse, PaymentMethod, PaymentRequest,
    PaymentStatus, PaymentStatusResult,
};
use crate::gateways::signature::verify_hmac_sha256_hex;
use crate::gateways::{validate_payment_request, GatewayError, GatewayType, PaymentGateway};

pub const ALWAYS_SUCCESS: &str = "ALWAYS_SUCCESS";
pub const ALWAYS_FAILURE: &str = "ALWAYS_FAILURE";

pub struct MockGateway {
    pub base_url: String,
    pub behavior: String,
    secret: String,
}

impl MockGateway {
    pub fn new(behavior: &str, secret: impl Into<String>) -> Self {
        Self {
            base_url: "http://localhost:3000/mock".to_string(),
            behavior: behavior.to_string(),
            secret: secret.into(),
        }
    }

    fn failing(&self) -> bool {
        self.behavior == ALWAYS_FAILURE
    }

    fn rejection(&self) -> GatewayError {
        GatewayError::Provider {
            gateway: GatewayType::Mock,
            return_code: 2,
            message: Some("mock decline".to_string()),
        }
    }
}

#[async_trait::async_trait]
impl PaymentGateway for MockGateway {
    fn gateway_type(&self) -> GatewayType {
        GatewayType::Mock
    }

    async fn process_payment(
        &self,
        request: &PaymentRequest,
    ) -> Result<PaymentGatewayResponse, GatewayError> {
        validate_payment_request(request)?;
        if self.failing() {
            return Err(self.rejection());
        }

        let now = chrono::Utc::now();
        let id = format!("mock_txn_{}", uuid::Uuid::new_v4());
        Ok(PaymentGatewayResponse {
            payment_url: format!("{}/pay/{}", self.base_url, id),
            payment: PaymentData {
                id,
                order_code: request.order_code.clone(),
                amount: request.amount,
                status: PaymentStatus::Pending,
                method: PaymentMethod::BankTransfer,
                gateway_name: GatewayType::Mock.to_string(),
                description: "mock payment".to_string(),
                created_at: now,
                updated_at: now,
            },
            metadata: request.metadata.clone(),
        })
    }

    async fn handle_callback(&self, envelope: &CallbackEnvelope) -> Result<String, GatewayError> {
        match envelope {
            CallbackEnvelope::Mock(_) if self.failing() => Err(GatewayError::InvalidSignature),
            CallbackEnvelope::Mock(cb) => {
                if self.secret.is_empty()
                    || !verify_hmac_sha256_hex(&self.secret, &cb.order_code, &cb.mac)
                {
                    return Err(GatewayError::InvalidSignature);
                }
                if cb.order_code.trim().is_empty() {
                    return Err(GatewayError::MalformedIdentifier(cb.order_code.clone()));
                }
                Ok(cb.order_code.clone())
            }
            other => Err(GatewayError::UnsupportedCallback(other.gateway_type())),
        }
    }

    async fn cancel_payment(&self, request: &CancelPaymentRequest) -> Result<(), GatewayError> {
        if request.order_code.trim().is_empty() {
            return Err(GatewayError::InvalidRequest(
                "order_code must not be empty".to_string(),
            ));
        }
        if self.failing() {
            return Err(self.rejection());
        }
        Ok(())
    }

    async fn query_payment(&self, payment_id: &str) -> Result<PaymentStatusResult, GatewayError> {
        Ok(PaymentStatusResult {
            payment_id: payment_id.to_string(),
            status: if self.failing() {
                PaymentStatus::Failed
            } else {
                PaymentStatus::Completed
            },
            amount: None,
            provider_transaction_id: None,
            provider_message: Some(self.behavior.clone()),
        })
    }
}
