use crate::domain::callback::CallbackEnvelope;
use crate::domain::payment::{
    CancelPaymentRequest, PaymentData, PaymentGatewayResponse, PaymentMethod, PaymentRequest,
    PaymentStatus, PaymentStatusResult,
};
use crate::gateways::signature::{hmac_sha256_hex, verify_hmac_sha256_hex};
use crate::gateways::{validate_payment_request, GatewayError, GatewayType, PaymentGateway};
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub const SANDBOX_CREATE_URL: &str = "https://sb-openapi.zalopay.vn/v2/create";
pub const SANDBOX_QUERY_URL: &str = "https://sb-openapi.zalopay.vn/v2/query";
pub const CALLBACK_PATH: &str = "/zalopay/callback";
pub const DEFAULT_RETURN_URL: &str = "http://localhost:3000/payment/success";

const RETURN_CODE_SUCCESS: i64 = 1;
const RETURN_CODE_PROCESSING: i64 = 3;
const DEFAULT_DESCRIPTION: &str = "E-Commerce";
// ZaloPay dates app_trans_id in Vietnam local time.
const PROVIDER_UTC_OFFSET_SECS: i32 = 7 * 3600;

#[derive(Debug, Clone)]
pub struct ZalopayConfig {
    pub app_id: i64,
    pub key1: String,
    pub key2: String,
    pub host: String,
    pub create_url: String,
    pub query_url: String,
    pub expire_duration_seconds: i64,
    /// Redirect target when the request carries no `return_url`.
    pub default_return_url: String,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ZalopayOrderRequest {
    pub app_id: i64,
    pub app_user: String,
    pub app_time: i64,
    pub amount: i64,
    pub app_trans_id: String,
    pub embed_data: String,
    pub expire_duration_seconds: i64,
    pub description: String,
    pub bank_code: String,
    pub callback_url: String,
    pub item: String,
    pub mac: String,
}

impl ZalopayOrderRequest {
    /// Pipe-joined fields covered by the order mac, in the order ZaloPay expects.
    pub fn mac_input(&self) -> String {
        format!(
            "{}|{}|{}|{}|{}|{}|{}",
            self.app_id,
            self.app_trans_id,
            self.app_user,
            self.amount,
            self.app_time,
            self.embed_data,
            self.item
        )
    }
}

#[derive(Debug, Deserialize)]
struct ZalopayOrderResponse {
    return_code: i64,
    #[serde(default)]
    return_message: Option<String>,
    #[serde(default)]
    sub_return_code: Option<i64>,
    #[serde(default)]
    order_url: String,
}

#[derive(Debug, Serialize)]
struct ZalopayQueryRequest<'a> {
    app_id: i64,
    app_trans_id: &'a str,
    mac: String,
}

#[derive(Debug, Deserialize)]
struct ZalopayQueryResponse {
    return_code: i64,
    #[serde(default)]
    return_message: Option<String>,
    #[serde(default)]
    is_processing: Option<bool>,
    #[serde(default)]
    amount: Option<i64>,
    #[serde(default)]
    zp_trans_id: Option<i64>,
}

#[derive(Debug, Serialize)]
struct EmbedData {
    #[serde(rename = "redirecturl")]
    redirect_url: String,
}

/// Decoded `data` field of a verified callback.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionData {
    pub app_trans_id: String,
    #[serde(default)]
    pub zp_trans_id: Option<i64>,
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub server_time: Option<i64>,
}

pub struct ZalopayGateway {
    pub config: ZalopayConfig,
    pub client: reqwest::Client,
    pub clock: fn() -> DateTime<Utc>,
}

impl ZalopayGateway {
    pub fn new(config: ZalopayConfig, client: reqwest::Client) -> Self {
        Self {
            config,
            client,
            clock: Utc::now,
        }
    }

    pub fn build_order_request(
        &self,
        request: &PaymentRequest,
        now: DateTime<Utc>,
    ) -> Result<ZalopayOrderRequest, GatewayError> {
        let return_url = match request.return_url() {
            Some(url) => url,
            None => {
                info!(
                    order_code = %request.order_code,
                    fallback = %self.config.default_return_url,
                    "no return_url in metadata, using default"
                );
                self.config.default_return_url.as_str()
            }
        };
        let embed_data = serde_json::to_string(&EmbedData {
            redirect_url: redirect_url(return_url, &request.order_code),
        })
        .map_err(GatewayError::Encode)?;
        let item = serde_json::to_string(&Vec::<serde_json::Value>::new())
            .map_err(GatewayError::Encode)?;

        let mut order = ZalopayOrderRequest {
            app_id: self.config.app_id,
            app_user: request.user_id.clone(),
            app_time: now.timestamp_millis(),
            amount: request.amount,
            app_trans_id: app_trans_id(now, &request.order_code),
            embed_data,
            expire_duration_seconds: self.config.expire_duration_seconds,
            description: DEFAULT_DESCRIPTION.to_string(),
            bank_code: String::new(),
            callback_url: format!("{}{}", self.config.host.trim_end_matches('/'), CALLBACK_PATH),
            item,
            mac: String::new(),
        };
        order.mac = hmac_sha256_hex(&self.config.key1, &order.mac_input());
        Ok(order)
    }

    pub fn verify_callback(&self, data: &str, mac: &str) -> Result<TransactionData, GatewayError> {
        if !verify_hmac_sha256_hex(&self.config.key2, data, mac) {
            return Err(GatewayError::InvalidSignature);
        }
        serde_json::from_str(data).map_err(GatewayError::MalformedPayload)
    }

    fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.config.timeout_ms)
    }
}

#[async_trait::async_trait]
impl PaymentGateway for ZalopayGateway {
    fn gateway_type(&self) -> GatewayType {
        GatewayType::Zalopay
    }

    async fn process_payment(
        &self,
        request: &PaymentRequest,
    ) -> Result<PaymentGatewayResponse, GatewayError> {
        validate_payment_request(request)?;

        let now = (self.clock)();
        let order = self.build_order_request(request, now)?;
        debug!(app_trans_id = %order.app_trans_id, amount = order.amount, "creating zalopay order");

        let resp: ZalopayOrderResponse = self
            .client
            .post(&self.config.create_url)
            .json(&order)
            .timeout(self.timeout())
            .send()
            .await?
            .json()
            .await?;

        if resp.return_code != RETURN_CODE_SUCCESS {
            warn!(
                app_trans_id = %order.app_trans_id,
                return_code = resp.return_code,
                sub_return_code = ?resp.sub_return_code,
                "zalopay rejected order"
            );
            return Err(GatewayError::Provider {
                gateway: GatewayType::Zalopay,
                return_code: resp.return_code,
                message: resp.return_message,
            });
        }

        Ok(PaymentGatewayResponse {
            payment_url: resp.order_url,
            payment: PaymentData {
                id: order.app_trans_id,
                order_code: request.order_code.clone(),
                amount: order.amount,
                status: PaymentStatus::Pending,
                method: PaymentMethod::BankTransfer,
                gateway_name: GatewayType::Zalopay.to_string(),
                description: order.description,
                created_at: now,
                updated_at: now,
            },
            metadata: request.metadata.clone(),
        })
    }

    async fn handle_callback(&self, envelope: &CallbackEnvelope) -> Result<String, GatewayError> {
        let callback = match envelope {
            CallbackEnvelope::Zalopay(callback) => callback,
            other => return Err(GatewayError::UnsupportedCallback(other.gateway_type())),
        };

        let trans = self.verify_callback(&callback.data, &callback.mac)?;
        let order_code = order_code_from_trans_id(&trans.app_trans_id)?;
        info!(
            app_trans_id = %trans.app_trans_id,
            zp_trans_id = ?trans.zp_trans_id,
            amount = ?trans.amount,
            "zalopay callback verified"
        );
        Ok(order_code.to_string())
    }

    async fn cancel_payment(&self, request: &CancelPaymentRequest) -> Result<(), GatewayError> {
        if request.order_code.trim().is_empty() {
            return Err(GatewayError::InvalidRequest(
                "order_code must not be empty".to_string(),
            ));
        }
        // ZaloPay exposes no cancellation endpoint; unpaid orders expire on their own.
        debug!(order_code = %request.order_code, "zalopay cancel acknowledged locally");
        Ok(())
    }

    async fn query_payment(&self, payment_id: &str) -> Result<PaymentStatusResult, GatewayError> {
        if payment_id.trim().is_empty() {
            return Err(GatewayError::InvalidRequest(
                "payment_id must not be empty".to_string(),
            ));
        }

        let body = ZalopayQueryRequest {
            app_id: self.config.app_id,
            app_trans_id: payment_id,
            mac: hmac_sha256_hex(&self.config.key1, &query_mac_input(&self.config, payment_id)),
        };

        let resp: ZalopayQueryResponse = self
            .client
            .post(&self.config.query_url)
            .json(&body)
            .timeout(self.timeout())
            .send()
            .await?
            .json()
            .await?;

        Ok(PaymentStatusResult {
            payment_id: payment_id.to_string(),
            status: query_status(resp.return_code, resp.is_processing.unwrap_or(false)),
            amount: resp.amount,
            provider_transaction_id: resp.zp_trans_id.map(|id| id.to_string()),
            provider_message: resp.return_message,
        })
    }
}

/// `YYMMDD_<order_code>`, dated in the provider's timezone.
pub fn app_trans_id(now: DateTime<Utc>, order_code: &str) -> String {
    let date = FixedOffset::east_opt(PROVIDER_UTC_OFFSET_SECS)
        .map(|offset| now.with_timezone(&offset).format("%y%m%d").to_string())
        .unwrap_or_else(|| now.format("%y%m%d").to_string());
    format!("{}_{}", date, order_code)
}

pub fn redirect_url(return_url: &str, order_code: &str) -> String {
    let separator = if return_url.contains('?') { '&' } else { '?' };
    format!("{}{}bookingCode={}", return_url, separator, order_code)
}

pub fn order_code_from_trans_id(app_trans_id: &str) -> Result<&str, GatewayError> {
    match app_trans_id.split_once('_') {
        Some((date, order_code)) if !date.is_empty() && !order_code.is_empty() => Ok(order_code),
        _ => Err(GatewayError::MalformedIdentifier(app_trans_id.to_string())),
    }
}

fn query_mac_input(config: &ZalopayConfig, app_trans_id: &str) -> String {
    format!("{}|{}|{}", config.app_id, app_trans_id, config.key1)
}

fn query_status(return_code: i64, is_processing: bool) -> PaymentStatus {
    match return_code {
        RETURN_CODE_SUCCESS => PaymentStatus::Completed,
        RETURN_CODE_PROCESSING => PaymentStatus::Pending,
        _ if is_processing => PaymentStatus::Pending,
        _ => PaymentStatus::Failed,
    }
}
