use crate::gateways::zalopay::{
    ZalopayConfig, DEFAULT_RETURN_URL, SANDBOX_CREATE_URL, SANDBOX_QUERY_URL,
};
use crate::service::payment_service::POST_PAYMENT_TASK_QUEUE;
use anyhow::{bail, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub order_svc_url: String,
    pub workflow_engine_url: String,
    pub post_payment_task_queue: String,
    pub outbound_timeout_ms: u64,
    pub log_format: LogFormat,
    pub zalopay_enabled: bool,
    pub mock_gateway_enabled: bool,
    pub mock_gateway_secret: String,
    pub zalopay: ZalopayConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let outbound_timeout_ms = env_parse("OUTBOUND_TIMEOUT_MS", 5000);
        Self {
            bind_addr: env_or("BIND_ADDR", "0.0.0.0:3000"),
            order_svc_url: env_or("ORDER_SVC_URL", "http://localhost:50054"),
            workflow_engine_url: env_or("WORKFLOW_ENGINE_URL", "http://localhost:7243"),
            post_payment_task_queue: env_or("POST_PAYMENT_TASK_QUEUE", POST_PAYMENT_TASK_QUEUE),
            outbound_timeout_ms,
            log_format: match env_or("LOG_FORMAT", "pretty").to_ascii_lowercase().as_str() {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
            zalopay_enabled: env_parse("ZALOPAY_ENABLED", true),
            mock_gateway_enabled: env_parse("ENABLE_MOCK_GATEWAY", false),
            mock_gateway_secret: std::env::var("MOCK_GATEWAY_SECRET").unwrap_or_default(),
            zalopay: ZalopayConfig {
                app_id: env_parse("ZALOPAY_APP_ID", 2553),
                key1: std::env::var("ZALOPAY_KEY1").unwrap_or_default(),
                key2: std::env::var("ZALOPAY_KEY2").unwrap_or_default(),
                host: env_or("ZALOPAY_HOST", "http://localhost:3000"),
                create_url: env_or("ZALOPAY_CREATE_URL", SANDBOX_CREATE_URL),
                query_url: env_or("ZALOPAY_QUERY_URL", SANDBOX_QUERY_URL),
                expire_duration_seconds: env_parse("ZALOPAY_EXPIRE_SECS", 900),
                default_return_url: env_or("ZALOPAY_DEFAULT_RETURN_URL", DEFAULT_RETURN_URL),
                timeout_ms: outbound_timeout_ms,
            },
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.outbound_timeout_ms == 0 {
            bail!("OUTBOUND_TIMEOUT_MS must be > 0");
        }
        if self.post_payment_task_queue.trim().is_empty() {
            bail!("POST_PAYMENT_TASK_QUEUE must not be empty");
        }
        if self.zalopay_enabled {
            if self.zalopay.key1.is_empty() || self.zalopay.key2.is_empty() {
                bail!("ZALOPAY_KEY1 and ZALOPAY_KEY2 are required when zalopay is enabled");
            }
            // request signing and callback verification must use distinct secrets
            if self.zalopay.key1 == self.zalopay.key2 {
                bail!("ZALOPAY_KEY1 and ZALOPAY_KEY2 must differ");
            }
        }
        if self.mock_gateway_enabled && self.mock_gateway_secret.is_empty() {
            bail!("MOCK_GATEWAY_SECRET is required when the mock gateway is enabled");
        }
        if !self.zalopay_enabled && !self.mock_gateway_enabled {
            bail!("no payment gateway enabled");
        }
        Ok(())
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse::<T>().ok())
        .unwrap_or(default)
}
