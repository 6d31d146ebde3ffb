use crate::domain::order::Order;
use anyhow::{anyhow, bail, Result};
use reqwest::StatusCode;
use serde::Deserialize;

#[async_trait::async_trait]
pub trait OrderLookup: Send + Sync {
    async fn find_one(&self, order_code: &str) -> Result<Option<Order>>;
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FindOneResponse {
    // Bare must come first: a missing `order` key would otherwise decode as Wrapped(None).
    Bare(Order),
    Wrapped { order: Option<Order> },
}

/// Order service reached over HTTP: `GET {base_url}/orders/{code}`.
#[derive(Clone)]
pub struct HttpOrderClient {
    pub base_url: String,
    pub timeout_ms: u64,
    pub client: reqwest::Client,
}

#[async_trait::async_trait]
impl OrderLookup for HttpOrderClient {
    async fn find_one(&self, order_code: &str) -> Result<Option<Order>> {
        let mut url = reqwest::Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("order service url cannot be a base: {}", self.base_url))?
            .pop_if_empty()
            .push("orders")
            .push(order_code);

        let resp = self
            .client
            .get(url)
            .timeout(std::time::Duration::from_millis(self.timeout_ms))
            .send()
            .await?;

        match resp.status() {
            StatusCode::NOT_FOUND => Ok(None),
            s if s.is_success() => match resp.json::<FindOneResponse>().await? {
                FindOneResponse::Wrapped { order } => Ok(order),
                FindOneResponse::Bare(order) => Ok(Some(order)),
            },
            s => {
                let body = resp.text().await.unwrap_or_default();
                bail!(
                    "order service returned HTTP_{}: {}",
                    s.as_u16(),
                    body.chars().take(200).collect::<String>()
                )
            }
        }
    }
}
