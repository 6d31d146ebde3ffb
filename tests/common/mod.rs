#![allow(dead_code)]

use payment_svc::clients::order::OrderLookup;
use payment_svc::clients::workflow::{
    OrderWorkflowParams, StartWorkflowOptions, WorkflowEngine, WorkflowHandle,
};
use payment_svc::domain::callback::CallbackEnvelope;
use payment_svc::domain::order::{Order, OrderStatus};
use payment_svc::domain::payment::{
    CancelPaymentRequest, PaymentData, PaymentGatewayResponse, PaymentMethod, PaymentRequest,
    PaymentStatus, PaymentStatusResult,
};
use payment_svc::gateways::registry::GatewayRegistry;
use payment_svc::gateways::zalopay::{ZalopayConfig, ZalopayGateway};
use payment_svc::gateways::{GatewayError, GatewayType, PaymentGateway};
use payment_svc::service::payment_service::{PaymentService, POST_PAYMENT_TASK_QUEUE};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const KEY1: &str = "test-key1-request-signing";
pub const KEY2: &str = "test-key2-callback-verification";
pub const MOCK_SECRET: &str = "test-mock-callback-secret";

#[derive(Default)]
pub struct InMemoryOrders {
    pub orders: Mutex<HashMap<String, Order>>,
    pub fail: bool,
    pub lookups: AtomicUsize,
}

impl InMemoryOrders {
    pub fn with(code: &str, status: OrderStatus, provider: Option<&str>) -> Self {
        let orders = Self::default();
        orders.orders.lock().unwrap().insert(
            code.to_string(),
            Order {
                code: code.to_string(),
                status,
                provider: provider.map(str::to_string),
            },
        );
        orders
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

#[async_trait::async_trait]
impl OrderLookup for InMemoryOrders {
    async fn find_one(&self, order_code: &str) -> anyhow::Result<Option<Order>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            anyhow::bail!("order service unavailable");
        }
        Ok(self.orders.lock().unwrap().get(order_code).cloned())
    }
}

/// Order lookup that blows up mid-request.
pub struct PanickingOrders;

pub const PANIC_DETAIL: &str = "order cache corrupted: slot 7";

#[async_trait::async_trait]
impl OrderLookup for PanickingOrders {
    async fn find_one(&self, _order_code: &str) -> anyhow::Result<Option<Order>> {
        panic!("{}", PANIC_DETAIL);
    }
}

#[derive(Default)]
pub struct RecordingWorkflows {
    pub started: Mutex<Vec<(StartWorkflowOptions, String, OrderWorkflowParams)>>,
    pub fail: bool,
}

#[async_trait::async_trait]
impl WorkflowEngine for RecordingWorkflows {
    async fn execute_workflow(
        &self,
        options: &StartWorkflowOptions,
        workflow_type: &str,
        params: &OrderWorkflowParams,
    ) -> anyhow::Result<WorkflowHandle> {
        if self.fail {
            anyhow::bail!("workflow engine unavailable");
        }
        self.started.lock().unwrap().push((
            options.clone(),
            workflow_type.to_string(),
            params.clone(),
        ));
        Ok(WorkflowHandle {
            workflow_id: options.id.clone(),
            run_id: "run-1".to_string(),
        })
    }
}

/// Gateway that counts calls and answers with a fixed redirect URL.
pub struct RecordingGateway {
    pub kind: GatewayType,
    pub process_calls: AtomicUsize,
    pub cancel_calls: AtomicUsize,
    pub fail: bool,
}

impl RecordingGateway {
    pub fn new(kind: GatewayType) -> Self {
        Self {
            kind,
            process_calls: AtomicUsize::new(0),
            cancel_calls: AtomicUsize::new(0),
            fail: false,
        }
    }

    pub fn failing(kind: GatewayType) -> Self {
        Self {
            fail: true,
            ..Self::new(kind)
        }
    }
}

#[async_trait::async_trait]
impl PaymentGateway for RecordingGateway {
    fn gateway_type(&self) -> GatewayType {
        self.kind
    }

    async fn process_payment(
        &self,
        request: &PaymentRequest,
    ) -> Result<PaymentGatewayResponse, GatewayError> {
        self.process_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(GatewayError::Provider {
                gateway: self.kind,
                return_code: 2,
                message: Some("declined".to_string()),
            });
        }
        let now = chrono::Utc::now();
        Ok(PaymentGatewayResponse {
            payment_url: format!("https://pay.example/{}", request.order_code),
            payment: PaymentData {
                id: format!("250101_{}", request.order_code),
                order_code: request.order_code.clone(),
                amount: request.amount,
                status: PaymentStatus::Pending,
                method: PaymentMethod::BankTransfer,
                gateway_name: self.kind.to_string(),
                description: "stub".to_string(),
                created_at: now,
                updated_at: now,
            },
            metadata: request.metadata.clone(),
        })
    }

    async fn handle_callback(&self, _envelope: &CallbackEnvelope) -> Result<String, GatewayError> {
        Err(GatewayError::UnsupportedCallback(self.kind))
    }

    async fn cancel_payment(&self, _request: &CancelPaymentRequest) -> Result<(), GatewayError> {
        self.cancel_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(GatewayError::InvalidRequest("cannot cancel".to_string()));
        }
        Ok(())
    }

    async fn query_payment(&self, payment_id: &str) -> Result<PaymentStatusResult, GatewayError> {
        Ok(PaymentStatusResult {
            payment_id: payment_id.to_string(),
            status: PaymentStatus::Pending,
            amount: None,
            provider_transaction_id: None,
            provider_message: None,
        })
    }
}

pub fn zalopay_config(base_url: &str) -> ZalopayConfig {
    ZalopayConfig {
        app_id: 2553,
        key1: KEY1.to_string(),
        key2: KEY2.to_string(),
        host: "https://payments.example".to_string(),
        create_url: format!("{}/v2/create", base_url),
        query_url: format!("{}/v2/query", base_url),
        expire_duration_seconds: 900,
        default_return_url: "https://shop.example/payment/success".to_string(),
        timeout_ms: 2000,
    }
}

/// 2025-01-01 03:00 UTC, i.e. 2025-01-01 10:00 in Vietnam.
pub fn new_year_2025() -> chrono::DateTime<chrono::Utc> {
    use chrono::TimeZone;
    chrono::Utc.with_ymd_and_hms(2025, 1, 1, 3, 0, 0).unwrap()
}

pub fn zalopay_gateway(base_url: &str) -> ZalopayGateway {
    let mut gateway = ZalopayGateway::new(zalopay_config(base_url), reqwest::Client::new());
    gateway.clock = new_year_2025;
    gateway
}

pub fn payment_request(order_code: &str, provider: &str) -> PaymentRequest {
    let mut metadata = HashMap::new();
    metadata.insert(
        "return_url".to_string(),
        "https://shop.example/orders/done".to_string(),
    );
    PaymentRequest {
        order_code: order_code.to_string(),
        amount: 150_000,
        user_id: "user-42".to_string(),
        provider: provider.to_string(),
        metadata,
    }
}

pub fn service(
    registry: GatewayRegistry,
    orders: Arc<InMemoryOrders>,
    workflows: Arc<RecordingWorkflows>,
) -> PaymentService {
    PaymentService {
        registry: Arc::new(registry),
        orders,
        workflows,
        task_queue: POST_PAYMENT_TASK_QUEUE.to_string(),
    }
}
