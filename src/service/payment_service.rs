use crate::clients::order::OrderLookup;
use crate::clients::workflow::{
    OrderWorkflowParams, StartWorkflowOptions, WorkflowEngine, WorkflowHandle,
};
use crate::domain::callback::CallbackEnvelope;
use crate::domain::order::Order;
use crate::domain::payment::{
    CancelPaymentRequest, PaymentGatewayResponse, PaymentRequest, PaymentStatusRequest,
    PaymentStatusResult,
};
use crate::error::PaymentError;
use crate::gateways::registry::GatewayRegistry;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

pub const POST_PAYMENT_TASK_QUEUE: &str = "POST_PAYMENT_ORDER_TASK_QUEUE";
pub const POST_PAYMENT_WORKFLOW_TYPE: &str = "ProcessPostPaymentOrder";
pub const POST_PAYMENT_WORKFLOW_PREFIX: &str = "order_post_payment_";

const WORKFLOW_EXECUTION_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);
const WORKFLOW_RUN_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);
const WORKFLOW_TASK_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct PaymentService {
    pub registry: Arc<GatewayRegistry>,
    pub orders: Arc<dyn OrderLookup>,
    pub workflows: Arc<dyn WorkflowEngine>,
    pub task_queue: String,
}

impl PaymentService {
    pub async fn process(
        &self,
        req: PaymentRequest,
    ) -> Result<PaymentGatewayResponse, PaymentError> {
        validate_request(&req).map_err(log_failure)?;

        let order = self.find_order(&req.order_code).await?;
        if !order.is_payment_pending() {
            warn!(order_code = %req.order_code, status = ?order.status, "order status validation failed");
            return Err(PaymentError::OrderNotPending);
        }

        let gateway = self.registry.get_by_name(&req.provider).map_err(log_failure)?;

        let resp = gateway.process_payment(&req).await.map_err(|e| {
            error!(order_code = %req.order_code, provider = %req.provider, error = %e, "payment processing failed");
            PaymentError::internal(e)
        })?;

        info!(
            order_code = %req.order_code,
            payment_id = %resp.payment.id,
            gateway = %gateway.gateway_type(),
            "payment link created"
        );
        Ok(resp)
    }

    pub async fn handle_callback(
        &self,
        envelope: CallbackEnvelope,
    ) -> Result<WorkflowHandle, PaymentError> {
        let gateway = self
            .registry
            .get(envelope.gateway_type())
            .map_err(log_failure)?;

        let order_code = gateway
            .handle_callback(&envelope)
            .await
            .map_err(|e| log_failure(PaymentError::from(e)))?;

        let options = post_payment_workflow_options(&order_code, &self.task_queue);
        let params = OrderWorkflowParams {
            order_code: order_code.clone(),
        };

        info!(workflow_id = %options.id, task_queue = %options.task_queue, "starting post-payment workflow");
        let handle = self
            .workflows
            .execute_workflow(&options, POST_PAYMENT_WORKFLOW_TYPE, &params)
            .await
            .map_err(|e| {
                error!(workflow_id = %options.id, error = %e, "failed to start post-payment workflow");
                PaymentError::Internal(e)
            })?;

        info!(
            workflow_id = %handle.workflow_id,
            run_id = %handle.run_id,
            "post-payment workflow started"
        );
        Ok(handle)
    }

    pub async fn cancel(&self, req: CancelPaymentRequest) -> Result<(), PaymentError> {
        if req.order_code.trim().is_empty() {
            return Err(log_failure(PaymentError::RequiredField("order_code")));
        }

        let order = self.find_order(&req.order_code).await?;
        let provider = order.provider.as_deref().unwrap_or_default();
        let gateway = self.registry.get_by_name(provider).map_err(log_failure)?;

        gateway.cancel_payment(&req).await.map_err(|e| {
            error!(order_code = %req.order_code, provider, error = %e, "failed to cancel payment");
            PaymentError::internal(e)
        })?;

        info!(order_code = %req.order_code, provider, "payment cancelled");
        Ok(())
    }

    pub async fn payment_status(
        &self,
        req: PaymentStatusRequest,
    ) -> Result<PaymentStatusResult, PaymentError> {
        if req.payment_id.trim().is_empty() {
            return Err(log_failure(PaymentError::RequiredField("payment_id")));
        }

        let gateway = self.registry.get_by_name(&req.provider).map_err(log_failure)?;
        gateway.query_payment(&req.payment_id).await.map_err(|e| {
            error!(payment_id = %req.payment_id, error = %e, "failed to get payment status");
            PaymentError::internal(e)
        })
    }

    async fn find_order(&self, order_code: &str) -> Result<Order, PaymentError> {
        let found = self.orders.find_one(order_code).await.map_err(|e| {
            error!(order_code, error = %e, "failed to find order");
            PaymentError::Internal(e)
        })?;

        found.ok_or_else(|| log_failure(PaymentError::OrderNotFound))
    }
}

pub fn post_payment_workflow_id(order_code: &str) -> String {
    format!("{}{}", POST_PAYMENT_WORKFLOW_PREFIX, order_code)
}

pub fn post_payment_workflow_options(order_code: &str, task_queue: &str) -> StartWorkflowOptions {
    StartWorkflowOptions {
        id: post_payment_workflow_id(order_code),
        task_queue: task_queue.to_string(),
        execution_timeout: WORKFLOW_EXECUTION_TIMEOUT,
        run_timeout: WORKFLOW_RUN_TIMEOUT,
        task_timeout: WORKFLOW_TASK_TIMEOUT,
    }
}

fn validate_request(req: &PaymentRequest) -> Result<(), PaymentError> {
    if req.order_code.trim().is_empty() {
        return Err(PaymentError::RequiredField("order_code"));
    }
    if req.amount <= 0 {
        return Err(PaymentError::InvalidInput("amount must be > 0".to_string()));
    }
    if req.user_id.trim().is_empty() {
        return Err(PaymentError::RequiredField("user_id"));
    }
    if req.provider.trim().is_empty() {
        return Err(PaymentError::RequiredField("provider"));
    }
    Ok(())
}

fn log_failure(e: PaymentError) -> PaymentError {
    if e.is_warn() {
        warn!(code = e.code(), error = %e, "payment request rejected");
    } else {
        error!(code = e.code(), error = %e, "payment request failed");
    }
    e
}
