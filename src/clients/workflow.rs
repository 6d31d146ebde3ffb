use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartWorkflowOptions {
    pub id: String,
    pub task_queue: String,
    pub execution_timeout: Duration,
    pub run_timeout: Duration,
    pub task_timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderWorkflowParams {
    pub order_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowHandle {
    pub workflow_id: String,
    pub run_id: String,
}

#[async_trait::async_trait]
pub trait WorkflowEngine: Send + Sync {
    async fn execute_workflow(
        &self,
        options: &StartWorkflowOptions,
        workflow_type: &str,
        params: &OrderWorkflowParams,
    ) -> Result<WorkflowHandle>;
}

#[derive(Debug, Serialize)]
struct StartWorkflowBody<'a> {
    workflow_id: &'a str,
    task_queue: &'a str,
    workflow_type: &'a str,
    workflow_execution_timeout_secs: u64,
    workflow_run_timeout_secs: u64,
    workflow_task_timeout_secs: u64,
    input: &'a OrderWorkflowParams,
}

/// Starts workflows through the engine's HTTP frontend: `POST {base_url}/workflows`.
/// A 409 means the id is already running and resolves to that execution.
#[derive(Clone)]
pub struct HttpWorkflowClient {
    pub base_url: String,
    pub timeout_ms: u64,
    pub client: reqwest::Client,
}

#[async_trait::async_trait]
impl WorkflowEngine for HttpWorkflowClient {
    async fn execute_workflow(
        &self,
        options: &StartWorkflowOptions,
        workflow_type: &str,
        params: &OrderWorkflowParams,
    ) -> Result<WorkflowHandle> {
        let body = StartWorkflowBody {
            workflow_id: &options.id,
            task_queue: &options.task_queue,
            workflow_type,
            workflow_execution_timeout_secs: options.execution_timeout.as_secs(),
            workflow_run_timeout_secs: options.run_timeout.as_secs(),
            workflow_task_timeout_secs: options.task_timeout.as_secs(),
            input: params,
        };

        let resp = self
            .client
            .post(format!("{}/workflows", self.base_url.trim_end_matches('/')))
            .json(&body)
            .timeout(Duration::from_millis(self.timeout_ms))
            .send()
            .await?;

        let status = resp.status();
        // An execution with this id is already running: hand back its identity.
        if status == reqwest::StatusCode::CONFLICT {
            let existing = resp.json::<WorkflowHandle>().await.ok();
            let run_id = existing.map(|h| h.run_id).unwrap_or_default();
            info!(
                workflow_id = %options.id,
                run_id = %run_id,
                "workflow already started"
            );
            return Ok(WorkflowHandle {
                workflow_id: options.id.clone(),
                run_id,
            });
        }
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            bail!(
                "workflow engine returned HTTP_{}: {}",
                status.as_u16(),
                text.chars().take(200).collect::<String>()
            );
        }

        Ok(resp.json().await?)
    }
}
