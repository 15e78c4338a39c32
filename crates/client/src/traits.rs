use async_trait::async_trait;
use thiserror::Error;

use crate::model::{ExecutionKind, ExecutionState};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("response contained no usable payload")]
    EmptyPayload,
}

/// Narrow surface of the remote execution service. The monitor only ever
/// talks to the service through this trait; the reqwest transport lives
/// behind it.
#[async_trait]
pub trait ExecutionApi: Send + Sync {
    /// Start a test or job execution and return the server-issued
    /// execution id.
    async fn start_execution(
        &self,
        project_id: &str,
        item_id: &str,
        kind: ExecutionKind,
        body: &serde_json::Value,
    ) -> Result<String, ApiError>;

    /// Fetch the current state snapshot of an execution. A response with
    /// no usable payload is an error, same as a transport failure.
    async fn get_execution_state(
        &self,
        project_id: &str,
        item_id: &str,
        execution_id: &str,
        kind: ExecutionKind,
    ) -> Result<ExecutionState, ApiError>;

    /// Ask the remote service to abort a running execution.
    async fn abort_execution(
        &self,
        project_id: &str,
        item_id: &str,
        execution_id: &str,
        kind: ExecutionKind,
    ) -> Result<(), ApiError>;

    /// Fetch the detailed JUnit-format report document for a finished
    /// execution.
    async fn get_report(
        &self,
        project_id: &str,
        item_id: &str,
        execution_id: &str,
        kind: ExecutionKind,
    ) -> Result<String, ApiError>;
}
