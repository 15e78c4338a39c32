use testlane_client::ApiError;
use thiserror::Error;

/// Terminal failure modes of a monitored run. Report export and abort
/// failures never show up here; both are logged and swallowed.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// The execution parameters field is not a valid JSON object.
    /// Surfaces before any remote call is made.
    #[error("invalid execution parameters: {0}")]
    MalformedParameters(String),

    /// Transport or API failure while starting or polling the
    /// execution. The polling loop is torn down on first occurrence.
    #[error("remote service error: {0}")]
    Remote(#[from] ApiError),

    /// The deadline elapsed without a finished snapshot being recorded.
    #[error("the execution did not finish within the defined time frame")]
    Timeout,

    /// The execution finished in an error state on the remote side.
    #[error("the execution has finished with errors{}", .message.as_ref().map(|m| format!(": {m}")).unwrap_or_default())]
    ExecutionFailed { message: Option<String> },
}
