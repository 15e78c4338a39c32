use serde::{Deserialize, Serialize};

/// Whether an execution runs a single test or a whole job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionKind {
    Test,
    Job,
}

impl ExecutionKind {
    /// URL path segment for this kind of item.
    pub fn segment(&self) -> &'static str {
        match self {
            ExecutionKind::Test => "tests",
            ExecutionKind::Job => "jobs",
        }
    }
}

impl std::fmt::Display for ExecutionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionKind::Test => write!(f, "test"),
            ExecutionKind::Job => write!(f, "job"),
        }
    }
}

/// Remote execution state vocabulary. The remote side owns this list, so
/// values we do not recognize deserialize as `Unknown` instead of failing
/// the whole poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionStatus {
    Pending,
    Running,
    Passed,
    Failed,
    Error,
    Aborted,
    Suspended,
    #[serde(other)]
    Unknown,
}

/// Point-in-time snapshot of a remote execution, replaced wholesale on
/// every successful poll.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionState {
    #[serde(default)]
    pub agent: String,
    #[serde(default)]
    pub target: Option<String>,
    pub state: ExecutionStatus,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub report: Option<String>,
}

impl ExecutionState {
    /// Terminal states are everything outside pending/running.
    pub fn has_finished(&self) -> bool {
        !matches!(self.state, ExecutionStatus::Pending | ExecutionStatus::Running)
    }

    /// Any terminal state other than `Passed` counts as an error,
    /// including values we do not recognize.
    pub fn has_finished_with_errors(&self) -> bool {
        self.has_finished() && self.state != ExecutionStatus::Passed
    }
}

/// Response body of a successful start call.
#[derive(Debug, Deserialize)]
pub(crate) struct StartResponse {
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(status: ExecutionStatus) -> ExecutionState {
        ExecutionState {
            agent: "lab-agent".to_string(),
            target: None,
            state: status,
            message: None,
            report: None,
        }
    }

    #[test]
    fn pending_and_running_are_not_finished() {
        assert!(!state(ExecutionStatus::Pending).has_finished());
        assert!(!state(ExecutionStatus::Running).has_finished());
    }

    #[test]
    fn terminal_states_are_finished() {
        for status in [
            ExecutionStatus::Passed,
            ExecutionStatus::Failed,
            ExecutionStatus::Error,
            ExecutionStatus::Aborted,
            ExecutionStatus::Suspended,
            ExecutionStatus::Unknown,
        ] {
            assert!(state(status).has_finished(), "{status:?} should be terminal");
        }
    }

    #[test]
    fn only_passed_finishes_without_errors() {
        assert!(!state(ExecutionStatus::Passed).has_finished_with_errors());
        assert!(state(ExecutionStatus::Failed).has_finished_with_errors());
        assert!(state(ExecutionStatus::Error).has_finished_with_errors());
        assert!(state(ExecutionStatus::Unknown).has_finished_with_errors());
        assert!(!state(ExecutionStatus::Running).has_finished_with_errors());
    }

    #[test]
    fn deserializes_full_snapshot() {
        let json = r#"{
            "agent": "chrome-pool-3",
            "target": "Chrome 120",
            "state": "Failed",
            "message": "assertion mismatch",
            "report": "https://example.test/reports/42"
        }"#;
        let state: ExecutionState = serde_json::from_str(json).unwrap();
        assert_eq!(state.agent, "chrome-pool-3");
        assert_eq!(state.target.as_deref(), Some("Chrome 120"));
        assert_eq!(state.state, ExecutionStatus::Failed);
        assert_eq!(state.message.as_deref(), Some("assertion mismatch"));
    }

    #[test]
    fn unknown_remote_state_deserializes_as_unknown() {
        let state: ExecutionState =
            serde_json::from_str(r#"{"state": "Quarantined"}"#).unwrap();
        assert_eq!(state.state, ExecutionStatus::Unknown);
        assert!(state.has_finished_with_errors());
    }
}
