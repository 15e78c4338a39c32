use std::path::PathBuf;
use std::time::Duration;

/// How long to wait for an execution and where to put its report.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Maximum wall-clock time to wait for the execution to finish.
    /// Zero means fire-and-forget: start the execution and return
    /// without polling.
    pub wait_seconds: u64,

    /// Delay before the first state poll.
    pub initial_delay: Duration,

    /// Fixed interval between state polls.
    pub poll_interval: Duration,

    /// Where to write the JUnit XML report, if anywhere. Either an
    /// existing directory or a path ending in `.xml`.
    pub report_destination: Option<PathBuf>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            wait_seconds: 60,
            initial_delay: Duration::from_secs(5),
            poll_interval: Duration::from_secs(3),
            report_destination: None,
        }
    }
}

impl MonitorConfig {
    pub fn with_wait_seconds(wait_seconds: u64) -> Self {
        Self {
            wait_seconds,
            ..Default::default()
        }
    }
}
