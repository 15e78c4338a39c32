use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{self, Duration, MissedTickBehavior};
use tracing::{debug, error, info};

use testlane_client::{ApiError, ExecutionApi, ExecutionState};
use testlane_report::ReportExporter;

use crate::config::MonitorConfig;
use crate::error::MonitorError;
use crate::request::{build_request_body, ExecutionRequest};

/// Terminal non-error outcome of a monitored run.
#[derive(Debug)]
pub enum Outcome {
    /// The execution was started and nobody waited for it (wait = 0).
    Started,
    /// The execution finished successfully; carries the final snapshot.
    Completed(ExecutionState),
}

/// Drives one remote execution from start to a terminal outcome.
///
/// One task calls [`run`](Self::run) and suspends on a single one-shot
/// completion signal, bounded by the configured deadline. A separate
/// polling task on a fixed schedule is the only writer of that signal:
/// it fires once, either with a finished snapshot or with the transport
/// error that tore the schedule down. The deadline merely unblocks the
/// waiter, so an execution only counts as finished if a finished
/// snapshot was actually recorded.
///
/// [`abort`](Self::abort) may be called from another task at any time
/// (typically from a Ctrl-C handler); it stops the polling schedule and
/// issues a best-effort remote abort.
pub struct ExecutionMonitor {
    client: Arc<dyn ExecutionApi>,
    request: ExecutionRequest,
    execution_id: Mutex<Option<String>>,
    poll_task: Mutex<Option<JoinHandle<()>>>,
    aborting: AtomicBool,
}

impl ExecutionMonitor {
    pub fn new(client: Arc<dyn ExecutionApi>, request: ExecutionRequest) -> Self {
        Self {
            client,
            request,
            execution_id: Mutex::new(None),
            poll_task: Mutex::new(None),
            aborting: AtomicBool::new(false),
        }
    }

    /// Start the execution and wait for a terminal outcome.
    ///
    /// Configuration errors (malformed parameters) surface before any
    /// remote call. Runtime errors surface only after the bounded wait
    /// completes.
    pub async fn run(&self, config: &MonitorConfig) -> Result<Outcome, MonitorError> {
        let body = build_request_body(&self.request)?;

        let execution_id = self
            .client
            .start_execution(
                &self.request.project_id,
                &self.request.item_id,
                self.request.kind,
                &body,
            )
            .await?;

        info!("Execution id: {}", execution_id);
        *self.execution_id.lock() = Some(execution_id.clone());

        self.wait_for_finish(&execution_id, config).await
    }

    async fn wait_for_finish(
        &self,
        execution_id: &str,
        config: &MonitorConfig,
    ) -> Result<Outcome, MonitorError> {
        if config.wait_seconds == 0 {
            info!("Will not wait for execution to finish");
            info!(
                "{} {} under project {} was started successfully",
                self.request.kind, self.request.item_id, self.request.project_id
            );
            return Ok(Outcome::Started);
        }

        let deadline = chrono::Local::now() + chrono::Duration::seconds(config.wait_seconds as i64);
        info!(
            "Will wait {} seconds for execution to finish (not later than {})",
            config.wait_seconds,
            deadline.format("%Y-%m-%d %H:%M:%S")
        );

        let rx = self.spawn_poller(execution_id, config);

        let completed = time::timeout(Duration::from_secs(config.wait_seconds), rx).await;
        self.stop_polling();

        let state = match completed {
            // Deadline elapsed, or the poller was aborted before it
            // recorded a finished snapshot. Either way: timeout.
            Err(_) | Ok(Err(_)) => return Err(MonitorError::Timeout),
            Ok(Ok(Err(api_error))) => {
                error!("Unable to get execution state!");
                return Err(MonitorError::Remote(api_error));
            }
            Ok(Ok(Ok(state))) => state,
        };

        if let Some(destination) = &config.report_destination {
            info!("Generating an XML report for execution '{}'", execution_id);
            let exporter = ReportExporter::new(
                self.client.clone(),
                &self.request.project_id,
                &self.request.item_id,
                self.request.kind,
            );
            if !exporter.export(execution_id, destination).await {
                info!(
                    "Failed to generate a JUnit XML report for execution '{}'",
                    execution_id
                );
            }
        }

        if let Some(report) = state.report.as_deref().filter(|r| !r.is_empty()) {
            info!("Report: {}", report);
        }

        if state.has_finished_with_errors() {
            return Err(MonitorError::ExecutionFailed {
                message: state.message.clone(),
            });
        }

        info!("The execution has finished successfully!");
        Ok(Outcome::Completed(state))
    }

    /// Spawn the fixed-schedule polling task. The returned receiver
    /// fires at most once: with the first finished snapshot, or with
    /// the transport error that ended the schedule.
    fn spawn_poller(
        &self,
        execution_id: &str,
        config: &MonitorConfig,
    ) -> oneshot::Receiver<Result<ExecutionState, ApiError>> {
        let (tx, rx) = oneshot::channel();

        let client = self.client.clone();
        let project_id = self.request.project_id.clone();
        let item_id = self.request.item_id.clone();
        let kind = self.request.kind;
        let execution_id = execution_id.to_string();
        let initial_delay = config.initial_delay;
        let poll_interval = config.poll_interval;

        let handle = tokio::spawn(async move {
            let mut ticker =
                time::interval_at(time::Instant::now() + initial_delay, poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                debug!("Checking execution state...");

                let result = client
                    .get_execution_state(&project_id, &item_id, &execution_id, kind)
                    .await;

                match result {
                    Ok(state) if state.has_finished() => {
                        info!("Execution has finished - state: {:?}", state.state);
                        let _ = tx.send(Ok(state));
                        return;
                    }
                    Ok(state) => {
                        match &state.target {
                            Some(target) => info!(
                                "{} agent is still executing the {} on {}",
                                state.agent, kind, target
                            ),
                            None => {
                                info!("{} agent is still executing the {}", state.agent, kind)
                            }
                        }
                    }
                    Err(e) => {
                        let _ = tx.send(Err(e));
                        return;
                    }
                }
            }
        });

        *self.poll_task.lock() = Some(handle);
        rx
    }

    fn stop_polling(&self) {
        if let Some(handle) = self.poll_task.lock().take() {
            handle.abort();
        }
    }

    /// Stop polling and ask the remote service to abort the execution.
    ///
    /// Idempotent: a second call while one is in flight is a no-op, so
    /// concurrent cancellation signals issue at most one remote abort.
    /// Remote failures are logged, never escalated.
    pub async fn abort(&self) {
        if self.aborting.swap(true, Ordering::SeqCst) {
            return;
        }

        self.stop_polling();

        let execution_id = self.execution_id.lock().clone();
        if let Some(id) = execution_id {
            info!("Aborting execution '{}'...", id);

            let result = self
                .client
                .abort_execution(&self.request.project_id, &self.request.item_id, &id, self.request.kind)
                .await;

            match result {
                Ok(()) => info!("Aborted execution '{}'", id),
                Err(e) => error!("Unable to abort {} execution '{}': {}", self.request.kind, id, e),
            }
        }

        self.aborting.store(false, Ordering::SeqCst);
    }
}
