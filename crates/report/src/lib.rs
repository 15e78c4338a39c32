//! JUnit XML report retrieval and persistence.
//!
//! Report export is advisory: every failure in here is logged and
//! reported as `false`, never propagated, because the execution it
//! describes has already finished.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info};

use testlane_client::{ApiError, ExecutionApi, ExecutionKind};

mod xml;

pub use xml::normalize;

const JUNIT_FILE_PREFIX: &str = "junit-report";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("remote service error: {0}")]
    Api(#[from] ApiError),
    #[error("report is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Fetches the JUnit report of a finished execution and writes a
/// normalized copy to disk.
pub struct ReportExporter {
    client: Arc<dyn ExecutionApi>,
    project_id: String,
    item_id: String,
    kind: ExecutionKind,
}

impl ReportExporter {
    pub fn new(
        client: Arc<dyn ExecutionApi>,
        project_id: impl Into<String>,
        item_id: impl Into<String>,
        kind: ExecutionKind,
    ) -> Self {
        Self {
            client,
            project_id: project_id.into(),
            item_id: item_id.into(),
            kind,
        }
    }

    /// Fetch, normalize and persist the report for `execution_id`.
    ///
    /// Returns `true` on success. Any failure, from a bad destination
    /// path to a write error, is logged and collapses to `false`.
    /// Destination problems are detected before the remote call.
    pub async fn export(&self, execution_id: &str, destination: &Path) -> bool {
        let Some(path) = resolve_destination(destination) else {
            return false;
        };

        match self.fetch_and_write(execution_id, &path).await {
            Ok(()) => {
                info!(
                    "JUnit XML report for execution '{}' was stored in '{}'",
                    execution_id,
                    path.display()
                );
                true
            }
            Err(e) => {
                error!("Failed to export report for execution '{}': {}", execution_id, e);
                false
            }
        }
    }

    async fn fetch_and_write(&self, execution_id: &str, path: &Path) -> Result<(), ReportError> {
        let raw = self
            .client
            .get_report(&self.project_id, &self.item_id, execution_id, self.kind)
            .await?;

        let normalized = normalize(&raw)?;
        write_atomic(path, &normalized)?;
        Ok(())
    }
}

/// Turn the caller-supplied destination into a concrete file path.
///
/// A path without an extension is treated as a directory that must
/// already exist; a timestamped filename is synthesized inside it. A
/// path with an extension must end in `.xml`. Anything else is logged
/// and skipped.
fn resolve_destination(destination: &Path) -> Option<PathBuf> {
    match destination.extension() {
        None => {
            if !destination.is_dir() {
                info!("The directory '{}' does not exist", destination.display());
                return None;
            }

            let timestamp = chrono::Local::now().format("%d-%m-%y-%H%M");
            Some(destination.join(format!("{JUNIT_FILE_PREFIX}-{timestamp}.xml")))
        }
        Some(ext) if ext.to_str() == Some("xml") => Some(destination.to_path_buf()),
        Some(ext) => {
            info!(
                "Invalid file extension '{}'. Only XML format is allowed.",
                ext.to_string_lossy()
            );
            None
        }
    }
}

/// Write through a sibling temp file and rename, so a crash never
/// leaves a half-written report at the final path.
fn write_atomic(path: &Path, contents: &str) -> std::io::Result<()> {
    let tmp = path.with_extension("xml.tmp");
    std::fs::write(&tmp, contents)?;
    std::fs::rename(&tmp, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use testlane_client::ExecutionState;

    struct StubApi {
        report: String,
        report_calls: AtomicUsize,
    }

    impl StubApi {
        fn new(report: &str) -> Self {
            Self {
                report: report.to_string(),
                report_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ExecutionApi for StubApi {
        async fn start_execution(
            &self,
            _: &str,
            _: &str,
            _: ExecutionKind,
            _: &serde_json::Value,
        ) -> Result<String, ApiError> {
            unimplemented!("not used by report tests")
        }

        async fn get_execution_state(
            &self,
            _: &str,
            _: &str,
            _: &str,
            _: ExecutionKind,
        ) -> Result<ExecutionState, ApiError> {
            unimplemented!("not used by report tests")
        }

        async fn abort_execution(
            &self,
            _: &str,
            _: &str,
            _: &str,
            _: ExecutionKind,
        ) -> Result<(), ApiError> {
            unimplemented!("not used by report tests")
        }

        async fn get_report(
            &self,
            _: &str,
            _: &str,
            _: &str,
            _: ExecutionKind,
        ) -> Result<String, ApiError> {
            self.report_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.report.clone())
        }
    }

    fn exporter(api: Arc<StubApi>) -> ReportExporter {
        ReportExporter::new(api, "p1", "t1", ExecutionKind::Test)
    }

    #[tokio::test]
    async fn exports_into_directory_with_synthesized_filename() {
        let dir = tempfile::tempdir().unwrap();
        let api = Arc::new(StubApi::new("<testsuite>  <testcase/>  </testsuite>"));
        let ok = exporter(api.clone()).export("e1", dir.path()).await;
        assert!(ok);

        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].starts_with("junit-report-"));
        assert!(entries[0].ends_with(".xml"));

        let written = std::fs::read_to_string(dir.path().join(&entries[0])).unwrap();
        assert!(written.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(!written.contains(">  <"));
    }

    #[tokio::test]
    async fn exports_to_explicit_xml_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.xml");
        let api = Arc::new(StubApi::new("<testsuite/>"));

        assert!(exporter(api).export("e1", &path).await);
        assert!(path.exists());
    }

    #[tokio::test]
    async fn rejects_non_xml_extension_without_remote_call() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.txt");
        let api = Arc::new(StubApi::new("<testsuite/>"));

        assert!(!exporter(api.clone()).export("e1", &path).await);
        assert_eq!(api.report_calls.load(Ordering::SeqCst), 0);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn missing_directory_skips_export() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("no-such-dir");
        let api = Arc::new(StubApi::new("<testsuite/>"));

        assert!(!exporter(api.clone()).export("e1", &missing).await);
        assert_eq!(api.report_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn malformed_report_body_fails_soft() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.xml");
        let api = Arc::new(StubApi::new("<testsuite><unclosed></testsuite>"));

        assert!(!exporter(api).export("e1", &path).await);
        assert!(!path.exists());
    }
}
