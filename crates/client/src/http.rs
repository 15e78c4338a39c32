use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::model::{ExecutionKind, ExecutionState, StartResponse};
use crate::traits::{ApiError, ExecutionApi};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// reqwest-backed implementation of [`ExecutionApi`].
pub struct HttpExecutionApi {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpExecutionApi {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn item_url(&self, project_id: &str, item_id: &str, kind: ExecutionKind) -> String {
        format!(
            "{}/v2/projects/{}/{}/{}",
            self.base_url,
            project_id,
            kind.segment(),
            item_id
        )
    }

    fn execution_url(
        &self,
        project_id: &str,
        item_id: &str,
        execution_id: &str,
        kind: ExecutionKind,
    ) -> String {
        format!(
            "{}/executions/{}",
            self.item_url(project_id, item_id, kind),
            execution_id
        )
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Api { status, body })
    }
}

#[async_trait]
impl ExecutionApi for HttpExecutionApi {
    async fn start_execution(
        &self,
        project_id: &str,
        item_id: &str,
        kind: ExecutionKind,
        body: &serde_json::Value,
    ) -> Result<String, ApiError> {
        let url = format!("{}/run", self.item_url(project_id, item_id, kind));
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::Http(e.to_string()))?;

        let started: StartResponse = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))?;

        Ok(started.id)
    }

    async fn get_execution_state(
        &self,
        project_id: &str,
        item_id: &str,
        execution_id: &str,
        kind: ExecutionKind,
    ) -> Result<ExecutionState, ApiError> {
        let url = format!(
            "{}/state",
            self.execution_url(project_id, item_id, execution_id, kind)
        );
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header("Authorization", &self.api_key)
            .send()
            .await
            .map_err(|e| ApiError::Http(e.to_string()))?;

        let text = Self::check(response)
            .await?
            .text()
            .await
            .map_err(|e| ApiError::Http(e.to_string()))?;

        if text.trim().is_empty() {
            return Err(ApiError::EmptyPayload);
        }

        serde_json::from_str(&text).map_err(|e| ApiError::Parse(e.to_string()))
    }

    async fn abort_execution(
        &self,
        project_id: &str,
        item_id: &str,
        execution_id: &str,
        kind: ExecutionKind,
    ) -> Result<(), ApiError> {
        let url = format!(
            "{}/abort",
            self.execution_url(project_id, item_id, execution_id, kind)
        );
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", &self.api_key)
            .send()
            .await
            .map_err(|e| ApiError::Http(e.to_string()))?;

        Self::check(response).await?;
        Ok(())
    }

    async fn get_report(
        &self,
        project_id: &str,
        item_id: &str,
        execution_id: &str,
        kind: ExecutionKind,
    ) -> Result<String, ApiError> {
        let url = format!(
            "{}/report",
            self.execution_url(project_id, item_id, execution_id, kind)
        );
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header("Authorization", &self.api_key)
            .query(&[("detail", "true"), ("format", "junit")])
            .send()
            .await
            .map_err(|e| ApiError::Http(e.to_string()))?;

        let text = Self::check(response)
            .await?
            .text()
            .await
            .map_err(|e| ApiError::Http(e.to_string()))?;

        if text.trim().is_empty() {
            return Err(ApiError::EmptyPayload);
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_url_picks_segment_by_kind() {
        let api = HttpExecutionApi::new("https://api.example.test/", "key");
        assert_eq!(
            api.item_url("p1", "t1", ExecutionKind::Test),
            "https://api.example.test/v2/projects/p1/tests/t1"
        );
        assert_eq!(
            api.item_url("p1", "j1", ExecutionKind::Job),
            "https://api.example.test/v2/projects/p1/jobs/j1"
        );
    }

    #[test]
    fn execution_url_nests_under_item() {
        let api = HttpExecutionApi::new("https://api.example.test", "key");
        assert_eq!(
            api.execution_url("p1", "t1", "e1", ExecutionKind::Test),
            "https://api.example.test/v2/projects/p1/tests/t1/executions/e1"
        );
    }
}
