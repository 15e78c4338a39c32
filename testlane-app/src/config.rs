use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use testlane_client::ExecutionKind;

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub run: RunConfig,
    /// Enables debug-level log output. Info and error output is always
    /// on.
    #[serde(default)]
    pub verbose: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    pub endpoint: String,
    pub key: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RunConfig {
    pub project_id: String,
    pub item_id: String,
    pub kind: ExecutionKind,
    #[serde(default)]
    pub agent_id: Option<String>,
    #[serde(default)]
    pub browser: Option<String>,
    #[serde(default)]
    pub device: Option<String>,
    /// JSON object overriding the item's default execution parameters.
    #[serde(default)]
    pub parameters: String,
    #[serde(default = "default_wait_seconds")]
    pub wait_seconds: u64,
    /// Report destination: an existing directory or a `.xml` file path.
    #[serde(default)]
    pub junit_results_file: Option<PathBuf>,
}

fn default_wait_seconds() -> u64 {
    60
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Mirror of the original form validation: ids must be present, a
    /// test run needs an agent, and the wait is either zero (do not
    /// wait) or at least ten seconds.
    pub fn validate(&self) -> Result<()> {
        if self.api.endpoint.is_empty() {
            bail!("The API endpoint cannot be empty");
        }

        if self.api.key.is_empty() {
            bail!("The API key cannot be empty");
        }

        if self.run.project_id.is_empty() {
            bail!("The project id cannot be empty");
        }

        if self.run.item_id.is_empty() {
            bail!("The {} id cannot be empty", self.run.kind);
        }

        if self.run.kind == ExecutionKind::Test
            && self.run.agent_id.as_deref().unwrap_or_default().is_empty()
        {
            bail!("The agent id cannot be empty");
        }

        if self.run.wait_seconds != 0 && self.run.wait_seconds < 10 {
            bail!("Wait for the execution to finish must be at least 10 seconds (0 = don't wait)");
        }

        Ok(())
    }
}
