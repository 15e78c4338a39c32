use serde_json::{Map, Value};
use testlane_client::ExecutionKind;

use crate::error::MonitorError;

/// Everything needed to start one remote execution, assembled once
/// before [`crate::ExecutionMonitor::run`].
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    pub project_id: String,
    pub item_id: String,
    pub agent_id: Option<String>,
    pub browser: Option<String>,
    pub device: Option<String>,
    /// Free-form JSON object overriding the item's default parameters.
    /// Empty means no overrides.
    pub parameters: String,
    pub kind: ExecutionKind,
}

impl ExecutionRequest {
    pub fn new(
        project_id: impl Into<String>,
        item_id: impl Into<String>,
        kind: ExecutionKind,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            item_id: item_id.into(),
            agent_id: None,
            browser: None,
            device: None,
            parameters: String::new(),
            kind,
        }
    }
}

/// Build the JSON body for the start call. Pure function, no I/O.
///
/// Parses `parameters` (empty input becomes `{}`), then merges in the
/// selection fields: `agentId` for both kinds, `browser` and `device`
/// for tests only. Empty values are never merged. Anything that is not
/// a JSON object is a configuration error.
pub fn build_request_body(request: &ExecutionRequest) -> Result<Value, MonitorError> {
    let mut body = if request.parameters.trim().is_empty() {
        Map::new()
    } else {
        match serde_json::from_str::<Value>(&request.parameters) {
            Ok(Value::Object(map)) => map,
            Ok(other) => {
                return Err(MonitorError::MalformedParameters(format!(
                    "expected a JSON object, got {}",
                    json_type_name(&other)
                )))
            }
            Err(e) => return Err(MonitorError::MalformedParameters(e.to_string())),
        }
    };

    merge_field(&mut body, "agentId", request.agent_id.as_deref());

    if request.kind == ExecutionKind::Test {
        merge_field(&mut body, "browser", request.browser.as_deref());
        merge_field(&mut body, "device", request.device.as_deref());
    }

    Ok(Value::Object(body))
}

fn merge_field(body: &mut Map<String, Value>, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        if !value.is_empty() {
            body.insert(key.to_string(), Value::String(value.to_string()));
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
