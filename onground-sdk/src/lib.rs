//! Shared contract between the OnGround dashboard and its backend
//!
//! Wire types for `/api/data`, `/api/tools` and `/run_agent`, plus the
//! [`DashboardBackend`] trait the dashboard talks through. The HTTP
//! implementation lives in the dashboard crate; tests plug in their own.

// Re-export async trait for convenience
pub use async_trait::async_trait;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Errors raised while talking to the backend.
///
/// A response with `success: false` is not an error here: it decodes fine and
/// the caller decides what to show.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("backend returned HTTP {status}")]
    Status { status: u16 },

    #[error("invalid response body: {0}")]
    Decode(String),
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Identifiers show up as strings ("W101") or bare numbers (7).
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            other
        ))),
    }
}

/// Decode a list row by row, dropping rows that do not fit `T`.
fn deserialize_rows<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let rows = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(rows
        .into_iter()
        .enumerate()
        .filter_map(|(index, row)| match serde_json::from_value(row) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!(index, error = %e, "skipping malformed row");
                None
            }
        })
        .collect())
}

/// Agent counts are advisory: any non-negative number is taken, anything else ignored.
fn deserialize_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let count = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0)
                .map(|f| f as u64)
        }),
        _ => None,
    };
    Ok(count.map(|c| u32::try_from(c).unwrap_or(u32::MAX)))
}

/// Render a JSON value the way it would appear in text: strings unquoted.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Worker {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub worker_id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub task_id: String,
    #[serde(default, deserialize_with = "deserialize_id")]
    pub worker_id: String,
    #[serde(default)]
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub worker_id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub time: String,
}

/// Calendar rows are only counted, never inspected.
pub type CalendarEntry = Value;

/// Last known status of a registered tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ToolStatus {
    Success,
    Idle,
    Other(String),
}

impl From<String> for ToolStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "success" => ToolStatus::Success,
            "idle" => ToolStatus::Idle,
            _ => ToolStatus::Other(value),
        }
    }
}

impl From<ToolStatus> for String {
    fn from(value: ToolStatus) -> Self {
        value.to_string()
    }
}

impl fmt::Display for ToolStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolStatus::Success => write!(f, "success"),
            ToolStatus::Idle => write!(f, "idle"),
            ToolStatus::Other(s) => write!(f, "{}", s),
        }
    }
}

impl Default for ToolStatus {
    fn default() -> Self {
        ToolStatus::Other("unknown".to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub returns: Option<String>,
    #[serde(default)]
    pub status: ToolStatus,
    #[serde(default)]
    pub last_used: Option<String>,
    #[serde(default)]
    pub result: Option<String>,
}

/// Item counts captured from the initial data fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DataCounts {
    pub workers: usize,
    pub tasks: usize,
    pub messages: usize,
    pub calendar: usize,
}

/// `GET /api/data`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardData {
    #[serde(default)]
    pub success: bool,
    #[serde(default, deserialize_with = "deserialize_rows")]
    pub workers: Vec<Worker>,
    #[serde(default, deserialize_with = "deserialize_rows")]
    pub tasks: Vec<Task>,
    #[serde(default, deserialize_with = "deserialize_rows")]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub calendar: Vec<CalendarEntry>,
    #[serde(default)]
    pub error: Option<String>,
}

impl DashboardData {
    pub fn counts(&self) -> DataCounts {
        DataCounts {
            workers: self.workers.len(),
            tasks: self.tasks.len(),
            messages: self.messages.len(),
            calendar: self.calendar.len(),
        }
    }
}

/// `GET /api/tools`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolsResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, deserialize_with = "deserialize_rows")]
    pub tools: Vec<Tool>,
    #[serde(default)]
    pub error: Option<String>,
}

/// `POST /run_agent` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRequest {
    pub message: String,
}

/// A free-form text field that the backend sends either as a JSON string or
/// as an embedded JSON value. Embedded values are kept in serialized form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TextPayload(pub String);

impl TextPayload {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for TextPayload {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(TextPayload(value_to_text(&Value::deserialize(deserializer)?)))
    }
}

impl From<&str> for TextPayload {
    fn from(value: &str) -> Self {
        TextPayload(value.to_string())
    }
}

/// `POST /run_agent` response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub workflow_triggered: bool,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub delay_findings: Option<TextPayload>,
    #[serde(default)]
    pub safety_findings: Option<TextPayload>,
    #[serde(default)]
    pub final_report: Option<TextPayload>,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub agents_completed: Option<u32>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Backend the dashboard reads from and chats through
#[async_trait]
pub trait DashboardBackend: Send + Sync {
    /// Workers, tasks, messages and calendar rows.
    async fn fetch_data(&self) -> BackendResult<DashboardData>;

    /// Tool registry.
    async fn fetch_tools(&self) -> BackendResult<ToolsResponse>;

    /// Send one chat message to the agent endpoint.
    async fn run_agent(&self, message: &str) -> BackendResult<AgentResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_task_id_accepts_numbers() {
        let task: Task = serde_json::from_value(json!({
            "task_id": 12,
            "worker_id": "W101",
            "address": "Sector 12"
        }))
        .unwrap();
        assert_eq!(task.task_id, "12");
        assert_eq!(task.worker_id, "W101");
    }

    #[test]
    fn test_tool_status_round_trip() {
        let tool: Tool = serde_json::from_value(json!({
            "name": "load_messages",
            "type": "FunctionTool",
            "status": "success"
        }))
        .unwrap();
        assert_eq!(tool.status, ToolStatus::Success);
        assert_eq!(tool.kind, "FunctionTool");
        assert!(tool.returns.is_none());

        let failed: ToolStatus = serde_json::from_value(json!("timeout")).unwrap();
        assert_eq!(failed, ToolStatus::Other("timeout".to_string()));
        assert_eq!(serde_json::to_value(&failed).unwrap(), json!("timeout"));
    }

    #[test]
    fn test_data_response_defaults_missing_lists() {
        let data: DashboardData = serde_json::from_value(json!({
            "success": false,
            "error": "missing workers.json"
        }))
        .unwrap();
        assert!(!data.success);
        assert!(data.workers.is_empty());
        assert_eq!(data.error.as_deref(), Some("missing workers.json"));
        assert_eq!(data.counts(), DataCounts::default());
    }

    #[test]
    fn test_agent_response_findings_as_string_or_value() {
        let response: AgentResponse = serde_json::from_value(json!({
            "success": true,
            "workflow_triggered": true,
            "delay_findings": "[{\"worker_id\": \"W101\"}]",
            "safety_findings": [{"worker_id": "W194"}],
            "final_report": null,
            "agents_completed": 4
        }))
        .unwrap();

        assert_eq!(
            response.delay_findings.unwrap().as_str(),
            "[{\"worker_id\": \"W101\"}]"
        );
        let safety = response.safety_findings.unwrap();
        let reparsed: Value = serde_json::from_str(safety.as_str()).unwrap();
        assert_eq!(reparsed, json!([{"worker_id": "W194"}]));
        assert!(response.final_report.is_none());
        assert_eq!(response.agents_completed, Some(4));
    }

    #[test]
    fn test_row_without_id_keeps_its_siblings() {
        let data: DashboardData = serde_json::from_value(json!({
            "success": true,
            "workers": [
                {"worker_id": "W101", "name": "Rajesh"},
                {"name": "No id"}
            ],
            "tasks": [{"worker_id": "W101", "address": "Sector 12"}],
            "messages": [
                {"text": "who sent this", "time": "09:00"},
                {"worker_id": "W101", "text": "On site", "time": "09:10"}
            ]
        }))
        .unwrap();

        assert_eq!(data.workers.len(), 2);
        assert_eq!(data.workers[0].worker_id, "W101");
        assert_eq!(data.workers[1].worker_id, "");
        assert_eq!(data.tasks[0].task_id, "");
        assert_eq!(data.messages.len(), 2);
        assert_eq!(data.messages[1].text, "On site");
    }

    #[test]
    fn test_malformed_rows_are_dropped() {
        let data: DashboardData = serde_json::from_value(json!({
            "success": true,
            "workers": [{"worker_id": "W101"}, 42, {"worker_id": ["W9"]}],
            "messages": null
        }))
        .unwrap();
        assert_eq!(data.workers.len(), 1);
        assert_eq!(data.workers[0].worker_id, "W101");
        assert!(data.messages.is_empty());

        let tools: ToolsResponse = serde_json::from_value(json!({
            "success": true,
            "tools": [{"type": "FunctionTool"}, {"name": "load_tasks"}]
        }))
        .unwrap();
        assert_eq!(tools.tools.len(), 1);
        assert_eq!(tools.tools[0].name, "load_tasks");
    }

    #[test]
    fn test_agent_count_is_lenient() {
        let decode = |count: Value| -> Option<u32> {
            let response: AgentResponse = serde_json::from_value(json!({
                "success": true,
                "workflow_triggered": true,
                "agents_completed": count
            }))
            .unwrap();
            response.agents_completed
        };

        assert_eq!(decode(json!(4)), Some(4));
        assert_eq!(decode(json!(4.0)), Some(4));
        assert_eq!(decode(json!(-2)), None);
        assert_eq!(decode(json!("4")), None);
        assert_eq!(decode(json!(null)), None);
        assert_eq!(decode(json!(1e12)), Some(u32::MAX));
    }

    struct Offline;

    #[async_trait]
    impl DashboardBackend for Offline {
        async fn fetch_data(&self) -> BackendResult<DashboardData> {
            Ok(DashboardData {
                success: true,
                ..Default::default()
            })
        }

        async fn fetch_tools(&self) -> BackendResult<ToolsResponse> {
            Err(BackendError::Status { status: 503 })
        }

        async fn run_agent(&self, _message: &str) -> BackendResult<AgentResponse> {
            Err(BackendError::Transport("connection refused".to_string()))
        }
    }

    #[test]
    fn test_backend_behind_trait_object() {
        let backend: Box<dyn DashboardBackend> = Box::new(Offline);

        let data = tokio_test::block_on(backend.fetch_data()).unwrap();
        assert!(data.success);

        let err = tokio_test::block_on(backend.fetch_tools()).unwrap_err();
        assert_eq!(err.to_string(), "backend returned HTTP 503");

        let err = tokio_test::block_on(backend.run_agent("hi")).unwrap_err();
        assert!(matches!(err, BackendError::Transport(_)));
    }

    #[test]
    fn test_chat_response_without_workflow_fields() {
        let response: AgentResponse = serde_json::from_value(json!({
            "success": true,
            "response": "All good",
            "workflow_triggered": false,
            "session_id": "chat-session"
        }))
        .unwrap();
        assert!(!response.workflow_triggered);
        assert_eq!(response.response.as_deref(), Some("All good"));
        assert!(response.delay_findings.is_none());
    }
}
