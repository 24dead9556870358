use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{ListHeader, WhoWhen};
use crate::serde_util::{null_as_default, opt_string_or_number, string_or_number};

/// Body of `POST /tasks/{id}/execution`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskExecutionRequest {
    pub start: bool,
    pub reason: String,
}

impl TaskExecutionRequest {
    pub fn start(reason: Option<&str>) -> Self {
        let reason = reason
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or("Automated execution");
        Self {
            start: true,
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskExecutionResponse {
    #[serde(default, deserialize_with = "string_or_number")]
    pub task_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskStatusResponse {
    #[serde(default, deserialize_with = "string_or_number")]
    pub task_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub progress: i64,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Response of `GET /tasks`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TasksListResponse {
    #[serde(default)]
    pub header: ListHeader,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tasks: Vec<TaskItem>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskItem {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub triggers: Vec<TriggerView>,
    #[serde(default)]
    pub max_run_time: i64,
    #[serde(default)]
    pub expected_run_time: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub uri: String,
    #[serde(default)]
    pub action_count: i64,
    #[serde(default)]
    pub run_as_user: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub actions: Vec<ActionView>,
    #[serde(default)]
    pub created: WhoWhen,
    #[serde(default)]
    pub changed: WhoWhen,
    #[serde(default)]
    pub delete_after_completion: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub last_run_result: String,
    #[serde(default)]
    pub last_run_time: Option<i64>,
    #[serde(default)]
    pub next_run_time: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub history: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub actions_uri: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub arguments: Vec<ArgumentView>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub recipients: Vec<TaskRecipient>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Event or schedule trigger; the unused half stays `None`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TriggerView {
    #[serde(default, deserialize_with = "null_as_default")]
    pub trigger_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Vec<ArgumentView>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<Vec<DayView>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continuous: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DayView {
    #[serde(default)]
    pub day: i64,
    #[serde(default)]
    pub active: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionView {
    #[serde(default, deserialize_with = "null_as_default")]
    pub action_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub arguments: Vec<ArgumentView>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArgumentView {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub value: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskRecipient {
    #[serde(default, deserialize_with = "null_as_default")]
    pub email_address: String,
    #[serde(default)]
    pub result: bool,
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub failed: bool,
    #[serde(default)]
    pub summary: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
