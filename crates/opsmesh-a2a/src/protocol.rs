//! Protocol - JSON-RPC 2.0 envelopes and task types for the agent protocol
//!
//! The wire format follows the agent-to-agent convention: `message/send`
//! submits a user message, the result is either a direct message with parts
//! or an asynchronous task that is polled with `tasks/get` until it reaches
//! a terminal state. Peers disagree on whether a text part is tagged `kind`
//! or `type`, so both spellings are read and both are written.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JSON-RPC protocol version used on the wire
pub const JSONRPC_VERSION: &str = "2.0";

/// Outgoing JSON-RPC request envelope
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest {
    /// Protocol version, always "2.0"
    pub jsonrpc: &'static str,
    /// Request id, fresh per call
    pub id: String,
    /// Method name, e.g. "message/send" or "tasks/get"
    pub method: &'static str,
    /// Method parameters
    pub params: serde_json::Value,
}

impl JsonRpcRequest {
    /// Build a `message/send` request carrying one text part
    #[must_use]
    pub fn message_send(text: &str) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id: Uuid::new_v4().to_string(),
            method: "message/send",
            params: serde_json::json!({
                "message": {
                    "role": "user",
                    "messageId": Uuid::new_v4().to_string(),
                    "contextId": Uuid::new_v4().to_string(),
                    "parts": [Part::text(text)],
                },
                "configuration": { "acceptedOutputModes": ["text"] },
            }),
        }
    }

    /// Build a `tasks/get` request for one task id
    #[must_use]
    pub fn tasks_get(task_id: &str) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id: Uuid::new_v4().to_string(),
            method: "tasks/get",
            params: serde_json::json!({ "id": task_id }),
        }
    }
}

/// Incoming JSON-RPC response envelope
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse {
    /// Result payload, absent on error responses
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    /// Error payload, absent on success
    #[serde(default)]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error object
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcError {
    /// Error code
    pub code: i64,
    /// Error message
    pub message: String,
}

/// One part of a message or artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    /// Part discriminator under the `kind` spelling
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Part discriminator under the `type` spelling
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub part_type: Option<String>,
    /// Text payload for text parts
    #[serde(default)]
    pub text: Option<String>,
}

impl Part {
    /// Build a text part, tagged under both spellings
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: Some("text".to_string()),
            part_type: Some("text".to_string()),
            text: Some(text.into()),
        }
    }

    /// Whether this part carries text under either spelling
    #[must_use]
    pub fn is_text(&self) -> bool {
        self.kind.as_deref() == Some("text") || self.part_type.as_deref() == Some("text")
    }
}

/// Terminal and in-flight task states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    /// Submitted but not yet picked up
    Submitted,
    /// The peer is still working on the task
    Working,
    /// The task finished and artifacts are available
    Completed,
    /// The task finished with an error
    Failed,
    /// Any state this client does not model
    #[serde(other)]
    Unknown,
}

/// Status block of a task
#[derive(Debug, Clone, Deserialize)]
pub struct TaskStatus {
    /// Current state
    pub state: TaskState,
    /// Failure or progress message, when the peer provides one
    #[serde(default)]
    pub message: Option<serde_json::Value>,
}

impl TaskStatus {
    /// Render the status message as display text
    #[must_use]
    pub fn message_text(&self) -> String {
        match &self.message {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => "Task failed".to_string(),
        }
    }
}

/// Output bundle attached to a completed task
#[derive(Debug, Clone, Deserialize)]
pub struct Artifact {
    /// Parts making up the artifact
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// An asynchronous task tracked by the peer
///
/// Poll responses are not required to echo the task id, so it defaults
/// to empty when absent.
#[derive(Debug, Clone, Deserialize)]
pub struct Task {
    /// Task id used with `tasks/get`
    #[serde(default)]
    pub id: String,
    /// Current status
    pub status: TaskStatus,
    /// Artifacts, populated once completed
    #[serde(default)]
    pub artifacts: Vec<Artifact>,
}

impl Task {
    /// First text part across the task's artifacts, if any
    #[must_use]
    pub fn first_text(&self) -> Option<&str> {
        self.artifacts
            .iter()
            .flat_map(|a| a.parts.iter())
            .find(|p| p.is_text())
            .and_then(|p| p.text.as_deref())
    }
}
