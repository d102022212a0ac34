//! Message types for LLM conversations
//!
//! This module defines the turn type shared by every pipeline. External
//! message JSON (ingress payloads, peer responses) is normalized into
//! `Message` exactly once, at the boundary where it arrives; nothing
//! downstream branches on message shape.

use crate::tools::ToolCall;
use serde::{Deserialize, Serialize};

/// Role in a conversation message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System message (instructions)
    System,
    /// User message
    User,
    /// Assistant message
    Assistant,
    /// Tool response
    Tool,
}

impl MessageRole {
    /// Returns the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
        }
    }

    /// Parse a role string; unknown roles default to `User`.
    #[must_use]
    pub fn parse(role: &str) -> Self {
        match role.to_lowercase().as_str() {
            "system" => Self::System,
            "assistant" => Self::Assistant,
            "tool" => Self::Tool,
            _ => Self::User,
        }
    }
}

/// A message in a conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender
    pub role: MessageRole,
    /// Message content
    pub content: String,
    /// Tool call ID (for tool responses)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// Tool calls issued by this assistant turn.
    ///
    /// A `tool` turn is only valid downstream when a preceding assistant
    /// turn declares its `tool_call_id` here.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// Producer tag: which node/specialist appended this message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Message {
    /// Create a system message
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
            tool_call_id: None,
            tool_calls: Vec::new(),
            name: None,
        }
    }

    /// Create a user message
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            tool_call_id: None,
            tool_calls: Vec::new(),
            name: None,
        }
    }

    /// Create an assistant message
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            tool_call_id: None,
            tool_calls: Vec::new(),
            name: None,
        }
    }

    /// Create an assistant message declaring tool calls
    #[must_use]
    pub fn assistant_with_tool_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            tool_call_id: None,
            tool_calls,
            name: None,
        }
    }

    /// Create a tool response message
    #[must_use]
    pub fn tool_response(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Tool,
            content: content.into(),
            tool_call_id: Some(tool_call_id.into()),
            tool_calls: Vec::new(),
            name: None,
        }
    }

    /// Tag this message with the producing node's name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Normalize an externally-shaped message value into a `Message`.
    ///
    /// Accepts `{role, content, name?}` where `content` may be a string or a
    /// list of fragments; fragments are coerced to strings and joined with
    /// single spaces. Missing fields default to an empty user message. This
    /// is the only place message shape is inspected.
    #[must_use]
    pub fn normalize(value: &serde_json::Value) -> Self {
        let role = value
            .get("role")
            .and_then(|r| r.as_str())
            .map(MessageRole::parse)
            .unwrap_or(MessageRole::User);

        let content = match value.get("content") {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(" "),
            Some(other) if !other.is_null() => other.to_string(),
            _ => String::new(),
        };

        let name = value
            .get("name")
            .and_then(|n| n.as_str())
            .map(String::from);

        Self {
            role,
            content,
            tool_call_id: None,
            tool_calls: Vec::new(),
            name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_creation() {
        let system = Message::system("You are a database expert");
        assert_eq!(system.role, MessageRole::System);

        let user = Message::user("Count all servers");
        assert_eq!(user.role, MessageRole::User);

        let tagged = Message::assistant("12 systems found").with_name("graph_collector");
        assert_eq!(tagged.name.as_deref(), Some("graph_collector"));
    }

    #[test]
    fn test_assistant_with_tool_calls() {
        let call = ToolCall {
            id: "call_1".to_string(),
            name: "graph_query".to_string(),
            arguments: "{}".to_string(),
        };
        let msg = Message::assistant_with_tool_calls("", vec![call]);

        assert_eq!(msg.role, MessageRole::Assistant);
        assert_eq!(msg.tool_calls.len(), 1);
        assert_eq!(msg.tool_calls[0].id, "call_1");

        // Plain assistant turns serialize without the field.
        let plain = serde_json::to_value(Message::assistant("hi")).unwrap();
        assert!(plain.get("tool_calls").is_none());
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(MessageRole::parse("ASSISTANT"), MessageRole::Assistant);
        assert_eq!(MessageRole::parse("tool"), MessageRole::Tool);
        assert_eq!(MessageRole::parse("something-else"), MessageRole::User);
    }

    #[test]
    fn test_normalize_string_content() {
        let msg = Message::normalize(&json!({"role": "assistant", "content": "X"}));
        assert_eq!(msg.role, MessageRole::Assistant);
        assert_eq!(msg.content, "X");
        assert_eq!(msg.name, None);
    }

    #[test]
    fn test_normalize_list_content() {
        let msg = Message::normalize(&json!({"role": "assistant", "content": ["a", "b"]}));
        assert_eq!(msg.content, "a b");
    }

    #[test]
    fn test_normalize_missing_fields() {
        let msg = Message::normalize(&json!({}));
        assert_eq!(msg.role, MessageRole::User);
        assert_eq!(msg.content, "");
    }

    #[test]
    fn test_normalize_keeps_name() {
        let msg = Message::normalize(
            &json!({"role": "assistant", "content": "findings", "name": "context_enhancer"}),
        );
        assert_eq!(msg.name.as_deref(), Some("context_enhancer"));
    }
}
