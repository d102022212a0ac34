//! Tool binding types for function calling

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Tool definition for function calling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name
    pub name: String,
    /// Tool description
    pub description: String,
    /// JSON schema for parameters
    pub parameters: serde_json::Value,
}

impl ToolDefinition {
    /// Create a new tool definition
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// A tool call requested by the LLM
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique ID for this tool call
    pub id: String,
    /// Tool name
    pub name: String,
    /// Arguments as JSON string
    pub arguments: String,
}

impl ToolCall {
    /// Parse arguments as a typed value
    pub fn parse_arguments<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.arguments).map_err(|e| Error::InvalidResponse(e.to_string()))
    }
}

/// Tool choice strategy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolChoice {
    /// Model decides whether to call a tool
    Auto,
    /// No tool calls allowed
    None,
    /// At least one tool call required
    Required,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_arguments() {
        let call = ToolCall {
            id: "call_1".to_string(),
            name: "graph_query".to_string(),
            arguments: r#"{"query_type": "systems", "limit": 5}"#.to_string(),
        };

        let args: serde_json::Value = call.parse_arguments().unwrap();
        assert_eq!(args["query_type"], "systems");
        assert_eq!(args["limit"], 5);
    }

    #[test]
    fn test_parse_arguments_malformed() {
        let call = ToolCall {
            id: "call_1".to_string(),
            name: "graph_query".to_string(),
            arguments: "not json".to_string(),
        };

        let parsed: Result<serde_json::Value> = call.parse_arguments();
        assert!(parsed.is_err());
    }
}
