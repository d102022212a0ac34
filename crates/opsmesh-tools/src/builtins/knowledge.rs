//! Knowledge tools for the learning domain
//!
//! Both tools are pure formatters: they stage proposals as text for the
//! specialist to reason over, with no side effects on any store.

use crate::error::Result;
use crate::registry::{Tool, ToolDefinition, ToolResult};
use serde::Deserialize;

/// Proposals strictly above this confidence skip manual review
const HIGH_CONFIDENCE: f64 = 0.8;

#[derive(Debug, Deserialize)]
struct ProposeInput {
    entity: String,
    relationship: String,
    confidence: f64,
}

/// Stages a knowledge-graph update proposal for validation
pub struct ProposeKnowledgeUpdateTool {
    definition: ToolDefinition,
}

impl ProposeKnowledgeUpdateTool {
    /// Tool name as seen by specialists
    pub const NAME: &'static str = "propose_knowledge_update";

    /// Create the tool
    #[must_use]
    pub fn new() -> Self {
        let definition = ToolDefinition::new(
            Self::NAME,
            "Propose a knowledge graph update for validation. High-confidence \
             proposals are marked ready; low-confidence ones are flagged for review.",
        )
        .with_parameters(serde_json::json!({
            "type": "object",
            "properties": {
                "entity": {
                    "type": "string",
                    "description": "Entity the update applies to"
                },
                "relationship": {
                    "type": "string",
                    "description": "Proposed relationship or property change"
                },
                "confidence": {
                    "type": "number",
                    "description": "Confidence in the proposal, 0.0 to 1.0"
                }
            },
            "required": ["entity", "relationship", "confidence"]
        }));
        Self { definition }
    }
}

impl Default for ProposeKnowledgeUpdateTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Tool for ProposeKnowledgeUpdateTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, input: serde_json::Value) -> Result<ToolResult> {
        let input: ProposeInput = match serde_json::from_value(input) {
            Ok(input) => input,
            Err(e) => return Ok(ToolResult::failure(format!("invalid input: {e}"))),
        };

        let text = if input.confidence > HIGH_CONFIDENCE {
            format!(
                "HIGH CONFIDENCE: Update {} -> {}",
                input.entity, input.relationship
            )
        } else {
            format!(
                "LOW CONFIDENCE: Needs review - {} -> {}",
                input.entity, input.relationship
            )
        };
        Ok(ToolResult::success(text))
    }
}

#[derive(Debug, Deserialize)]
struct PatternInput {
    domain: String,
    pattern: String,
    frequency: u64,
}

/// Records a reusable pattern observed across interactions
pub struct ExtractPatternTool {
    definition: ToolDefinition,
}

impl ExtractPatternTool {
    /// Tool name as seen by specialists
    pub const NAME: &'static str = "extract_learning_pattern";

    /// Create the tool
    #[must_use]
    pub fn new() -> Self {
        let definition = ToolDefinition::new(
            Self::NAME,
            "Extract a reusable pattern observed across agent interactions, \
             naming the domain it applies to and how often it was seen.",
        )
        .with_parameters(serde_json::json!({
            "type": "object",
            "properties": {
                "domain": {
                    "type": "string",
                    "description": "Domain the pattern applies to"
                },
                "pattern": {
                    "type": "string",
                    "description": "Description of the observed pattern"
                },
                "frequency": {
                    "type": "integer",
                    "description": "How many times the pattern was observed"
                }
            },
            "required": ["domain", "pattern", "frequency"]
        }));
        Self { definition }
    }
}

impl Default for ExtractPatternTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Tool for ExtractPatternTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, input: serde_json::Value) -> Result<ToolResult> {
        let input: PatternInput = match serde_json::from_value(input) {
            Ok(input) => input,
            Err(e) => return Ok(ToolResult::failure(format!("invalid input: {e}"))),
        };

        Ok(ToolResult::success(format!(
            "Pattern learned in {}: {} (seen {} times)",
            input.domain, input.pattern, input.frequency
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_high_confidence_proposal() {
        let tool = ProposeKnowledgeUpdateTool::new();

        let result = tool
            .execute(serde_json::json!({
                "entity": "web-01",
                "relationship": "DEPENDS_ON db-01",
                "confidence": 0.95,
            }))
            .await
            .unwrap();

        assert!(result.success);
        assert!(result.output.starts_with("HIGH CONFIDENCE"));
        assert!(result.output.contains("web-01 -> DEPENDS_ON db-01"));
    }

    #[tokio::test]
    async fn test_low_confidence_needs_review() {
        let tool = ProposeKnowledgeUpdateTool::new();

        let result = tool
            .execute(serde_json::json!({
                "entity": "cache-02",
                "relationship": "USES redis-01",
                "confidence": 0.5,
            }))
            .await
            .unwrap();

        assert!(result.success);
        assert!(result.output.starts_with("LOW CONFIDENCE"));
    }

    #[tokio::test]
    async fn test_boundary_confidence_is_low() {
        let tool = ProposeKnowledgeUpdateTool::new();

        let result = tool
            .execute(serde_json::json!({
                "entity": "a",
                "relationship": "b",
                "confidence": 0.8,
            }))
            .await
            .unwrap();

        assert!(result.output.starts_with("LOW CONFIDENCE"));
    }

    #[tokio::test]
    async fn test_pattern_extraction() {
        let tool = ExtractPatternTool::new();

        let result = tool
            .execute(serde_json::json!({
                "domain": "performance",
                "pattern": "cpu alerts precede latency incidents",
                "frequency": 7,
            }))
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(
            result.output,
            "Pattern learned in performance: cpu alerts precede latency incidents (seen 7 times)"
        );
    }

    #[tokio::test]
    async fn test_invalid_input_becomes_text() {
        let tool = ExtractPatternTool::new();

        let result = tool
            .execute(serde_json::json!({"domain": "x"}))
            .await
            .unwrap();

        assert!(!result.success);
        assert!(result.output.contains("invalid input"));
    }
}
