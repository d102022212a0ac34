//! Approval gate for security findings
//!
//! Simplified human-in-the-loop: the gate does not block execution, it marks
//! the finding as requiring manual review so the specialist carries that
//! state into its answer.

use crate::error::Result;
use crate::registry::{Tool, ToolDefinition, ToolResult};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize)]
struct ApprovalInput {
    finding: String,
    risk_level: String,
}

/// Marks a security finding as requiring human approval
pub struct ApprovalGateTool {
    definition: ToolDefinition,
}

impl ApprovalGateTool {
    /// Tool name as seen by specialists
    pub const NAME: &'static str = "security_approval_gate";

    /// Create the tool
    #[must_use]
    pub fn new() -> Self {
        let definition = ToolDefinition::new(
            Self::NAME,
            "Request human approval for a security finding before acting on it. \
             Call this for any finding that would lead to a remediation step.",
        )
        .with_parameters(serde_json::json!({
            "type": "object",
            "properties": {
                "finding": {
                    "type": "string",
                    "description": "The security finding that needs review"
                },
                "risk_level": {
                    "type": "string",
                    "description": "Assessed risk level, e.g. low, medium, high, critical"
                }
            },
            "required": ["finding", "risk_level"]
        }));
        Self { definition }
    }
}

impl Default for ApprovalGateTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Tool for ApprovalGateTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, input: serde_json::Value) -> Result<ToolResult> {
        let input: ApprovalInput = match serde_json::from_value(input) {
            Ok(input) => input,
            Err(e) => return Ok(ToolResult::failure(format!("invalid input: {e}"))),
        };

        info!(risk_level = %input.risk_level, "Security approval requested");

        Ok(ToolResult::success(format!(
            "SECURITY REVIEW REQUIRED: {} (Risk Level: {}) - Manual approval needed",
            input.finding, input.risk_level
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_marks_finding_for_review() {
        let tool = ApprovalGateTool::new();

        let result = tool
            .execute(serde_json::json!({
                "finding": "CVE-2026-1234 on web-01",
                "risk_level": "critical",
            }))
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(
            result.output,
            "SECURITY REVIEW REQUIRED: CVE-2026-1234 on web-01 (Risk Level: critical) - Manual approval needed"
        );
    }

    #[tokio::test]
    async fn test_missing_fields_rejected() {
        let tool = ApprovalGateTool::new();

        let result = tool
            .execute(serde_json::json!({"finding": "something"}))
            .await
            .unwrap();

        assert!(!result.success);
    }
}
