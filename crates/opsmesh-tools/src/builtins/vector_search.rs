//! Vector search tool - semantic similarity lookup over indexed entities

use crate::error::Result;
use crate::registry::{Tool, ToolDefinition, ToolResult};
use crate::store::VectorIndex;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

/// Default number of ranked matches returned
const DEFAULT_TOP_K: usize = 5;

#[derive(Debug, Deserialize)]
struct VectorSearchInput {
    query: String,
    #[serde(default)]
    top_k: Option<usize>,
}

/// Semantic-similarity search over the vector index
pub struct VectorSearchTool {
    definition: ToolDefinition,
    index: Arc<dyn VectorIndex>,
}

impl VectorSearchTool {
    /// Tool name as seen by specialists
    pub const NAME: &'static str = "vector_search";

    /// Create the tool around an injected vector index
    #[must_use]
    pub fn new(index: Arc<dyn VectorIndex>) -> Self {
        let definition = ToolDefinition::new(
            Self::NAME,
            "Execute semantic similarity search across indexed infrastructure \
             entities. Use this when the question is phrased in natural language \
             rather than by exact entity name.",
        )
        .with_parameters(serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Natural-language search query"
                },
                "top_k": {
                    "type": "integer",
                    "description": "Number of top matches to return (default 5)"
                }
            },
            "required": ["query"]
        }));

        Self { definition, index }
    }
}

#[async_trait::async_trait]
impl Tool for VectorSearchTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, input: serde_json::Value) -> Result<ToolResult> {
        let input: VectorSearchInput = match serde_json::from_value(input) {
            Ok(input) => input,
            Err(e) => return Ok(ToolResult::failure(format!("invalid input: {e}"))),
        };

        let query = input.query.trim();
        if query.is_empty() {
            return Ok(ToolResult::failure("query must not be empty"));
        }

        let top_k = input.top_k.unwrap_or(DEFAULT_TOP_K);
        debug!(query, top_k, "Running vector similarity search");

        let matches = match self.index.similarity_search(query, top_k).await {
            Ok(matches) => matches,
            Err(e) => return Ok(ToolResult::failure(format!("vector search error: {e}"))),
        };

        if matches.is_empty() {
            return Ok(ToolResult::success(format!(
                "No similar items found for: {query}"
            )));
        }

        let mut out = format!(
            "Vector similarity results for '{}' (top {}):\n",
            query,
            matches.len()
        );
        for (i, m) in matches.iter().enumerate() {
            let labels = m
                .attributes
                .get("labels")
                .and_then(|v| v.as_str())
                .unwrap_or("Unknown");
            let props: Vec<String> = m
                .attributes
                .iter()
                .filter(|(k, v)| *k != "labels" && !v.is_null())
                .map(|(k, v)| match v {
                    serde_json::Value::String(s) => format!("{k}: {s}"),
                    other => format!("{k}: {other}"),
                })
                .collect();
            out.push_str(&format!("{}. {}: {{{}}}\n", i + 1, labels, props.join(", ")));
        }

        Ok(ToolResult::success(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::store::VectorMatch;

    struct FixedIndex {
        matches: Vec<VectorMatch>,
    }

    #[async_trait::async_trait]
    impl VectorIndex for FixedIndex {
        async fn similarity_search(
            &self,
            _query: &str,
            top_k: usize,
        ) -> Result<Vec<VectorMatch>> {
            Ok(self.matches.iter().take(top_k).cloned().collect())
        }
    }

    struct FailingIndex;

    #[async_trait::async_trait]
    impl VectorIndex for FailingIndex {
        async fn similarity_search(
            &self,
            _query: &str,
            _top_k: usize,
        ) -> Result<Vec<VectorMatch>> {
            Err(Error::Store("index unavailable".to_string()))
        }
    }

    fn match_with(labels: &str, name: &str) -> VectorMatch {
        let mut attributes = serde_json::Map::new();
        attributes.insert("labels".to_string(), serde_json::json!(labels));
        attributes.insert("name".to_string(), serde_json::json!(name));
        VectorMatch {
            id: name.to_string(),
            attributes,
        }
    }

    #[tokio::test]
    async fn test_formats_ranked_matches() {
        let tool = VectorSearchTool::new(Arc::new(FixedIndex {
            matches: vec![
                match_with("Service", "payment-api"),
                match_with("System", "web-01"),
            ],
        }));

        let result = tool
            .execute(serde_json::json!({"query": "payment outage"}))
            .await
            .unwrap();

        assert!(result.success);
        assert!(result.output.contains("top 2"));
        assert!(result.output.contains("1. Service"));
        assert!(result.output.contains("payment-api"));
    }

    #[tokio::test]
    async fn test_empty_matches_message() {
        let tool = VectorSearchTool::new(Arc::new(FixedIndex { matches: vec![] }));

        let result = tool
            .execute(serde_json::json!({"query": "unknown thing"}))
            .await
            .unwrap();

        assert!(result.success);
        assert!(result.output.contains("No similar items found"));
    }

    #[tokio::test]
    async fn test_index_error_becomes_text() {
        let tool = VectorSearchTool::new(Arc::new(FailingIndex));

        let result = tool
            .execute(serde_json::json!({"query": "anything"}))
            .await
            .unwrap();

        assert!(!result.success);
        assert!(result.output.contains("vector search error"));
    }

    #[tokio::test]
    async fn test_blank_query_rejected() {
        let tool = VectorSearchTool::new(Arc::new(FixedIndex { matches: vec![] }));

        let result = tool
            .execute(serde_json::json!({"query": "   "}))
            .await
            .unwrap();

        assert!(!result.success);
    }
}
