//! Store - collaborator traits for external data retrieval services
//!
//! The graph database and the vector index are external services; opsmesh
//! only depends on these two narrow contracts. Concrete clients are
//! constructed at the composition root and injected, so no module holds a
//! lazily-built global connection.

use crate::error::Result;

/// Query-in/rows-out contract for the external graph database.
///
/// Rows come back as JSON objects keyed by the query's return aliases.
#[async_trait::async_trait]
pub trait GraphStore: Send + Sync {
    /// Execute a read query with named parameters and return the rows.
    async fn execute(
        &self,
        query: &str,
        params: serde_json::Value,
    ) -> Result<Vec<serde_json::Value>>;
}

/// One ranked match from the vector index
#[derive(Debug, Clone)]
pub struct VectorMatch {
    /// Identifier of the matched entity
    pub id: String,
    /// Attributes of the matched entity
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

/// Query-in/ranked-matches-out contract for the external vector index.
#[async_trait::async_trait]
pub trait VectorIndex: Send + Sync {
    /// Return up to `top_k` entities most similar to the query text.
    async fn similarity_search(&self, query: &str, top_k: usize) -> Result<Vec<VectorMatch>>;
}
