//! Graph query tool - structured queries against the infrastructure graph
//!
//! The specialist chooses the query type, search term and limit; this tool
//! turns that into a parameterized read query, runs it through the injected
//! `GraphStore`, and formats the rows into a textual summary. Store failures
//! come back as error text, never as an `Err`, so pipelines always receive
//! content.

use crate::error::Result;
use crate::registry::{Tool, ToolDefinition, ToolResult};
use crate::store::GraphStore;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

/// Default result limit when the specialist does not pass one
const DEFAULT_LIMIT: u32 = 10;

/// Recognized structured query types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    /// Systems and servers
    Systems,
    /// Services and their connections
    Services,
    /// Security vulnerabilities
    Vulnerabilities,
    /// Events, incidents, alerts
    Events,
    /// Service dependency edges
    Dependencies,
    /// Entity counts across the graph
    Overview,
    /// Keyword search across all entities
    Search,
    /// Custom read query supplied in the search term
    RawQuery,
    /// Direct neighbors of one system
    SystemNeighbors,
    /// Vulnerability impact analysis
    VulnerabilityImpact,
    /// Service status with dependency context
    ServiceHealth,
    /// Incidents related to a system or service
    IncidentCorrelation,
    /// Dependency path between two systems
    DependencyPath,
    /// Rich context around one system
    SystemContext,
}

impl QueryType {
    /// All recognized query-type names, for error messages
    pub const NAMES: &'static [&'static str] = &[
        "systems",
        "services",
        "vulnerabilities",
        "events",
        "dependencies",
        "overview",
        "search",
        "raw-query",
        "system-neighbors",
        "vulnerability-impact",
        "service-health",
        "incident-correlation",
        "dependency-path",
        "system-context",
    ];

    /// Parse a query-type name
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        // Underscore spellings are accepted because models frequently emit them.
        match name.to_lowercase().replace('_', "-").as_str() {
            "systems" => Some(Self::Systems),
            "services" => Some(Self::Services),
            "vulnerabilities" => Some(Self::Vulnerabilities),
            "events" => Some(Self::Events),
            "dependencies" => Some(Self::Dependencies),
            "overview" => Some(Self::Overview),
            "search" => Some(Self::Search),
            "raw-query" | "cypher" => Some(Self::RawQuery),
            "system-neighbors" => Some(Self::SystemNeighbors),
            "vulnerability-impact" => Some(Self::VulnerabilityImpact),
            "service-health" => Some(Self::ServiceHealth),
            "incident-correlation" => Some(Self::IncidentCorrelation),
            "dependency-path" => Some(Self::DependencyPath),
            "system-context" => Some(Self::SystemContext),
            _ => None,
        }
    }

    /// Returns the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Systems => "systems",
            Self::Services => "services",
            Self::Vulnerabilities => "vulnerabilities",
            Self::Events => "events",
            Self::Dependencies => "dependencies",
            Self::Overview => "overview",
            Self::Search => "search",
            Self::RawQuery => "raw-query",
            Self::SystemNeighbors => "system-neighbors",
            Self::VulnerabilityImpact => "vulnerability-impact",
            Self::ServiceHealth => "service-health",
            Self::IncidentCorrelation => "incident-correlation",
            Self::DependencyPath => "dependency-path",
            Self::SystemContext => "system-context",
        }
    }

    /// Whether this query type needs a non-empty search term
    #[must_use]
    pub fn requires_search_term(&self) -> bool {
        matches!(
            self,
            Self::Search
                | Self::RawQuery
                | Self::SystemNeighbors
                | Self::ServiceHealth
                | Self::IncidentCorrelation
                | Self::DependencyPath
                | Self::SystemContext
        )
    }

    /// Build the parameterized read query for this type
    fn build(&self, search_term: &str, limit: u32) -> (String, serde_json::Value) {
        match self {
            Self::Systems => (
                "MATCH (n) WHERE any(label IN labels(n) WHERE label IN ['System', 'Server']) \
                 RETURN n.name AS name, labels(n) AS types, n.environment AS environment \
                 ORDER BY n.name LIMIT $limit"
                    .to_string(),
                serde_json::json!({ "limit": limit }),
            ),
            Self::Services => (
                "MATCH (s:Service) OPTIONAL MATCH (s)-[r]->(related) \
                 RETURN s.name AS service, s.status AS status, \
                 collect({relationship: type(r), target: related.name}) AS connections \
                 ORDER BY s.name LIMIT $limit"
                    .to_string(),
                serde_json::json!({ "limit": limit }),
            ),
            Self::Vulnerabilities => (
                "MATCH (v) WHERE any(label IN labels(v) WHERE label IN ['Vulnerability', 'CVE']) \
                 OPTIONAL MATCH (v)-[:AFFECTS|IMPACTS]->(affected) \
                 RETURN v.name AS vulnerability, v.severity AS severity, \
                 collect(affected.name) AS impacts \
                 ORDER BY v.severity DESC, v.name LIMIT $limit"
                    .to_string(),
                serde_json::json!({ "limit": limit }),
            ),
            Self::Events => (
                "MATCH (e) WHERE any(label IN labels(e) WHERE label IN ['Event', 'Incident', 'Alert']) \
                 RETURN e.title AS event, e.severity AS severity, e.timestamp AS timestamp, \
                 e.description AS description \
                 ORDER BY e.timestamp DESC LIMIT $limit"
                    .to_string(),
                serde_json::json!({ "limit": limit }),
            ),
            Self::Dependencies => (
                "MATCH (source)-[r:DEPENDS_ON|USES|REQUIRES]->(target) \
                 RETURN source.name AS from_entity, type(r) AS relationship, \
                 target.name AS to_entity \
                 ORDER BY source.name LIMIT $limit"
                    .to_string(),
                serde_json::json!({ "limit": limit }),
            ),
            Self::Overview => (
                "MATCH (n) RETURN labels(n)[0] AS entity_type, count(n) AS count \
                 ORDER BY count DESC LIMIT 10"
                    .to_string(),
                serde_json::json!({}),
            ),
            Self::Search => (
                "MATCH (n) WHERE any(prop IN keys(n) WHERE toString(n[prop]) =~ $pattern) \
                 RETURN labels(n)[0] AS entity_type, n.name AS name \
                 ORDER BY n.name LIMIT $limit"
                    .to_string(),
                serde_json::json!({ "pattern": format!("(?i).*{search_term}.*"), "limit": limit }),
            ),
            Self::RawQuery => (
                search_term.to_string(),
                serde_json::json!({ "limit": limit }),
            ),
            Self::SystemNeighbors => (
                "MATCH (system) WHERE system.name = $system_name \
                 OPTIONAL MATCH (system)-[r]-(neighbor) \
                 RETURN system.name AS system_name, collect(DISTINCT {neighbor: neighbor.name, \
                 relationship: type(r)})[0..$limit] AS neighbors LIMIT 1"
                    .to_string(),
                serde_json::json!({ "system_name": search_term, "limit": limit }),
            ),
            Self::VulnerabilityImpact => (
                "MATCH (v) WHERE any(label IN labels(v) WHERE label IN ['Vulnerability', 'CVE']) \
                 AND ($search_term = '' OR v.name CONTAINS $search_term) \
                 OPTIONAL MATCH (v)-[r]-(affected) \
                 RETURN v.name AS vulnerability, v.severity AS severity, \
                 collect(DISTINCT affected.name)[0..$limit] AS impact_analysis \
                 ORDER BY v.severity DESC LIMIT $limit"
                    .to_string(),
                serde_json::json!({ "search_term": search_term, "limit": limit }),
            ),
            Self::ServiceHealth => (
                "MATCH (s:Service) WHERE s.name CONTAINS $service_name \
                 OPTIONAL MATCH (s)-[:DEPENDS_ON]->(dependency) \
                 OPTIONAL MATCH (s)<-[:USES]-(dependent) \
                 RETURN s.name AS service_name, s.status AS current_status, \
                 collect(DISTINCT dependency.name)[0..10] AS dependencies, \
                 collect(DISTINCT dependent.name)[0..10] AS dependents \
                 ORDER BY s.name LIMIT $limit"
                    .to_string(),
                serde_json::json!({ "service_name": search_term, "limit": limit }),
            ),
            Self::IncidentCorrelation => (
                "MATCH (entity) WHERE entity.name CONTAINS $entity_name \
                 OPTIONAL MATCH (entity)-[r]-(incident) \
                 WHERE any(label IN labels(incident) WHERE label IN ['Incident', 'ServiceNowIncident', 'Event']) \
                 RETURN entity.name AS entity_name, collect(DISTINCT {number: incident.number, \
                 summary: incident.short_description, state: incident.state})[0..$limit] AS related_incidents \
                 LIMIT $limit"
                    .to_string(),
                serde_json::json!({ "entity_name": search_term, "limit": limit }),
            ),
            Self::DependencyPath => {
                let (source, target) = search_term
                    .split_once(',')
                    .map(|(s, t)| (s.trim(), t.trim()))
                    .unwrap_or((search_term, ""));
                (
                    "MATCH (source), (target) WHERE source.name CONTAINS $source_name \
                     AND target.name CONTAINS $target_name \
                     OPTIONAL MATCH path = shortestPath((source)-[:DEPENDS_ON|USES|REQUIRES*1..5]->(target)) \
                     RETURN source.name AS source_system, target.name AS target_system, \
                     CASE WHEN path IS NOT NULL THEN [node IN nodes(path) | node.name] ELSE [] END AS dependency_path, \
                     CASE WHEN path IS NOT NULL THEN length(path) ELSE -1 END AS path_length LIMIT 1"
                        .to_string(),
                    serde_json::json!({ "source_name": source, "target_name": target }),
                )
            }
            Self::SystemContext => (
                "MATCH (system) WHERE system.name CONTAINS $system_name \
                 OPTIONAL MATCH (system)-[r]-(neighbor) \
                 RETURN system.name AS system_name, labels(system) AS system_types, \
                 properties(system) AS system_properties, \
                 collect(DISTINCT {neighbor: neighbor.name, relationship: type(r)})[0..10] AS direct_context \
                 ORDER BY system.name LIMIT $limit"
                    .to_string(),
                serde_json::json!({ "system_name": search_term, "limit": limit }),
            ),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GraphQueryInput {
    query_type: String,
    #[serde(default)]
    search_term: String,
    #[serde(default)]
    limit: Option<u32>,
}

/// Structured-query tool over the infrastructure graph
pub struct GraphQueryTool {
    definition: ToolDefinition,
    store: Arc<dyn GraphStore>,
}

impl GraphQueryTool {
    /// Tool name as seen by specialists
    pub const NAME: &'static str = "graph_query";

    /// Create the tool around an injected graph store
    #[must_use]
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        let definition = ToolDefinition::new(
            Self::NAME,
            "Execute structured queries against the infrastructure knowledge graph. \
             Pick the query_type that fits the question: 'systems' for servers and hosts, \
             'services' for applications, 'vulnerabilities' for security issues, 'events' \
             for incidents and alerts, 'dependencies' for connections, 'overview' for \
             entity counts, 'search' for keyword lookup. Analysis types: 'system-neighbors', \
             'vulnerability-impact', 'service-health', 'incident-correlation', \
             'dependency-path' (search_term as 'source,target'), 'system-context', \
             'raw-query' (search_term as the query text).",
        )
        .with_parameters(serde_json::json!({
            "type": "object",
            "properties": {
                "query_type": {
                    "type": "string",
                    "enum": QueryType::NAMES,
                    "description": "Which structured query to run"
                },
                "search_term": {
                    "type": "string",
                    "description": "Entity name, keyword, or query text depending on query_type"
                },
                "limit": {
                    "type": "integer",
                    "description": "Maximum number of results (default 10)"
                }
            },
            "required": ["query_type"]
        }));

        Self { definition, store }
    }

    fn format_rows(query_type: QueryType, rows: &[serde_json::Value]) -> String {
        match query_type {
            QueryType::Overview => {
                let mut out = String::from("Infrastructure Overview:\n");
                for row in rows {
                    out.push_str(&format!(
                        "- {}: {} entities\n",
                        row.get("entity_type").and_then(|v| v.as_str()).unwrap_or("Unknown"),
                        row.get("count").and_then(|v| v.as_u64()).unwrap_or(0),
                    ));
                }
                out
            }
            QueryType::DependencyPath => {
                let mut out = String::new();
                for row in rows {
                    let source = row.get("source_system").and_then(|v| v.as_str()).unwrap_or("Unknown");
                    let target = row.get("target_system").and_then(|v| v.as_str()).unwrap_or("Unknown");
                    let length = row.get("path_length").and_then(|v| v.as_i64()).unwrap_or(-1);
                    if length > 0 {
                        let path: Vec<&str> = row
                            .get("dependency_path")
                            .and_then(|v| v.as_array())
                            .map(|nodes| nodes.iter().filter_map(|n| n.as_str()).collect())
                            .unwrap_or_default();
                        out.push_str(&format!(
                            "Path from {} to {} (length {}): {}\n",
                            source,
                            target,
                            length,
                            path.join(" -> ")
                        ));
                    } else {
                        out.push_str(&format!(
                            "No dependency path found between {source} and {target}\n"
                        ));
                    }
                }
                out
            }
            _ => {
                let mut out = format!(
                    "Results for {} (showing {} items):\n",
                    query_type.as_str(),
                    rows.len()
                );
                for (i, row) in rows.iter().enumerate() {
                    out.push_str(&format!("{}. ", i + 1));
                    if let Some(obj) = row.as_object() {
                        let fields: Vec<String> = obj
                            .iter()
                            .filter(|(_, v)| !v.is_null())
                            .map(|(k, v)| match v {
                                serde_json::Value::String(s) => format!("{k}: {s}"),
                                other => format!("{k}: {other}"),
                            })
                            .collect();
                        out.push_str(&fields.join(", "));
                    } else {
                        out.push_str(&row.to_string());
                    }
                    out.push('\n');
                }
                out
            }
        }
    }
}

#[async_trait::async_trait]
impl Tool for GraphQueryTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, input: serde_json::Value) -> Result<ToolResult> {
        let input: GraphQueryInput = match serde_json::from_value(input) {
            Ok(input) => input,
            Err(e) => return Ok(ToolResult::failure(format!("invalid input: {e}"))),
        };

        let Some(query_type) = QueryType::parse(&input.query_type) else {
            return Ok(ToolResult::failure(format!(
                "Unknown query_type '{}'. Available types: {}",
                input.query_type,
                QueryType::NAMES.join(", ")
            )));
        };

        if query_type.requires_search_term() && input.search_term.trim().is_empty() {
            return Ok(ToolResult::failure(format!(
                "search_term required for {} query",
                query_type.as_str()
            )));
        }

        let limit = input.limit.unwrap_or(DEFAULT_LIMIT);
        let (query, params) = query_type.build(input.search_term.trim(), limit);

        debug!(query_type = query_type.as_str(), limit, "Running graph query");

        let rows = match self.store.execute(&query, params).await {
            Ok(rows) => rows,
            Err(e) => return Ok(ToolResult::failure(format!("query error: {e}"))),
        };

        if rows.is_empty() {
            return Ok(ToolResult::success(format!(
                "No results found for query type: {}",
                query_type.as_str()
            )));
        }

        Ok(ToolResult::success(Self::format_rows(query_type, &rows)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    struct FixedStore {
        rows: Vec<serde_json::Value>,
    }

    #[async_trait::async_trait]
    impl GraphStore for FixedStore {
        async fn execute(
            &self,
            _query: &str,
            _params: serde_json::Value,
        ) -> Result<Vec<serde_json::Value>> {
            Ok(self.rows.clone())
        }
    }

    struct FailingStore;

    #[async_trait::async_trait]
    impl GraphStore for FailingStore {
        async fn execute(
            &self,
            _query: &str,
            _params: serde_json::Value,
        ) -> Result<Vec<serde_json::Value>> {
            Err(Error::Store("connection refused".to_string()))
        }
    }

    #[test]
    fn test_parse_query_types() {
        assert_eq!(QueryType::parse("systems"), Some(QueryType::Systems));
        assert_eq!(QueryType::parse("SYSTEM_NEIGHBORS"), Some(QueryType::SystemNeighbors));
        assert_eq!(QueryType::parse("raw-query"), Some(QueryType::RawQuery));
        assert_eq!(QueryType::parse("nonsense"), None);
    }

    #[test]
    fn test_search_term_requirements() {
        assert!(!QueryType::Systems.requires_search_term());
        assert!(QueryType::Search.requires_search_term());
        assert!(QueryType::DependencyPath.requires_search_term());
    }

    #[tokio::test]
    async fn test_systems_query_formats_rows() {
        let store = Arc::new(FixedStore {
            rows: vec![
                serde_json::json!({"name": "web-01", "environment": "production"}),
                serde_json::json!({"name": "db-01", "environment": "production"}),
            ],
        });
        let tool = GraphQueryTool::new(store);

        let result = tool
            .execute(serde_json::json!({"query_type": "systems"}))
            .await
            .unwrap();

        assert!(result.success);
        assert!(result.output.contains("web-01"));
        assert!(result.output.contains("showing 2 items"));
    }

    #[tokio::test]
    async fn test_store_error_becomes_text() {
        let tool = GraphQueryTool::new(Arc::new(FailingStore));

        let result = tool
            .execute(serde_json::json!({"query_type": "overview"}))
            .await
            .unwrap();

        assert!(!result.success);
        assert!(result.output.contains("query error"));
        assert!(result.output.contains("connection refused"));
    }

    #[tokio::test]
    async fn test_unknown_query_type_lists_options() {
        let tool = GraphQueryTool::new(Arc::new(FixedStore { rows: vec![] }));

        let result = tool
            .execute(serde_json::json!({"query_type": "bogus"}))
            .await
            .unwrap();

        assert!(!result.success);
        assert!(result.output.contains("Unknown query_type"));
        assert!(result.output.contains("system-neighbors"));
    }

    #[tokio::test]
    async fn test_missing_search_term_rejected() {
        let tool = GraphQueryTool::new(Arc::new(FixedStore { rows: vec![] }));

        let result = tool
            .execute(serde_json::json!({"query_type": "search"}))
            .await
            .unwrap();

        assert!(!result.success);
        assert!(result.output.contains("search_term required"));
    }

    #[tokio::test]
    async fn test_empty_rows_message() {
        let tool = GraphQueryTool::new(Arc::new(FixedStore { rows: vec![] }));

        let result = tool
            .execute(serde_json::json!({"query_type": "events"}))
            .await
            .unwrap();

        assert!(result.success);
        assert!(result.output.contains("No results found"));
    }
}
