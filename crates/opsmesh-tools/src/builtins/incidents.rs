//! Incident tools - record discovery and timeline reconstruction
//!
//! Root-cause work starts from the incident records stored alongside the
//! infrastructure graph: one tool lists the recent records, the other pulls
//! infrastructure events from a window around a specific incident.

use crate::error::Result;
use crate::registry::{Tool, ToolDefinition, ToolResult};
use crate::store::GraphStore;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

const DISCOVERY_LIMIT: u32 = 20;
const DEFAULT_HOURS_BEFORE: i64 = 2;
const DEFAULT_HOURS_AFTER: i64 = 1;

fn field<'a>(row: &'a serde_json::Value, key: &str) -> &'a str {
    row.get(key).and_then(|v| v.as_str()).unwrap_or("Unknown")
}

/// Lists recent incident records from the incident management data
pub struct DiscoverIncidentsTool {
    definition: ToolDefinition,
    store: Arc<dyn GraphStore>,
}

impl DiscoverIncidentsTool {
    /// Tool name as seen by specialists
    pub const NAME: &'static str = "discover_incidents";

    /// Create the tool around an injected graph store
    #[must_use]
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        let definition = ToolDefinition::new(
            Self::NAME,
            "List the most recent incident records with state, priority, summary \
             and assignment. Use this first to find the incident number before \
             running a timeline analysis.",
        );
        Self { definition, store }
    }
}

#[async_trait::async_trait]
impl Tool for DiscoverIncidentsTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, _input: serde_json::Value) -> Result<ToolResult> {
        let query = "MATCH (i:ServiceNowIncident) \
                     RETURN i.number AS incident_number, i.state AS state, \
                     i.priority AS priority, i.severity AS severity, \
                     i.category AS category, i.short_description AS summary, \
                     i.opened_at AS opened_at, i.resolved_at AS resolved_at, \
                     i.assigned_to AS assigned_to, i.business_service AS business_service \
                     ORDER BY i.opened_at DESC LIMIT $limit";

        debug!("Discovering incident records");

        let rows = match self
            .store
            .execute(query, serde_json::json!({ "limit": DISCOVERY_LIMIT }))
            .await
        {
            Ok(rows) => rows,
            Err(e) => {
                return Ok(ToolResult::failure(format!(
                    "Error discovering incidents: {e}"
                )))
            }
        };

        if rows.is_empty() {
            return Ok(ToolResult::success(
                "No incidents found in the incident management system",
            ));
        }

        let mut out = String::from("Incidents Available:\n");
        out.push_str(&"=".repeat(50));
        out.push('\n');
        for row in &rows {
            out.push_str(&format!("Number: {}\n", field(row, "incident_number")));
            out.push_str(&format!("State: {}\n", field(row, "state")));
            out.push_str(&format!("Priority: {}\n", field(row, "priority")));
            out.push_str(&format!("Summary: {}\n", field(row, "summary")));
            out.push_str(&format!(
                "Business Service: {}\n",
                field(row, "business_service")
            ));
            out.push_str(&format!("Opened: {}\n", field(row, "opened_at")));
            out.push_str(&format!(
                "Assigned To: {}\n",
                row.get("assigned_to")
                    .and_then(|v| v.as_str())
                    .unwrap_or("Unassigned")
            ));
            out.push_str(&"-".repeat(50));
            out.push('\n');
        }

        Ok(ToolResult::success(out))
    }
}

#[derive(Debug, Deserialize)]
struct TimelineInput {
    incident_number: String,
    #[serde(default)]
    hours_before: Option<i64>,
    #[serde(default)]
    hours_after: Option<i64>,
}

/// Reconstructs the infrastructure event timeline around one incident
pub struct IncidentTimelineTool {
    definition: ToolDefinition,
    store: Arc<dyn GraphStore>,
}

impl IncidentTimelineTool {
    /// Tool name as seen by specialists
    pub const NAME: &'static str = "incident_timeline";

    /// Create the tool around an injected graph store
    #[must_use]
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        let definition = ToolDefinition::new(
            Self::NAME,
            "Reconstruct the infrastructure event timeline around a specific \
             incident. Looks up the incident by number and returns events from \
             a configurable window before and after it opened.",
        )
        .with_parameters(serde_json::json!({
            "type": "object",
            "properties": {
                "incident_number": {
                    "type": "string",
                    "description": "Incident record number, e.g. INC0012345"
                },
                "hours_before": {
                    "type": "integer",
                    "description": "Hours before the incident opened (default 2)"
                },
                "hours_after": {
                    "type": "integer",
                    "description": "Hours after the incident opened (default 1)"
                }
            },
            "required": ["incident_number"]
        }));
        Self { definition, store }
    }
}

#[async_trait::async_trait]
impl Tool for IncidentTimelineTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, input: serde_json::Value) -> Result<ToolResult> {
        let input: TimelineInput = match serde_json::from_value(input) {
            Ok(input) => input,
            Err(e) => return Ok(ToolResult::failure(format!("invalid input: {e}"))),
        };

        let incident_number = input.incident_number.trim();
        if incident_number.is_empty() {
            return Ok(ToolResult::failure("incident_number must not be empty"));
        }
        let hours_before = input.hours_before.unwrap_or(DEFAULT_HOURS_BEFORE);
        let hours_after = input.hours_after.unwrap_or(DEFAULT_HOURS_AFTER);

        debug!(incident_number, hours_before, hours_after, "Building incident timeline");

        let incident_query = "MATCH (i:ServiceNowIncident {number: $incident_number}) \
                              RETURN i.opened_at AS opened_at, i.severity AS severity, \
                              i.state AS state, i.short_description AS summary";
        let incident_rows = match self
            .store
            .execute(
                incident_query,
                serde_json::json!({ "incident_number": incident_number }),
            )
            .await
        {
            Ok(rows) => rows,
            Err(e) => return Ok(ToolResult::failure(format!("Timeline query error: {e}"))),
        };

        let Some(incident) = incident_rows.first() else {
            return Ok(ToolResult::failure(format!(
                "Incident {incident_number} not found."
            )));
        };

        let events_query = "MATCH (e:Event) \
                            WHERE e.timestamp >= datetime($opened_at) - duration({hours: $hours_before}) \
                            AND e.timestamp <= datetime($opened_at) + duration({hours: $hours_after}) \
                            OPTIONAL MATCH (s:System)-[:HAS_EVENT]->(e) \
                            RETURN e.timestamp AS event_time, e.event_type AS type, \
                            e.description AS description, s.hostname AS system \
                            ORDER BY e.timestamp";
        let event_rows = match self
            .store
            .execute(
                events_query,
                serde_json::json!({
                    "opened_at": field(incident, "opened_at"),
                    "hours_before": hours_before,
                    "hours_after": hours_after,
                }),
            )
            .await
        {
            Ok(rows) => rows,
            Err(e) => return Ok(ToolResult::failure(format!("Timeline query error: {e}"))),
        };

        let mut out = format!("Timeline Analysis for {incident_number}\n");
        out.push_str(&format!("Summary: {}\n", field(incident, "summary")));
        out.push_str(&format!(
            "Analysis Window: {hours_before}h before to {hours_after}h after\n"
        ));
        out.push_str(&"=".repeat(60));
        out.push('\n');

        let events: Vec<&serde_json::Value> = event_rows
            .iter()
            .filter(|row| row.get("event_time").is_some_and(|v| !v.is_null()))
            .collect();
        if events.is_empty() {
            out.push_str("No infrastructure events found in time window\n");
        } else {
            for event in events {
                out.push_str(&format!(
                    "{} | {} | {} | {}\n",
                    field(event, "event_time"),
                    field(event, "system"),
                    field(event, "type"),
                    event
                        .get("description")
                        .and_then(|v| v.as_str())
                        .unwrap_or("No description"),
                ));
            }
        }

        Ok(ToolResult::success(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    /// Returns canned rows per call, in order.
    struct SequencedStore {
        responses: std::sync::Mutex<Vec<Result<Vec<serde_json::Value>>>>,
    }

    impl SequencedStore {
        fn new(responses: Vec<Result<Vec<serde_json::Value>>>) -> Self {
            let mut responses = responses;
            responses.reverse();
            Self {
                responses: std::sync::Mutex::new(responses),
            }
        }
    }

    #[async_trait::async_trait]
    impl GraphStore for SequencedStore {
        async fn execute(
            &self,
            _query: &str,
            _params: serde_json::Value,
        ) -> Result<Vec<serde_json::Value>> {
            self.responses
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Ok(vec![]))
        }
    }

    #[tokio::test]
    async fn test_discover_formats_records() {
        let store = Arc::new(SequencedStore::new(vec![Ok(vec![serde_json::json!({
            "incident_number": "INC0010001",
            "state": "In Progress",
            "priority": "1 - Critical",
            "summary": "Payment API down",
            "business_service": "Payments",
            "opened_at": "2026-08-20T10:00:00Z",
            "assigned_to": "sre-oncall",
        })])]));
        let tool = DiscoverIncidentsTool::new(store);

        let result = tool.execute(serde_json::json!({})).await.unwrap();

        assert!(result.success);
        assert!(result.output.contains("INC0010001"));
        assert!(result.output.contains("Payment API down"));
        assert!(result.output.contains("sre-oncall"));
    }

    #[tokio::test]
    async fn test_discover_empty() {
        let store = Arc::new(SequencedStore::new(vec![Ok(vec![])]));
        let tool = DiscoverIncidentsTool::new(store);

        let result = tool.execute(serde_json::json!({})).await.unwrap();

        assert!(result.success);
        assert!(result.output.contains("No incidents found"));
    }

    #[tokio::test]
    async fn test_timeline_unknown_incident() {
        let store = Arc::new(SequencedStore::new(vec![Ok(vec![])]));
        let tool = IncidentTimelineTool::new(store);

        let result = tool
            .execute(serde_json::json!({"incident_number": "INC9999999"}))
            .await
            .unwrap();

        assert!(!result.success);
        assert!(result.output.contains("INC9999999 not found"));
    }

    #[tokio::test]
    async fn test_timeline_with_events() {
        let store = Arc::new(SequencedStore::new(vec![
            Ok(vec![serde_json::json!({
                "opened_at": "2026-08-20T10:00:00Z",
                "severity": "1",
                "state": "New",
                "summary": "DB latency spike",
            })]),
            Ok(vec![serde_json::json!({
                "event_time": "2026-08-20T09:30:00Z",
                "type": "cpu_alert",
                "description": "CPU above 95%",
                "system": "db-01",
            })]),
        ]));
        let tool = IncidentTimelineTool::new(store);

        let result = tool
            .execute(serde_json::json!({"incident_number": "INC0010002"}))
            .await
            .unwrap();

        assert!(result.success);
        assert!(result.output.contains("Timeline Analysis for INC0010002"));
        assert!(result.output.contains("2h before to 1h after"));
        assert!(result.output.contains("db-01"));
        assert!(result.output.contains("cpu_alert"));
    }

    #[tokio::test]
    async fn test_timeline_empty_window() {
        let store = Arc::new(SequencedStore::new(vec![
            Ok(vec![serde_json::json!({
                "opened_at": "2026-08-20T10:00:00Z",
                "summary": "Brief blip",
            })]),
            Ok(vec![]),
        ]));
        let tool = IncidentTimelineTool::new(store);

        let result = tool
            .execute(serde_json::json!({"incident_number": "INC0010003"}))
            .await
            .unwrap();

        assert!(result.success);
        assert!(result.output.contains("No infrastructure events found"));
    }

    #[tokio::test]
    async fn test_store_error_becomes_text() {
        let store = Arc::new(SequencedStore::new(vec![Err(Error::Store(
            "socket closed".to_string(),
        ))]));
        let tool = DiscoverIncidentsTool::new(store);

        let result = tool.execute(serde_json::json!({})).await.unwrap();

        assert!(!result.success);
        assert!(result.output.contains("socket closed"));
    }
}
