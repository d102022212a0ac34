//! Supervisor - classify once, dispatch once
//!
//! The supervisor is single-shot: it appends a routing turn, classifies the
//! latest user turn, hands the state to exactly one domain pipeline, and
//! returns whatever that pipeline produced. There is no iteration and no
//! transition back to the supervisor.

use crate::classify::{classify, Domain};
use crate::error::Result;
use crate::pipelines::Pipelines;
use crate::state::PipelineState;
use opsmesh_a2a::A2aClient;
use opsmesh_llm::{LlmProvider, Message};
use opsmesh_tools::ToolRegistry;
use std::sync::Arc;
use tracing::{info, instrument};

/// Producer tag of the supervisor's routing turn
pub const SUPERVISOR: &str = "supervisor";

/// Result of one supervised request
#[derive(Debug)]
pub struct SupervisorOutcome {
    /// The transcript after the pipeline ran
    pub state: PipelineState,
    /// The domain the request was dispatched to
    pub domain: Domain,
}

/// Entry point of the orchestration layer
pub struct Supervisor {
    pipelines: Pipelines,
}

impl Supervisor {
    /// Wire the supervisor to its collaborators
    #[must_use]
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        registry: Arc<ToolRegistry>,
        delegate: A2aClient,
    ) -> Self {
        Self {
            pipelines: Pipelines::new(provider, registry, delegate),
        }
    }

    /// Route one request through its domain pipeline.
    ///
    /// # Errors
    /// Propagates generation failures and tool wiring bugs from the
    /// dispatched pipeline; classification itself never fails.
    #[instrument(skip_all)]
    pub async fn handle(&self, mut state: PipelineState) -> Result<SupervisorOutcome> {
        let question = state.latest_user_text().to_string();

        state.push(
            Message::assistant(format!(
                "Analyzing query: '{question}' and routing to appropriate domain..."
            ))
            .with_name(SUPERVISOR),
        );

        let domain = classify(&question);
        info!(domain = domain.as_str(), "Dispatching request");

        self.pipelines.run(domain, &mut state).await?;

        Ok(SupervisorOutcome { state, domain })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipelines::A2A_ORCHESTRATOR;
    use crate::test_support::{
        EmptyVectorIndex, FixedGraphStore, ScriptedProvider, ScriptedTurn,
    };
    use opsmesh_tools::builtins::{
        ApprovalGateTool, DiscoverIncidentsTool, ExtractPatternTool, GraphQueryTool,
        IncidentTimelineTool, ProposeKnowledgeUpdateTool, VectorSearchTool,
    };
    use std::time::Duration;

    fn registry() -> Arc<ToolRegistry> {
        let graph: Arc<dyn opsmesh_tools::GraphStore> = Arc::new(FixedGraphStore {
            rows: vec![serde_json::json!({"name": "web-01"})],
        });
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(GraphQueryTool::new(graph.clone())));
        registry.register(Arc::new(VectorSearchTool::new(Arc::new(EmptyVectorIndex))));
        registry.register(Arc::new(DiscoverIncidentsTool::new(graph.clone())));
        registry.register(Arc::new(IncidentTimelineTool::new(graph)));
        registry.register(Arc::new(ProposeKnowledgeUpdateTool::new()));
        registry.register(Arc::new(ExtractPatternTool::new()));
        registry.register(Arc::new(ApprovalGateTool::new()));
        Arc::new(registry)
    }

    fn unreachable_client() -> A2aClient {
        A2aClient::new("http://127.0.0.1:1")
            .with_poll_interval(Duration::from_millis(5))
            .with_max_polls(1)
    }

    #[tokio::test]
    async fn test_data_request_runs_staged_pipeline() {
        let provider = Arc::new(ScriptedProvider::with_scripts(
            vec![
                ScriptedTurn::Text("12 systems".to_string()),
                ScriptedTurn::Text("similar patterns".to_string()),
            ],
            vec!["There are 12 servers."],
        ));
        let supervisor = Supervisor::new(provider, registry(), unreachable_client());

        let outcome = supervisor
            .handle(PipelineState::from_request("Count all servers"))
            .await
            .unwrap();

        assert_eq!(outcome.domain, Domain::Data);
        assert!(outcome
            .state
            .find_by_name(SUPERVISOR)
            .contains("Analyzing query: 'Count all servers'"));
        assert_eq!(outcome.state.final_text(), "There are 12 servers.");
    }

    #[tokio::test]
    async fn test_security_request_dispatches_once() {
        let provider = Arc::new(ScriptedProvider::with_tool_script(vec![
            ScriptedTurn::Text("No exposure found.".to_string()),
        ]));
        let supervisor = Supervisor::new(provider, registry(), unreachable_client());

        let outcome = supervisor
            .handle(PipelineState::from_request("any vulnerability in prod?"))
            .await
            .unwrap();

        assert_eq!(outcome.domain, Domain::Security);
        assert_eq!(
            outcome.state.find_by_name("security_agent"),
            "No exposure found."
        );
    }

    #[tokio::test]
    async fn test_external_search_skips_internal_pipelines() {
        // Provider would panic the run if consulted: no scripts at all, and
        // delegation must not touch it.
        let provider = Arc::new(ScriptedProvider::with_tool_script(vec![]));
        let supervisor = Supervisor::new(provider, registry(), unreachable_client());

        let outcome = supervisor
            .handle(PipelineState::from_request("latest news on rust"))
            .await
            .unwrap();

        assert_eq!(outcome.domain, Domain::ExternalSearch);
        let turn = outcome.state.find_by_name(A2A_ORCHESTRATOR);
        assert!(turn.starts_with("External Agent Error:"));
        assert!(turn.contains("127.0.0.1:1"));
    }
}
