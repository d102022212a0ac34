//! Server - axum ingress and the composition root
//!
//! Wires the provider, tool stores, registry, supervisor, and peer
//! orchestrator together and exposes them behind `POST /api/v1/query`.
//! Internal failures map to a generic 500; their detail stays in the logs.

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use opsmesh_a2a::{A2aClient, AgentDirectory};
use opsmesh_core::{
    classify::Domain, pipelines::A2A_ORCHESTRATOR, AppConfig, Orchestrator, PipelineState,
    Supervisor,
};
use opsmesh_llm::{LlmProvider, Message, OpenAiCompatConfig, OpenAiCompatProvider};
use opsmesh_tools::builtins::{
    ApprovalGateTool, DiscoverIncidentsTool, ExtractPatternTool, GraphQueryTool,
    IncidentTimelineTool, ProposeKnowledgeUpdateTool, VectorSearchTool,
};
use opsmesh_tools::{GraphStore, ToolRegistry, VectorIndex, VectorMatch};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Graph store placeholder used until a backend client is configured.
///
/// Queries fail with a configuration message, which the tools fold into
/// their textual output, so the pipelines stay functional end to end.
struct UnconfiguredGraphStore;

#[async_trait::async_trait]
impl GraphStore for UnconfiguredGraphStore {
    async fn execute(
        &self,
        _query: &str,
        _params: serde_json::Value,
    ) -> opsmesh_tools::Result<Vec<serde_json::Value>> {
        Err(opsmesh_tools::Error::Store(
            "no graph backend configured".to_string(),
        ))
    }
}

/// Vector index placeholder used until a backend client is configured
struct UnconfiguredVectorIndex;

#[async_trait::async_trait]
impl VectorIndex for UnconfiguredVectorIndex {
    async fn similarity_search(
        &self,
        _query: &str,
        _top_k: usize,
    ) -> opsmesh_tools::Result<Vec<VectorMatch>> {
        Err(opsmesh_tools::Error::Store(
            "no vector backend configured".to_string(),
        ))
    }
}

/// Shared request-handling state
#[derive(Clone)]
struct ApiState {
    supervisor: Arc<Supervisor>,
    orchestrator: Arc<Orchestrator>,
}

#[derive(Debug, Deserialize)]
struct QueryRequest {
    text: String,
    /// Prior turns in external JSON shape, normalized here
    #[serde(default)]
    history: Vec<serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct QueryResponse {
    response: String,
    domain: &'static str,
    confidence: f64,
    rationale: String,
}

/// Build the tool registry over the injected stores
fn build_registry(graph: Arc<dyn GraphStore>, index: Arc<dyn VectorIndex>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(GraphQueryTool::new(graph.clone())));
    registry.register(Arc::new(VectorSearchTool::new(index)));
    registry.register(Arc::new(DiscoverIncidentsTool::new(graph.clone())));
    registry.register(Arc::new(IncidentTimelineTool::new(graph)));
    registry.register(Arc::new(ProposeKnowledgeUpdateTool::new()));
    registry.register(Arc::new(ExtractPatternTool::new()));
    registry.register(Arc::new(ApprovalGateTool::new()));
    registry
}

/// Assemble the router over an already-wired state
fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/api/v1/query", post(handle_query))
        .route("/health", get(handle_health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the ingress server
pub async fn run(config: AppConfig) -> Result<()> {
    let provider: Arc<dyn LlmProvider> = Arc::new(OpenAiCompatProvider::new(
        OpenAiCompatConfig::from_env().context("LLM configuration missing")?,
    ));

    let graph: Arc<dyn GraphStore> = Arc::new(UnconfiguredGraphStore);
    let index: Arc<dyn VectorIndex> = Arc::new(UnconfiguredVectorIndex);
    let registry = Arc::new(build_registry(graph, index));

    let delegate = A2aClient::new(config.orchestrator_url.clone());
    let supervisor = Arc::new(Supervisor::new(provider, registry, delegate));
    let orchestrator = Arc::new(Orchestrator::new(AgentDirectory::new(
        config.peer_endpoints.clone(),
    )));

    let app = build_router(ApiState {
        supervisor,
        orchestrator,
    });

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("invalid bind address")?;
    info!(%addr, orchestrator = %config.orchestrator_url, "Ingress listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind ingress address")?;
    axum::serve(listener, app)
        .await
        .context("ingress server failed")?;

    Ok(())
}

async fn handle_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "time": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn handle_query(
    State(state): State<ApiState>,
    Json(request): Json<QueryRequest>,
) -> Response {
    // The only place external message JSON is inspected.
    let mut turns: Vec<Message> = request.history.iter().map(Message::normalize).collect();
    turns.push(Message::user(request.text.clone()));

    let outcome = match state
        .supervisor
        .handle(PipelineState::from_turns(turns))
        .await
    {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(error = %e, "Request processing failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "internal error" })),
            )
                .into_response();
        }
    };

    let (confidence, rationale) = match outcome.domain {
        Domain::ExternalSearch => {
            // Report which peer the standalone orchestrator picked.
            let decision = state.orchestrator.route(&request.text).await;
            (decision.selection.confidence, decision.selection.rationale)
        }
        domain => (
            1.0,
            format!("Keyword classification selected the {} domain", domain.as_str()),
        ),
    };

    let response = match outcome.domain {
        Domain::ExternalSearch => outcome.state.find_by_name(A2A_ORCHESTRATOR).to_string(),
        _ => outcome.state.final_text().to_string(),
    };

    Json(QueryResponse {
        response,
        domain: outcome.domain.as_str(),
        confidence,
        rationale,
    })
    .into_response()
}
