//! Selector - skill-weighted peer agent choice
//!
//! The standalone orchestrator scores every discovered peer by counting its
//! advertised skill tags inside the request text. A strictly higher score
//! wins; when nothing scores, a coarse keyword split decides between the
//! default infrastructure and web-search agents.

use opsmesh_a2a::{A2aClient, AgentDescriptor, AgentDirectory};
use serde::Serialize;
use tracing::{info, instrument};

/// Default agent when the fallback split sees infrastructure vocabulary
pub const DEFAULT_INFRA_AGENT: &str = "Ops Infrastructure Agent";
/// Default agent when the fallback split sees search vocabulary
pub const DEFAULT_SEARCH_AGENT: &str = "Web Search Agent";

/// Score divisor used to map tag hits onto a confidence in [0, 1]
const CONFIDENCE_DIVISOR: f64 = 3.0;

const INFRA_FALLBACK_KEYWORDS: &[&str] = &["server", "infrastructure", "database", "rca"];
const SEARCH_FALLBACK_KEYWORDS: &[&str] = &["search", "news", "current", "latest"];

/// Outcome of a selection
#[derive(Debug, Clone, Serialize)]
pub struct Selection {
    /// Name of the chosen agent
    pub agent: String,
    /// Tag-hit confidence, capped at 1.0
    pub confidence: f64,
    /// Why this agent was chosen
    pub rationale: String,
}

/// Pick the best peer for a request by skill-tag weighting
#[must_use]
pub fn select(agents: &[AgentDescriptor], request: &str) -> Selection {
    let request_lower = request.to_lowercase();

    let mut best_agent: Option<&str> = None;
    let mut best_score = 0usize;
    for agent in agents {
        let score = agent
            .skills
            .iter()
            .flat_map(|skill| skill.tags.iter())
            .filter(|tag| request_lower.contains(&tag.to_lowercase()))
            .count();
        if score > best_score {
            best_score = score;
            best_agent = Some(&agent.name);
        }
    }

    let agent = match best_agent {
        Some(name) => name.to_string(),
        None => {
            if INFRA_FALLBACK_KEYWORDS
                .iter()
                .any(|k| request_lower.contains(k))
            {
                DEFAULT_INFRA_AGENT.to_string()
            } else if SEARCH_FALLBACK_KEYWORDS
                .iter()
                .any(|k| request_lower.contains(k))
            {
                DEFAULT_SEARCH_AGENT.to_string()
            } else {
                DEFAULT_INFRA_AGENT.to_string()
            }
        }
    };

    Selection {
        rationale: format!(
            "Selected {agent} based on keyword matching (score: {best_score})"
        ),
        confidence: f64::min(best_score as f64 / CONFIDENCE_DIVISOR, 1.0),
        agent,
    }
}

/// Result of routing one request through the standalone orchestrator
#[derive(Debug, Clone, Serialize)]
pub struct OrchestratorDecision {
    /// The selection that was made
    #[serde(flatten)]
    pub selection: Selection,
    /// Routing outcome text
    pub response: String,
}

/// Standalone orchestrator: discovery snapshot plus skill-weighted routing
pub struct Orchestrator {
    directory: AgentDirectory,
}

impl Orchestrator {
    /// Create an orchestrator over the configured peer endpoints
    #[must_use]
    pub fn new(directory: AgentDirectory) -> Self {
        Self { directory }
    }

    /// Select a peer for the request and report the routing outcome.
    ///
    /// Selection of an agent that was never discovered (the fallback names
    /// when no peer is reachable) yields an unavailability response rather
    /// than an error.
    #[instrument(skip(self, request))]
    pub async fn route(&self, request: &str) -> OrchestratorDecision {
        let agents = self.directory.agents().await;
        let selection = select(agents, request);

        info!(
            agent = %selection.agent,
            confidence = selection.confidence,
            "Orchestrator selected peer"
        );

        let response = match agents.iter().find(|a| a.name == selection.agent) {
            Some(agent) => format!("Successfully routed to {} at {}", agent.name, agent.url),
            None => format!("Agent {} not available", selection.agent),
        };

        OrchestratorDecision {
            selection,
            response,
        }
    }

    /// Build a client for the selected peer, when it was discovered
    pub async fn client_for(&self, selection: &Selection) -> Option<A2aClient> {
        self.directory
            .get(&selection.agent)
            .await
            .map(|agent| A2aClient::new(agent.url))
    }
}
