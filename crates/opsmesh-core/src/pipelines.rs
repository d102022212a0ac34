//! Pipelines - per-domain execution over the shared state
//!
//! Most domains are a single specialist appending one tagged turn. The data
//! domain is staged: a graph collector and a context enhancer each
//! contribute tagged findings, then a synthesis step assembles a
//! deterministic prompt from the tagged turns and asks the provider for the
//! final answer. External search never runs locally; it is delegated to the
//! peer orchestrator over the wire.

use crate::classify::Domain;
use crate::error::Result;
use crate::specialist::{Specialist, SpecialistBinding};
use crate::state::PipelineState;
use opsmesh_a2a::A2aClient;
use opsmesh_llm::{CompletionRequest, LlmProvider, Message};
use opsmesh_tools::ToolRegistry;
use std::sync::Arc;
use tracing::{info, instrument};

/// Producer tag of the graph collection stage
pub const GRAPH_COLLECTOR: &str = "graph_collector";
/// Producer tag of the context enhancement stage
pub const CONTEXT_ENHANCER: &str = "context_enhancer";
/// Producer tag of the delegation node
pub const A2A_ORCHESTRATOR: &str = "a2a_orchestrator";

/// Specialist bindings, fixed at composition time
pub mod bindings {
    use super::SpecialistBinding;

    /// Stage one of the data pipeline: structured graph retrieval
    #[must_use]
    pub fn graph_collector() -> SpecialistBinding {
        SpecialistBinding::new(
            super::GRAPH_COLLECTOR,
            "You are a database expert analyzing infrastructure queries.\n\n\
             Use graph_query to answer the user's question. YOU decide the best approach:\n\
             - Which query_type fits their intent (systems, services, vulnerabilities, events, dependencies, overview)\n\
             - What search_term to use (if any)\n\
             - Appropriate limit for results\n\n\
             Guidelines:\n\
             - For questions about servers, nodes, machines, hosts, infrastructure, use 'systems'\n\
             - For questions about applications, services, processes, use 'services'\n\
             - For security, vulnerabilities, CVEs, use 'vulnerabilities'\n\
             - For incidents, alerts, logs, use 'events'\n\
             - For connections, relationships, use 'dependencies'\n\
             - For counts ('how many'), provide the count and brief summary\n\
             - For environment-specific queries (production, staging, dev), include it in search_term\n\n\
             Return clean, factual data from the database.",
            vec!["graph_query"],
        )
    }

    /// Stage two of the data pipeline: similarity enrichment
    #[must_use]
    pub fn context_enhancer() -> SpecialistBinding {
        SpecialistBinding::new(
            super::CONTEXT_ENHANCER,
            "You are a semantic search expert specializing in pattern recognition and similarity analysis.\n\n\
             Use vector_search to find patterns and context related to the user's question. \
             YOU decide the best search strategy:\n\
             - What search terms to use for finding similar infrastructure patterns\n\
             - How many results (top_k) to retrieve based on analysis needs\n\
             - What patterns and relationships to highlight\n\n\
             Focus on finding similar configurations, related systems, patterns, and contextual \
             information that complement the primary data analysis. Provide insights about \
             discovered patterns and relationships.",
            vec!["vector_search"],
        )
    }

    /// Security domain specialist
    #[must_use]
    pub fn security() -> SpecialistBinding {
        SpecialistBinding::new(
            "security_agent",
            "You are a security analyst for enterprise infrastructure.\n\n\
             Investigate vulnerabilities, threats, and exposure using graph_query \
             (query types 'vulnerabilities' and 'vulnerability-impact' are usually the \
             right start) and vector_search for related configurations. Any finding \
             that would lead to a remediation step must go through \
             security_approval_gate before you recommend acting on it.\n\n\
             Report severity, affected systems, and blast radius. Be precise about \
             what is confirmed versus suspected.",
            vec!["graph_query", "vector_search", "security_approval_gate"],
        )
    }

    /// Performance domain specialist
    #[must_use]
    pub fn performance() -> SpecialistBinding {
        SpecialistBinding::new(
            "performance_agent",
            "You are a performance engineer for enterprise infrastructure.\n\n\
             Use graph_query ('service-health', 'events', 'dependencies') to assess \
             current status and vector_search to find similar past patterns. Surface \
             bottlenecks, capacity risks, and optimization opportunities with the \
             systems they affect.",
            vec!["graph_query", "vector_search", "security_approval_gate"],
        )
    }

    /// Compliance domain specialist
    #[must_use]
    pub fn compliance() -> SpecialistBinding {
        SpecialistBinding::new(
            "compliance_agent",
            "You are a compliance auditor for enterprise infrastructure.\n\n\
             Use graph_query to enumerate systems and their properties against \
             policy expectations, and vector_search to find comparable \
             configurations. Flag gaps explicitly and cite the entities involved.",
            vec!["graph_query", "vector_search", "security_approval_gate"],
        )
    }

    /// Learning domain specialist
    #[must_use]
    pub fn learning() -> SpecialistBinding {
        SpecialistBinding::new(
            "learning_agent",
            "You analyze agent interactions to improve the knowledge base.\n\n\
             Use extract_learning_pattern to capture reusable patterns you observe \
             and propose_knowledge_update to stage graph updates, stating your \
             confidence honestly. Summarize what was learned and what needs review.",
            vec!["propose_knowledge_update", "extract_learning_pattern"],
        )
    }

    /// Root-cause-analysis domain specialist
    #[must_use]
    pub fn rca() -> SpecialistBinding {
        SpecialistBinding::new(
            "rca_agent",
            "You are an incident investigator performing root cause analysis.\n\n\
             Typical investigation: discover_incidents to find the record, \
             incident_timeline to reconstruct events around it, then graph_query \
             ('dependency-path', 'incident-correlation', 'system-context') and \
             vector_search to find causes and similar past incidents.\n\n\
             Present a timeline, the most likely root cause, and contributing \
             factors, clearly separated.",
            vec![
                "discover_incidents",
                "incident_timeline",
                "graph_query",
                "vector_search",
            ],
        )
    }
}

/// Deterministic synthesis prompt over the two tagged findings.
///
/// Missing findings become empty sections; identical inputs always produce
/// identical bytes.
#[must_use]
pub fn build_synthesis_prompt(question: &str, graph_data: &str, context_data: &str) -> String {
    format!(
        "User asked: \"{question}\"\n\n\
         PRIMARY DATA (from database):\n\
         {graph_data}\n\n\
         CONTEXTUAL INSIGHTS (from pattern analysis):\n\
         {context_data}\n\n\
         Create a comprehensive response that:\n\
         1. Directly answers the user's question using the primary data\n\
         2. Adds relevant context and insights where helpful\n\
         3. Uses clear formatting with bullet points for lists\n\
         4. Provides a brief summary\n\n\
         Focus on being helpful and informative while avoiding redundancy."
    )
}

/// The bound domain pipelines
pub struct Pipelines {
    provider: Arc<dyn LlmProvider>,
    registry: Arc<ToolRegistry>,
    delegate: A2aClient,
}

impl Pipelines {
    /// Wire the pipelines to their collaborators
    #[must_use]
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        registry: Arc<ToolRegistry>,
        delegate: A2aClient,
    ) -> Self {
        Self {
            provider,
            registry,
            delegate,
        }
    }

    /// Run the pipeline bound to `domain` over the state
    #[instrument(skip(self, state), fields(domain = domain.as_str()))]
    pub async fn run(&self, domain: Domain, state: &mut PipelineState) -> Result<()> {
        match domain {
            Domain::Data => self.run_data(state).await,
            Domain::Security => self.run_single(bindings::security(), state).await,
            Domain::Performance => self.run_single(bindings::performance(), state).await,
            Domain::Compliance => self.run_single(bindings::compliance(), state).await,
            Domain::Learning => self.run_single(bindings::learning(), state).await,
            Domain::Rca => self.run_single(bindings::rca(), state).await,
            Domain::ExternalSearch => {
                self.delegate(state).await;
                Ok(())
            }
        }
    }

    /// Staged data pipeline: collect, enhance, synthesize
    async fn run_data(&self, state: &mut PipelineState) -> Result<()> {
        let question = state.latest_user_text().to_string();

        let collector = Specialist::new(
            bindings::graph_collector(),
            self.provider.clone(),
            self.registry.clone(),
        );
        let graph_findings = collector.run(&question).await?;
        state.push(Message::assistant(graph_findings).with_name(GRAPH_COLLECTOR));

        let enhancer = Specialist::new(
            bindings::context_enhancer(),
            self.provider.clone(),
            self.registry.clone(),
        );
        let context_findings = enhancer.run(&question).await?;
        state.push(Message::assistant(context_findings).with_name(CONTEXT_ENHANCER));

        // Findings are read back by tag, not by position.
        let prompt = build_synthesis_prompt(
            &question,
            state.find_by_name(GRAPH_COLLECTOR),
            state.find_by_name(CONTEXT_ENHANCER),
        );
        let response = self
            .provider
            .complete(
                CompletionRequest::new()
                    .with_message(Message::user(prompt))
                    .with_temperature(0.0),
            )
            .await?;
        state.push(Message::assistant(response.content));

        Ok(())
    }

    /// One specialist, one tagged turn
    async fn run_single(&self, binding: SpecialistBinding, state: &mut PipelineState) -> Result<()> {
        let question = state.latest_user_text().to_string();
        let tag = binding.name.clone();

        let specialist = Specialist::new(binding, self.provider.clone(), self.registry.clone());
        let answer = specialist.run(&question).await?;
        state.push(Message::assistant(answer).with_name(tag));

        Ok(())
    }

    /// Delegate to the peer orchestrator; failures become diagnostic turns
    async fn delegate(&self, state: &mut PipelineState) {
        let question = state.latest_user_text().to_string();

        let turn = match self.delegate.send_text(&question).await {
            Ok(answer) => {
                info!(endpoint = %self.delegate.endpoint(), "Peer answered delegated request");
                format!("External Agent Response:\n\n{answer}")
            }
            Err(e) => format!(
                "External Agent Error:\n\n{e}\n\n\
                 The peer agent may be down or unreachable. Please ensure it's running on {}",
                self.delegate.endpoint()
            ),
        };
        state.push(Message::assistant(turn).with_name(A2A_ORCHESTRATOR));
    }
}
