//! Classify - map a request to one operational domain
//!
//! The primary strategy is case-insensitive keyword matching with a fixed
//! precedence order; it is cheap, deterministic, and covers the routing
//! vocabulary operators actually use. A secondary LLM strategy exists for
//! requests the keyword sets miss. Both strategies always produce a domain:
//! anything ambiguous lands in `Data`.

use opsmesh_llm::{CompletionRequest, LlmProvider, Message};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Operational domains a request can be routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Domain {
    /// Structured data retrieval with similarity enrichment
    Data,
    /// Vulnerability and threat analysis
    Security,
    /// Monitoring and optimization
    Performance,
    /// Audit and policy analysis
    Compliance,
    /// Pattern extraction and knowledge updates
    Learning,
    /// Incident investigation and root cause analysis
    Rca,
    /// Current public information, delegated to an external peer
    ExternalSearch,
}

/// Keywords routed to external search, checked first
const EXTERNAL_SEARCH_KEYWORDS: &[&str] = &[
    "latest", "current", "recent", "news", "today", "search", "web",
];
const SECURITY_KEYWORDS: &[&str] = &[
    "security",
    "vulnerability",
    "vulnerabilities",
    "threat",
    "threats",
    "compliance",
];
const RCA_KEYWORDS: &[&str] = &[
    "incident",
    "rca",
    "troubleshoot",
    "analyze",
    "investigation",
    "root cause",
];
const PERFORMANCE_KEYWORDS: &[&str] = &[
    "performance",
    "monitor",
    "monitoring",
    "metric",
    "metrics",
    "optimization",
];
const COMPLIANCE_KEYWORDS: &[&str] = &[
    "compliance",
    "audit",
    "auditing",
    "policy",
    "policies",
    "regulation",
];
const LEARNING_KEYWORDS: &[&str] = &[
    "learn", "learning", "pattern", "patterns", "knowledge", "update",
];

impl Domain {
    /// Returns the wire label
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Data => "data",
            Self::Security => "security",
            Self::Performance => "performance",
            Self::Compliance => "compliance",
            Self::Learning => "learning",
            Self::Rca => "rca",
            Self::ExternalSearch => "external-search",
        }
    }

    /// Parse a normalized label; accepts common aliases
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "data" => Some(Self::Data),
            "security" => Some(Self::Security),
            "performance" => Some(Self::Performance),
            "compliance" => Some(Self::Compliance),
            "learning" => Some(Self::Learning),
            "rca" | "root-cause-analysis" => Some(Self::Rca),
            "external-search" => Some(Self::ExternalSearch),
            _ => None,
        }
    }
}

fn matches_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

/// Classify a request by keyword precedence.
///
/// Precedence is fixed: external search, security, rca, performance,
/// compliance, learning. A request matching none of the sets, including
/// the empty request, is classified `Data`.
#[must_use]
pub fn classify(text: &str) -> Domain {
    let lower = text.to_lowercase();

    let domain = if matches_any(&lower, EXTERNAL_SEARCH_KEYWORDS) {
        Domain::ExternalSearch
    } else if matches_any(&lower, SECURITY_KEYWORDS) {
        Domain::Security
    } else if matches_any(&lower, RCA_KEYWORDS) {
        Domain::Rca
    } else if matches_any(&lower, PERFORMANCE_KEYWORDS) {
        Domain::Performance
    } else if matches_any(&lower, COMPLIANCE_KEYWORDS) {
        Domain::Compliance
    } else if matches_any(&lower, LEARNING_KEYWORDS) {
        Domain::Learning
    } else {
        Domain::Data
    };

    debug!(domain = domain.as_str(), "Classified request");
    domain
}

/// Classify a request by asking the provider for a single label token.
///
/// The returned token is normalized (trim, lowercase, spaces to hyphens)
/// and validated against the domain set. An invalid token or a provider
/// failure classifies as `Data`; this strategy never fails the request.
pub async fn classify_with_llm(provider: &dyn LlmProvider, text: &str) -> Domain {
    let prompt = format!(
        "Classify the following infrastructure request into exactly one domain.\n\
         Respond with only the label, nothing else.\n\
         Labels: data, security, performance, compliance, learning, rca, external-search\n\n\
         Request: {text}"
    );

    let request = CompletionRequest::new()
        .with_message(Message::user(prompt))
        .with_temperature(0.0);

    match provider.complete(request).await {
        Ok(response) => {
            let label = response.content.trim().to_lowercase().replace(' ', "-");
            match Domain::parse(&label) {
                Some(domain) => domain,
                None => {
                    warn!(label = %label, "Provider returned an unknown domain label");
                    Domain::Data
                }
            }
        }
        Err(e) => {
            warn!(error = %e, "Domain classification call failed");
            Domain::Data
        }
    }
}
