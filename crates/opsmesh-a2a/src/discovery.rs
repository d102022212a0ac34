//! Discovery - one-shot agent-card snapshot of the configured peers
//!
//! Each peer publishes an agent card at `/.well-known/agent.json` describing
//! its skills. The directory fetches every configured endpoint exactly once,
//! on first use, and serves the resulting snapshot read-only for the life of
//! the process. Unreachable peers are logged and skipped, never fatal.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{info, warn};

/// Path under a peer endpoint where the agent card is published
pub const AGENT_CARD_PATH: &str = "/.well-known/agent.json";

/// Timeout for one card fetch
const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// One advertised skill of a peer agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSkill {
    /// Skill identifier
    #[serde(default)]
    pub id: String,
    /// Human-readable skill name
    #[serde(default)]
    pub name: String,
    /// What the skill does
    #[serde(default)]
    pub description: String,
    /// Keyword tags used for skill-weighted selection
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A peer agent's published card
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentDescriptor {
    /// Agent name, unique across the directory
    pub name: String,
    /// What the agent does
    #[serde(default)]
    pub description: String,
    /// Endpoint messages are sent to
    #[serde(default)]
    pub url: String,
    /// Advertised skills
    #[serde(default)]
    pub skills: Vec<AgentSkill>,
}

/// Read-only directory of discovered peer agents.
///
/// Discovery runs once, on the first call to [`AgentDirectory::agents`];
/// later calls return the same snapshot without touching the network.
pub struct AgentDirectory {
    http: reqwest::Client,
    peer_endpoints: Vec<String>,
    snapshot: OnceCell<Vec<AgentDescriptor>>,
}

impl AgentDirectory {
    /// Create a directory over the configured peer endpoints
    #[must_use]
    pub fn new(peer_endpoints: Vec<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            peer_endpoints,
            snapshot: OnceCell::new(),
        }
    }

    /// The discovered agents, fetching the snapshot on first use
    pub async fn agents(&self) -> &[AgentDescriptor] {
        self.snapshot.get_or_init(|| self.discover()).await
    }

    /// Look up one discovered agent by name
    pub async fn get(&self, name: &str) -> Option<AgentDescriptor> {
        self.agents().await.iter().find(|a| a.name == name).cloned()
    }

    async fn discover(&self) -> Vec<AgentDescriptor> {
        let mut agents = Vec::new();
        for endpoint in &self.peer_endpoints {
            match self.fetch_card(endpoint).await {
                Ok(mut card) => {
                    if card.url.is_empty() {
                        card.url = endpoint.clone();
                    }
                    info!(agent = %card.name, endpoint = %endpoint, "Registered peer agent");
                    agents.push(card);
                }
                Err(e) => {
                    warn!(endpoint = %endpoint, error = %e, "Could not register peer agent");
                }
            }
        }
        agents
    }

    async fn fetch_card(&self, endpoint: &str) -> std::result::Result<AgentDescriptor, reqwest::Error> {
        let url = format!("{}{AGENT_CARD_PATH}", endpoint.trim_end_matches('/'));
        self.http
            .get(url)
            .timeout(FETCH_TIMEOUT)
            .send()
            .await?
            .error_for_status()?
            .json::<AgentDescriptor>()
            .await
    }
}
