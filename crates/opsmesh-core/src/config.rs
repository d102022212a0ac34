//! Config - environment-driven settings for the service
//!
//! Mirrors the provider config pattern: `from_env()` reads the documented
//! variables, `with_*` setters override programmatically, and `Default`
//! carries the local-development values.

use std::env;

/// Default ingress bind address
pub const DEFAULT_HOST: &str = "0.0.0.0";
/// Default ingress port
pub const DEFAULT_PORT: u16 = 8080;
/// Default peer orchestrator endpoint
pub const DEFAULT_ORCHESTRATOR_URL: &str = "http://localhost:8000";
/// Default peer agent endpoints for discovery
pub const DEFAULT_PEER_URLS: &str = "http://localhost:8001,http://localhost:8002";

/// Service configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Ingress bind address
    pub host: String,
    /// Ingress port
    pub port: u16,
    /// Endpoint of the peer orchestrator that external-search requests go to
    pub orchestrator_url: String,
    /// Peer agent endpoints probed during discovery
    pub peer_endpoints: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            orchestrator_url: DEFAULT_ORCHESTRATOR_URL.to_string(),
            peer_endpoints: parse_peer_list(DEFAULT_PEER_URLS),
        }
    }
}

impl AppConfig {
    /// Load configuration from the environment.
    ///
    /// Variables: `OPSMESH_HOST`, `OPSMESH_PORT`, `A2A_ORCHESTRATOR_URL`,
    /// `A2A_PEER_URLS` (comma-separated). Unset variables keep defaults;
    /// an unparseable port keeps the default port.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env::var("OPSMESH_HOST").unwrap_or(defaults.host),
            port: env::var("OPSMESH_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            orchestrator_url: env::var("A2A_ORCHESTRATOR_URL")
                .unwrap_or(defaults.orchestrator_url),
            peer_endpoints: env::var("A2A_PEER_URLS")
                .map(|v| parse_peer_list(&v))
                .unwrap_or(defaults.peer_endpoints),
        }
    }

    /// Override the bind address
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Override the port
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Override the orchestrator endpoint
    #[must_use]
    pub fn with_orchestrator_url(mut self, url: impl Into<String>) -> Self {
        self.orchestrator_url = url.into();
        self
    }
}

fn parse_peer_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
