//! CLI for opsmesh
//!
//! One command today: `serve` starts the ingress server. Host and port
//! flags override the environment configuration.

use clap::{Parser, Subcommand};
use opsmesh_core::AppConfig;

/// Opsmesh orchestration server CLI
#[derive(Parser, Debug)]
#[command(name = "opsmesh")]
#[command(about = "Multi-agent orchestration for infrastructure operations")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the ingress server (default)
    Serve {
        /// Bind address override
        #[arg(long)]
        host: Option<String>,
        /// Port override
        #[arg(long)]
        port: Option<u16>,
    },
}

/// Run the CLI command
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Some(Commands::Serve { host, port }) => {
            let mut config = AppConfig::from_env();
            if let Some(host) = host {
                config = config.with_host(host);
            }
            if let Some(port) = port {
                config = config.with_port(port);
            }
            crate::server::run(config).await
        }
        None => crate::server::run(AppConfig::from_env()).await,
    }
}
