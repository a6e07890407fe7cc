use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tds_solver::{gateway, llm::CompletionClient, Config};
use tracing_subscriber::{fmt, EnvFilter};

/// Answer graded-assignment questions over HTTP.
#[derive(Parser, Debug)]
#[command(name = "tds-solver", version, about)]
struct Cli {
    /// Address to bind (overrides HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides PORT)
    #[arg(long, short)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tds_solver=debug")),
        )
        .init();

    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    tracing::info!(
        model = %config.completion.model,
        endpoint = %config.completion.api_url,
        "Configuration loaded"
    );

    let client = CompletionClient::new(config.completion.clone());
    gateway::serve(&config, Arc::new(client)).await
}
