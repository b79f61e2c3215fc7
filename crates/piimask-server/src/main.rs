//! piimask: HTTP service masking PII with configurable per-type masks.

use anyhow::Context;
use clap::Parser;
use piimask_core::{ServiceConfig, UnresolvedPolicy};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "piimask")]
#[command(about = "Mask PII in text using an LLM detector and exact span resolution")]
struct Cli {
    /// Host to bind (overrides PIIMASK_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides PORT)
    #[arg(long)]
    port: Option<u16>,

    /// `drop` or `report` (overrides PIIMASK_UNRESOLVED_POLICY)
    #[arg(long)]
    unresolved_policy: Option<UnresolvedPolicy>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = ServiceConfig::from_env().context("Failed to load configuration")?;
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(policy) = cli.unresolved_policy {
        config.unresolved_policy = policy;
    }
    config.validate().context("Invalid configuration")?;

    let detector = piimask_detect::create_detector(&config.llm);
    if detector.is_none() {
        warn!("Starting without a PII detector; masking requests will return 503");
    }

    piimask_server::serve(config, detector).await?;
    Ok(())
}
