//! Get command - one read-through lookup from the command line

use clap::Args;
use tracing::info;

use crate::config::AppConfig;

#[derive(Debug, Args)]
pub struct GetArgs {
    /// Label whose settings to resolve
    #[arg(long, short)]
    pub label: String,
}

/// Resolve a label through the configured cache and store
pub async fn run(args: GetArgs) -> anyhow::Result<()> {
    let config = super::load_config()?;
    super::init_logging(&config);

    let body = resolve(&config, &args.label).await?;
    println!("{}", body);

    Ok(())
}

async fn resolve(config: &AppConfig, label: &str) -> anyhow::Result<String> {
    let handler = crate::create_handler(config)?;
    let payload = handler.handle(Some(label)).await?;

    info!(label, origin = payload.origin.as_str(), "Resolved config");
    Ok(payload.body)
}
