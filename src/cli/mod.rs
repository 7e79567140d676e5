//! CLI module for Config Proxy
//!
//! - `serve`: HTTP server (default)
//! - `get`: one read-through lookup, printed to stdout

pub mod get;
pub mod serve;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// Config Proxy - read-through cache in front of Azure App Configuration
#[derive(Parser)]
#[command(name = "config-proxy")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server (default mode)
    Serve,

    /// Resolve one label and print its snapshot
    Get(get::GetArgs),
}

/// Loads `.env`, then configuration from files and the environment
pub(crate) fn load_config() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    Ok(AppConfig::load()?)
}

pub(crate) fn init_logging(config: &AppConfig) {
    logging::init_logging(&config.logging);
}
