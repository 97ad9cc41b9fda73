//! BFF gateway
//!
//! Serves several frontends from one process and picks, per request, the
//! frontend whose host and path match best.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────────┐
//!                         │                   BFF GATEWAY                     │
//!                         │                                                   │
//!     Client Request      │  ┌─────────┐    ┌────────────┐    ┌───────────┐  │
//!     ────────────────────┼─▶│  http   │───▶│  routing   │───▶│ handlers  │  │
//!                         │  │ server  │    │ (resolver) │    │index/auth │  │
//!                         │  └─────────┘    └─────┬──────┘    └─────┬─────┘  │
//!                         │                       │ snapshot        │        │
//!                         │                       ▼                 ▼        │
//!                         │                ┌────────────┐    ┌───────────┐   │
//!     config file ────────┼───────────────▶│  registry  │    │  caches   │   │
//!     admin API   ────────┼───────────────▶│            │    │auth/index │   │
//!                         │                └─────┬──────┘    └─────▲─────┘   │
//!                         │                      │ changes         │         │
//!                         │                      ▼                 │         │
//!                         │               ┌──────────────────────────┐       │
//!                         │               │ cache invalidation worker │       │
//!                         │               └──────────────────────────┘       │
//!                         └──────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;

use bff_gateway::config::{load_config, GatewayConfig};
use bff_gateway::lifecycle;

#[derive(Parser)]
#[command(name = "bff-gateway")]
#[command(about = "Multi-tenant backend-for-frontend gateway", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Re-apply `[[frontends]]` when the configuration file changes.
    #[arg(short, long, requires = "config")]
    watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };

    let watch_path = if cli.watch { cli.config.clone() } else { None };
    lifecycle::run(config, watch_path).await?;
    Ok(())
}
