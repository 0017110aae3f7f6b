//! RepoLens Web Server
//!
//! Serves repository summaries and details for the configured repositories.

use anyhow::Context;
use clap::Parser;
use repolens_core::{init_logging, LogFormat, LoggingConfig, ServiceConfig};
use repolens_web::RepoLensServerBuilder;
use tracing::info;

/// RepoLens Web Server - repository size, file count and webhook analysis
#[derive(Parser)]
#[command(name = "repolens-web")]
#[command(about = "HTTP query interface for RepoLens")]
#[command(version)]
struct Args {
    /// Server host to bind to (overrides HOST)
    #[arg(long)]
    host: Option<String>,

    /// Server port to listen on (overrides PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Log format (pretty, compact, json)
    #[arg(long, default_value = "compact")]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load environment variables
    dotenvy::dotenv().ok();

    let logging = LoggingConfig {
        format: args.log_format,
        ..LoggingConfig::with_level(&args.log_level)
    };
    init_logging(&logging).map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    let config = ServiceConfig::from_env().context("Failed to load configuration")?;

    let mut builder = RepoLensServerBuilder::new(config);
    if let Some(host) = args.host {
        builder = builder.host(host);
    }
    if let Some(port) = args.port {
        builder = builder.port(port);
    }

    let server = builder.build().context("Failed to build server")?;

    info!(
        repositories = ?server.config().repositories,
        workers = server.state().pool().workers(),
        "RepoLens configured"
    );

    server.start().await.context("Server failed")?;

    Ok(())
}
