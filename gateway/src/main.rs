//! fieldsync HTTP gateway
//!
//! Exposes discover and restore over HTTP for automation platforms that
//! store snapshots between runs.
//!
//! Usage:
//!   fieldsync-gateway --port 8080
//!
//! The gateway is stateless: snapshots are returned to the caller and sent
//! back on restore.

use anyhow::{Context, Result};
use clap::Parser;
use fieldsync_gateway::build_router;
use fieldsync_sync::{FieldSync, HttpFieldRemote, RemoteConfig, RetryPolicy, SyncConfig};
use std::{sync::Arc, time::Duration};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "fieldsync-gateway")]
#[command(about = "HTTP gateway for custom field discovery and restore")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Base URL of the remote fields API
    #[arg(long, default_value = "https://services.leadconnectorhq.com")]
    api_base_url: String,

    /// Per-request timeout against the remote API (seconds)
    #[arg(long, default_value = "60")]
    timeout_secs: u64,

    /// Attempts per remote call, not counting 429 responses
    #[arg(long, default_value = "3")]
    max_attempts: u32,

    /// Pause when the remaining rate-limit quota runs low (seconds)
    #[arg(long, default_value = "5")]
    cooldown_secs: u64,

    /// Fields restored at the same time
    #[arg(long, default_value = "1")]
    max_concurrency: usize,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            low_quota_cooldown: Duration::from_secs(self.cooldown_secs),
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    info!("fieldsync gateway starting...");

    let remote_config = RemoteConfig {
        api_base_url: args.api_base_url.clone(),
        timeout_secs: args.timeout_secs,
    };
    let remote = HttpFieldRemote::new(remote_config)
        .context("Failed to create remote API client")?
        .with_retry_policy(args.retry_policy());
    let sync = FieldSync::new(
        Arc::new(remote),
        SyncConfig {
            retry: args.retry_policy(),
            max_concurrency: args.max_concurrency,
        },
    );

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", args.port))
        .await
        .with_context(|| format!("Failed to bind HTTP port {}", args.port))?;
    info!(
        "Listening on port {} (remote API: {})",
        args.port, args.api_base_url
    );

    axum::serve(listener, build_router(Arc::new(sync)))
        .await
        .context("HTTP server failed")?;
    Ok(())
}
