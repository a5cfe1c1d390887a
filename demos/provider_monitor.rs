//! # Example: provider_monitor
//!
//! Monitors a provider service on a running node daemon.
//!
//! Demonstrates how to:
//! - Build an [`HttpClient`] for the daemon REST API.
//! - Adopt an already running service, or start a new one.
//! - Subscribe to status transitions.
//! - Stop the service on Ctrl-C.
//!
//! ## Flow
//! ```text
//! HttpClient ──► ProviderService::builder().build()
//!     ├─► add_status_subscriber(print)
//!     ├─► check_for_existing_service()
//!     │     └─ none ─► start(provider, type)
//!     ├─► poll every --poll-ms ─► print transitions
//!     └─► Ctrl-C ─► stop() ─► NotRunning
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=provisor=debug cargo run --example provider_monitor -- \
//!     --provider 0x1234 --service-type wireguard
//! ```

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use provisor::{
    Callback, ClientConfig, HttpClient, MonitorConfig, ProviderService, ServiceControl,
    ServiceStatus,
};

#[derive(Parser)]
#[command(name = "provider_monitor", about = "Start and watch a provider service")]
struct Cli {
    /// Node daemon API root.
    #[arg(long, default_value = provisor::DEFAULT_BASE_URL)]
    base_url: String,

    /// Provider identity.
    #[arg(long)]
    provider: String,

    /// Service type to start.
    #[arg(long, default_value = "wireguard")]
    service_type: String,

    /// Status poll interval in milliseconds.
    #[arg(long, default_value = "1000")]
    poll_ms: u64,

    /// Request timeout in seconds (0 = none).
    #[arg(long, default_value = "20")]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // 1. Daemon client
    let client = HttpClient::new(ClientConfig {
        base_url: cli.base_url,
        timeout: Duration::from_secs(cli.timeout_secs),
    })?;
    let health = client.health_check().await?;
    tracing::info!(uptime = %health.uptime, pid = health.process, "daemon is up");

    // 2. Monitor
    let control: Arc<dyn ServiceControl> = Arc::new(client);
    let service = ProviderService::builder(control)
        .with_config(MonitorConfig {
            poll_interval: Duration::from_millis(cli.poll_ms),
        })
        .build();

    // 3. Print every transition
    let on_status: Callback<ServiceStatus> = Arc::new(|status| println!("[monitor] status: {status}"));
    let _subscription = service.add_status_subscriber(on_status);

    // 4. Adopt or start
    if service.check_for_existing_service().await {
        println!("[monitor] adopted running service");
    } else {
        service.start(&cli.provider, &cli.service_type).await?;
    }

    // 5. Run until Ctrl-C
    tokio::signal::ctrl_c().await?;
    println!("[monitor] stopping");
    service.stop().await?;
    Ok(())
}
