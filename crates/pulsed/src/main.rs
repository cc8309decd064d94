//! pulsed: the PulseGrid aggregator daemon.
//!
//! Single binary that assembles the aggregator side:
//! - In-memory heartbeat registry
//! - REST API (beat ingestion + health queries)
//! - Staleness watcher (logs clients that have gone dark)
//!
//! # Usage
//!
//! ```text
//! pulsed serve --port 9190 --sweep-interval 30
//! ```

use std::net::SocketAddr;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use pulsegrid_state::{HeartbeatRegistry, epoch_millis};

#[derive(Parser)]
#[command(name = "pulsed", about = "PulseGrid aggregator daemon")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the aggregator: REST API plus staleness watcher.
    Serve {
        /// Port to listen on.
        #[arg(long, default_value = "9190")]
        port: u16,

        /// Staleness sweep interval in seconds.
        #[arg(long, default_value = "30")]
        sweep_interval: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,pulsed=debug,pulsegrid=debug".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            port,
            sweep_interval,
        } => run_serve(port, sweep_interval).await,
    }
}

async fn run_serve(port: u16, sweep_interval: u64) -> anyhow::Result<()> {
    info!("PulseGrid aggregator starting");

    let registry = HeartbeatRegistry::new();

    // ── Shutdown signal ────────────────────────────────────────

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // ── Staleness watcher ──────────────────────────────────────

    let watcher_registry = registry.clone();
    let watcher_handle = tokio::spawn(async move {
        run_staleness_watcher(
            watcher_registry,
            Duration::from_secs(sweep_interval),
            shutdown_rx,
        )
        .await;
    });
    info!(interval = sweep_interval, "staleness watcher started");

    // ── API server ─────────────────────────────────────────────

    let router = pulsegrid_api::build_router(registry);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!(%addr, "API server starting");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Graceful shutdown on Ctrl-C.
    let server = axum::serve(listener, router).with_graceful_shutdown(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install CTRL+C handler");
        info!("shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    server.await?;

    let _ = watcher_handle.await;

    info!("PulseGrid aggregator stopped");
    Ok(())
}

/// Periodically report which clients have gone dark.
///
/// Observation only: eviction stays an explicit API operation, so a
/// client that resumes beating simply looks alive again.
async fn run_staleness_watcher(
    registry: HeartbeatRegistry,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            _ = tokio::time::sleep(interval) => {
                let dead = registry.dead_clients(epoch_millis());
                if dead.is_empty() {
                    debug!(clients = registry.len(), "fleet alive");
                } else {
                    warn!(dead = ?dead, "clients gone dark");
                }
            }
            _ = shutdown.changed() => {
                debug!("staleness watcher shutting down");
                break;
            }
        }
    }
}
