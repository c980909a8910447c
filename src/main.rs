//! Polymarket Auto-Claim Bot - Entry Point
//!
//! Initializes configuration, logging and monitoring, then runs the
//! claim scheduler until SIGINT.
//!
//! Wiring sequence:
//! 1. Load .env (POLYMARKET_PRIVATE_KEY, PM_ADDRESS)
//! 2. Load config.toml + env overrides + validate
//! 3. Init tracing (human-readable by default, JSON on request)
//! 4. Spawn metrics server (/metrics) and health server (/live + /ready)
//! 5. Spawn the scheduler (connect → key → discover → redeem → sleep)
//! 6. Wait for SIGINT → broadcast shutdown → exit

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use polymarket_auto_claim::adapters::api::{DataApiClient, DataApiConfig};
use polymarket_auto_claim::adapters::chain::{OwnerKey, PolygonConnector};
use polymarket_auto_claim::adapters::metrics::{HealthServer, HealthState, RedeemMetrics};
use polymarket_auto_claim::config::{self, AppConfig};
use polymarket_auto_claim::usecases::{CyclePorts, Scheduler};

/// Config file location unless `CONFIG_PATH` says otherwise.
const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Secrets from .env (absent file is fine) ──────────
    dotenvy::dotenv().ok();

    // ── 2. Load configuration ───────────────────────────────
    let config_path =
        std::env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = config::loader::load_config(&config_path)
        .context("Failed to load configuration")?;

    // ── 3. Initialize logging ───────────────────────────────
    init_tracing(&config);

    info!(
        name = %config.bot.name,
        version = env!("CARGO_PKG_VERSION"),
        interval_minutes = config.bot.interval_seconds / 60,
        proxy = %config.wallet.proxy_address,
        dry_run = config.bot.dry_run,
        "Starting Polymarket auto-claim bot"
    );
    if config.bot.dry_run {
        warn!("Dry-run mode: gas is estimated but NO transactions are sent");
    }

    // ── 4. Shutdown channel + monitoring ────────────────────
    let (shutdown_tx, _shutdown_rx) = broadcast::channel::<()>(1);
    let metrics = Arc::new(RedeemMetrics::new().context("Failed to register metrics")?);
    let health = Arc::new(HealthState::new());

    let mut monitor_handles = Vec::new();
    if config.metrics.enabled {
        let metrics_shutdown = shutdown_tx.subscribe();
        let bind_address = config.metrics.bind_address.clone();
        let metrics_ref = Arc::clone(&metrics);
        monitor_handles.push(tokio::spawn(async move {
            if let Err(e) = metrics_ref.serve(bind_address, metrics_shutdown).await {
                error!(error = %e, "Metrics server failed");
            }
        }));

        let health_shutdown = shutdown_tx.subscribe();
        let health_server = HealthServer::new(Arc::clone(&health), config.metrics.health_port);
        monitor_handles.push(tokio::spawn(async move {
            if let Err(e) = health_server.run(health_shutdown).await {
                error!(error = %e, "Health server failed");
            }
        }));
    }

    // ── 5. Wire adapters and spawn the scheduler ────────────
    let scheduler = Arc::new(build_scheduler(&config, metrics, health)?);
    let scheduler_shutdown = shutdown_tx.subscribe();
    let scheduler_handle = tokio::spawn(scheduler.run(scheduler_shutdown));

    info!("All tasks spawned, bot is running");

    // ── 6. Wait for SIGINT ──────────────────────────────────
    if let Err(e) = signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for SIGINT");
    }
    info!("SIGINT received, initiating graceful shutdown");

    let _ = shutdown_tx.send(());

    if tokio::time::timeout(Duration::from_secs(5), scheduler_handle)
        .await
        .is_err()
    {
        warn!("Scheduler did not stop within 5s");
    }
    for handle in monitor_handles {
        let _ = tokio::time::timeout(Duration::from_secs(1), handle).await;
    }

    info!("Shutdown complete");
    Ok(())
}

/// Human-readable timestamped lines by default; JSON when configured.
/// `RUST_LOG` overrides `bot.log_level`.
fn init_tracing(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.bot.log_level));

    if config.bot.json_logs {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn build_scheduler(
    config: &AppConfig,
    metrics: Arc<RedeemMetrics>,
    health: Arc<HealthState>,
) -> Result<Scheduler> {
    let positions = DataApiClient::new(DataApiConfig::from(&config.discovery))
        .context("Failed to create positions API client")?;

    let ports = CyclePorts {
        connector: Arc::new(PolygonConnector::new(&config.chain)),
        keys: Arc::new(OwnerKey::new(config.wallet.private_key.clone())),
        positions: Arc::new(positions),
    };

    Scheduler::from_config(config, ports, metrics, health)
}
