//! Scheduler Use Case - Supervised Claim Loop
//!
//! Runs one claim cycle, sleeps, repeats until shutdown. Each cycle:
//! 1. Connect to the RPC endpoint (fresh provider, chain-id check)
//! 2. Load the owner key
//! 3. Discover redeemable positions
//! 4. Redeem them in order
//!
//! Every cycle runs in its own task so that even a panic surfaces as a
//! `CycleError` and the loop keeps going.

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::Address;
use anyhow::Result;
use chrono::Utc;
use tokio::sync::broadcast;
use tokio::task::{JoinError, JoinHandle};
use tracing::{error, info, instrument};

use crate::adapters::metrics::{HealthState, RedeemMetrics};
use crate::config::AppConfig;
use crate::config::loader::parse_address;
use crate::domain::claim::CycleReport;
use crate::domain::error::CycleError;
use crate::ports::chain_client::ChainConnector;
use crate::ports::position_source::PositionSource;
use crate::ports::signer::SignerLoader;

use super::discovery::PositionDiscovery;
use super::redemption::RedemptionOrchestrator;

/// External dependencies of a cycle.
pub struct CyclePorts {
  pub connector: Arc<dyn ChainConnector>,
  pub keys: Arc<dyn SignerLoader>,
  pub positions: Arc<dyn PositionSource>,
}

/// Periodic, self-healing redemption loop.
pub struct Scheduler {
  connector: Arc<dyn ChainConnector>,
  keys: Arc<dyn SignerLoader>,
  discovery: PositionDiscovery,
  orchestrator: RedemptionOrchestrator,
  /// Proxy wallet whose positions are claimed.
  proxy: Address,
  /// Sleep between cycles.
  interval: Duration,
  metrics: Arc<RedeemMetrics>,
  health: Arc<HealthState>,
}

impl Scheduler {
  pub fn new(
    ports: CyclePorts,
    orchestrator: RedemptionOrchestrator,
    proxy: Address,
    interval: Duration,
    metrics: Arc<RedeemMetrics>,
    health: Arc<HealthState>,
  ) -> Self {
    Self {
      connector: ports.connector,
      keys: ports.keys,
      discovery: PositionDiscovery::new(ports.positions),
      orchestrator,
      proxy,
      interval,
      metrics,
      health,
    }
  }

  /// Wire a scheduler from validated configuration.
  pub fn from_config(
    config: &AppConfig,
    ports: CyclePorts,
    metrics: Arc<RedeemMetrics>,
    health: Arc<HealthState>,
  ) -> Result<Self> {
    let proxy = parse_address("wallet.proxy_address", &config.wallet.proxy_address)?;
    let orchestrator = RedemptionOrchestrator::from_config(config, Arc::clone(&metrics))?;

    Ok(Self::new(
      ports,
      orchestrator,
      proxy,
      config.bot.interval(),
      metrics,
      health,
    ))
  }

  /// One claim cycle, unsupervised.
  #[instrument(skip(self), name = "claim_cycle", fields(proxy = %self.proxy))]
  pub async fn run_cycle(&self) -> Result<CycleReport, CycleError> {
    let started_at = Utc::now();

    let rpc = self
      .connector
      .connect()
      .await
      .map_err(CycleError::Connectivity)?;

    let signer = self.keys.load().map_err(CycleError::InvalidCredential)?;
    info!(owner = %signer.address(), "Checking for redeemable positions");

    let condition_ids = self.discovery.discover(self.proxy).await;
    self.metrics.set_positions_discovered(condition_ids.len());
    if condition_ids.is_empty() {
      return Ok(CycleReport::empty(started_at));
    }

    Ok(
      self
        .orchestrator
        .redeem_all(rpc.as_ref(), signer.as_ref(), &condition_ids)
        .await,
    )
  }

  /// One claim cycle in its own task; panics become
  /// [`CycleError::Panicked`]. Outcome is logged and recorded.
  pub async fn supervised_cycle(self: &Arc<Self>) -> Result<CycleReport, CycleError> {
    let result = self
      .spawn_cycle()
      .await
      .unwrap_or_else(|e| Err(joined_error(e)));

    self.observe(&result);
    result
  }

  fn spawn_cycle(self: &Arc<Self>) -> JoinHandle<Result<CycleReport, CycleError>> {
    let this = Arc::clone(self);
    tokio::spawn(async move { this.run_cycle().await })
  }

  /// Loop until shutdown. A shutdown signal interrupts either the
  /// running cycle or the sleep; an in-flight transaction is not
  /// rolled back.
  #[instrument(skip_all, name = "scheduler")]
  pub async fn run(self: Arc<Self>, mut shutdown_rx: broadcast::Receiver<()>) {
    info!(
      interval_minutes = self.interval.as_secs() / 60,
      proxy = %self.proxy,
      "Scheduler started"
    );

    loop {
      let mut cycle = self.spawn_cycle();
      let joined = tokio::select! {
        biased;
        _ = shutdown_rx.recv() => None,
        joined = &mut cycle => Some(joined),
      };
      let Some(joined) = joined else {
        cycle.abort();
        info!("Shutdown signal received, abandoning current cycle");
        break;
      };

      let result = joined.unwrap_or_else(|e| Err(joined_error(e)));
      self.observe(&result);

      info!(
        next_check_in_seconds = self.interval.as_secs(),
        "Sleeping until next cycle"
      );

      tokio::select! {
        biased;
        _ = shutdown_rx.recv() => {
          info!("Shutdown signal received, stopping scheduler");
          break;
        }
        () = tokio::time::sleep(self.interval) => {}
      }
    }
  }

  fn observe(&self, result: &Result<CycleReport, CycleError>) {
    let finished_at = Utc::now().timestamp();

    match result {
      Ok(report) => {
        self.metrics.record_cycle("ok", finished_at);
        self.health.record_cycle(true);
        info!(
          claims = report.results.len(),
          redeemed = report.redeemed(),
          failed = report.failed(),
          elapsed_ms = report.elapsed_ms(),
          "Cycle complete"
        );
      }
      Err(e) => {
        self.metrics.record_cycle(e.kind(), finished_at);
        self
          .health
          .record_cycle(!matches!(e, CycleError::Connectivity(_)));
        error!(kind = e.kind(), error = %e, "Cycle failed");
      }
    }
  }
}

fn joined_error(e: JoinError) -> CycleError {
  if !e.is_panic() {
    return CycleError::Unclassified(anyhow::anyhow!("cycle task cancelled: {e}"));
  }

  let payload = e.into_panic();
  let message = payload
    .downcast_ref::<&str>()
    .map(ToString::to_string)
    .or_else(|| payload.downcast_ref::<String>().cloned())
    .unwrap_or_else(|| "unknown panic payload".to_string());
  CycleError::Panicked(message)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_cancelled_task_is_not_reported_as_panic() {
    let handle = tokio::spawn(tokio::time::sleep(Duration::from_secs(60)));
    handle.abort();
    let err = handle.await.unwrap_err();

    let mapped = joined_error(err);
    assert!(matches!(mapped, CycleError::Unclassified(_)));
    assert_eq!(mapped.kind(), "error");
  }

  #[tokio::test]
  async fn test_panic_payload_becomes_message() {
    let handle = tokio::spawn(async { panic!("boom {}", 7) });
    let err = handle.await.unwrap_err();

    match joined_error(err) {
      CycleError::Panicked(message) => assert_eq!(message, "boom 7"),
      other => panic!("expected panic error, got {other:?}"),
    }
  }
}
