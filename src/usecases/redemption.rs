//! Redemption Use Case - Sequential Claim Processing
//!
//! Redeems every discovered condition id, one at a time, through the
//! proxy wallet. Claims never overlap: each submission waits for its
//! outcome, then the orchestrator pauses so the account nonce seen by
//! the network advances before the next read.
//!
//! A failed claim (encoding, network, signing, broadcast, revert,
//! timeout) is logged and recorded; the next claim still runs.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use tracing::{error, info, instrument, warn};

use crate::adapters::metrics::RedeemMetrics;
use crate::config::AppConfig;
use crate::config::loader::parse_address;
use crate::domain::claim::{ClaimResult, CycleReport};
use crate::domain::error::RedeemError;
use crate::domain::safe_tx::{RedemptionContracts, SafeTxBuilder};
use crate::domain::transaction::SubmissionOutcome;
use crate::ports::chain_client::ChainRpc;
use crate::ports::signer::TransactionSigner;

use super::submitter::{SubmitterConfig, TransactionSubmitter};

/// Runs all claims of one cycle in order.
pub struct RedemptionOrchestrator {
  builder: SafeTxBuilder,
  submitter: TransactionSubmitter,
  /// Pause between consecutive claims.
  pause: Duration,
  metrics: Arc<RedeemMetrics>,
}

impl RedemptionOrchestrator {
  pub fn new(
    builder: SafeTxBuilder,
    submitter: TransactionSubmitter,
    pause: Duration,
    metrics: Arc<RedeemMetrics>,
  ) -> Self {
    Self {
      builder,
      submitter,
      pause,
      metrics,
    }
  }

  /// Wire builder and submitter from validated configuration.
  pub fn from_config(config: &AppConfig, metrics: Arc<RedeemMetrics>) -> Result<Self> {
    let proxy = parse_address("wallet.proxy_address", &config.wallet.proxy_address)?;
    let contracts = RedemptionContracts::from_config(&config.contracts)?;

    Ok(Self::new(
      SafeTxBuilder::new(proxy, contracts),
      TransactionSubmitter::new(SubmitterConfig::from(config), Arc::clone(&metrics)),
      Duration::from_millis(config.redemption.pause_between_claims_ms),
      metrics,
    ))
  }

  /// Redeem `condition_ids` sequentially and report each outcome.
  #[instrument(skip_all, fields(claims = condition_ids.len()))]
  pub async fn redeem_all(
    &self,
    rpc: &dyn ChainRpc,
    signer: &dyn TransactionSigner,
    condition_ids: &[String],
  ) -> CycleReport {
    let started_at = Utc::now();
    let mut results = Vec::with_capacity(condition_ids.len());

    for (i, condition_id) in condition_ids.iter().enumerate() {
      if i > 0 {
        tokio::time::sleep(self.pause).await;
      }

      info!(
        condition_id = %condition_id,
        position = i + 1,
        of = condition_ids.len(),
        "Redeeming position"
      );

      let outcome = self.redeem_one(rpc, signer, condition_id).await;
      log_outcome(condition_id, &outcome);

      let result = ClaimResult {
        condition_id: condition_id.clone(),
        outcome,
      };
      self.metrics.record_claim(result.label());
      results.push(result);
    }

    let report = CycleReport {
      results,
      started_at,
      finished_at: Utc::now(),
    };

    info!(
      redeemed = report.redeemed(),
      reverted = report.reverted(),
      timed_out = report.timed_out(),
      failed = report.failed(),
      "Redemption pass complete"
    );

    report
  }

  async fn redeem_one(
    &self,
    rpc: &dyn ChainRpc,
    signer: &dyn TransactionSigner,
    condition_id: &str,
  ) -> Result<SubmissionOutcome, RedeemError> {
    let meta = self.builder.build(condition_id, signer.address())?;
    self.submitter.submit(rpc, signer, &meta).await
  }
}

fn log_outcome(condition_id: &str, outcome: &Result<SubmissionOutcome, RedeemError>) {
  match outcome {
    Ok(SubmissionOutcome::Confirmed {
      tx_hash,
      block_number,
    }) => info!(condition_id, %tx_hash, block_number, "Redeemed"),
    Ok(SubmissionOutcome::Reverted { tx_hash }) => {
      warn!(condition_id, %tx_hash, "Redemption reverted on-chain")
    }
    Ok(SubmissionOutcome::TimedOut { tx_hash }) => {
      warn!(condition_id, %tx_hash, "No receipt before deadline, outcome unknown")
    }
    Ok(SubmissionOutcome::DryRun { gas_limit }) => {
      info!(condition_id, gas_limit, "Dry run complete")
    }
    Err(e) => error!(condition_id, kind = e.kind(), error = %e, "Redemption failed"),
  }
}
