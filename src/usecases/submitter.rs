//! Transaction Submitter Use Case
//!
//! Drives one proxy transaction through
//! `BUILDING → GAS_ESTIMATED → SIGNED → SUBMITTED → {CONFIRMED | REVERTED | TIMED_OUT}`.
//!
//! - Nonce and gas price are read fresh right before building
//! - Gas limit is the estimate plus margin, or a fixed fallback when
//!   simulation fails (the transaction is still sent)
//! - Confirmation polls for a receipt until a deadline; a timeout is
//!   reported, never re-checked

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{TxHash, U256};
use tracing::{debug, info, instrument, warn};

use crate::adapters::metrics::RedeemMetrics;
use crate::config::AppConfig;
use crate::domain::error::RedeemError;
use crate::domain::safe_tx::MetaTransaction;
use crate::domain::transaction::{GasPolicy, PendingTransaction, SubmissionOutcome, TxReceipt};
use crate::ports::chain_client::ChainRpc;
use crate::ports::signer::TransactionSigner;

/// Submission parameters.
#[derive(Debug, Clone)]
pub struct SubmitterConfig {
  /// Chain id embedded in every transaction (EIP-155).
  pub chain_id: u64,
  /// Estimate margin and fallback limit.
  pub gas: GasPolicy,
  /// Give up waiting for a receipt after this long.
  pub confirmation_timeout: Duration,
  /// Delay between receipt polls.
  pub poll_interval: Duration,
  /// Explorer prefix for transaction links.
  pub explorer_tx_url: String,
  /// Stop after estimation; never sign or broadcast.
  pub dry_run: bool,
}

impl From<&AppConfig> for SubmitterConfig {
  fn from(config: &AppConfig) -> Self {
    Self {
      chain_id: config.chain.chain_id,
      gas: GasPolicy {
        margin_percent: config.chain.gas_margin_percent,
        fallback_limit: config.chain.fallback_gas_limit,
      },
      confirmation_timeout: Duration::from_secs(config.chain.confirmation_timeout_seconds),
      poll_interval: Duration::from_millis(config.chain.receipt_poll_interval_ms),
      explorer_tx_url: config.chain.explorer_tx_url.clone(),
      dry_run: config.bot.dry_run,
    }
  }
}

/// Builds, signs, broadcasts and confirms a single proxy transaction.
pub struct TransactionSubmitter {
  config: SubmitterConfig,
  metrics: Arc<RedeemMetrics>,
}

impl TransactionSubmitter {
  pub fn new(config: SubmitterConfig, metrics: Arc<RedeemMetrics>) -> Self {
    Self { config, metrics }
  }

  /// Submit `meta` from the signer's account and wait for the outcome.
  ///
  /// Reverts and confirmation timeouts are outcomes, not errors; only
  /// failures before the transaction reaches the network are `Err`.
  #[instrument(skip_all, fields(condition_id = %meta.condition_id))]
  pub async fn submit(
    &self,
    rpc: &dyn ChainRpc,
    signer: &dyn TransactionSigner,
    meta: &MetaTransaction,
  ) -> Result<SubmissionOutcome, RedeemError> {
    let owner = signer.address();

    let nonce = rpc
      .transaction_count(owner)
      .await
      .map_err(|e| RedeemError::network("nonce", e))?;
    let gas_price = rpc
      .gas_price()
      .await
      .map_err(|e| RedeemError::network("gas_price", e))?;
    self.metrics.set_gas_price_wei(gas_price);

    let mut tx = PendingTransaction {
      from: owner,
      to: meta.to,
      value: U256::ZERO,
      input: meta.calldata.clone(),
      nonce,
      gas_price,
      gas_limit: None,
      chain_id: self.config.chain_id,
    };

    let estimate = rpc.estimate_gas(&tx).await;
    let gas_limit = self.config.gas.limit_for(&estimate);
    match &estimate {
      Ok(estimated) => debug!(estimated, gas_limit, "Gas estimated"),
      Err(e) => {
        warn!(error = %format!("{e:#}"), gas_limit, "Gas estimation failed, using fallback limit");
        self.metrics.record_gas_fallback();
      }
    }
    tx.gas_limit = Some(gas_limit);

    if self.config.dry_run {
      info!(nonce, gas_limit, gas_price, "Dry run: not signing or broadcasting");
      return Ok(SubmissionOutcome::DryRun { gas_limit });
    }

    let raw = signer
      .sign(&tx)
      .await
      .map_err(|e| RedeemError::Signing(format!("{e:#}")))?
      .into_raw()?;

    let tx_hash = rpc
      .send_raw_transaction(&raw)
      .await
      .map_err(RedeemError::Broadcast)?;

    info!(
      %tx_hash,
      nonce,
      gas_limit,
      explorer = %format!("{}{tx_hash}", self.config.explorer_tx_url),
      "Redemption transaction sent"
    );

    Ok(self.await_receipt(rpc, tx_hash).await)
  }

  /// Poll for a receipt until one arrives or the deadline passes.
  async fn await_receipt(&self, rpc: &dyn ChainRpc, tx_hash: TxHash) -> SubmissionOutcome {
    let poll = async {
      loop {
        match rpc.transaction_receipt(tx_hash).await {
          Ok(Some(receipt)) => return receipt,
          Ok(None) => {}
          Err(e) => debug!(error = %e, "Receipt poll failed, retrying"),
        }
        tokio::time::sleep(self.config.poll_interval).await;
      }
    };

    match tokio::time::timeout(self.config.confirmation_timeout, poll).await {
      Ok(TxReceipt {
        success: true,
        block_number,
        ..
      }) => SubmissionOutcome::Confirmed {
        tx_hash,
        block_number,
      },
      Ok(_) => SubmissionOutcome::Reverted { tx_hash },
      Err(_) => SubmissionOutcome::TimedOut { tx_hash },
    }
  }
}
