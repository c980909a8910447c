//! Chain Client Port - On-chain Interaction Interface
//!
//! The JSON-RPC calls the submitter needs, and a connector that opens
//! a fresh, verified connection at the start of every cycle.

use std::sync::Arc;

use alloy::primitives::{Address, TxHash};
use async_trait::async_trait;

use crate::domain::transaction::{PendingTransaction, TxReceipt};

/// JSON-RPC operations used by one redemption cycle.
#[async_trait]
pub trait ChainRpc: Send + Sync {
  /// Chain id reported by the node.
  async fn chain_id(&self) -> anyhow::Result<u64>;

  /// Next nonce of `account`, counting its transactions still in the
  /// mempool.
  async fn transaction_count(&self, account: Address) -> anyhow::Result<u64>;

  /// Current network gas price in wei.
  async fn gas_price(&self) -> anyhow::Result<u128>;

  /// Simulate the transaction and return the gas it would use.
  async fn estimate_gas(&self, tx: &PendingTransaction) -> anyhow::Result<u64>;

  /// Broadcast a signed, EIP-2718 encoded transaction.
  async fn send_raw_transaction(&self, raw: &[u8]) -> anyhow::Result<TxHash>;

  /// Receipt for `hash`, or `None` while still pending.
  async fn transaction_receipt(&self, hash: TxHash) -> anyhow::Result<Option<TxReceipt>>;
}

/// Opens RPC connections.
///
/// Called once per cycle so no connection state outlives a cycle.
#[async_trait]
pub trait ChainConnector: Send + Sync + 'static {
  /// Connect and verify the endpoint serves the expected chain.
  async fn connect(&self) -> anyhow::Result<Arc<dyn ChainRpc>>;
}
