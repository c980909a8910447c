//! Signer Port - Owner Key and Transaction Signing
//!
//! The owner key is re-loaded every cycle so a malformed key skips
//! the cycle instead of crashing the process.

use std::sync::Arc;

use alloy::primitives::Address;
use async_trait::async_trait;

use crate::domain::transaction::{PendingTransaction, SignedPayload};

/// Signs transactions as the proxy wallet's owner.
#[async_trait]
pub trait TransactionSigner: Send + Sync {
  /// Owner EOA address.
  fn address(&self) -> Address;

  /// Sign a fully populated transaction.
  async fn sign(&self, tx: &PendingTransaction) -> anyhow::Result<SignedPayload>;
}

/// Derives the signing identity from configured key material.
pub trait SignerLoader: Send + Sync + 'static {
  /// Parse the key. Fails when it is structurally invalid.
  fn load(&self) -> anyhow::Result<Arc<dyn TransactionSigner>>;
}
