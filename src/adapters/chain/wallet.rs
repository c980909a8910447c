//! Owner Wallet - Local Private Key Signing
//!
//! Derives the owner's signing identity from the configured key and
//! signs legacy (gas-price) transactions with an alloy
//! `EthereumWallet`. The key is parsed anew each cycle; nothing here
//! logs or persists it.

use std::sync::Arc;

use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::config::SecretKey;
use crate::domain::transaction::{PendingTransaction, SignedPayload};
use crate::ports::signer::{SignerLoader, TransactionSigner};

/// Signs as the proxy wallet's owner with an in-memory key.
pub struct LocalKeySigner {
    address: Address,
    wallet: EthereumWallet,
}

impl LocalKeySigner {
    /// Parse a hex private key (with or without `0x`).
    pub fn from_key(key: &SecretKey) -> Result<Self> {
        anyhow::ensure!(!key.is_empty(), "Private key is empty");

        let signer: PrivateKeySigner = key
            .expose()
            .parse()
            .context("Private key is not a valid secp256k1 key")?;

        Ok(Self {
            address: signer.address(),
            wallet: EthereumWallet::from(signer),
        })
    }
}

#[async_trait]
impl TransactionSigner for LocalKeySigner {
    fn address(&self) -> Address {
        self.address
    }

    async fn sign(&self, tx: &PendingTransaction) -> Result<SignedPayload> {
        anyhow::ensure!(tx.gas_limit.is_some(), "Gas limit must be set before signing");

        let envelope = tx
            .to_request()
            .build(&self.wallet)
            .await
            .context("Failed to sign transaction")?;

        Ok(SignedPayload::Envelope(envelope))
    }
}

/// `SignerLoader` over the configured owner key.
#[derive(Clone)]
pub struct OwnerKey {
    key: SecretKey,
}

impl OwnerKey {
    pub const fn new(key: SecretKey) -> Self {
        Self { key }
    }
}

impl SignerLoader for OwnerKey {
    fn load(&self) -> Result<Arc<dyn TransactionSigner>> {
        Ok(Arc::new(LocalKeySigner::from_key(&self.key)?))
    }
}
