//! Polygon RPC Provider - alloy-rs 0.9 Connection Management
//!
//! Implements the `ChainRpc` port over an alloy HTTP provider and the
//! `ChainConnector` port that builds a fresh provider per cycle and
//! validates the chain id before handing it out.
//!
//! In alloy 0.9, `ProviderBuilder::new().on_http()` returns a complex
//! filler type. We store it as a type-erased `dyn Provider` to keep
//! the API clean across the adapter layer.

use std::sync::Arc;

use alloy::primitives::{Address, TxHash};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::transports::http::{Client, Http};
use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::config::ChainConfig;
use crate::domain::transaction::{PendingTransaction, TxReceipt};
use crate::ports::chain_client::{ChainConnector, ChainRpc};

/// Polygon RPC access backed by alloy-rs 0.9.
///
/// Uses `dyn Provider` for type erasure because alloy 0.9's
/// `ProviderBuilder::new().on_http()` returns a deeply-nested
/// generic filler type that would leak implementation details.
pub struct PolygonProvider {
    /// The alloy HTTP provider connected to Polygon RPC (type-erased).
    provider: Arc<dyn Provider<Http<Client>> + Send + Sync>,
}

impl PolygonProvider {
    /// Build an HTTP provider. No request is made until first use.
    pub fn new(rpc_url: &str) -> Result<Self> {
        // alloy 0.9: on_http() is synchronous, returns impl Provider
        let provider = ProviderBuilder::new().on_http(rpc_url.parse().context("Invalid RPC URL")?);

        Ok(Self {
            provider: Arc::new(provider),
        })
    }
}

#[async_trait]
impl ChainRpc for PolygonProvider {
    async fn chain_id(&self) -> Result<u64> {
        self.provider
            .get_chain_id()
            .await
            .context("Failed to query chain ID")
    }

    #[instrument(skip(self))]
    async fn transaction_count(&self, account: Address) -> Result<u64> {
        self.provider
            .get_transaction_count(account)
            .pending()
            .await
            .context("Failed to query transaction count")
    }

    async fn gas_price(&self) -> Result<u128> {
        self.provider
            .get_gas_price()
            .await
            .context("Failed to query gas price")
    }

    #[instrument(skip_all, fields(nonce = tx.nonce))]
    async fn estimate_gas(&self, tx: &PendingTransaction) -> Result<u64> {
        let request = tx.to_request();
        self.provider
            .estimate_gas(&request)
            .await
            .context("Gas estimation failed")
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<TxHash> {
        let pending = self
            .provider
            .send_raw_transaction(raw)
            .await
            .context("eth_sendRawTransaction failed")?;

        Ok(*pending.tx_hash())
    }

    async fn transaction_receipt(&self, hash: TxHash) -> Result<Option<TxReceipt>> {
        let receipt = self
            .provider
            .get_transaction_receipt(hash)
            .await
            .context("Failed to query transaction receipt")?;

        Ok(receipt.map(|r| TxReceipt {
            tx_hash: r.transaction_hash,
            success: r.status(),
            block_number: r.block_number,
        }))
    }
}

/// Opens a new provider for each cycle.
#[derive(Debug, Clone)]
pub struct PolygonConnector {
    /// RPC endpoint URL (never logged: may embed an API key).
    rpc_url: String,
    /// Chain the endpoint must serve.
    expected_chain_id: u64,
}

impl PolygonConnector {
    pub fn new(config: &ChainConfig) -> Self {
        Self {
            rpc_url: config.rpc_url.clone(),
            expected_chain_id: config.chain_id,
        }
    }
}

#[async_trait]
impl ChainConnector for PolygonConnector {
    /// Connect and validate the chain ID (137 on Polygon mainnet).
    #[instrument(skip_all)]
    async fn connect(&self) -> Result<Arc<dyn ChainRpc>> {
        let provider = PolygonProvider::new(&self.rpc_url)?;

        let chain_id = provider.chain_id().await?;
        anyhow::ensure!(
            chain_id == self.expected_chain_id,
            "Expected chain_id={}, got {chain_id}",
            self.expected_chain_id
        );

        debug!(chain_id, "Connected to RPC");
        Ok(Arc::new(provider))
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::address;
    use serde_json::{Value, json};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    use super::*;

    /// JSON-RPC node that answers `eth_getTransactionCount` with 7,
    /// but only when asked for the `pending` block tag.
    async fn nonce_node() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(|req: &Request| {
                let body: Value = serde_json::from_slice(&req.body).unwrap_or_default();
                body["method"] == "eth_getTransactionCount" && body["params"][1] == "pending"
            })
            .respond_with(|req: &Request| {
                let body: Value = serde_json::from_slice(&req.body).unwrap_or_default();
                ResponseTemplate::new(200).set_body_json(json!({
                    "jsonrpc": "2.0",
                    "id": body["id"],
                    "result": "0x7",
                }))
            })
            .expect(1)
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_nonce_counts_mempool_transactions() {
        let server = nonce_node().await;
        let provider = PolygonProvider::new(&server.uri()).unwrap();

        let nonce = provider
            .transaction_count(address!("0101010101010101010101010101010101010101"))
            .await
            .unwrap();
        assert_eq!(nonce, 7);
    }

    #[test]
    fn test_invalid_rpc_url_is_rejected() {
        assert!(PolygonProvider::new("not a url").is_err());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_fails_connect() {
        let connector = PolygonConnector::new(&ChainConfig {
            rpc_url: "http://127.0.0.1:9".to_string(),
            ..ChainConfig::default()
        });
        assert!(connector.connect().await.is_err());
    }
}
