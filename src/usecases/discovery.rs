//! Position Discovery Use Case
//!
//! Asks the position source which settled conditions the proxy wallet
//! still holds. Discovery never fails a cycle: any source error is
//! logged and treated as "nothing to claim".

use std::sync::Arc;

use alloy::primitives::Address;
use tracing::{info, instrument, warn};

use crate::ports::position_source::PositionSource;

/// Non-fatal wrapper around a [`PositionSource`].
pub struct PositionDiscovery {
  source: Arc<dyn PositionSource>,
}

impl PositionDiscovery {
  pub fn new(source: Arc<dyn PositionSource>) -> Self {
    Self { source }
  }

  /// Distinct redeemable condition ids for `holder`, empty on failure.
  #[instrument(skip(self), fields(holder = %holder))]
  pub async fn discover(&self, holder: Address) -> Vec<String> {
    match self.source.redeemable_conditions(holder).await {
      Ok(ids) if ids.is_empty() => {
        info!("No redeemable positions found");
        ids
      }
      Ok(ids) => {
        info!(count = ids.len(), "Found redeemable positions");
        ids
      }
      Err(e) => {
        warn!(error = %format!("{e:#}"), "Position discovery failed, nothing to claim this cycle");
        Vec::new()
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use async_trait::async_trait;

  use super::*;

  struct FixedSource(anyhow::Result<Vec<String>>);

  #[async_trait]
  impl PositionSource for FixedSource {
    async fn redeemable_conditions(&self, _holder: Address) -> anyhow::Result<Vec<String>> {
      match &self.0 {
        Ok(ids) => Ok(ids.clone()),
        Err(e) => Err(anyhow::anyhow!("{e}")),
      }
    }
  }

  #[tokio::test]
  async fn test_passes_ids_through() {
    let discovery = PositionDiscovery::new(Arc::new(FixedSource(Ok(vec!["0xaa".into()]))));
    assert_eq!(discovery.discover(Address::ZERO).await, vec!["0xaa".to_string()]);
  }

  #[tokio::test]
  async fn test_source_error_becomes_empty() {
    let discovery = PositionDiscovery::new(Arc::new(FixedSource(Err(anyhow::anyhow!("timed out")))));
    assert!(discovery.discover(Address::ZERO).await.is_empty());
  }
}
