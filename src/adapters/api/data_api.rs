//! Polymarket Data API Client - Redeemable Position Discovery
//!
//! Implements the `PositionSource` port with a single
//! `GET /positions?user=..&redeemable=true&limit=..` request.
//! No retries: a failed request is simply retried next cycle.

use std::time::Duration;

use alloy::primitives::Address;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};

use crate::config::DiscoveryConfig;
use crate::ports::position_source::PositionSource;

use super::types::{PositionEntry, collect_redeemable};

/// Configuration for the Data API client.
#[derive(Debug, Clone)]
pub struct DataApiConfig {
  /// Full positions endpoint URL.
  pub positions_url: String,
  /// Result-count cap.
  pub page_limit: u32,
  /// Request timeout.
  pub timeout: Duration,
}

impl From<&DiscoveryConfig> for DataApiConfig {
  fn from(config: &DiscoveryConfig) -> Self {
    Self {
      positions_url: config.positions_url.clone(),
      page_limit: config.page_limit,
      timeout: Duration::from_secs(config.timeout_seconds),
    }
  }
}

/// HTTP client for the Polymarket positions index.
pub struct DataApiClient {
  /// Underlying HTTP client.
  http: Client,
  /// Client configuration.
  config: DataApiConfig,
}

impl DataApiClient {
  /// Create a new Data API client.
  pub fn new(config: DataApiConfig) -> Result<Self> {
    let http = Client::builder()
      .timeout(config.timeout)
      .pool_max_idle_per_host(2)
      .build()
      .context("Failed to build HTTP client")?;

    Ok(Self { http, config })
  }

  /// Fetch raw position entries for `holder`.
  async fn fetch_positions(&self, holder: Address) -> Result<Vec<PositionEntry>> {
    let response = self
      .http
      .get(&self.config.positions_url)
      .query(&[
        ("user", holder.to_string()),
        ("redeemable", "true".to_string()),
        ("limit", self.config.page_limit.to_string()),
      ])
      .send()
      .await
      .context("Positions request failed")?
      .error_for_status()
      .context("Positions API returned an error status")?;

    response
      .json::<Vec<PositionEntry>>()
      .await
      .context("Unexpected positions response shape")
  }
}

#[async_trait]
impl PositionSource for DataApiClient {
  #[instrument(skip(self), fields(holder = %holder))]
  async fn redeemable_conditions(&self, holder: Address) -> Result<Vec<String>> {
    let entries = self.fetch_positions(holder).await?;
    for entry in entries.iter().filter(|e| e.size > 0.0) {
      debug!(
        condition_id = %entry.condition_id,
        title = entry.title.as_deref().unwrap_or("<untitled>"),
        size = entry.size,
        "Redeemable position"
      );
    }
    let conditions = collect_redeemable(&entries);

    debug!(
      entries = entries.len(),
      redeemable = conditions.len(),
      "Positions fetched"
    );

    Ok(conditions)
  }
}
