//! Configuration Module - TOML-based Bot Configuration
//!
//! Loads and validates configuration from `config.toml` with
//! environment variable overrides (`.env` is loaded by `main`).
//! Contract addresses, chain id and index sets are externalized
//! here so the transaction builder never hardcodes a deployment.
//! The owner's private key is only ever read from the environment.

pub mod loader;

use std::fmt;
use std::time::Duration;

use serde::Deserialize;

/// Top-level bot configuration.
///
/// Built once at startup and handed to each component by value or
/// reference. Nothing reads the environment after this is loaded.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
  /// Bot identity, logging and scheduling.
  pub bot: BotConfig,
  /// Proxy wallet and owner key.
  pub wallet: WalletConfig,
  /// Polygon RPC and transaction parameters.
  pub chain: ChainConfig,
  /// Contract deployment constants.
  pub contracts: ContractsConfig,
  /// Positions API parameters.
  pub discovery: DiscoveryConfig,
  /// Per-claim sequencing.
  pub redemption: RedemptionConfig,
  /// Metrics and health endpoints.
  pub metrics: MetricsConfig,
}

/// Bot identity configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BotConfig {
  /// Human-readable bot name.
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  pub log_level: String,
  /// Emit JSON log lines instead of human-readable ones.
  pub json_logs: bool,
  /// Sleep between redemption cycles (seconds).
  pub interval_seconds: u64,
  /// Estimate gas but never sign or broadcast.
  pub dry_run: bool,
}

impl Default for BotConfig {
  fn default() -> Self {
    Self {
      name: default_bot_name(),
      log_level: default_log_level(),
      json_logs: false,
      interval_seconds: default_interval(),
      dry_run: false,
    }
  }
}

impl BotConfig {
  /// Cycle interval as a `Duration`.
  pub fn interval(&self) -> Duration {
    Duration::from_secs(self.interval_seconds)
  }
}

/// Proxy wallet configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
  /// Safe proxy wallet holding the positions (PM_ADDRESS overrides).
  pub proxy_address: String,
  /// Owner private key. Never deserialized from the file.
  #[serde(skip)]
  pub private_key: SecretKey,
}

/// Owner private key with a redacted `Debug` impl.
#[derive(Clone, Default)]
pub struct SecretKey(String);

impl SecretKey {
  /// Wrap a raw hex key.
  pub fn new(raw: impl Into<String>) -> Self {
    Self(raw.into().trim().to_string())
  }

  /// Raw key material. Callers must not log it.
  pub fn expose(&self) -> &str {
    &self.0
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

impl fmt::Debug for SecretKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.0.is_empty() {
      f.write_str("SecretKey(<unset>)")
    } else {
      f.write_str("SecretKey(<redacted>)")
    }
  }
}

/// Chain access and transaction parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
  /// Polygon RPC endpoint (POLYGON_RPC_URL overrides).
  pub rpc_url: String,
  /// Expected chain id, checked on every connect.
  pub chain_id: u64,
  /// Block explorer prefix for transaction links.
  pub explorer_tx_url: String,
  /// Maximum wait for a receipt (seconds).
  pub confirmation_timeout_seconds: u64,
  /// Receipt polling interval (milliseconds).
  pub receipt_poll_interval_ms: u64,
  /// Safety margin added to the gas estimate (percent).
  pub gas_margin_percent: u64,
  /// Gas limit used when estimation fails.
  pub fallback_gas_limit: u64,
}

impl Default for ChainConfig {
  fn default() -> Self {
    Self {
      rpc_url: default_rpc_url(),
      chain_id: default_chain_id(),
      explorer_tx_url: default_explorer(),
      confirmation_timeout_seconds: default_confirmation_timeout(),
      receipt_poll_interval_ms: default_receipt_poll(),
      gas_margin_percent: default_gas_margin(),
      fallback_gas_limit: default_fallback_gas(),
    }
  }
}

/// Contract deployment constants (Polygon mainnet by default).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ContractsConfig {
  /// Conditional Tokens Framework contract.
  pub conditional_tokens: String,
  /// Collateral token the positions pay out in (USDC.e).
  pub collateral: String,
  /// Outcome index sets passed to `redeemPositions`.
  pub index_sets: Vec<u64>,
}

impl Default for ContractsConfig {
  fn default() -> Self {
    Self {
      conditional_tokens: default_ctf(),
      collateral: default_collateral(),
      index_sets: default_index_sets(),
    }
  }
}

/// Positions API configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
  /// Positions endpoint URL.
  pub positions_url: String,
  /// Result-count cap sent as `limit`.
  pub page_limit: u32,
  /// Request timeout in seconds.
  pub timeout_seconds: u64,
}

impl Default for DiscoveryConfig {
  fn default() -> Self {
    Self {
      positions_url: default_positions_url(),
      page_limit: default_page_limit(),
      timeout_seconds: default_timeout(),
    }
  }
}

/// Claim sequencing configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RedemptionConfig {
  /// Pause between consecutive submissions so the pending nonce settles.
  pub pause_between_claims_ms: u64,
}

impl Default for RedemptionConfig {
  fn default() -> Self {
    Self {
      pause_between_claims_ms: default_claim_pause(),
    }
  }
}

/// Metrics and monitoring configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
  /// Enable Prometheus metrics and health endpoints.
  pub enabled: bool,
  /// Metrics server bind address.
  pub bind_address: String,
  /// Health check endpoint port.
  pub health_port: u16,
}

impl Default for MetricsConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      bind_address: default_metrics_addr(),
      health_port: default_health_port(),
    }
  }
}

// Default value functions for serde

fn default_bot_name() -> String {
  "polymarket-auto-claim".to_string()
}

fn default_log_level() -> String {
  "info".to_string()
}

fn default_interval() -> u64 {
  300
}

fn default_rpc_url() -> String {
  "https://polygon-rpc.com".to_string()
}

fn default_chain_id() -> u64 {
  137
}

fn default_explorer() -> String {
  "https://polygonscan.com/tx/".to_string()
}

fn default_confirmation_timeout() -> u64 {
  120
}

fn default_receipt_poll() -> u64 {
  2_000
}

fn default_gas_margin() -> u64 {
  30
}

fn default_fallback_gas() -> u64 {
  500_000
}

fn default_ctf() -> String {
  "0x4D97DCd97eC945f40cF65F87097ACe5EA0476045".to_string()
}

fn default_collateral() -> String {
  "0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174".to_string()
}

fn default_index_sets() -> Vec<u64> {
  vec![1, 2]
}

fn default_positions_url() -> String {
  "https://data-api.polymarket.com/positions".to_string()
}

fn default_page_limit() -> u32 {
  50
}

fn default_timeout() -> u64 {
  10
}

fn default_claim_pause() -> u64 {
  3_000
}

fn default_metrics_addr() -> String {
  "0.0.0.0:9090".to_string()
}

fn default_health_port() -> u16 {
  8080
}
