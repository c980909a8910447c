//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, layering environment overrides
//! (secrets and endpoints), validating all parameters, and providing
//! clear error messages for misconfiguration.

use std::path::Path;

use alloy::primitives::Address;
use anyhow::{Context, Result};
use tracing::info;

use super::{AppConfig, SecretKey};

/// Owner private key (required, never in the file).
pub const ENV_PRIVATE_KEY: &str = "POLYMARKET_PRIVATE_KEY";
/// Proxy wallet address override.
pub const ENV_PROXY_ADDRESS: &str = "PM_ADDRESS";
/// RPC endpoint override.
pub const ENV_RPC_URL: &str = "POLYGON_RPC_URL";

/// Load and validate configuration from a TOML file plus the process env.
///
/// A missing file means "all defaults"; a present but malformed file is
/// an error.
///
/// # Errors
/// Returns detailed error if:
/// - The file exists but can't be read or parsed
/// - A required secret is missing
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let config = if path.exists() {
    let content = std::fs::read_to_string(path)
      .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)?
  } else {
    AppConfig::default()
  };

  let config = apply_env_overrides(config, |key| std::env::var(key).ok());

  validate_config(&config)?;

  info!(
    config_file = path.exists(),
    interval_seconds = config.bot.interval_seconds,
    chain_id = config.chain.chain_id,
    dry_run = config.bot.dry_run,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Parse a TOML document into an `AppConfig` (no env, no validation).
pub fn parse_config(content: &str) -> Result<AppConfig> {
  toml::from_str(content).with_context(|| "Failed to parse config.toml")
}

/// Layer environment values over the file configuration.
///
/// `lookup` abstracts the environment so tests never mutate process state.
pub fn apply_env_overrides<F>(mut config: AppConfig, lookup: F) -> AppConfig
where
  F: Fn(&str) -> Option<String>,
{
  let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

  if let Some(key) = non_empty(ENV_PRIVATE_KEY) {
    config.wallet.private_key = SecretKey::new(key);
  }
  if let Some(proxy) = non_empty(ENV_PROXY_ADDRESS) {
    config.wallet.proxy_address = proxy.trim().to_string();
  }
  if let Some(rpc) = non_empty(ENV_RPC_URL) {
    config.chain.rpc_url = rpc.trim().to_string();
  }

  config
}

/// Validate all configuration parameters.
///
/// Checks for:
/// - Present and well-formed proxy address and contract addresses
/// - A present private key (structural validity is checked per cycle)
/// - Positive intervals, timeouts and limits
pub fn validate_config(config: &AppConfig) -> Result<()> {
  // Wallet validation
  anyhow::ensure!(
    !config.wallet.proxy_address.is_empty(),
    "Proxy address must be set ({ENV_PROXY_ADDRESS} or wallet.proxy_address)"
  );
  parse_address("wallet.proxy_address", &config.wallet.proxy_address)?;
  anyhow::ensure!(
    !config.wallet.private_key.is_empty(),
    "{ENV_PRIVATE_KEY} must be set"
  );

  // Contract validation
  parse_address("contracts.conditional_tokens", &config.contracts.conditional_tokens)?;
  parse_address("contracts.collateral", &config.contracts.collateral)?;
  anyhow::ensure!(
    !config.contracts.index_sets.is_empty(),
    "contracts.index_sets must not be empty"
  );

  // Scheduling validation
  anyhow::ensure!(
    config.bot.interval_seconds > 0,
    "bot.interval_seconds must be positive"
  );

  // Chain validation
  anyhow::ensure!(!config.chain.rpc_url.is_empty(), "RPC URL must not be empty");
  anyhow::ensure!(
    config.chain.confirmation_timeout_seconds > 0,
    "chain.confirmation_timeout_seconds must be positive"
  );
  anyhow::ensure!(
    config.chain.receipt_poll_interval_ms > 0,
    "chain.receipt_poll_interval_ms must be positive"
  );
  anyhow::ensure!(
    config.chain.fallback_gas_limit > 0,
    "chain.fallback_gas_limit must be positive"
  );

  // Discovery validation
  anyhow::ensure!(
    !config.discovery.positions_url.is_empty(),
    "discovery.positions_url must not be empty"
  );
  anyhow::ensure!(
    config.discovery.page_limit > 0,
    "discovery.page_limit must be positive, got {}",
    config.discovery.page_limit
  );

  Ok(())
}

/// Parse a configured address, naming the offending key on failure.
pub fn parse_address(key: &str, value: &str) -> Result<Address> {
  value
    .trim()
    .parse::<Address>()
    .with_context(|| format!("Invalid address for {key}: {value}"))
}

#[cfg(test)]
mod tests {
  use super::*;

  const PROXY: &str = "0x1111111111111111111111111111111111111111";

  fn env(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
    move |key| {
      pairs
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| (*v).to_string())
    }
  }

  #[test]
  fn test_defaults_match_polygon_mainnet() {
    let config = parse_config("").unwrap();
    assert_eq!(config.bot.interval_seconds, 300);
    assert_eq!(config.chain.chain_id, 137);
    assert_eq!(config.chain.fallback_gas_limit, 500_000);
    assert_eq!(config.chain.gas_margin_percent, 30);
    assert_eq!(config.chain.confirmation_timeout_seconds, 120);
    assert_eq!(config.contracts.index_sets, vec![1, 2]);
    assert_eq!(config.discovery.page_limit, 50);
    assert_eq!(config.redemption.pause_between_claims_ms, 3_000);
  }

  #[test]
  fn test_partial_file_keeps_other_defaults() {
    let config = parse_config(
      r#"
        [bot]
        interval_seconds = 60

        [chain]
        rpc_url = "http://localhost:8545"
      "#,
    )
    .unwrap();

    assert_eq!(config.bot.interval_seconds, 60);
    assert_eq!(config.bot.log_level, "info");
    assert_eq!(config.chain.rpc_url, "http://localhost:8545");
    assert_eq!(config.chain.chain_id, 137);
  }

  #[test]
  fn test_private_key_is_never_read_from_file() {
    let config = parse_config(
      r#"
        [wallet]
        proxy_address = "0x1111111111111111111111111111111111111111"
        private_key = "0xdeadbeef"
      "#,
    );
    // Unknown-to-serde field is ignored, key stays unset.
    assert!(config.unwrap().wallet.private_key.is_empty());
  }

  #[test]
  fn test_env_overrides_apply() {
    let config = apply_env_overrides(
      AppConfig::default(),
      env(&[
        (ENV_PRIVATE_KEY, "0xabc"),
        (ENV_PROXY_ADDRESS, PROXY),
        (ENV_RPC_URL, "http://rpc.local"),
      ]),
    );

    assert_eq!(config.wallet.private_key.expose(), "0xabc");
    assert_eq!(config.wallet.proxy_address, PROXY);
    assert_eq!(config.chain.rpc_url, "http://rpc.local");
  }

  #[test]
  fn test_blank_env_values_are_ignored() {
    let config = apply_env_overrides(AppConfig::default(), env(&[(ENV_RPC_URL, "  ")]));
    assert_eq!(config.chain.rpc_url, "https://polygon-rpc.com");
  }

  #[test]
  fn test_validation_requires_proxy_and_key() {
    let missing_both = AppConfig::default();
    assert!(validate_config(&missing_both).is_err());

    let missing_key = apply_env_overrides(AppConfig::default(), env(&[(ENV_PROXY_ADDRESS, PROXY)]));
    assert!(validate_config(&missing_key).is_err());

    let complete = apply_env_overrides(
      AppConfig::default(),
      env(&[(ENV_PROXY_ADDRESS, PROXY), (ENV_PRIVATE_KEY, "0x01")]),
    );
    assert!(validate_config(&complete).is_ok());
  }

  #[test]
  fn test_validation_rejects_bad_addresses_and_limits() {
    let base = apply_env_overrides(
      AppConfig::default(),
      env(&[(ENV_PROXY_ADDRESS, PROXY), (ENV_PRIVATE_KEY, "0x01")]),
    );

    let mut bad_proxy = base.clone();
    bad_proxy.wallet.proxy_address = "0x1234".to_string();
    assert!(validate_config(&bad_proxy).is_err());

    let mut bad_ctf = base.clone();
    bad_ctf.contracts.conditional_tokens = "not-an-address".to_string();
    assert!(validate_config(&bad_ctf).is_err());

    let mut no_index_sets = base.clone();
    no_index_sets.contracts.index_sets.clear();
    assert!(validate_config(&no_index_sets).is_err());

    let mut zero_interval = base.clone();
    zero_interval.bot.interval_seconds = 0;
    assert!(validate_config(&zero_interval).is_err());

    let mut zero_limit = base;
    zero_limit.discovery.page_limit = 0;
    assert!(validate_config(&zero_limit).is_err());
  }

  #[test]
  fn test_secret_key_debug_is_redacted() {
    let key = SecretKey::new("0xsupersecret");
    let shown = format!("{key:?}");
    assert!(!shown.contains("supersecret"));
    assert_eq!(shown, "SecretKey(<redacted>)");
  }

  #[test]
  fn test_shipped_config_matches_defaults() {
    let shipped = parse_config(include_str!("../../config.toml")).unwrap();
    let defaults = AppConfig::default();
    assert_eq!(shipped.chain.rpc_url, defaults.chain.rpc_url);
    assert_eq!(shipped.contracts.conditional_tokens, defaults.contracts.conditional_tokens);
    assert_eq!(shipped.contracts.collateral, defaults.contracts.collateral);
    assert_eq!(shipped.discovery.positions_url, defaults.discovery.positions_url);
    assert_eq!(shipped.bot.interval_seconds, defaults.bot.interval_seconds);
  }

  #[test]
  fn test_malformed_file_is_an_error() {
    assert!(parse_config("[bot\ninterval_seconds = ").is_err());
  }
}
