//! Pending transaction, gas policy and signed-payload normalization.
//!
//! A `PendingTransaction` lives for exactly one submission attempt:
//! populated from fresh chain reads, signed, broadcast, then dropped.

use alloy::consensus::TxEnvelope;
use alloy::eips::eip2718::Encodable2718;
use alloy::hex;
use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::rpc::types::TransactionRequest;
use serde_json::Value;

use super::error::RedeemError;

/// A legacy (gas-price) transaction being prepared for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTransaction {
    /// Owner EOA paying gas.
    pub from: Address,
    /// Proxy wallet.
    pub to: Address,
    /// Always zero for redemptions.
    pub value: U256,
    /// `execTransaction` calldata.
    pub input: Bytes,
    /// Account nonce read right before building.
    pub nonce: u64,
    /// Network-reported gas price (wei).
    pub gas_price: u128,
    /// Unset until estimation (or fallback) has run.
    pub gas_limit: Option<u64>,
    pub chain_id: u64,
}

impl PendingTransaction {
    /// Convert to an RPC request, omitting gas when not yet known so
    /// `eth_estimateGas` simulates without a cap.
    pub fn to_request(&self) -> TransactionRequest {
        let request = TransactionRequest::default()
            .with_from(self.from)
            .with_to(self.to)
            .with_value(self.value)
            .with_input(self.input.clone())
            .with_nonce(self.nonce)
            .with_gas_price(self.gas_price)
            .with_chain_id(self.chain_id);

        match self.gas_limit {
            Some(limit) => request.with_gas_limit(limit),
            None => request,
        }
    }
}

/// Gas limit policy: estimate plus margin, or a fixed fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasPolicy {
    /// Margin added on top of the estimate, in percent.
    pub margin_percent: u64,
    /// Limit used when estimation fails.
    pub fallback_limit: u64,
}

impl Default for GasPolicy {
    fn default() -> Self {
        Self {
            margin_percent: 30,
            fallback_limit: 500_000,
        }
    }
}

impl GasPolicy {
    /// `floor(estimate * (1 + margin))`, computed exactly in integers.
    pub fn with_margin(&self, estimate: u64) -> u64 {
        let scaled = u128::from(estimate) * u128::from(100 + self.margin_percent) / 100;
        u64::try_from(scaled).unwrap_or(u64::MAX)
    }

    /// Limit to use given the outcome of `eth_estimateGas`.
    pub fn limit_for<E>(&self, estimate: &Result<u64, E>) -> u64 {
        match estimate {
            Ok(gas) => self.with_margin(*gas),
            Err(_) => self.fallback_limit,
        }
    }
}

/// Final state of a submission attempt that reached the network (or
/// stopped early in dry-run mode).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// Receipt status 1.
    Confirmed {
        tx_hash: TxHash,
        block_number: Option<u64>,
    },
    /// Receipt status 0. The contract rejected the call.
    Reverted { tx_hash: TxHash },
    /// No receipt before the deadline; fate unknown.
    TimedOut { tx_hash: TxHash },
    /// Dry-run: estimated but never signed.
    DryRun { gas_limit: u64 },
}

impl SubmissionOutcome {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Confirmed { .. } => "redeemed",
            Self::Reverted { .. } => "reverted",
            Self::TimedOut { .. } => "timed_out",
            Self::DryRun { .. } => "dry_run",
        }
    }
}

/// Minimal receipt view needed to classify an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxReceipt {
    pub tx_hash: TxHash,
    /// `true` for status 1.
    pub success: bool,
    pub block_number: Option<u64>,
}

/// Output of a signer, in whichever shape the signing backend produces.
///
/// Compatibility shim: local signers return a typed envelope, remote
/// signers (`eth_signTransaction`-style) return JSON or a `(raw, hash)`
/// pair. [`SignedPayload::into_raw`] is the single place these shapes
/// are reduced to broadcastable bytes.
#[derive(Debug, Clone)]
pub enum SignedPayload {
    /// Typed, signed envelope.
    Envelope(TxEnvelope),
    /// Already-encoded raw transaction.
    Raw(Bytes),
    /// JSON object or hex string from a remote signer.
    Json(Value),
    /// Positional `(raw, hash)` pair.
    Pair(Bytes, TxHash),
}

/// JSON keys searched for the raw transaction, in order.
const RAW_TX_KEYS: [&str; 3] = ["raw", "rawTransaction", "raw_transaction"];

impl SignedPayload {
    /// Reduce to raw EIP-2718 bytes.
    ///
    /// Precedence:
    /// 1. `Envelope` → EIP-2718 encoding
    /// 2. `Raw` → as is
    /// 3. `Json` → first present of `raw`, `rawTransaction`,
    ///    `raw_transaction`; a bare JSON string is taken as the raw hex
    /// 4. `Pair` → element 0
    pub fn into_raw(self) -> Result<Bytes, RedeemError> {
        let raw = match self {
            Self::Envelope(envelope) => Bytes::from(envelope.encoded_2718()),
            Self::Raw(raw) | Self::Pair(raw, _) => raw,
            Self::Json(value) => raw_from_json(&value)?,
        };

        if raw.is_empty() {
            return Err(RedeemError::Signing("signer returned an empty transaction".to_string()));
        }
        Ok(raw)
    }
}

fn raw_from_json(value: &Value) -> Result<Bytes, RedeemError> {
    let hex_str = match value {
        Value::String(s) => Some(s.as_str()),
        Value::Object(map) => RAW_TX_KEYS
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str)),
        _ => None,
    }
    .ok_or_else(|| {
        RedeemError::Signing(format!(
            "signed payload has none of the fields {RAW_TX_KEYS:?}"
        ))
    })?;

    hex::decode(hex_str)
        .map(Bytes::from)
        .map_err(|e| RedeemError::Signing(format!("raw transaction is not hex: {e}")))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_gas_margin_is_floor_of_130_percent() {
        let policy = GasPolicy::default();
        assert_eq!(policy.with_margin(100_000), 130_000);
        assert_eq!(policy.with_margin(21_001), 27_301); // 27301.3
        assert_eq!(policy.with_margin(7), 9); // 9.1
        assert_eq!(policy.with_margin(0), 0);
    }

    #[test]
    fn test_gas_margin_saturates() {
        let policy = GasPolicy::default();
        assert_eq!(policy.with_margin(u64::MAX), u64::MAX);
    }

    #[test]
    fn test_estimate_failure_uses_fallback() {
        let policy = GasPolicy::default();
        let failed: Result<u64, &str> = Err("execution reverted");
        assert_eq!(policy.limit_for(&failed), 500_000);
        assert_eq!(policy.limit_for::<&str>(&Ok(200_000)), 260_000);
    }

    #[test]
    fn test_request_omits_unknown_gas_limit() {
        let mut tx = PendingTransaction {
            from: Address::repeat_byte(1),
            to: Address::repeat_byte(2),
            value: U256::ZERO,
            input: Bytes::from_static(&[0x6a, 0x76, 0x12, 0x02]),
            nonce: 7,
            gas_price: 30_000_000_000,
            gas_limit: None,
            chain_id: 137,
        };

        let request = tx.to_request();
        assert_eq!(request.gas, None);
        assert_eq!(request.nonce, Some(7));
        assert_eq!(request.gas_price, Some(30_000_000_000));
        assert_eq!(request.chain_id, Some(137));

        tx.gas_limit = Some(260_000);
        assert_eq!(tx.to_request().gas, Some(260_000));
    }

    #[test]
    fn test_normalize_raw_and_pair() {
        let raw = Bytes::from_static(&[0xf8, 0x01]);
        assert_eq!(SignedPayload::Raw(raw.clone()).into_raw().unwrap(), raw);
        assert_eq!(
            SignedPayload::Pair(raw.clone(), TxHash::ZERO).into_raw().unwrap(),
            raw
        );
    }

    #[test]
    fn test_normalize_json_key_precedence() {
        let payload = SignedPayload::Json(json!({
            "rawTransaction": "0x02",
            "raw": "0x01",
            "raw_transaction": "0x03",
        }));
        assert_eq!(payload.into_raw().unwrap(), Bytes::from_static(&[0x01]));

        let payload = SignedPayload::Json(json!({ "raw_transaction": "0x03" }));
        assert_eq!(payload.into_raw().unwrap(), Bytes::from_static(&[0x03]));

        let payload = SignedPayload::Json(json!("0xabcd"));
        assert_eq!(payload.into_raw().unwrap(), Bytes::from_static(&[0xab, 0xcd]));
    }

    #[test]
    fn test_normalize_rejects_unusable_shapes() {
        for value in [json!({ "tx": {} }), json!(42), json!({ "raw": "0xzz" }), json!("")] {
            assert!(matches!(
                SignedPayload::Json(value).into_raw(),
                Err(RedeemError::Signing(_))
            ));
        }
        assert!(SignedPayload::Raw(Bytes::new()).into_raw().is_err());
    }
}
