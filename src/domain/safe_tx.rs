//! Safe Meta-Transaction Builder
//!
//! Wraps a Conditional Tokens `redeemPositions` call inside the proxy
//! wallet's `execTransaction`, authorised by a pre-validated owner
//! signature instead of a real ECDSA signature over the Safe tx hash.
//!
//! Pure data encoding: no network or state access. The output is the
//! calldata of a transaction sent from the owner EOA to the proxy.

use alloy::primitives::{Address, B256, Bytes, U256};
use alloy::sol;
use alloy::sol_types::SolCall;
use anyhow::Result;

use crate::config::ContractsConfig;
use crate::config::loader::parse_address;

use super::claim::parse_condition_id;
use super::error::RedeemError;

sol! {
    /// Gnosis Conditional Tokens Framework.
    interface IConditionalTokens {
        function redeemPositions(
            address collateralToken,
            bytes32 parentCollectionId,
            bytes32 conditionId,
            uint256[] indexSets
        ) external;
    }

    /// Gnosis Safe (v1.3) proxy wallet.
    interface IGnosisSafe {
        function execTransaction(
            address to,
            uint256 value,
            bytes data,
            uint8 operation,
            uint256 safeTxGas,
            uint256 baseGas,
            uint256 gasPrice,
            address gasToken,
            address refundReceiver,
            bytes signatures
        ) external payable returns (bool success);
    }
}

/// Safe `Enum.Operation.Call` (never delegate-call).
pub const SAFE_OPERATION_CALL: u8 = 0;

/// Length of a single Safe signature `{r}{s}{v}`.
pub const OWNER_SIGNATURE_LEN: usize = 65;

/// Safe signature type for a pre-validated (caller is owner) signature.
const PRE_VALIDATED_SIGNATURE_TYPE: u8 = 1;

/// Build the pre-validated owner signature accepted by a Safe whose
/// `msg.sender` is that owner.
///
/// Layout (65 bytes):
/// - `[0..32]`  owner address as a big-endian uint256 (`r`)
/// - `[32..64]` zero (`s`)
/// - `[64]`     `0x01` (`v`, signature type)
pub fn owner_signature(owner: Address) -> [u8; OWNER_SIGNATURE_LEN] {
    let mut signature = [0u8; OWNER_SIGNATURE_LEN];
    signature[12..32].copy_from_slice(owner.as_slice());
    signature[64] = PRE_VALIDATED_SIGNATURE_TYPE;
    signature
}

/// Contract constants the builder encodes against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedemptionContracts {
    /// Conditional Tokens contract (inner call target).
    pub conditional_tokens: Address,
    /// Collateral token passed to `redeemPositions`.
    pub collateral: Address,
    /// Outcome index sets; `[1, 2]` covers both slots of a binary market.
    pub index_sets: Vec<U256>,
}

impl RedemptionContracts {
    /// Resolve configured addresses.
    pub fn from_config(config: &ContractsConfig) -> Result<Self> {
        Ok(Self {
            conditional_tokens: parse_address(
                "contracts.conditional_tokens",
                &config.conditional_tokens,
            )?,
            collateral: parse_address("contracts.collateral", &config.collateral)?,
            index_sets: config.index_sets.iter().map(|&i| U256::from(i)).collect(),
        })
    }
}

/// A fully encoded proxy call for one condition id.
#[derive(Debug, Clone)]
pub struct MetaTransaction {
    /// Proxy wallet the outer call is sent to.
    pub to: Address,
    /// Decoded condition id.
    pub condition_id: B256,
    /// `redeemPositions` calldata executed by the proxy.
    pub inner_call: Bytes,
    /// `execTransaction` calldata for the outer transaction.
    pub calldata: Bytes,
}

/// Encodes redemption calls routed through the proxy wallet.
#[derive(Debug, Clone)]
pub struct SafeTxBuilder {
    proxy: Address,
    contracts: RedemptionContracts,
}

impl SafeTxBuilder {
    pub const fn new(proxy: Address, contracts: RedemptionContracts) -> Self {
        Self { proxy, contracts }
    }

    /// Build the proxy-wrapped redemption for `condition_id`, signed
    /// (pre-validated) as `owner`.
    ///
    /// # Errors
    /// `RedeemError::Encoding` when the id is not 32 bytes of hex.
    pub fn build(&self, condition_id: &str, owner: Address) -> Result<MetaTransaction, RedeemError> {
        let condition_id = parse_condition_id(condition_id)?;
        let inner_call = self.redeem_call(condition_id);
        let calldata = self.exec_call(inner_call.clone(), owner);

        Ok(MetaTransaction {
            to: self.proxy,
            condition_id,
            inner_call,
            calldata,
        })
    }

    /// `redeemPositions(collateral, 0x0, conditionId, indexSets)`.
    pub fn redeem_call(&self, condition_id: B256) -> Bytes {
        IConditionalTokens::redeemPositionsCall {
            collateralToken: self.contracts.collateral,
            parentCollectionId: B256::ZERO,
            conditionId: condition_id,
            indexSets: self.contracts.index_sets.clone(),
        }
        .abi_encode()
        .into()
    }

    /// `execTransaction(ctf, 0, inner, CALL, 0, 0, 0, 0x0, 0x0, sig)`.
    fn exec_call(&self, inner_call: Bytes, owner: Address) -> Bytes {
        IGnosisSafe::execTransactionCall {
            to: self.contracts.conditional_tokens,
            value: U256::ZERO,
            data: inner_call,
            operation: SAFE_OPERATION_CALL,
            safeTxGas: U256::ZERO,
            baseGas: U256::ZERO,
            gasPrice: U256::ZERO,
            gasToken: Address::ZERO,
            refundReceiver: Address::ZERO,
            signatures: Bytes::copy_from_slice(&owner_signature(owner)),
        }
        .abi_encode()
        .into()
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{address, keccak256};

    use super::*;

    const PROXY: Address = address!("1111111111111111111111111111111111111111");
    const OWNER: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
    const CONDITION: &str = "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

    fn builder() -> SafeTxBuilder {
        let contracts = RedemptionContracts::from_config(&ContractsConfig::default()).unwrap();
        SafeTxBuilder::new(PROXY, contracts)
    }

    fn word(data: &[u8], index: usize) -> &[u8] {
        &data[4 + index * 32..4 + (index + 1) * 32]
    }

    #[test]
    fn test_owner_signature_layout() {
        let sig = owner_signature(OWNER);

        assert_eq!(sig.len(), 65);
        assert_eq!(&sig[..12], &[0u8; 12]);
        assert_eq!(&sig[12..32], OWNER.as_slice());
        assert_eq!(&sig[32..64], &[0u8; 32]);
        assert_eq!(sig[64], 0x01);
    }

    #[test]
    fn test_owner_signature_layout_second_owner() {
        let owner = address!("00000000000000000000000000000000000000ff");
        let mut expected = [0u8; 65];
        expected[31] = 0xff;
        expected[64] = 0x01;

        assert_eq!(owner_signature(owner), expected);
    }

    #[test]
    fn test_redeem_call_matches_ctf_abi() {
        let b = builder();
        let condition = B256::repeat_byte(0xbb);
        let data = b.redeem_call(condition);

        let selector = &keccak256(b"redeemPositions(address,bytes32,bytes32,uint256[])")[..4];
        assert_eq!(&data[..4], selector);
        // 4 head words + array length + two elements
        assert_eq!(data.len(), 4 + 7 * 32);

        let mut collateral = [0u8; 32];
        collateral[12..].copy_from_slice(b.contracts.collateral.as_slice());
        assert_eq!(word(&data, 0), collateral);
        assert_eq!(word(&data, 1), [0u8; 32]);
        assert_eq!(word(&data, 2), condition.as_slice());
        assert_eq!(word(&data, 3), U256::from(0x80).to_be_bytes::<32>());
        assert_eq!(word(&data, 4), U256::from(2).to_be_bytes::<32>());
        assert_eq!(word(&data, 5), U256::from(1).to_be_bytes::<32>());
        assert_eq!(word(&data, 6), U256::from(2).to_be_bytes::<32>());
    }

    #[test]
    fn test_exec_call_wraps_inner_call() {
        let b = builder();
        let tx = b.build(CONDITION, OWNER).unwrap();

        assert_eq!(tx.to, PROXY);
        assert_eq!(tx.condition_id, B256::repeat_byte(0xbb));
        assert_eq!(&tx.calldata[..4], &[0x6a, 0x76, 0x12, 0x02]);

        let decoded = IGnosisSafe::execTransactionCall::abi_decode(&tx.calldata, true).unwrap();
        assert_eq!(decoded.to, b.contracts.conditional_tokens);
        assert_eq!(decoded.value, U256::ZERO);
        assert_eq!(decoded.data, tx.inner_call);
        assert_eq!(decoded.operation, SAFE_OPERATION_CALL);
        assert_eq!(decoded.safeTxGas, U256::ZERO);
        assert_eq!(decoded.baseGas, U256::ZERO);
        assert_eq!(decoded.gasPrice, U256::ZERO);
        assert_eq!(decoded.gasToken, Address::ZERO);
        assert_eq!(decoded.refundReceiver, Address::ZERO);
        assert_eq!(&decoded.signatures[..], owner_signature(OWNER).as_slice());
    }

    #[test]
    fn test_alternate_deployment_is_honoured() {
        let contracts = RedemptionContracts {
            conditional_tokens: address!("2222222222222222222222222222222222222222"),
            collateral: address!("3333333333333333333333333333333333333333"),
            index_sets: vec![U256::from(1), U256::from(2), U256::from(4)],
        };
        let b = SafeTxBuilder::new(PROXY, contracts.clone());
        let tx = b.build(CONDITION, OWNER).unwrap();

        let outer = IGnosisSafe::execTransactionCall::abi_decode(&tx.calldata, true).unwrap();
        assert_eq!(outer.to, contracts.conditional_tokens);

        let inner = IConditionalTokens::redeemPositionsCall::abi_decode(&outer.data, true).unwrap();
        assert_eq!(inner.collateralToken, contracts.collateral);
        assert_eq!(inner.parentCollectionId, B256::ZERO);
        assert_eq!(inner.indexSets, contracts.index_sets);
    }

    #[test]
    fn test_malformed_condition_id_builds_nothing() {
        let err = builder().build("0xdeadbeef", OWNER).unwrap_err();
        assert!(matches!(err, RedeemError::Encoding { .. }));
    }
}
