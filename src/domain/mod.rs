//! Domain layer - Core redemption logic and models.
//!
//! Pure encoding and classification logic for the auto-claim bot:
//! condition ids, the Safe meta-transaction builder, the gas policy
//! and the typed failure taxonomy. Nothing here touches the network
//! (hexagonal architecture inner ring).

pub mod claim;
pub mod error;
pub mod safe_tx;
pub mod transaction;

// Re-export core types for convenience
pub use claim::{ClaimResult, CycleReport, parse_condition_id};
pub use error::{CycleError, RedeemError};
pub use safe_tx::{MetaTransaction, RedemptionContracts, SafeTxBuilder, owner_signature};
pub use transaction::{GasPolicy, PendingTransaction, SignedPayload, SubmissionOutcome, TxReceipt};
