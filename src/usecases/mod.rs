//! Use Cases Layer - Application Business Logic
//!
//! Orchestrates domain logic with port interfaces to implement
//! the bot's claim workflow. Each use case is a self-contained
//! business operation.
//!
//! Use cases:
//! - `PositionDiscovery`: non-fatal lookup of redeemable positions
//! - `TransactionSubmitter`: nonce, gas, sign, broadcast, confirm
//! - `RedemptionOrchestrator`: sequential claims with a pause between
//! - `Scheduler`: supervised periodic cycle loop

pub mod discovery;
pub mod redemption;
pub mod scheduler;
pub mod submitter;

pub use discovery::PositionDiscovery;
pub use redemption::RedemptionOrchestrator;
pub use scheduler::{CyclePorts, Scheduler};
pub use submitter::{SubmitterConfig, TransactionSubmitter};
