//! Chain Adapters - Polygon Blockchain Interaction Layer
//!
//! Provides on-chain access via alloy-rs 0.9 for:
//! - RPC provider management with per-cycle connect + chain-id check
//! - Owner key loading and legacy transaction signing

pub mod provider;
pub mod wallet;

pub use provider::{PolygonConnector, PolygonProvider};
pub use wallet::{LocalKeySigner, OwnerKey};
