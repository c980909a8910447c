//! Polymarket Data API Adapter
//!
//! HTTP client for the positions index used to discover redeemable
//! conditions held by the proxy wallet.
//!
//! Sub-modules:
//! - `data_api`: `PositionSource` implementation over reqwest
//! - `types`: response types and the redeemable filter

pub mod data_api;
pub mod types;

pub use data_api::{DataApiClient, DataApiConfig};
