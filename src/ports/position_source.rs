//! Position Source Port - Redeemable Position Discovery
//!
//! Abstracts the external index that knows which settled conditions
//! the proxy wallet still holds.

use alloy::primitives::Address;
use async_trait::async_trait;

/// Source of claimable condition ids.
#[async_trait]
pub trait PositionSource: Send + Sync + 'static {
  /// Distinct condition ids (hex strings, first-seen order) for which
  /// `holder` has a redeemable position of strictly positive size.
  ///
  /// Errors are transport or decoding failures; callers treat them as
  /// "nothing this cycle".
  async fn redeemable_conditions(&self, holder: Address) -> anyhow::Result<Vec<String>>;
}
