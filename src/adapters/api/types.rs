//! Positions API Response Types
//!
//! Only the fields discovery depends on are modeled; everything else
//! in the payload is ignored. A response that lacks them is a
//! decoding failure.

use std::collections::HashSet;

use serde::{Deserialize, Deserializer};

/// One position entry from `GET /positions`.
#[derive(Debug, Clone, Deserialize)]
pub struct PositionEntry {
  /// Position size in outcome tokens (number or numeric string).
  #[serde(deserialize_with = "number_or_string")]
  pub size: f64,
  /// Condition id (0x-prefixed 32-byte hex).
  #[serde(rename = "conditionId")]
  pub condition_id: String,
  /// Market title, for logs.
  #[serde(default)]
  pub title: Option<String>,
}

/// Keep entries with `size > 0` and drop duplicate condition ids
/// (case-insensitive), preserving first-seen order.
pub fn collect_redeemable(entries: &[PositionEntry]) -> Vec<String> {
  let mut seen = HashSet::new();

  entries
    .iter()
    .filter(|e| e.size > 0.0)
    .filter(|e| seen.insert(e.condition_id.to_ascii_lowercase()))
    .map(|e| e.condition_id.clone())
    .collect()
}

fn number_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
  D: Deserializer<'de>,
{
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum Size {
    Number(f64),
    Text(String),
  }

  match Size::deserialize(deserializer)? {
    Size::Number(n) => Ok(n),
    Size::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
  }
}
