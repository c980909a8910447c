//! Claim identifiers and per-cycle results.
//!
//! Condition ids travel as hex strings from discovery and are only
//! decoded by the transaction builder, so a single malformed id fails
//! alone instead of poisoning the whole discovery result.

use alloy::hex;
use alloy::primitives::B256;
use chrono::{DateTime, Utc};

use super::error::RedeemError;
use super::transaction::SubmissionOutcome;

/// Decoded length of a condition id.
pub const CONDITION_ID_LEN: usize = 32;

/// Decode a `0x`-prefixed (or bare) hex condition id into 32 bytes.
pub fn parse_condition_id(raw: &str) -> Result<B256, RedeemError> {
    let bytes = hex::decode(raw.trim()).map_err(|e| RedeemError::Encoding {
        id: raw.to_string(),
        reason: e.to_string(),
    })?;

    if bytes.len() != CONDITION_ID_LEN {
        return Err(RedeemError::Encoding {
            id: raw.to_string(),
            reason: format!("expected 32 bytes, got {}", bytes.len()),
        });
    }

    Ok(B256::from_slice(&bytes))
}

/// Outcome of one condition id within a cycle.
#[derive(Debug)]
pub struct ClaimResult {
    /// Condition id as discovered.
    pub condition_id: String,
    /// Final state of the attempt.
    pub outcome: Result<SubmissionOutcome, RedeemError>,
}

impl ClaimResult {
    /// Short label for logs and the `outcome` metric.
    pub fn label(&self) -> &'static str {
        match &self.outcome {
            Ok(outcome) => outcome.label(),
            Err(e) => e.kind(),
        }
    }

    pub fn is_redeemed(&self) -> bool {
        matches!(self.outcome, Ok(SubmissionOutcome::Confirmed { .. }))
    }
}

/// Aggregated result of one redemption cycle.
#[derive(Debug)]
pub struct CycleReport {
    /// Individual claim results in submission order.
    pub results: Vec<ClaimResult>,
    /// When the cycle started.
    pub started_at: DateTime<Utc>,
    /// When the last claim finished.
    pub finished_at: DateTime<Utc>,
}

impl CycleReport {
    /// A cycle where discovery found nothing to claim.
    pub fn empty(started_at: DateTime<Utc>) -> Self {
        Self {
            results: Vec::new(),
            started_at,
            finished_at: Utc::now(),
        }
    }

    pub fn redeemed(&self) -> usize {
        self.results.iter().filter(|r| r.is_redeemed()).count()
    }

    pub fn reverted(&self) -> usize {
        self.count(|o| matches!(o, Ok(SubmissionOutcome::Reverted { .. })))
    }

    pub fn timed_out(&self) -> usize {
        self.count(|o| matches!(o, Ok(SubmissionOutcome::TimedOut { .. })))
    }

    pub fn failed(&self) -> usize {
        self.count(Result::is_err)
    }

    /// Wall-clock length of the cycle in milliseconds.
    pub fn elapsed_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }

    fn count<F>(&self, pred: F) -> usize
    where
        F: Fn(&Result<SubmissionOutcome, RedeemError>) -> bool,
    {
        self.results.iter().filter(|r| pred(&r.outcome)).count()
    }
}
