//! Typed failure taxonomy for the redemption workflow.
//!
//! Two granularities exist: [`RedeemError`] aborts a single claim and
//! [`CycleError`] abandons a whole cycle. Neither ever stops the process.

use thiserror::Error;

/// Failure of one claim attempt. Subsequent claims still run.
#[derive(Debug, Error)]
pub enum RedeemError {
    /// Condition id is not 32 bytes of hex.
    #[error("malformed condition id {id:?}: {reason}")]
    Encoding { id: String, reason: String },

    /// Nonce, gas price or another pre-submission RPC read failed.
    #[error("network error during {stage}: {source}")]
    Network {
        stage: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// The signer rejected the transaction or produced unusable output.
    #[error("signing failed: {0}")]
    Signing(String),

    /// `eth_sendRawTransaction` was rejected.
    #[error("broadcast failed: {0}")]
    Broadcast(#[source] anyhow::Error),
}

impl RedeemError {
    pub fn network(stage: &'static str, source: anyhow::Error) -> Self {
        Self::Network { stage, source }
    }

    /// Short label used for logs and the `outcome` metric.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Encoding { .. } => "encoding",
            Self::Network { .. } => "network",
            Self::Signing(_) => "signing",
            Self::Broadcast(_) => "broadcast",
        }
    }
}

/// Failure that abandons a whole cycle. The scheduler logs it and sleeps.
#[derive(Debug, Error)]
pub enum CycleError {
    /// RPC endpoint unreachable or on the wrong chain.
    #[error("RPC connectivity check failed: {0:#}")]
    Connectivity(#[source] anyhow::Error),

    /// Owner key could not be parsed.
    #[error("invalid signing key: {0:#}")]
    InvalidCredential(#[source] anyhow::Error),

    /// The cycle task panicked.
    #[error("cycle task panicked: {0}")]
    Panicked(String),

    /// Anything else.
    #[error(transparent)]
    Unclassified(#[from] anyhow::Error),
}

impl CycleError {
    /// Label for the `result` metric.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Connectivity(_) => "connectivity",
            Self::InvalidCredential(_) => "credential",
            Self::Panicked(_) => "panic",
            Self::Unclassified(_) => "error",
        }
    }
}
