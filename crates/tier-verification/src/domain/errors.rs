//! # Domain Errors
//!
//! ## Design Principles
//!
//! - Tier errors are isolated: they are recorded on the affected tier's
//!   check and never abort the block-level decision.
//! - Request-level errors (`VerificationError`) stop a run before any
//!   tier is touched.

use crate::domain::tier::TierKind;
use thiserror::Error;

/// Failure of a single tier operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TierError {
    /// The backend rejected or failed the operation (I/O, network, quota).
    #[error("{tier} backend error: {message}")]
    Backend {
        /// Tier that failed.
        tier: TierKind,
        /// Backend description of the failure.
        message: String,
    },

    /// The tier returned bytes that are not a valid block record.
    #[error("{tier} returned an unreadable block: {message}")]
    Parse {
        /// Tier that returned the payload.
        tier: TierKind,
        /// Decoder message.
        message: String,
    },

    /// The operation is not supported by this tier.
    #[error("{tier} does not support {operation}")]
    Unsupported {
        /// Tier that was asked.
        tier: TierKind,
        /// Operation name.
        operation: &'static str,
    },

    /// The tier is not configured for this deployment.
    #[error("{0} tier not configured")]
    NotConfigured(TierKind),
}

impl TierError {
    /// Shorthand for a backend failure.
    pub fn backend(tier: TierKind, message: impl Into<String>) -> Self {
        TierError::Backend {
            tier,
            message: message.into(),
        }
    }

    /// Shorthand for a decode failure.
    pub fn parse(tier: TierKind, message: impl Into<String>) -> Self {
        TierError::Parse {
            tier,
            message: message.into(),
        }
    }
}

/// Request-level verification failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
    /// The chain reports itself as not initialized.
    #[error("Chain not initialized")]
    ChainNotInitialized,

    /// A block number did not parse as a non-negative integer.
    #[error("Invalid block number: {0}")]
    InvalidBlockNumber(String),

    /// The chain metadata accessor failed.
    #[error("Chain metadata unavailable: {0}")]
    ChainMetadata(String),

    /// Another verification run holds the run guard.
    #[error("A verification run is already in progress")]
    RunInProgress,

    /// Unexpected failure outside normal tier absence.
    #[error("Internal error: {0}")]
    Internal(String),
}
