//! # Inbound Ports (Driving Ports)
//!
//! The API this library exposes to the admin gateway.

use crate::domain::errors::VerificationError;
use crate::domain::results::{BlockVerificationResult, VerificationSummary};
use crate::domain::status::StatusReport;
use async_trait::async_trait;

/// Primary API of the verification engine.
#[async_trait]
pub trait BlockVerificationApi: Send + Sync {
    /// Check one block across all tiers and repair missing copies.
    ///
    /// Tier failures are recorded on the result, never returned as errors.
    async fn verify_block(&self, block_number: u64) -> BlockVerificationResult;

    /// Verify every block in `[0, latestBlock]`, strictly sequentially.
    ///
    /// ## Errors
    ///
    /// - `ChainNotInitialized`: reported before any tier is touched
    /// - `ChainMetadata`: the metadata accessor failed
    /// - `RunInProgress`: another run holds the run guard
    async fn verify_all(&self) -> Result<VerificationSummary, VerificationError>;

    /// Verify a single block under the run guard.
    ///
    /// ## Errors
    ///
    /// - `RunInProgress`: another run holds the run guard
    async fn verify_single(
        &self,
        block_number: u64,
    ) -> Result<BlockVerificationResult, VerificationError>;

    /// Read-only coverage scan. Never writes.
    async fn status_all(&self) -> Result<StatusReport, VerificationError>;

    /// Stop any running full scan at the next block boundary.
    fn shutdown(&self);
}
