//! # Verification Orchestrator
//!
//! Drives the block verifier over the chain, strictly sequentially, under
//! the service run guard. The shutdown flag is checked at every block
//! boundary.

use crate::domain::errors::VerificationError;
use crate::domain::results::{BlockVerificationResult, VerificationSummary};
use crate::service::verifier::BlockVerifier;
use crate::service::VerificationService;
use shared_types::ChainMetadata;
use std::time::Instant;
use tracing::{info, warn};

/// Parse a block number supplied as text.
///
/// Only plain non-negative decimal integers are accepted.
pub fn parse_block_number(raw: &str) -> Result<u64, VerificationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(VerificationError::InvalidBlockNumber(raw.to_string()));
    }
    trimmed
        .parse::<u64>()
        .map_err(|_| VerificationError::InvalidBlockNumber(raw.to_string()))
}

/// Block count reported by the chain, rejecting counts that do not fit.
pub(crate) fn chain_length(metadata: &ChainMetadata) -> Result<u64, VerificationError> {
    metadata.total_blocks().ok_or_else(|| {
        VerificationError::ChainMetadata(format!(
            "latest block {} leaves no representable block count",
            metadata.latest_block
        ))
    })
}

impl VerificationService {
    pub(crate) async fn run_all(&self) -> Result<VerificationSummary, VerificationError> {
        let _guard = self
            .run_guard
            .try_lock()
            .map_err(|_| VerificationError::RunInProgress)?;

        let metadata = self
            .deps
            .chain
            .chain_metadata()
            .await
            .map_err(|e| VerificationError::ChainMetadata(e.to_string()))?;
        if !metadata.initialized {
            return Err(VerificationError::ChainNotInitialized);
        }

        let total_blocks = chain_length(&metadata)?;
        let shutdown = self.shutdown_tx.subscribe();
        let verifier = BlockVerifier::new(&self.deps, &self.config);
        let started = Instant::now();
        let mut summary = VerificationSummary::new(total_blocks);

        info!(total_blocks, "verification run started");

        for block_number in 0..total_blocks {
            if *shutdown.borrow() {
                warn!(block_number, "verification run cancelled");
                summary.cancelled = true;
                break;
            }
            summary.record(verifier.verify(block_number).await);
        }

        summary.duration_ms = started.elapsed().as_millis() as u64;

        info!(
            total_blocks,
            verified = summary.verified,
            rehydrated = summary.rehydrated,
            partial = summary.partial,
            failed = summary.failed,
            duration_ms = summary.duration_ms,
            cancelled = summary.cancelled,
            "verification run finished"
        );

        Ok(summary)
    }

    pub(crate) async fn run_single(
        &self,
        block_number: u64,
    ) -> Result<BlockVerificationResult, VerificationError> {
        let _guard = self
            .run_guard
            .try_lock()
            .map_err(|_| VerificationError::RunInProgress)?;

        let result = BlockVerifier::new(&self.deps, &self.config)
            .verify(block_number)
            .await;
        info!(
            block_number,
            status = result.status.as_str(),
            "single block verification finished"
        );
        Ok(result)
    }
}
