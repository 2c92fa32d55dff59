//! # Verification Service
//!
//! The main service implementing [`BlockVerificationApi`].
//!
//! ## Architecture
//!
//! - `verifier`: per-block presence check and decision table
//! - `rehydration`: isolated per-tier write-repair
//! - `orchestrator`: full and single-block runs under the run guard
//! - `status`: read-only coverage scan
//!
//! All handles arrive through [`VerificationDependencies`]; nothing is read
//! from ambient state.

mod orchestrator;
mod rehydration;
mod status;
mod verifier;

#[cfg(test)]
mod tests;

pub use orchestrator::parse_block_number;
pub use rehydration::RehydrationEngine;
pub use status::StatusReporter;
pub use verifier::BlockVerifier;

use crate::domain::config::VerificationConfig;
use crate::domain::errors::VerificationError;
use crate::domain::results::{BlockVerificationResult, VerificationSummary};
use crate::domain::status::StatusReport;
use crate::ports::inbound::BlockVerificationApi;
use crate::ports::outbound::VerificationDependencies;
use async_trait::async_trait;
use tokio::sync::{watch, Mutex};
use tracing::info;

/// The block verification service.
pub struct VerificationService {
    deps: VerificationDependencies,
    config: VerificationConfig,
    /// Held for the duration of a verification run.
    run_guard: Mutex<()>,
    /// Set once on shutdown; observed at every block boundary.
    shutdown_tx: watch::Sender<bool>,
}

impl VerificationService {
    pub fn new(deps: VerificationDependencies, config: VerificationConfig) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            deps,
            config,
            run_guard: Mutex::new(()),
            shutdown_tx,
        }
    }

    pub fn config(&self) -> &VerificationConfig {
        &self.config
    }

    pub fn dependencies(&self) -> &VerificationDependencies {
        &self.deps
    }

    /// Whether `shutdown` has been requested.
    pub fn is_shutting_down(&self) -> bool {
        *self.shutdown_tx.borrow()
    }
}

#[async_trait]
impl BlockVerificationApi for VerificationService {
    async fn verify_block(&self, block_number: u64) -> BlockVerificationResult {
        BlockVerifier::new(&self.deps, &self.config)
            .verify(block_number)
            .await
    }

    async fn verify_all(&self) -> Result<VerificationSummary, VerificationError> {
        self.run_all().await
    }

    async fn verify_single(
        &self,
        block_number: u64,
    ) -> Result<BlockVerificationResult, VerificationError> {
        self.run_single(block_number).await
    }

    async fn status_all(&self) -> Result<StatusReport, VerificationError> {
        let metadata = self
            .deps
            .chain
            .chain_metadata()
            .await
            .map_err(|e| VerificationError::ChainMetadata(e.to_string()))?;

        let total_blocks = orchestrator::chain_length(&metadata)?;

        Ok(StatusReporter::new(&self.deps, &self.config)
            .scan(total_blocks)
            .await)
    }

    fn shutdown(&self) {
        if !self.shutdown_tx.send_replace(true) {
            info!("verification service shutting down");
        }
    }
}
