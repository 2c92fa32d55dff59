//! # Status Reporter
//!
//! Cheap coverage scan. Never writes and never fetches from the
//! content-addressed tier.

use crate::domain::config::VerificationConfig;
use crate::domain::status::{BlockStatusEntry, ContentIdState, StatusReport};
use crate::ports::outbound::VerificationDependencies;
use shared_types::Block;
use tracing::warn;

pub struct StatusReporter<'a> {
    deps: &'a VerificationDependencies,
    config: &'a VerificationConfig,
}

impl<'a> StatusReporter<'a> {
    pub fn new(deps: &'a VerificationDependencies, config: &'a VerificationConfig) -> Self {
        Self { deps, config }
    }

    /// Scan blocks `0..total_blocks`.
    pub async fn scan(&self, total_blocks: u64) -> StatusReport {
        let mut report = StatusReport::new(total_blocks);
        for block_number in 0..total_blocks {
            report.push(self.entry(block_number).await);
        }
        report
    }

    async fn entry(&self, block_number: u64) -> BlockStatusEntry {
        // One KV read answers both presence and the recorded identifier.
        let (kv, ipfs) = match self.deps.kv.get(&self.config.keys.kv_key(block_number)).await {
            Ok(Some(bytes)) => (true, self.content_id_state(&bytes)),
            Ok(None) => (false, ContentIdState::UnknownPendingCheck),
            Err(e) => {
                warn!(block_number, tier = "kv", error = %e, "status read failed");
                (false, ContentIdState::UnknownPendingCheck)
            }
        };

        let r2 = match &self.deps.blob {
            Some(blob) => match blob.probe(&self.config.keys.blob_key(block_number)).await {
                Ok(found) => found,
                Err(e) => {
                    warn!(block_number, tier = "r2", error = %e, "status probe failed");
                    false
                }
            },
            None => false,
        };

        let blob_satisfied = r2 || self.deps.blob.is_none();
        let complete = kv && blob_satisfied && ipfs.is_present();

        BlockStatusEntry {
            block_number,
            kv,
            r2,
            ipfs,
            complete,
        }
    }

    fn content_id_state(&self, kv_copy: &[u8]) -> ContentIdState {
        match Block::from_json(kv_copy) {
            Ok(block) => match block.content_id() {
                Some(cid) if self.config.cids.is_plausible(cid) => {
                    ContentIdState::Present(cid.to_string())
                }
                _ => ContentIdState::Absent,
            },
            Err(_) => ContentIdState::UnknownPendingCheck,
        }
    }
}
