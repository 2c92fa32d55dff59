//! # Block Verifier
//!
//! Checks one block across all tiers and decides what to repair.
//!
//! ## Decision table
//!
//! | Present in           | Status                                  |
//! |----------------------|-----------------------------------------|
//! | no tier              | `failed`, no writes                     |
//! | every configured tier| `ok`                                    |
//! | some tiers           | repair missing tiers from the source block; `rehydrated` if any repair succeeded, else `partial` |
//!
//! The source block is the first parsed copy in tier priority order
//! (KV > R2 > IPFS).
//!
//! Whatever the status, a present KV copy that does not record the
//! identifier the content copy was found under is rewritten to record it.

use crate::domain::config::VerificationConfig;
use crate::domain::errors::TierError;
use crate::domain::results::{BlockVerificationResult, TierCheck, VerificationStatus};
use crate::domain::tier::TierKind;
use crate::ports::outbound::{StorageTier, VerificationDependencies};
use crate::service::rehydration::RehydrationEngine;
use shared_types::Block;
use tracing::{debug, info, warn};

pub(crate) const MSG_NOT_FOUND: &str = "Block not found in any storage tier";
pub(crate) const MSG_ALL_PRESENT: &str = "Block present in all storage tiers";
pub(crate) const MSG_NO_SOURCE: &str = "Block reported present but no readable copy was available";

/// Per-block verifier.
pub struct BlockVerifier<'a> {
    deps: &'a VerificationDependencies,
    config: &'a VerificationConfig,
}

impl<'a> BlockVerifier<'a> {
    pub fn new(deps: &'a VerificationDependencies, config: &'a VerificationConfig) -> Self {
        Self { deps, config }
    }

    /// Verify one block, repairing missing tiers when possible.
    pub async fn verify(&self, block_number: u64) -> BlockVerificationResult {
        let mut result = BlockVerificationResult::new(block_number);
        let mut copies: [Option<Block>; 3] = [None, None, None];

        let kv_key = self.config.keys.kv_key(block_number);
        let (check, copy) = read_copy(self.deps.kv.as_ref(), &kv_key, block_number).await;
        result.kv = check;
        copies[0] = copy;

        match &self.deps.blob {
            Some(blob) => {
                let blob_key = self.config.keys.blob_key(block_number);
                let (check, copy) = read_copy(blob.as_ref(), &blob_key, block_number).await;
                result.r2 = check;
                copies[1] = copy;
            }
            None => {
                result.r2 = TierCheck::failed(TierError::NotConfigured(TierKind::R2).to_string());
            }
        }

        let cid = self.resolve_content_id(block_number, &copies, &mut result).await;
        if let Some(cid) = &cid {
            let (check, copy) = read_copy(self.deps.content.as_ref(), cid, block_number).await;
            result.ipfs = check;
            copies[2] = copy;
        }

        if result.hashes_diverge() {
            result.hash_mismatch = true;
            warn!(
                block_number,
                kv = ?result.kv.hash,
                r2 = ?result.r2.hash,
                ipfs = ?result.ipfs.hash,
                "tier copies disagree on block hash"
            );
        }

        let configured = self.deps.configured_tiers();
        let present = result.presence_count();

        if present == 0 {
            result.status = VerificationStatus::Failed;
            result.message = Some(MSG_NOT_FOUND.to_string());
            return result;
        }

        // Identifier the content copy was actually found under.
        let found_cid = cid.filter(|_| result.ipfs.present);
        let kv_stale = matches!(
            (&copies[0], &found_cid),
            (Some(kv_copy), Some(cid)) if kv_copy.content_id() != Some(cid.as_str())
        );
        let engine = RehydrationEngine::new(self.deps, self.config);

        if present == configured.len() {
            result.status = VerificationStatus::Ok;
            result.message = Some(MSG_ALL_PRESENT.to_string());
            if let (true, Some(mut kv_copy), Some(cid)) = (kv_stale, copies[0].take(), found_cid) {
                kv_copy.set_content_location(cid, None);
                self.record_content_location(&engine, block_number, &kv_copy)
                    .await;
            }
            return result;
        }

        let Some(mut source) = copies.into_iter().flatten().next() else {
            result.status = VerificationStatus::Failed;
            result.message = Some(MSG_NO_SOURCE.to_string());
            return result;
        };

        // Restored copies record the identifier the content copy was found under.
        if let Some(cid) = found_cid {
            if source.content_id() != Some(cid.as_str()) {
                source.set_content_location(cid, None);
            }
        }

        let missing: Vec<TierKind> = configured
            .into_iter()
            .filter(|tier| !result.check(*tier).present)
            .collect();

        result.rehydrated = engine.heal(block_number, &mut source, &missing).await;

        if kv_stale {
            self.record_content_location(&engine, block_number, &source)
                .await;
        }

        let healed = result.rehydrated.healed();
        if healed.is_empty() {
            result.status = VerificationStatus::Partial;
            result.message = Some(format!(
                "Block missing from {}; rehydration did not succeed",
                join_names(&missing)
            ));
        } else {
            result.status = VerificationStatus::Rehydrated;
            result.message = Some(format!("Rehydrated: {}", join_names(&healed)));
        }

        result
    }

    /// Rewrite the KV copy with the content location. Failure only logs;
    /// the next pass retries.
    async fn record_content_location(
        &self,
        engine: &RehydrationEngine<'_>,
        block_number: u64,
        block: &Block,
    ) {
        match engine.record_content_location(block_number, block).await {
            Ok(()) => info!(
                block_number,
                cid = ?block.content_id(),
                "content identifier recorded in KV copy"
            ),
            Err(e) => warn!(
                block_number,
                error = %e,
                "content identifier found but KV metadata refresh failed"
            ),
        }
    }

    /// Identifier to fetch from the content-addressed tier.
    ///
    /// The first plausible identifier recorded in the KV then R2 copy wins;
    /// the content index is consulted only when neither records one.
    async fn resolve_content_id(
        &self,
        block_number: u64,
        copies: &[Option<Block>; 3],
        result: &mut BlockVerificationResult,
    ) -> Option<String> {
        let recorded: Vec<&str> = copies[..2]
            .iter()
            .flatten()
            .filter_map(|block| block.content_id())
            .collect();

        if let Some(cid) = recorded
            .iter()
            .find(|cid| self.config.cids.is_plausible(cid))
        {
            return Some((*cid).to_string());
        }

        if !recorded.is_empty() {
            debug!(block_number, recorded = ?recorded, "no plausible content identifier recorded");
            return None;
        }

        let index = self.deps.content_index.as_ref()?;
        match index.content_id(block_number).await {
            Ok(Some(cid)) if self.config.cids.is_plausible(&cid) => Some(cid),
            Ok(_) => None,
            Err(e) => {
                warn!(block_number, error = %e, "content index lookup failed");
                result.ipfs = TierCheck::failed(e.to_string());
                None
            }
        }
    }
}

/// Read and parse one tier's copy. Errors are captured, never returned.
async fn read_copy(
    tier: &dyn StorageTier,
    key: &str,
    block_number: u64,
) -> (TierCheck, Option<Block>) {
    let kind = tier.kind();
    match tier.get(key).await {
        Ok(Some(bytes)) => match Block::from_json(&bytes) {
            Ok(block) => {
                debug!(block_number, tier = kind.as_str(), "tier copy found");
                (TierCheck::present(block.hash.clone()), Some(block))
            }
            Err(e) => {
                let err = TierError::parse(kind, e.to_string());
                warn!(block_number, tier = kind.as_str(), error = %err, "tier copy unreadable");
                (TierCheck::failed(err.to_string()), None)
            }
        },
        Ok(None) => {
            debug!(block_number, tier = kind.as_str(), "tier copy missing");
            (TierCheck::absent(), None)
        }
        Err(e) => {
            warn!(block_number, tier = kind.as_str(), error = %e, "tier read failed");
            (TierCheck::failed(e.to_string()), None)
        }
    }
}

fn join_names(tiers: &[TierKind]) -> String {
    tiers
        .iter()
        .map(|tier| tier.display_name())
        .collect::<Vec<_>>()
        .join(", ")
}
